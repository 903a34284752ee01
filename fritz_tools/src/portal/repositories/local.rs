//! In-memory portal implementation.
//!
//! Stores sources and follow-up requests in memory and records every call,
//! so tests can assert exactly which writes a workflow issued. Status updates
//! answer with SkyPortal-shaped envelopes. Also backs `--dry-run`.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

use crate::models::{
    AllocationId, FollowupRequest, FollowupState, RequestId, RequestStatus, ResponseEnvelope,
    SourceDraft, StatusUpdate,
};
use crate::portal::repository::{
    ErrorContext, FollowupRepository, PortalError, PortalResult, SourceRepository,
};

/// One call made against a [`LocalPortal`].
#[derive(Debug, Clone, PartialEq)]
pub enum PortalCall {
    SourceExists(String),
    CreateSource(SourceDraft),
    SubmitFollowup(FollowupRequest),
    GetFollowup(RequestId),
    PutStatus(RequestId, StatusUpdate),
}

impl PortalCall {
    /// Whether the call would change state on a real portal.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            PortalCall::CreateSource(_) | PortalCall::SubmitFollowup(_) | PortalCall::PutStatus(..)
        )
    }
}

#[derive(Debug, Clone)]
struct StoredFollowup {
    allocation_id: AllocationId,
    obj_id: String,
    status: RequestStatus,
}

struct LocalData {
    sources: HashMap<String, (f64, f64)>,
    requests: HashMap<RequestId, StoredFollowup>,
    rejected_sources: HashSet<String>,
    calls: Vec<PortalCall>,
    next_request_id: i64,
    reachable: bool,
    log_writes: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            sources: HashMap::new(),
            requests: HashMap::new(),
            rejected_sources: HashSet::new(),
            calls: Vec::new(),
            next_request_id: 1,
            reachable: true,
            log_writes: false,
        }
    }
}

/// In-memory portal.
///
/// # Example
/// ```ignore
/// let portal = LocalPortal::new();
/// portal.seed_source("ZTF21abc", 150.0, 20.0);
/// assert!(portal.source_exists("ZTF21abc").await);
/// ```
#[derive(Clone, Default)]
pub struct LocalPortal {
    data: Arc<RwLock<LocalData>>,
}

impl LocalPortal {
    /// Create an empty, reachable portal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a portal that logs every write instead of staying silent,
    /// used for `--dry-run`.
    pub fn dry_run() -> Self {
        let portal = Self::new();
        portal.data.write().log_writes = true;
        portal
    }

    /// Register an existing source.
    pub fn seed_source(&self, object_id: &str, ra: f64, dec: f64) {
        self.data
            .write()
            .sources
            .insert(object_id.to_string(), (ra, dec));
    }

    /// Register an existing follow-up request and return its id.
    pub fn seed_followup(
        &self,
        allocation_id: AllocationId,
        obj_id: &str,
        status: RequestStatus,
    ) -> RequestId {
        let mut data = self.data.write();
        let id = RequestId(data.next_request_id);
        data.next_request_id += 1;
        data.requests.insert(
            id,
            StoredFollowup {
                allocation_id,
                obj_id: obj_id.to_string(),
                status,
            },
        );
        id
    }

    /// Make every later source creation for `object_id` answer `false`.
    pub fn reject_source(&self, object_id: &str) {
        self.data
            .write()
            .rejected_sources
            .insert(object_id.to_string());
    }

    /// Simulate a portal that cannot be reached.
    pub fn set_reachable(&self, reachable: bool) {
        self.data.write().reachable = reachable;
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<PortalCall> {
        self.data.read().calls.clone()
    }

    /// Ids passed to `create_source`, in call order.
    pub fn created_source_ids(&self) -> Vec<String> {
        self.data
            .read()
            .calls
            .iter()
            .filter_map(|c| match c {
                PortalCall::CreateSource(draft) => Some(draft.id().to_string()),
                _ => None,
            })
            .collect()
    }

    /// Requests passed to `submit_followup`, in call order.
    pub fn submitted_requests(&self) -> Vec<FollowupRequest> {
        self.data
            .read()
            .calls
            .iter()
            .filter_map(|c| match c {
                PortalCall::SubmitFollowup(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has_source(&self, object_id: &str) -> bool {
        self.data.read().sources.contains_key(object_id)
    }

    /// Current status of a stored request.
    pub fn status_of(&self, request_id: RequestId) -> Option<RequestStatus> {
        self.data
            .read()
            .requests
            .get(&request_id)
            .map(|r| r.status.clone())
    }

    fn record(&self, call: PortalCall) -> bool {
        let mut data = self.data.write();
        if data.log_writes && call.is_write() {
            info!("[dry-run] {:?}", call);
        }
        data.calls.push(call);
        data.reachable
    }

    fn unreachable(operation: &str) -> PortalError {
        PortalError::remote_with_context(
            "Portal is unreachable",
            ErrorContext::new(operation).with_details("connect"),
        )
    }
}

#[async_trait]
impl SourceRepository for LocalPortal {
    async fn source_exists(&self, object_id: &str) -> bool {
        if !self.record(PortalCall::SourceExists(object_id.to_string())) {
            return false;
        }
        self.has_source(object_id)
    }

    async fn create_source(&self, draft: &SourceDraft) -> PortalResult<bool> {
        if !self.record(PortalCall::CreateSource(draft.clone())) {
            return Err(Self::unreachable("create_source").with_entity_id(draft.id()));
        }

        let mut data = self.data.write();
        if data.rejected_sources.contains(draft.id()) {
            return Ok(false);
        }
        data.sources
            .insert(draft.id().to_string(), (draft.ra(), draft.dec()));
        Ok(true)
    }
}

#[async_trait]
impl FollowupRepository for LocalPortal {
    async fn submit_followup(&self, request: &FollowupRequest) -> PortalResult<()> {
        if !self.record(PortalCall::SubmitFollowup(request.clone())) {
            return Err(Self::unreachable("submit_followup").with_entity_id(&request.obj_id));
        }

        let mut data = self.data.write();
        if !data.sources.contains_key(&request.obj_id) {
            return Err(PortalError::remote_with_context(
                format!("Invalid obj_id: {}", request.obj_id),
                ErrorContext::new("submit_followup")
                    .with_entity("followup_request")
                    .with_entity_id(&request.obj_id)
                    .with_details("http_status=400"),
            ));
        }

        let id = RequestId(data.next_request_id);
        data.next_request_id += 1;
        data.requests.insert(
            id,
            StoredFollowup {
                allocation_id: request.allocation_id,
                obj_id: request.obj_id.clone(),
                status: request.status.clone(),
            },
        );
        Ok(())
    }

    async fn get_followup(&self, request_id: RequestId) -> PortalResult<FollowupState> {
        if !self.record(PortalCall::GetFollowup(request_id)) {
            return Err(Self::unreachable("get_followup").with_entity_id(request_id));
        }

        let envelope = match self.data.read().requests.get(&request_id) {
            Some(stored) => {
                let mut data = Map::new();
                data.insert("id".to_string(), json!(request_id.value()));
                data.insert("allocation_id".to_string(), json!(stored.allocation_id.value()));
                data.insert("obj_id".to_string(), Value::String(stored.obj_id.clone()));
                data.insert("status".to_string(), Value::String(stored.status.to_string()));
                ResponseEnvelope::success(Some(data))
            }
            None => ResponseEnvelope::error(format!(
                "Could not retrieve followup request {}",
                request_id
            )),
        };
        FollowupState::from_envelope(request_id, envelope)
    }

    async fn put_status(
        &self,
        request_id: RequestId,
        update: &StatusUpdate,
    ) -> PortalResult<ResponseEnvelope> {
        if !self.record(PortalCall::PutStatus(request_id, update.clone())) {
            return Err(Self::unreachable("put_status").with_entity_id(request_id));
        }

        let mut data = self.data.write();
        let stored = match data.requests.get_mut(&request_id) {
            Some(stored) => stored,
            None => {
                return Ok(ResponseEnvelope::error(format!(
                    "Could not find followup request {}",
                    request_id
                )))
            }
        };
        if !update.status.is_terminal() {
            return Ok(ResponseEnvelope::error(format!(
                "Status '{}' cannot be set on followup request {}",
                update.status, request_id
            )));
        }
        if stored.allocation_id != update.allocation_id || stored.obj_id != update.obj_id {
            return Ok(ResponseEnvelope::error(
                "allocation_id and obj_id do not match the stored request",
            ));
        }
        stored.status = update.status.clone();
        Ok(ResponseEnvelope::success(None))
    }
}
