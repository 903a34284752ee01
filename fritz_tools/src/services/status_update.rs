//! Follow-up request status updates.
//!
//! The canonical flow fetches the stored request, merges the new status into
//! its `allocation_id`/`obj_id` and submits the result. The direct flow skips
//! the fetch and trusts the operator's identifiers.

use tracing::{info, warn};

use crate::models::{AllocationId, FollowupState, RequestId, RequestStatus, StatusUpdate};
use crate::portal::repository::{ErrorContext, FollowupRepository, PortalError, PortalResult};

/// How the PUT body's identifiers are obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateMode {
    /// Fetch the request first. Operator-supplied identifiers are only
    /// cross-checked; the stored values are the ones sent.
    FetchMerge {
        expected_allocation: Option<AllocationId>,
        expected_obj_id: Option<String>,
    },
    /// Send the operator's identifiers without fetching.
    Direct {
        allocation_id: AllocationId,
        obj_id: String,
    },
}

impl Default for UpdateMode {
    fn default() -> Self {
        UpdateMode::FetchMerge {
            expected_allocation: None,
            expected_obj_id: None,
        }
    }
}

/// A status update the portal accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusOutcome {
    pub request_id: RequestId,
    pub update: StatusUpdate,
    pub message: Option<String>,
}

/// Map an operator code to a terminal status: 0 Complete, 1 Interrupted, 2 Skipped.
pub fn status_from_code(code: i64) -> PortalResult<RequestStatus> {
    RequestStatus::from_code(code)
}

pub fn merge_status_update(state: &FollowupState, status: RequestStatus) -> StatusUpdate {
    StatusUpdate {
        allocation_id: state.allocation_id,
        obj_id: state.obj_id.clone(),
        status,
    }
}

fn cross_check(
    state: &FollowupState,
    expected_allocation: Option<AllocationId>,
    expected_obj_id: Option<&str>,
) {
    if let Some(expected) = expected_allocation {
        if expected != state.allocation_id {
            warn!(
                "Request {} belongs to allocation {}, not {}; using the stored value",
                state.request_id, state.allocation_id, expected
            );
        }
    }
    if let Some(expected) = expected_obj_id {
        if expected != state.obj_id {
            warn!(
                "Request {} belongs to object {}, not {}; using the stored value",
                state.request_id, state.obj_id, expected
            );
        }
    }
}

/// Move one request to the status named by `code`.
///
/// The code is checked before any remote call.
///
/// # Errors
/// * `ValidationError` - Unknown status code
/// * `NotFound` / `FormatError` - The fetch found no usable request
/// * `RemoteError` - Transport failure, or the portal answered the PUT with
///   an error envelope
pub async fn update_request_status<R>(
    repo: &R,
    request_id: RequestId,
    code: i64,
    mode: UpdateMode,
) -> PortalResult<StatusOutcome>
where
    R: FollowupRepository + ?Sized,
{
    let status = status_from_code(code)?;

    let update = match mode {
        UpdateMode::FetchMerge {
            expected_allocation,
            expected_obj_id,
        } => {
            let state = repo.get_followup(request_id).await?;
            match &state.status {
                Some(current) if current.is_terminal() => warn!(
                    "Request {} is already {}; overwriting with {}",
                    request_id, current, status
                ),
                Some(current) => info!("Request {} is currently {}", request_id, current),
                None => {}
            }
            cross_check(&state, expected_allocation, expected_obj_id.as_deref());
            merge_status_update(&state, status)
        }
        UpdateMode::Direct {
            allocation_id,
            obj_id,
        } => StatusUpdate {
            allocation_id,
            obj_id,
            status,
        },
    };

    info!(
        "Setting request {} ({}, allocation {}) to {}",
        request_id, update.obj_id, update.allocation_id, update.status
    );
    let envelope = repo.put_status(request_id, &update).await?;

    if !envelope.is_success() {
        return Err(PortalError::remote_with_context(
            envelope.message_or_default().to_string(),
            ErrorContext::new("put_status")
                .with_entity("followup_request")
                .with_entity_id(request_id),
        ));
    }

    Ok(StatusOutcome {
        request_id,
        update,
        message: envelope.message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> FollowupState {
        FollowupState {
            request_id: RequestId(42),
            allocation_id: AllocationId(7),
            obj_id: "ZTF21abc".to_string(),
            status: Some(RequestStatus::Submitted),
        }
    }

    #[test]
    fn test_status_from_code_total_over_known_codes() {
        assert_eq!(status_from_code(0).unwrap(), RequestStatus::Complete);
        assert_eq!(status_from_code(1).unwrap(), RequestStatus::Interrupted);
        assert_eq!(status_from_code(2).unwrap(), RequestStatus::Skipped);
        for bad in [-1, 3, 99] {
            assert!(matches!(
                status_from_code(bad),
                Err(PortalError::ValidationError { .. })
            ));
        }
    }

    #[test]
    fn test_merge_keeps_stored_identity() {
        let update = merge_status_update(&state(), RequestStatus::Skipped);
        assert_eq!(update.allocation_id, AllocationId(7));
        assert_eq!(update.obj_id, "ZTF21abc");
        assert_eq!(update.status, RequestStatus::Skipped);
    }

    #[test]
    fn test_merged_body_shape() {
        let update = merge_status_update(&state(), RequestStatus::Complete);
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"allocation_id":7,"obj_id":"ZTF21abc","status":"Complete"}"#
        );
    }
}
