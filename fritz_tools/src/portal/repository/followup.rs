//! Follow-up request repository trait.

use async_trait::async_trait;

use super::error::PortalResult;
use crate::models::{FollowupRequest, FollowupState, RequestId, ResponseEnvelope, StatusUpdate};

/// Operations on follow-up observation requests.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait FollowupRepository: Send + Sync {
    /// Submit a new follow-up request.
    ///
    /// # Returns
    /// * `Ok(())` - The portal accepted the request (HTTP 200)
    /// * `Err(PortalError::RemoteError)` - Transport failure or any other
    ///   status; the error carries the response body
    async fn submit_followup(&self, request: &FollowupRequest) -> PortalResult<()>;

    /// Fetch the current state of a request.
    ///
    /// # Errors
    /// * `NotFound` - Error envelope or no `data`
    /// * `FormatError` - Body is not an envelope, or `data` lacks
    ///   `allocation_id`/`obj_id`
    async fn get_followup(&self, request_id: RequestId) -> PortalResult<FollowupState>;

    /// Replace a request's status.
    ///
    /// The returned envelope is passed back as-is; the caller decides whether
    /// an `error` status is a failure.
    async fn put_status(
        &self,
        request_id: RequestId,
        update: &StatusUpdate,
    ) -> PortalResult<ResponseEnvelope>;
}
