//! Source repository trait.

use async_trait::async_trait;

use super::error::PortalResult;
use crate::models::SourceDraft;

/// Operations on portal sources.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Check whether a source exists.
    ///
    /// # Returns
    /// `true` only when the portal answers the lookup with HTTP 200. Every
    /// other status and every transport failure reads as `false`, so an
    /// unreachable portal looks the same as a missing source.
    async fn source_exists(&self, object_id: &str) -> bool;

    /// Create a source.
    ///
    /// # Returns
    /// * `Ok(true)` - The portal accepted the source (HTTP 200)
    /// * `Ok(false)` - The portal answered with any other status
    /// * `Err(PortalError)` - The request could not be sent
    async fn create_source(&self, draft: &SourceDraft) -> PortalResult<bool>;
}
