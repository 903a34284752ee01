//! Repository traits for the portal's remote operations.
//!
//! The portal surface is split into two focused traits so each workflow only
//! depends on what it uses:
//!
//! - [`error`]: Error types shared by every portal operation
//! - [`source`]: Source existence checks and creation
//! - [`followup`]: Follow-up request submission, lookup and status updates
//!
//! # Convenience Trait Bound
//!
//! The filler workflow needs both halves; use [`FullPortal`]:
//!
//! ```ignore
//! async fn sync<P: FullPortal + ?Sized>(portal: &P, draft: &SourceDraft) -> PortalResult<()> {
//!     if !portal.source_exists(draft.id()).await {
//!         portal.create_source(draft).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod followup;
pub mod source;

pub use error::{ErrorContext, PortalError, PortalResult};

pub use followup::FollowupRepository;
pub use source::SourceRepository;

/// Composite trait bound for a complete portal implementation.
///
/// Automatically implemented for any type that implements both
/// [`SourceRepository`] and [`FollowupRepository`].
pub trait FullPortal: SourceRepository + FollowupRepository {}

impl<T> FullPortal for T where T: SourceRepository + FollowupRepository {}
