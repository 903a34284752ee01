//! Access to the observation-tracking portal.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  CLIs (fritz-fillers, status-updater)                   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Services (filler_sync, status_update)                  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (SourceRepository, FollowupRepository)│
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴───────────────┐
//!     │ HttpPortal       LocalPortal  │
//!     │ (reqwest)        (in-memory)  │
//!     └───────────────────────────────┘
//! ```
//!
//! Configuration is explicit: [`PortalSettings`] is read from `fritz.toml`,
//! combined with command-line overrides into a [`PortalConfig`], and handed to
//! the [`PortalFactory`]. Nothing is kept in globals.

pub mod config;
pub mod factory;
pub mod repositories;
pub mod repository;
pub mod settings;

pub use config::{resolve_token, PortalConfig, Token, DEFAULT_HOST, TOKEN_FILE_NAME};
pub use factory::{PortalFactory, PortalKind};
pub use repositories::{HttpPortal, LocalPortal, PortalCall};
pub use repository::{
    ErrorContext, FollowupRepository, FullPortal, PortalError, PortalResult, SourceRepository,
};
pub use settings::PortalSettings;
