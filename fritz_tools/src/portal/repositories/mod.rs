//! Portal implementations.
//!
//! - `http`: the SkyPortal REST API
//! - `local`: in-memory portal for tests and dry runs

pub mod http;
pub mod local;

pub use http::HttpPortal;
pub use local::{LocalPortal, PortalCall};
