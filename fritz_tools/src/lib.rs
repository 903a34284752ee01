//! # fritz-tools
//!
//! Command-line utilities for a SkyPortal observation-tracking portal
//! (by default `https://fritz.science`).
//!
//! ## Binaries
//!
//! - `fritz-fillers`: make sure every target of a list exists as a source,
//!   then submit follow-up observation requests for it
//! - `status-updater`: move one follow-up request to a terminal status
//! - `make-pointing-schedule`: write a fixed alt/az pointing grid as CSV
//!
//! ## Architecture
//!
//! - [`models`]: portal payloads, target rows and identifiers
//! - [`parsing`]: target list CSV and sexagesimal coordinates
//! - [`portal`]: repository traits, HTTP and in-memory portals, configuration
//! - [`services`]: the workflows behind the binaries
//! - [`logging`]: subscriber setup for the binaries

// PortalError carries a structured context on every variant
#![allow(clippy::result_large_err)]

pub mod logging;
pub mod models;
pub mod parsing;
pub mod portal;
pub mod services;
