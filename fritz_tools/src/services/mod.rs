//! Service layer for the command-line workflows.
//!
//! Services sit between the CLIs and the portal traits: they orchestrate
//! portal calls, apply the request policy and collect per-item outcomes.

pub mod filler_sync;
pub mod pointing_schedule;
pub mod status_update;
pub mod sync_report;

pub use filler_sync::{ensure_source, run_filler_sync, SyncOptions};
pub use pointing_schedule::{
    generate_pointing_schedule, write_pointing_schedule, write_pointing_schedule_file,
    PointingOptions, DEFAULT_OUTPUT,
};
pub use status_update::{
    merge_status_update, status_from_code, update_request_status, StatusOutcome, UpdateMode,
};
pub use sync_report::{ReportEntry, ReportLevel, SyncCounters, SyncReport};
