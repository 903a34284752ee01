//! Input parsing: target lists and sexagesimal coordinates.

pub mod sexagesimal;
pub mod target_csv;

pub use sexagesimal::{parse_dec_dms, parse_ra_hms};
pub use target_csv::{parse_targets_csv, parse_targets_reader, TargetRow};
