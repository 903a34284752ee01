//! Target list ingestion.
//!
//! The list is a headed CSV with the columns
//! `object_id, ra, dec, exposure_time, requester, observation_choice`
//! in any order. Extra columns are ignored and `observation_choice` may be
//! left out entirely when the list only holds filler rows.
//!
//! A missing required column rejects the whole file. Problems inside a row
//! are kept on that row so the caller can report it and move on.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::models::{Requester, TargetRecord};
use crate::portal::repository::{ErrorContext, PortalError, PortalResult};

const REQUIRED_COLUMNS: [&str; 5] = ["object_id", "ra", "dec", "exposure_time", "requester"];
const CHOICE_COLUMN: &str = "observation_choice";

/// A parsed data row, or the reason it could not be parsed.
#[derive(Debug)]
pub struct TargetRow {
    /// 1-based data row number, header excluded.
    pub row: usize,
    pub record: PortalResult<TargetRecord>,
}

struct ColumnIndex {
    object_id: usize,
    ra: usize,
    dec: usize,
    exposure_time: usize,
    requester: usize,
    observation_choice: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> PortalResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| find(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(PortalError::format_with_context(
                format!("Target list is missing column(s): {}", missing.join(", ")),
                ErrorContext::new("parse_targets").with_entity("target_list"),
            ));
        }

        // all required columns were found above
        let required = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            object_id: required("object_id"),
            ra: required("ra"),
            dec: required("dec"),
            exposure_time: required("exposure_time"),
            requester: required("requester"),
            observation_choice: find(CHOICE_COLUMN),
        })
    }

    fn record(&self, row: &StringRecord) -> PortalResult<TargetRecord> {
        let field = |idx: usize| row.get(idx).unwrap_or("").trim();

        let object_id = field(self.object_id);
        if object_id.is_empty() {
            return Err(PortalError::format("Empty object_id"));
        }

        let exposure_text = field(self.exposure_time);
        let exposure_time = exposure_text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| {
                PortalError::format(format!(
                    "Invalid exposure_time '{}' for {}",
                    exposure_text, object_id
                ))
            })?;

        let requester: Requester = field(self.requester).parse()?;

        let observation_choice = self
            .observation_choice
            .map(field)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(TargetRecord {
            object_id: object_id.to_string(),
            ra: field(self.ra).to_string(),
            dec: field(self.dec).to_string(),
            exposure_time,
            requester,
            observation_choice,
        })
    }
}

/// Parse a target list file.
pub fn parse_targets_csv(path: impl AsRef<Path>) -> PortalResult<Vec<TargetRow>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        PortalError::configuration(format!(
            "Cannot open target list {}: {}",
            path.display(),
            e
        ))
    })?;
    let rows = parse_targets_reader(file)?;
    info!("Read {} target rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Parse a target list from any reader.
pub fn parse_targets_reader<R: Read>(reader: R) -> PortalResult<Vec<TargetRow>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let row = idx + 1;
        let record = result
            .map_err(PortalError::from)
            .and_then(|r| columns.record(&r))
            .map_err(|e| e.with_operation("parse_targets").with_entity_id(row.to_string()));

        if let Err(err) = &record {
            debug!("Target row {} rejected: {}", row, err);
        }
        rows.push(TargetRow { row, record });
    }

    Ok(rows)
}
