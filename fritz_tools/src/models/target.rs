//! Target list rows and the requester kinds that drive request submission.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::parsing::sexagesimal::{parse_dec_dms, parse_ra_hms};
use crate::portal::repository::{ErrorContext, PortalError, PortalResult};

/// Who asked for the observations of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Requester {
    /// `cal`: one request with the row's own observation choice.
    #[serde(rename = "cal")]
    Calibration,
    /// `fil`: low-priority filler, one request per photometric band.
    #[serde(rename = "fil")]
    Filler,
}

impl Requester {
    pub fn as_str(&self) -> &'static str {
        match self {
            Requester::Calibration => "cal",
            Requester::Filler => "fil",
        }
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Requester {
    type Err = PortalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cal" => Ok(Self::Calibration),
            "fil" => Ok(Self::Filler),
            other => Err(PortalError::format(format!(
                "Unknown requester '{}', expected 'cal' or 'fil'",
                other
            ))),
        }
    }
}

/// One row of the target list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub object_id: String,
    /// Right ascension, sexagesimal hours
    pub ra: String,
    /// Declination, sexagesimal degrees
    pub dec: String,
    /// Seconds
    pub exposure_time: f64,
    pub requester: Requester,
    pub observation_choice: Option<String>,
}

impl TargetRecord {
    /// Convert the row's sexagesimal coordinates to decimal degrees `(ra, dec)`.
    pub fn coordinates(&self) -> PortalResult<(f64, f64)> {
        let context = || {
            ErrorContext::new("convert_coordinates")
                .with_entity("target")
                .with_entity_id(&self.object_id)
        };
        let ra = parse_ra_hms(&self.ra)
            .map_err(|e| PortalError::format_with_context(e.message().to_string(), context()))?;
        let dec = parse_dec_dms(&self.dec)
            .map_err(|e| PortalError::format_with_context(e.message().to_string(), context()))?;
        Ok((ra, dec))
    }
}
