//! Source creation payloads.

use serde::Serialize;

use super::GroupId;
use crate::portal::repository::{ErrorContext, PortalError, PortalResult};

/// Group that fillers are registered under unless configured otherwise.
pub const DEFAULT_SOURCE_GROUP: GroupId = GroupId(1423);

/// Body of `POST /api/sources`.
///
/// Only constructible through [`SourceDraft::new`], which checks that the
/// coordinates are finite decimal degrees before anything is sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDraft {
    id: String,
    ra: f64,
    dec: f64,
    group_ids: Vec<GroupId>,
}

impl SourceDraft {
    pub fn new(
        id: impl Into<String>,
        ra: f64,
        dec: f64,
        group_ids: Vec<GroupId>,
    ) -> PortalResult<Self> {
        let id = id.into().trim().to_string();
        let context = || {
            ErrorContext::new("create_source")
                .with_entity("source")
                .with_entity_id(&id)
        };

        if id.is_empty() {
            return Err(PortalError::validation_with_context(
                "Source id must not be empty",
                context(),
            ));
        }
        if !ra.is_finite() || !dec.is_finite() {
            return Err(PortalError::validation_with_context(
                format!("RA and Dec must be finite degrees (got ra={}, dec={})", ra, dec),
                context(),
            ));
        }
        if !(0.0..360.0).contains(&ra) {
            return Err(PortalError::validation_with_context(
                format!("RA {} is outside [0, 360) degrees", ra),
                context(),
            ));
        }
        if !(-90.0..=90.0).contains(&dec) {
            return Err(PortalError::validation_with_context(
                format!("Dec {} is outside [-90, 90] degrees", dec),
                context(),
            ));
        }

        Ok(Self {
            id,
            ra,
            dec,
            group_ids,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ra(&self) -> f64 {
        self.ra
    }

    pub fn dec(&self) -> f64 {
        self.dec
    }

    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }
}

/// What the synchronizer did for one object id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    AlreadyExists,
    Created,
    CreateFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_draft_serializes_to_portal_shape() {
        let draft =
            SourceDraft::new("ZTF21abc", 150.25, -12.5, vec![DEFAULT_SOURCE_GROUP]).unwrap();
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id": "ZTF21abc", "ra": 150.25, "dec": -12.5, "group_ids": [1423]})
        );
    }

    #[test]
    fn test_source_draft_trims_id() {
        let draft = SourceDraft::new("  ZTF21abc ", 1.0, 2.0, vec![]).unwrap();
        assert_eq!(draft.id(), "ZTF21abc");
    }

    #[test]
    fn test_source_draft_rejects_non_finite() {
        for (ra, dec) in [(f64::NAN, 0.0), (0.0, f64::INFINITY), (f64::NEG_INFINITY, 1.0)] {
            let err = SourceDraft::new("x", ra, dec, vec![]).unwrap_err();
            assert!(matches!(err, PortalError::ValidationError { .. }));
        }
    }

    #[test]
    fn test_source_draft_rejects_out_of_range() {
        assert!(SourceDraft::new("x", 360.0, 0.0, vec![]).is_err());
        assert!(SourceDraft::new("x", -0.5, 0.0, vec![]).is_err());
        assert!(SourceDraft::new("x", 10.0, 90.5, vec![]).is_err());
        assert!(SourceDraft::new("x", 10.0, -90.0, vec![]).is_ok());
    }

    #[test]
    fn test_source_draft_rejects_empty_id() {
        let err = SourceDraft::new("   ", 10.0, 10.0, vec![]).unwrap_err();
        assert!(matches!(err, PortalError::ValidationError { .. }));
    }
}
