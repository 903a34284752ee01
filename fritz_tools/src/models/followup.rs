//! Follow-up request payloads, request statuses and status updates.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::envelope::EnvelopeStatus;
use super::{AllocationId, GroupId, RequestId, Requester, ResponseEnvelope, TargetRecord};
use crate::portal::repository::{ErrorContext, PortalError, PortalResult};

/// Spectroscopic mode; everything else is a photometric band.
pub const IFU_CHOICE: &str = "IFU";
/// Bands a filler target is requested in, one request each.
pub const FILLER_BANDS: [&str; 4] = ["g", "r", "i", "z"];
/// Per-frame exposure for photometric observations of variable targets, in seconds.
pub const VARIABLE_FRAME_EXPOSURE: u32 = 10;
pub const MAXIMUM_AIRMASS: f64 = 3.0;
/// Degrees
pub const MINIMUM_LUNAR_DISTANCE: u32 = 30;
pub const TOO_FLAG: &str = "N";
pub const VALIDITY_YEARS: i64 = 5;

const JULIAN_YEAR_MINUTES: i64 = 525_960; // 365.25 d
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Start of the validity window of every filler request (2023-06-01T00:00:00).
pub fn validity_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// `(start, end)` of the request validity window, formatted as ISO timestamps.
///
/// The end lies five Julian years after the start.
pub fn validity_window() -> (String, String) {
    let start = validity_start();
    let end = start + Duration::minutes(VALIDITY_YEARS * JULIAN_YEAR_MINUTES);
    (
        start.format(TIMESTAMP_FORMAT).to_string(),
        end.format(TIMESTAMP_FORMAT).to_string(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationType {
    Transient,
    Variable,
}

impl fmt::Display for ObservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationType::Transient => f.write_str("transient"),
            ObservationType::Variable => f.write_str("variable"),
        }
    }
}

/// Lifecycle status of a follow-up request.
///
/// Serialized as the portal's status strings; unknown strings are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
    Submitted,
    Complete,
    Interrupted,
    Skipped,
    Other(String),
}

impl RequestStatus {
    /// Translate an operator status code: 0 → Complete, 1 → Interrupted, 2 → Skipped.
    pub fn from_code(code: i64) -> PortalResult<Self> {
        match code {
            0 => Ok(Self::Complete),
            1 => Ok(Self::Interrupted),
            2 => Ok(Self::Skipped),
            other => Err(PortalError::validation_with_context(
                format!(
                    "Invalid status code {}; use 0 (Complete), 1 (Interrupted) or 2 (Skipped)",
                    other
                ),
                ErrorContext::new("status_from_code"),
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Submitted => "submitted",
            Self::Complete => "Complete",
            Self::Interrupted => "Interrupted",
            Self::Skipped => "Skipped",
            Self::Other(s) => s,
        }
    }

    /// Whether the request has reached an end state the updater may write.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Interrupted | Self::Skipped)
    }
}

impl From<String> for RequestStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "submitted" => Self::Submitted,
            "Complete" => Self::Complete,
            "Interrupted" => Self::Interrupted,
            "Skipped" => Self::Skipped,
            _ => Self::Other(s),
        }
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group, allocation and priority stamped onto every submitted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDefaults {
    pub group_id: GroupId,
    pub allocation_id: AllocationId,
    pub priority: i64,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            group_id: GroupId(1423),
            allocation_id: AllocationId(1050),
            priority: 0,
        }
    }
}

/// Observation parameters of a follow-up request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationPayload {
    pub priority: i64,
    pub start_date: String,
    pub end_date: String,
    pub observation_type: ObservationType,
    pub exposure_time: f64,
    pub observation_choice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_exposure_time: Option<u32>,
    pub maximum_airmass: f64,
    pub too: String,
    pub minimum_lunar_distance: u32,
}

/// Body of `POST /api/followup_request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowupRequest {
    pub obj_id: String,
    pub target_group_ids: Vec<GroupId>,
    pub allocation_id: AllocationId,
    pub status: RequestStatus,
    pub payload: ObservationPayload,
}

/// Build the request for one observation choice of one object.
///
/// IFU observations are always `transient` and carry no per-frame exposure; photometric
/// observations of `variable` targets use [`VARIABLE_FRAME_EXPOSURE`].
pub fn build_followup_request(
    object_id: &str,
    exposure_time: f64,
    observation_choice: &str,
    observation_type: ObservationType,
    defaults: &RequestDefaults,
) -> FollowupRequest {
    let (start_date, end_date) = validity_window();

    let (observation_type, frame_exposure_time) = if observation_choice == IFU_CHOICE {
        (ObservationType::Transient, None)
    } else if observation_type == ObservationType::Variable {
        (observation_type, Some(VARIABLE_FRAME_EXPOSURE))
    } else {
        (observation_type, None)
    };

    FollowupRequest {
        obj_id: object_id.to_string(),
        target_group_ids: vec![defaults.group_id],
        allocation_id: defaults.allocation_id,
        status: RequestStatus::Submitted,
        payload: ObservationPayload {
            priority: defaults.priority,
            start_date,
            end_date,
            observation_type,
            exposure_time,
            observation_choice: observation_choice.to_string(),
            frame_exposure_time,
            maximum_airmass: MAXIMUM_AIRMASS,
            too: TOO_FLAG.to_string(),
            minimum_lunar_distance: MINIMUM_LUNAR_DISTANCE,
        },
    }
}

/// Observation type and the list of choices to request for a target row.
pub fn observation_plan(record: &TargetRecord) -> PortalResult<(ObservationType, Vec<String>)> {
    match record.requester {
        Requester::Calibration => {
            let choice = record
                .observation_choice
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| {
                    PortalError::validation_with_context(
                        "Calibration targets need an observation_choice",
                        ErrorContext::new("observation_plan")
                            .with_entity("target")
                            .with_entity_id(&record.object_id),
                    )
                })?;
            Ok((ObservationType::Transient, vec![choice.to_string()]))
        }
        Requester::Filler => Ok((
            ObservationType::Variable,
            FILLER_BANDS.iter().map(|b| b.to_string()).collect(),
        )),
    }
}

/// Fields of a stored request that a status update must repeat.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowupState {
    pub request_id: RequestId,
    pub allocation_id: AllocationId,
    pub obj_id: String,
    pub status: Option<RequestStatus>,
}

impl FollowupState {
    /// Extract the request state from a `GET /api/followup_request/{id}` envelope.
    ///
    /// An error envelope or an envelope without data means the request does not exist.
    pub fn from_envelope(request_id: RequestId, envelope: ResponseEnvelope) -> PortalResult<Self> {
        let context = || {
            ErrorContext::new("get_followup")
                .with_entity("followup_request")
                .with_entity_id(request_id)
        };

        if envelope.status == EnvelopeStatus::Error {
            return Err(PortalError::not_found_with_context(
                envelope.message_or_default().to_string(),
                context(),
            ));
        }
        let data = match envelope.data {
            Some(data) if !data.is_empty() => data,
            _ => {
                return Err(PortalError::not_found_with_context(
                    "Portal returned no data for the request",
                    context(),
                ))
            }
        };

        let allocation_id = allocation_id_field(&data).ok_or_else(|| {
            PortalError::format_with_context(
                "Request data has no usable 'allocation_id'",
                context(),
            )
        })?;
        let obj_id = data
            .get("obj_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                PortalError::format_with_context("Request data has no 'obj_id'", context())
            })?;
        let status = data
            .get("status")
            .and_then(Value::as_str)
            .map(|s| RequestStatus::from(s.to_string()));

        Ok(Self {
            request_id,
            allocation_id,
            obj_id,
            status,
        })
    }
}

fn allocation_id_field(data: &Map<String, Value>) -> Option<AllocationId> {
    match data.get("allocation_id")? {
        Value::Number(n) => n.as_i64().map(AllocationId),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Body of `PUT /api/followup_request/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub allocation_id: AllocationId,
    pub obj_id: String,
    pub status: RequestStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_window() {
        let (start, end) = validity_window();
        assert_eq!(start, "2023-06-01T00:00:00.000");
        assert_eq!(end, "2028-05-31T06:00:00.000");
    }

    #[test]
    fn test_ifu_forces_transient_without_frame_exposure() {
        let req = build_followup_request(
            "ZTF21abc",
            1800.0,
            "IFU",
            ObservationType::Variable,
            &RequestDefaults::default(),
        );
        assert_eq!(req.payload.observation_type, ObservationType::Transient);
        assert!(req.payload.frame_exposure_time.is_none());

        let value = serde_json::to_value(&req).unwrap();
        assert!(value["payload"].get("frame_exposure_time").is_none());
        assert_eq!(value["payload"]["observation_type"], "transient");
    }

    #[test]
    fn test_variable_photometry_sets_frame_exposure() {
        let req = build_followup_request(
            "ZTF21abc",
            300.0,
            "r",
            ObservationType::Variable,
            &RequestDefaults::default(),
        );
        assert_eq!(req.payload.frame_exposure_time, Some(10));
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["payload"]["frame_exposure_time"], 10);
    }

    #[test]
    fn test_transient_photometry_has_no_frame_exposure() {
        let req = build_followup_request(
            "ZTF21abc",
            300.0,
            "g",
            ObservationType::Transient,
            &RequestDefaults::default(),
        );
        assert!(req.payload.frame_exposure_time.is_none());
    }

    #[test]
    fn test_request_shape_and_policy_constants() {
        let req = build_followup_request(
            "ZTF21abc",
            300.0,
            "g",
            ObservationType::Variable,
            &RequestDefaults::default(),
        );
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["obj_id"], "ZTF21abc");
        assert_eq!(value["target_group_ids"], serde_json::json!([1423]));
        assert_eq!(value["allocation_id"], 1050);
        assert_eq!(value["status"], "submitted");
        assert_eq!(value["payload"]["priority"], 0);
        assert_eq!(value["payload"]["maximum_airmass"], 3.0);
        assert_eq!(value["payload"]["too"], "N");
        assert_eq!(value["payload"]["minimum_lunar_distance"], 30);
        assert_eq!(value["payload"]["exposure_time"], 300.0);
        assert_eq!(value["payload"]["start_date"], "2023-06-01T00:00:00.000");
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(RequestStatus::from_code(0).unwrap(), RequestStatus::Complete);
        assert_eq!(RequestStatus::from_code(1).unwrap(), RequestStatus::Interrupted);
        assert_eq!(RequestStatus::from_code(2).unwrap(), RequestStatus::Skipped);
        for code in [-1, 3, 42, i64::MAX] {
            assert!(matches!(
                RequestStatus::from_code(code),
                Err(PortalError::ValidationError { .. })
            ));
        }
    }

    #[test]
    fn test_status_serde_roundtrip_keeps_unknown() {
        let status: RequestStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, RequestStatus::Other("pending".to_string()));
        assert_eq!(serde_json::to_string(&RequestStatus::Complete).unwrap(), "\"Complete\"");
    }

    #[test]
    fn test_observation_plan() {
        let mut record = TargetRecord {
            object_id: "ZTF21abc".to_string(),
            ra: "00:00:00".to_string(),
            dec: "00:00:00".to_string(),
            exposure_time: 60.0,
            requester: Requester::Filler,
            observation_choice: None,
        };
        let (kind, choices) = observation_plan(&record).unwrap();
        assert_eq!(kind, ObservationType::Variable);
        assert_eq!(choices, vec!["g", "r", "i", "z"]);

        record.requester = Requester::Calibration;
        assert!(observation_plan(&record).is_err());

        record.observation_choice = Some("IFU".to_string());
        let (kind, choices) = observation_plan(&record).unwrap();
        assert_eq!(kind, ObservationType::Transient);
        assert_eq!(choices, vec!["IFU"]);
    }

    #[test]
    fn test_state_from_envelope() {
        let env = ResponseEnvelope::parse(
            r#"{"status":"success","data":{"allocation_id":7,"obj_id":"ZTF21abc","status":"submitted"}}"#,
        )
        .unwrap();
        let state = FollowupState::from_envelope(RequestId(5), env).unwrap();
        assert_eq!(state.allocation_id, AllocationId(7));
        assert_eq!(state.obj_id, "ZTF21abc");
        assert_eq!(state.status, Some(RequestStatus::Submitted));
    }

    #[test]
    fn test_state_from_error_envelope_is_not_found() {
        let env = ResponseEnvelope::error("Could not find request");
        let err = FollowupState::from_envelope(RequestId(5), env).unwrap_err();
        assert!(matches!(err, PortalError::NotFound { .. }));
        assert_eq!(err.message(), "Could not find request");
    }

    #[test]
    fn test_state_missing_fields_is_format_error() {
        let env = ResponseEnvelope::parse(r#"{"status":"success","data":{"obj_id":"ZTF21abc"}}"#)
            .unwrap();
        let err = FollowupState::from_envelope(RequestId(5), env).unwrap_err();
        assert!(matches!(err, PortalError::FormatError { .. }));
    }

    #[test]
    fn test_status_update_body_order() {
        let update = StatusUpdate {
            allocation_id: AllocationId(7),
            obj_id: "ZTF21abc".to_string(),
            status: RequestStatus::Complete,
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"allocation_id":7,"obj_id":"ZTF21abc","status":"Complete"}"#
        );
    }
}
