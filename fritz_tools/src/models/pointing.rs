use serde::{Deserialize, Serialize};

/// One line of the fixed alt/az pointing schedule.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointingRow {
    pub requester: String,
    pub group_id: String,
    pub object_id: String,
    pub request_id: u32,
    /// Azimuth, degrees
    pub az: u32,
    /// Altitude, degrees
    pub alt: u32,
    pub epoch: String,
    /// Seconds
    pub exposure_time: f64,
    pub observation_choice: String,
}
