//! Fixed alt/az pointing schedule.
//!
//! A grid of azimuths 0..=350 (step 10, outer loop) by altitudes 30..=80
//! (step 10, inner loop), numbered from 0 in emission order.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use tracing::info;

use crate::models::PointingRow;
use crate::portal::repository::{PortalError, PortalResult};

pub const DEFAULT_OUTPUT: &str = "fixed_schedule.csv";

const AZIMUTHS: std::ops::RangeInclusive<u32> = 0..=350;
const ALTITUDES: std::ops::RangeInclusive<u32> = 30..=80;
const GRID_STEP: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PointingOptions {
    pub requester: String,
    pub group_id: String,
    pub object_prefix: String,
    pub epoch: String,
    pub exposure_time: f64,
    pub observation_choice: String,
}

impl Default for PointingOptions {
    fn default() -> Self {
        Self {
            requester: "point".to_string(),
            group_id: "999".to_string(),
            object_prefix: "point_".to_string(),
            epoch: "2000".to_string(),
            exposure_time: 70.0,
            observation_choice: "cl".to_string(),
        }
    }
}

pub fn generate_pointing_schedule(options: &PointingOptions) -> Vec<PointingRow> {
    let mut rows = Vec::new();
    let mut count: u32 = 0;

    for az in AZIMUTHS.step_by(GRID_STEP) {
        for alt in ALTITUDES.step_by(GRID_STEP) {
            rows.push(PointingRow {
                requester: options.requester.clone(),
                group_id: options.group_id.clone(),
                object_id: format!("{}{}", options.object_prefix, count),
                request_id: count,
                az,
                alt,
                epoch: options.epoch.clone(),
                exposure_time: options.exposure_time,
                observation_choice: options.observation_choice.clone(),
            });
            count += 1;
        }
    }
    rows
}

/// Write rows as CSV with a header line.
pub fn write_pointing_schedule<W: Write>(rows: &[PointingRow], writer: W) -> PortalResult<()> {
    let mut csv_writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer
        .flush()
        .map_err(|e| PortalError::format(format!("Failed to write schedule: {}", e)))?;
    Ok(())
}

/// Generate the schedule and write it to `path`.
pub fn write_pointing_schedule_file(options: &PointingOptions, path: &Path) -> PortalResult<usize> {
    let rows = generate_pointing_schedule(options);
    let file = File::create(path).map_err(|e| {
        PortalError::configuration(format!("Cannot create {}: {}", path.display(), e))
    })?;
    write_pointing_schedule(&rows, file)?;
    info!("Wrote {} pointings to {}", rows.len(), path.display());
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_size_and_order() {
        let rows = generate_pointing_schedule(&PointingOptions::default());
        assert_eq!(rows.len(), 216);

        assert_eq!((rows[0].az, rows[0].alt), (0, 30));
        assert_eq!((rows[5].az, rows[5].alt), (0, 80));
        assert_eq!((rows[6].az, rows[6].alt), (10, 30));
        assert_eq!((rows[215].az, rows[215].alt), (350, 80));

        for (n, row) in rows.iter().enumerate() {
            assert_eq!(row.request_id as usize, n);
            assert_eq!(row.object_id, format!("point_{}", n));
        }
    }

    #[test]
    fn test_csv_output() {
        let rows = generate_pointing_schedule(&PointingOptions::default());
        let mut buf = Vec::new();
        write_pointing_schedule(&rows[..2], &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "requester,group_id,object_id,request_id,az,alt,epoch,exposure_time,observation_choice"
        );
        assert_eq!(lines[1], "point,999,point_0,0,0,30,2000,70.0,cl");
        assert_eq!(lines[2], "point,999,point_1,1,0,40,2000,70.0,cl");
    }

    #[test]
    fn test_options_override_defaults() {
        let options = PointingOptions {
            exposure_time: 30.0,
            observation_choice: "r".to_string(),
            ..Default::default()
        };
        let rows = generate_pointing_schedule(&options);
        assert!(rows.iter().all(|r| r.exposure_time == 30.0 && r.observation_choice == "r"));
    }
}
