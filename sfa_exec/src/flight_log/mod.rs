//! Flight log module
//!
//! Records one flat row per control cycle while enabled, then on save writes
//! the rows to a CSV archive in the session directory and derives a summary
//! of the flight: time spent inside and outside the free and warning
//! corridors, corridor exit counts and durations, and distance statistics.
//!
//! Enabling the recorder starts a fresh sequence: the record buffer, the
//! running maxima and the flight-time epoch are all reset.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod record;
mod summary;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use log::{info, warn};

// Internal
pub use record::*;
pub use summary::*;

use crate::corr_ctrl;
use crate::vehicle::VehicleState;
use util::archive::Archiver;
use util::session::Session;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the CSV archive written into the session directory
const LOG_FILE_NAME: &str = "log.csv";

/// Name of the summary JSON written into the session directory
const SUMMARY_FILE_NAME: &str = "summary.json";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Flight log recorder.
pub struct FlightLog {
    /// True while recording
    enabled: bool,

    /// Start of the current recording sequence
    epoch: Option<DateTime<Utc>>,

    /// Records accumulated since the recorder was last enabled
    records: Vec<TickRecord>,

    /// Running maxima over the current sequence
    maxima: Maxima,

    /// Corridor thresholds used by the summary
    free_range_m: f64,
    warning_range_m: f64,
}

/// Running maxima carried between ticks.
#[derive(Clone, Copy, Debug, Default)]
struct Maxima {
    z_max: f64,
    vx_max: f64,
    vy_max: f64,
    vz_max: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur when saving the flight log.
#[derive(Debug, thiserror::Error)]
pub enum FlightLogError {
    #[error("Cannot write the flight log archive: {0}")]
    ArchiveWrite(Box<dyn std::error::Error + Send + Sync>),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FlightLog {
    /// Create a new disabled recorder with the given corridor thresholds.
    pub fn new(free_range_m: f64, warning_range_m: f64) -> Self {
        Self {
            enabled: false,
            epoch: None,
            records: Vec::new(),
            maxima: Maxima::default(),
            free_range_m,
            warning_range_m,
        }
    }

    /// Start a fresh recording sequence.
    ///
    /// Any previously recorded data is discarded and the flight-time epoch is
    /// reset to now.
    pub fn start(&mut self) {
        self.records.clear();
        self.maxima = Maxima::default();
        self.epoch = Some(Utc::now());
        self.enabled = true;

        info!("Flight log recording started");
    }

    /// Stop recording. Accumulated records are kept until the next `start`.
    pub fn stop(&mut self) {
        self.enabled = false;

        info!(
            "Flight log recording stopped with {} records",
            self.records.len()
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get the records accumulated so far.
    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    /// Record one control cycle. A no-op while the recorder is disabled.
    pub fn tick(&mut self, vehicle_state: &VehicleState, corr_output: &corr_ctrl::OutputData) {
        if !self.enabled {
            return;
        }

        let now = Utc::now();
        let fly_time_s = match self.epoch {
            Some(epoch) => match util::time::duration_to_seconds(now - epoch) {
                Some(s) => s,
                None => return,
            },
            None => return,
        };

        self.maxima.z_max = self.maxima.z_max.max(vehicle_state.position_m[2]);
        self.maxima.vx_max = self.maxima.vx_max.max(vehicle_state.velocity_ms[0]);
        self.maxima.vy_max = self.maxima.vy_max.max(vehicle_state.velocity_ms[1]);
        self.maxima.vz_max = self.maxima.vz_max.max(vehicle_state.velocity_ms[2]);

        self.records.push(TickRecord::new(
            &now,
            fly_time_s,
            vehicle_state,
            corr_output,
            self.maxima.z_max,
            [self.maxima.vx_max, self.maxima.vy_max, self.maxima.vz_max],
        ));
    }

    /// Write the CSV archive and the summary into the session directory.
    ///
    /// The summary is skipped when the recorded distance data is empty, in
    /// which case only the archive is written.
    pub fn save(&self, session: &Session) -> Result<(), FlightLogError> {
        let mut archiver =
            Archiver::from_path(session, LOG_FILE_NAME).map_err(FlightLogError::ArchiveWrite)?;

        for record in &self.records {
            archiver
                .serialise(record)
                .map_err(FlightLogError::ArchiveWrite)?;
        }

        info!(
            "Flight log archive written ({} records)",
            self.records.len()
        );

        let dists: Vec<f64> = self.records.iter().map(|r| r.d).collect();
        let times: Vec<f64> = self.records.iter().map(|r| r.fly_time_s).collect();

        match Summary::build(&dists, &times, self.free_range_m, self.warning_range_m) {
            Some(summary) => session.save(SUMMARY_FILE_NAME, summary),
            None => warn!("No path distance data in the flight log, skipping summary"),
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::corr_ctrl::OutputData;
    use nalgebra::Vector3;

    fn vehicle_state(pos: [f64; 3], vel: [f64; 3]) -> VehicleState {
        VehicleState {
            position_m: Vector3::new(pos[0], pos[1], pos[2]),
            velocity_ms: Vector3::new(vel[0], vel[1], vel[2]),
            ..VehicleState::default()
        }
    }

    #[test]
    fn test_disabled_recorder_drops_ticks() {
        let mut flight_log = FlightLog::new(1.0, 2.0);

        flight_log.tick(
            &vehicle_state([1.0, 2.0, 3.0], [0.0, 0.0, 0.0]),
            &OutputData::default(),
        );

        assert!(flight_log.records().is_empty());
    }

    #[test]
    fn test_restart_resets_sequence() {
        let mut flight_log = FlightLog::new(1.0, 2.0);

        flight_log.start();
        flight_log.tick(
            &vehicle_state([0.0, 0.0, 10.0], [3.0, 0.0, 0.0]),
            &OutputData::default(),
        );
        flight_log.tick(
            &vehicle_state([1.0, 0.0, 12.0], [1.0, 0.0, 0.0]),
            &OutputData::default(),
        );
        flight_log.stop();

        assert_eq!(flight_log.records().len(), 2);
        assert_eq!(flight_log.records()[1].z_max, 12.0);
        assert_eq!(flight_log.records()[1].vx_max, 3.0);

        // Starting again discards the old sequence and its maxima
        flight_log.start();
        assert!(flight_log.records().is_empty());

        flight_log.tick(
            &vehicle_state([0.0, 0.0, 5.0], [1.0, 0.0, 0.0]),
            &OutputData::default(),
        );

        assert_eq!(flight_log.records().len(), 1);
        assert_eq!(flight_log.records()[0].z_max, 5.0);
        assert_eq!(flight_log.records()[0].vx_max, 1.0);
    }

    #[test]
    fn test_maxima_track_peaks_not_latest() {
        let mut flight_log = FlightLog::new(1.0, 2.0);
        flight_log.start();

        flight_log.tick(
            &vehicle_state([0.0, 0.0, 20.0], [5.0, 4.0, 3.0]),
            &OutputData::default(),
        );
        flight_log.tick(
            &vehicle_state([0.0, 0.0, 2.0], [1.0, 1.0, 1.0]),
            &OutputData::default(),
        );

        let last = &flight_log.records()[1];
        assert_eq!(last.z, 2.0);
        assert_eq!(last.z_max, 20.0);
        assert_eq!(last.vx_max, 5.0);
        assert_eq!(last.vy_max, 4.0);
        assert_eq!(last.vz_max, 3.0);
    }
}
