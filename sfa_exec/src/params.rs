//! Exec-level parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the executable itself.
#[derive(Clone, Debug, Deserialize)]
pub struct ExecParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Geodetic (latitude, longitude) of the home point
    pub home_latlon: [f64; 2],

    /// Mission file to load the safe path from, relative to the software
    /// root. No mission means the pilot flies uncorrected.
    pub mission_file: Option<String>,

    /// The scripted pilot input, flown segment by segment
    pub pilot_script: Vec<PilotSegment>,
}

/// One segment of the scripted pilot input: hold a command for a duration.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct PilotSegment {
    /// How long the command is held.
    ///
    /// Units: seconds
    pub duration_s: f64,

    /// The velocity command held over the segment
    pub cmd_ms: [f64; 3],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ExecParams {
    /// Get the scripted pilot command at the given flight time.
    ///
    /// Returns `None` once the script has run out, which signals the end of
    /// the flight.
    pub fn pilot_cmd_at(&self, flight_time_s: f64) -> Option<Vector3<f64>> {
        let mut segment_end_s = 0.0;

        for segment in &self.pilot_script {
            segment_end_s += segment.duration_s;

            if flight_time_s < segment_end_s {
                return Some(Vector3::new(
                    segment.cmd_ms[0],
                    segment.cmd_ms[1],
                    segment.cmd_ms[2],
                ));
            }
        }

        None
    }

    /// Total duration of the pilot script.
    pub fn script_duration_s(&self) -> f64 {
        self.pilot_script.iter().map(|s| s.duration_s).sum()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
