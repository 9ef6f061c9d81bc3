//! Parameters structure for CorrCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for correction control.
#[derive(Clone, Debug, Deserialize)]
pub struct Params {
    // ---- ZONES ----
    /// Distance from the path inside which no correction is applied.
    ///
    /// Units: metres
    pub free_range_m: f64,

    /// Distance from the path beyond which the drone is counted as outside
    /// the warning zone.
    ///
    /// Units: metres
    pub warning_range_m: f64,

    // ---- PREDICTION ----
    /// How far ahead the predicted position is extrapolated along the
    /// current velocity.
    ///
    /// Units: seconds
    pub lookahead_s: f64,

    // ---- BLEND GAINS ----
    /// Gain applied to the pilot's raw command in the blend
    pub gain_cmd: f64,

    /// Gain applied to the present-position correction in the blend
    pub gain_present_corr: f64,

    /// Gain applied to the predicted-position correction in the blend
    pub gain_future_corr: f64,

    // ---- PENALTY SHAPE ----
    /// Distance subtracted from the penalty input before cubing.
    ///
    /// Units: metres
    pub penalty_shift_m: f64,

    /// Divisor applied to the cubed term of the penalty
    pub penalty_divisor: f64,

    /// Constant added to the penalty outside the free range
    pub penalty_offset: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            free_range_m: 1.0,
            warning_range_m: 2.0,
            lookahead_s: 2.0,
            gain_cmd: 1.0,
            gain_present_corr: 1.0,
            gain_future_corr: 5.0,
            penalty_shift_m: 2.0,
            penalty_divisor: 10.0,
            penalty_offset: 0.5,
        }
    }
}
