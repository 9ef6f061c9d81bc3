//! Flight log record structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use serde::Serialize;

// Internal
use crate::corr_ctrl;
use crate::vehicle::VehicleState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One row of the flight log CSV.
///
/// Field order is the column order of the archive and is fixed for
/// compatibility with existing analysis tooling, so do not reorder.
#[derive(Clone, Debug, Serialize)]
pub struct TickRecord {
    /// Date of the sample, `DD/MM/YYYY`
    pub date: String,

    /// Wall clock time of the sample, `HH:MM:SS`
    pub fly_time: String,

    /// Seconds since the recording sequence started
    pub fly_time_s: f64,

    // Position
    pub x: f64,
    pub y: f64,
    pub z: f64,

    /// Highest altitude reached so far in this sequence
    pub z_max: f64,

    // Velocity
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,

    // Running velocity maxima
    pub vx_max: f64,
    pub vy_max: f64,
    pub vz_max: f64,

    // GPS fix, zeroed when no fix is available
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,

    // Attitude
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,

    // The pilot's raw command
    pub cx: f64,
    pub cy: f64,
    pub cz: f64,

    // The blended safe command
    pub scx: f64,
    pub scy: f64,
    pub scz: f64,

    /// Distance from the safe path
    pub d: f64,

    // Vector from the drone to the nearest point on the path
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,

    // Gain-weighted blend components
    pub gc_pow_x: f64,
    pub gc_pow_y: f64,
    pub gc_pow_z: f64,
    pub gpc_pow_x: f64,
    pub gpc_pow_y: f64,
    pub gpc_pow_z: f64,
    pub gfc_pow_x: f64,
    pub gfc_pow_y: f64,
    pub gfc_pow_z: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TickRecord {
    /// Build a record from this cycle's vehicle state and corrector output.
    pub(crate) fn new(
        now: &DateTime<Utc>,
        fly_time_s: f64,
        vehicle_state: &VehicleState,
        corr_output: &corr_ctrl::OutputData,
        z_max: f64,
        v_max: [f64; 3],
    ) -> Self {
        let (latitude, longitude, altitude) = match vehicle_state.gps {
            Some(ref gps) => (gps.latitude, gps.longitude, gps.altitude),
            None => (0.0, 0.0, 0.0),
        };

        let (d, dx, dy, dz) = match corr_output.present_nearest {
            Some(nearest) => {
                let to_path = nearest.point_m - vehicle_state.position_m;
                (nearest.dist_m, to_path[0], to_path[1], to_path[2])
            }
            None => (0.0, 0.0, 0.0, 0.0),
        };

        Self {
            date: now.format("%d/%m/%Y").to_string(),
            fly_time: now.format("%H:%M:%S").to_string(),
            fly_time_s,

            x: vehicle_state.position_m[0],
            y: vehicle_state.position_m[1],
            z: vehicle_state.position_m[2],
            z_max,

            vx: vehicle_state.velocity_ms[0],
            vy: vehicle_state.velocity_ms[1],
            vz: vehicle_state.velocity_ms[2],
            vx_max: v_max[0],
            vy_max: v_max[1],
            vz_max: v_max[2],

            latitude,
            longitude,
            altitude,

            pitch: vehicle_state.pitch_deg,
            roll: vehicle_state.roll_deg,
            yaw: vehicle_state.yaw_deg,

            cx: corr_output.pilot_cmd[0],
            cy: corr_output.pilot_cmd[1],
            cz: corr_output.pilot_cmd[2],

            scx: corr_output.safe_cmd[0],
            scy: corr_output.safe_cmd[1],
            scz: corr_output.safe_cmd[2],

            d,
            dx,
            dy,
            dz,

            gc_pow_x: corr_output.cmd_component[0],
            gc_pow_y: corr_output.cmd_component[1],
            gc_pow_z: corr_output.cmd_component[2],
            gpc_pow_x: corr_output.present_corr_component[0],
            gpc_pow_y: corr_output.present_corr_component[1],
            gpc_pow_z: corr_output.present_corr_component[2],
            gfc_pow_x: corr_output.future_corr_component[0],
            gfc_pow_y: corr_output.future_corr_component[1],
            gfc_pow_z: corr_output.future_corr_component[2],
        }
    }
}
