//! Vehicle module
//!
//! Defines the capability set the exec needs from a drone backend. The core
//! is polymorphic over this trait so the same control loop can drive the
//! simulated backend or real hardware. Every tick is a blocking
//! call-response: read state, compute, send command.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod sim;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::Serialize;

// Internal
pub use sim::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A snapshot of the vehicle's state, refreshed once per cycle.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct VehicleState {
    /// Position in the local metric frame
    pub position_m: Vector3<f64>,

    /// Velocity in the local metric frame
    pub velocity_ms: Vector3<f64>,

    /// Attitude in degrees
    pub pitch_deg: f64,
    pub roll_deg: f64,
    pub yaw_deg: f64,

    /// The current GPS fix, `None` when the backend has no fix
    pub gps: Option<GpsCoord>,
}

/// A geodetic GPS fix.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct GpsCoord {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Altitude in metres
    pub altitude: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised by a vehicle backend.
#[derive(Debug, thiserror::Error)]
pub enum VehicleError {
    #[error("Not connected to the vehicle")]
    NotConnected,

    #[error("The vehicle rejected the command: {0}")]
    CommandRejected(String),

    #[error("Lost the link to the vehicle: {0}")]
    LinkLost(String),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The capability set a drone backend must provide to the exec.
pub trait Vehicle {
    /// Connect to the backend (simulator link or real drone).
    fn connect(&mut self) -> Result<(), VehicleError>;

    /// Command the drone into the air.
    fn takeoff(&mut self) -> Result<(), VehicleError>;

    /// Command the drone to land.
    fn land(&mut self) -> Result<(), VehicleError>;

    /// Refresh and return the vehicle state.
    fn update(&mut self) -> Result<VehicleState, VehicleError>;

    /// Send a velocity command, applied over the given cycle duration.
    ///
    /// Backends ignore move commands while the drone is not in the air.
    fn move_cmd(&mut self, cmd_ms: &Vector3<f64>, delta_time_s: f64) -> Result<(), VehicleError>;
}
