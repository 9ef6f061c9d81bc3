//! Simulated vehicle backend
//!
//! A minimal kinematic model: velocity commands are applied directly, with
//! position integrated over the cycle duration. Good enough to exercise the
//! full control pipeline without an external simulator on the other end of
//! the link.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use nalgebra::Vector3;

// Internal
use super::{GpsCoord, Vehicle, VehicleError, VehicleState};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Metres per degree of latitude, flat earth approximation around the home
/// point.
const M_PER_DEG_LAT: f64 = 111_320.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated drone backend.
pub struct SimVehicle {
    /// Geodetic (latitude, longitude) of the home point, the origin of the
    /// local metric frame
    home_latlon: [f64; 2],

    connected: bool,
    in_air: bool,

    position_m: Vector3<f64>,
    velocity_ms: Vector3<f64>,
    yaw_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimVehicle {
    /// Create a new disconnected simulated drone homed at the given geodetic
    /// coordinates.
    pub fn new(home_latlon: [f64; 2]) -> Self {
        Self {
            home_latlon,
            connected: false,
            in_air: false,
            position_m: Vector3::zeros(),
            velocity_ms: Vector3::zeros(),
            yaw_deg: 0.0,
        }
    }

    /// Derive a GPS fix from the metric position by flat earth offset from
    /// the home point.
    fn gps_fix(&self) -> GpsCoord {
        let latitude = self.home_latlon[0] + self.position_m[1] / M_PER_DEG_LAT;
        let m_per_deg_lon = M_PER_DEG_LAT * latitude.to_radians().cos();

        GpsCoord {
            latitude,
            longitude: self.home_latlon[1] + self.position_m[0] / m_per_deg_lon,
            altitude: self.position_m[2],
        }
    }
}

impl Vehicle for SimVehicle {
    fn connect(&mut self) -> Result<(), VehicleError> {
        self.connected = true;

        info!(
            "SimVehicle connected, home at ({}, {})",
            self.home_latlon[0], self.home_latlon[1]
        );

        Ok(())
    }

    fn takeoff(&mut self) -> Result<(), VehicleError> {
        if !self.connected {
            return Err(VehicleError::NotConnected);
        }

        self.in_air = true;

        info!("SimVehicle takeoff");

        Ok(())
    }

    fn land(&mut self) -> Result<(), VehicleError> {
        if !self.connected {
            return Err(VehicleError::NotConnected);
        }

        self.in_air = false;
        self.velocity_ms = Vector3::zeros();

        info!("SimVehicle landed");

        Ok(())
    }

    fn update(&mut self) -> Result<VehicleState, VehicleError> {
        if !self.connected {
            return Err(VehicleError::NotConnected);
        }

        Ok(VehicleState {
            position_m: self.position_m,
            velocity_ms: self.velocity_ms,
            pitch_deg: 0.0,
            roll_deg: 0.0,
            yaw_deg: self.yaw_deg,
            gps: Some(self.gps_fix()),
        })
    }

    fn move_cmd(&mut self, cmd_ms: &Vector3<f64>, delta_time_s: f64) -> Result<(), VehicleError> {
        if !self.connected {
            return Err(VehicleError::NotConnected);
        }

        // Commands are dropped on the ground, matching real backends which
        // refuse velocity commands before takeoff
        if !self.in_air {
            return Ok(());
        }

        self.velocity_ms = *cmd_ms;
        self.position_m += cmd_ms * delta_time_s;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_must_connect_first() {
        let mut sim = SimVehicle::new([49.2265, 16.5968]);

        assert!(matches!(sim.takeoff(), Err(VehicleError::NotConnected)));
        assert!(matches!(sim.update(), Err(VehicleError::NotConnected)));

        sim.connect().unwrap();
        assert!(sim.takeoff().is_ok());
    }

    #[test]
    fn test_commands_ignored_on_ground() {
        let mut sim = SimVehicle::new([49.2265, 16.5968]);
        sim.connect().unwrap();

        sim.move_cmd(&Vector3::new(1.0, 0.0, 0.0), 1.0).unwrap();

        let state = sim.update().unwrap();
        assert_eq!(state.position_m, Vector3::zeros());
        assert_eq!(state.velocity_ms, Vector3::zeros());
    }

    #[test]
    fn test_kinematic_integration() {
        let mut sim = SimVehicle::new([49.2265, 16.5968]);
        sim.connect().unwrap();
        sim.takeoff().unwrap();

        let cmd = Vector3::new(2.0, -1.0, 0.5);
        sim.move_cmd(&cmd, 0.1).unwrap();
        sim.move_cmd(&cmd, 0.1).unwrap();

        let state = sim.update().unwrap();
        assert!((state.position_m - Vector3::new(0.4, -0.2, 0.1)).norm() < TOL);
        assert_eq!(state.velocity_ms, cmd);
    }

    #[test]
    fn test_gps_tracks_position() {
        let mut sim = SimVehicle::new([49.2265, 16.5968]);
        sim.connect().unwrap();
        sim.takeoff().unwrap();

        // Fly 1113.2 m north, one hundredth of a degree of latitude
        sim.move_cmd(&Vector3::new(0.0, 1113.2, 0.0), 1.0).unwrap();

        let gps = sim.update().unwrap().gps.unwrap();
        assert!((gps.latitude - 49.2365).abs() < 1e-6);
        assert!((gps.longitude - 16.5968).abs() < 1e-9);
        assert!((gps.altitude - 0.0).abs() < TOL);
    }

    #[test]
    fn test_landing_zeroes_velocity() {
        let mut sim = SimVehicle::new([0.0, 0.0]);
        sim.connect().unwrap();
        sim.takeoff().unwrap();

        sim.move_cmd(&Vector3::new(1.0, 1.0, 1.0), 1.0).unwrap();
        sim.land().unwrap();

        let state = sim.update().unwrap();
        assert_eq!(state.velocity_ms, Vector3::zeros());

        // Further commands are dropped once landed
        sim.move_cmd(&Vector3::new(1.0, 0.0, 0.0), 1.0).unwrap();
        let state2 = sim.update().unwrap();
        assert_eq!(state2.position_m, state.position_m);
    }
}
