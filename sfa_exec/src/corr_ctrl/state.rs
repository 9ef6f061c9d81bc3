//! Correction control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use super::*;
use crate::geom::set_mag;
use crate::path::{NearestPoint, Path};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Correction control module state
#[derive(Default)]
pub struct CorrCtrl {
    params: Params,

    /// The safe path corrections are made towards. Installed with
    /// [`CorrCtrl::set_path`], `None` disables correction.
    path: Option<Path>,

    output_data: OutputData,
    report: StatusReport,
}

/// Input data to the module
#[derive(Copy, Clone, Debug)]
pub struct InputData {
    /// Drone position in the local metric frame
    pub location_m: Vector3<f64>,

    /// Drone velocity in the local metric frame
    pub velocity_ms: Vector3<f64>,

    /// The pilot's raw command
    pub pilot_cmd: Vector3<f64>,
}

/// Output data from the module.
///
/// Everything downstream consumers need (the flight log in particular) is
/// captured here per cycle, so nothing has to reach back into the module's
/// internals.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct OutputData {
    /// The blended command to send to the vehicle
    pub safe_cmd: Vector3<f64>,

    /// The pilot's raw command, passed through for logging
    pub pilot_cmd: Vector3<f64>,

    /// The gain-weighted pilot command component of the blend
    pub cmd_component: Vector3<f64>,

    /// The gain-weighted present correction component of the blend
    pub present_corr_component: Vector3<f64>,

    /// The gain-weighted future correction component of the blend
    pub future_corr_component: Vector3<f64>,

    /// Nearest point on the path to the present position
    pub present_nearest: Option<NearestPoint>,

    /// Nearest point on the path to the predicted position
    pub future_nearest: Option<NearestPoint>,

    /// The position the drone is predicted to reach after the lookahead time
    pub predicted_location_m: Vector3<f64>,
}

/// The status report containing monitoring quantities for this cycle.
#[derive(Copy, Clone, Debug, Default, Serialize)]
pub struct StatusReport {
    /// Distance from the present position to the path
    pub present_dist_m: f64,

    /// Distance from the predicted position to the path
    pub future_dist_m: f64,

    /// True if the present position is inside the free range
    pub in_free_range: bool,

    /// True if the present position is inside the warning range
    pub in_warning_range: bool,

    /// True if a non-zero correction was blended into the command
    pub correction_active: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that could occur during initialisation of the module.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Cannot load CorrCtrl parameters: {0}")]
    ParamLoadError(params::LoadError),
}

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum ProcError {
    /// Input vectors must be finite, a NaN or infinite command would poison
    /// every downstream calculation.
    #[error("Input data contains a non-finite component")]
    NonFiniteInput,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for InputData {
    fn default() -> Self {
        Self {
            location_m: Vector3::zeros(),
            velocity_ms: Vector3::zeros(),
            pilot_cmd: Vector3::zeros(),
        }
    }
}

impl Default for OutputData {
    fn default() -> Self {
        Self {
            safe_cmd: Vector3::zeros(),
            pilot_cmd: Vector3::zeros(),
            cmd_component: Vector3::zeros(),
            present_corr_component: Vector3::zeros(),
            future_corr_component: Vector3::zeros(),
            present_nearest: None,
            future_nearest: None,
            predicted_location_m: Vector3::zeros(),
        }
    }
}

impl State for CorrCtrl {
    type InitData = &'static str;
    type InitError = InitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ProcError;

    /// Initialise the CorrCtrl module.
    ///
    /// Expected init data is a path to the parameter file.
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(InitError::ParamLoadError(e)),
        };

        // The penalty constants are calibrated for a free range of 1 m, away
        // from that the magnitude is not guaranteed non-negative near the
        // boundary
        if (self.params.free_range_m - 1.0).abs() > f64::EPSILON {
            warn!(
                "CorrCtrl free_range_m is {} m, the penalty curve is calibrated for 1 m",
                self.params.free_range_m
            );
        }

        Ok(())
    }

    /// Process correction control.
    ///
    /// Processing involves:
    ///  1. Finding the nearest point on the path to the present position.
    ///  2. Predicting the position after the lookahead time and finding its
    ///     nearest point.
    ///  3. Building the correction vectors from the penalty magnitudes.
    ///  4. Blending the pilot command with the weighted corrections.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Setup cycle data
        self.output_data = OutputData::default();
        self.report = StatusReport::default();

        let finite = input_data.location_m.iter().all(|c| c.is_finite())
            && input_data.velocity_ms.iter().all(|c| c.is_finite())
            && input_data.pilot_cmd.iter().all(|c| c.is_finite());
        if !finite {
            return Err(ProcError::NonFiniteInput);
        }

        self.output_data.pilot_cmd = input_data.pilot_cmd;

        // Without at least one path segment the pilot flies uncorrected
        let path = match self.path {
            Some(ref p) if p.has_segments() => p,
            _ => {
                self.output_data.safe_cmd = input_data.pilot_cmd;
                self.output_data.cmd_component = input_data.pilot_cmd * self.params.gain_cmd;
                self.output_data.predicted_location_m = input_data.location_m
                    + input_data.velocity_ms * self.params.lookahead_s;
                return Ok((self.output_data, self.report));
            }
        };

        // Present and predicted nearest points. `has_segments` guarantees the
        // queries return a result.
        let present = match path.nearest_point(&input_data.location_m) {
            Some(n) => n,
            None => unreachable!(),
        };

        let predicted_m =
            input_data.location_m + input_data.velocity_ms * self.params.lookahead_s;
        let future = match path.nearest_point(&predicted_m) {
            Some(n) => n,
            None => unreachable!(),
        };

        // Correction vectors: direction towards the nearest point, rescaled
        // to the penalty magnitude. On the path the direction is zero and
        // stays zero whatever the magnitude.
        let present_mag = correction_mag(present.dist_m, &self.params);
        let future_mag = correction_mag(future.dist_m, &self.params);

        let present_corr = set_mag(&(present.point_m - input_data.location_m), present_mag);
        let future_corr = set_mag(&(future.point_m - predicted_m), future_mag);

        // Blend
        self.output_data.cmd_component = input_data.pilot_cmd * self.params.gain_cmd;
        self.output_data.present_corr_component = present_corr * self.params.gain_present_corr;
        self.output_data.future_corr_component = future_corr * self.params.gain_future_corr;

        self.output_data.safe_cmd = self.output_data.cmd_component
            + self.output_data.present_corr_component
            + self.output_data.future_corr_component;

        self.output_data.present_nearest = Some(present);
        self.output_data.future_nearest = Some(future);
        self.output_data.predicted_location_m = predicted_m;

        // Status report
        self.report.present_dist_m = present.dist_m;
        self.report.future_dist_m = future.dist_m;
        self.report.in_free_range = present.dist_m < self.params.free_range_m;
        self.report.in_warning_range = present.dist_m < self.params.warning_range_m;
        self.report.correction_active = present_mag > 0.0 || future_mag > 0.0;

        Ok((self.output_data, self.report))
    }
}

impl CorrCtrl {
    /// Install the safe path to correct towards.
    ///
    /// Takes effect on the next call to `proc`. A path with fewer than two
    /// waypoints is accepted but disables correction, as there are no
    /// segments to measure against.
    pub fn set_path(&mut self, path: Path) {
        self.path = Some(path);
    }

    /// Remove the current path, disabling correction.
    pub fn clear_path(&mut self) {
        self.path = None;
    }

    /// Get the currently installed path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Get the parameters the module is running with.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::transform::TransformCtx;
    use crate::path::Waypoint;

    const TOL: f64 = 1e-9;

    fn ctrl_with_path(points: &[[f64; 3]]) -> CorrCtrl {
        let ctx = TransformCtx::default();
        let mut path = Path::new_empty();

        for p in points {
            path.add_waypoint(Waypoint::new(
                &ctx,
                0.0,
                0.0,
                Vector3::new(p[0], p[1], p[2]),
            ));
        }

        let mut ctrl = CorrCtrl::default();
        ctrl.params = Params::default();
        ctrl.set_path(path);
        ctrl
    }

    #[test]
    fn test_correction_towards_path_when_outside() {
        let mut ctrl = ctrl_with_path(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]]);

        // Hovering 5 m off the start of the path with no pilot input. The
        // penalty is (5 - 2)^3 / 10 + 0.5 = 3.2, applied through both the
        // present (gain 1) and future (gain 5) terms since velocity is zero.
        let input = InputData {
            location_m: Vector3::new(0.0, 5.0, 0.0),
            velocity_ms: Vector3::zeros(),
            pilot_cmd: Vector3::zeros(),
        };

        let (output, report) = ctrl.proc(&input).unwrap();

        assert!((output.safe_cmd - Vector3::new(0.0, -19.2, 0.0)).norm() < TOL);
        assert!((report.present_dist_m - 5.0).abs() < TOL);
        assert!((report.future_dist_m - 5.0).abs() < TOL);
        assert!(!report.in_free_range);
        assert!(!report.in_warning_range);
        assert!(report.correction_active);

        let nearest = output.present_nearest.unwrap();
        assert!((nearest.point_m - Vector3::zeros()).norm() < TOL);
    }

    #[test]
    fn test_on_path_is_exactly_zero() {
        let mut ctrl = ctrl_with_path(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]]);

        let input = InputData {
            location_m: Vector3::new(5.0, 0.0, 0.0),
            velocity_ms: Vector3::zeros(),
            pilot_cmd: Vector3::zeros(),
        };

        let (output, report) = ctrl.proc(&input).unwrap();

        assert_eq!(output.safe_cmd, Vector3::zeros());
        assert_eq!(output.present_corr_component, Vector3::zeros());
        assert_eq!(output.future_corr_component, Vector3::zeros());
        assert!(output.safe_cmd.iter().all(|c| c.is_finite()));
        assert!(report.in_free_range);
        assert!(!report.correction_active);
    }

    #[test]
    fn test_pilot_command_passes_through_inside_free_range() {
        let mut ctrl = ctrl_with_path(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]]);

        let input = InputData {
            location_m: Vector3::new(5.0, 0.5, 0.0),
            velocity_ms: Vector3::zeros(),
            pilot_cmd: Vector3::new(1.0, 0.0, 0.5),
        };

        let (output, report) = ctrl.proc(&input).unwrap();

        assert!((output.safe_cmd - Vector3::new(1.0, 0.0, 0.5)).norm() < TOL);
        assert!(report.in_free_range);
        assert!(!report.correction_active);
    }

    #[test]
    fn test_future_term_anticipates_departure() {
        let mut ctrl = ctrl_with_path(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]]);

        // On the path but flying away from it at 2 m/s: after the 2 s
        // lookahead the predicted position is 4 m out, so only the future
        // term activates
        let input = InputData {
            location_m: Vector3::new(5.0, 0.0, 0.0),
            velocity_ms: Vector3::new(0.0, 2.0, 0.0),
            pilot_cmd: Vector3::zeros(),
        };

        let (output, report) = ctrl.proc(&input).unwrap();

        assert_eq!(output.present_corr_component, Vector3::zeros());
        assert!((report.future_dist_m - 4.0).abs() < TOL);

        // Future penalty (4 - 2)^3 / 10 + 0.5 = 1.3, weighted by gain 5,
        // pointing back towards the path
        assert!((output.future_corr_component - Vector3::new(0.0, -6.5, 0.0)).norm() < TOL);
        assert!((output.safe_cmd - Vector3::new(0.0, -6.5, 0.0)).norm() < TOL);
        assert!(report.correction_active);
    }

    #[test]
    fn test_passthrough_without_segments() {
        let mut no_path = CorrCtrl::default();
        no_path.params = Params::default();

        let mut single_wp = ctrl_with_path(&[[0.0, 0.0, 0.0]]);

        let input = InputData {
            location_m: Vector3::new(100.0, 100.0, 100.0),
            velocity_ms: Vector3::new(1.0, 0.0, 0.0),
            pilot_cmd: Vector3::new(0.5, -0.5, 0.25),
        };

        for ctrl in [&mut no_path, &mut single_wp] {
            let (output, report) = ctrl.proc(&input).unwrap();
            assert_eq!(output.safe_cmd, input.pilot_cmd);
            assert!(!report.correction_active);
            assert!(output.present_nearest.is_none());
        }
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let mut ctrl = ctrl_with_path(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]]);

        let input = InputData {
            location_m: Vector3::new(f64::NAN, 0.0, 0.0),
            velocity_ms: Vector3::zeros(),
            pilot_cmd: Vector3::zeros(),
        };

        assert!(matches!(ctrl.proc(&input), Err(ProcError::NonFiniteInput)));
    }
}
