//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::corr_ctrl;
use crate::flight_log::FlightLog;
use crate::vehicle::VehicleState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Session elapsed time at the start of this cycle
    pub sim_time_s: f64,

    // Vehicle
    pub vehicle_state: VehicleState,

    // CorrCtrl
    pub corr_ctrl: corr_ctrl::CorrCtrl,
    pub corr_ctrl_input: corr_ctrl::InputData,
    pub corr_ctrl_output: corr_ctrl::OutputData,
    pub corr_ctrl_status_rpt: corr_ctrl::StatusReport,

    // Flight log
    pub flight_log: FlightLog,

    // Monitoring counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DataStore {
    fn default() -> Self {
        Self {
            num_cycles: 0,
            sim_time_s: 0.0,
            vehicle_state: VehicleState::default(),
            corr_ctrl: corr_ctrl::CorrCtrl::default(),
            corr_ctrl_input: corr_ctrl::InputData::default(),
            corr_ctrl_output: corr_ctrl::OutputData::default(),
            corr_ctrl_status_rpt: corr_ctrl::StatusReport::default(),
            flight_log: FlightLog::new(1.0, 2.0),
            num_consec_cycle_overruns: 0,
        }
    }
}

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the per-cycle module data and refreshes the cycle timestamp.
    pub fn cycle_start(&mut self) {
        self.corr_ctrl_input = corr_ctrl::InputData::default();
        self.corr_ctrl_output = corr_ctrl::OutputData::default();
        self.corr_ctrl_status_rpt = corr_ctrl::StatusReport::default();

        self.sim_time_s = util::session::get_elapsed_seconds();
    }
}
