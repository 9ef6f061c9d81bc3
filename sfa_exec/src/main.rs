//! Main safe flight assistant executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Vehicle state acquisition
//!         - Scripted pilot input
//!         - Correction control processing
//!         - Command dispatch to the vehicle
//!         - Flight log recording
//!
//! # Modules
//!
//! All cyclic modules (e.g. `corr_ctrl`) shall meet the following
//! requirements:
//!     1. Provide a public struct implementing the `util::module::State`
//!        trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use sfa_lib::{
    corr_ctrl,
    data_store::DataStore,
    flight_log::FlightLog,
    params::ExecParams,
    path::Path,
    vehicle::{SimVehicle, Vehicle},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    raise_error,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Name of the mission copy written into the session directory
const MISSION_COPY_FILE_NAME: &str = "mission.json";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("sfa_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Safe Flight Assistant Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ExecParams =
        util::params::load("sfa_exec.toml").wrap_err("Could not load exec params")?;

    if exec_params.cycle_period_s <= 0.0 {
        raise_error!(
            "Exec parameter cycle_period_s must be positive, got {}",
            exec_params.cycle_period_s
        );
    }

    info!("Exec parameters loaded");
    info!(
        "    Cycle period: {} s, pilot script duration: {:.02} s",
        exec_params.cycle_period_s,
        exec_params.script_duration_s()
    );

    // ---- MISSION SELECTION ----

    // An optional CLI argument overrides the mission file from the params
    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let mission_file = match args.len() {
        1 => exec_params.mission_file.clone(),
        2 => Some(args[1].clone()),
        _ => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                args.len() - 1
            ))
        }
    };

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.corr_ctrl
        .init("corr_ctrl.toml", &session)
        .wrap_err("Failed to initialise CorrCtrl")?;
    info!("CorrCtrl init complete");

    // The flight log shares the corridor thresholds with the corrector
    let (free_range_m, warning_range_m) = {
        let p = ds.corr_ctrl.params();
        (p.free_range_m, p.warning_range_m)
    };
    ds.flight_log = FlightLog::new(free_range_m, warning_range_m);

    // ---- LOAD MISSION ----

    match mission_file {
        Some(ref file) => {
            let mut mission_path = host::get_sfa_sw_root()
                .wrap_err("Cannot locate the software root to load the mission")?;
            mission_path.push(file);

            let (path, transform_ctx) = Path::load_json(&mission_path)
                .wrap_err_with(|| format!("Failed to load mission from {:?}", mission_path))?;

            info!(
                "Mission loaded: {} waypoints, {:.02} m long",
                path.num_waypoints(),
                path.length_m().unwrap_or(0.0)
            );
            debug!("Mission transform context: {:?}", transform_ctx);

            // Keep a copy of the flown mission with the session outputs
            session.save(MISSION_COPY_FILE_NAME, path.to_records(&transform_ctx));

            ds.corr_ctrl.set_path(path);
        }
        None => warn!("No mission file given, the pilot flies uncorrected"),
    }

    info!("Module initialisation complete\n");

    // ---- INITIALISE VEHICLE ----

    let mut vehicle = SimVehicle::new(exec_params.home_latlon);
    vehicle.connect().wrap_err("Failed to connect to the vehicle")?;
    vehicle.takeoff().wrap_err("Takeoff failed")?;

    info!("Vehicle ready\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    ds.flight_log.start();
    let flight_start = Instant::now();

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start();

        // ---- DATA INPUT ----

        ds.vehicle_state = vehicle
            .update()
            .wrap_err("Failed to read the vehicle state")?;

        // ---- PILOT INPUT ----

        let flight_time_s = flight_start.elapsed().as_secs_f64();

        let pilot_cmd = match exec_params.pilot_cmd_at(flight_time_s) {
            Some(cmd) => cmd,
            None => {
                info!("End of pilot script reached, stopping");
                break;
            }
        };

        // ---- CONTROL ALGORITHM PROCESSING ----

        ds.corr_ctrl_input = corr_ctrl::InputData {
            location_m: ds.vehicle_state.position_m,
            velocity_ms: ds.vehicle_state.velocity_ms,
            pilot_cmd,
        };

        // A bad input only poisons this cycle: no command is sent or logged,
        // but the cycle still sleeps off its period below
        match ds.corr_ctrl.proc(&ds.corr_ctrl_input) {
            Ok((o, r)) => {
                ds.corr_ctrl_output = o;
                ds.corr_ctrl_status_rpt = r;

                // ---- COMMAND DISPATCH ----

                vehicle
                    .move_cmd(&ds.corr_ctrl_output.safe_cmd, exec_params.cycle_period_s)
                    .wrap_err("Failed to send the command to the vehicle")?;

                // ---- FLIGHT LOG ----

                ds.flight_log.tick(&ds.vehicle_state, &ds.corr_ctrl_output);
            }
            Err(e) => warn!("Error during CorrCtrl processing: {}", e),
        };

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(exec_params.cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - exec_params.cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    ds.flight_log.stop();

    vehicle.land().wrap_err("Landing failed")?;

    ds.flight_log
        .save(&session)
        .wrap_err("Failed to save the flight log")?;

    info!("End of execution, {} cycles run", ds.num_cycles);

    session.exit();

    Ok(())
}
