//! Main arm executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Arm sensing
//!         - Telecommand processing and handling
//!         - Arm control processing
//!         - Demands output
//!
//! Telecommands come from a script if a path is given as the only argument, otherwise from an
//! interactive prompt.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

#[cfg(feature = "sim")]
use arm_lib::sim_arm::SimArm;
use arm_lib::{
    data_store::{DataStore, SafeModeCause},
    fwd_kin::ForwardKinematics,
    params::ArmExecParams,
    tc_prompt::{TcPrompt, TcPromptError},
};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, trace, warn};
use std::env;
#[cfg(feature = "sim")]
use std::sync::mpsc::{channel, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("DH Arm Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ArmExecParams =
        util::params::load("arm_exec.toml").wrap_err("Could not load exec params")?;

    let cycle_frequency_hz = 1.0 / exec_params.cycle_period_s;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let mut tc_source = match args.len() {
        // If we have a single argument use it as the script path
        2 => {
            info!("Loading script from \"{}\"", &args[1]);

            let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} TCs\n",
                si.get_duration(),
                si.get_num_tcs()
            );

            TcSource::Script(si)
        }
        1 => {
            info!("No script provided, TCs will be read from the prompt\n");

            let history_path = host::get_sw_root()
                .wrap_err("Could not find the software root")?
                .join(&exec_params.history_path);

            TcSource::Prompt(TcPrompt::new(history_path).wrap_err("Failed to start the prompt")?)
        }
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

    ds.arm_ctrl
        .init("arm_ctrl.toml", &session)
        .wrap_err("Failed to initialise ArmCtrl")?;
    info!("ArmCtrl init complete");

    let fk = ForwardKinematics::new().wrap_err("Failed to build the forward model")?;
    info!("Forward model built");

    info!("Module initialisation complete\n");

    // ---- INITIALISE SIMULATION ----

    #[cfg(feature = "sim")]
    let (dems_tx, sens_rx, sim_handle) = {
        let (dems_tx, dems_rx) = channel();
        let (sens_tx, sens_rx) = channel();

        let sim = SimArm::new(exec_params.sim).wrap_err("Failed to initialise SimArm")?;
        let handle = sim.spawn(dems_rx, sens_tx);
        info!("SimArm initialised");

        (dems_tx, sens_rx, handle)
    };

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(cycle_frequency_hz);

        // ---- DATA INPUT ----

        // Keep only the newest measurement
        #[cfg(feature = "sim")]
        loop {
            match sens_rx.try_recv() {
                Ok(s) => ds.arm_sens = Some(s),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return match sim_handle.join() {
                        Ok(Err(e)) => Err(e).wrap_err("SimArm stopped"),
                        _ => Err(eyre!("SimArm stopped unexpectedly")),
                    }
                }
            }
        }

        // ---- TELECOMMAND PROCESSING ----

        match tc_source {
            TcSource::Prompt(ref prompt) => loop {
                match prompt.receive_tc() {
                    Ok(Some(tc)) => {
                        tc_processor::exec(&mut ds, &tc);
                    }
                    Ok(None) => break,
                    Err(TcPromptError::Closed) => {
                        ds.make_safe(SafeModeCause::TcSourceClosed);
                        break;
                    }
                    Err(e) => return Err(e).wrap_err("An error occurred while reading TCs"),
                }
            },

            TcSource::Script(ref mut si) => match si.get_pending_tcs() {
                PendingTcs::None => (),
                PendingTcs::Some(tc_vec) => {
                    for tc in tc_vec.iter() {
                        tc_processor::exec(&mut ds, tc);
                    }
                }
                PendingTcs::EndOfScript => {
                    info!("End of TC script reached, stopping");
                    break;
                }
            },
        };

        // Operator closed the prompt
        if ds.safe_cause == Some(SafeModeCause::TcSourceClosed) {
            info!("TC prompt closed, stopping");
            break;
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.arm_ctrl.proc(&ds.arm_ctrl_input) {
            Ok((o, r)) => {
                if let Some(label) = r.selected {
                    info!(
                        "Pose target accepted as {} ({} valid, {} invalid solutions)",
                        label, r.num_valid, r.num_invalid
                    );
                }
                ds.arm_ctrl_output = o;
                ds.arm_ctrl_status_rpt = r;
            }
            Err(e) => {
                // Errors usually mean the target can't be reached, the previous target is kept
                warn!("Error during ArmCtrl processing: {}", e)
            }
        };

        // Goal position of the current target
        ds.goal_m = match ds.arm_ctrl.target().and_then(|t| t.joints()) {
            Some(j) => match fk.solve(j) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Could not find the goal position: {}", e);
                    None
                }
            },
            None => None,
        };

        // Send demands to the arm
        #[cfg(feature = "sim")]
        if dems_tx.send(ds.arm_ctrl_output.clone()).is_err() {
            warn!("Could not send demands to SimArm");
        }
        #[cfg(not(feature = "sim"))]
        trace!("Demands: {:?}", ds.arm_ctrl_output.pos_rad);

        // ---- MONITORING ----

        if let Some(err_m) = ds.record_marker() {
            if ds.is_1_hz_cycle {
                info!("End effector position error: {:.04} m", err_m);
            } else {
                trace!("End effector position error: {:.06} m", err_m);
            }
        }

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

        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!("Saving {} markers", ds.markers.len());
    session.save("markers.json", ds.markers);

    info!("End of execution");

    session.exit();

    Ok(())
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Various sources for the telecommands incoming to the exec.
enum TcSource {
    Prompt(TcPrompt),
    Script(ScriptInterpreter),
}
