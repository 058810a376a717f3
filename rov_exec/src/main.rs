//! Main rover-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the navigation arbiter and the equipment it owns
//!     - Main loop:
//!         - Advance the simulated platform
//!         - Command processing, from a script or from the serial and wireless channels
//!         - Arbiter processing:
//!             - Pivot timeout
//!             - Obstacle, position and heading sensing
//!             - Safety gate
//!             - Navigation
//!         - Cycle timing
//!
//! # Modules
//!
//! All modules (e.g. `head_est`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use comms_if::cmd::{Cmd, CmdParseError, Response};
use rov_lib::{
    cmd_server::{CmdServer, CmdServerError},
    nav_arb::{ArbParams, NavArb, NavArbError, NavMode},
    params::RovExecParams,
    serial_client::SerialClient,
    sim::{Sim, SimDelay, SimGnss, SimGyro, SimMotors, SimParams, SimRange, SimServo},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};
use color_eyre::{Report, eyre::{WrapErr, eyre}};

// Internal
use util::{
    host,
    module::State,
    logger::{logger_init, LevelFilter},
    session::{self, Session},
    script_interpreter::{ScriptInterpreter, PendingCmds},
};

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

type SimNavArb = NavArb<SimGyro, SimGnss, SimRange, SimServo, SimMotors, SimDelay>;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "rov_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("MMA Rover Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: RovExecParams = util::params::load("rov_exec.toml")
        .wrap_err("Could not load exec params")?;

    let arb_params = ArbParams {
        nav_arb: util::params::load("nav_arb.toml")
            .wrap_err("Could not load NavArb params")?,
        head_est: util::params::load("head_est.toml")
            .wrap_err("Could not load HeadEst params")?,
        obs_scan: util::params::load("obs_scan.toml")
            .wrap_err("Could not load ObsScan params")?,
        drive_ctrl: util::params::load("drive_ctrl.toml")
            .wrap_err("Could not load DriveCtrl params")?,
        turn_ctrl: util::params::load("turn_ctrl.toml")
            .wrap_err("Could not load TurnCtrl params")?,
    };

    let sim_params: SimParams = util::params::load("sim.toml")
        .wrap_err("Could not load sim params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE COMMAND SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the script path, otherwise take commands from the
    // serial and wireless channels
    let mut script = match args.len() {
        2 => {
            info!("Loading script from \"{}\"", &args[1]);

            let si = ScriptInterpreter::new(&args[1])
                .wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} commands\n",
                si.get_duration(),
                si.get_num_cmds()
            );

            Some(si)
        },
        1 => {
            info!("No script provided, commands will be taken from the serial and wireless channels\n");
            None
        },
        _ => return Err(eyre!(
            "Expected either zero or one argument, found {}", args.len() - 1
        ))
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let (sim, eqpt) = Sim::new(sim_params);
    info!("Simulated platform initialised");

    let mut arb: SimNavArb = NavArb::new(arb_params, eqpt);

    match arb.init(()) {
        Ok(()) => info!("NavArb init complete"),
        Err(NavArbError::HeadingUnavailable(e)) => warn!(
            "NavArb initialised without a heading ({}), navigation will drive forward only. \
            Use mpu_reset to retry.",
            e
        ),
        Err(e) => return Err(e).wrap_err("Failed to initialise NavArb")
    }

    info!("Module initialisation complete\n");

    // ---- INITIALISE COMMAND CHANNELS ----

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let mut cmd_server = match script.is_none() && exec_params.enable_wireless {
        true => {
            let s = CmdServer::new(&zmq_ctx, &exec_params)
                .wrap_err("Failed to initialise the CmdServer")?;
            info!("CmdServer listening on {}", exec_params.cmd_endpoint);
            Some(s)
        },
        false => None
    };

    let mut serial = match script.is_none() && exec_params.enable_serial {
        true => {
            info!("Serial console enabled");
            Some(SerialClient::from_stdin())
        },
        false => None
    };

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let mut num_consec_cycle_overruns: u64 = 0;
    let mut last_status_log_s = 0.0;

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();
        let time_s = session::get_elapsed_seconds();

        // ---- DATA INPUT ----

        sim.step(time_s);

        // ---- COMMAND PROCESSING ----

        if let Some(ref mut si) = script {
            match si.get_pending_cmds_at(time_s) {
                PendingCmds::None => (),
                PendingCmds::Some(cmds) => {
                    for cmd in cmds.iter() {
                        let response = arb.exec_cmd(cmd, time_s);
                        info!("Script command {:?}: {}", cmd, response);
                    }
                },
                // Exit if end of script reached
                PendingCmds::EndOfScript => {
                    info!("End of command script reached, stopping");
                    break
                }
            }
        }

        if let Some(ref mut client) = serial {
            for line in client.try_recv_lines() {
                let response = handle_line(&mut arb, &line, time_s);
                println!("{}", response);
            }
        }

        if let Some(ref mut server) = cmd_server {
            // Get commands until none remain
            loop {
                match server.recv_line() {
                    Ok(Some(line)) => {
                        let response = handle_line(&mut arb, &line, time_s);

                        if let Err(e) = server.send_response(&response) {
                            warn!("Could not respond to command: {}", e);
                        }
                    },
                    Ok(None) => break,
                    Err(CmdServerError::NonUtf8Request) =>
                        warn!("Ignoring a wireless request which is not valid UTF-8"),
                    Err(e) => {
                        warn!("CmdServer error: {}", e);
                        break
                    }
                }
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        let (_, rpt) = match arb.proc(&time_s) {
            Ok(o) => o,
            Err(never) => match never {}
        };

        if exec_params.status_log_period_s > 0.0
            && rpt.mode == NavMode::AutonomousNav
            && time_s - last_status_log_s >= exec_params.status_log_period_s
        {
            match serde_json::to_string(&rpt) {
                Ok(s) => info!("NavArb status: {}", s),
                Err(e) => warn!("Could not serialise the NavArb status: {}", e)
            }
            last_status_log_s = time_s;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                num_consec_cycle_overruns += 1;

                if num_consec_cycle_overruns == exec_params.max_consec_overruns {
                    warn!(
                        "{} consecutive cycle overruns, the cycle period may be too short",
                        num_consec_cycle_overruns
                    );
                }
            }
        }
    }

    // ---- SHUTDOWN ----

    arb.exec_cmd(&Cmd::Stop, session::get_elapsed_seconds());

    info!("End of execution");

    Ok(())
}

/// Parse and execute one command line from the serial or wireless channel.
fn handle_line(arb: &mut SimNavArb, line: &str, time_s: f64) -> Response {
    info!("Command line: {:?}", line);

    match Cmd::parse(line) {
        Ok(cmd) => arb.exec_cmd(&cmd, time_s),
        Err(CmdParseError::NotRecognised(s)) => Response::NotRecognised(s),
        Err(e) => Response::Rejected(e.to_string())
    }
}
