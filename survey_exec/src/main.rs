//! # Survey Executable
//!
//! Plans a single survey from a JSON request file and writes the resulting plan into a new
//! session directory.
//!
//! ```text
//! survey_exec <request.json> [--params <file>] [--output <name>]
//! ```

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, warn};
use structopt::StructOpt;

use mission_if::PlanRequest;
use survey_lib::{SurveyParams, SurveyPlanner};
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "survey_exec", about = "Plan an aerial coverage survey")]
struct Args {
    /// Path to the JSON plan request
    #[structopt(parse(from_os_str))]
    request: PathBuf,

    /// Parameter file, relative to the params directory of the software root
    #[structopt(long, default_value = "survey_exec.toml")]
    params: String,

    /// Name of the plan file written into the session directory
    #[structopt(long, default_value = "plan.json")]
    output: String,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("survey_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Survey Planner\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", args);

    // ---- LOAD PARAMETERS ----

    let params: SurveyParams = util::params::load(&args.params)
        .wrap_err_with(|| format!("Could not load parameters from {}", args.params))?;

    let planner = SurveyPlanner::new(params).wrap_err("Invalid planner parameters")?;

    // ---- LOAD REQUEST ----

    info!("Loading request from {:?}", args.request);

    let request = PlanRequest::from_json_file(&args.request)
        .wrap_err_with(|| format!("Could not load the request from {:?}", args.request))?;

    info!(
        "Request: {} vertices, altitude {} m, overlap {} %, coverage threshold {}",
        request.polygon.len(),
        request.altitude,
        request.overlap_percent,
        request.coverage_threshold
    );

    // ---- PLAN ----

    let response = planner
        .plan(&request)
        .wrap_err("Failed to plan the survey")?;

    if !response.metadata.optimisation_converged {
        warn!("The tour was not fully optimised, consider raising the sweep or time limit");
    }

    // ---- SAVE ----

    let path = session
        .save(&args.output, &response)
        .wrap_err("Failed to save the plan")?;

    info!(
        "Plan with {} grids and {} waypoints written to {:?}",
        response.grid_count,
        response.waypoints.len(),
        path
    );

    Ok(())
}
