//! Command-line front end for the dcplan simulation engine
//!
//! Loads a scenario file, runs the engine on a background worker and renders
//! text or JSON reports.

pub mod logging;
pub mod report;
pub mod scenario_file;
pub mod util;
pub mod worker;

pub use logging::init_logging;
pub use scenario_file::{ScenarioFileError, load_scenario, save_scenario};
pub use worker::{SimulationRequest, SimulationResponse, SimulationWorker};
