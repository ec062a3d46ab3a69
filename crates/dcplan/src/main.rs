use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{WrapErr, bail, eyre};

use dcplan::util::io::atomic_write;
use dcplan::{
    SimulationRequest, SimulationResponse, SimulationWorker, init_logging, load_scenario, report,
    save_scenario,
};
use dcplan_core::ScenarioConfig;

/// How often the progress line is refreshed
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(name = "dcplan")]
#[command(about = "Monte Carlo investment analysis for data-center projects")]
struct Cli {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ScenarioArgs {
    /// Scenario YAML file (default: the 2.5 MW reference facility)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Emit JSON instead of a text report
    #[arg(long)]
    json: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the Monte Carlo simulation
    Simulate {
        #[command(flatten)]
        input: ScenarioArgs,

        /// Override the number of trials
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// Override the random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Run trials on a single thread
        #[arg(long)]
        sequential: bool,
    },
    /// Evaluate the deterministic baseline
    Baseline {
        #[command(flatten)]
        input: ScenarioArgs,
    },
    /// One-at-a-time P10/P90 swing analysis of the enabled variables
    Tornado {
        #[command(flatten)]
        input: ScenarioArgs,
    },
    /// Write the reference scenario to a file as a starting point
    Init {
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref(), &cli.log_level)?;

    match cli.command {
        Command::Simulate {
            input: args,
            iterations,
            seed,
            sequential,
        } => {
            let mut scenario = load(&args)?;
            if let Some(iterations) = iterations {
                scenario.monte_carlo.iterations = iterations;
            }
            if let Some(seed) = seed {
                scenario.monte_carlo.seed = seed;
            }
            if sequential {
                scenario.monte_carlo.parallel = false;
            }
            let show_progress = !args.json && args.output.is_none();
            let request = SimulationRequest::MonteCarlo {
                scenario: Box::new(scenario),
            };
            match run(request, show_progress)? {
                SimulationResponse::MonteCarloComplete(result) => {
                    let text = if args.json {
                        serde_json::to_string_pretty(&result)?
                    } else {
                        report::monte_carlo_report(&result)
                    };
                    emit(&args, &text)
                }
                other => unexpected(other),
            }
        }

        Command::Baseline { input: args } => {
            let scenario = load(&args)?;
            let request = SimulationRequest::Baseline {
                scenario: Box::new(scenario),
            };
            match run(request, false)? {
                SimulationResponse::BaselineComplete(result) => {
                    let text = if args.json {
                        serde_json::to_string_pretty(&result)?
                    } else {
                        report::baseline_report(&result)
                    };
                    emit(&args, &text)
                }
                other => unexpected(other),
            }
        }

        Command::Tornado { input: args } => {
            let scenario = load(&args)?;
            let baseline_npv = dcplan_core::cashflow::run_deterministic(&scenario.parameters).npv;
            let request = SimulationRequest::Tornado {
                scenario: Box::new(scenario),
            };
            match run(request, false)? {
                SimulationResponse::TornadoComplete(bars) => {
                    let text = if args.json {
                        serde_json::to_string_pretty(&bars)?
                    } else {
                        report::tornado_report(baseline_npv, &bars)
                    };
                    emit(&args, &text)
                }
                other => unexpected(other),
            }
        }

        Command::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            save_scenario(&path, &ScenarioConfig::reference())?;
            eprintln!("Wrote reference scenario to {}", path.display());
            Ok(())
        }
    }
}

fn load(args: &ScenarioArgs) -> color_eyre::Result<ScenarioConfig> {
    load_scenario(args.scenario.as_deref()).wrap_err("Failed to load scenario")
}

/// Submit one request and wait for its response, drawing a progress line
/// on stderr while Monte Carlo trials run
fn run(request: SimulationRequest, show_progress: bool) -> color_eyre::Result<SimulationResponse> {
    let worker = SimulationWorker::new();
    if !worker.send(request) {
        bail!("Simulation worker stopped unexpectedly");
    }

    let response = loop {
        match worker.recv_timeout(POLL_INTERVAL) {
            Ok(response) => break response,
            Err(RecvTimeoutError::Timeout) => {
                if show_progress {
                    let progress = worker.progress();
                    eprint!(
                        "\r  {:>5.1}% ({}/{})",
                        progress.fraction() * 100.0,
                        progress.completed(),
                        progress.total()
                    );
                    let _ = std::io::stderr().flush();
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                bail!("Simulation worker stopped unexpectedly")
            }
        }
    };
    if show_progress {
        eprint!("\r{:30}\r", "");
    }

    match response {
        SimulationResponse::Error(msg) => Err(eyre!(msg)),
        SimulationResponse::Cancelled => Err(eyre!("Simulation cancelled")),
        other => Ok(other),
    }
}

fn emit(args: &ScenarioArgs, text: &str) -> color_eyre::Result<()> {
    match args.output.as_deref() {
        Some(path) => write_report(path, text),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn write_report(path: &Path, text: &str) -> color_eyre::Result<()> {
    atomic_write(path, text).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}

fn unexpected(response: SimulationResponse) -> color_eyre::Result<()> {
    Err(eyre!("Unexpected worker response: {response:?}"))
}
