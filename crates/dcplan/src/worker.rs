//! Background worker for running simulations off the calling thread.
//!
//! The CLI submits a request, then polls `progress()` to draw a progress
//! line until a response arrives.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use dcplan_core::model::{DeterministicResult, MonteCarloProgress, MonteCarloResult, TornadoBar};
use dcplan_core::{ScenarioConfig, SimulationError, cashflow, sensitivity, simulation};

/// Request sent to the background worker
#[derive(Debug)]
pub enum SimulationRequest {
    /// Run the Monte Carlo simulation described by the scenario
    MonteCarlo { scenario: Box<ScenarioConfig> },
    /// Evaluate the unperturbed baseline
    Baseline { scenario: Box<ScenarioConfig> },
    /// One-at-a-time P10/P90 swing analysis
    Tornado { scenario: Box<ScenarioConfig> },
    /// Graceful shutdown
    Shutdown,
}

/// Response from the background worker
#[derive(Debug)]
pub enum SimulationResponse {
    /// Monte Carlo completed (boxed to reduce enum size)
    MonteCarloComplete(Box<MonteCarloResult>),
    BaselineComplete(Box<DeterministicResult>),
    TornadoComplete(Vec<TornadoBar>),
    /// Simulation was cancelled
    Cancelled,
    /// Error occurred
    Error(String),
}

/// Background worker that runs simulations on a separate thread
pub struct SimulationWorker {
    request_tx: Sender<SimulationRequest>,
    response_rx: Receiver<SimulationResponse>,
    progress: MonteCarloProgress,
    thread: Option<JoinHandle<()>>,
}

impl SimulationWorker {
    pub fn new() -> Self {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();
        let progress = MonteCarloProgress::new();

        let ctx = WorkerContext {
            response_tx,
            progress: progress.clone(),
        };
        let thread = thread::spawn(move || ctx.run(request_rx));

        Self {
            request_tx,
            response_rx,
            progress,
            thread: Some(thread),
        }
    }

    /// Send a request to the worker; false if the worker has stopped
    pub fn send(&self, request: SimulationRequest) -> bool {
        // Clear any cancellation left over from the previous run
        self.progress.reset();
        self.request_tx.send(request).is_ok()
    }

    /// Wait up to `timeout` for a response.
    ///
    /// Returns `Err(Disconnected)` if the worker thread has exited.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<SimulationResponse, RecvTimeoutError> {
        self.response_rx.recv_timeout(timeout)
    }

    /// Shared progress handle of the current run
    pub fn progress(&self) -> &MonteCarloProgress {
        &self.progress
    }

    /// Request cancellation of the current run
    pub fn cancel(&self) {
        self.progress.cancel();
    }

    /// Shutdown the worker thread
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(SimulationRequest::Shutdown);
    }
}

impl Default for SimulationWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        self.cancel();
        self.shutdown();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Shared state for the background worker thread
struct WorkerContext {
    response_tx: Sender<SimulationResponse>,
    progress: MonteCarloProgress,
}

impl WorkerContext {
    fn run(&self, request_rx: Receiver<SimulationRequest>) {
        while let Ok(request) = request_rx.recv() {
            let response = match request {
                SimulationRequest::Shutdown => break,

                SimulationRequest::MonteCarlo { scenario } => {
                    tracing::info!(
                        iterations = scenario.monte_carlo.iterations,
                        seed = scenario.monte_carlo.seed,
                        "Starting Monte Carlo simulation"
                    );
                    self.run_monte_carlo(&scenario)
                }

                SimulationRequest::Baseline { scenario } => {
                    tracing::info!("Starting baseline evaluation");
                    match scenario.parameters.validate() {
                        Ok(()) => SimulationResponse::BaselineComplete(Box::new(
                            cashflow::run_deterministic(&scenario.parameters),
                        )),
                        Err(e) => SimulationResponse::Error(e.to_string()),
                    }
                }

                SimulationRequest::Tornado { scenario } => {
                    tracing::info!(variables = scenario.variables.len(), "Starting tornado");
                    match sensitivity::tornado(&scenario.parameters, &scenario.variables) {
                        Ok(bars) => SimulationResponse::TornadoComplete(bars),
                        Err(e) => SimulationResponse::Error(e.to_string()),
                    }
                }
            };

            if self.response_tx.send(response).is_err() {
                tracing::debug!("Response receiver dropped, stopping worker");
                break;
            }
        }
    }

    fn run_monte_carlo(&self, scenario: &ScenarioConfig) -> SimulationResponse {
        match simulation::run_with_progress(
            &scenario.parameters,
            &scenario.variables,
            &scenario.monte_carlo,
            &self.progress,
        ) {
            Ok(result) => SimulationResponse::MonteCarloComplete(Box::new(result)),
            Err(SimulationError::Cancelled) => SimulationResponse::Cancelled,
            Err(e) => {
                tracing::error!(error = %e, "Monte Carlo simulation failed");
                SimulationResponse::Error(e.to_string())
            }
        }
    }
}
