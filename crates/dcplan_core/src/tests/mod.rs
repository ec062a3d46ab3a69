//! Integration tests for the dcplan simulation engine
//!
//! Tests are organized by topic:
//! - `determinism` - Seeded reproducibility, sequential vs parallel
//! - `degenerate` - Zero-variable runs and undefined metrics
//! - `domain` - Realizations outside a target's admissible range
//! - `reference` - The 2.5 MW reference facility end to end
//! - `run_control` - Validation, progress and cancellation

mod domain;
mod run_control;
