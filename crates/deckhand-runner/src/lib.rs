//! Deploy step orchestration for deckhand.
//!
//! Turns the raw action inputs into a validated plan, then runs the
//! deployment, notification and release stages against injected
//! capabilities.

pub mod error;
pub mod inputs;
pub mod orchestrator;

pub use error::{RunError, RunResult};
pub use inputs::{ActionInputs, RunPlan, resolve_version};
pub use orchestrator::{Orchestrator, RunReport, StageState};
