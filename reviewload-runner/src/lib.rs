//! Workload driver for reviewload
//!
//! Executors turn one selected operation into one validated request against
//! the service under test. The ramp engine keeps the configured number of
//! virtual users alive, and the orchestrator sequences setup, steady state
//! and teardown around them.

pub mod api;
pub mod context;
pub mod engine;
pub mod error;
pub mod executors;
pub mod orchestrator;
pub mod ramp;
pub mod settings;
pub mod validation;

pub use context::VirtualUser;
pub use engine::{EngineReport, RampEngine};
pub use error::{PhaseError, RunError};
pub use executors::Executor;
pub use orchestrator::{BaselineSummary, RunOrchestrator, RunPhase, RunReport};
pub use ramp::{RampScheduler, RampStage};
pub use settings::RunSettings;
