//! Shared application service layer for AquaNova.
//!
//! This crate sits between the flowsheet editor (or the CLI) and the
//! simulation engine: it turns a flowsheet into an SI engine request, runs
//! or replays it, and converts the response back into display units with
//! per-unit chips.

pub mod chips;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod feed_compile;
pub mod prepare;
pub mod progress;
pub mod project_service;
pub mod run_service;
pub mod stage_compile;

// Re-export key types for convenience
pub use chips::{annotate_chips, apply_chips, max_flux_lmh, UnitChips};
pub use config::{AppConfig, EngineConfig};
pub use display::to_display;
pub use engine::{EngineError, ReplayEngine, SimulationEngine};
pub use error::{AppError, AppResult};
pub use feed_compile::{compile_feed, CompiledFeed};
pub use prepare::{prepare_run, PreparedRun, UnitRef};
pub use progress::{RunProgressEvent, RunStage};
pub use project_service::{load_flowsheet, save_flowsheet, summarize_flowsheet, FlowsheetSummary};
pub use run_service::{
    list_runs, load_run, run_scenario, run_scenario_with_progress, RunOptions, RunRequest,
    RunResponse,
};
pub use stage_compile::{compile_stage, CompiledStage};
