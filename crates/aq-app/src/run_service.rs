//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use aq_project::Flowsheet;
use aq_results::{RunManifest, RunStore, ScenarioOutput, compute_run_id};
use tracing::{info, warn};

use crate::chips::{UnitChips, annotate_chips};
use crate::config::AppConfig;
use crate::display::to_display;
use crate::engine::SimulationEngine;
use crate::error::AppResult;
use crate::prepare::{PreparedRun, prepare_run};
use crate::progress::{RunProgressEvent, RunStage};

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Serve a cached response for an identical request when one exists.
    pub use_cache: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub flowsheet: &'a Flowsheet,
    pub config: &'a AppConfig,
    pub engine: &'a dyn SimulationEngine,
    pub options: RunOptions,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub prepared: PreparedRun,
    /// Engine output as delivered, SI.
    pub raw: ScenarioOutput,
    /// `raw` in the configured display units.
    pub display: ScenarioOutput,
    pub chips: Vec<UnitChips>,
    pub loaded_from_cache: bool,
    pub elapsed_wall_s: f64,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Prepare, simulate (or load from cache) and normalize one scenario.
pub fn run_scenario(request: &RunRequest) -> AppResult<RunResponse> {
    run_scenario_with_progress(request, None)
}

/// Same as [`run_scenario`], streaming progress events.
pub fn run_scenario_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let config = request.config;

    emit_progress(
        &mut progress_cb,
        RunStage::Preparing,
        started,
        Some("Compiling flowsheet".to_string()),
    );
    let prepared = prepare_run(request.flowsheet, config)?;

    let run_id = compute_run_id(&prepared.request, &config.engine.version);
    let store = match &config.run_cache_dir {
        Some(dir) => Some(RunStore::new(dir.clone())?),
        None => None,
    };

    emit_progress(
        &mut progress_cb,
        RunStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
    );

    let cached = match &store {
        Some(store) if request.options.use_cache && store.has_run(&run_id) => {
            emit_progress(
                &mut progress_cb,
                RunStage::LoadingCachedResult,
                started,
                Some("Loading cached run".to_string()),
            );
            Some(store.load_response(&run_id)?)
        }
        _ => None,
    };
    let loaded_from_cache = cached.is_some();

    let raw = match cached {
        Some(raw) => raw,
        None => {
            emit_progress(
                &mut progress_cb,
                RunStage::Simulating,
                started,
                Some(format!("Simulating {} stages", prepared.request.stages.len())),
            );
            let raw = request
                .engine
                .simulate(&prepared.request, config.engine.timeout())
                .map_err(|err| {
                    warn!(run_id = %run_id, error = %err, "engine call failed");
                    err
                })?;

            if let Some(store) = &store {
                emit_progress(
                    &mut progress_cb,
                    RunStage::SavingResults,
                    started,
                    Some("Saving results".to_string()),
                );
                let manifest = RunManifest::new(
                    run_id.clone(),
                    prepared.request.scenario_name.clone(),
                    config.engine.version.clone(),
                    prepared.request.stages.len(),
                );
                store.save_run(&manifest, &prepared.request, &raw)?;
            }
            raw
        }
    };

    emit_progress(
        &mut progress_cb,
        RunStage::Normalizing,
        started,
        Some("Converting results".to_string()),
    );
    let display = to_display(&raw, config.display_units);
    let chips = annotate_chips(
        &prepared.units,
        &raw.stage_metrics,
        &raw.kpi,
        config.display_units,
    );

    let elapsed_wall_s = started.elapsed().as_secs_f64();
    info!(run_id = %run_id, cached = loaded_from_cache, elapsed_wall_s, "run finished");
    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some("Run completed".to_string()),
    );

    Ok(RunResponse {
        run_id,
        prepared,
        raw,
        display,
        chips,
        loaded_from_cache,
        elapsed_wall_s,
    })
}

/// Cached runs under `cache_dir`, most recent first.
pub fn list_runs(cache_dir: &Path) -> AppResult<Vec<RunManifest>> {
    let store = RunStore::new(cache_dir.to_path_buf())?;
    Ok(store.list_runs()?)
}

/// Load a cached run's manifest and SI response.
pub fn load_run(cache_dir: &Path, run_id: &str) -> AppResult<(RunManifest, ScenarioOutput)> {
    let store = RunStore::new(cache_dir.to_path_buf())?;
    let manifest = store.load_manifest(run_id)?;
    let response = store.load_response(run_id)?;
    Ok((manifest, response))
}
