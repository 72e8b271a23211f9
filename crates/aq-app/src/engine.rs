//! Boundary to the external simulation engine.

use std::path::PathBuf;
use std::time::Duration;

use aq_project::SimulationRequest;
use aq_results::ScenarioOutput;

/// Engine failure. Messages are the engine's own text, unedited.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("engine timed out after {seconds} s")]
    Timeout { seconds: u64 },

    #[error("{message}")]
    Rejected { message: String },

    #[error("transport failure: {message}")]
    Transport { message: String },
}

/// Anything that can turn an SI request into an SI scenario output.
///
/// One call per run; implementations must give up after `timeout`.
pub trait SimulationEngine {
    fn simulate(
        &self,
        request: &SimulationRequest,
        timeout: Duration,
    ) -> Result<ScenarioOutput, EngineError>;
}

/// Serves a previously recorded response regardless of the request.
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    response_path: PathBuf,
}

impl ReplayEngine {
    pub fn new(response_path: impl Into<PathBuf>) -> Self {
        Self {
            response_path: response_path.into(),
        }
    }
}

impl SimulationEngine for ReplayEngine {
    fn simulate(
        &self,
        _request: &SimulationRequest,
        _timeout: Duration,
    ) -> Result<ScenarioOutput, EngineError> {
        let content =
            std::fs::read_to_string(&self.response_path).map_err(|e| EngineError::Transport {
                message: format!("{}: {}", self.response_path.display(), e),
            })?;
        serde_json::from_str(&content).map_err(|e| EngineError::Rejected {
            message: e.to_string(),
        })
    }
}
