//! Run cache: one directory per run id holding the manifest, the SI request
//! and the SI response.

use std::fs;
use std::path::PathBuf;

use aq_project::SimulationRequest;
use tracing::debug;

use crate::types::{RunManifest, ScenarioOutput};
use crate::{ResultsError, ResultsResult};

const MANIFEST: &str = "manifest.json";
const REQUEST: &str = "request.json";
const RESPONSE: &str = "response.json";

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join(MANIFEST).exists()
    }

    pub fn save_run(
        &self,
        manifest: &RunManifest,
        request: &SimulationRequest,
        response: &ScenarioOutput,
    ) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        fs::write(run_dir.join(REQUEST), serde_json::to_string_pretty(request)?)?;
        fs::write(run_dir.join(RESPONSE), serde_json::to_string_pretty(response)?)?;
        // manifest last: its presence marks the run complete
        fs::write(run_dir.join(MANIFEST), serde_json::to_string_pretty(manifest)?)?;

        debug!(run_id = %manifest.run_id, "run cached");
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        self.read_json(run_id, MANIFEST)
    }

    pub fn load_request(&self, run_id: &str) -> ResultsResult<SimulationRequest> {
        self.read_json(run_id, REQUEST)
    }

    pub fn load_response(&self, run_id: &str) -> ResultsResult<ScenarioOutput> {
        self.read_json(run_id, RESPONSE)
    }

    /// All complete runs, newest first.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id) {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, run_id: &str, file: &str) -> ResultsResult<T> {
        let path = self.run_dir(run_id).join(file);
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
