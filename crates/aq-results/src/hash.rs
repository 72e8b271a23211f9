//! Content-based hashing for run IDs.

use aq_project::SimulationRequest;
use sha2::{Digest, Sha256};

/// SHA-256 over the SI request and the engine version label. Identical
/// requests against the same engine share a run id.
pub fn compute_run_id(request: &SimulationRequest, engine_version: &str) -> String {
    let mut hasher = Sha256::new();

    let request_json = serde_json::to_string(request).unwrap_or_default();
    hasher.update(request_json.as_bytes());

    hasher.update(engine_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
