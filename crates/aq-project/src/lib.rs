//! aq-project: canonical flowsheet file format, migration and validation,
//! plus the SI request contract sent to the simulation engine.

pub mod migrate;
pub mod schema;
pub mod store;
pub mod validate;
pub mod wire;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use store::{FileStore, FlowsheetStore, MemoryStore};
pub use validate::{ValidationError, validate_flowsheet};
pub use wire::{FeedRequest, ModuleType, SimulationRequest, StageDescriptor};

use std::path::Path;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Store error: {what}")]
    Store { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Migrate and validate an already-parsed document.
pub fn from_document(doc: serde_json::Value) -> ProjectResult<Flowsheet> {
    let doc = migrate_to_latest(doc)?;
    let sheet: Flowsheet = serde_json::from_value(doc)?;
    validate_flowsheet(&sheet)?;
    Ok(sheet)
}

pub fn parse_yaml(text: &str) -> ProjectResult<Flowsheet> {
    let doc: serde_json::Value = serde_yaml::from_str(text)?;
    from_document(doc)
}

pub fn parse_json(text: &str) -> ProjectResult<Flowsheet> {
    let doc: serde_json::Value = serde_json::from_str(text)?;
    from_document(doc)
}

pub fn load_yaml(path: &Path) -> ProjectResult<Flowsheet> {
    let content = std::fs::read_to_string(path)?;
    parse_yaml(&content)
}

pub fn save_yaml(path: &Path, sheet: &Flowsheet) -> ProjectResult<()> {
    validate_flowsheet(sheet)?;
    let content = serde_yaml::to_string(sheet)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Flowsheet> {
    let content = std::fs::read_to_string(path)?;
    parse_json(&content)
}

pub fn save_json(path: &Path, sheet: &Flowsheet) -> ProjectResult<()> {
    validate_flowsheet(sheet)?;
    let content = serde_json::to_string_pretty(sheet)?;
    std::fs::write(path, content)?;
    Ok(())
}
