//! Flowsheet loading, saving and structural checks.

use std::path::Path;

use aq_graph::{FlowNode, linearize};
use aq_project::{FileStore, Flowsheet, FlowsheetStore, NodeData, validate_flowsheet};

use crate::error::{AppError, AppResult};

/// Summary of a flowsheet for listing and `validate` output.
#[derive(Debug, Clone)]
pub struct FlowsheetSummary {
    pub name: String,
    pub version: u32,
    pub unit_count: usize,
    pub pump_count: usize,
    pub edge_count: usize,
    /// Unit ids in flow order when the drawn graph is a valid train.
    pub train: Option<Vec<String>>,
    /// Why the drawn graph is not a valid train.
    pub topology_error: Option<String>,
}

/// Load, migrate and validate a flowsheet file (YAML, or JSON by extension).
pub fn load_flowsheet(path: &Path) -> AppResult<Flowsheet> {
    if !path.exists() {
        return Err(AppError::FlowsheetRead {
            path: path.to_path_buf(),
            cause: std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
        });
    }
    Ok(FileStore::new(path).load()?)
}

/// Write a flowsheet at the latest schema version.
pub fn save_flowsheet(path: &Path, sheet: &Flowsheet) -> AppResult<()> {
    FileStore::new(path).save(sheet)?;
    Ok(())
}

/// Validate the document and check the drawn train without repairing it.
pub fn summarize_flowsheet(sheet: &Flowsheet) -> AppResult<FlowsheetSummary> {
    validate_flowsheet(sheet)?;

    let (train, topology_error) = match linearize(&sheet.nodes, &sheet.edges) {
        Ok(units) => (Some(units.iter().map(|n| n.id().to_string()).collect()), None),
        Err(err) => (None, Some(err.to_string())),
    };

    let units = sheet.nodes.iter().filter(|n| n.endpoint().is_none());
    let pump_count = units
        .clone()
        .filter(|n| matches!(n.data, NodeData::PUMP(_)))
        .count();

    Ok(FlowsheetSummary {
        name: sheet.name.clone(),
        version: sheet.version,
        unit_count: units.count(),
        pump_count,
        edge_count: sheet.edges.len(),
        train,
        topology_error,
    })
}
