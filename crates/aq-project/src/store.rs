//! Flowsheet persistence port.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::schema::Flowsheet;
use crate::{ProjectError, ProjectResult, load_json, load_yaml, save_json, save_yaml};

/// Where a flowsheet lives between sessions.
pub trait FlowsheetStore {
    fn save(&self, sheet: &Flowsheet) -> ProjectResult<()>;
    fn load(&self) -> ProjectResult<Flowsheet>;
}

/// One flowsheet on disk; `.json` files are JSON, anything else YAML.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}

impl FlowsheetStore for FileStore {
    fn save(&self, sheet: &Flowsheet) -> ProjectResult<()> {
        if self.is_json() {
            save_json(&self.path, sheet)
        } else {
            save_yaml(&self.path, sheet)
        }
    }

    fn load(&self) -> ProjectResult<Flowsheet> {
        if self.is_json() {
            load_json(&self.path)
        } else {
            load_yaml(&self.path)
        }
    }
}

/// In-process store, serialized through YAML so that loads see exactly what a
/// file round trip would produce.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlowsheetStore for MemoryStore {
    fn save(&self, sheet: &Flowsheet) -> ProjectResult<()> {
        crate::validate_flowsheet(sheet)?;
        let text = serde_yaml::to_string(sheet)?;
        let mut slot = self.slot.lock().map_err(|_| ProjectError::Store {
            what: "memory store lock poisoned".to_string(),
        })?;
        *slot = Some(text);
        Ok(())
    }

    fn load(&self) -> ProjectResult<Flowsheet> {
        let slot = self.slot.lock().map_err(|_| ProjectError::Store {
            what: "memory store lock poisoned".to_string(),
        })?;
        match slot.as_deref() {
            Some(text) => crate::parse_yaml(text),
            None => Err(ProjectError::Store {
                what: "nothing saved yet".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aq_core::UnitSystem;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().is_err());

        let sheet = Flowsheet::new("mem", UnitSystem::Us);
        store.save(&sheet).unwrap();
        assert_eq!(store.load().unwrap(), sheet);
    }

    #[test]
    fn file_store_picks_format_by_extension() {
        assert!(FileStore::new("a/b.JSON").is_json());
        assert!(!FileStore::new("a/b.yaml").is_json());
        assert!(!FileStore::new("a/b").is_json());
    }
}
