//! Schema migration framework.
//!
//! Older documents use different key names, so migration runs on the untyped
//! document before it is deserialized into [`Flowsheet`](crate::Flowsheet).

use serde_json::{Map, Value};
use tracing::debug;

use crate::validate::ValidationError;
use crate::{ProjectError, ProjectResult};

pub const LATEST_VERSION: u32 = 2;

/// Version of a raw document. A missing `version` means 1.
pub fn document_version(doc: &Value) -> ProjectResult<u32> {
    match doc.get("version") {
        None | Some(Value::Null) => Ok(1),
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ProjectError::Migration {
                what: format!("version must be a non-negative integer, got {v}"),
            }),
    }
}

pub fn migrate_to_latest(mut doc: Value) -> ProjectResult<Value> {
    if !doc.is_object() {
        return Err(ProjectError::Migration {
            what: "flowsheet document must be a mapping".to_string(),
        });
    }
    let mut version = document_version(&doc)?;
    if version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion { version }.into());
    }
    while version < LATEST_VERSION {
        doc = migrate_one_version(doc, version)?;
        version += 1;
        debug!(version, "flowsheet migrated");
    }
    if let Some(obj) = doc.as_object_mut() {
        obj.insert("version".to_string(), Value::from(LATEST_VERSION));
    }
    Ok(doc)
}

fn migrate_one_version(doc: Value, version: u32) -> ProjectResult<Value> {
    match version {
        1 => Ok(migrate_v1_to_v2(doc)),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

fn migrate_v1_to_v2(mut doc: Value) -> Value {
    let Some(root) = doc.as_object_mut() else {
        return doc;
    };

    if let Some(feed) = root.get_mut("feed").and_then(Value::as_object_mut) {
        rename_key(feed, "flow", "flow_rate");
        rename_key(feed, "temp_C", "temperature");
        rename_key(feed, "pressure_bar", "pressure");
    }

    if let Some(nodes) = root.get_mut("nodes").and_then(Value::as_array_mut) {
        for node in nodes.iter_mut().filter_map(Value::as_object_mut) {
            migrate_node_v1(node);
        }
    }

    doc
}

fn migrate_node_v1(node: &mut Map<String, Value>) {
    // v1 kept the kind tag on the node itself
    let outer_tag = node.remove("type");
    let data = node
        .entry("data")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(data) = data.as_object_mut() else {
        return;
    };

    if let Some(tag) = outer_tag {
        data.entry("kind").or_insert(tag);
    }
    rename_key(data, "type", "kind");
    if let Some(Value::String(kind)) = data.get_mut("kind") {
        *kind = normalize_kind(kind);
    }

    rename_key(data, "num_elements", "elements");
    rename_key(data, "total_elements", "elements");
    rename_key(data, "pressure_bar", "pressure");
    rename_key(data, "ccro_recovery_pct", "stop_recovery_pct");
}

/// Move `from` to `to` unless `to` is already set.
fn rename_key(obj: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = obj.remove(from) {
        obj.entry(to).or_insert(value);
    }
}

fn normalize_kind(kind: &str) -> String {
    match kind.to_ascii_lowercase().as_str() {
        "feed" => "feed".to_string(),
        "product" => "product".to_string(),
        _ => kind.to_ascii_uppercase(),
    }
}
