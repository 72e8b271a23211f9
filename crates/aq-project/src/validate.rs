//! Flowsheet validation logic.
//!
//! Structural checks only. Whether the edges form a single train is decided
//! by the linearizer at run time, since an invalid train may still be
//! repaired from node positions.

use std::collections::HashSet;

use crate::schema::{Flowsheet, NodeData};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_flowsheet(sheet: &Flowsheet) -> Result<(), ValidationError> {
    if sheet.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: sheet.version,
        });
    }

    let mut node_ids = HashSet::new();
    for node in &sheet.nodes {
        if node.id.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "node id".to_string(),
                value: format!("{:?}", node.id),
                reason: "must not be empty".to_string(),
            });
        }
        if !node_ids.insert(node.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: node.id.clone(),
                context: "nodes".to_string(),
            });
        }
    }

    for edge in &sheet.edges {
        for id in [&edge.source, &edge.target] {
            if !node_ids.contains(id.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: id.clone(),
                    context: format!("edge {} -> {}", edge.source, edge.target),
                });
            }
        }
    }

    for node in &sheet.nodes {
        validate_percentages(&node.id, &node.data)?;
    }

    Ok(())
}

fn validate_percentages(id: &str, data: &NodeData) -> Result<(), ValidationError> {
    let fields: Vec<(&str, Option<f64>)> = match data {
        NodeData::RO(s) | NodeData::NF(s) => vec![
            ("recovery_target_pct", s.recovery_target_pct),
            ("pump_efficiency_pct", s.pump.pump_efficiency_pct),
        ],
        NodeData::HRRO(s) => vec![
            ("recovery_target_pct", s.recovery_target_pct),
            ("stop_recovery_pct", s.stop_recovery_pct),
            ("pump_efficiency_pct", s.pump.pump_efficiency_pct),
        ],
        NodeData::PUMP(p) => vec![("efficiency_pct", p.efficiency_pct)],
        NodeData::UF(_) | NodeData::MF(_) | NodeData::Feed | NodeData::Product => Vec::new(),
    };

    for (field, value) in fields {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            if !(0.0..=100.0).contains(&v) {
                return Err(ValidationError::InvalidValue {
                    field: format!("{id}.{field}"),
                    value: v.to_string(),
                    reason: "percentage must be within 0..=100".to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HrroStage, MembraneStage};
    use aq_core::UnitSystem;

    #[test]
    fn new_flowsheet_is_valid() {
        let sheet = Flowsheet::new("demo", UnitSystem::Metric);
        validate_flowsheet(&sheet).unwrap();
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut sheet = Flowsheet::new("demo", UnitSystem::Metric);
        let dup = sheet.nodes[0].clone();
        sheet.nodes.push(dup);
        let err = validate_flowsheet(&sheet).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { .. }));
    }

    #[test]
    fn dangling_edge_rejected() {
        let mut sheet = Flowsheet::new("demo", UnitSystem::Metric);
        sheet.connect("feed", "ghost");
        let err = validate_flowsheet(&sheet).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingReference {
                id: "ghost".into(),
                context: "edge feed -> ghost".into()
            }
        );
    }

    #[test]
    fn out_of_range_recovery_rejected() {
        let mut sheet = Flowsheet::new("demo", UnitSystem::Metric);
        sheet.add_unit(
            NodeData::HRRO(HrroStage {
                stop_recovery_pct: Some(140.0),
                ..Default::default()
            }),
            100.0,
        );
        let err = validate_flowsheet(&sheet).unwrap_err();
        assert!(err.to_string().contains("stop_recovery_pct"));
    }

    #[test]
    fn non_finite_percentages_left_to_defaults() {
        let mut sheet = Flowsheet::new("demo", UnitSystem::Metric);
        sheet.add_unit(
            NodeData::RO(MembraneStage {
                recovery_target_pct: Some(f64::NAN),
                ..Default::default()
            }),
            100.0,
        );
        validate_flowsheet(&sheet).unwrap();
    }

    #[test]
    fn future_version_rejected() {
        let mut sheet = Flowsheet::new("demo", UnitSystem::Metric);
        sheet.version = 3;
        assert_eq!(
            validate_flowsheet(&sheet),
            Err(ValidationError::UnsupportedVersion { version: 3 })
        );
    }
}
