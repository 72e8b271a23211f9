//! Topology errors reported to the user.

use thiserror::Error;

use crate::graph::Endpoint;

/// Why a process graph is not a single feed -> product train.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinearizeError {
    #[error("Expected exactly one {role} node, found {found}")]
    EndpointCount { role: Endpoint, found: usize },

    #[error("Duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("Connection {from} -> {to} refers to unknown node {missing}")]
    UnknownNode {
        from: String,
        to: String,
        missing: String,
    },

    #[error("Feed node {id} must not have incoming connections")]
    FeedHasInflow { id: String },

    #[error("Product node {id} must not have outgoing connections")]
    ProductHasOutflow { id: String },

    #[error("Node {id} splits into {out_degree} outlets; parallel trains are not supported")]
    Branching { id: String, out_degree: usize },

    #[error("Node {id} merges {in_degree} inlets; parallel trains are not supported")]
    Merging { id: String, in_degree: usize },

    #[error("Cycle detected: the train returns to node {id}")]
    Cycle { id: String },

    #[error("Train stops at node {id} without reaching the product")]
    Disconnected { id: String },
}

impl LinearizeError {
    /// Short machine-readable reason, stable across message wording changes.
    pub fn reason(&self) -> &'static str {
        match self {
            LinearizeError::EndpointCount { .. } => "endpoints",
            LinearizeError::DuplicateNode { .. } => "duplicate",
            LinearizeError::UnknownNode { .. } => "unknown-node",
            LinearizeError::FeedHasInflow { .. } => "feed-inflow",
            LinearizeError::ProductHasOutflow { .. } => "product-outflow",
            LinearizeError::Branching { .. } => "branching",
            LinearizeError::Merging { .. } => "merging",
            LinearizeError::Cycle { .. } => "cycle",
            LinearizeError::Disconnected { .. } => "disconnected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LinearizeError::EndpointCount {
            role: Endpoint::Feed,
            found: 0,
        };
        assert_eq!(err.to_string(), "Expected exactly one feed node, found 0");

        let err = LinearizeError::Branching {
            id: "ro-1".into(),
            out_degree: 2,
        };
        assert!(err.to_string().contains("ro-1"));
        assert_eq!(err.reason(), "branching");
    }
}
