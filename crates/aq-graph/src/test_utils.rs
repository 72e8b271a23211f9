//! Minimal node / edge types for unit tests.

use crate::graph::{Endpoint, FlowNode};
use crate::Link;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TestNode {
    pub id: String,
    pub endpoint: Option<Endpoint>,
    pub x: Option<f64>,
}

impl TestNode {
    pub fn feed() -> Self {
        Self {
            id: "feed".into(),
            endpoint: Some(Endpoint::Feed),
            x: Some(0.0),
        }
    }

    pub fn product() -> Self {
        Self {
            id: "product".into(),
            endpoint: Some(Endpoint::Product),
            x: Some(1000.0),
        }
    }

    pub fn unit(id: &str, x: f64) -> Self {
        Self {
            id: id.into(),
            endpoint: None,
            x: Some(x),
        }
    }
}

impl FlowNode for TestNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn endpoint(&self) -> Option<Endpoint> {
        self.endpoint
    }

    fn x_position(&self) -> Option<f64> {
        self.x
    }
}

pub(crate) fn links(pairs: &[(&str, &str)]) -> Vec<Link> {
    pairs.iter().map(|(s, t)| Link::new(*s, *t)).collect()
}

pub(crate) fn ids<N: FlowNode>(nodes: &[&N]) -> Vec<String> {
    nodes.iter().map(|n| n.id().to_string()).collect()
}
