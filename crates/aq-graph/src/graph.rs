//! Node and edge traits for process graphs.
//!
//! The linearizer never owns the caller's data: it reads ids, endpoint roles
//! and horizontal positions through these traits and hands back references.

use std::fmt;

/// Role of a terminal node in the train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Feed,
    Product,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Feed => write!(f, "feed"),
            Endpoint::Product => write!(f, "product"),
        }
    }
}

/// Implemented by the type that represents a node on the canvas.
pub trait FlowNode {
    /// Stable node id.
    fn id(&self) -> &str;

    /// `Some` for the feed / product endpoints, `None` for process units.
    fn endpoint(&self) -> Option<Endpoint>;

    /// Horizontal canvas position, used only by [`auto_linearize`](crate::auto_linearize).
    fn x_position(&self) -> Option<f64>;

    fn is_unit(&self) -> bool {
        self.endpoint().is_none()
    }
}

/// Implemented by the type that represents a directed connection.
pub trait FlowEdge {
    fn source(&self) -> &str;
    fn target(&self) -> &str;
}

/// A plain directed connection between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub source: String,
    pub target: String,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl FlowEdge for Link {
    fn source(&self) -> &str {
        &self.source
    }

    fn target(&self) -> &str {
        &self.target
    }
}

impl<E: FlowEdge> FlowEdge for &E {
    fn source(&self) -> &str {
        (**self).source()
    }

    fn target(&self) -> &str {
        (**self).target()
    }
}
