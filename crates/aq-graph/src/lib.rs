//! aq-graph: process-train topology for AquaNova.
//!
//! Provides:
//! - `FlowNode` / `FlowEdge` traits implemented by the caller's node and edge types
//! - `linearize`: prove the graph is a single feed -> product path
//! - `auto_linearize`: rebuild a straight chain from node positions
//!
//! # Example
//!
//! ```
//! use aq_graph::{auto_linearize, linearize, Endpoint, FlowNode};
//!
//! struct N(&'static str, Option<Endpoint>, f64);
//!
//! impl FlowNode for N {
//!     fn id(&self) -> &str { self.0 }
//!     fn endpoint(&self) -> Option<Endpoint> { self.1 }
//!     fn x_position(&self) -> Option<f64> { Some(self.2) }
//! }
//!
//! let nodes = [
//!     N("feed", Some(Endpoint::Feed), 0.0),
//!     N("ro-2", None, 300.0),
//!     N("ro-1", None, 100.0),
//!     N("product", Some(Endpoint::Product), 500.0),
//! ];
//! let edges = auto_linearize(&nodes);
//! let path = linearize(&nodes, &edges).unwrap();
//! let ids: Vec<&str> = path.iter().map(|n| n.id()).collect();
//! assert_eq!(ids, ["ro-1", "ro-2"]);
//! ```

pub mod error;
pub mod graph;
pub mod repair;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for ergonomics
pub use error::LinearizeError;
pub use graph::{Endpoint, FlowEdge, FlowNode, Link};
pub use repair::{auto_linearize, linearize_or_repair, Linearized};
pub use validate::linearize;
