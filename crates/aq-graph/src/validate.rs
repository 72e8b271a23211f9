//! Train linearization.
//!
//! Checks run in a fixed order so that each graph reports one stable reason:
//! endpoint counts, endpoint degrees, branching, the walk from the feed
//! (cycle / disconnected), then merging. Merging is checked after the walk
//! because any cycle reachable from the feed necessarily has a node with two
//! inlets; running the walk first reports such graphs as cycles.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::{debug, warn};

use crate::error::LinearizeError;
use crate::graph::{Endpoint, FlowEdge, FlowNode};

/// Prove that `nodes` / `edges` form one path from the feed to the product
/// and return the unit nodes along it, in flow order, endpoints excluded.
pub fn linearize<'a, N, E>(nodes: &'a [N], edges: &[E]) -> Result<Vec<&'a N>, LinearizeError>
where
    N: FlowNode,
    E: FlowEdge,
{
    let feed = find_endpoint(nodes, Endpoint::Feed)?;
    let product = find_endpoint(nodes, Endpoint::Product)?;

    let (graph, indices) = build_graph(nodes, edges)?;
    let feed_ix = indices[feed.id()];
    let product_ix = indices[product.id()];

    if degree(&graph, feed_ix, Direction::Incoming) > 0 {
        return Err(LinearizeError::FeedHasInflow {
            id: feed.id().to_string(),
        });
    }
    if degree(&graph, product_ix, Direction::Outgoing) > 0 {
        return Err(LinearizeError::ProductHasOutflow {
            id: product.id().to_string(),
        });
    }

    for ix in graph.node_indices() {
        let out_degree = degree(&graph, ix, Direction::Outgoing);
        if out_degree > 1 {
            return Err(LinearizeError::Branching {
                id: nodes[graph[ix]].id().to_string(),
                out_degree,
            });
        }
    }

    let path = walk(nodes, &graph, feed_ix, product_ix)?;

    for ix in graph.node_indices() {
        let in_degree = degree(&graph, ix, Direction::Incoming);
        if in_degree > 1 {
            return Err(LinearizeError::Merging {
                id: nodes[graph[ix]].id().to_string(),
                in_degree,
            });
        }
    }

    let off_path = nodes.len() - path.len() - 2;
    if off_path > 0 {
        warn!(off_path, "nodes not on the feed -> product train are ignored");
    }
    debug!(units = path.len(), "train linearized");

    Ok(path)
}

fn find_endpoint<N: FlowNode>(nodes: &[N], role: Endpoint) -> Result<&N, LinearizeError> {
    let mut matching = nodes.iter().filter(|n| n.endpoint() == Some(role));
    match (matching.next(), matching.count()) {
        (Some(node), 0) => Ok(node),
        (first, rest) => Err(LinearizeError::EndpointCount {
            role,
            found: usize::from(first.is_some()) + rest,
        }),
    }
}

/// Node weights are indices into the caller's node slice.
fn build_graph<'a, N, E>(
    nodes: &'a [N],
    edges: &[E],
) -> Result<(DiGraph<usize, ()>, HashMap<&'a str, NodeIndex>), LinearizeError>
where
    N: FlowNode,
    E: FlowEdge,
{
    let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
    let mut indices = HashMap::with_capacity(nodes.len());

    for (i, node) in nodes.iter().enumerate() {
        let ix = graph.add_node(i);
        if indices.insert(node.id(), ix).is_some() {
            return Err(LinearizeError::DuplicateNode {
                id: node.id().to_string(),
            });
        }
    }

    for edge in edges {
        let lookup = |id: &str| {
            indices
                .get(id)
                .copied()
                .ok_or_else(|| LinearizeError::UnknownNode {
                    from: edge.source().to_string(),
                    to: edge.target().to_string(),
                    missing: id.to_string(),
                })
        };
        let from = lookup(edge.source())?;
        let to = lookup(edge.target())?;
        graph.add_edge(from, to, ());
    }

    Ok((graph, indices))
}

fn degree(graph: &DiGraph<usize, ()>, ix: NodeIndex, dir: Direction) -> usize {
    graph.edges_directed(ix, dir).count()
}

/// Follow the unique outlet of every node from the feed until the product.
fn walk<'a, N: FlowNode>(
    nodes: &'a [N],
    graph: &DiGraph<usize, ()>,
    feed: NodeIndex,
    product: NodeIndex,
) -> Result<Vec<&'a N>, LinearizeError> {
    let mut visited = HashSet::from([feed]);
    let mut path = Vec::new();
    let mut current = feed;

    loop {
        let Some(next) = graph.neighbors_directed(current, Direction::Outgoing).next() else {
            return Err(LinearizeError::Disconnected {
                id: nodes[graph[current]].id().to_string(),
            });
        };
        if next == product {
            return Ok(path);
        }
        if !visited.insert(next) {
            return Err(LinearizeError::Cycle {
                id: nodes[graph[next]].id().to_string(),
            });
        }
        path.push(&nodes[graph[next]]);
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ids, links, TestNode};

    fn chain_nodes() -> Vec<TestNode> {
        vec![
            TestNode::feed(),
            TestNode::unit("a", 100.0),
            TestNode::unit("b", 200.0),
            TestNode::product(),
        ]
    }

    #[test]
    fn straight_chain_in_order() {
        let nodes = chain_nodes();
        let edges = links(&[("feed", "a"), ("a", "b"), ("b", "product")]);
        let path = linearize(&nodes, &edges).unwrap();
        assert_eq!(ids(&path), ["a", "b"]);
    }

    #[test]
    fn edge_order_does_not_matter() {
        let nodes = chain_nodes();
        let edges = links(&[("b", "product"), ("feed", "a"), ("a", "b")]);
        let path = linearize(&nodes, &edges).unwrap();
        assert_eq!(ids(&path), ["a", "b"]);
    }

    #[test]
    fn feed_straight_to_product_is_empty_train() {
        let nodes = vec![TestNode::feed(), TestNode::product()];
        let edges = links(&[("feed", "product")]);
        assert!(linearize(&nodes, &edges).unwrap().is_empty());
    }

    #[test]
    fn missing_product() {
        let nodes = vec![TestNode::feed(), TestNode::unit("a", 1.0)];
        let edges = links(&[("feed", "a")]);
        let err = linearize(&nodes, &edges).unwrap_err();
        assert_eq!(
            err,
            LinearizeError::EndpointCount {
                role: Endpoint::Product,
                found: 0
            }
        );
    }

    #[test]
    fn two_feeds() {
        let mut nodes = chain_nodes();
        let mut second = TestNode::feed();
        second.id = "feed-2".into();
        nodes.push(second);
        let err = linearize(&nodes, &links(&[])).unwrap_err();
        assert_eq!(
            err,
            LinearizeError::EndpointCount {
                role: Endpoint::Feed,
                found: 2
            }
        );
    }

    #[test]
    fn feed_with_inflow() {
        let nodes = chain_nodes();
        let edges = links(&[("a", "feed"), ("feed", "b"), ("b", "product")]);
        let err = linearize(&nodes, &edges).unwrap_err();
        assert_eq!(err.reason(), "feed-inflow");
    }

    #[test]
    fn product_with_outflow() {
        let nodes = chain_nodes();
        let edges = links(&[("feed", "a"), ("a", "product"), ("product", "b")]);
        let err = linearize(&nodes, &edges).unwrap_err();
        assert_eq!(err.reason(), "product-outflow");
    }

    #[test]
    fn branching_rejected() {
        let nodes = chain_nodes();
        let edges = links(&[("feed", "a"), ("a", "b"), ("a", "product"), ("b", "product")]);
        let err = linearize(&nodes, &edges).unwrap_err();
        assert_eq!(
            err,
            LinearizeError::Branching {
                id: "a".into(),
                out_degree: 2
            }
        );
    }

    #[test]
    fn merging_rejected() {
        let mut nodes = chain_nodes();
        nodes.push(TestNode::unit("c", 150.0));
        let edges = links(&[("feed", "a"), ("a", "b"), ("c", "b"), ("b", "product")]);
        let err = linearize(&nodes, &edges).unwrap_err();
        assert_eq!(
            err,
            LinearizeError::Merging {
                id: "b".into(),
                in_degree: 2
            }
        );
    }

    #[test]
    fn reachable_cycle_reported_as_cycle() {
        let nodes = chain_nodes();
        let edges = links(&[("feed", "a"), ("a", "b"), ("b", "a")]);
        let err = linearize(&nodes, &edges).unwrap_err();
        assert_eq!(err, LinearizeError::Cycle { id: "a".into() });
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let nodes = chain_nodes();
        let edges = links(&[("feed", "a"), ("a", "a")]);
        let err = linearize(&nodes, &edges).unwrap_err();
        assert_eq!(err.reason(), "cycle");
    }

    #[test]
    fn dead_end_is_disconnected() {
        let nodes = chain_nodes();
        let edges = links(&[("feed", "a"), ("b", "product")]);
        let err = linearize(&nodes, &edges).unwrap_err();
        assert_eq!(err, LinearizeError::Disconnected { id: "a".into() });
    }

    #[test]
    fn unknown_node_in_edge() {
        let nodes = chain_nodes();
        let edges = links(&[("feed", "ghost")]);
        let err = linearize(&nodes, &edges).unwrap_err();
        assert_eq!(err.reason(), "unknown-node");
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut nodes = chain_nodes();
        nodes.push(TestNode::unit("a", 300.0));
        let err = linearize(&nodes, &links(&[])).unwrap_err();
        assert_eq!(err, LinearizeError::DuplicateNode { id: "a".into() });
    }

    #[test]
    fn orphan_units_are_skipped() {
        let mut nodes = chain_nodes();
        nodes.push(TestNode::unit("orphan", 50.0));
        let edges = links(&[("feed", "a"), ("a", "b"), ("b", "product")]);
        let path = linearize(&nodes, &edges).unwrap();
        assert_eq!(ids(&path), ["a", "b"]);
    }
}
