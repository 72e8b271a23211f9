//! Best-effort topology repair.

use tracing::warn;

use crate::error::LinearizeError;
use crate::graph::{Endpoint, FlowEdge, FlowNode, Link};
use crate::validate::linearize;

/// Ignore the existing edges and chain feed -> units -> product, with units
/// ordered by ascending horizontal position.
///
/// Units without a position go last, and ties keep their input order. When
/// there are several feeds or products only the first of each is linked; the
/// following `linearize` still reports the endpoint count.
pub fn auto_linearize<N: FlowNode>(nodes: &[N]) -> Vec<Link> {
    let mut units: Vec<&N> = nodes.iter().filter(|n| n.is_unit()).collect();
    units.sort_by(|a, b| {
        let xa = a.x_position().filter(|x| x.is_finite()).unwrap_or(f64::INFINITY);
        let xb = b.x_position().filter(|x| x.is_finite()).unwrap_or(f64::INFINITY);
        xa.total_cmp(&xb)
    });

    let feed = nodes.iter().find(|n| n.endpoint() == Some(Endpoint::Feed));
    let product = nodes.iter().find(|n| n.endpoint() == Some(Endpoint::Product));

    let chain: Vec<&str> = feed
        .into_iter()
        .map(|n| n.id())
        .chain(units.iter().map(|n| n.id()))
        .chain(product.into_iter().map(|n| n.id()))
        .collect();

    chain
        .windows(2)
        .map(|pair| Link::new(pair[0], pair[1]))
        .collect()
}

/// Outcome of [`linearize_or_repair`].
#[derive(Debug)]
pub struct Linearized<'a, N> {
    /// Unit nodes in flow order.
    pub units: Vec<&'a N>,
    /// Replacement edges when the user's edges had to be rebuilt.
    pub repaired: Option<Vec<Link>>,
}

/// Validate the user's edges; on failure rebuild them with
/// [`auto_linearize`] and validate again.
///
/// When the repaired chain is still invalid the original error is returned,
/// since that is the one describing what the user drew.
pub fn linearize_or_repair<'a, N, E>(
    nodes: &'a [N],
    edges: &[E],
) -> Result<Linearized<'a, N>, LinearizeError>
where
    N: FlowNode,
    E: FlowEdge,
{
    match linearize(nodes, edges) {
        Ok(units) => Ok(Linearized {
            units,
            repaired: None,
        }),
        Err(original) => {
            let rebuilt = auto_linearize(nodes);
            match linearize(nodes, &rebuilt) {
                Ok(units) => {
                    warn!(reason = %original, "process graph rebuilt from node positions");
                    Ok(Linearized {
                        units,
                        repaired: Some(rebuilt),
                    })
                }
                Err(_) => Err(original),
            }
        }
    }
}
