//! Inter-node placement inside one compartment is delegated to a hierarchical
//! graph layout. The engine consumes this contract through a trait so tests
//! can substitute a stub; the default implementation drives dagre.

use std::collections::{BTreeMap, HashSet};

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};

use crate::config::Direction;
use crate::geometry::Vec2;

/// Node input to the graph layout step: identifier and the routing-inflated
/// box it must reserve.
#[derive(Debug, Clone)]
pub struct GraphNodeSpec {
    pub id: String,
    pub width: f32,
    pub height: f32,
}

/// Directed edge input. `min_len` of zero requests same-rank placement; any
/// other value stretches the edge across that many ranks.
#[derive(Debug, Clone)]
pub struct GraphEdgeSpec {
    pub start: String,
    pub end: String,
    pub min_len: Option<f32>,
}

/// One compartment's layout problem.
#[derive(Debug, Clone)]
pub struct GraphSpec {
    pub nodes: Vec<GraphNodeSpec>,
    pub edges: Vec<GraphEdgeSpec>,
    pub direction: Direction,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    /// Ranking algorithm hint; implementations may ignore it.
    pub ranker: Option<String>,
    /// Cycle removal hint; implementations may ignore it.
    pub acyclicer: Option<String>,
}

/// Provisional node centers plus the overall extent of the placed graph.
#[derive(Debug, Clone, Default)]
pub struct GraphResult {
    pub positions: BTreeMap<String, Vec2>,
    pub width: f32,
    pub height: f32,
}

/// The injected graph-layout step (crossing minimization, layering). Its
/// internals are outside this crate; only the contract matters here.
pub trait GraphLayout {
    fn solve(&self, spec: &GraphSpec) -> GraphResult;
}

/// Default graph layout backed by `dagre_rust`.
///
/// The ranker/acyclicer hints are not forwarded: the dagre port exposes no
/// switch for them at the configuration surface this crate uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DagreLayout;

impl GraphLayout for DagreLayout {
    fn solve(&self, spec: &GraphSpec) -> GraphResult {
        if spec.nodes.is_empty() {
            return GraphResult::default();
        }

        let mut graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
            DagreGraph::new(Some(GraphOption {
                directed: Some(true),
                multigraph: Some(false),
                compound: Some(false),
            }));

        let mut graph_config = DagreConfig::default();
        graph_config.rankdir = Some(spec.direction.rankdir().to_string());
        graph_config.nodesep = Some(spec.node_spacing);
        graph_config.ranksep = Some(spec.rank_spacing);
        graph_config.marginx = Some(0.0);
        graph_config.marginy = Some(0.0);
        graph.set_graph(graph_config);

        for (order, node) in spec.nodes.iter().enumerate() {
            let mut dagre_node = DagreNode::default();
            dagre_node.width = node.width;
            dagre_node.height = node.height;
            dagre_node.order = Some(order);
            graph.set_node(node.id.clone(), Some(dagre_node));
        }

        // Parallel edges collapse to one for ranking purposes; each
        // association is still routed individually afterwards.
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for edge in &spec.edges {
            if !seen.insert((edge.start.clone(), edge.end.clone())) {
                continue;
            }
            let mut edge_label = DagreEdge::default();
            if let Some(min_len) = edge.min_len {
                edge_label.minlen = Some(min_len as _);
            }
            let _ = graph.set_edge(&edge.start, &edge.end, Some(edge_label), None);
        }

        dagre_layout::run_layout(&mut graph);

        let mut result = GraphResult::default();
        for node in &spec.nodes {
            let Some(placed) = graph.node(&node.id) else {
                continue;
            };
            result
                .positions
                .insert(node.id.clone(), Vec2::new(placed.x, placed.y));
            result.width = result.width.max(placed.x + node.width / 2.0);
            result.height = result.height.max(placed.y + node.height / 2.0);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> GraphNodeSpec {
        GraphNodeSpec {
            id: id.to_string(),
            width: 60.0,
            height: 30.0,
        }
    }

    #[test]
    fn dagre_places_connected_nodes() {
        let spec = GraphSpec {
            nodes: vec![node("a"), node("b")],
            edges: vec![GraphEdgeSpec {
                start: "a".to_string(),
                end: "b".to_string(),
                min_len: None,
            }],
            direction: Direction::TopBottom,
            node_spacing: 40.0,
            rank_spacing: 40.0,
            ranker: None,
            acyclicer: None,
        };
        let result = DagreLayout.solve(&spec);
        assert_eq!(result.positions.len(), 2);
        assert!(result.width > 0.0);
        assert!(result.height > 0.0);
        let a = result.positions["a"];
        let b = result.positions["b"];
        // Top-to-bottom ranking separates the pair vertically.
        assert!(b.y > a.y);
    }

    #[test]
    fn empty_spec_yields_empty_result() {
        let spec = GraphSpec {
            nodes: Vec::new(),
            edges: Vec::new(),
            direction: Direction::TopBottom,
            node_spacing: 40.0,
            rank_spacing: 40.0,
            ranker: None,
            acyclicer: None,
        };
        let result = DagreLayout.solve(&spec);
        assert!(result.positions.is_empty());
        assert_eq!(result.width, 0.0);
        assert_eq!(result.height, 0.0);
    }
}
