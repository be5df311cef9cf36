use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use dwell_geo::Point;

use crate::error::RoadNetError;

/// Road network node identifier (e.g. an OSM intersection id).
pub type NodeId = i64;

/// Directed weighted road graph held in memory.
///
/// Nodes are intersections with a position on the projected plane; edges
/// are road segments weighted by driving length in meters.
#[derive(Debug, Default)]
pub struct RoadGraph {
    nodes: HashMap<NodeId, Point>,
    adjacency: HashMap<NodeId, Vec<(NodeId, f64)>>,
}

/// Dijkstra frontier entry. Ordered so the `BinaryHeap` pops the lowest
/// cost first; node id breaks cost ties to keep traversal deterministic.
struct Frontier {
    cost: f64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Costs are finite by construction (validated edge lengths).
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or repositions) an intersection.
    pub fn add_node(&mut self, id: NodeId, position: Point) {
        self.nodes.insert(id, position);
    }

    /// Adds a directed road segment. Both endpoints must already exist.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, length: f64) -> Result<(), RoadNetError> {
        if !length.is_finite() || length < 0.0 {
            return Err(RoadNetError::NegativeEdgeLength(length));
        }
        if !self.nodes.contains_key(&from) {
            return Err(RoadNetError::UnknownNode(from));
        }
        if !self.nodes.contains_key(&to) {
            return Err(RoadNetError::UnknownNode(to));
        }
        self.adjacency.entry(from).or_default().push((to, length));
        Ok(())
    }

    /// Adds a two-way road segment.
    pub fn add_edge_two_way(
        &mut self,
        a: NodeId,
        b: NodeId,
        length: f64,
    ) -> Result<(), RoadNetError> {
        self.add_edge(a, b, length)?;
        self.add_edge(b, a, length)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.nodes.get(&id).copied()
    }

    /// Returns the node closest to `p` as the crow flies, with the
    /// straight-line distance to it. `None` for an empty graph.
    pub fn nearest_node(&self, p: Point) -> Option<(NodeId, f64)> {
        self.nodes
            .iter()
            .map(|(&id, pos)| (id, pos.distance(&p)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)))
    }

    /// Network distances from `source` to every node reachable within
    /// `limit` meters. Bounded Dijkstra: the search never expands a node
    /// whose cost already exceeds the limit.
    pub fn shortest_paths_within(
        &self,
        source: NodeId,
        limit: f64,
    ) -> Result<HashMap<NodeId, f64>, RoadNetError> {
        if !self.nodes.contains_key(&source) {
            return Err(RoadNetError::UnknownNode(source));
        }

        let mut costs: HashMap<NodeId, f64> = HashMap::new();
        let mut heap = BinaryHeap::new();
        costs.insert(source, 0.0);
        heap.push(Frontier {
            cost: 0.0,
            node: source,
        });

        while let Some(Frontier { cost, node }) = heap.pop() {
            if cost > costs.get(&node).copied().unwrap_or(f64::INFINITY) {
                continue;
            }
            let Some(edges) = self.adjacency.get(&node) else {
                continue;
            };
            for &(next, length) in edges {
                let candidate = cost + length;
                if candidate > limit {
                    continue;
                }
                if candidate < costs.get(&next).copied().unwrap_or(f64::INFINITY) {
                    costs.insert(next, candidate);
                    heap.push(Frontier {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }

        Ok(costs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph() -> RoadGraph {
        // 1 --100-- 2 --100-- 3 --100-- 4
        let mut g = RoadGraph::new();
        for (id, x) in [(1, 0.0), (2, 100.0), (3, 200.0), (4, 300.0)] {
            g.add_node(id, Point::new(x, 0.0));
        }
        g.add_edge_two_way(1, 2, 100.0).unwrap();
        g.add_edge_two_way(2, 3, 100.0).unwrap();
        g.add_edge_two_way(3, 4, 100.0).unwrap();
        g
    }

    #[test]
    fn nearest_node_snaps_to_closest_intersection() {
        let g = line_graph();
        let (id, dist) = g.nearest_node(Point::new(120.0, 30.0)).unwrap();
        assert_eq!(id, 2);
        assert!((dist - (20.0f64.hypot(30.0))).abs() < 1e-9);
    }

    #[test]
    fn nearest_node_on_empty_graph_is_none() {
        let g = RoadGraph::new();
        assert!(g.nearest_node(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn dijkstra_respects_the_cost_limit() {
        let g = line_graph();
        let costs = g.shortest_paths_within(1, 150.0).unwrap();
        assert_eq!(costs.get(&1), Some(&0.0));
        assert_eq!(costs.get(&2), Some(&100.0));
        assert!(!costs.contains_key(&3), "200m exceeds the 150m limit");
    }

    #[test]
    fn dijkstra_finds_the_shorter_route() {
        // Two routes from 1 to 3: direct (500) and via 2 (100 + 100).
        let mut g = RoadGraph::new();
        g.add_node(1, Point::new(0.0, 0.0));
        g.add_node(2, Point::new(100.0, 0.0));
        g.add_node(3, Point::new(200.0, 0.0));
        g.add_edge(1, 3, 500.0).unwrap();
        g.add_edge(1, 2, 100.0).unwrap();
        g.add_edge(2, 3, 100.0).unwrap();

        let costs = g.shortest_paths_within(1, 1000.0).unwrap();
        assert_eq!(costs.get(&3), Some(&200.0));
    }

    #[test]
    fn edge_to_unknown_node_is_rejected() {
        let mut g = RoadGraph::new();
        g.add_node(1, Point::new(0.0, 0.0));
        assert!(matches!(
            g.add_edge(1, 99, 10.0),
            Err(RoadNetError::UnknownNode(99))
        ));
        assert!(matches!(
            g.add_edge(1, 1, -5.0),
            Err(RoadNetError::NegativeEdgeLength(_))
        ));
    }

    #[test]
    fn one_way_streets_are_directional() {
        let mut g = RoadGraph::new();
        g.add_node(1, Point::new(0.0, 0.0));
        g.add_node(2, Point::new(100.0, 0.0));
        g.add_edge(1, 2, 100.0).unwrap();

        assert!(g.shortest_paths_within(1, 500.0).unwrap().contains_key(&2));
        assert!(!g.shortest_paths_within(2, 500.0).unwrap().contains_key(&1));
    }
}
