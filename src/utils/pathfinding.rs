//! # Pathfinding Algorithms
//!
//! Graph traversal over the region graph: breadth-first shortest paths,
//! reachability, hop distances and cycle detection.
//!
//! Validation, quality analysis and gameplay collaborators all share this
//! single implementation.

use crate::{Connection, Map, RegionId};
use ::pathfinding::prelude::{bfs, bfs_reach};
use std::collections::{HashMap, HashSet, VecDeque};

/// Undirected adjacency view of a set of regions and connections.
///
/// Neighbour lists keep the order in which connections were added, which
/// makes every traversal deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionGraph {
    nodes: Vec<RegionId>,
    adjacency: HashMap<RegionId, Vec<RegionId>>,
}

impl RegionGraph {
    /// Creates a graph with the given nodes and no edges.
    pub fn new(nodes: impl IntoIterator<Item = RegionId>) -> Self {
        let mut graph = Self::default();
        for node in nodes {
            graph.add_node(node);
        }
        graph
    }

    /// Builds the graph of all connections in a map.
    pub fn from_map(map: &Map) -> Self {
        Self::from_map_filtered(map, |_| true)
    }

    /// Builds the graph of the connections accepted by `keep`.
    ///
    /// Connections pointing at regions the map does not contain are skipped.
    pub fn from_map_filtered(map: &Map, mut keep: impl FnMut(&Connection) -> bool) -> Self {
        let mut graph = Self::new(map.regions().iter().map(|region| region.id));
        for conn in map.connections() {
            if keep(conn) && graph.contains(conn.source) && graph.contains(conn.target) {
                graph.add_edge(conn.source, conn.target);
            }
        }
        graph
    }

    /// Builds a graph from explicit node and edge lists.
    pub fn from_edges(
        nodes: impl IntoIterator<Item = RegionId>,
        edges: &[(RegionId, RegionId)],
    ) -> Self {
        let mut graph = Self::new(nodes);
        for &(a, b) in edges {
            graph.add_edge(a, b);
        }
        graph
    }

    pub fn add_node(&mut self, node: RegionId) {
        if !self.adjacency.contains_key(&node) {
            self.nodes.push(node);
            self.adjacency.insert(node, Vec::new());
        }
    }

    /// Adds an undirected edge. Self-loops and repeated pairs are ignored.
    pub fn add_edge(&mut self, a: RegionId, b: RegionId) {
        if a == b {
            return;
        }
        self.add_node(a);
        self.add_node(b);
        if let Some(list) = self.adjacency.get_mut(&a) {
            if !list.contains(&b) {
                list.push(b);
            }
        }
        if let Some(list) = self.adjacency.get_mut(&b) {
            if !list.contains(&a) {
                list.push(a);
            }
        }
    }

    pub fn nodes(&self) -> &[RegionId] {
        &self.nodes
    }

    pub fn contains(&self, node: RegionId) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn neighbors(&self, node: RegionId) -> &[RegionId] {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Breadth-first search and cycle detection over a [`RegionGraph`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PathFinder;

impl PathFinder {
    /// Creates a new path finder.
    pub fn new() -> Self {
        Self
    }

    /// Finds a shortest path by edge count, including both endpoints.
    ///
    /// Ties are broken by neighbour discovery order. Returns `None` when
    /// either endpoint is unknown or no path exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{PathFinder, RegionGraph, RegionId};
    ///
    /// let (a, b, c) = (RegionId(1), RegionId(2), RegionId(3));
    /// let graph = RegionGraph::from_edges([a, b, c], &[(a, b), (b, c)]);
    /// let path = PathFinder::new().shortest_path(&graph, a, c);
    /// assert_eq!(path, Some(vec![a, b, c]));
    /// ```
    pub fn shortest_path(
        &self,
        graph: &RegionGraph,
        start: RegionId,
        goal: RegionId,
    ) -> Option<Vec<RegionId>> {
        if !graph.contains(start) || !graph.contains(goal) {
            return None;
        }
        bfs(
            &start,
            |node| graph.neighbors(*node).iter().copied(),
            |node| *node == goal,
        )
    }

    /// Every region reachable from `start`, including `start` itself.
    pub fn reachable_from(&self, graph: &RegionGraph, start: RegionId) -> HashSet<RegionId> {
        if !graph.contains(start) {
            return HashSet::new();
        }
        bfs_reach(start, |node| graph.neighbors(*node).iter().copied()).collect()
    }

    /// Hop distance from `start` to every reachable region.
    pub fn distances_from(&self, graph: &RegionGraph, start: RegionId) -> HashMap<RegionId, usize> {
        let mut distances = HashMap::new();
        if !graph.contains(start) {
            return distances;
        }

        let mut queue = VecDeque::new();
        distances.insert(start, 0);
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            let next_distance = distances[&node] + 1;
            for &neighbor in graph.neighbors(node) {
                if !distances.contains_key(&neighbor) {
                    distances.insert(neighbor, next_distance);
                    queue.push_back(neighbor);
                }
            }
        }

        distances
    }

    /// Whether every node is reachable from the first one.
    pub fn is_connected(&self, graph: &RegionGraph) -> bool {
        match graph.nodes().first() {
            Some(&first) => self.reachable_from(graph, first).len() == graph.node_count(),
            None => true,
        }
    }

    /// Finds cycles with a depth-first walk that tracks the current path.
    ///
    /// Whenever a neighbour (other than the node we came from) is already on
    /// the path stack, the stack slice from that neighbour to the current
    /// node is reported as one cycle. Each independent cycle of an undirected
    /// simple graph is reported exactly once.
    pub fn find_cycles(&self, graph: &RegionGraph) -> Vec<Vec<RegionId>> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();
        let mut cycles = Vec::new();

        for &root in graph.nodes() {
            if !visited.contains(&root) {
                self.walk(graph, root, None, &mut visited, &mut stack, &mut cycles);
            }
        }

        cycles
    }

    fn walk(
        &self,
        graph: &RegionGraph,
        node: RegionId,
        parent: Option<RegionId>,
        visited: &mut HashSet<RegionId>,
        stack: &mut Vec<RegionId>,
        cycles: &mut Vec<Vec<RegionId>>,
    ) {
        visited.insert(node);
        stack.push(node);

        for &next in graph.neighbors(node) {
            if Some(next) == parent {
                continue;
            }
            if let Some(pos) = stack.iter().position(|&id| id == next) {
                cycles.push(stack[pos..].to_vec());
            } else if !visited.contains(&next) {
                self.walk(graph, next, Some(node), visited, stack, cycles);
            }
        }

        stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<RegionId> {
        raw.iter().map(|&id| RegionId(id)).collect()
    }

    fn line_graph(n: u32) -> RegionGraph {
        let nodes = ids(&(1..=n).collect::<Vec<_>>());
        let edges: Vec<_> = nodes.windows(2).map(|pair| (pair[0], pair[1])).collect();
        RegionGraph::from_edges(nodes, &edges)
    }

    #[test]
    fn test_graph_ignores_self_loops_and_duplicates() {
        let mut graph = RegionGraph::new(ids(&[1, 2]));
        graph.add_edge(RegionId(1), RegionId(2));
        graph.add_edge(RegionId(2), RegionId(1));
        graph.add_edge(RegionId(1), RegionId(1));

        assert_eq!(graph.neighbors(RegionId(1)), &[RegionId(2)]);
        assert_eq!(graph.neighbors(RegionId(2)), &[RegionId(1)]);
        assert!(graph.neighbors(RegionId(9)).is_empty());
    }

    #[test]
    fn test_shortest_path_on_line() {
        let graph = line_graph(5);
        let finder = PathFinder::new();

        let path = finder.shortest_path(&graph, RegionId(1), RegionId(5)).unwrap();
        assert_eq!(path, ids(&[1, 2, 3, 4, 5]));

        let same = finder.shortest_path(&graph, RegionId(3), RegionId(3)).unwrap();
        assert_eq!(same, ids(&[3]));
    }

    #[test]
    fn test_shortest_path_prefers_fewer_hops() {
        // 1-2-3-4 plus the shortcut 1-4
        let graph = RegionGraph::from_edges(
            ids(&[1, 2, 3, 4]),
            &[
                (RegionId(1), RegionId(2)),
                (RegionId(2), RegionId(3)),
                (RegionId(3), RegionId(4)),
                (RegionId(1), RegionId(4)),
            ],
        );
        let path = PathFinder::new().shortest_path(&graph, RegionId(1), RegionId(4));
        assert_eq!(path, Some(ids(&[1, 4])));
    }

    #[test]
    fn test_shortest_path_tie_uses_discovery_order() {
        // Two equal routes 1-2-4 and 1-3-4; 2 is discovered first.
        let graph = RegionGraph::from_edges(
            ids(&[1, 2, 3, 4]),
            &[
                (RegionId(1), RegionId(2)),
                (RegionId(1), RegionId(3)),
                (RegionId(2), RegionId(4)),
                (RegionId(3), RegionId(4)),
            ],
        );
        let path = PathFinder::new().shortest_path(&graph, RegionId(1), RegionId(4));
        assert_eq!(path, Some(ids(&[1, 2, 4])));
    }

    #[test]
    fn test_no_path_between_components() {
        let graph = RegionGraph::from_edges(
            ids(&[1, 2, 3, 4]),
            &[(RegionId(1), RegionId(2)), (RegionId(3), RegionId(4))],
        );
        let finder = PathFinder::new();

        assert!(
            finder.shortest_path(&graph, RegionId(1), RegionId(4)).is_none()
        );
        assert!(
            finder.shortest_path(&graph, RegionId(1), RegionId(99)).is_none()
        );
        assert!(!finder.is_connected(&graph));
        assert_eq!(finder.reachable_from(&graph, RegionId(3)).len(), 2);
    }

    #[test]
    fn test_distances() {
        let graph = line_graph(4);
        let distances = PathFinder::new().distances_from(&graph, RegionId(2));

        assert_eq!(distances[&RegionId(2)], 0);
        assert_eq!(distances[&RegionId(1)], 1);
        assert_eq!(distances[&RegionId(4)], 2);
    }

    #[test]
    fn test_tree_has_no_cycles() {
        let graph = line_graph(6);
        assert!(PathFinder::new().find_cycles(&graph).is_empty());
    }

    #[test]
    fn test_triangle_cycle_reported_once() {
        let graph = RegionGraph::from_edges(
            ids(&[1, 2, 3, 4]),
            &[
                (RegionId(1), RegionId(2)),
                (RegionId(2), RegionId(3)),
                (RegionId(3), RegionId(1)),
                (RegionId(3), RegionId(4)),
            ],
        );
        let cycles = PathFinder::new().find_cycles(&graph);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], ids(&[1, 2, 3]));
    }

    #[test]
    fn test_cycle_count_matches_cyclomatic_number() {
        // Square with one diagonal: 5 edges, 4 nodes, 1 component => 2 cycles
        let graph = RegionGraph::from_edges(
            ids(&[1, 2, 3, 4]),
            &[
                (RegionId(1), RegionId(2)),
                (RegionId(2), RegionId(3)),
                (RegionId(3), RegionId(4)),
                (RegionId(4), RegionId(1)),
                (RegionId(1), RegionId(3)),
            ],
        );
        assert_eq!(PathFinder::new().find_cycles(&graph).len(), 2);
    }
}
