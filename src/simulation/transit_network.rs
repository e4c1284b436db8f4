//! Station graph for travel planning
//!
//! Nodes are stations, edges are consecutive station pairs of finished paths.
//! Two lines serving the same pair produce two parallel edges so the search
//! can count line changes.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use super::path::SimPath;
use super::shape::ShapeType;
use super::station::SimStation;
use super::types::{PathId, StationId};

/// Cost of reaching a search state: hops first, then line changes
type RouteCost = (u32, u32);

/// Search state: a station reached while riding a given line
type RouteState = (NodeIndex, Option<PathId>);

#[derive(Default)]
pub struct SimTransitNetwork {
    /// Undirected multigraph, one edge per (path, consecutive pair)
    graph: UnGraph<StationId, PathId>,

    /// Maps station IDs to their node indices in the graph
    station_to_node: HashMap<StationId, NodeIndex>,

    /// Insertion order of each station, used to break ties between destinations
    station_order: HashMap<StationId, usize>,

    station_types: HashMap<StationId, ShapeType>,

    /// Stations of each shape type, in insertion order
    destinations_by_shape: HashMap<ShapeType, Vec<StationId>>,

    /// Cached routes keyed by origin and destination shape
    route_cache: HashMap<(StationId, ShapeType), Option<Vec<StationId>>>,
}

impl SimTransitNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the graph from the current stations and finished paths
    pub fn rebuild(&mut self, stations: &[SimStation], paths: &[SimPath]) {
        self.graph.clear();
        self.station_to_node.clear();
        self.station_order.clear();
        self.station_types.clear();
        self.destinations_by_shape.clear();
        self.route_cache.clear();

        for (order, station) in stations.iter().enumerate() {
            let node = self.graph.add_node(station.id);
            self.station_to_node.insert(station.id, node);
            self.station_order.insert(station.id, order);
            self.station_types.insert(station.id, station.shape_type());
            self.destinations_by_shape
                .entry(station.shape_type())
                .or_default()
                .push(station.id);
        }

        for path in paths.iter().filter(|p| !p.is_being_created) {
            for (from, to) in path.edges() {
                if let (Some(&a), Some(&b)) =
                    (self.station_to_node.get(&from), self.station_to_node.get(&to))
                {
                    self.graph.add_edge(a, b, path.id);
                }
            }
        }
    }

    pub fn station_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Stations directly connected to `station_id` by some finished path
    pub fn neighbors(&self, station_id: StationId) -> Vec<StationId> {
        let Some(&node) = self.station_to_node.get(&station_id) else {
            return Vec::new();
        };

        let mut neighbors: Vec<StationId> = Vec::new();
        for edge in self.graph.edges(node) {
            let other = if edge.source() == node { edge.target() } else { edge.source() };
            let other_station = self.graph[other];
            if !neighbors.contains(&other_station) {
                neighbors.push(other_station);
            }
        }
        neighbors.sort_by_key(|id| self.station_order.get(id).copied().unwrap_or(usize::MAX));
        neighbors
    }

    /// Lines running directly between two stations
    pub fn lines_between(&self, a: StationId, b: StationId) -> Vec<PathId> {
        let (Some(&na), Some(&nb)) = (self.station_to_node.get(&a), self.station_to_node.get(&b))
        else {
            return Vec::new();
        };
        self.graph
            .edges_connecting(na, nb)
            .map(|edge| *edge.weight())
            .collect()
    }

    pub fn has_destination(&self, shape: ShapeType) -> bool {
        self.destinations_by_shape
            .get(&shape)
            .is_some_and(|stations| !stations.is_empty())
    }

    /// Route from `start` to the nearest station of shape `destination`.
    ///
    /// Fewest hops wins, then fewest line changes, then the destination that
    /// was added to the map first. The route includes `start`.
    pub fn find_route(&mut self, start: StationId, destination: ShapeType) -> Option<Vec<StationId>> {
        if let Some(cached) = self.route_cache.get(&(start, destination)) {
            return cached.clone();
        }

        let route = self.search(start, destination);
        self.route_cache.insert((start, destination), route.clone());
        route
    }

    fn search(&self, start: StationId, destination: ShapeType) -> Option<Vec<StationId>> {
        if !self.has_destination(destination) {
            return None;
        }
        let start_node = *self.station_to_node.get(&start)?;
        if self.station_types.get(&start) == Some(&destination) {
            return Some(vec![start]);
        }

        let mut best: HashMap<RouteState, RouteCost> = HashMap::new();
        let mut previous: HashMap<RouteState, RouteState> = HashMap::new();
        let mut heap = BinaryHeap::new();

        let start_state: RouteState = (start_node, None);
        best.insert(start_state, (0, 0));
        heap.push(Reverse((0u32, 0u32, self.order_of(start_node), start_node, None::<PathId>)));

        while let Some(Reverse((hops, transfers, _, node, line))) = heap.pop() {
            let state: RouteState = (node, line);
            if best.get(&state).is_some_and(|cost| *cost < (hops, transfers)) {
                continue;
            }

            let station = self.graph[node];
            if node != start_node && self.station_types.get(&station) == Some(&destination) {
                return Some(self.reconstruct(state, &previous));
            }

            for edge in self.graph.edges(node) {
                let other = if edge.source() == node { edge.target() } else { edge.source() };
                let edge_line = *edge.weight();
                let changes = match line {
                    Some(current) if current != edge_line => transfers + 1,
                    _ => transfers,
                };
                let cost = (hops + 1, changes);
                let next_state: RouteState = (other, Some(edge_line));

                let improves = best.get(&next_state).map_or(true, |known| cost < *known);
                if improves {
                    best.insert(next_state, cost);
                    previous.insert(next_state, state);
                    heap.push(Reverse((cost.0, cost.1, self.order_of(other), other, Some(edge_line))));
                }
            }
        }

        None
    }

    fn order_of(&self, node: NodeIndex) -> usize {
        self.station_order
            .get(&self.graph[node])
            .copied()
            .unwrap_or(usize::MAX)
    }

    fn reconstruct(&self, goal: RouteState, previous: &HashMap<RouteState, RouteState>) -> Vec<StationId> {
        let mut route = vec![self.graph[goal.0]];
        let mut state = goal;
        while let Some(prev) = previous.get(&state) {
            route.push(self.graph[prev.0]);
            state = *prev;
        }
        route.reverse();
        route
    }
}
