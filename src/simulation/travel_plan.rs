//! Per-passenger routes through the station graph

use super::types::{PathId, StationId};

/// Ordered stations a passenger intends to visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelPlan {
    /// Starts at the station the plan was made at, ends at a matching station
    pub nodes: Vec<StationId>,
    /// Index of the next node to reach
    pub next_idx: usize,
    /// Line the passenger is riding; set when it boards
    pub next_path: Option<PathId>,
}

impl TravelPlan {
    pub fn new(nodes: Vec<StationId>) -> Self {
        Self {
            nodes,
            next_idx: 1,
            next_path: None,
        }
    }

    /// Station the passenger is at, or last passed through
    pub fn current_station(&self) -> Option<StationId> {
        self.next_idx
            .checked_sub(1)
            .and_then(|idx| self.nodes.get(idx))
            .copied()
    }

    pub fn next_station(&self) -> Option<StationId> {
        self.nodes.get(self.next_idx).copied()
    }

    pub fn destination(&self) -> Option<StationId> {
        self.nodes.last().copied()
    }

    pub fn is_complete(&self) -> bool {
        self.next_idx >= self.nodes.len()
    }

    /// Record arrival at `station`; returns whether it was the expected stop
    pub fn advance(&mut self, station: StationId) -> bool {
        if self.next_station() == Some(station) {
            self.next_idx += 1;
            true
        } else {
            false
        }
    }
}
