//! Score, unlocks and the path-slot economy
//!
//! Deliveries raise the score. The score is also the currency: buying a new
//! path slot spends it. Station unlocks follow cumulative deliveries and are
//! never bought.

use sorted_vec::SortedVec;

use super::config::SimConfig;

/// Game state that tracks player progress and resources
#[derive(Debug, Clone)]
pub struct GameState {
    /// Spendable points, one per delivered passenger
    pub score: u32,

    /// Passengers delivered over the whole session
    pub total_travels_handled: u32,

    /// Points spent on path slots
    pub total_spent: u32,

    /// Path slots bought so far, including the free first slot
    pub purchased_num_paths: usize,

    pub unlocked_num_paths: usize,

    pub unlocked_num_stations: usize,

    pub is_game_over: bool,

    path_unlock_milestones: SortedVec<u32>,

    station_unlock_milestones: SortedVec<u32>,

    initial_num_stations: usize,

    max_stations: usize,

    num_paths: usize,
}

impl GameState {
    /// Create a new game state with starting conditions
    pub fn new(config: &SimConfig) -> Self {
        let initial_num_stations = config.initial_num_stations.min(config.max_stations);
        Self {
            score: 0,
            total_travels_handled: 0,
            total_spent: 0,
            purchased_num_paths: 1,
            unlocked_num_paths: 1,
            unlocked_num_stations: initial_num_stations,
            is_game_over: false,
            path_unlock_milestones: SortedVec::from_unsorted(config.path_unlock_milestones.clone()),
            station_unlock_milestones: SortedVec::from_unsorted(
                config.station_unlock_milestones.clone(),
            ),
            initial_num_stations,
            max_stations: config.max_stations,
            num_paths: config.num_paths,
        }
    }

    /// Check if player can afford a purchase
    pub fn can_afford(&self, cost: u32) -> bool {
        self.score >= cost
    }

    /// Deduct points for a purchase
    /// Returns true if successful, false if insufficient score
    pub fn spend(&mut self, cost: u32) -> bool {
        if self.can_afford(cost) {
            self.score -= cost;
            self.total_spent += cost;
            true
        } else {
            false
        }
    }

    /// Record a delivered passenger
    pub fn complete_travel(&mut self) {
        self.score += 1;
        self.total_travels_handled += 1;
    }

    /// Price of path slot `slot`; slot 0 is free and owned from the start
    pub fn path_slot_price(&self, slot: usize) -> Option<u32> {
        if slot == 0 || slot >= self.num_paths {
            return None;
        }
        let current = *self.path_unlock_milestones.get(slot)?;
        let previous = *self.path_unlock_milestones.get(slot - 1)?;
        Some(current.saturating_sub(previous))
    }

    /// Buy the next path slot. Slots must be bought in order.
    pub fn try_purchase_path_slot(&mut self, slot: usize) -> bool {
        if slot != self.purchased_num_paths {
            return false;
        }
        let Some(price) = self.path_slot_price(slot) else {
            return false;
        };
        if !self.spend(price) {
            return false;
        }
        self.purchased_num_paths += 1;
        self.unlocked_num_paths = self.purchased_num_paths;
        true
    }

    pub fn is_path_slot_locked(&self, slot: usize) -> bool {
        slot >= self.unlocked_num_paths
    }

    /// Recompute the station cap from deliveries.
    /// Returns how many station slots this call unlocked.
    pub fn update_station_unlocks(&mut self) -> usize {
        let reached = self
            .station_unlock_milestones
            .partition_point(|milestone| *milestone <= self.total_travels_handled);
        let target = (self.initial_num_stations + reached).min(self.max_stations);

        if target > self.unlocked_num_stations {
            let newly_unlocked = target - self.unlocked_num_stations;
            self.unlocked_num_stations = target;
            newly_unlocked
        } else {
            0
        }
    }

    /// Get a summary string for display
    pub fn summary(&self) -> String {
        format!(
            "Score: {} | Delivered: {} | Paths: {}/{} | Stations unlocked: {}{}",
            self.score,
            self.total_travels_handled,
            self.unlocked_num_paths,
            self.num_paths,
            self.unlocked_num_stations,
            if self.is_game_over { " | GAME OVER" } else { "" }
        )
    }
}
