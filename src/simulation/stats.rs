//! Running counters for a simulation session

use log::info;

/// Simulation statistics, reset together with the world
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub total_passengers_spawned: u32,
    pub total_passengers_delivered: u32,
    pub total_passengers_lost: u32,
    pub total_boardings: u32,
    pub total_transfers: u32,
    pub total_stations_spawned: u32,
    pub total_dwells: u32,
    pub total_pass_throughs: u32,
    /// Longest wait seen at any station
    pub max_wait_ms: f64,
}

impl SimulationStats {
    pub fn delivery_rate(&self) -> f32 {
        if self.total_passengers_spawned == 0 {
            0.0
        } else {
            self.total_passengers_delivered as f32 / self.total_passengers_spawned as f32 * 100.0
        }
    }

    /// Log the end-of-run block read by headless drivers
    pub fn log_summary(&self, elapsed_ms: f64, score: u32) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s", elapsed_ms / 1000.0);
        info!("Total passengers spawned: {}", self.total_passengers_spawned);
        info!("Total passengers delivered: {}", self.total_passengers_delivered);
        info!("Total passengers lost: {}", self.total_passengers_lost);
        info!("Total transfers: {}", self.total_transfers);
        info!("Total stations: {}", self.total_stations_spawned);
        info!("Score: {}", score);
        info!("Delivery rate: {:.1}%", self.delivery_rate());
    }
}
