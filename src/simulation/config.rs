//! Simulation configuration
//!
//! Every tunable of the game lives in `SimConfig`. The defaults match the
//! standard difficulty; tests shrink intervals and capacities to force the
//! situations they check.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::shape::ShapeType;
use super::types::PATH_COLORS;

/// Default target ticks per second for drivers that do not pick their own step
pub const DEFAULT_FRAMERATE: u32 = 60;

/// Length of one dwell, and of one boarding/alighting step, in milliseconds
pub const DEFAULT_DWELL_MS: f64 = 500.0;

/// Time for a metro to reach top speed from rest
pub const METRO_ACCELERATION_TIME_MS: f32 = 1000.0;

/// Game speed multipliers a driver may select
pub const GAME_SPEED_MULTIPLIERS: [u32; 3] = [1, 2, 4];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Target ticks per second; `default_dt_ms()` derives from it
    pub framerate: u32,

    pub screen_width: f32,
    pub screen_height: f32,

    /// Passengers a station can hold before the game is lost
    pub station_capacity: usize,
    pub metro_capacity: usize,

    /// Pixels per millisecond
    pub metro_max_speed: f32,
    pub dwell_ms: f64,
    pub boarding_step_ms: f64,

    /// Wait after which a passenger counts as out of patience
    pub patience_ms: f64,
    /// Number of out-of-patience passengers that ends the game
    pub patience_threshold: usize,

    pub max_stations: usize,
    pub initial_num_stations: usize,
    pub num_paths: usize,
    pub metros_per_line: usize,

    /// Cumulative deliveries at which each path slot becomes affordable.
    /// Slot `i` costs `path_unlock_milestones[i] - path_unlock_milestones[i - 1]`.
    pub path_unlock_milestones: Vec<u32>,
    /// Cumulative deliveries at which each station beyond the initial set unlocks
    pub station_unlock_milestones: Vec<u32>,

    /// Weights for common station shapes
    pub spawn_weights: Vec<(ShapeType, f64)>,
    /// Weight given to each still-unused rare shape once it is eligible
    pub rare_shape_weight: f64,
    /// Deliveries required before rare shapes can spawn
    pub rare_shape_delivery_threshold: u32,

    pub station_size: f32,
    /// Minimum distance between two station centers
    pub min_station_spacing: f32,
    /// Candidate positions drawn for every station spawn
    pub spawn_position_candidates: usize,
    /// Margin kept free at the screen border when placing stations
    pub spawn_margin: f32,

    pub station_spawn_interval_ms: f64,
    pub passenger_spawn_interval_ms: f64,
    /// Relative jitter applied to both spawn intervals, in `[0, 1)`
    pub spawn_interval_jitter: f64,

    /// Perpendicular distance between parallel lines sharing a station
    pub path_offset_px: f32,

    pub path_button_radius: f32,
    pub path_button_spacing: f32,
    pub path_button_margin: f32,

    pub unlock_blink_duration_ms: f64,
    pub snap_blip_duration_ms: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            framerate: DEFAULT_FRAMERATE,
            screen_width: 1920.0,
            screen_height: 1080.0,
            station_capacity: 12,
            metro_capacity: 6,
            metro_max_speed: 0.15,
            dwell_ms: DEFAULT_DWELL_MS,
            boarding_step_ms: DEFAULT_DWELL_MS,
            patience_ms: 45_000.0,
            patience_threshold: 1,
            max_stations: 10,
            initial_num_stations: 3,
            num_paths: 7,
            metros_per_line: 1,
            path_unlock_milestones: vec![0, 20, 50, 90, 140, 200, 270],
            station_unlock_milestones: vec![5, 15, 30, 50, 75, 105, 140],
            spawn_weights: vec![
                (ShapeType::Circle, 0.40),
                (ShapeType::Triangle, 0.30),
                (ShapeType::Rect, 0.20),
                (ShapeType::Cross, 0.10),
            ],
            rare_shape_weight: 0.05,
            rare_shape_delivery_threshold: 40,
            station_size: 30.0,
            min_station_spacing: 150.0,
            spawn_position_candidates: 16,
            spawn_margin: 100.0,
            station_spawn_interval_ms: 20_000.0,
            passenger_spawn_interval_ms: 4_000.0,
            spawn_interval_jitter: 0.3,
            path_offset_px: 8.0,
            path_button_radius: 24.0,
            path_button_spacing: 64.0,
            path_button_margin: 48.0,
            unlock_blink_duration_ms: 2_000.0,
            snap_blip_duration_ms: 400.0,
        }
    }
}

impl SimConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Step length a driver should use when it has no clock of its own
    pub fn default_dt_ms(&self) -> f64 {
        1000.0 / self.framerate.max(1) as f64
    }

    /// Acceleration that takes a metro from rest to top speed in about a second
    pub fn metro_acceleration(&self) -> f32 {
        self.metro_max_speed / METRO_ACCELERATION_TIME_MS
    }

    pub fn validate(&self) -> Result<()> {
        if self.framerate == 0 {
            bail!("framerate must be positive");
        }
        if self.station_capacity == 0 || self.metro_capacity == 0 {
            bail!("station and metro capacities must be positive");
        }
        if self.metro_max_speed <= 0.0 {
            bail!("metro_max_speed must be positive");
        }
        if self.dwell_ms <= 0.0 || self.boarding_step_ms <= 0.0 {
            bail!("dwell_ms and boarding_step_ms must be positive");
        }
        if self.patience_threshold == 0 {
            bail!("patience_threshold must be at least 1");
        }
        if self.initial_num_stations > self.max_stations {
            bail!(
                "initial_num_stations ({}) exceeds max_stations ({})",
                self.initial_num_stations,
                self.max_stations
            );
        }
        if self.num_paths == 0 || self.num_paths > PATH_COLORS.len() {
            bail!("num_paths must be between 1 and {}", PATH_COLORS.len());
        }
        if self.path_unlock_milestones.len() != self.num_paths {
            bail!(
                "path_unlock_milestones has {} entries, expected {}",
                self.path_unlock_milestones.len(),
                self.num_paths
            );
        }
        if !is_monotone(&self.path_unlock_milestones) {
            bail!("path_unlock_milestones must be non-decreasing");
        }
        if !is_monotone(&self.station_unlock_milestones) {
            bail!("station_unlock_milestones must be non-decreasing");
        }
        if self.spawn_weights.iter().any(|(_, w)| *w < 0.0)
            || self.spawn_weights.iter().all(|(_, w)| *w <= 0.0)
        {
            bail!("spawn_weights must be non-negative with at least one positive entry");
        }
        if self.spawn_position_candidates == 0 {
            bail!("spawn_position_candidates must be positive");
        }
        if !(0.0..1.0).contains(&self.spawn_interval_jitter) {
            bail!("spawn_interval_jitter must be in [0, 1)");
        }
        Ok(())
    }
}

fn is_monotone(values: &[u32]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}
