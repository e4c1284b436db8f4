//! Station and passenger spawning
//!
//! All randomness of a session flows through the world's seeded RNG, and
//! every spawn draws the same number of values whatever the outcome, so a
//! seed plus a sequence of actions and tick lengths replays exactly.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use super::holder::PassengerHolder;
use super::passenger::{PassengerLocation, SimPassenger};
use super::shape::{Shape, ShapeType};
use super::station::SimStation;
use super::types::{PassengerId, Point, StationId, SHAPE_COLOR};
use super::world::SimWorld;

/// Shapes of the first stations of every session
const INITIAL_SHAPES: [ShapeType; 3] = [ShapeType::Circle, ShapeType::Triangle, ShapeType::Rect];

impl SimWorld {
    /// Place a station at `position`. Used for the initial set, for spawns
    /// and by drivers that lay out their own map.
    pub fn add_station(&mut self, shape_type: ShapeType, position: Point) -> StationId {
        let id = StationId(self.next_sim_id());
        let shape = Shape::new(shape_type, SHAPE_COLOR, self.config.station_size);
        let mut station = SimStation::new(id, shape, position, self.config.station_capacity);
        station.passenger_spawn_countdown_ms = self.next_passenger_spawn_interval();

        if shape_type.is_rare() {
            self.used_rare_shapes.push(shape_type);
        }
        self.stations.push(station);
        self.stats.total_stations_spawned += 1;
        self.network_dirty = true;
        debug!("Station {:?} ({:?}) at ({:.0}, {:.0})", id, shape_type, position.x, position.y);
        id
    }

    /// Create a passenger waiting at `station_id`
    pub fn spawn_passenger_at(
        &mut self,
        station_id: StationId,
        destination: ShapeType,
    ) -> Result<PassengerId> {
        let station_idx = self
            .station_index(station_id)
            .with_context(|| format!("Station {:?} not found", station_id))?;
        let id = PassengerId(self.next_sim_id());
        self.stations[station_idx]
            .add_passenger(id)
            .with_context(|| format!("Station {:?} cannot take a passenger", station_id))?;

        let mut passenger = SimPassenger::new(id, destination);
        passenger.location = Some(PassengerLocation::Station(station_id));
        self.passengers.push(passenger);
        self.stats.total_passengers_spawned += 1;
        Ok(id)
    }

    pub(super) fn spawn_initial_station(&mut self, index: usize) -> Result<StationId> {
        let shape_type = match INITIAL_SHAPES.get(index) {
            Some(shape_type) => *shape_type,
            None => self.choose_station_shape()?,
        };
        let position = self.choose_spawn_position();
        Ok(self.add_station(shape_type, position))
    }

    /// Spawn a station once the schedule and the unlock cap allow it.
    /// Returns true when a station was added.
    pub(super) fn update_station_spawning(&mut self, delta_ms: f64) -> bool {
        if self.stations.len() < self.config.initial_num_stations {
            return false;
        }

        self.station_spawn_countdown_ms = (self.station_spawn_countdown_ms - delta_ms).max(0.0);
        let cap = self
            .game_state
            .unlocked_num_stations
            .min(self.config.max_stations);
        if self.station_spawn_countdown_ms > 0.0 || self.stations.len() >= cap {
            return false;
        }

        let spawned = self.choose_station_shape().map(|shape_type| {
            let position = self.choose_spawn_position();
            self.add_station(shape_type, position)
        });
        self.station_spawn_countdown_ms = self.next_station_spawn_interval();

        match spawned {
            Ok(station_id) => {
                let now = self.time_ms;
                if let Some(station_idx) = self.station_index(station_id) {
                    self.stations[station_idx].unlock_blink_start_ms = Some(now);
                }
                info!(
                    "Station {:?} opened at {:.1}s ({} of {})",
                    station_id,
                    now / 1000.0,
                    self.stations.len(),
                    cap
                );
                true
            }
            Err(e) => {
                warn!("Failed to spawn a station: {:#}", e);
                false
            }
        }
    }

    /// Let every station whose countdown ran out spawn one passenger
    pub(super) fn update_passenger_spawning(&mut self, delta_ms: f64) {
        let mut available: Vec<ShapeType> = Vec::new();
        for station in &self.stations {
            if !available.contains(&station.shape_type()) {
                available.push(station.shape_type());
            }
        }

        for station_idx in 0..self.stations.len() {
            let station = &mut self.stations[station_idx];
            station.passenger_spawn_countdown_ms -= delta_ms;
            if station.passenger_spawn_countdown_ms > 0.0 {
                continue;
            }

            let station_id = station.id;
            let own_shape = station.shape_type();
            let candidates: Vec<ShapeType> = available
                .iter()
                .copied()
                .filter(|shape_type| *shape_type != own_shape)
                .collect();

            if !candidates.is_empty() {
                let destination = candidates[self.rng.random_range(0..candidates.len())];
                if self.stations[station_idx].has_room() {
                    if let Err(e) = self.spawn_passenger_at(station_id, destination) {
                        warn!("Passenger spawn at {:?} failed: {:#}", station_id, e);
                    }
                } else {
                    self.stations[station_idx].overflowed = true;
                    info!("Station {:?} is full and cannot take more passengers", station_id);
                }
            }

            let interval = self.next_passenger_spawn_interval();
            self.stations[station_idx].passenger_spawn_countdown_ms = interval;
        }
    }

    /// Weighted pick among common shapes and the rare shapes still available
    pub(super) fn choose_station_shape(&mut self) -> Result<ShapeType> {
        let mut choices: Vec<(ShapeType, f64)> = self.config.spawn_weights.clone();
        if self.game_state.total_travels_handled >= self.config.rare_shape_delivery_threshold {
            for rare in ShapeType::RARE {
                if !self.used_rare_shapes.contains(&rare) {
                    choices.push((rare, self.config.rare_shape_weight));
                }
            }
        }

        let distribution = WeightedIndex::new(choices.iter().map(|(_, weight)| *weight))
            .context("Invalid station shape weights")?;
        Ok(choices[distribution.sample(&mut self.rng)].0)
    }

    /// Pick a spot for a new station.
    ///
    /// Draws a fixed set of candidates, drops those closer than the minimum
    /// spacing to an existing station, and prefers the ones near the middle
    /// of the network. Falls back to the most isolated candidate when all of
    /// them are too close.
    pub(super) fn choose_spawn_position(&mut self) -> Point {
        let width = self.config.screen_width;
        let height = self.config.screen_height;
        let margin = self.config.spawn_margin.min(width / 2.0).min(height / 2.0);

        let candidates: Vec<Point> = (0..self.config.spawn_position_candidates)
            .map(|_| {
                let x = self.rng.random::<f32>() * (width - 2.0 * margin) + margin;
                let y = self.rng.random::<f32>() * (height - 2.0 * margin) + margin;
                Point::new(x, y)
            })
            .collect();
        let pick = self.rng.random::<f64>();

        let stations: Vec<Point> = self.stations.iter().map(|s| s.position).collect();
        if stations.is_empty() {
            let idx = ((pick * candidates.len() as f64) as usize).min(candidates.len() - 1);
            return candidates[idx];
        }

        let nearest = |point: &Point| {
            stations
                .iter()
                .map(|s| OrderedFloat(s.distance(point)))
                .min()
                .map_or(f32::MAX, OrderedFloat::into_inner)
        };

        let weights: Vec<f64> = candidates
            .iter()
            .map(|point| {
                if nearest(point) < self.config.min_station_spacing {
                    return 0.0;
                }
                let mean = stations.iter().map(|s| s.distance(point)).sum::<f32>()
                    / stations.len() as f32;
                1.0 / (1.0 + mean as f64)
            })
            .collect();

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return candidates
                .iter()
                .copied()
                .max_by_key(|point| OrderedFloat(nearest(point)))
                .unwrap_or_else(|| Point::new(width / 2.0, height / 2.0));
        }

        let mut target = pick * total;
        for (point, weight) in candidates.iter().zip(&weights) {
            if *weight <= 0.0 {
                continue;
            }
            if target < *weight {
                return *point;
            }
            target -= weight;
        }
        candidates
            .iter()
            .zip(&weights)
            .rev()
            .find(|(_, weight)| **weight > 0.0)
            .map_or(candidates[0], |(point, _)| *point)
    }

    fn jittered(&mut self, interval_ms: f64) -> f64 {
        let jitter = self.config.spawn_interval_jitter;
        let factor = 1.0 + jitter * (2.0 * self.rng.random::<f64>() - 1.0);
        interval_ms * factor
    }

    pub(super) fn next_station_spawn_interval(&mut self) -> f64 {
        self.jittered(self.config.station_spawn_interval_ms)
    }

    pub(super) fn next_passenger_spawn_interval(&mut self) -> f64 {
        self.jittered(self.config.passenger_spawn_interval_ms)
    }
}
