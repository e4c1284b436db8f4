//! Main simulation world that ties everything together
//!
//! `SimWorld` owns every entity and advances them one tick at a time. It is
//! the only stateful object drivers talk to: they submit actions, call
//! `tick`, and read the entity lists back.

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

use super::config::SimConfig;
use super::game_state::GameState;
use super::holder::PassengerHolder;
use super::metro::{MetroState, MetroUpdateResult, SimMetro};
use super::passenger::{PassengerLocation, SimPassenger};
use super::path::SimPath;
use super::shape::ShapeType;
use super::station::SimStation;
use super::stats::SimulationStats;
use super::transit_network::SimTransitNetwork;
use super::travel_plan::TravelPlan;
use super::types::{MetroId, PassengerId, PathId, SimId, StationId};

/// Seed used when the caller does not pick one
pub const DEFAULT_SEED: u64 = 42;

/// Upper bound on arrivals and dwell steps handled for one metro in one tick
const MAX_METRO_EVENTS_PER_TICK: usize = 64;

/// What happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    Running,
    /// A station was added this tick
    NewStation,
    /// The game ended this tick, or had already ended
    Ended,
}

/// Why a passenger leaves a metro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alighting {
    /// The station's shape is the passenger's destination
    Deliver,
    /// The passenger changes lines here
    Transfer,
}

/// The main simulation world
pub struct SimWorld {
    pub config: SimConfig,

    /// All stations, in the order they appeared
    pub stations: Vec<SimStation>,

    /// All paths, including one being drawn
    pub paths: Vec<SimPath>,

    /// All metros
    pub metros: Vec<SimMetro>,

    /// All live passengers
    pub passengers: Vec<SimPassenger>,

    /// Routes of waiting and riding passengers
    pub travel_plans: HashMap<PassengerId, TravelPlan>,

    /// Station graph for travel planning
    pub network: SimTransitNetwork,

    /// Score, unlocks and economy
    pub game_state: GameState,

    pub stats: SimulationStats,

    /// Simulation time, already scaled by the speed multiplier
    pub time_ms: f64,

    pub steps: u64,

    pub is_paused: bool,

    pub game_speed_multiplier: u32,

    /// When each path button was unlocked
    pub button_unlock_blinks: Vec<Option<f64>>,

    /// Path being drawn through the authoring state machine
    pub(super) creating_path: Option<PathId>,

    pub(super) station_spawn_countdown_ms: f64,

    /// Rare shapes already placed this session
    pub(super) used_rare_shapes: Vec<ShapeType>,

    pub(super) network_dirty: bool,

    next_id: usize,

    seed: u64,

    pub(super) rng: StdRng,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(config: SimConfig, seed: u64) -> Self {
        let game_state = GameState::new(&config);
        let button_unlock_blinks = vec![None; config.num_paths];
        Self {
            config,
            stations: Vec::new(),
            paths: Vec::new(),
            metros: Vec::new(),
            passengers: Vec::new(),
            travel_plans: HashMap::new(),
            network: SimTransitNetwork::new(),
            game_state,
            stats: SimulationStats::default(),
            time_ms: 0.0,
            steps: 0,
            is_paused: false,
            game_speed_multiplier: 1,
            button_unlock_blinks,
            creating_path: None,
            station_spawn_countdown_ms: 0.0,
            used_rare_shapes: Vec::new(),
            network_dirty: true,
            next_id: 0,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A world with default settings and the initial stations placed
    pub fn new() -> Self {
        Self::new_with_seed(DEFAULT_SEED)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(seed: u64) -> Self {
        let mut world = Self::new_internal(SimConfig::default(), seed);
        world.reset(Some(seed));
        world
    }

    /// A world with custom settings and the initial stations placed
    pub fn with_config(config: SimConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut world = Self::new_internal(config, seed);
        world.reset(Some(seed));
        Ok(world)
    }

    /// A world with no stations; callers place them with `add_station`
    pub fn new_empty(config: SimConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut world = Self::new_internal(config, seed);
        world.station_spawn_countdown_ms = world.next_station_spawn_interval();
        Ok(world)
    }

    /// Clear all state and start a new session.
    /// Without a seed the world reuses the seed of the previous session.
    pub fn reset(&mut self, seed: Option<u64>) {
        let seed = seed.unwrap_or(self.seed);
        let config = self.config.clone();
        *self = Self::new_internal(config, seed);

        for index in 0..self.config.initial_num_stations {
            if let Err(e) = self.spawn_initial_station(index) {
                warn!("Failed to place initial station {}: {:#}", index, e);
            }
        }
        self.station_spawn_countdown_ms = self.next_station_spawn_interval();
        info!(
            "New session with seed {} and {} stations",
            seed,
            self.stations.len()
        );
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub(super) fn next_sim_id(&mut self) -> SimId {
        let id = SimId(self.next_id);
        self.next_id += 1;
        id
    }

    // -- Lookups ------------------------------------------------------------

    pub fn station_index(&self, station_id: StationId) -> Option<usize> {
        self.stations.iter().position(|s| s.id == station_id)
    }

    pub fn station(&self, station_id: StationId) -> Option<&SimStation> {
        self.stations.iter().find(|s| s.id == station_id)
    }

    pub fn path_index(&self, path_id: PathId) -> Option<usize> {
        self.paths.iter().position(|p| p.id == path_id)
    }

    pub fn path(&self, path_id: PathId) -> Option<&SimPath> {
        self.paths.iter().find(|p| p.id == path_id)
    }

    pub fn metro_index(&self, metro_id: MetroId) -> Option<usize> {
        self.metros.iter().position(|m| m.id == metro_id)
    }

    pub fn metro(&self, metro_id: MetroId) -> Option<&SimMetro> {
        self.metros.iter().find(|m| m.id == metro_id)
    }

    pub fn passenger_index(&self, passenger_id: PassengerId) -> Option<usize> {
        self.passengers.iter().position(|p| p.id == passenger_id)
    }

    pub fn passenger(&self, passenger_id: PassengerId) -> Option<&SimPassenger> {
        self.passengers.iter().find(|p| p.id == passenger_id)
    }

    /// Path currently being drawn, if any
    pub fn creating_path(&self) -> Option<PathId> {
        self.creating_path
    }

    pub fn score(&self) -> u32 {
        self.game_state.score
    }

    pub fn total_travels_handled(&self) -> u32 {
        self.game_state.total_travels_handled
    }

    pub fn is_game_over(&self) -> bool {
        self.game_state.is_game_over
    }

    pub fn unlocked_num_paths(&self) -> usize {
        self.game_state.unlocked_num_paths
    }

    pub fn unlocked_num_stations(&self) -> usize {
        self.game_state.unlocked_num_stations
    }

    /// Paths that are not being drawn
    pub fn finished_paths(&self) -> impl Iterator<Item = &SimPath> {
        self.paths.iter().filter(|p| !p.is_being_created)
    }

    // -- Time control -------------------------------------------------------

    pub fn pause(&mut self) {
        self.is_paused = true;
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
    }

    /// Select a game speed; only 1, 2 and 4 are accepted
    pub fn set_speed(&mut self, multiplier: u32) -> bool {
        if !super::config::GAME_SPEED_MULTIPLIERS.contains(&multiplier) {
            return false;
        }
        self.game_speed_multiplier = multiplier;
        true
    }

    // -- Tick ---------------------------------------------------------------

    /// Main simulation tick
    pub fn tick(&mut self, delta_ms: f64) -> TickResult {
        if self.game_state.is_game_over {
            return TickResult::Ended;
        }
        if self.is_paused || delta_ms <= 0.0 {
            return TickResult::Running;
        }

        let dt = delta_ms * self.game_speed_multiplier as f64;

        self.time_ms += dt;
        self.steps += 1;

        let new_station = self.update_station_spawning(dt);

        self.update_passenger_spawning(dt);

        self.update_travel_plans();

        self.update_metros(dt);

        if self.update_patience(dt) {
            self.game_state.is_game_over = true;
            info!(
                "Game over at {:.1}s with score {} after {} deliveries",
                self.time_ms / 1000.0,
                self.game_state.score,
                self.game_state.total_travels_handled
            );
            return TickResult::Ended;
        }

        self.update_unlocks();

        if new_station {
            TickResult::NewStation
        } else {
            TickResult::Running
        }
    }

    fn rebuild_network_if_dirty(&mut self) {
        if self.network_dirty {
            self.network.rebuild(&self.stations, &self.paths);
            self.network_dirty = false;
        }
    }

    /// Replan every waiting passenger against the current network
    fn update_travel_plans(&mut self) {
        self.rebuild_network_if_dirty();

        for passenger in &self.passengers {
            let Some(station_id) = passenger.station() else {
                continue;
            };
            match self.network.find_route(station_id, passenger.destination) {
                Some(route) if route.len() >= 2 => {
                    let unchanged = self
                        .travel_plans
                        .get(&passenger.id)
                        .is_some_and(|plan| plan.nodes == route && plan.next_idx == 1);
                    if !unchanged {
                        self.travel_plans.insert(passenger.id, TravelPlan::new(route));
                    }
                }
                _ => {
                    if self.travel_plans.remove(&passenger.id).is_some() {
                        debug!("Passenger {:?} lost its route", passenger.id);
                    }
                }
            }
        }
    }

    fn update_metros(&mut self, delta_ms: f64) {
        for metro_idx in 0..self.metros.len() {
            if let Err(e) = self.update_metro(metro_idx, delta_ms) {
                warn!("Metro {:?} update failed: {:#}", self.metros[metro_idx].id, e);
            }
        }
    }

    fn update_metro(&mut self, metro_idx: usize, delta_ms: f64) -> Result<()> {
        let path_id = self.metros[metro_idx].path_id;
        let path_idx = self
            .path_index(path_id)
            .with_context(|| format!("Path {:?} not found", path_id))?;

        let mut remaining = delta_ms;
        for _ in 0..MAX_METRO_EVENTS_PER_TICK {
            if self.metros[metro_idx].state != MetroState::Arrived && remaining <= 0.0 {
                return Ok(());
            }
            let result =
                self.metros[metro_idx].update(remaining, &self.paths[path_idx], &self.config)?;

            match result {
                MetroUpdateResult::Continue => return Ok(()),
                MetroUpdateResult::ArrivedAtStation {
                    station,
                    remaining_ms,
                } => {
                    remaining = remaining_ms;
                    self.handle_arrival(metro_idx, path_idx, station)?;
                }
                MetroUpdateResult::DwellStepDue {
                    station,
                    remaining_ms,
                } => {
                    remaining = remaining_ms;
                    self.handle_dwell_step(metro_idx, path_idx, station)?;
                }
            }
        }

        warn!(
            "Metro {:?} handled {} events in one tick; deferring the rest",
            self.metros[metro_idx].id, MAX_METRO_EVENTS_PER_TICK
        );
        Ok(())
    }

    /// Decide between dwelling and passing through
    fn handle_arrival(&mut self, metro_idx: usize, path_idx: usize, station: StationId) -> Result<()> {
        let riders = self.metros[metro_idx].passengers.clone();
        for passenger_id in riders {
            if let Some(plan) = self.travel_plans.get_mut(&passenger_id) {
                plan.advance(station);
            }
        }

        if self.next_alighting(metro_idx, path_idx, station).is_some()
            || self.next_boarding(metro_idx, path_idx, station).is_some()
        {
            let dwell_ms = self.config.dwell_ms;
            let metro = &mut self.metros[metro_idx];
            metro.current_station = Some(station);
            metro.begin_dwell(dwell_ms);
            self.stats.total_dwells += 1;
        } else {
            self.metros[metro_idx].depart(&self.paths[path_idx], false)?;
            self.stats.total_pass_throughs += 1;
        }
        Ok(())
    }

    /// Move one passenger, alighting before boarding, then dwell on or leave
    fn handle_dwell_step(
        &mut self,
        metro_idx: usize,
        path_idx: usize,
        station: StationId,
    ) -> Result<()> {
        if let Some((passenger_id, alighting)) = self.next_alighting(metro_idx, path_idx, station) {
            match alighting {
                Alighting::Deliver => self.deliver_passenger(metro_idx, passenger_id, station)?,
                Alighting::Transfer => self.transfer_passenger(metro_idx, passenger_id, station)?,
            }
        } else if let Some(passenger_id) = self.next_boarding(metro_idx, path_idx, station) {
            self.board_passenger(metro_idx, path_idx, passenger_id, station)?;
        }

        if self.next_alighting(metro_idx, path_idx, station).is_some()
            || self.next_boarding(metro_idx, path_idx, station).is_some()
        {
            let step_ms = self.config.boarding_step_ms;
            self.metros[metro_idx].begin_dwell(step_ms);
        } else {
            self.metros[metro_idx].depart(&self.paths[path_idx], true)?;
        }
        Ok(())
    }

    /// First rider, in queue order, who gets off at `station`
    fn next_alighting(
        &self,
        metro_idx: usize,
        path_idx: usize,
        station: StationId,
    ) -> Option<(PassengerId, Alighting)> {
        let metro = &self.metros[metro_idx];
        let station_ref = self.station(station)?;
        let upcoming = metro.upcoming_station(&self.paths[path_idx]);

        for passenger_id in &metro.passengers {
            let Some(passenger) = self.passenger(*passenger_id) else {
                continue;
            };
            if passenger.destination == station_ref.shape_type() {
                return Some((*passenger_id, Alighting::Deliver));
            }
            // Riders whose plan no longer matches this line get off too
            let stays_on = self.travel_plans.get(passenger_id).is_some_and(|plan| {
                plan.current_station() == Some(station) && plan.next_station() == upcoming
            });
            if !stays_on && station_ref.has_room() {
                return Some((*passenger_id, Alighting::Transfer));
            }
        }
        None
    }

    /// First waiting passenger, in queue order, whose next stop is this metro's
    fn next_boarding(
        &self,
        metro_idx: usize,
        path_idx: usize,
        station: StationId,
    ) -> Option<PassengerId> {
        let metro = &self.metros[metro_idx];
        if !metro.has_room() {
            return None;
        }
        let upcoming = metro.upcoming_station(&self.paths[path_idx])?;
        let station_ref = self.station(station)?;

        station_ref.passengers.iter().copied().find(|passenger_id| {
            self.travel_plans.get(passenger_id).is_some_and(|plan| {
                plan.current_station() == Some(station) && plan.next_station() == Some(upcoming)
            })
        })
    }

    fn deliver_passenger(
        &mut self,
        metro_idx: usize,
        passenger_id: PassengerId,
        station: StationId,
    ) -> Result<()> {
        self.metros[metro_idx].remove_passenger(passenger_id)?;
        if let Some(passenger_idx) = self.passenger_index(passenger_id) {
            let mut passenger = self.passengers.remove(passenger_idx);
            passenger.is_at_destination = true;
            passenger.location = None;
        }
        self.travel_plans.remove(&passenger_id);
        self.game_state.complete_travel();
        self.stats.total_passengers_delivered += 1;
        debug!("Passenger {:?} delivered at {:?}", passenger_id, station);
        Ok(())
    }

    fn transfer_passenger(
        &mut self,
        metro_idx: usize,
        passenger_id: PassengerId,
        station: StationId,
    ) -> Result<()> {
        let station_idx = self
            .station_index(station)
            .with_context(|| format!("Station {:?} not found", station))?;
        let metro = &mut self.metros[metro_idx];
        metro.move_passenger(passenger_id, &mut self.stations[station_idx])?;

        self.set_passenger_location(passenger_id, PassengerLocation::Station(station))?;
        if let Some(plan) = self.travel_plans.get_mut(&passenger_id) {
            plan.next_path = None;
        }
        self.stats.total_transfers += 1;
        debug!("Passenger {:?} changes lines at {:?}", passenger_id, station);
        Ok(())
    }

    fn board_passenger(
        &mut self,
        metro_idx: usize,
        path_idx: usize,
        passenger_id: PassengerId,
        station: StationId,
    ) -> Result<()> {
        let station_idx = self
            .station_index(station)
            .with_context(|| format!("Station {:?} not found", station))?;
        let metro_id = self.metros[metro_idx].id;
        self.stations[station_idx].move_passenger(passenger_id, &mut self.metros[metro_idx])?;

        self.set_passenger_location(passenger_id, PassengerLocation::Metro(metro_id))?;
        if let Some(plan) = self.travel_plans.get_mut(&passenger_id) {
            plan.next_path = Some(self.paths[path_idx].id);
        }
        self.stats.total_boardings += 1;
        debug!("Passenger {:?} boards {:?} at {:?}", passenger_id, metro_id, station);
        Ok(())
    }

    pub(super) fn set_passenger_location(
        &mut self,
        passenger_id: PassengerId,
        location: PassengerLocation,
    ) -> Result<()> {
        let Some(passenger_idx) = self.passenger_index(passenger_id) else {
            bail!("Passenger {:?} not found", passenger_id);
        };
        self.passengers[passenger_idx].location = Some(location);
        Ok(())
    }

    /// Accrue waiting time; returns true when the game is lost
    fn update_patience(&mut self, delta_ms: f64) -> bool {
        let mut out_of_patience = 0;
        for passenger in self.passengers.iter_mut().filter(|p| p.is_waiting()) {
            passenger.wait_ms += delta_ms;
            self.stats.max_wait_ms = self.stats.max_wait_ms.max(passenger.wait_ms);
            if passenger.is_out_of_patience(&self.config) {
                out_of_patience += 1;
            }
        }

        let overflowed = self.stations.iter().find(|s| s.overflowed);
        if let Some(station) = overflowed {
            info!("Station {:?} overflowed", station.id);
            return true;
        }
        if out_of_patience >= self.config.patience_threshold {
            info!("{} passengers ran out of patience", out_of_patience);
            return true;
        }
        false
    }

    fn update_unlocks(&mut self) {
        let newly_unlocked = self.game_state.update_station_unlocks();
        if newly_unlocked > 0 {
            // The next tick's spawn step brings the new station in
            self.station_spawn_countdown_ms = 0.0;
            info!(
                "Unlocked {} station slot(s) at {} deliveries; {} stations allowed",
                newly_unlocked,
                self.game_state.total_travels_handled,
                self.game_state.unlocked_num_stations
            );
        }
    }
}
