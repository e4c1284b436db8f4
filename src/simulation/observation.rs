//! Serializable snapshot of the world for drivers and agents

use serde::Serialize;

use super::passenger::PassengerLocation;
use super::path_button::PathButton;
use super::shape::ShapeType;
use super::types::{Color, MetroId, PassengerId, PathId, StationId};
use super::world::SimWorld;

/// A point-in-time snapshot of the whole simulation
#[derive(Debug, Clone, Serialize)]
pub struct WorldObservation {
    // -- Time ---------------------------------------------------------------
    pub time_ms: f64,
    pub steps: u64,
    pub is_paused: bool,
    pub game_speed_multiplier: u32,

    // -- Progress -----------------------------------------------------------
    pub score: u32,
    pub total_travels_handled: u32,
    pub is_game_over: bool,
    pub unlocked_num_paths: usize,
    pub unlocked_num_stations: usize,

    // -- Entities -----------------------------------------------------------
    pub stations: Vec<StationObservation>,
    pub paths: Vec<PathObservation>,
    pub metros: Vec<MetroObservation>,
    pub passengers: Vec<PassengerObservation>,
    pub path_buttons: Vec<PathButton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationObservation {
    pub id: StationId,
    pub position: (f32, f32),
    pub shape_type: ShapeType,
    pub passenger_ids: Vec<PassengerId>,
    pub capacity: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathObservation {
    pub id: PathId,
    pub station_ids: Vec<StationId>,
    pub is_looped: bool,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetroObservation {
    pub id: MetroId,
    pub path_id: PathId,
    pub position: Option<(f32, f32)>,
    pub current_station_id: Option<StationId>,
    pub passenger_ids: Vec<PassengerId>,
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassengerObservation {
    pub id: PassengerId,
    pub destination_shape_type: ShapeType,
    pub is_at_destination: bool,
    pub location: Option<PassengerLocation>,
    pub wait_ms: f64,
}

impl SimWorld {
    /// Snapshot the world; paths being drawn are left out
    pub fn observe(&self) -> WorldObservation {
        WorldObservation {
            time_ms: self.time_ms,
            steps: self.steps,
            is_paused: self.is_paused,
            game_speed_multiplier: self.game_speed_multiplier,
            score: self.game_state.score,
            total_travels_handled: self.game_state.total_travels_handled,
            is_game_over: self.game_state.is_game_over,
            unlocked_num_paths: self.game_state.unlocked_num_paths,
            unlocked_num_stations: self.game_state.unlocked_num_stations,
            stations: self
                .stations
                .iter()
                .map(|station| StationObservation {
                    id: station.id,
                    position: (station.position.x, station.position.y),
                    shape_type: station.shape_type(),
                    passenger_ids: station.passengers.clone(),
                    capacity: station.capacity,
                })
                .collect(),
            paths: self
                .finished_paths()
                .map(|path| PathObservation {
                    id: path.id,
                    station_ids: path.stations.clone(),
                    is_looped: path.is_looped,
                    color: path.color,
                })
                .collect(),
            metros: self
                .metros
                .iter()
                .map(|metro| MetroObservation {
                    id: metro.id,
                    path_id: metro.path_id,
                    position: Some((metro.position.x, metro.position.y)),
                    current_station_id: metro.current_station,
                    passenger_ids: metro.passengers.clone(),
                    speed: metro.speed,
                })
                .collect(),
            passengers: self
                .passengers
                .iter()
                .map(|passenger| PassengerObservation {
                    id: passenger.id,
                    destination_shape_type: passenger.destination,
                    is_at_destination: passenger.is_at_destination,
                    location: passenger.location,
                    wait_ms: passenger.wait_ms,
                })
                .collect(),
            path_buttons: self.path_buttons(),
        }
    }

    /// JSON form of `observe`
    pub fn observe_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.observe())
    }
}
