//! Standalone metro simulation module
//!
//! This module contains the whole simulation core: stations, paths, metros,
//! passengers, travel planning and the game rules. It renders nothing and
//! reads no input devices, so it can be driven from a console, a test or an
//! agent through `SimWorld`.

mod action;
mod authoring;
mod config;
mod game_state;
mod holder;
mod metro;
mod observation;
mod passenger;
mod path;
mod path_button;
mod report;
mod shape;
mod spawner;
mod station;
mod stats;
mod transit_network;
mod travel_plan;
mod types;
mod world;

// Re-export public types for external use
pub use action::{Action, ActionResult};
pub use config::{
    SimConfig, DEFAULT_DWELL_MS, DEFAULT_FRAMERATE, GAME_SPEED_MULTIPLIERS,
    METRO_ACCELERATION_TIME_MS,
};
pub use game_state::GameState;
pub use holder::PassengerHolder;
pub use metro::{MetroState, MetroUpdateResult, SimMetro, MAX_SUBSTEP_MS};
pub use observation::{
    MetroObservation, PassengerObservation, PathObservation, StationObservation, WorldObservation,
};
pub use passenger::{PassengerLocation, SimPassenger};
pub use path::{PathSegment, SegmentKind, SegmentTraversal, SimPath};
pub use path_button::{path_button_position, path_color, PathButton};
pub use shape::{point_in_polygon, Shape, ShapeType};
pub use station::SimStation;
pub use stats::SimulationStats;
pub use transit_network::SimTransitNetwork;
pub use travel_plan::TravelPlan;
pub use types::{
    Color, MetroId, PassengerId, PathId, Point, SimId, StationId, PATH_COLORS, SHAPE_COLOR,
};
pub use world::{SimWorld, TickResult, DEFAULT_SEED};
