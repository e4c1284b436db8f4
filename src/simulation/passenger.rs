//! Passengers: units of demand travelling towards a shape type

use serde::Serialize;

use super::config::SimConfig;
use super::shape::{Shape, ShapeType};
use super::types::{MetroId, PassengerId, StationId, SHAPE_COLOR};

/// Where a passenger currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "holder_id", rename_all = "snake_case")]
pub enum PassengerLocation {
    Station(StationId),
    Metro(MetroId),
}

/// A passenger waiting at a station or riding a metro
#[derive(Debug, Clone)]
pub struct SimPassenger {
    pub id: PassengerId,
    /// Any station of this shape type is a valid destination
    pub destination: ShapeType,
    /// Time spent waiting at stations, in scaled simulation milliseconds
    pub wait_ms: f64,
    pub is_at_destination: bool,
    pub location: Option<PassengerLocation>,
}

impl SimPassenger {
    pub fn new(id: PassengerId, destination: ShapeType) -> Self {
        Self {
            id,
            destination,
            wait_ms: 0.0,
            is_at_destination: false,
            location: None,
        }
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.location, Some(PassengerLocation::Station(_)))
    }

    pub fn is_riding(&self) -> bool {
        matches!(self.location, Some(PassengerLocation::Metro(_)))
    }

    pub fn station(&self) -> Option<StationId> {
        match self.location {
            Some(PassengerLocation::Station(station_id)) => Some(station_id),
            _ => None,
        }
    }

    pub fn metro(&self) -> Option<MetroId> {
        match self.location {
            Some(PassengerLocation::Metro(metro_id)) => Some(metro_id),
            _ => None,
        }
    }

    pub fn is_out_of_patience(&self, config: &SimConfig) -> bool {
        self.is_waiting() && self.wait_ms >= config.patience_ms
    }

    /// The small destination glyph drawn next to a station or inside a metro
    pub fn shape(&self, config: &SimConfig) -> Shape {
        Shape::new(self.destination, SHAPE_COLOR, config.station_size * 0.3)
    }
}
