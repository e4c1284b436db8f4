//! Stations: fixed shapes on the map holding queues of waiting passengers

use super::holder::PassengerHolder;
use super::shape::{Shape, ShapeType};
use super::types::{PassengerId, Point, StationId};

/// A station in the simulation
#[derive(Debug, Clone)]
pub struct SimStation {
    pub id: StationId,
    pub shape: Shape,
    pub position: Point,
    pub passengers: Vec<PassengerId>,
    pub capacity: usize,
    /// Milliseconds left before this station spawns its next passenger
    pub passenger_spawn_countdown_ms: f64,
    /// Set when a passenger spawned while the queue was already full
    pub overflowed: bool,
    /// When the station was unlocked; the renderer flashes it for a while
    pub unlock_blink_start_ms: Option<f64>,
    /// When the station was last attached to a path
    pub snap_blip_start_ms: Option<f64>,
}

impl SimStation {
    pub fn new(id: StationId, shape: Shape, position: Point, capacity: usize) -> Self {
        Self {
            id,
            shape,
            position,
            passengers: Vec::new(),
            capacity,
            passenger_spawn_countdown_ms: 0.0,
            overflowed: false,
            unlock_blink_start_ms: None,
            snap_blip_start_ms: None,
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape.shape_type
    }

    pub fn contains(&self, point: Point) -> bool {
        self.shape.contains(self.position, point)
    }

    pub fn is_unlock_blinking(&self, now_ms: f64, duration_ms: f64) -> bool {
        self.unlock_blink_start_ms
            .is_some_and(|start| now_ms >= start && now_ms - start < duration_ms)
    }

    /// Progress of the snap ring in `[0, 1)`, or `None` once it has faded
    pub fn snap_blip_progress(&self, now_ms: f64, duration_ms: f64) -> Option<f64> {
        let start = self.snap_blip_start_ms?;
        let elapsed = now_ms - start;
        if elapsed < 0.0 || elapsed >= duration_ms {
            return None;
        }
        Some(elapsed / duration_ms)
    }
}

impl PassengerHolder for SimStation {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn passengers(&self) -> &[PassengerId] {
        &self.passengers
    }

    fn passengers_mut(&mut self) -> &mut Vec<PassengerId> {
        &mut self.passengers
    }
}
