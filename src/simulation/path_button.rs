//! Path slot buttons
//!
//! The core does not lay out a UI, but it owns the slot state: which slots
//! are locked, which line each one shows, and where a renderer should put it.

use serde::Serialize;

use super::config::SimConfig;
use super::shape::{Shape, ShapeType};
use super::types::{Color, PathId, Point, PATH_COLORS};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathButton {
    pub index: usize,
    pub position: Point,
    pub color: Color,
    pub path_id: Option<PathId>,
    pub is_locked: bool,
    /// Points needed to unlock; `None` for slots already owned
    pub price: Option<u32>,
    pub unlock_blink_start_ms: Option<f64>,
}

impl PathButton {
    pub fn shape(&self, config: &SimConfig) -> Shape {
        Shape::new(ShapeType::Circle, self.color, config.path_button_radius)
    }

    pub fn contains(&self, point: Point, config: &SimConfig) -> bool {
        self.shape(config).contains(self.position, point)
    }

    pub fn is_unlock_blinking(&self, now_ms: f64, duration_ms: f64) -> bool {
        self.unlock_blink_start_ms
            .is_some_and(|start| now_ms >= start && now_ms - start < duration_ms)
    }
}

/// Button centers along the bottom edge of the screen
pub fn path_button_position(index: usize, config: &SimConfig) -> Point {
    let count = config.num_paths as f32;
    let offset = index as f32 - (count - 1.0) / 2.0;
    Point::new(
        config.screen_width / 2.0 + offset * config.path_button_spacing,
        config.screen_height - config.path_button_margin,
    )
}

pub fn path_color(index: usize) -> Color {
    PATH_COLORS[index % PATH_COLORS.len()]
}
