//! Core types for the metro simulation
//!
//! Identifiers, points and colors shared by every entity.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimId(pub usize);

/// A wrapper type for station IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub SimId);

/// A wrapper type for path IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(pub SimId);

/// A wrapper type for metro IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetroId(pub SimId);

/// A wrapper type for passenger IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassengerId(pub SimId);

/// A 2D position in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scale(&self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    /// Rotate counter-clockwise around the origin
    pub fn rotate(&self, degrees: f32) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Rotate counter-clockwise around `pivot`
    pub fn rotate_around(&self, pivot: &Point, degrees: f32) -> Point {
        (*self - *pivot).rotate(degrees) + *pivot
    }

    pub fn lerp(&self, other: &Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Unit normal to the left of the direction from this point to `other`
    pub fn left_normal(&self, other: &Point) -> Point {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len > 0.0 {
            Point::new(-dy / len, dx / len)
        } else {
            Point::default()
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        self.scale(rhs)
    }
}

/// An RGB color handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Color used to draw station and passenger shapes
pub const SHAPE_COLOR: Color = Color::rgb(64, 64, 64);

/// Line colors, one per path button slot
pub const PATH_COLORS: [Color; 7] = [
    Color::rgb(228, 58, 52),
    Color::rgb(247, 178, 28),
    Color::rgb(40, 96, 180),
    Color::rgb(72, 170, 80),
    Color::rgb(150, 80, 170),
    Color::rgb(120, 80, 40),
    Color::rgb(60, 180, 190),
];
