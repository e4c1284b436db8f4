//! Station and passenger shapes
//!
//! Shapes are plain values: a type tag plus color, size and rotation. The
//! renderer asks for an outline and draws it; the simulation only needs the
//! type tag and the containment test.

use serde::{Deserialize, Serialize};

use super::types::{Color, Point};

/// The kind of shape a station has, and the kind a passenger wants to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    Rect,
    Circle,
    Triangle,
    Cross,
    Diamond,
    Pentagon,
    Star,
}

impl ShapeType {
    pub const ALL: [ShapeType; 7] = [
        ShapeType::Rect,
        ShapeType::Circle,
        ShapeType::Triangle,
        ShapeType::Cross,
        ShapeType::Diamond,
        ShapeType::Pentagon,
        ShapeType::Star,
    ];

    /// Shapes that may appear at most once per game
    pub const RARE: [ShapeType; 3] = [ShapeType::Diamond, ShapeType::Pentagon, ShapeType::Star];

    pub fn is_rare(self) -> bool {
        Self::RARE.contains(&self)
    }

    /// Single character used by the terminal map
    pub fn symbol(self) -> char {
        match self {
            ShapeType::Rect => '#',
            ShapeType::Circle => 'O',
            ShapeType::Triangle => '^',
            ShapeType::Cross => 'X',
            ShapeType::Diamond => 'D',
            ShapeType::Pentagon => 'P',
            ShapeType::Star => '*',
        }
    }
}

/// A drawable, hit-testable shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub shape_type: ShapeType,
    pub color: Color,
    /// Circumradius in pixels
    pub size: f32,
    /// Rotation in degrees, always in `[0, 360)`
    pub rotation: f32,
}

impl Shape {
    pub fn new(shape_type: ShapeType, color: Color, size: f32) -> Self {
        Self {
            shape_type,
            color,
            size,
            rotation: 0.0,
        }
    }

    pub fn radius(&self) -> f32 {
        self.size
    }

    /// Compose a rotation by degree addition modulo 360
    pub fn rotate(&mut self, degrees: f32) {
        self.rotation = (self.rotation + degrees).rem_euclid(360.0);
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotate(degrees);
        self
    }

    /// Polygon vertices around `center`, with rotation applied.
    /// Circles return an empty outline; use `radius()` instead.
    pub fn outline(&self, center: Point) -> Vec<Point> {
        let r = self.size;
        let local: Vec<Point> = match self.shape_type {
            ShapeType::Circle => return Vec::new(),
            ShapeType::Rect => {
                let h = r / std::f32::consts::SQRT_2;
                vec![
                    Point::new(-h, -h),
                    Point::new(h, -h),
                    Point::new(h, h),
                    Point::new(-h, h),
                ]
            }
            ShapeType::Diamond => vec![
                Point::new(0.0, -r),
                Point::new(r, 0.0),
                Point::new(0.0, r),
                Point::new(-r, 0.0),
            ],
            ShapeType::Triangle => regular_polygon(3, r),
            ShapeType::Pentagon => regular_polygon(5, r),
            ShapeType::Star => star_polygon(5, r, r * 0.45),
            ShapeType::Cross => {
                let t = r / 3.0;
                vec![
                    Point::new(-t, -r),
                    Point::new(t, -r),
                    Point::new(t, -t),
                    Point::new(r, -t),
                    Point::new(r, t),
                    Point::new(t, t),
                    Point::new(t, r),
                    Point::new(-t, r),
                    Point::new(-t, t),
                    Point::new(-r, t),
                    Point::new(-r, -t),
                    Point::new(-t, -t),
                ]
            }
        };

        local
            .into_iter()
            .map(|p| p.rotate(self.rotation) + center)
            .collect()
    }

    /// Hit test for a shape drawn at `center`
    pub fn contains(&self, center: Point, point: Point) -> bool {
        match self.shape_type {
            ShapeType::Circle => center.distance_squared(&point) <= self.size * self.size,
            _ => point_in_polygon(&self.outline(center), point),
        }
    }
}

/// Regular polygon with the first vertex pointing up
fn regular_polygon(sides: usize, radius: f32) -> Vec<Point> {
    (0..sides)
        .map(|i| {
            let angle = -90.0 + 360.0 * i as f32 / sides as f32;
            Point::new(radius, 0.0).rotate(angle)
        })
        .collect()
}

fn star_polygon(points: usize, outer: f32, inner: f32) -> Vec<Point> {
    (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = -90.0 + 180.0 * i as f32 / points as f32;
            Point::new(radius, 0.0).rotate(angle)
        })
        .collect()
}

/// Even-odd ray casting test
pub fn point_in_polygon(vertices: &[Point], point: Point) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
