//! Points and shapes

use metro_sim::simulation::{point_in_polygon, Point, Shape, ShapeType, SHAPE_COLOR};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_point_arithmetic() {
    let a = Point::new(1.0, 2.0);
    let b = Point::new(4.0, 6.0);

    assert_eq!(a + b, Point::new(5.0, 8.0));
    assert_eq!(b - a, Point::new(3.0, 4.0));
    assert_eq!(a * 2.0, Point::new(2.0, 4.0));
    assert!(approx(a.distance(&b), 5.0));
    assert!(approx(a.distance_squared(&b), 25.0));
}

#[test]
fn test_point_rotation() {
    let p = Point::new(1.0, 0.0).rotate(90.0);
    assert!(approx(p.x, 0.0) && approx(p.y, 1.0), "got {:?}", p);

    let pivot = Point::new(1.0, 1.0);
    let q = Point::new(2.0, 1.0).rotate_around(&pivot, 180.0);
    assert!(approx(q.x, 0.0) && approx(q.y, 1.0), "got {:?}", q);
}

#[test]
fn test_circle_contains_uses_radius() {
    let circle = Shape::new(ShapeType::Circle, SHAPE_COLOR, 10.0);
    let center = Point::new(100.0, 100.0);

    assert!(circle.contains(center, Point::new(110.0, 100.0)));
    assert!(circle.contains(center, Point::new(105.0, 105.0)));
    assert!(!circle.contains(center, Point::new(108.0, 108.0)));
    assert!(circle.outline(center).is_empty());
}

#[test]
fn test_polygon_shapes_contain_their_center() {
    let center = Point::new(50.0, 50.0);
    for shape_type in ShapeType::ALL {
        let shape = Shape::new(shape_type, SHAPE_COLOR, 20.0);
        assert!(shape.contains(center, center), "{:?} misses its center", shape_type);
        assert!(
            !shape.contains(center, Point::new(80.0, 80.0)),
            "{:?} contains a far point",
            shape_type
        );
    }
}

#[test]
fn test_outline_vertex_counts() {
    let center = Point::default();
    let count = |shape_type| Shape::new(shape_type, SHAPE_COLOR, 10.0).outline(center).len();

    assert_eq!(count(ShapeType::Rect), 4);
    assert_eq!(count(ShapeType::Triangle), 3);
    assert_eq!(count(ShapeType::Diamond), 4);
    assert_eq!(count(ShapeType::Pentagon), 5);
    assert_eq!(count(ShapeType::Star), 10);
    assert_eq!(count(ShapeType::Cross), 12);
}

#[test]
fn test_rotation_composes_modulo_360() {
    let mut shape = Shape::new(ShapeType::Rect, SHAPE_COLOR, 10.0);
    shape.rotate(300.0);
    shape.rotate(120.0);
    assert!(approx(shape.rotation, 60.0));

    let back = shape.rotated(-120.0);
    assert!(approx(back.rotation, 300.0));
}

#[test]
fn test_rotated_rect_changes_hit_area() {
    let center = Point::default();
    let square = Shape::new(ShapeType::Rect, SHAPE_COLOR, 10.0);
    // The corner of the axis-aligned square sits at about (7.07, 7.07)
    let near_corner = Point::new(6.5, 6.5);
    assert!(square.contains(center, near_corner));
    assert!(!square.rotated(45.0).contains(center, near_corner));
    assert!(square.rotated(45.0).contains(center, Point::new(0.0, 9.5)));
}

#[test]
fn test_point_in_polygon_needs_three_vertices() {
    let segment = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
    assert!(!point_in_polygon(&segment, Point::new(5.0, 0.0)));

    let triangle = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)];
    assert!(point_in_polygon(&triangle, Point::new(2.0, 2.0)));
    assert!(!point_in_polygon(&triangle, Point::new(8.0, 8.0)));
}

#[test]
fn test_shape_types_serialize_snake_case() {
    let text = serde_json::to_string(&ShapeType::Pentagon).unwrap();
    assert_eq!(text, "\"pentagon\"");
    assert!(ShapeType::Star.is_rare());
    assert!(!ShapeType::Cross.is_rare());
}
