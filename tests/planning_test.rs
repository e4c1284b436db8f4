//! Station graph and route search

use metro_sim::simulation::{
    PathId, Point, Shape, ShapeType, SimId, SimPath, SimStation, SimTransitNetwork, StationId,
    PATH_COLORS, SHAPE_COLOR,
};

fn station_id(n: usize) -> StationId {
    StationId(SimId(n))
}

fn stations(shapes: &[ShapeType]) -> Vec<SimStation> {
    shapes
        .iter()
        .enumerate()
        .map(|(n, shape_type)| {
            SimStation::new(
                station_id(n),
                Shape::new(*shape_type, SHAPE_COLOR, 30.0),
                Point::new(n as f32 * 100.0, 0.0),
                12,
            )
        })
        .collect()
}

fn line(id: usize, through: &[usize]) -> SimPath {
    let mut path = SimPath::new(PathId(SimId(100 + id)), PATH_COLORS[id], id, station_id(through[0]));
    for n in &through[1..] {
        path.stations.push(station_id(*n));
    }
    path.is_being_created = false;
    path
}

fn ids(route: &[usize]) -> Vec<StationId> {
    route.iter().map(|n| station_id(*n)).collect()
}

#[test]
fn test_graph_has_one_edge_per_line_and_pair() {
    let stations = stations(&[ShapeType::Rect, ShapeType::Circle, ShapeType::Triangle]);
    let paths = vec![line(0, &[0, 1, 2]), line(1, &[0, 1])];

    let mut network = SimTransitNetwork::new();
    network.rebuild(&stations, &paths);

    assert_eq!(network.station_count(), 3);
    assert_eq!(network.edge_count(), 3);
    assert_eq!(network.lines_between(station_id(0), station_id(1)).len(), 2);
    assert_eq!(network.neighbors(station_id(1)), ids(&[0, 2]));
}

#[test]
fn test_paths_being_created_are_ignored() {
    let stations = stations(&[ShapeType::Rect, ShapeType::Circle]);
    let mut draft = line(0, &[0, 1]);
    draft.is_being_created = true;

    let mut network = SimTransitNetwork::new();
    network.rebuild(&stations, &[draft]);

    assert_eq!(network.edge_count(), 0);
    assert_eq!(network.find_route(station_id(0), ShapeType::Circle), None);
}

#[test]
fn test_route_prefers_fewest_hops() {
    // 0 -> 1 -> 2 -> 3 (circle) on one line, 0 -> 4 (circle) on another
    let stations = stations(&[
        ShapeType::Rect,
        ShapeType::Triangle,
        ShapeType::Triangle,
        ShapeType::Circle,
        ShapeType::Circle,
    ]);
    let paths = vec![line(0, &[0, 1, 2, 3]), line(1, &[0, 4])];

    let mut network = SimTransitNetwork::new();
    network.rebuild(&stations, &paths);

    assert_eq!(network.find_route(station_id(0), ShapeType::Circle), Some(ids(&[0, 4])));
}

#[test]
fn test_route_prefers_fewer_transfers_on_equal_hops() {
    // Two-hop routes to the circle at 3: via 1 on a single line, or via 2 changing lines
    let stations = stations(&[
        ShapeType::Rect,
        ShapeType::Triangle,
        ShapeType::Triangle,
        ShapeType::Circle,
    ]);
    let paths = vec![line(0, &[0, 2]), line(1, &[2, 3]), line(2, &[0, 1, 3])];

    let mut network = SimTransitNetwork::new();
    network.rebuild(&stations, &paths);

    assert_eq!(network.find_route(station_id(0), ShapeType::Circle), Some(ids(&[0, 1, 3])));
}

#[test]
fn test_route_ties_break_on_station_order() {
    // Circles at 1 and 2 are both one hop away on the same line
    let stations = stations(&[ShapeType::Rect, ShapeType::Circle, ShapeType::Circle]);
    let paths = vec![line(0, &[2, 0, 1])];

    let mut network = SimTransitNetwork::new();
    network.rebuild(&stations, &paths);

    assert_eq!(network.find_route(station_id(0), ShapeType::Circle), Some(ids(&[0, 1])));
}

#[test]
fn test_looped_line_wraps_around() {
    let stations = stations(&[
        ShapeType::Rect,
        ShapeType::Triangle,
        ShapeType::Triangle,
        ShapeType::Circle,
    ]);
    let mut looped = line(0, &[0, 1, 2, 3, 0]);
    looped.is_looped = true;

    let mut network = SimTransitNetwork::new();
    network.rebuild(&stations, &[looped]);

    assert_eq!(network.find_route(station_id(0), ShapeType::Circle), Some(ids(&[0, 3])));
}

#[test]
fn test_no_route_without_matching_station() {
    let stations = stations(&[ShapeType::Rect, ShapeType::Circle]);
    let paths = vec![line(0, &[0, 1])];

    let mut network = SimTransitNetwork::new();
    network.rebuild(&stations, &paths);

    assert!(!network.has_destination(ShapeType::Star));
    assert_eq!(network.find_route(station_id(0), ShapeType::Star), None);
}

#[test]
fn test_unconnected_destination_has_no_route() {
    let stations = stations(&[ShapeType::Rect, ShapeType::Triangle, ShapeType::Circle]);
    let paths = vec![line(0, &[0, 1])];

    let mut network = SimTransitNetwork::new();
    network.rebuild(&stations, &paths);

    assert!(network.has_destination(ShapeType::Circle));
    assert_eq!(network.find_route(station_id(0), ShapeType::Circle), None);
}

#[test]
fn test_rebuild_drops_cached_routes() {
    let stations = stations(&[ShapeType::Rect, ShapeType::Triangle, ShapeType::Circle]);
    let mut network = SimTransitNetwork::new();

    network.rebuild(&stations, &[line(0, &[0, 1])]);
    assert_eq!(network.find_route(station_id(0), ShapeType::Circle), None);

    network.rebuild(&stations, &[line(0, &[0, 1, 2])]);
    assert_eq!(network.find_route(station_id(0), ShapeType::Circle), Some(ids(&[0, 1, 2])));
}
