//! Action envelopes and observations

use metro_sim::simulation::{Action, ActionResult, Point, ShapeType, SimConfig, SimWorld};

fn quiet_world() -> SimWorld {
    let config = SimConfig {
        passenger_spawn_interval_ms: 1.0e12,
        station_spawn_interval_ms: 1.0e12,
        ..SimConfig::default()
    };
    SimWorld::with_config(config, 13).unwrap()
}

#[test]
fn test_parse_envelopes() {
    assert_eq!(Action::from_json(r#"{"type": "noop"}"#), Some(Action::Noop));
    assert_eq!(
        Action::from_json(r#"{"type": "create_path", "station_indices": [0, 2, 1], "loop": true}"#),
        Some(Action::CreatePath {
            station_indices: vec![0, 2, 1],
            looped: true
        })
    );
    assert_eq!(
        Action::from_json(r#"{"type": "create_path", "station_indices": [0, 1]}"#),
        Some(Action::CreatePath {
            station_indices: vec![0, 1],
            looped: false
        })
    );
    assert_eq!(
        Action::from_json(r#"{"type": "remove_path", "path_id": 4}"#),
        Some(Action::RemovePath {
            index: None,
            path_id: Some(4)
        })
    );
    assert_eq!(
        Action::from_json(r#"{"type": "set_speed", "multiplier": 2}"#),
        Some(Action::SetSpeed { multiplier: 2 })
    );
    assert_eq!(
        Action::from_json(r#"{"type": "purchase_path_slot", "index": 1}"#),
        Some(Action::PurchasePathSlot { index: 1 })
    );
}

#[test]
fn test_unknown_or_malformed_envelopes_are_rejected() {
    let mut world = quiet_world();

    assert_eq!(world.apply_action_json(r#"{"type": "teleport"}"#), ActionResult::REJECTED);
    assert_eq!(world.apply_action_json("not json"), ActionResult::REJECTED);
    assert_eq!(world.apply_action_json(r#"{"type": "set_speed"}"#), ActionResult::REJECTED);
    assert!(world.paths.is_empty());
}

#[test]
fn test_create_and_remove_by_index() {
    let mut world = quiet_world();

    let created = world.apply_action_json(r#"{"type": "create_path", "station_indices": [0, 1, 2], "loop": true}"#);
    assert!(created.ok);
    assert!(world.paths[0].is_looped);

    assert!(!world.apply_action(&Action::RemovePath { index: Some(3), path_id: None }).ok);
    assert!(world.apply_action(&Action::RemovePath { index: Some(0), path_id: None }).ok);
    assert!(world.paths.is_empty());
}

#[test]
fn test_open_line_back_to_its_first_station_stays_open() {
    let mut world = quiet_world();

    let created = world.apply_action_json(r#"{"type": "create_path", "station_indices": [0, 1, 2, 0], "loop": false}"#);
    assert!(created.ok);

    let path = &world.paths[0];
    assert!(!path.is_looped);
    assert_eq!(path.stations.len(), 4);
    assert_eq!(path.stations.first(), path.stations.last());
    assert!(world.creating_path().is_none());
}

#[test]
fn test_remove_by_index_counts_finished_paths_only() {
    let mut world = quiet_world();
    world.game_state.score = 20;
    world.game_state.total_travels_handled = 20;
    assert!(world.purchase_path_slot(1));

    let finished = world.create_path(&[0, 1], false).unwrap();
    let draft_station = world.stations[2].id;
    assert!(world.start_path_at(draft_station));
    assert_eq!(world.observe().paths.len(), 1);

    assert!(!world.apply_action(&Action::RemovePath { index: Some(1), path_id: None }).ok);
    assert_eq!(world.paths.len(), 2);

    assert!(world.apply_action(&Action::RemovePath { index: Some(0), path_id: None }).ok);
    assert!(world.path(finished).is_none());
    assert_eq!(world.paths.len(), 1);
    assert!(world.paths[0].is_being_created);
}

#[test]
fn test_remove_by_path_id() {
    let mut world = quiet_world();
    let path_id = world.create_path(&[0, 1], false).unwrap();

    let raw = path_id.0 .0;
    let both = Action::RemovePath {
        index: Some(0),
        path_id: Some(raw),
    };
    assert!(!world.apply_action(&both).ok);
    assert!(!world.apply_action(&Action::RemovePath { index: None, path_id: None }).ok);

    let by_id = format!(r#"{{"type": "remove_path", "path_id": {}}}"#, raw);
    assert!(world.apply_action_json(&by_id).ok);
    assert!(world.paths.is_empty());
}

#[test]
fn test_invalid_create_path_is_rejected() {
    let mut world = quiet_world();

    assert!(!world.apply_action(&Action::CreatePath { station_indices: vec![0, 9], looped: false }).ok);
    assert!(!world.apply_action(&Action::CreatePath { station_indices: vec![1], looped: false }).ok);
    assert!(world.paths.is_empty());
    assert!(world.metros.is_empty());
}

#[test]
fn test_time_control_actions() {
    let mut world = quiet_world();

    assert!(world.apply_action(&Action::Pause).ok);
    assert!(world.is_paused);
    assert!(world.apply_action(&Action::Resume).ok);
    assert!(!world.is_paused);

    assert!(world.apply_action(&Action::SetSpeed { multiplier: 2 }).ok);
    assert!(!world.apply_action(&Action::SetSpeed { multiplier: 3 }).ok);
    assert_eq!(world.game_speed_multiplier, 2);
    assert!(world.apply_action(&Action::Noop).ok);
}

#[test]
fn test_purchase_action() {
    let mut world = quiet_world();
    assert!(!world.apply_action(&Action::PurchasePathSlot { index: 1 }).ok);

    world.game_state.score = 20;
    assert!(world.apply_action(&Action::PurchasePathSlot { index: 1 }).ok);
    assert_eq!(world.unlocked_num_paths(), 2);
}

#[test]
fn test_observation_mirrors_world() {
    let mut world = quiet_world();
    world.create_path(&[0, 1], false).unwrap();
    let station = world.stations[0].id;
    let passenger = world.spawn_passenger_at(station, ShapeType::Star).unwrap();
    world.tick(100.0);

    let observation = world.observe();
    assert_eq!(observation.steps, 1);
    assert_eq!(observation.stations.len(), 3);
    assert_eq!(observation.paths.len(), 1);
    assert_eq!(observation.paths[0].station_ids.len(), 2);
    assert_eq!(observation.metros.len(), 1);
    assert_eq!(observation.passengers.len(), 1);
    assert_eq!(observation.passengers[0].id, passenger);
    assert_eq!(observation.passengers[0].destination_shape_type, ShapeType::Star);
    assert_eq!(observation.stations[0].passenger_ids, vec![passenger]);
    assert_eq!(observation.path_buttons.len(), world.config.num_paths);
}

#[test]
fn test_observation_serializes_to_json() {
    let mut world = quiet_world();
    world.create_path(&[0, 1], false).unwrap();
    let station = world.stations[1].id;
    world.spawn_passenger_at(station, ShapeType::Star).unwrap();

    let value: serde_json::Value = serde_json::from_str(&world.observe_json().unwrap()).unwrap();

    assert_eq!(value["stations"].as_array().unwrap().len(), 3);
    assert_eq!(value["passengers"][0]["location"]["kind"], "station");
    assert_eq!(value["passengers"][0]["destination_shape_type"], "star");
    assert_eq!(value["paths"][0]["is_looped"], false);
    assert_eq!(value["is_game_over"], false);
    let position = value["path_buttons"][0]["position"].clone();
    assert!(position["x"].is_number());
}

#[test]
fn test_station_positions_are_on_screen() {
    let world = quiet_world();
    let screen = Point::new(world.config.screen_width, world.config.screen_height);

    for station in &world.stations {
        assert!(station.position.x >= 0.0 && station.position.x <= screen.x);
        assert!(station.position.y >= 0.0 && station.position.y <= screen.y);
    }
}
