//! Game mechanics validation test
//!
//! Score, path-slot purchases and station unlocks

use metro_sim::simulation::{GameState, SimConfig, SimWorld};

#[test]
fn test_game_state_initialization() {
    let config = SimConfig::default();
    let game_state = GameState::new(&config);

    assert_eq!(game_state.score, 0);
    assert_eq!(game_state.total_travels_handled, 0);
    assert_eq!(game_state.purchased_num_paths, 1);
    assert_eq!(game_state.unlocked_num_paths, 1);
    assert_eq!(game_state.unlocked_num_stations, config.initial_num_stations);
    assert!(!game_state.is_game_over);
}

#[test]
fn test_complete_travel_scores() {
    let mut game_state = GameState::new(&SimConfig::default());
    game_state.complete_travel();
    game_state.complete_travel();

    assert_eq!(game_state.score, 2);
    assert_eq!(game_state.total_travels_handled, 2);
}

#[test]
fn test_spending() {
    let mut game_state = GameState::new(&SimConfig::default());
    game_state.score = 10;

    assert!(game_state.can_afford(10));
    assert!(!game_state.can_afford(11));
    assert!(!game_state.spend(11));
    assert_eq!(game_state.score, 10);
    assert!(game_state.spend(4));
    assert_eq!(game_state.score, 6);
    assert_eq!(game_state.total_spent, 4);
}

#[test]
fn test_path_slot_prices_follow_milestone_steps() {
    let config = SimConfig {
        path_unlock_milestones: vec![0, 20, 50, 90, 140, 200, 270],
        ..SimConfig::default()
    };
    let game_state = GameState::new(&config);

    assert_eq!(game_state.path_slot_price(0), None);
    assert_eq!(game_state.path_slot_price(1), Some(20));
    assert_eq!(game_state.path_slot_price(2), Some(30));
    assert_eq!(game_state.path_slot_price(6), Some(70));
    assert_eq!(game_state.path_slot_price(7), None);
}

#[test]
fn test_purchase_needs_the_full_price() {
    let mut world = SimWorld::new_with_seed(3);
    let price = world.game_state.path_slot_price(1).unwrap();

    world.game_state.score = price - 1;
    assert!(!world.purchase_path_slot(1));
    assert_eq!(world.game_state.score, price - 1);
    assert_eq!(world.unlocked_num_paths(), 1);

    world.game_state.score = price;
    assert!(world.purchase_path_slot(1));
    assert_eq!(world.game_state.score, 0);
    assert_eq!(world.unlocked_num_paths(), 2);
    assert_eq!(world.game_state.total_spent, price);
}

#[test]
fn test_purchases_happen_in_order() {
    let mut world = SimWorld::new_with_seed(3);
    world.game_state.score = 1000;

    assert!(!world.purchase_path_slot(0));
    assert!(!world.purchase_path_slot(2));
    assert!(world.purchase_path_slot(1));
    assert!(!world.purchase_path_slot(1));
    assert!(world.purchase_path_slot(2));
    assert_eq!(world.game_state.purchased_num_paths, 3);
    assert!(!world.purchase_path_slot(world.config.num_paths));
}

#[test]
fn test_purchase_starts_button_blink() {
    let mut world = SimWorld::new_with_seed(3);
    world.tick(250.0);
    world.game_state.score = 20;

    let before = world.path_buttons();
    assert!(before[1].is_locked);
    assert_eq!(before[1].price, Some(20));
    assert_eq!(before[0].price, None);

    assert!(world.purchase_path_slot(1));
    let after = world.path_buttons();
    assert!(!after[1].is_locked);
    assert_eq!(after[1].price, None);
    assert_eq!(after[1].unlock_blink_start_ms, Some(world.time_ms));
    assert!(after[1].is_unlock_blinking(world.time_ms + 100.0, world.config.unlock_blink_duration_ms));
    assert!(after[2].is_locked);
}

#[test]
fn test_station_unlocks_follow_deliveries() {
    let config = SimConfig {
        initial_num_stations: 3,
        max_stations: 6,
        station_unlock_milestones: vec![2, 4, 4, 10, 20],
        ..SimConfig::default()
    };
    let mut game_state = GameState::new(&config);

    assert_eq!(game_state.update_station_unlocks(), 0);
    game_state.total_travels_handled = 2;
    assert_eq!(game_state.update_station_unlocks(), 1);
    assert_eq!(game_state.unlocked_num_stations, 4);

    game_state.total_travels_handled = 4;
    assert_eq!(game_state.update_station_unlocks(), 2);
    assert_eq!(game_state.unlocked_num_stations, 6);

    // Capped at the station maximum
    game_state.total_travels_handled = 100;
    assert_eq!(game_state.update_station_unlocks(), 0);
    assert_eq!(game_state.unlocked_num_stations, 6);
}

#[test]
fn test_summary_mentions_game_over() {
    let mut game_state = GameState::new(&SimConfig::default());
    assert!(game_state.summary().contains("Score: 0"));
    assert!(!game_state.summary().contains("GAME OVER"));

    game_state.is_game_over = true;
    assert!(game_state.summary().contains("GAME OVER"));
}

#[test]
fn test_config_validation() {
    assert!(SimConfig::default().validate().is_ok());

    let uneven = SimConfig {
        path_unlock_milestones: vec![0, 20],
        ..SimConfig::default()
    };
    assert!(uneven.validate().is_err());

    let decreasing = SimConfig {
        station_unlock_milestones: vec![5, 3],
        ..SimConfig::default()
    };
    assert!(SimWorld::with_config(decreasing, 1).is_err());

    let no_capacity = SimConfig {
        metro_capacity: 0,
        ..SimConfig::default()
    };
    assert!(no_capacity.validate().is_err());
}

#[test]
fn test_config_round_trips_through_json_defaults() {
    let config: SimConfig = serde_json::from_str(r#"{"station_capacity": 4, "patience_ms": 500.0}"#).unwrap();

    assert_eq!(config.station_capacity, 4);
    assert_eq!(config.patience_ms, 500.0);
    assert_eq!(config.metro_capacity, SimConfig::default().metro_capacity);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_file_loading() {
    let path = std::env::temp_dir().join(format!("metro_sim_config_{}.json", std::process::id()));
    std::fs::write(&path, r#"{"max_stations": 8, "spawn_weights": [["circle", 1.0]]}"#).unwrap();

    let config = SimConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.max_stations, 8);
    assert_eq!(config.spawn_weights.len(), 1);
    assert!(SimConfig::from_json_file(&path).is_err());
}
