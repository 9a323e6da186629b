use adventure_core::config::*;
use adventure_core::entities::{Position, WorldBounds};

#[test]
fn defaults_match_gameplay_constants() {
    let c = SimConfig::default();
    assert_eq!(c.player_speed, 128.0);
    assert_eq!(c.max_health, 3);
    assert_eq!(c.knockback_px, 16);
    assert_eq!(c.player_start(), Position::new(100, 100));
    assert_eq!(c.enemy_detection_radius, 200.0);
    assert_eq!(c.enemy_chase_exit_factor, 1.5);
    assert_eq!(c.enemy_damage_distance, 16.0);
    assert_eq!(c.enemy_spawn_interval_ms, 5000.0);
    assert_eq!(c.pickup_spawn_interval_ms, 8000.0);
    assert_eq!(c.max_health_pickups, 5);
    assert_eq!(c.interaction_reach_px, 32);
    assert!(c.validate().is_ok());
}

#[test]
fn partial_json_keeps_remaining_defaults() {
    let c = SimConfig::from_json_str(r#"{ "seed": 11, "max_health_pickups": 2 }"#)
        .expect("valid config");
    assert_eq!(c.seed, Some(11));
    assert_eq!(c.max_health_pickups, 2);
    assert_eq!(c.enemy_speed, 128.0);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = SimConfig::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn nonsensical_values_are_rejected() {
    let err = SimConfig::from_json_str(r#"{ "pickup_spawn_interval_ms": -1 }"#).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            field: "pickup_spawn_interval_ms",
            ..
        }
    ));

    let err = SimConfig::from_json_str(r#"{ "enemy_spawn_min_radius": 500 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));

    let err = SimConfig::from_json_str(r#"{ "max_health": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { field: "max_health", .. }));
}

#[test]
fn level_header_yields_pixel_bounds() {
    let level = LevelDimensions::from_json_str(
        r#"{ "width": 40, "height": 30, "tilewidth": 32, "tileheight": 32,
             "layers": [], "tilesets": [] }"#,
    )
    .expect("level header");
    assert_eq!(
        level.world_bounds().expect("bounds"),
        WorldBounds::new(0, 0, 1280, 960)
    );
}

#[test]
fn missing_level_size_is_reported() {
    let level = LevelDimensions::from_json_str(r#"{ "width": 40, "tilewidth": 32, "tileheight": 32 }"#)
        .expect("level header");
    assert!(matches!(
        level.world_bounds(),
        Err(ConfigError::InvalidLevelDimensions)
    ));
}

#[test]
fn zero_tile_size_is_reported() {
    let level = LevelDimensions {
        width: Some(10),
        height: Some(10),
        tile_width: Some(0),
        tile_height: Some(32),
    };
    assert!(matches!(
        level.world_bounds(),
        Err(ConfigError::InvalidTileDimensions)
    ));
}

#[test]
fn oversized_level_is_reported_not_wrapped() {
    let overflowing = LevelDimensions {
        width: Some(70_000),
        height: Some(10),
        tile_width: Some(70_000),
        tile_height: Some(32),
    };
    assert!(matches!(
        overflowing.world_bounds(),
        Err(ConfigError::DimensionsTooLarge {
            tiles: 70_000,
            tile_px: 70_000
        })
    ));

    let past_i32 = LevelDimensions {
        width: Some(3_000_000_000),
        height: Some(10),
        tile_width: Some(1),
        tile_height: Some(32),
    };
    assert!(matches!(
        past_i32.world_bounds(),
        Err(ConfigError::DimensionsTooLarge { .. })
    ));
}

#[test]
fn largest_representable_level_still_fits() {
    let level = LevelDimensions {
        width: Some(i32::MAX as u32),
        height: Some(1),
        tile_width: Some(1),
        tile_height: Some(1),
    };
    assert_eq!(
        level.world_bounds().expect("bounds"),
        WorldBounds::new(0, 0, i32::MAX, 1)
    );
}
