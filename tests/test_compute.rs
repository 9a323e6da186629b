use std::cell::Cell;
use std::rc::Rc;

use adventure_core::collab::{FnScript, NullAnimations};
use adventure_core::compute::{Simulation, World};
use adventure_core::config::{ConfigError, SimConfig};
use adventure_core::entities::*;

const BOUNDS: WorldBounds = WorldBounds::new(0, 0, 1280, 960);

/// No background spawning unless a test asks for it.
fn quiet_config() -> SimConfig {
    SimConfig {
        seed: Some(42),
        enemy_spawn_interval_ms: 1e12,
        pickup_spawn_interval_ms: 1e12,
        ..SimConfig::default()
    }
}

fn make_sim(config: SimConfig) -> Simulation {
    Simulation::new(config, BOUNDS, Box::new(NullAnimations)).expect("valid config")
}

fn idle() -> FrameInput {
    FrameInput::default()
}

fn kill(sim: &mut Simulation) {
    let world = sim.world_mut();
    world.player.game_over(world.anims.as_mut());
}

// ── Setup ─────────────────────────────────────────────────────────────────────

#[test]
fn new_simulation_places_player_at_start() {
    let sim = make_sim(quiet_config());
    assert_eq!(sim.player().position(), Position::new(100, 100));
    assert_eq!(sim.player().health(), 3);
    assert!(sim.registry().is_empty());
    assert_eq!(sim.frame(), 0);
}

#[test]
fn invalid_config_is_rejected() {
    let config = SimConfig {
        enemy_spawn_interval_ms: 0.0,
        ..SimConfig::default()
    };
    assert!(Simulation::new(config, BOUNDS, Box::new(NullAnimations)).is_err());
}

#[test]
fn world_refuses_inverted_patrol_range() {
    let config = SimConfig {
        enemy_patrol_min_ms: 4000.0,
        enemy_patrol_max_ms: 1000.0,
        ..quiet_config()
    };
    let result = World::new(config, BOUNDS, Box::new(NullAnimations));
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue {
            field: "enemy_patrol_min_ms",
            ..
        })
    ));
}

// ── Enemy contact ─────────────────────────────────────────────────────────────

#[test]
fn adjacent_enemy_hits_once_and_is_removed() {
    let mut sim = make_sim(quiet_config());
    let id = sim.world_mut().spawn_enemy(Position::new(110, 100));

    let events = sim.tick(16.0, &idle());

    assert_eq!(sim.player().health(), 2);
    assert_eq!(sim.player().position(), Position::new(84, 100));
    assert!(!sim.registry().contains(id));
    assert!(events.contains(&FrameEvent::PlayerDamaged {
        source: Position::new(110, 100),
        health: 2,
    }));
    assert!(events.contains(&FrameEvent::EntityRemoved { id }));
}

#[test]
fn enemies_react_to_the_players_new_position() {
    let mut sim = make_sim(quiet_config());
    // 135 px away at the start of the frame, 7 px after the player moves.
    sim.world_mut().spawn_enemy(Position::new(235, 100));

    let right = FrameInput {
        right: true,
        ..FrameInput::default()
    };
    sim.tick(1000.0, &right);

    assert_eq!(sim.player().health(), 2);
    assert_eq!(sim.player().position(), Position::new(212, 100));
    assert_eq!(sim.registry().count(|e| e.as_enemy().is_some()), 0);
}

#[test]
fn nearby_enemy_starts_chasing() {
    let mut sim = make_sim(quiet_config());
    let id = sim.world_mut().spawn_enemy(Position::new(250, 100));

    sim.tick(100.0, &idle());

    let enemy = sim.registry().get(id).expect("enemy");
    assert!(enemy.as_enemy().is_some_and(|e| e.chasing));
    assert_eq!(enemy.position, Position::new(238, 100));
}

// ── Game over ─────────────────────────────────────────────────────────────────

#[test]
fn fatal_hit_reports_game_over_once_then_freezes() {
    let mut sim = make_sim(quiet_config());
    {
        let world = sim.world_mut();
        world.player.lose_health(world.anims.as_mut());
        world.player.lose_health(world.anims.as_mut());
    }
    sim.world_mut().spawn_enemy(Position::new(100, 105));

    let events = sim.tick(16.0, &idle());
    assert!(events.contains(&FrameEvent::GameOver));
    assert!(sim.is_game_over());
    assert_eq!(sim.player().health(), 0);

    let frame = sim.frame();
    let pos = sim.player().position();
    let right = FrameInput {
        right: true,
        attack: true,
        place_bomb: true,
        ..FrameInput::default()
    };
    assert!(sim.tick(10_000.0, &right).is_empty());
    assert_eq!(sim.frame(), frame);
    assert_eq!(sim.player().position(), pos);
    assert_eq!(sim.player().state(), PlayerState::GameOver);
    assert!(sim.registry().is_empty());
}

#[test]
fn death_by_contact_leaves_expired_bomb_unresolved() {
    let mut sim = make_sim(quiet_config());
    {
        let world = sim.world_mut();
        world.player.lose_health(world.anims.as_mut());
        world.player.lose_health(world.anims.as_mut());
    }
    let bomb = sim.world_mut().add_bomb(Position::new(100, 100));
    let enemy = sim.world_mut().spawn_enemy(Position::new(100, 105));

    let events = sim.tick(2200.0, &idle());
    let hits = events
        .iter()
        .filter(|e| matches!(e, FrameEvent::PlayerDamaged { .. }))
        .count();
    assert_eq!(hits, 1);
    assert!(events.contains(&FrameEvent::EntityRemoved { id: enemy }));
    assert!(!events.contains(&FrameEvent::EntityRemoved { id: bomb }));
    assert!(sim.registry().contains(bomb));
    assert_eq!(sim.player().health(), 0);

    assert!(sim.tick(16.0, &idle()).is_empty());
    assert!(sim.registry().contains(bomb));
}

#[test]
fn frozen_simulation_spawns_nothing() {
    let mut sim = make_sim(SimConfig {
        seed: Some(1),
        ..SimConfig::default()
    });
    kill(&mut sim);
    for _ in 0..10 {
        sim.tick(5000.0, &idle());
    }
    assert!(sim.registry().is_empty());
}

#[test]
fn click_bombs_are_refused_after_game_over() {
    let mut sim = make_sim(quiet_config());
    assert!(sim.place_bomb_at(Position::new(40, 40)).is_some());
    kill(&mut sim);
    assert!(sim.place_bomb_at(Position::new(40, 40)).is_none());
    assert_eq!(sim.registry().len(), 1);
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[test]
fn attack_counts_with_at_most_one_direction() {
    let mut sim = make_sim(quiet_config());
    let attack_left = FrameInput {
        left: true,
        attack: true,
        ..FrameInput::default()
    };
    sim.tick(100.0, &attack_left);
    assert_eq!(sim.player().state(), PlayerState::Attack);
    assert_eq!(sim.player().direction(), Direction::Left);

    let attack_diagonal = FrameInput {
        up: true,
        right: true,
        attack: true,
        ..FrameInput::default()
    };
    sim.tick(100.0, &attack_diagonal);
    assert_eq!(sim.player().state(), PlayerState::Move);
}

#[test]
fn bomb_key_drops_a_bomb_that_later_explodes_on_the_player() {
    let mut sim = make_sim(quiet_config());
    let bomb = FrameInput {
        place_bomb: true,
        ..FrameInput::default()
    };

    let events = sim.tick(16.0, &bomb);
    let id = events
        .iter()
        .find_map(|ev| match ev {
            FrameEvent::BombPlaced { id, position } => {
                assert_eq!(*position, Position::new(100, 100));
                Some(*id)
            }
            _ => None,
        })
        .expect("bomb placed");
    assert!(sim.registry().get(id).is_some_and(|e| e.is_temporary()));

    sim.tick(2000.0, &idle());
    assert!(sim.registry().contains(id));

    sim.tick(100.0, &idle());
    assert!(!sim.registry().contains(id));
    assert_eq!(sim.player().health(), 2);
    // Standing on the bomb: zero delta on both axes, no knockback.
    assert_eq!(sim.player().position(), Position::new(100, 100));
}

// ── Spawning through the orchestrator ─────────────────────────────────────────

#[test]
fn spawn_budgets_follow_elapsed_time() {
    let mut sim = make_sim(SimConfig {
        seed: Some(9),
        pickup_spawn_interval_ms: 1e12,
        ..SimConfig::default()
    });
    let mut spawned = 0;
    for _ in 0..300 {
        spawned += sim
            .tick(16.0, &idle())
            .iter()
            .filter(|ev| matches!(ev, FrameEvent::EnemySpawned { .. }))
            .count();
        if sim.is_game_over() {
            break;
        }
    }
    // 4800 ms elapsed: nothing yet.
    assert_eq!(spawned, 0);

    let events = sim.tick(200.0, &idle());
    assert!(events
        .iter()
        .any(|ev| matches!(ev, FrameEvent::EnemySpawned { .. })));
    assert_eq!(sim.spawner().enemy_budget().accumulated_ms(), 0.0);
}

// ── Scripts ───────────────────────────────────────────────────────────────────

#[test]
fn scripts_run_once_per_live_frame() {
    let mut sim = make_sim(quiet_config());
    let runs = Rc::new(Cell::new(0));
    let counter = Rc::clone(&runs);
    sim.scripts_mut()
        .register(FnScript::new("count", move |_: &mut World| {
            counter.set(counter.get() + 1)
        }));

    for _ in 0..5 {
        sim.tick(16.0, &idle());
    }
    assert_eq!(runs.get(), 5);

    kill(&mut sim);
    sim.tick(16.0, &idle());
    assert_eq!(runs.get(), 5);
}

#[test]
fn scripts_can_create_entities() {
    let mut sim = make_sim(quiet_config());
    sim.scripts_mut()
        .register(FnScript::new("mine_layer", |world: &mut World| {
            if world.registry.is_empty() {
                world.add_bomb(Position::new(600, 600));
            }
        }));

    sim.tick(16.0, &idle());

    let bombs: Vec<_> = sim.registry().iter().filter(|e| e.is_temporary()).collect();
    assert_eq!(bombs.len(), 1);
    assert_eq!(bombs[0].position, Position::new(600, 600));
}
