/// Population control: periodic, capped creation of enemies and pickups
/// around the player.

use std::f64::consts::TAU;

use rand::Rng;
use tracing::debug;

use crate::compute::World;
use crate::config::SimConfig;
use crate::entities::{FrameEvent, Position};

// ── Leaky-bucket timer ────────────────────────────────────────────────────────

/// Accumulates elapsed time and fires once per whole interval.  Surplus is
/// carried over rather than discarded, so the long-run rate is exact no
/// matter how the time is chunked into frames.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicBudget {
    interval_ms: f64,
    accumulator_ms: f64,
}

impl PeriodicBudget {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            accumulator_ms: 0.0,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn accumulated_ms(&self) -> f64 {
        self.accumulator_ms
    }

    /// Add `elapsed_ms` and return how many intervals completed.
    pub fn tick(&mut self, elapsed_ms: f64) -> u32 {
        if self.interval_ms <= 0.0 {
            return 0;
        }
        self.accumulator_ms += elapsed_ms.max(0.0);
        let mut fired = 0;
        while self.accumulator_ms >= self.interval_ms {
            self.accumulator_ms -= self.interval_ms;
            fired += 1;
        }
        fired
    }
}

// ── Spawner ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Spawner {
    enemy_budget: PeriodicBudget,
    pickup_budget: PeriodicBudget,
    enemy_radius: (f64, f64),
    pickup_radius: (f64, f64),
    max_pickups: usize,
}

impl Spawner {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            enemy_budget: PeriodicBudget::new(config.enemy_spawn_interval_ms),
            pickup_budget: PeriodicBudget::new(config.pickup_spawn_interval_ms),
            enemy_radius: (config.enemy_spawn_min_radius, config.enemy_spawn_max_radius),
            pickup_radius: (config.pickup_spawn_min_radius, config.pickup_spawn_max_radius),
            max_pickups: config.max_health_pickups,
        }
    }

    pub fn enemy_budget(&self) -> &PeriodicBudget {
        &self.enemy_budget
    }

    pub fn pickup_budget(&self) -> &PeriodicBudget {
        &self.pickup_budget
    }

    /// Advance both budgets and spawn whatever they allow.
    pub fn run(&mut self, elapsed_ms: f64, world: &mut World) -> Vec<FrameEvent> {
        let mut events = Vec::new();

        for _ in 0..self.enemy_budget.tick(elapsed_ms) {
            let (min_r, max_r) = self.enemy_radius;
            let position = point_around(world.player.position(), min_r, max_r, &mut world.rng);
            let id = world.spawn_enemy(position);
            debug!(id = id.0, x = position.x, y = position.y, "enemy spawned");
            events.push(FrameEvent::EnemySpawned { id, position });
        }

        for _ in 0..self.pickup_budget.tick(elapsed_ms) {
            // Counted fresh each time; a full tick is dropped, not deferred.
            let live = world.registry.count(|e| e.is_health_pickup());
            if live >= self.max_pickups {
                debug!(live, "pickup spawn skipped at capacity");
                events.push(FrameEvent::PickupSpawnSkipped);
                continue;
            }
            let (min_r, max_r) = self.pickup_radius;
            let position = point_around(world.player.position(), min_r, max_r, &mut world.rng);
            let id = world.spawn_health_pickup(position);
            debug!(id = id.0, x = position.x, y = position.y, "health pickup spawned");
            events.push(FrameEvent::PickupSpawned { id, position });
        }

        events
    }
}

/// Uniform angle, uniform radius in `[min_r, max_r]`, offsets truncated
/// toward zero.
pub fn point_around(center: Position, min_r: f64, max_r: f64, rng: &mut impl Rng) -> Position {
    let angle = rng.gen_range(0.0..TAU);
    let radius = if max_r > min_r {
        rng.gen_range(min_r..=max_r)
    } else {
        min_r
    };
    Position {
        x: center.x + (angle.cos() * radius) as i32,
        y: center.y + (angle.sin() * radius) as i32,
    }
}
