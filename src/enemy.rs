/// Enemy AI: patrol / chase with hysteresis, contact damage, self-removal.

use std::f64::consts::TAU;

use rand::Rng;

use crate::collab::AnimationHost;
use crate::config::SimConfig;
use crate::entities::{EnemyAnimation, EnemyState, Entity, EntityKind, Position};
use crate::player::Player;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyTuning {
    pub speed: f32,
    pub patrol_speed: f32,
    pub detection_radius: f32,
    pub chase_exit_factor: f32,
    pub damage_distance: f32,
    pub patrol_min_ms: f64,
    pub patrol_max_ms: f64,
}

impl From<&SimConfig> for EnemyTuning {
    fn from(config: &SimConfig) -> Self {
        Self {
            speed: config.enemy_speed,
            patrol_speed: config.enemy_patrol_speed,
            detection_radius: config.enemy_detection_radius,
            chase_exit_factor: config.enemy_chase_exit_factor,
            damage_distance: config.enemy_damage_distance,
            patrol_min_ms: config.enemy_patrol_min_ms,
            patrol_max_ms: config.enemy_patrol_max_ms,
        }
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self::from(&SimConfig::default())
    }
}

/// What a single AI step did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyOutcome {
    /// Already marked for removal; nothing happened.
    Inert,
    /// Touched the player and marked itself for removal.  `landed` is false
    /// when the player was already past caring (game over).
    Damaged { landed: bool },
    /// Unrounded displacement applied this frame, in pixels.
    Moved { displacement: (f32, f32) },
}

impl EnemyState {
    /// Patrolling, not chasing, with a freshly rolled heading.
    pub fn new(now_ms: f64, tuning: &EnemyTuning, rng: &mut impl Rng) -> Self {
        let mut enemy = EnemyState {
            speed: tuning.speed,
            direction: (0.0, 0.0),
            next_direction_change_ms: now_ms,
            chasing: false,
            should_be_removed: false,
            animation: EnemyAnimation::Idle,
        };
        enemy.reroll_patrol(now_ms, tuning, rng);
        enemy
    }

    /// New random unit heading, valid until a random deadline.
    pub fn reroll_patrol(&mut self, now_ms: f64, tuning: &EnemyTuning, rng: &mut impl Rng) {
        let angle = rng.gen_range(0.0..TAU);
        self.direction = (angle.cos() as f32, angle.sin() as f32);
        let hold_ms = rng.gen_range(tuning.patrol_min_ms..=tuning.patrol_max_ms);
        self.next_direction_change_ms = now_ms + hold_ms;
    }

    /// Hysteresis: enter below the radius, leave above `radius * factor`,
    /// otherwise keep whatever we were doing.
    pub fn update_chase(&mut self, distance: f32, tuning: &EnemyTuning) {
        if distance < tuning.detection_radius {
            self.chasing = true;
        } else if distance > tuning.detection_radius * tuning.chase_exit_factor {
            self.chasing = false;
        }
    }
}

/// Advance one enemy entity by `elapsed_ms`, reacting to the player's
/// current position.  Non-enemy entities are left untouched.
pub fn update_enemy(
    entity: &mut Entity,
    player: &mut Player,
    now_ms: f64,
    elapsed_ms: f64,
    tuning: &EnemyTuning,
    rng: &mut impl Rng,
    anims: &mut dyn AnimationHost,
) -> EnemyOutcome {
    let Entity {
        position,
        visual,
        kind,
        ..
    } = entity;
    let EntityKind::Enemy(enemy) = kind else {
        return EnemyOutcome::Inert;
    };
    if enemy.should_be_removed {
        return EnemyOutcome::Inert;
    }

    let target = player.position();
    let dx = (target.x - position.x) as f32;
    let dy = (target.y - position.y) as f32;
    let distance = position.distance_to(target);

    if distance < tuning.damage_distance {
        let landed = player.take_hit(*position, anims);
        enemy.should_be_removed = true;
        return EnemyOutcome::Damaged { landed };
    }

    enemy.update_chase(distance, tuning);

    let speed = if enemy.chasing {
        enemy.speed
    } else {
        tuning.patrol_speed
    };
    let move_distance = speed * (elapsed_ms / 1000.0) as f32;

    let heading = if enemy.chasing {
        // distance >= damage_distance > 0 here
        (dx / distance, dy / distance)
    } else {
        if now_ms > enemy.next_direction_change_ms {
            enemy.reroll_patrol(now_ms, tuning, rng);
        }
        enemy.direction
    };

    let wanted = if enemy.chasing || heading != (0.0, 0.0) {
        EnemyAnimation::Walk
    } else {
        EnemyAnimation::Idle
    };
    if enemy.animation != wanted {
        enemy.animation = wanted;
        if let Some(visual) = *visual {
            anims.activate(visual, Some(wanted.name()));
        }
    }

    let displacement = (heading.0 * move_distance, heading.1 * move_distance);
    *position = Position {
        x: position.x + displacement.0 as i32,
        y: position.y + displacement.1 as i32,
    };

    EnemyOutcome::Moved { displacement }
}
