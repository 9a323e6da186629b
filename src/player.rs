/// The player state machine.
///
/// Every change of `(state, direction)` goes through [`Player::transition`],
/// which owns the two rules that matter: `GameOver` is absorbing, and a
/// transition to the current pair is a no-op (no animation restart).

use tracing::info;

use crate::collab::AnimationHost;
use crate::config::SimConfig;
use crate::entities::{Direction, FrameInput, PlayerState, Position, VisualRef, WorldBounds};

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    position: Position,
    health: u32,
    state: PlayerState,
    direction: Direction,
    visual: Option<VisualRef>,
    speed: f64,
    max_health: u32,
    knockback_px: i32,
}

impl Player {
    /// Full health, idle and facing down.
    pub fn spawn(
        position: Position,
        visual: Option<VisualRef>,
        config: &SimConfig,
        anims: &mut dyn AnimationHost,
    ) -> Self {
        let mut player = Player {
            position,
            health: config.max_health,
            state: PlayerState::None,
            direction: Direction::None,
            visual,
            speed: config.player_speed,
            max_health: config.max_health,
            knockback_px: config.knockback_px,
        };
        player.transition(PlayerState::Idle, Direction::Down, anims);
        player
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn visual(&self) -> Option<VisualRef> {
        self.visual
    }

    pub fn is_game_over(&self) -> bool {
        self.state == PlayerState::GameOver
    }

    /// Returns `true` when the pair actually changed.
    pub fn transition(
        &mut self,
        state: PlayerState,
        direction: Direction,
        anims: &mut dyn AnimationHost,
    ) -> bool {
        if self.is_game_over() {
            return false;
        }
        if self.state == state && self.direction == direction {
            return false;
        }

        if let Some(visual) = self.visual {
            match animation_name(state, direction) {
                Some(name) => anims.activate(visual, Some(name.as_str())),
                None => anims.activate(visual, None),
            }
        }

        self.state = state;
        self.direction = direction;
        true
    }

    pub fn update_movement(
        &mut self,
        input: &FrameInput,
        elapsed_ms: f64,
        bounds: &WorldBounds,
        anims: &mut dyn AnimationHost,
    ) {
        if self.is_game_over() {
            return;
        }

        let step = (self.speed * (elapsed_ms / 1000.0)) as i32;
        let axis = |positive: bool, negative: bool| -> i32 {
            (if positive { step } else { 0 }) - (if negative { step } else { 0 })
        };

        let target = Position {
            x: self.position.x + axis(input.right, input.left),
            y: self.position.y + axis(input.down, input.up),
        };
        let next = bounds.clamp(target);

        if next == self.position {
            self.transition(PlayerState::Idle, self.direction, anims);
        } else {
            // Horizontal is evaluated last so it wins on diagonals.
            let mut direction = self.direction;
            if next.y < self.position.y {
                direction = Direction::Up;
            }
            if next.y > self.position.y {
                direction = Direction::Down;
            }
            if next.x < self.position.x {
                direction = Direction::Left;
            }
            if next.x > self.position.x {
                direction = Direction::Right;
            }
            self.transition(PlayerState::Move, direction, anims);
        }

        self.position = next;
    }

    pub fn attack(&mut self, anims: &mut dyn AnimationHost) {
        if self.is_game_over() {
            return;
        }
        self.transition(PlayerState::Attack, self.direction, anims);
    }

    /// Returns `true` if health was actually lost.
    pub fn lose_health(&mut self, anims: &mut dyn AnimationHost) -> bool {
        if self.is_game_over() {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.game_over(anims);
        }
        true
    }

    /// Saturates at the health ceiling.  Callers still gate on
    /// `health() < max_health()` so a full-health pickup is left in place.
    pub fn heal(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    /// Pushes the player a fixed distance away from `source`, per axis.
    pub fn knockback_from(&mut self, source: Position) {
        let dx = (self.position.x - source.x).signum();
        let dy = (self.position.y - source.y).signum();
        self.position = Position {
            x: self.position.x + dx * self.knockback_px,
            y: self.position.y + dy * self.knockback_px,
        };
    }

    /// One damage event: lose a heart and get knocked back.  Ignored once the
    /// game is over.  Returns `true` if the hit landed.
    pub fn take_hit(&mut self, source: Position, anims: &mut dyn AnimationHost) -> bool {
        if !self.lose_health(anims) {
            return false;
        }
        self.knockback_from(source);
        true
    }

    pub fn game_over(&mut self, anims: &mut dyn AnimationHost) {
        if self.transition(PlayerState::GameOver, Direction::None, anims) {
            info!(x = self.position.x, y = self.position.y, "player died");
        }
    }
}

/// `<State><Direction>`, `GameOver`, or no animation for `(None, None)`.
pub fn animation_name(state: PlayerState, direction: Direction) -> Option<String> {
    match (state, direction) {
        (PlayerState::None, Direction::None) => None,
        (PlayerState::GameOver, _) => Some(PlayerState::GameOver.name().to_string()),
        _ => Some(format!("{}{}", state.name(), direction.name())),
    }
}
