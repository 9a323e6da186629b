/// All simulation data types: pure data, no behaviour beyond small geometric
/// helpers.  State machines live in `player`, `enemy` and `compute`.

// ── Identity & geometry ───────────────────────────────────────────────────────

/// Registry identity.  Allocated monotonically, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

/// World position in whole pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance_to(self, other: Position) -> f32 {
        let dx = (other.x - self.x) as f32;
        let dy = (other.y - self.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Axis-aligned proximity: strictly closer than `reach` on both axes.
    pub fn within_reach(self, other: Position, reach: i32) -> bool {
        (self.x - other.x).abs() < reach && (self.y - other.y).abs() < reach
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Playable rectangle in pixels, as seeded by the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WorldBounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Clamp into the rectangle; both edges inclusive.
    pub fn clamp(&self, pos: Position) -> Position {
        let max_x = (self.x + self.width - 1).max(self.x);
        let max_y = (self.y + self.height - 1).max(self.y);
        Position {
            x: pos.x.clamp(self.x, max_x),
            y: pos.y.clamp(self.y, max_y),
        }
    }
}

/// Opaque handle to a sprite/animation resource owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisualRef(pub u32);

// ── Player state ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    #[default]
    None,
    Idle,
    Move,
    Attack,
    GameOver,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    None,
    Down,
    Up,
    Left,
    Right,
}

impl PlayerState {
    pub fn name(self) -> &'static str {
        match self {
            PlayerState::None => "None",
            PlayerState::Idle => "Idle",
            PlayerState::Move => "Move",
            PlayerState::Attack => "Attack",
            PlayerState::GameOver => "GameOver",
        }
    }
}

impl Direction {
    pub fn name(self) -> &'static str {
        match self {
            Direction::None => "None",
            Direction::Down => "Down",
            Direction::Up => "Up",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

// ── Registry entities ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyAnimation {
    Idle,
    Walk,
}

impl EnemyAnimation {
    pub fn name(self) -> &'static str {
        match self {
            EnemyAnimation::Idle => "Idle",
            EnemyAnimation::Walk => "Walk",
        }
    }
}

/// Per-enemy AI state.  Behaviour is implemented in `crate::enemy`.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyState {
    /// Chase speed in pixels per second.
    pub speed: f32,
    /// Cached patrol heading (unit vector).
    pub direction: (f32, f32),
    /// Simulation time at which the patrol heading is re-rolled.
    pub next_direction_change_ms: f64,
    pub chasing: bool,
    /// Set once; the enemy is inert from then on.
    pub should_be_removed: bool,
    pub animation: EnemyAnimation,
}

/// Short-lived object such as an exploding bomb.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemporaryObject {
    pub expires_at_ms: f64,
}

impl TemporaryObject {
    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms >= self.expires_at_ms
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Enemy(EnemyState),
    TemporaryObject(TemporaryObject),
    HealthPickup,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub position: Position,
    pub visual: Option<VisualRef>,
    pub kind: EntityKind,
}

impl Entity {
    pub fn as_enemy(&self) -> Option<&EnemyState> {
        match &self.kind {
            EntityKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyState> {
        match &mut self.kind {
            EntityKind::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn is_health_pickup(&self) -> bool {
        matches!(self.kind, EntityKind::HealthPickup)
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self.kind, EntityKind::TemporaryObject(_))
    }
}

// ── Per-frame input & output ──────────────────────────────────────────────────

/// Input intents sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub attack: bool,
    pub place_bomb: bool,
}

impl FrameInput {
    /// Number of direction keys held.
    pub fn directions_held(&self) -> u32 {
        [self.up, self.down, self.left, self.right]
            .iter()
            .filter(|&&held| held)
            .count() as u32
    }
}

/// Something observable that happened during a frame.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    EnemySpawned { id: EntityId, position: Position },
    PickupSpawned { id: EntityId, position: Position },
    /// The pickup budget fired while at capacity.
    PickupSpawnSkipped,
    BombPlaced { id: EntityId, position: Position },
    PlayerDamaged { source: Position, health: u32 },
    PlayerHealed { health: u32 },
    EntityRemoved { id: EntityId },
    GameOver,
}
