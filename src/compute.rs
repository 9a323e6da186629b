/// Frame orchestration.
///
/// `World` is the mutable simulation state (and what scripts get to touch);
/// `Simulation` adds the spawner and script host and runs the fixed per-frame
/// sequence in `tick`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::collab::{AnimationHost, ScriptEngine, BOMB_SHEET, ENEMY_SHEET, HEART_SHEET, PLAYER_SHEET};
use crate::config::{ConfigError, SimConfig};
use crate::enemy::{update_enemy, EnemyOutcome, EnemyTuning};
use crate::entities::{
    EnemyAnimation, EnemyState, EntityId, EntityKind, FrameEvent, FrameInput, Position,
    TemporaryObject, WorldBounds,
};
use crate::interactions::resolve_interactions;
use crate::player::Player;
use crate::registry::Registry;
use crate::spawner::Spawner;

// ── World ─────────────────────────────────────────────────────────────────────

pub struct World {
    pub config: SimConfig,
    pub bounds: WorldBounds,
    pub registry: Registry,
    pub player: Player,
    pub rng: StdRng,
    pub anims: Box<dyn AnimationHost>,
    /// Simulation clock: sum of all elapsed frame time so far.
    pub now_ms: f64,
    enemy_tuning: EnemyTuning,
}

impl World {
    /// Fails if `config` does not validate; enemy and spawn sampling rely on
    /// its ranges being well formed.
    pub fn new(
        config: SimConfig,
        bounds: WorldBounds,
        mut anims: Box<dyn AnimationHost>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let visual = anims.load_visual(PLAYER_SHEET);
        let player = Player::spawn(config.player_start(), visual, &config, anims.as_mut());
        let enemy_tuning = EnemyTuning::from(&config);

        Ok(World {
            config,
            bounds,
            registry: Registry::new(),
            player,
            rng,
            anims,
            now_ms: 0.0,
            enemy_tuning,
        })
    }

    pub fn enemy_tuning(&self) -> &EnemyTuning {
        &self.enemy_tuning
    }

    pub fn spawn_enemy(&mut self, position: Position) -> EntityId {
        let state = EnemyState::new(self.now_ms, &self.enemy_tuning, &mut self.rng);
        let visual = self.anims.load_visual(ENEMY_SHEET);
        if let Some(visual) = visual {
            self.anims.activate(visual, Some(EnemyAnimation::Idle.name()));
        }
        self.registry
            .create(position, visual, EntityKind::Enemy(state))
    }

    pub fn spawn_health_pickup(&mut self, position: Position) -> EntityId {
        let visual = self.anims.load_visual(HEART_SHEET);
        self.registry.create(position, visual, EntityKind::HealthPickup)
    }

    /// Drop a bomb that explodes once its fuse runs out.
    pub fn add_bomb(&mut self, position: Position) -> EntityId {
        let visual = self.anims.load_visual(BOMB_SHEET);
        if let Some(visual) = visual {
            self.anims.activate(visual, Some("Explode"));
        }
        let temp = TemporaryObject {
            expires_at_ms: self.now_ms + self.config.bomb_fuse_ms,
        };
        let id = self
            .registry
            .create(position, visual, EntityKind::TemporaryObject(temp));
        debug!(id = id.0, x = position.x, y = position.y, "bomb placed");
        id
    }

    /// Step every live enemy against the player's current position.
    fn update_enemies(&mut self, elapsed_ms: f64) -> Vec<FrameEvent> {
        let World {
            registry,
            player,
            rng,
            anims,
            now_ms,
            enemy_tuning,
            ..
        } = self;

        let mut events = Vec::new();
        for entity in registry.iter_mut() {
            let outcome = update_enemy(
                entity,
                player,
                *now_ms,
                elapsed_ms,
                enemy_tuning,
                &mut *rng,
                anims.as_mut(),
            );
            if let EnemyOutcome::Damaged { landed: true } = outcome {
                events.push(FrameEvent::PlayerDamaged {
                    source: entity.position,
                    health: player.health(),
                });
            }
        }
        events
    }

    fn sweep_defeated_enemies(&mut self) -> Vec<FrameEvent> {
        let marked: Vec<EntityId> = self
            .registry
            .iter()
            .filter(|e| e.as_enemy().is_some_and(|enemy| enemy.should_be_removed))
            .map(|e| e.id)
            .collect();
        self.registry
            .remove_all(&marked)
            .into_iter()
            .map(|id| FrameEvent::EntityRemoved { id })
            .collect()
    }
}

// ── Simulation ────────────────────────────────────────────────────────────────

pub struct Simulation {
    world: World,
    spawner: Spawner,
    scripts: ScriptEngine,
    frame: u64,
}

impl Simulation {
    pub fn new(
        config: SimConfig,
        bounds: WorldBounds,
        anims: Box<dyn AnimationHost>,
    ) -> Result<Self, ConfigError> {
        let spawner = Spawner::new(&config);
        let world = World::new(config, bounds, anims)?;
        info!(
            width = bounds.width,
            height = bounds.height,
            "simulation ready"
        );
        Ok(Simulation {
            world,
            spawner,
            scripts: ScriptEngine::new(),
            frame: 0,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn player(&self) -> &Player {
        &self.world.player
    }

    pub fn registry(&self) -> &Registry {
        &self.world.registry
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn scripts_mut(&mut self) -> &mut ScriptEngine {
        &mut self.scripts
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_game_over(&self) -> bool {
        self.world.player.is_game_over()
    }

    /// Ad hoc bomb placement (e.g. a mouse click already translated to world
    /// coordinates).  Refused once the game is over.
    pub fn place_bomb_at(&mut self, position: Position) -> Option<EntityId> {
        if self.is_game_over() {
            return None;
        }
        Some(self.world.add_bomb(position))
    }

    /// Advance one frame.  A game-over simulation is frozen and returns no
    /// events.
    pub fn tick(&mut self, elapsed_ms: f64, input: &FrameInput) -> Vec<FrameEvent> {
        if self.is_game_over() {
            return Vec::new();
        }

        self.frame += 1;
        self.world.now_ms += elapsed_ms;
        let mut events = Vec::new();

        // 1. Player
        {
            let World {
                player,
                bounds,
                anims,
                ..
            } = &mut self.world;
            player.update_movement(input, elapsed_ms, bounds, anims.as_mut());
            if input.attack && input.directions_held() <= 1 {
                player.attack(anims.as_mut());
            }
        }

        // 2. Population
        events.extend(self.spawner.run(elapsed_ms, &mut self.world));

        // 3. Enemy AI, against where the player ended up this frame
        events.extend(self.world.update_enemies(elapsed_ms));

        // 4. Enemies that made contact
        events.extend(self.world.sweep_defeated_enemies());

        // 5. Scripts
        self.scripts.execute_all(&mut self.world);

        // 6. Bomb key
        if input.place_bomb && !self.is_game_over() {
            let position = self.world.player.position();
            let id = self.world.add_bomb(position);
            events.push(FrameEvent::BombPlaced { id, position });
        }

        // 7. Pickups and explosions
        if !self.is_game_over() {
            events.extend(resolve_interactions(&mut self.world));
        }

        if self.is_game_over() {
            info!(frame = self.frame, "game over");
            events.push(FrameEvent::GameOver);
        }

        events
    }
}
