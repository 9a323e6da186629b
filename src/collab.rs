/// Narrow interfaces to the collaborators the simulation core drives but does
/// not implement: the renderer's animation registry and the scripting host.

use crate::compute::World;
use crate::entities::VisualRef;

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Sprite sheets the core asks the renderer for.
pub const PLAYER_SHEET: &str = "Player";
pub const ENEMY_SHEET: &str = "Enemy";
pub const BOMB_SHEET: &str = "BombExploding";
pub const HEART_SHEET: &str = "HeartFull";

/// Animation side of the rendering collaborator.  The core only selects
/// animations by name; it never sees frames or pixels.
pub trait AnimationHost {
    /// Load (or share) a sprite sheet.  `None` means "nothing to draw".
    fn load_visual(&mut self, sheet: &str) -> Option<VisualRef>;

    /// Switch the visual to `animation`, or to no animation.
    fn activate(&mut self, visual: VisualRef, animation: Option<&str>);

    fn is_current_animation_finished(&self, visual: VisualRef) -> bool;
}

/// Headless host: hands out no visuals, so no activation is ever requested.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAnimations;

impl AnimationHost for NullAnimations {
    fn load_visual(&mut self, _sheet: &str) -> Option<VisualRef> {
        None
    }

    fn activate(&mut self, _visual: VisualRef, _animation: Option<&str>) {}

    fn is_current_animation_finished(&self, _visual: VisualRef) -> bool {
        true
    }
}

// ── Scripting ─────────────────────────────────────────────────────────────────

/// A per-frame script.  Runs with full mutable access to the world and may
/// create entities through it (bombs, for instance).
pub trait Script {
    fn name(&self) -> &str;
    fn execute(&mut self, world: &mut World);
}

/// Adapter so plain closures can be registered as scripts.
pub struct FnScript<F> {
    name: String,
    body: F,
}

impl<F: FnMut(&mut World)> FnScript<F> {
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F: FnMut(&mut World)> Script for FnScript<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, world: &mut World) {
        (self.body)(world)
    }
}

#[derive(Default)]
pub struct ScriptEngine {
    scripts: Vec<Box<dyn Script>>,
}

impl ScriptEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, script: impl Script + 'static) {
        tracing::debug!(script = script.name(), "script registered");
        self.scripts.push(Box::new(script));
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Run every script once, in registration order.
    pub fn execute_all(&mut self, world: &mut World) {
        for script in &mut self.scripts {
            script.execute(world);
        }
    }
}
