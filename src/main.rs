mod display;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adventure_core::collab::FnScript;
use adventure_core::compute::{Simulation, World};
use adventure_core::config::{ConfigError, LevelDimensions, SimConfig};
use adventure_core::entities::{FrameEvent, FrameInput, WorldBounds};

use display::{Camera, TerminalAnimations};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

const LOG_FILE: &str = "adventure.log";

/// 40×30 tiles of 32 px when no level file is given.
const DEFAULT_BOUNDS: WorldBounds = WorldBounds::new(0, 0, 40 * 32, 30 * 32);

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events.
const HOLD_WINDOW: u64 = 4;

/// Sim-time between turret bombs dropped by the built-in script.
const TURRET_PERIOD_MS: f64 = 12_000.0;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Returns true if any of `keys` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|key| {
        key_frame
            .get(key)
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    })
}

fn sample_input(key_frame: &HashMap<KeyCode, u64>, frame: u64, bomb_pressed: bool) -> FrameInput {
    FrameInput {
        up: is_held(key_frame, &[KeyCode::Up, KeyCode::Char('w')], frame),
        down: is_held(key_frame, &[KeyCode::Down, KeyCode::Char('s')], frame),
        left: is_held(key_frame, &[KeyCode::Left, KeyCode::Char('a')], frame),
        right: is_held(key_frame, &[KeyCode::Right, KeyCode::Char('d')], frame),
        attack: is_held(key_frame, &[KeyCode::Char('j'), KeyCode::Char(' ')], frame),
        place_bomb: bomb_pressed,
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn read_text(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|source| AppError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

fn load_bounds(level: Option<&Path>) -> Result<WorldBounds, AppError> {
    match level {
        Some(path) => Ok(LevelDimensions::from_json_str(&read_text(path)?)?.world_bounds()?),
        None => Ok(DEFAULT_BOUNDS),
    }
}

fn load_config(path: Option<&Path>) -> Result<SimConfig, AppError> {
    match path {
        Some(path) => match SimConfig::from_json_str(&read_text(path)?) {
            Ok(config) => Ok(config),
            Err(err @ ConfigError::InvalidValue { .. }) => {
                warn!(%err, "rejected configuration");
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        },
        None => Ok(SimConfig::default()),
    }
}

fn init_logging() -> Result<(), AppError> {
    // The terminal is in raw mode, so logs go to a file instead.
    let file = File::create(LOG_FILE)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact()
        .init();
    Ok(())
}

/// Drops a bomb on the enemy closest to the player every `TURRET_PERIOD_MS`.
fn turret_script() -> FnScript<impl FnMut(&mut World)> {
    let mut next_shot_ms = TURRET_PERIOD_MS;
    FnScript::new("turret", move |world: &mut World| {
        if world.now_ms < next_shot_ms {
            return;
        }
        next_shot_ms += TURRET_PERIOD_MS;
        let player = world.player.position();
        let target = world
            .registry
            .iter()
            .filter(|e| e.as_enemy().is_some())
            .min_by_key(|e| {
                let dx = (e.position.x - player.x) as i64;
                let dy = (e.position.y - player.y) as i64;
                dx * dx + dy * dy
            })
            .map(|e| e.position);
        if let Some(position) = target {
            world.add_bomb(position);
        }
    })
}

fn new_session(
    config: &SimConfig,
    bounds: WorldBounds,
) -> Result<(Simulation, TerminalAnimations), AppError> {
    let anims = TerminalAnimations::new();
    let mut sim = Simulation::new(config.clone(), bounds, Box::new(anims.clone()))?;
    sim.scripts_mut().register(turret_script());
    Ok((sim, anims))
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → restart.
///
/// Keys are tracked as "last seen on frame N" so several can be held at once;
/// each frame every fresh key contributes to the sampled `FrameInput`.
fn game_loop<W: Write>(
    out: &mut W,
    sim: &mut Simulation,
    anims: &TerminalAnimations,
    rx: &mpsc::Receiver<Event>,
) -> Result<bool, AppError> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last_update = Instant::now();
    let (mut width, mut height) = terminal::size()?;
    let mut camera = Camera::look_at(sim.player().position(), width, height);

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut bomb_pressed = false;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(true);
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(true);
                            }
                            KeyCode::Char('r') | KeyCode::Char('R') if sim.is_game_over() => {
                                return Ok(false);
                            }
                            KeyCode::Char('b') | KeyCode::Char('B') => bomb_pressed = true,
                            _ => {}
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column,
                    row,
                    ..
                }) => {
                    let position = camera.to_world(column, row);
                    if let Some(id) = sim.place_bomb_at(position) {
                        info!(id = id.0, x = position.x, y = position.y, "bomb placed by click");
                    }
                }
                Event::Resize(w, h) => {
                    width = w;
                    height = h;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let elapsed_ms = now.duration_since(last_update).as_secs_f64() * 1000.0;
        last_update = now;

        let input = sample_input(&key_frame, frame, bomb_pressed);
        let events = sim.tick(elapsed_ms, &input);
        if events
            .iter()
            .any(|ev| matches!(ev, FrameEvent::EntityRemoved { .. }))
        {
            let live: HashSet<_> = sim
                .registry()
                .iter()
                .filter_map(|e| e.visual)
                .chain(sim.player().visual())
                .collect();
            anims.retain(|visual| live.contains(&visual));
        }

        camera = display::render(out, sim, anims, width, height)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<(), AppError> {
    init_logging()?;

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let level_path = args.next();
    let config_path = args.next();
    let bounds = load_bounds(level_path.as_deref())?;
    let config = load_config(config_path.as_deref())?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Ghostty / kitty-protocol terminals report releases; others fall back.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking event reads live on their own thread so the game loop never
    // waits on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &config, bounds);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &SimConfig,
    bounds: WorldBounds,
) -> Result<(), AppError> {
    loop {
        let (mut sim, anims) = new_session(config, bounds)?;
        let quit = game_loop(out, &mut sim, &anims, rx)?;
        info!(frames = sim.frame(), health = sim.player().health(), "session ended");
        if quit {
            break;
        }
    }
    Ok(())
}
