/// Rendering layer: all terminal I/O lives here.
///
/// The simulation works in world pixels; this module owns the camera that
/// maps them onto terminal cells, and a small animation host that plays the
/// renderer's half of the animation contract.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use adventure_core::collab::{AnimationHost, BOMB_SHEET};
use adventure_core::compute::Simulation;
use adventure_core::entities::{Direction, Entity, EntityKind, Position, VisualRef};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_OUT_OF_BOUNDS: Color = Color::DarkGrey;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_INFO: Color = Color::Yellow;
const C_PLAYER: Color = Color::White;
const C_PLAYER_ATTACK: Color = Color::Cyan;
const C_ENEMY_PATROL: Color = Color::Green;
const C_ENEMY_CHASE: Color = Color::Red;
const C_PICKUP: Color = Color::Magenta;
const C_BOMB: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// World pixels per terminal cell.  Cells are roughly twice as tall as wide.
pub const CELL_W: i32 = 8;
pub const CELL_H: i32 = 16;

/// Rows reserved for the HUD (top) and the controls hint (bottom).
const HUD_ROWS: u16 = 1;
const HINT_ROWS: u16 = 1;

// ── Camera ────────────────────────────────────────────────────────────────────

/// Player-centred view onto the world.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// World position shown in the top-left cell of the play area.
    origin: Position,
    cols: u16,
    rows: u16,
}

impl Camera {
    pub fn look_at(target: Position, width: u16, height: u16) -> Self {
        let rows = height.saturating_sub(HUD_ROWS + HINT_ROWS);
        let origin = Position {
            x: target.x - (width as i32 / 2) * CELL_W,
            y: target.y - (rows as i32 / 2) * CELL_H,
        };
        Camera {
            origin,
            cols: width,
            rows,
        }
    }

    pub fn to_screen(&self, pos: Position) -> Option<(u16, u16)> {
        let col = (pos.x - self.origin.x).div_euclid(CELL_W);
        let row = (pos.y - self.origin.y).div_euclid(CELL_H);
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return None;
        }
        Some((col as u16, row as u16 + HUD_ROWS))
    }

    /// Screen cell to world pixel (cell centre).
    pub fn to_world(&self, col: u16, row: u16) -> Position {
        let row = row.saturating_sub(HUD_ROWS) as i32;
        Position {
            x: self.origin.x + col as i32 * CELL_W + CELL_W / 2,
            y: self.origin.y + row * CELL_H + CELL_H / 2,
        }
    }
}

// ── Animation host ────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Clip {
    sheet: String,
    animation: Option<String>,
    started: Instant,
}

#[derive(Debug, Default)]
struct ClipTable {
    next: u32,
    clips: HashMap<VisualRef, Clip>,
}

/// Shared handle: one clone goes into the simulation, one stays with the
/// renderer so it can read what is playing.
#[derive(Clone, Debug, Default)]
pub struct TerminalAnimations {
    table: Rc<RefCell<ClipTable>>,
}

impl TerminalAnimations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self, visual: VisualRef) -> Option<String> {
        self.table
            .borrow()
            .clips
            .get(&visual)
            .and_then(|clip| clip.animation.clone())
    }

    /// Forget visuals whose entities are gone.
    pub fn retain(&self, live: impl Fn(VisualRef) -> bool) {
        self.table.borrow_mut().clips.retain(|visual, _| live(*visual));
    }
}

fn clip_length(sheet: &str, animation: &str) -> Option<Duration> {
    if animation.starts_with("Attack") {
        return Some(Duration::from_millis(300));
    }
    if sheet == BOMB_SHEET && animation == "Explode" {
        return Some(Duration::from_millis(2100));
    }
    None
}

impl AnimationHost for TerminalAnimations {
    fn load_visual(&mut self, sheet: &str) -> Option<VisualRef> {
        let mut table = self.table.borrow_mut();
        let visual = VisualRef(table.next);
        table.next = table.next.wrapping_add(1);
        table.clips.insert(
            visual,
            Clip {
                sheet: sheet.to_string(),
                animation: None,
                started: Instant::now(),
            },
        );
        Some(visual)
    }

    fn activate(&mut self, visual: VisualRef, animation: Option<&str>) {
        if let Some(clip) = self.table.borrow_mut().clips.get_mut(&visual) {
            clip.animation = animation.map(str::to_string);
            clip.started = Instant::now();
        }
    }

    fn is_current_animation_finished(&self, visual: VisualRef) -> bool {
        let table = self.table.borrow();
        let Some(clip) = table.clips.get(&visual) else {
            return true;
        };
        match clip.animation.as_deref() {
            None => true,
            Some(name) => match clip_length(&clip.sheet, name) {
                Some(length) => clip.started.elapsed() >= length,
                // Looping clips never finish.
                None => false,
            },
        }
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    sim: &Simulation,
    anims: &TerminalAnimations,
    width: u16,
    height: u16,
) -> std::io::Result<Camera> {
    let camera = Camera::look_at(sim.player().position(), width, height);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_out_of_bounds(out, sim, &camera)?;
    for entity in sim.registry().iter() {
        draw_entity(out, entity, &camera)?;
    }
    draw_player(out, sim, anims, &camera)?;
    draw_hud(out, sim, width)?;
    draw_controls_hint(out, height)?;

    if sim.is_game_over() {
        draw_game_over(out, width, height)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(camera)
}

// ── Terrain ───────────────────────────────────────────────────────────────────

fn draw_out_of_bounds<W: Write>(
    out: &mut W,
    sim: &Simulation,
    camera: &Camera,
) -> std::io::Result<()> {
    let bounds = sim.world().bounds;
    out.queue(style::SetForegroundColor(C_OUT_OF_BOUNDS))?;
    for row in HUD_ROWS..HUD_ROWS + camera.rows {
        for col in 0..camera.cols {
            let pos = camera.to_world(col, row);
            if bounds.clamp(pos) != pos {
                out.queue(cursor::MoveTo(col, row))?;
                out.queue(Print("░"))?;
            }
        }
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_entity<W: Write>(out: &mut W, entity: &Entity, camera: &Camera) -> std::io::Result<()> {
    let Some((col, row)) = camera.to_screen(entity.position) else {
        return Ok(());
    };
    let (glyph, color) = match &entity.kind {
        EntityKind::Enemy(enemy) if enemy.chasing => ("Ж", C_ENEMY_CHASE),
        EntityKind::Enemy(_) => ("ж", C_ENEMY_PATROL),
        EntityKind::HealthPickup => ("♥", C_PICKUP),
        EntityKind::TemporaryObject(_) => ("●", C_BOMB),
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_player<W: Write>(
    out: &mut W,
    sim: &Simulation,
    anims: &TerminalAnimations,
    camera: &Camera,
) -> std::io::Result<()> {
    let player = sim.player();
    let Some((col, row)) = camera.to_screen(player.position()) else {
        return Ok(());
    };

    let attacking = player
        .visual()
        .filter(|visual| {
            anims
                .current(*visual)
                .is_some_and(|name| name.starts_with("Attack"))
        })
        .is_some_and(|visual| !anims.is_current_animation_finished(visual));

    let glyph = if player.is_game_over() {
        "✝"
    } else if attacking {
        "✦"
    } else {
        match player.direction() {
            Direction::Up => "▲",
            Direction::Down | Direction::None => "▼",
            Direction::Left => "◀",
            Direction::Right => "▶",
        }
    };

    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(if attacking {
        C_PLAYER_ATTACK
    } else {
        C_PLAYER
    }))?;
    out.queue(Print(glyph))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, sim: &Simulation, width: u16) -> std::io::Result<()> {
    let player = sim.player();
    let full = player.health() as usize;
    let empty = player.max_health().saturating_sub(player.health()) as usize;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(format!("{}{}", "♥".repeat(full), "♡".repeat(empty))))?;

    let enemies = sim.registry().count(|e| e.as_enemy().is_some());
    let pickups = sim.registry().count(|e| e.is_health_pickup());
    let info = format!(
        "Enemies: {}   Pickups: {}   t={:.1}s",
        enemies,
        pickups,
        sim.world().now_ms / 1000.0
    );
    let x = width.saturating_sub(info.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(x, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_INFO))?;
    out.queue(Print(info))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "WASD/arrows : Move   J : Attack   B / click : Bomb   Q : Quit",
    ))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Red),
        ("║     YOU DIED     ║", Color::Red),
        ("╚══════════════════╝", Color::Red),
        ("R - Play Again  Q - Quit", Color::White),
    ];

    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }

    Ok(())
}
