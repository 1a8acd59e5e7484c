/// Terminal rendering of the stage.  All terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// stage.  No game logic is performed; this module only translates entity
/// rectangles into terminal cells around a camera that follows the player.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::Vec2;
use platformer::config::GameConfig;
use platformer::entities::{Entity, MoveSpeed, SpriteKey, MAX_HEALTH};
use platformer::level::{LevelSource, Stage};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_LEVEL: Color = Color::Cyan;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_SPEED: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;
const C_MESSAGE: Color = Color::Yellow;

fn glyph(entity: &Entity) -> (char, Color) {
    match entity.visual().key {
        SpriteKey::Platform => ('█', Color::DarkGreen),
        SpriteKey::JumpPad => ('^', Color::Yellow),
        SpriteKey::HealthPickup => ('♥', Color::Magenta),
        SpriteKey::SpeedPickup => ('»', Color::Cyan),
        SpriteKey::EndGoal => ('#', Color::White),
        SpriteKey::PlayerFullHealth => ('@', Color::White),
        SpriteKey::PlayerMidHealth => ('@', Color::Yellow),
        SpriteKey::PlayerLowHealth => ('@', Color::Red),
        SpriteKey::GroundEnemy => ('M', Color::Red),
        SpriteKey::InvincibleGroundEnemy => ('M', Color::DarkMagenta),
        SpriteKey::FlyingEnemy => ('W', Color::Red),
        SpriteKey::InvincibleFlyingEnemy => ('W', Color::DarkMagenta),
    }
}

/// Maps world coordinates to terminal cells.
struct Camera {
    origin: Vec2,
    cell: Vec2,
    cols: u16,
    rows: u16,
}

impl Camera {
    /// Centre the play area (rows 1..rows-1) on `focus`.
    fn centred_on(focus: Vec2, config: &GameConfig, cols: u16, rows: u16) -> Self {
        let cell = Vec2::new(config.cell_width, config.cell_height);
        let view = Vec2::new(f32::from(cols), f32::from(rows.saturating_sub(2))) * cell;
        Self {
            origin: focus - view / 2.0,
            cell,
            cols,
            rows,
        }
    }

    /// Cell span covered by a world rectangle, clipped to the play area.
    fn span(&self, position: Vec2, size: Vec2) -> Option<(u16, u16, u16, u16)> {
        let min = (position - self.origin) / self.cell;
        let max = (position + size - self.origin) / self.cell;

        let col0 = min.x.floor().max(0.0);
        let col1 = max.x.ceil().min(f32::from(self.cols));
        let row0 = min.y.floor().max(0.0) + 1.0;
        let row1 = (max.y.ceil() + 1.0).min(f32::from(self.rows.saturating_sub(1)));

        if col0 >= col1 || row0 >= row1 {
            return None;
        }
        Some((col0 as u16, col1 as u16, row0 as u16, row1 as u16))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write, S: LevelSource>(
    out: &mut W,
    stage: &Stage<S>,
    config: &GameConfig,
    message: Option<&str>,
) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let player = stage.player();
    let focus = player.position() + player.size() / 2.0;
    let camera = Camera::centred_on(focus, config, cols, rows);

    // Player last so it is never hidden behind scenery.
    for entity in stage.entities().iter().filter(|e| e.as_player().is_none()) {
        draw_entity(out, entity, &camera)?;
    }
    draw_entity(out, player, &camera)?;

    draw_hud(out, stage)?;
    draw_controls_hint(out, rows)?;
    if let Some(text) = message {
        draw_message(out, text, cols, rows)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

fn draw_entity<W: Write>(out: &mut W, entity: &Entity, camera: &Camera) -> std::io::Result<()> {
    let Some((col0, col1, row0, row1)) = camera.span(entity.position(), entity.size()) else {
        return Ok(());
    };
    let (ch, color) = glyph(entity);
    let line: String = std::iter::repeat(ch).take(usize::from(col1 - col0)).collect();

    out.queue(style::SetForegroundColor(color))?;
    for row in row0..row1 {
        out.queue(cursor::MoveTo(col0, row))?;
        out.queue(Print(&line))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write, S: LevelSource>(out: &mut W, stage: &Stage<S>) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LEVEL))?;
    out.queue(Print(format!("Level {}/{}  ", stage.level(), stage.level_count())))?;

    let Some(state) = stage.player_state() else {
        return Ok(());
    };

    let health = state.health();
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(format!(
        "{}{}  ",
        "♥".repeat(health as usize),
        "·".repeat(MAX_HEALTH.saturating_sub(health) as usize)
    )))?;

    out.queue(style::SetForegroundColor(C_HUD_SPEED))?;
    let speed = match state.move_speed() {
        MoveSpeed::Slowed => "slowed".to_string(),
        MoveSpeed::Normal => "normal".to_string(),
        MoveSpeed::Boosted => format!("BOOST {:>3}", state.powerup_duration()),
    };
    out.queue(Print(speed))?;

    let enemies = stage
        .entities()
        .iter()
        .filter(|e| e.category().is_enemy() && !e.is_defeated())
        .count();
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(format!("  enemies:{}", enemies)))?;
    Ok(())
}

fn draw_controls_hint<W: Write>(out: &mut W, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   ↑ / W / SPACE : Jump   Q : Quit"))?;
    Ok(())
}

fn draw_message<W: Write>(out: &mut W, text: &str, cols: u16, rows: u16) -> std::io::Result<()> {
    let x = (cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(x, rows / 2))?;
    out.queue(style::SetForegroundColor(C_MESSAGE))?;
    out.queue(Print(text))?;
    Ok(())
}
