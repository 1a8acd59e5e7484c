mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use log::{error, info};

use platformer::config::{GameConfig, DEFAULT_CONFIG_PATH};
use platformer::entities::Intent;
use platformer::level::{BuiltinLevels, Stage, StageEvent};

/// Frames a status message stays on screen.
const MESSAGE_FRAMES: u32 = 90;

/// Frames a key stays down after its last press or repeat event.  Terminals
/// without release events rely on OS key repeat refreshing it in time.
const HOLD_WINDOW: u64 = 8;

/// Terminal platformer.
#[derive(Parser)]
#[command(version, about = "A side-scrolling platformer in your terminal")]
struct Cli {
    /// Path to the INI configuration file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Level to start on (overrides the config file).
    #[arg(long)]
    level: Option<u32>,

    /// Frame-rate cap (overrides the config file).
    #[arg(long)]
    fps: Option<u32>,
}

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

fn read_intent(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> Intent {
    Intent {
        left: any_held(key_frame, &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], frame),
        right: any_held(key_frame, &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], frame),
        up: any_held(
            key_frame,
            &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W'), KeyCode::Char(' ')],
            frame,
        ),
        down: any_held(key_frame, &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')], frame),
    }
}

fn describe(event: &StageEvent) -> Option<String> {
    match event {
        StageEvent::Damaged { health } if *health > 0 => Some(format!("Ouch! {} left", health)),
        StageEvent::GameOver => Some("GAME OVER! Level restarted".to_string()),
        StageEvent::LevelChanged(level) => Some(format!("Level {}", level)),
        StageEvent::SpeedBoosted { .. } => Some("Speed boost!".to_string()),
        StageEvent::Completed => Some("You made it! Press Q to quit".to_string()),
        _ => None,
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Input model: a `key_frame` map records the frame number of the last
/// press/repeat event for every key.  Each frame the keys still "fresh"
/// (within `HOLD_WINDOW` frames) form the frame's `Intent`, so left/right
/// and jump can be held at the same time.
fn game_loop<W: Write>(
    out: &mut W,
    stage: &mut Stage<BuiltinLevels>,
    config: &GameConfig,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let frame_budget = config.frame_duration();
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut message: Option<(String, u32)> = None;
    let mut completed = false;
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // Pending input, without blocking.
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let delta = last.elapsed().as_secs_f32().min(config.max_frame_delta);
        last = Instant::now();

        if !completed {
            let intent = read_intent(&key_frame, frame);
            for event in stage.step(delta, intent) {
                completed |= event == StageEvent::Completed;
                if let Some(text) = describe(&event) {
                    message = Some((text, MESSAGE_FRAMES));
                }
            }
        }

        let shown = message.as_ref().map(|(text, _)| text.as_str());
        display::render(out, stage, config, shown)?;

        message = message.and_then(|(text, frames)| {
            if completed {
                Some((text, frames))
            } else {
                frames.checked_sub(1).filter(|&f| f > 0).map(|f| (text, f))
            }
        });

        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            thread::sleep(frame_budget - elapsed);
        }
    }
}

// ── Terminal ──────────────────────────────────────────────────────────────────

/// Raw mode, alternate screen, hidden cursor.  Returns whether the terminal
/// accepted the request for release and repeat events.
fn enter_play_screen<W: Write>(out: &mut W) -> std::io::Result<bool> {
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    let enhanced = out
        .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
        .is_ok();
    Ok(enhanced)
}

/// Undo `enter_play_screen`.  Errors are ignored.
fn leave_play_screen<W: Write>(out: &mut W, keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(cli.config);
    if let Err(err) = config.load() {
        error!("{}; using defaults", err);
        config = GameConfig::new();
    }
    if let Some(level) = cli.level {
        config.start_level = level;
    }
    if let Some(fps) = cli.fps {
        config.target_fps = fps;
    }
    if let Err(err) = config.validate() {
        eprintln!("{}", err);
        std::process::exit(2);
    }

    let mut stage = match Stage::new(BuiltinLevels, config.start_level) {
        Ok(stage) => stage,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(2);
        }
    };
    info!("Starting at level {}", stage.level());

    let mut out = BufWriter::new(stdout());
    let keyboard_enhanced = enter_play_screen(&mut out)?;

    // Blocking event reads live on their own thread.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = game_loop(&mut out, &mut stage, &config, &rx);
    leave_play_screen(&mut out, keyboard_enhanced);
    result
}
