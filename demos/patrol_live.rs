/* Vault Patrol - drive the thief with the keyboard and hear the alarm react.
WASD=walk Q/E=look SPACE=jump ESC=quit
*/

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

use bevy_math::Vec2;
use signaling::sink::CpalSink;
use signaling::utils::{init_logger, FramePacer};
use signaling::{vault_scene, FrameReport, SignalConfig, ThiefConfig, ThiefInput};

const FPS: f32 = 60.0;
// terminals only report presses, so a press walks for a short while
const WALK_HOLD: Duration = Duration::from_millis(180);
const LOOK_STEP: f32 = 5.0;

fn make_bar(normalized: f32, width: usize) -> String {
    let filled = (normalized * width as f32).round() as usize;
    let filled = filled.min(width);
    let empty = width - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

fn render_display(report: &FrameReport, yaw: f32, occupied: bool) -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "\x1b[2J\x1b[H")?;
    write!(out, "=== Vault Patrol ===\r\n")?;
    write!(out, "WASD=walk Q/E=look SPACE=jump ESC=quit\r\n\r\n")?;
    write!(
        out,
        "position  x={:6.2} y={:5.2} z={:6.2}  yaw={:5.1}\r\n",
        report.position.x, report.position.y, report.position.z, yaw
    )?;
    write!(out, "zone      {}\r\n", if occupied { "INTRUDER" } else { "clear" })?;
    write!(
        out,
        "alarm     [{}] {:.2} {} {:?}\r\n",
        make_bar(report.volume, 20),
        report.volume,
        if report.playing { "playing" } else { "stopped" },
        report.phase
    )?;
    out.flush()
}

fn main() -> anyhow::Result<()> {
    init_logger();

    let mut sink = CpalSink::open()?;
    // slower, lower wail than the stock siren so it reads as a vault alarm
    sink.set_sweep(450.0, 900.0, 0.5);
    log::info!("siren running at {} Hz", sink.sample_rate());
    let (mut patrol, _) = vault_scene(SignalConfig::default(), ThiefConfig::default(), Some(sink));

    let mut pacer = FramePacer::from_fps(FPS)?;
    let dt = pacer.frame().as_secs_f32();
    let mut walk = Vec2::ZERO;
    let mut walk_until = Instant::now();

    execute!(io::stdout(), Clear(ClearType::All), cursor::Hide)?;
    enable_raw_mode()?;

    let result = loop {
        let frame_start = Instant::now();
        let mut input = ThiefInput::default();
        let mut quit = false;

        while event::poll(Duration::ZERO)? {
            if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                let step = match code {
                    KeyCode::Char('w') => Some(Vec2::Y),
                    KeyCode::Char('s') => Some(Vec2::NEG_Y),
                    KeyCode::Char('a') => Some(Vec2::NEG_X),
                    KeyCode::Char('d') => Some(Vec2::X),
                    _ => None,
                };
                if let Some(step) = step {
                    walk = step;
                    walk_until = frame_start + WALK_HOLD;
                    continue;
                }

                match code {
                    KeyCode::Char('q') => input.look = Vec2::new(-LOOK_STEP, 0.0),
                    KeyCode::Char('e') => input.look = Vec2::new(LOOK_STEP, 0.0),
                    KeyCode::Char(' ') => input.jump = true,
                    KeyCode::Esc => quit = true,
                    _ => {}
                }
            }
        }

        if quit {
            break Ok(());
        }

        if frame_start < walk_until {
            input.movement = walk;
        }

        let report = patrol.step(dt, &input);
        if let Err(err) = render_display(&report, patrol.thief().yaw(), patrol.trigger().is_occupied()) {
            break Err(err.into());
        }

        pacer.wait_next();
    };

    disable_raw_mode()?;
    execute!(io::stdout(), cursor::Show)?;
    println!();
    result
}
