/* Scripted patrol: the thief walks into the vault, lingers, walks out.
The alarm ramps up and back down; with the native feature it is audible.
*/

use std::path::PathBuf;

use clap::Parser;

use signaling::sink::{AudioSink, MemorySink};
use signaling::config::frame_time;
use signaling::utils::{init_logger_with_level, FramePacer};
use signaling::{vault_scene, SignalConfig, ThiefConfig};

#[derive(Parser, Debug)]
#[command(name = "signaling", about = "Run the vault patrol and listen to the alarm")]
struct Args {
    /// Alarm ramp speed in volume per second
    #[arg(long, default_value_t = 0.5)]
    rate: f32,

    /// Loudest alarm volume (0.0 to 1.0)
    #[arg(long, default_value_t = 1.0)]
    max_volume: f32,

    /// Seconds the alarm waits before reacting
    #[arg(long, default_value_t = 1.0)]
    delay: f32,

    /// Simulation frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Length of the run in seconds
    #[arg(long, default_value_t = 14.0)]
    seconds: f32,

    /// Run as fast as possible with no audio device
    #[arg(long)]
    headless: bool,

    /// Render the alarm to a WAV file instead of playing it
    #[arg(long, value_name = "PATH")]
    bounce: Option<PathBuf>,

    /// Log every ramp transition
    #[arg(short, long)]
    verbose: bool,
}

#[cfg(feature = "native")]
fn open_sink(headless: bool) -> Result<Box<dyn AudioSink>, anyhow::Error> {
    if headless {
        return Ok(Box::new(MemorySink::new()));
    }
    Ok(Box::new(signaling::sink::CpalSink::open()?))
}

#[cfg(not(feature = "native"))]
fn open_sink(headless: bool) -> Result<Box<dyn AudioSink>, anyhow::Error> {
    if !headless {
        log::warn!("built without the native feature, running without audio");
    }
    Ok(Box::new(MemorySink::new()))
}

#[cfg(feature = "bounce")]
fn bounce(args: &Args, path: &std::path::Path, signal_config: SignalConfig) -> Result<(), anyhow::Error> {
    let (mut patrol, mut route) = vault_scene(signal_config, ThiefConfig::default(), Some(MemorySink::new()));
    let frames = (args.seconds * args.fps).ceil() as u64;
    let stats = signaling::bounce::bounce_to_wav(path, &mut patrol, &mut route, frames, args.fps, 44100)?;
    log::info!("peak {:.3} over {} samples", stats.peak, stats.samples);
    Ok(())
}

#[cfg(not(feature = "bounce"))]
fn bounce(_args: &Args, _path: &std::path::Path, _signal_config: SignalConfig) -> Result<(), anyhow::Error> {
    Err(anyhow::anyhow!("WAV export needs the 'bounce' feature"))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger_with_level(if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });

    let dt = frame_time(args.fps)?;

    let signal_config = SignalConfig::new(args.rate, args.max_volume, args.delay);

    if let Some(path) = args.bounce.as_deref() {
        return bounce(&args, path, signal_config);
    }

    let sink = open_sink(args.headless)?;
    let (mut patrol, mut route) = vault_scene(signal_config, ThiefConfig::default(), Some(sink));

    let mut pacer = FramePacer::from_fps(args.fps)?;
    let frames = (args.seconds * args.fps).ceil() as u64;
    let report_every = args.fps.round().max(1.0) as u64;

    log::info!(
        "patrol: {} frames at {} fps, ramp {:.2}/s to {:.2} after {:.2}s",
        frames,
        args.fps,
        signal_config.increase_speed,
        signal_config.max_volume,
        signal_config.update_delay
    );

    for _ in 0..frames {
        let position = patrol.thief().position();
        let input = route.next_input(dt, position, patrol.camera());
        let report = patrol.step(dt, &input);

        if let Some(event) = report.event {
            log::info!("{:6.2}s {:?}", report.time, event);
        }
        if report.frame % report_every == 0 {
            log::info!(
                "{:6.2}s pos=({:5.2}, {:5.2}) volume={:.3} playing={} {:?}",
                report.time,
                report.position.x,
                report.position.z,
                report.volume,
                report.playing,
                report.phase
            );
        }

        if !args.headless {
            pacer.wait_next();
        }
    }

    if patrol.signaling().is_playing() {
        log::warn!("run ended with the alarm still sounding");
    } else {
        log::info!("alarm silent, patrol done");
    }

    Ok(())
}
