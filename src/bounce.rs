//! Offline render of a patrol's alarm to a WAV file

use std::path::Path;

use crate::config::frame_time;
use crate::siren::Siren;
use crate::sink::AudioSink;
use crate::world::{Patrol, Waypoints};

/// Summary of a finished bounce
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BounceStats {
    pub frames: u64,
    pub samples: u64,
    pub peak: f32,
}

/// Run `frames` frames of the patrol at `fps`, rendering the siren through the
/// alarm volume into a mono float WAV at `sample_rate`.
///
/// Volume is held for the duration of each frame, matching what a real-time
/// sink hears between two updates.
pub fn bounce_to_wav<S: AudioSink>(
    path: impl AsRef<Path>,
    patrol: &mut Patrol<S>,
    route: &mut Waypoints,
    frames: u64,
    fps: f32,
    sample_rate: u32,
) -> Result<BounceStats, anyhow::Error> {
    let dt = frame_time(fps)?;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;

    let samples_per_frame = sample_rate as f64 / fps as f64;
    let mut siren = Siren::new(sample_rate as f32);
    let mut written: u64 = 0;
    let mut peak = 0.0f32;

    for _ in 0..frames {
        let position = patrol.thief().position();
        let input = route.next_input(dt, position, patrol.camera());
        let report = patrol.step(dt, &input);

        // carry fractional samples so long bounces do not drift
        let frame_end = (((report.frame as f64) * samples_per_frame).round()) as u64;
        let gain = if report.playing { report.volume } else { 0.0 };

        while written < frame_end {
            let sample = if gain > 0.0 { siren.tick() * gain } else { 0.0 };
            peak = peak.max(sample.abs());
            writer.write_sample(sample)?;
            written += 1;
        }
    }

    writer.finalize()?;
    log::info!("bounced {} frames ({} samples) to {}", frames, written, path.as_ref().display());

    Ok(BounceStats {
        frames,
        samples: written,
        peak,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SignalConfig, ThiefConfig};
    use crate::sink::MemorySink;
    use crate::world::vault_scene;

    #[test]
    fn test_bounce_writes_alarm() {
        let path = std::env::temp_dir().join(format!("signaling-bounce-{}.wav", std::process::id()));
        let (mut patrol, mut route) =
            vault_scene(SignalConfig::default(), ThiefConfig::default(), Some(MemorySink::new()));

        let stats = bounce_to_wav(&path, &mut patrol, &mut route, 60 * 8, 60.0, 8000).unwrap();
        assert_eq!(stats.samples, 8 * 8000);
        assert!(stats.peak > 0.1, "alarm should be audible, peak {}", stats.peak);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.len() as u64, stats.samples);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_bounce_rejects_zero_fps() {
        let path = std::env::temp_dir().join("signaling-bounce-never.wav");
        let (mut patrol, mut route) =
            vault_scene(SignalConfig::default(), ThiefConfig::default(), Some(MemorySink::new()));
        assert!(bounce_to_wav(&path, &mut patrol, &mut route, 10, 0.0, 8000).is_err());
    }

    #[test]
    fn test_bounce_rejects_non_finite_fps() {
        let path = std::env::temp_dir().join(format!("signaling-bounce-nan-{}.wav", std::process::id()));
        let (mut patrol, mut route) =
            vault_scene(SignalConfig::default(), ThiefConfig::default(), Some(MemorySink::new()));

        assert!(bounce_to_wav(&path, &mut patrol, &mut route, 10, f32::NAN, 8000).is_err());
        assert!(bounce_to_wav(&path, &mut patrol, &mut route, 10, 1e-30, 8000).is_err());
        // rejected before any file is created
        assert!(!path.exists());
    }
}
