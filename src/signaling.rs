//! Alarm component tying a [`VolumeRamp`] to an [`AudioSink`]
//!
//! Two ways in, one state machine: explicit `start_signal`/`stop_signal`
//! calls from a trigger, or an occupancy flag flipped by whoever tracks the
//! intruder. Without a sink every operation is a no-op.

use crate::config::SignalConfig;
use crate::ramp::{RampPhase, StepOutcome, VolumeRamp};
use crate::sink::AudioSink;

pub struct Signaling<S: AudioSink> {
    config: SignalConfig,
    sink: Option<S>,
    ramp: VolumeRamp,
    occupied: bool,
}

impl<S: AudioSink> Signaling<S> {
    /// Create the alarm; the sink starts silent
    pub fn new(config: SignalConfig, sink: Option<S>) -> Self {
        let mut signaling = Self {
            config,
            sink,
            ramp: VolumeRamp::new(&config),
            occupied: false,
        };
        signaling.reset_signal();
        signaling
    }

    /// Create an alarm with a sink attached
    pub fn with_sink(config: SignalConfig, sink: S) -> Self {
        Self::new(config, Some(sink))
    }

    fn reset_signal(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.set_volume(0.0);
        }
        self.ramp.set_volume(0.0);
    }

    /// Begin (after the update delay) ramping up to the configured max volume
    pub fn start_signal(&mut self) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        if !sink.is_playing() {
            sink.play();
        }

        self.ramp.set_volume(sink.volume());
        self.ramp.start(self.config.max_volume);
        log::debug!("alarm rising to {:.2}", self.config.max_volume);
    }

    /// Begin (after the update delay) ramping down to silence
    pub fn stop_signal(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };

        self.ramp.set_volume(sink.volume());
        self.ramp.start(0.0);
        log::debug!("alarm falling from {:.2}", self.ramp.volume());
    }

    /// Occupancy-flag entry point; an edge routes to start or stop
    pub fn set_occupied(&mut self, occupied: bool) {
        if self.sink.is_none() || self.occupied == occupied {
            return;
        }

        self.occupied = occupied;
        if occupied {
            self.start_signal();
        } else {
            self.stop_signal();
        }
    }

    /// Advance one frame. Returns true while a ramp is pending or running.
    pub fn update(&mut self, dt: f32) -> bool {
        let Some(sink) = self.sink.as_mut() else {
            return false;
        };

        let outcome = self.ramp.step(dt);
        match outcome {
            StepOutcome::Idle | StepOutcome::Waiting => {}
            StepOutcome::Continue | StepOutcome::Reached => {
                sink.set_volume(self.ramp.volume());
            }
            StepOutcome::Silenced => {
                sink.set_volume(0.0);
                if sink.is_playing() {
                    sink.stop();
                }
                log::debug!("alarm silenced");
            }
        }

        if outcome == StepOutcome::Reached {
            log::debug!("alarm holding at {:.2}", self.ramp.volume());
        }

        outcome.should_continue()
    }

    /// Attach a sink, replacing any previous one. The new sink starts silent.
    pub fn attach_sink(&mut self, sink: S) -> Option<S> {
        let previous = self.sink.replace(sink);
        self.ramp.cancel();
        self.reset_signal();
        previous
    }

    /// Detach the sink; the alarm goes inert until one is attached again
    pub fn detach_sink(&mut self) -> Option<S> {
        self.ramp.cancel();
        self.sink.take()
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    pub fn phase(&self) -> RampPhase {
        self.ramp.phase()
    }

    pub fn ramp(&self) -> &VolumeRamp {
        &self.ramp
    }

    /// Sink volume, 0.0 without a sink
    pub fn volume(&self) -> f32 {
        self.sink.as_ref().map_or(0.0, |sink| sink.volume())
    }

    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| sink.is_playing())
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    const FRAME: f32 = 1.0 / 60.0;

    fn alarm() -> Signaling<MemorySink> {
        Signaling::with_sink(SignalConfig::new(0.5, 1.0, 0.0), MemorySink::new())
    }

    #[test]
    fn test_new_silences_sink() {
        let mut sink = MemorySink::new();
        sink.set_volume(0.8);
        let signaling = Signaling::with_sink(SignalConfig::default(), sink);
        assert_eq!(signaling.volume(), 0.0);
        assert!(!signaling.is_playing());
    }

    #[test]
    fn test_start_plays_once() {
        let mut signaling = alarm();
        signaling.start_signal();
        signaling.start_signal();
        assert!(signaling.is_playing());
        assert_eq!(signaling.sink().map(|s| s.play_count), Some(1));
        assert_eq!(signaling.phase(), RampPhase::Delaying);
    }

    #[test]
    fn test_stop_does_not_start_playback() {
        let mut signaling = alarm();
        signaling.stop_signal();
        assert!(!signaling.is_playing());
        assert_eq!(signaling.sink().map(|s| s.play_count), Some(0));
    }

    #[test]
    fn test_occupancy_edges_only() {
        let mut signaling = alarm();
        signaling.set_occupied(false);
        assert_eq!(signaling.phase(), RampPhase::Idle);

        signaling.set_occupied(true);
        assert!(signaling.is_playing());
        assert_eq!(signaling.ramp().target(), 1.0);

        for _ in 0..30 {
            signaling.update(FRAME);
        }
        let phase_before = signaling.phase();
        signaling.set_occupied(true);
        assert_eq!(signaling.phase(), phase_before);

        signaling.set_occupied(false);
        assert_eq!(signaling.ramp().target(), 0.0);
        assert_eq!(signaling.phase(), RampPhase::Delaying);
    }

    #[test]
    fn test_detached_alarm_is_inert() {
        let mut signaling: Signaling<MemorySink> = Signaling::new(SignalConfig::default(), None);
        signaling.start_signal();
        signaling.set_occupied(true);
        assert!(!signaling.update(FRAME));
        assert_eq!(signaling.phase(), RampPhase::Idle);
        assert!(!signaling.is_occupied());
        assert_eq!(signaling.volume(), 0.0);
    }

    #[test]
    fn test_attach_resets_volume() {
        let mut signaling: Signaling<MemorySink> = Signaling::new(SignalConfig::default(), None);
        let mut sink = MemorySink::new();
        sink.set_volume(0.6);
        assert!(signaling.attach_sink(sink).is_none());
        assert_eq!(signaling.volume(), 0.0);

        signaling.start_signal();
        assert!(signaling.detach_sink().is_some());
        assert_eq!(signaling.phase(), RampPhase::Idle);
    }
}
