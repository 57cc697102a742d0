//! Rate-limited volume ramp driven once per frame
//!
//! The ramp waits out a fixed delay after every request, then moves the
//! volume linearly towards the requested target. A request for silence
//! finishes as soon as the volume touches zero so the owner can stop playback.

use crate::config::SignalConfig;

/// Clamped linear step from `current` towards `target`, never overshooting.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        return target;
    }
    current + delta.signum() * max_delta
}

/// Smallest positive subnormal f32
const TINY: f32 = 1.4e-45;

/// Relative float comparison (1e-6 of the larger magnitude). The absolute
/// floor is eight subnormal steps, so only values that are practically zero
/// compare equal to zero.
#[inline]
pub fn approximately(a: f32, b: f32) -> bool {
    let tolerance = (1e-6 * a.abs().max(b.abs())).max(TINY * 8.0);
    (b - a).abs() < tolerance
}

/// Where the ramp is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampPhase {
    Idle,
    Delaying,
    Ramping,
}

/// Result of advancing the ramp by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing scheduled
    Idle,
    /// Still counting down the start delay
    Waiting,
    /// Moved towards the target, more frames needed
    Continue,
    /// Target reached, ramp is idle again
    Reached,
    /// Ramped down to silence, playback should stop
    Silenced,
}

impl StepOutcome {
    /// True while the ramp wants to be stepped again
    pub fn should_continue(self) -> bool {
        matches!(self, StepOutcome::Waiting | StepOutcome::Continue)
    }
}

#[derive(Clone, Debug)]
pub struct VolumeRamp {
    current: f32,
    target: f32,
    rate: f32,
    max_volume: f32,
    update_delay: f32,
    delay_remaining: f32,
    phase: RampPhase,
}

impl VolumeRamp {
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            rate: config.increase_speed,
            max_volume: config.max_volume,
            update_delay: config.update_delay,
            delay_remaining: 0.0,
            phase: RampPhase::Idle,
        }
    }

    /// Schedule a ramp towards `target` after the update delay.
    ///
    /// Any pending or running ramp is discarded; the latest request wins and
    /// ramps from whatever volume the previous one left behind.
    pub fn start(&mut self, target: f32) {
        self.target = target.clamp(0.0, self.max_volume);
        self.delay_remaining = self.update_delay;
        self.phase = RampPhase::Delaying;
    }

    /// Drop any scheduled or running ramp, keeping the current volume
    pub fn cancel(&mut self) {
        self.delay_remaining = 0.0;
        self.phase = RampPhase::Idle;
    }

    /// Advance by one frame of `dt` seconds.
    ///
    /// The frame that finishes the delay only switches to ramping; volume
    /// starts moving on the following frame.
    pub fn step(&mut self, dt: f32) -> StepOutcome {
        let dt = dt.max(0.0);
        match self.phase {
            RampPhase::Idle => StepOutcome::Idle,
            RampPhase::Delaying => {
                self.delay_remaining -= dt;
                if self.delay_remaining <= 0.0 {
                    self.delay_remaining = 0.0;
                    self.phase = RampPhase::Ramping;
                }
                StepOutcome::Waiting
            }
            RampPhase::Ramping => self.advance(dt),
        }
    }

    fn advance(&mut self, dt: f32) -> StepOutcome {
        let next = move_towards(self.current, self.target, self.rate * dt);
        self.current = next.clamp(0.0, self.max_volume);

        if self.target <= 0.0 && self.current <= 0.0 {
            self.current = 0.0;
            self.phase = RampPhase::Idle;
            return StepOutcome::Silenced;
        }

        if approximately(self.current, self.target) {
            self.current = self.target;
            self.phase = RampPhase::Idle;
            return StepOutcome::Reached;
        }

        StepOutcome::Continue
    }

    /// Overwrite the current volume, e.g. to resync with an externally changed sink
    pub fn set_volume(&mut self, volume: f32) {
        self.current = volume.clamp(0.0, self.max_volume);
    }

    pub fn volume(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn phase(&self) -> RampPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != RampPhase::Idle
    }

    pub fn delay_remaining(&self) -> f32 {
        self.delay_remaining
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn max_volume(&self) -> f32 {
        self.max_volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn immediate(rate: f32) -> VolumeRamp {
        VolumeRamp::new(&SignalConfig::new(rate, 1.0, 0.0))
    }

    #[test]
    fn test_move_towards_clamps() {
        assert_eq!(move_towards(0.0, 1.0, 0.25), 0.25);
        assert_eq!(move_towards(1.0, 0.0, 0.25), 0.75);
        assert_eq!(move_towards(0.9, 1.0, 0.25), 1.0);
        assert_eq!(move_towards(0.1, 0.0, 0.25), 0.0);
        assert_eq!(move_towards(0.5, 0.5, 0.25), 0.5);
    }

    #[test]
    fn test_approximately() {
        assert!(approximately(1.0, 1.0 + 1e-7));
        assert!(approximately(0.0, 0.0));
        assert!(approximately(0.0, TINY * 4.0));
        assert!(!approximately(0.0, 1e-7));
        assert!(!approximately(0.0, f32::EPSILON));
        assert!(!approximately(1.0, 1.001));
        assert!(!approximately(0.0, 1e-4));
    }

    #[test]
    fn test_near_miss_snaps_to_target() {
        // one second at this rate lands just short of 1.0
        let mut ramp = VolumeRamp::new(&SignalConfig::new(0.9999995, 1.0, 0.0));
        ramp.start(1.0);
        assert_eq!(ramp.step(1.0), StepOutcome::Waiting);
        assert_eq!(ramp.step(1.0), StepOutcome::Reached);
        assert_eq!(ramp.volume(), 1.0);
        assert!(!ramp.is_active());

        // a visibly short step keeps going
        let mut ramp = VolumeRamp::new(&SignalConfig::new(0.99, 1.0, 0.0));
        ramp.start(1.0);
        ramp.step(1.0);
        assert_eq!(ramp.step(1.0), StepOutcome::Continue);
        assert_eq!(ramp.volume(), 0.99);
    }

    #[test]
    fn test_idle_step_does_nothing() {
        let mut ramp = immediate(0.5);
        assert_eq!(ramp.step(FRAME), StepOutcome::Idle);
        assert_eq!(ramp.volume(), 0.0);
        assert_eq!(ramp.phase(), RampPhase::Idle);
    }

    #[test]
    fn test_delay_counts_down_before_ramping() {
        let mut ramp = VolumeRamp::new(&SignalConfig::new(0.5, 1.0, 0.5));
        ramp.start(1.0);
        assert_eq!(ramp.phase(), RampPhase::Delaying);

        for _ in 0..29 {
            assert_eq!(ramp.step(FRAME), StepOutcome::Waiting);
            assert_eq!(ramp.volume(), 0.0);
        }
        // the half second ends on frame 30 or 31 depending on rounding
        let mut extra = 0;
        while ramp.phase() == RampPhase::Delaying {
            assert_eq!(ramp.step(FRAME), StepOutcome::Waiting);
            extra += 1;
        }
        assert!(extra <= 2);
        assert_eq!(ramp.phase(), RampPhase::Ramping);
        assert_eq!(ramp.volume(), 0.0);

        assert_eq!(ramp.step(FRAME), StepOutcome::Continue);
        assert!(ramp.volume() > 0.0);
    }

    #[test]
    fn test_restart_resets_delay() {
        let mut ramp = VolumeRamp::new(&SignalConfig::new(0.5, 1.0, 1.0));
        ramp.start(1.0);
        ramp.step(0.9);
        ramp.start(0.0);
        assert_eq!(ramp.delay_remaining(), 1.0);
        assert_eq!(ramp.target(), 0.0);
    }

    #[test]
    fn test_target_clamped_to_max_volume() {
        let mut ramp = VolumeRamp::new(&SignalConfig::new(0.5, 0.6, 0.0));
        assert_eq!(ramp.max_volume(), 0.6);
        assert_eq!(ramp.rate(), 0.5);
        ramp.start(1.0);
        assert_eq!(ramp.target(), 0.6);
        ramp.set_volume(2.0);
        assert_eq!(ramp.volume(), 0.6);
    }

    #[test]
    fn test_silence_terminates_ramp() {
        let mut ramp = immediate(10.0);
        ramp.set_volume(0.05);
        ramp.start(0.0);
        ramp.step(FRAME);
        assert_eq!(ramp.step(FRAME), StepOutcome::Silenced);
        assert_eq!(ramp.volume(), 0.0);
        assert!(!ramp.is_active());
    }

    #[test]
    fn test_ramp_up_reaches_target() {
        let mut ramp = immediate(0.5);
        ramp.start(1.0);
        ramp.step(FRAME);

        let mut outcome = StepOutcome::Continue;
        let mut frames = 0;
        while outcome.should_continue() && frames < 1000 {
            outcome = ramp.step(FRAME);
            frames += 1;
        }
        assert_eq!(outcome, StepOutcome::Reached);
        assert_eq!(ramp.volume(), 1.0);
        assert!((120..=121).contains(&frames), "took {frames} frames");
    }

    #[test]
    fn test_cancel_keeps_volume() {
        let mut ramp = immediate(0.5);
        ramp.start(1.0);
        for _ in 0..30 {
            ramp.step(FRAME);
        }
        let held = ramp.volume();
        ramp.cancel();
        assert_eq!(ramp.step(FRAME), StepOutcome::Idle);
        assert_eq!(ramp.volume(), held);
    }
}
