use std::f32::consts::PI;

/// Default siren sweep, a wail between two pitches
pub const DEFAULT_LOW_HZ: f32 = 600.0;
pub const DEFAULT_HIGH_HZ: f32 = 1200.0;
pub const DEFAULT_SWEEP_HZ: f32 = 0.75;

/// Alarm tone generator: a carrier whose pitch is swept by a sine LFO.
///
/// Output is in -1.0..1.0 and is not volume scaled; sinks multiply by their
/// own volume.
#[derive(Clone, Debug)]
pub struct Siren {
    sample_rate: f32,
    low_hz: f32,
    high_hz: f32,
    sweep_hz: f32,
    carrier_phase: f32,
    sweep_phase: f32,
}

impl Siren {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            low_hz: DEFAULT_LOW_HZ,
            high_hz: DEFAULT_HIGH_HZ,
            sweep_hz: DEFAULT_SWEEP_HZ,
            carrier_phase: 0.0,
            sweep_phase: 0.0,
        }
    }

    /// Set the pitch range and the sweep rate in Hz
    pub fn set_sweep(&mut self, low_hz: f32, high_hz: f32, sweep_hz: f32) {
        let nyquist = self.sample_rate * 0.5;
        self.low_hz = low_hz.clamp(20.0, nyquist);
        self.high_hz = high_hz.clamp(self.low_hz, nyquist);
        self.sweep_hz = sweep_hz.max(0.0);
    }

    /// Current carrier frequency
    pub fn frequency(&self) -> f32 {
        let sweep = 0.5 - 0.5 * (self.sweep_phase * 2.0 * PI).cos();
        self.low_hz + (self.high_hz - self.low_hz) * sweep
    }

    /// Generate one sample and advance both phases
    pub fn tick(&mut self) -> f32 {
        let frequency = self.frequency();
        let angle = self.carrier_phase * 2.0 * PI;
        // fundamental plus a soft third harmonic for a harsher edge
        let value = 0.8 * angle.sin() + 0.2 * (3.0 * angle).sin();

        self.carrier_phase += frequency / self.sample_rate;
        if self.carrier_phase >= 1.0 {
            self.carrier_phase -= 1.0;
        }

        self.sweep_phase += self.sweep_hz / self.sample_rate;
        if self.sweep_phase >= 1.0 {
            self.sweep_phase -= 1.0;
        }

        value
    }

    pub fn reset(&mut self) {
        self.carrier_phase = 0.0;
        self.sweep_phase = 0.0;
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_bounded() {
        let mut siren = Siren::new(44100.0);
        for _ in 0..44100 {
            let sample = siren.tick();
            assert!(sample.is_finite());
            assert!(sample.abs() <= 1.0);
        }
    }

    #[test]
    fn test_frequency_stays_in_sweep_range() {
        let mut siren = Siren::new(44100.0);
        siren.set_sweep(400.0, 800.0, 2.0);
        for _ in 0..44100 {
            let f = siren.frequency();
            assert!((400.0..=800.0).contains(&f), "frequency {f} out of range");
            siren.tick();
        }
    }

    #[test]
    fn test_produces_audio() {
        let mut siren = Siren::new(44100.0);
        let peak = (0..1024).map(|_| siren.tick().abs()).fold(0.0f32, f32::max);
        assert!(peak > 0.5, "siren should be audible, peak {peak}");
    }
}
