//! Real-time frame pacing for the binary and the demos

use std::time::{Duration, Instant};

use crate::config::frame_time;

/// Keeps a running deadline so frame timing does not drift with sleep jitter
#[derive(Clone, Copy, Debug)]
pub struct FramePacer {
    frame: Duration,
    deadline: Instant,
}

impl FramePacer {
    pub fn new(start: Instant, frame: Duration) -> Self {
        Self {
            frame,
            deadline: start,
        }
    }

    /// Pacer for a frame rate, starting now
    pub fn from_fps(fps: f32) -> Result<Self, anyhow::Error> {
        let frame = Duration::try_from_secs_f32(frame_time(fps)?)?;
        Ok(Self::new(Instant::now(), frame))
    }

    /// Move the deadline one frame ahead and return it
    pub fn advance(&mut self) -> Instant {
        self.deadline += self.frame;
        self.deadline
    }

    /// How long to sleep at `now` to hit the current deadline, if at all
    pub fn wait_time(&self, now: Instant) -> Option<Duration> {
        self.deadline.checked_duration_since(now).filter(|wait| !wait.is_zero())
    }

    /// Advance one frame and sleep until its deadline
    pub fn wait_next(&mut self) {
        self.advance();
        if let Some(wait) = self.wait_time(Instant::now()) {
            std::thread::sleep(wait);
        }
    }

    pub fn frame(&self) -> Duration {
        self.frame
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_accumulates() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(start, Duration::from_millis(10));

        for _ in 0..3 {
            pacer.advance();
        }
        assert_eq!(pacer.deadline(), start + Duration::from_millis(30));
        assert_eq!(pacer.wait_time(start + Duration::from_millis(5)), Some(Duration::from_millis(25)));
        assert_eq!(pacer.wait_time(start + Duration::from_millis(40)), None);
    }

    #[test]
    fn test_from_fps_rejects_bad_rates() {
        assert!(FramePacer::from_fps(60.0).is_ok());
        for fps in [f32::NAN, 0.0, 1e-30, f32::INFINITY] {
            assert!(FramePacer::from_fps(fps).is_err(), "fps {fps} should be rejected");
        }
        let pacer = FramePacer::from_fps(50.0).unwrap();
        let error = pacer.frame().abs_diff(Duration::from_millis(20));
        assert!(error < Duration::from_micros(1), "frame {:?}", pacer.frame());
    }
}
