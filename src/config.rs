/// Lowest accepted ramp speed (volume units per second)
pub const MIN_INCREASE_SPEED: f32 = 0.001;

/// Accepted simulation frame rates
pub const MIN_FPS: f32 = 1.0;
pub const MAX_FPS: f32 = 10_000.0;

const DEFAULT_INCREASE_SPEED: f32 = 0.5;
const DEFAULT_MAX_VOLUME: f32 = 1.0;
const DEFAULT_UPDATE_DELAY: f32 = 1.0;

/// Non-finite input falls back to the default before range clamping
fn finite_or(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// Seconds per frame for a frame rate, rejecting rates a frame loop cannot run at
pub fn frame_time(fps: f32) -> Result<f32, anyhow::Error> {
    if !(fps.is_finite() && (MIN_FPS..=MAX_FPS).contains(&fps)) {
        return Err(anyhow::anyhow!(
            "Frame rate must be between {} and {}, got {}",
            MIN_FPS,
            MAX_FPS,
            fps
        ));
    }
    Ok(1.0 / fps)
}

/// Alarm tuning: how fast the volume ramps, how loud it gets and how long
/// the alarm waits before reacting to an intruder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SignalConfig {
    pub increase_speed: f32, // volume per second
    pub max_volume: f32,     // 0.0 to 1.0
    pub update_delay: f32,   // seconds
}

impl SignalConfig {
    pub fn new(increase_speed: f32, max_volume: f32, update_delay: f32) -> Self {
        Self {
            increase_speed: finite_or(increase_speed, DEFAULT_INCREASE_SPEED).max(MIN_INCREASE_SPEED),
            max_volume: finite_or(max_volume, DEFAULT_MAX_VOLUME).clamp(0.0, 1.0),
            update_delay: finite_or(update_delay, DEFAULT_UPDATE_DELAY).max(0.0),
        }
    }
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INCREASE_SPEED, DEFAULT_MAX_VOLUME, DEFAULT_UPDATE_DELAY)
    }
}

/// Character controller tuning for the thief
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThiefConfig {
    pub move_speed: f32,            // units per second
    pub turn_speed: f32,            // degrees per second
    pub mouse_sensitivity: f32,     // degrees per look unit
    pub jump_height: f32,           // units
    pub gravity: f32,               // units per second^2, negative is down
    pub ground_check_distance: f32, // units below the feet
    pub ground_check_offset: f32,   // ray origin above the feet
}

impl Default for ThiefConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            turn_speed: 360.0,
            mouse_sensitivity: 2.0,
            jump_height: 1.2,
            gravity: -9.81,
            ground_check_distance: 0.2,
            ground_check_offset: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_defaults() {
        let config = SignalConfig::default();
        assert_eq!(config.increase_speed, 0.5);
        assert_eq!(config.max_volume, 1.0);
        assert_eq!(config.update_delay, 1.0);
    }

    #[test]
    fn test_signal_clamping() {
        let config = SignalConfig::new(-1.0, 3.0, -0.5);
        assert_eq!(config.increase_speed, MIN_INCREASE_SPEED);
        assert_eq!(config.max_volume, 1.0);
        assert_eq!(config.update_delay, 0.0);
    }

    #[test]
    fn test_signal_clamping_non_finite() {
        let config = SignalConfig::new(f32::NAN, f32::NAN, f32::NAN);
        assert_eq!(config, SignalConfig::default());

        let config = SignalConfig::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
        assert_eq!(config, SignalConfig::default());

        let config = SignalConfig::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
        assert_eq!(config, SignalConfig::default());

        // parsed from text the way the command line sees it
        let nan: f32 = "NaN".parse().unwrap();
        let config = SignalConfig::new(0.5, nan, 1.0);
        assert_eq!(config.max_volume, 1.0);
    }

    #[test]
    fn test_frame_time() {
        assert!((frame_time(60.0).unwrap() - 1.0 / 60.0).abs() < 1e-9);
        assert_eq!(frame_time(MIN_FPS).unwrap(), 1.0);

        for fps in [0.0, -60.0, 1e-30, 1e9, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(frame_time(fps).is_err(), "fps {fps} should be rejected");
        }
    }
}
