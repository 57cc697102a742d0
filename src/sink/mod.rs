/// Audio sink abstraction for the alarm
/// A sink is whatever actually plays the alarm sound: an in-memory stand-in for
/// tests and headless runs, or a real-time output device (native CPAL).

use std::sync::{Arc, Mutex, MutexGuard};

/// Playback surface the alarm drives once per frame
pub trait AudioSink {
    /// Start (or resume) playback
    fn play(&mut self);

    /// Stop playback
    fn stop(&mut self);

    /// Check if the sink is currently playing
    fn is_playing(&self) -> bool;

    /// Current output volume in 0.0..=1.0
    fn volume(&self) -> f32;

    /// Set the output volume, clamped to 0.0..=1.0
    fn set_volume(&mut self, volume: f32);
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn play(&mut self) {
        (**self).play();
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }

    fn volume(&self) -> f32 {
        (**self).volume()
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume);
    }
}

/// Sink that only records what it was asked to do
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    playing: bool,
    volume: f32,
    pub play_count: u32,
    pub stop_count: u32,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for MemorySink {
    fn play(&mut self) {
        self.playing = true;
        self.play_count += 1;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.stop_count += 1;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

/// Cloneable handle to a sink shared between the alarm and an observer
/// (a UI, a test, the audio callback)
pub struct SharedSink<S: AudioSink>(Arc<Mutex<S>>);

impl<S: AudioSink> SharedSink<S> {
    pub fn new(sink: S) -> Self {
        Self(Arc::new(Mutex::new(sink)))
    }

    /// Get a locked reference to the inner sink
    pub fn lock(&self) -> MutexGuard<'_, S> {
        // a panic elsewhere must not take the alarm down with it
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: AudioSink> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S: AudioSink> AudioSink for SharedSink<S> {
    fn play(&mut self) {
        self.lock().play();
    }

    fn stop(&mut self) {
        self.lock().stop();
    }

    fn is_playing(&self) -> bool {
        self.lock().is_playing()
    }

    fn volume(&self) -> f32 {
        self.lock().volume()
    }

    fn set_volume(&mut self, volume: f32) {
        self.lock().set_volume(volume);
    }
}

// Platform-specific implementations
#[cfg(feature = "native")]
pub mod cpal_sink;

#[cfg(feature = "native")]
pub use self::cpal_sink::CpalSink;
