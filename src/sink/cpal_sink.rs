#[cfg(feature = "native")]
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Device, FromSample, Sample, SizedSample, Stream, StreamConfig,
};
use super::AudioSink;
use crate::siren::Siren;
use std::sync::{Arc, Mutex};

/// State read by the audio callback on every buffer
struct ToneState {
    siren: Siren,
    playing: bool,
    volume: f32,
}

/// Real-time alarm output on the default device.
///
/// The stream runs for the lifetime of the sink and renders silence while
/// stopped, so `play`/`stop` only flip a flag and never touch the device.
#[cfg(feature = "native")]
pub struct CpalSink {
    _stream: Stream,
    state: Arc<Mutex<ToneState>>,
    sample_rate: f32,
}

#[cfg(feature = "native")]
impl CpalSink {
    /// Open the default output device and start a silent stream
    pub fn open() -> Result<Self, anyhow::Error> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("Default output device is not available"))?;

        log::info!("Output device: {}", device.name()?);

        let supported_config = device.default_output_config()?;
        log::debug!("Default output config: {:?}", supported_config);

        let sample_rate = supported_config.sample_rate().0 as f32;
        let sample_format = supported_config.sample_format();
        let config: StreamConfig = supported_config.into();

        let state = Arc::new(Mutex::new(ToneState {
            siren: Siren::new(sample_rate),
            playing: false,
            volume: 0.0,
        }));

        let stream = match sample_format {
            cpal::SampleFormat::I8 => Self::make_stream::<i8>(&device, &config, state.clone())?,
            cpal::SampleFormat::I16 => Self::make_stream::<i16>(&device, &config, state.clone())?,
            cpal::SampleFormat::I32 => Self::make_stream::<i32>(&device, &config, state.clone())?,
            cpal::SampleFormat::I64 => Self::make_stream::<i64>(&device, &config, state.clone())?,
            cpal::SampleFormat::U8 => Self::make_stream::<u8>(&device, &config, state.clone())?,
            cpal::SampleFormat::U16 => Self::make_stream::<u16>(&device, &config, state.clone())?,
            cpal::SampleFormat::U32 => Self::make_stream::<u32>(&device, &config, state.clone())?,
            cpal::SampleFormat::U64 => Self::make_stream::<u64>(&device, &config, state.clone())?,
            cpal::SampleFormat::F32 => Self::make_stream::<f32>(&device, &config, state.clone())?,
            cpal::SampleFormat::F64 => Self::make_stream::<f64>(&device, &config, state.clone())?,
            sample_format => return Err(anyhow::anyhow!("Unsupported sample format '{}'", sample_format)),
        };

        stream.play()?;
        log::info!("Alarm stream running at sample rate: {}", sample_rate);

        Ok(Self {
            _stream: stream,
            state,
            sample_rate,
        })
    }

    /// Create a typed stream for the given sample format
    fn make_stream<T>(
        device: &Device,
        config: &StreamConfig,
        state: Arc<Mutex<ToneState>>,
    ) -> Result<Stream, anyhow::Error>
    where
        T: SizedSample + FromSample<f32>,
    {
        let num_channels = config.channels as usize;

        let err_fn = |err| log::error!("Error building output sound stream: {}", err);

        let stream = device.build_output_stream(
            config,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                Self::process_frame(output, &state, num_channels);
            },
            err_fn,
            None,
        )?;

        Ok(stream)
    }

    /// Fill one callback buffer
    fn process_frame<SampleType>(
        output: &mut [SampleType],
        state: &Arc<Mutex<ToneState>>,
        num_channels: usize,
    ) where
        SampleType: Sample + FromSample<f32>,
    {
        // Lock the state once for the entire buffer
        let mut guard = match state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        for frame in output.chunks_mut(num_channels) {
            let value = if guard.playing {
                let gain = guard.volume;
                guard.siren.tick() * gain
            } else {
                0.0
            };

            let value: SampleType = SampleType::from_sample(value);
            for sample in frame.iter_mut() {
                *sample = value;
            }
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ToneState) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Set the siren pitch range and sweep rate
    pub fn set_sweep(&mut self, low_hz: f32, high_hz: f32, sweep_hz: f32) {
        self.with_state(|state| state.siren.set_sweep(low_hz, high_hz, sweep_hz));
    }

    /// Get the device sample rate
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

#[cfg(feature = "native")]
impl AudioSink for CpalSink {
    fn play(&mut self) {
        self.with_state(|state| {
            if !state.playing {
                state.siren.reset();
            }
            state.playing = true;
        });
    }

    fn stop(&mut self) {
        self.with_state(|state| state.playing = false);
    }

    fn is_playing(&self) -> bool {
        self.with_state(|state| state.playing)
    }

    fn volume(&self) -> f32 {
        self.with_state(|state| state.volume)
    }

    fn set_volume(&mut self, volume: f32) {
        self.with_state(|state| state.volume = volume.clamp(0.0, 1.0));
    }
}
