use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::{Consumer, Observer, Producer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no input device available")]
    NoDevice,
    #[error("input device '{0}' not found")]
    DeviceNotFound(String),
    #[error("device does not support {0} Hz capture")]
    UnsupportedRate(u32),
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),
    #[error("audio stream failed")]
    StreamFailed,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Owns the live cpal input stream. The callback downmixes the device's
/// native layout to mono i16 and pushes into the ring buffer; dropping the
/// struct closes the stream, which is how the session ends each cycle.
pub struct AudioCapture {
    _stream: cpal::Stream,
    pub sample_rate: u32,
    failed: Arc<AtomicBool>,
}

impl AudioCapture {
    pub fn new<P>(config: &Config, mut producer: P) -> Result<Self, AudioError>
    where
        P: Producer<Item = i16> + Send + 'static,
    {
        let host = cpal::default_host();
        let device = match &config.input_device {
            Some(name) => {
                let mut devices = host
                    .input_devices()
                    .map_err(|e| AudioError::Backend(e.into()))?;
                devices
                    .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                    .ok_or_else(|| AudioError::DeviceNotFound(name.clone()))?
            }
            None => host.default_input_device().ok_or(AudioError::NoDevice)?,
        };

        info!("Audio Input Device: {}", device.name().unwrap_or_default());

        // Find a supported config range covering the target rate. The pipeline
        // runs at one fixed rate end to end, so an unsupported device is fatal.
        let target_rate = config.sample_rate;
        let mut selected = None;
        let ranges = device
            .supported_input_configs()
            .map_err(|e| AudioError::Backend(e.into()))?;
        for range in ranges {
            if range.min_sample_rate().0 <= target_rate && range.max_sample_rate().0 >= target_rate {
                selected = Some(range.with_sample_rate(cpal::SampleRate(target_rate)));
                break;
            }
        }
        let selected = selected.ok_or(AudioError::UnsupportedRate(target_rate))?;
        let channels = selected.channels() as usize;

        info!(
            "Audio Config Selected: Rate={}Hz, NativeChannels={}",
            target_rate, channels
        );

        let failed = Arc::new(AtomicBool::new(false));
        let failed_cb = failed.clone();
        let err_fn = move |err| {
            error!("an error occurred on stream: {}", err);
            failed_cb.store(true, Ordering::Relaxed);
        };

        let stream = match selected.sample_format() {
            cpal::SampleFormat::I16 => device
                .build_input_stream(
                    &selected.into(),
                    move |data: &[i16], _: &_| {
                        push_downmixed_i16(data, channels, &mut producer);
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| AudioError::Backend(e.into()))?,
            cpal::SampleFormat::F32 => device
                .build_input_stream(
                    &selected.into(),
                    move |data: &[f32], _: &_| {
                        push_downmixed_f32(data, channels, &mut producer);
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| AudioError::Backend(e.into()))?,
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        };

        stream.play().map_err(|e| AudioError::Backend(e.into()))?;

        Ok(Self {
            _stream: stream,
            sample_rate: target_rate,
            failed,
        })
    }

    pub fn failure_flag(&self) -> Arc<AtomicBool> {
        self.failed.clone()
    }
}

fn push_downmixed_i16<P>(input: &[i16], channels: usize, producer: &mut P)
where
    P: Producer<Item = i16>,
{
    // If the producer is full we drop input (lossy); the monitor loop is
    // expected to keep up while a capture is live.
    for frame in input.chunks(channels.max(1)) {
        let sum: i32 = frame.iter().map(|&s| s as i32).sum();
        let _ = producer.try_push((sum / frame.len() as i32) as i16);
    }
}

fn push_downmixed_f32<P>(input: &[f32], channels: usize, producer: &mut P)
where
    P: Producer<Item = i16>,
{
    for frame in input.chunks(channels.max(1)) {
        let sum: f32 = frame.iter().sum();
        let mono = (sum / frame.len() as f32).clamp(-1.0, 1.0);
        let _ = producer.try_push((mono * i16::MAX as f32) as i16);
    }
}

/// Pops fixed-size frames off the ring buffer, sleeping briefly while less
/// than a full frame is buffered. One cursor lives per cycle, alongside the
/// capture whose consumer half it owns.
pub struct FrameCursor<C>
where
    C: Consumer<Item = i16>,
{
    consumer: C,
    frame: Vec<i16>,
    failed: Arc<AtomicBool>,
}

impl<C> FrameCursor<C>
where
    C: Consumer<Item = i16>,
{
    pub fn new(consumer: C, frame_samples: usize, failed: Arc<AtomicBool>) -> Self {
        Self {
            consumer,
            frame: vec![0; frame_samples],
            failed,
        }
    }

    /// Wait until a full frame is available, then return it. The returned
    /// slice is valid until the next call.
    pub async fn next_frame(&mut self) -> Result<&[i16], AudioError> {
        loop {
            if self.failed.load(Ordering::Relaxed) {
                return Err(AudioError::StreamFailed);
            }
            if self.consumer.occupied_len() >= self.frame.len() {
                let popped = self.consumer.pop_slice(&mut self.frame);
                debug_assert_eq!(popped, self.frame.len());
                return Ok(&self.frame);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
