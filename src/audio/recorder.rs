use std::io::Cursor;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("wav encode failed: {0}")]
    Encode(#[from] hound::Error),
    #[error("failed to write sample artifact: {0}")]
    Write(#[from] std::io::Error),
}

/// Audio collected during one recording episode: the trigger frame plus the
/// fixed capture window, flattened to one mono i16 buffer.
#[derive(Debug, Clone)]
pub struct RecordedSample {
    pub samples: Vec<i16>,
    pub frames: usize,
    pub sample_rate: u32,
    pub channels: u16,
}

impl RecordedSample {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// Encode as a 16-bit signed PCM WAV in memory.
    pub fn encode_wav(&self) -> Result<Vec<u8>, hound::Error> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in &self.samples {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

/// Accumulates frames for the current episode. The caller pushes the trigger
/// frame first, then exactly `frames_per_capture()` subsequent frames,
/// regardless of how those frames classify.
pub struct SampleBuilder {
    samples: Vec<i16>,
    frames: usize,
    sample_rate: u32,
    channels: u16,
}

impl SampleBuilder {
    pub fn new(sample_rate: u32, channels: u16, expected_frames: usize, frame_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(expected_frames * frame_samples),
            frames: 0,
            sample_rate,
            channels,
        }
    }

    pub fn push_frame(&mut self, frame: &[i16]) {
        self.samples.extend_from_slice(frame);
        self.frames += 1;
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn finish(self) -> RecordedSample {
        RecordedSample {
            samples: self.samples,
            frames: self.frames,
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

/// The persisted single-slot sample artifact plus the encoded bytes. The
/// bytes are what travels to the recognition service; the file exists so the
/// last sample is inspectable (and is overwritten every episode).
pub struct SampleHandle {
    pub path: PathBuf,
    pub wav: Vec<u8>,
}

/// Write the sample to `<scratch_dir>/sample.wav`, replacing whatever the
/// previous episode left there.
pub fn persist(sample: &RecordedSample, scratch_dir: &Path) -> Result<SampleHandle, PersistError> {
    let wav = sample.encode_wav()?;
    let path = scratch_dir.join("sample.wav");
    std::fs::write(&path, &wav)?;
    info!(
        "Recorded {:.1}s sample ({} frames) -> {}",
        sample.duration_secs(),
        sample.frames,
        path.display()
    );
    Ok(SampleHandle { path, wav })
}
