use ringbuf::traits::Split;
use ringbuf::HeapRb;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::artwork::{ArtworkError, ArtworkFetcher};
use crate::audio::recorder::PersistError;
use crate::audio::{persist, AudioCapture, AudioError, FrameCursor, RecordedSample, SampleBuilder, SampleHandle, SilenceGate};
use crate::config::Config;
use crate::display::InfoDisplay;
use crate::identify::{IdentificationResult, IdentifyError, RecognitionClient};

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Identify(#[from] IdentifyError),
    #[error(transparent)]
    Artwork(#[from] ArtworkError),
    #[error("display: {0}")]
    Render(#[source] anyhow::Error),
}

impl CycleError {
    /// Device and render failures end the run; service failures abort the
    /// episode and monitoring resumes on the next cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CycleError::Audio(_) | CycleError::Render(_))
    }
}

#[derive(Debug)]
pub enum CycleOutcome {
    Identified(IdentificationResult),
    NotFound,
    Cancelled,
}

/// One full cycle from silence-break trigger through recording,
/// identification, artwork fetch, and render. Strictly sequential: the audio
/// stream is closed before identification starts (audio arriving while a
/// verdict is pending is dropped, not buffered) and reopened fresh for the
/// next cycle, which also resets any stream-level error state.
pub struct Session<D: InfoDisplay> {
    config: Config,
    recognizer: RecognitionClient,
    artwork: ArtworkFetcher,
    display: D,
    shutdown: CancellationToken,
}

impl<D: InfoDisplay> Session<D> {
    pub fn new(config: Config, display: D, shutdown: CancellationToken) -> Self {
        let recognizer = RecognitionClient::new(&config);
        let artwork = ArtworkFetcher::new(&config);
        Self {
            config,
            recognizer,
            artwork,
            display,
            shutdown,
        }
    }

    /// Run cycles until cancelled. Starts blank, like a turntable with the
    /// needle up.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.display.render_blank().map_err(CycleError::Render)?;
        info!("Listening for sound on the audio port...");

        while !self.shutdown.is_cancelled() {
            match self.run_cycle().await {
                Ok(CycleOutcome::Cancelled) => break,
                Ok(outcome) => {
                    info!("Episode complete: {}", outcome_label(&outcome));
                }
                Err(e) if e.is_fatal() => {
                    error!("Fatal error, stopping session: {}", e);
                    return Err(e.into());
                }
                Err(e) => {
                    warn!("Episode aborted, resuming monitoring: {}", e);
                }
            }
        }
        info!("Session stopped");
        Ok(())
    }

    async fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        let episode = Uuid::new_v4();

        let sample = match self.record_episode(episode).await? {
            Some(sample) => sample,
            None => return Ok(CycleOutcome::Cancelled),
        };
        // The capture (and its stream) is gone by now; identification owns
        // the rest of the cycle.
        let handle = persist(&sample, &self.config.scratch_dir)?;

        finish_episode(
            episode,
            &handle,
            &self.recognizer,
            &self.artwork,
            &mut self.display,
        )
        .await
    }

    /// Open the stream, wait for sound to break silence, then capture the
    /// time-boxed window. Returns `None` on shutdown. The capture is dropped
    /// on return, closing the stream.
    async fn record_episode(&self, episode: Uuid) -> Result<Option<RecordedSample>, CycleError> {
        let ring = HeapRb::<i16>::new(self.config.frame_samples * 8);
        let (producer, consumer) = ring.split();
        let capture = AudioCapture::new(&self.config, producer)?;
        let mut cursor = FrameCursor::new(consumer, self.config.frame_samples, capture.failure_flag());
        let mut gate = SilenceGate::new(self.config.silence_threshold);
        let mut builder = SampleBuilder::new(
            self.config.sample_rate,
            self.config.channels,
            self.config.frames_per_capture() + 1,
            self.config.frame_samples,
        );

        // Idle: classify frames until one breaks silence. That frame is the
        // first frame of the recording.
        loop {
            let frame = tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(None),
                frame = cursor.next_frame() => frame?,
            };
            if gate.observe(frame) {
                info!(
                    episode = %episode,
                    "Recording audio... (sound after {} silent frames)",
                    gate.silent_run()
                );
                builder.push_frame(frame);
                break;
            }
        }

        // Triggered: committed to the fixed window regardless of content.
        for _ in 0..self.config.frames_per_capture() {
            let frame = tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(None),
                frame = cursor.next_frame() => frame?,
            };
            builder.push_frame(frame);
        }

        Ok(Some(builder.finish()))
    }
}

/// Identification half of an episode: identify the persisted sample, fetch
/// art for a hit, and hand the verdict to the display. Split out so the
/// protocol-to-display flow is exercisable without a live audio device.
pub async fn finish_episode<D: InfoDisplay>(
    episode: Uuid,
    handle: &SampleHandle,
    recognizer: &RecognitionClient,
    artwork: &ArtworkFetcher,
    display: &mut D,
) -> Result<CycleOutcome, CycleError> {
    let verdict = recognizer.identify(&handle.wav).await?;

    if verdict.found {
        info!(
            episode = %episode,
            "Song found :) {} / {} / {}",
            verdict.song, verdict.artist, verdict.album
        );
        let art = artwork.fetch(&verdict.artist, &verdict.album).await?;
        display
            .render_result(&verdict, &art)
            .map_err(CycleError::Render)?;
        Ok(CycleOutcome::Identified(verdict))
    } else {
        info!(episode = %episode, "Song not found :(");
        display.render_blank().map_err(CycleError::Render)?;
        Ok(CycleOutcome::NotFound)
    }
}

fn outcome_label(outcome: &CycleOutcome) -> &'static str {
    match outcome {
        CycleOutcome::Identified(_) => "identified",
        CycleOutcome::NotFound => "not found",
        CycleOutcome::Cancelled => "cancelled",
    }
}
