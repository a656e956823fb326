use std::path::PathBuf;
use std::time::Duration;

/// Endpoint + credentials for one of the external services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Immutable runtime configuration, built once in `main` and passed by
/// reference into every component constructor. There is no CLI surface;
/// everything except the API keys is a compiled-in default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for the single-slot transient artifacts (sample.wav, artwork.jpg).
    pub scratch_dir: PathBuf,
    /// Input device name as reported by the host; `None` picks the default input.
    pub input_device: Option<String>,
    /// Peak-magnitude threshold. A frame with any sample at or above this is sound.
    pub silence_threshold: u16,
    /// Samples per frame (one device read).
    pub frame_samples: usize,
    /// Length of the time-boxed capture window in seconds.
    pub record_secs: u32,
    pub sample_rate: u32,
    pub channels: u16,
    /// Square bound for the placeholder and the rendered artwork.
    pub display_dim: u32,
    /// Song recognition service (submit / poll protocol).
    pub recognition: ServiceConfig,
    /// Album metadata service (cover art lookup).
    pub metadata: ServiceConfig,
    /// Wait between result polls while the service reports "wait".
    pub poll_interval: Duration,
    /// Cap on result polls before the episode is abandoned.
    pub max_polls: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir(),
            input_device: None,
            silence_threshold: 512,
            frame_samples: 1024,
            record_secs: 15,
            sample_rate: 16_000,
            channels: 1,
            display_dim: 500,
            recognition: ServiceConfig {
                base_url: "https://audiotag.info/api".to_string(),
                api_key: String::new(),
            },
            metadata: ServiceConfig {
                base_url: "http://ws.audioscrobbler.com/2.0/".to_string(),
                api_key: String::new(),
            },
            poll_interval: Duration::from_secs(1),
            max_polls: 120,
        }
    }
}

impl Config {
    /// Build the default config with API keys taken from the environment
    /// (`SPINDLE_AUDIOTAG_KEY`, `SPINDLE_LASTFM_KEY`).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("SPINDLE_AUDIOTAG_KEY") {
            config.recognition.api_key = key;
        }
        if let Ok(key) = std::env::var("SPINDLE_LASTFM_KEY") {
            config.metadata.api_key = key;
        }
        config
    }

    /// Frames captured after the trigger frame. The trigger frame itself is
    /// kept as the first frame of the sample, so the recorded length is
    /// `frames_per_capture() + 1` frames.
    pub fn frames_per_capture(&self) -> usize {
        (self.sample_rate as usize * self.record_secs as usize) / self.frame_samples
    }
}
