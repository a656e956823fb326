pub mod client;
pub mod resolve;

use serde::Serialize;
use thiserror::Error;

pub use client::{parse_poll, parse_submit, PollOutcome, RecognitionClient};
pub use resolve::{clean_album_title, earliest_release};

#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error("recognition transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed recognition response: {0}")]
    Malformed(String),
    #[error("recognition service still pending after {0} polls")]
    Timeout(u32),
}

/// One album release of a matched song, as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub song: String,
    pub artist: String,
    pub album: String,
    pub year: i32,
}

/// All releases the service associates with one matched song title.
#[derive(Debug, Clone, Default)]
pub struct CandidateGroup {
    pub releases: Vec<Release>,
}

/// Verdict of one recording episode. Computed once, handed to the artwork
/// fetcher and the display, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentificationResult {
    pub found: bool,
    pub song: String,
    pub artist: String,
    pub album: String,
}

impl IdentificationResult {
    pub fn not_found() -> Self {
        Self {
            found: false,
            song: String::new(),
            artist: String::new(),
            album: String::new(),
        }
    }
}
