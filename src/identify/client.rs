use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{CandidateGroup, IdentificationResult, IdentifyError, Release};
use crate::config::Config;

/// Client for the submit / poll recognition protocol.
///
/// Identification is strictly sequential: one sample is submitted, the
/// returned token is polled until the verdict stops being "wait", and the
/// verdict is resolved to a single release. At most one identification is in
/// flight at any time; the session guarantees that by construction.
pub struct RecognitionClient {
    http: Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    max_polls: u32,
}

#[derive(Deserialize)]
struct SubmitResponse {
    token: String,
}

#[derive(Deserialize)]
struct PollResponse {
    result: String,
    #[serde(default)]
    data: Vec<RawGroup>,
}

#[derive(Deserialize)]
struct RawGroup {
    #[serde(default)]
    tracks: Vec<Vec<Value>>,
}

/// Interpreted poll verdict.
#[derive(Debug)]
pub enum PollOutcome {
    Pending,
    NotFound,
    Found(Vec<CandidateGroup>),
}

impl RecognitionClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: config.recognition.base_url.clone(),
            api_key: config.recognition.api_key.clone(),
            poll_interval: config.poll_interval,
            max_polls: config.max_polls,
        }
    }

    /// Submit the sample and return the continuation token.
    pub async fn submit(&self, wav: Vec<u8>) -> Result<String, IdentifyError> {
        let file = Part::bytes(wav)
            .file_name("sample.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .text("action", "identify")
            .text("apikey", self.api_key.clone())
            .part("file", file);

        let body = self
            .http
            .post(&self.base_url)
            .multipart(form)
            .send()
            .await?
            .text()
            .await?;

        parse_submit(&body)
    }

    /// One poll of the verdict for `token`.
    pub async fn poll(&self, token: &str) -> Result<PollOutcome, IdentifyError> {
        let body = self
            .http
            .post(&self.base_url)
            .form(&[
                ("action", "get_result"),
                ("token", token),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .text()
            .await?;

        parse_poll(&body)
    }

    /// Full identification: submit, poll until the service stops reporting
    /// "wait" (sleeping the configured interval between polls, up to the
    /// configured cap), then resolve the verdict to a single release.
    pub async fn identify(&self, wav: &[u8]) -> Result<IdentificationResult, IdentifyError> {
        info!("Identifying song...");
        let token = self.submit(wav.to_vec()).await?;
        debug!("Recognition token: {}", token);

        let mut polls: u32 = 0;
        loop {
            match self.poll(&token).await? {
                PollOutcome::Pending => {
                    polls += 1;
                    if polls >= self.max_polls {
                        return Err(IdentifyError::Timeout(polls));
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                PollOutcome::NotFound => return Ok(IdentificationResult::not_found()),
                PollOutcome::Found(groups) => {
                    let release = match super::resolve::earliest_release(&groups) {
                        Some(release) => release,
                        None => {
                            // "found" with zero usable candidates is undefined
                            // input; downgrade to not-found rather than abort.
                            warn!("Verdict 'found' carried no candidates; treating as not found");
                            return Ok(IdentificationResult::not_found());
                        }
                    };
                    return Ok(IdentificationResult {
                        found: true,
                        song: release.song.clone(),
                        artist: release.artist.clone(),
                        album: super::resolve::clean_album_title(&release.album),
                    });
                }
            }
        }
    }
}

/// Parse the submit response body into the continuation token.
pub fn parse_submit(body: &str) -> Result<String, IdentifyError> {
    let resp: SubmitResponse = serde_json::from_str(body)
        .map_err(|e| IdentifyError::Malformed(format!("submit response: {}", e)))?;
    Ok(resp.token)
}

/// Parse a get_result response body into a verdict.
///
/// The found payload is one entry per matched song, each listing track rows
/// as positional arrays `[song, artist, album, ..., year]` with the release
/// year in the final position (either a number or a numeric string).
pub fn parse_poll(body: &str) -> Result<PollOutcome, IdentifyError> {
    let resp: PollResponse = serde_json::from_str(body)
        .map_err(|e| IdentifyError::Malformed(format!("poll response: {}", e)))?;

    match resp.result.as_str() {
        "wait" => Ok(PollOutcome::Pending),
        "not found" => Ok(PollOutcome::NotFound),
        "found" => {
            let mut groups = Vec::with_capacity(resp.data.len());
            for raw in resp.data {
                let mut group = CandidateGroup::default();
                for row in raw.tracks {
                    group.releases.push(parse_track_row(&row)?);
                }
                groups.push(group);
            }
            Ok(PollOutcome::Found(groups))
        }
        other => Err(IdentifyError::Malformed(format!(
            "unknown verdict '{}'",
            other
        ))),
    }
}

fn parse_track_row(row: &[Value]) -> Result<Release, IdentifyError> {
    if row.len() < 4 {
        return Err(IdentifyError::Malformed(format!(
            "track row has {} fields, expected at least 4",
            row.len()
        )));
    }
    let field = |idx: usize, name: &str| -> Result<String, IdentifyError> {
        row[idx]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| IdentifyError::Malformed(format!("track {} is not a string", name)))
    };
    // Positional layout; the year is always the final element.
    let year = match row.last() {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(|y| y as i32)
            .ok_or_else(|| IdentifyError::Malformed("release year not integral".into()))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| IdentifyError::Malformed(format!("release year '{}'", s)))?,
        _ => return Err(IdentifyError::Malformed("release year missing".into())),
    };

    Ok(Release {
        song: field(0, "song")?,
        artist: field(1, "artist")?,
        album: field(2, "album")?,
        year,
    })
}
