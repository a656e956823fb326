use image::{DynamicImage, GenericImageView, ImageFormat};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("metadata transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed metadata response: {0}")]
    Malformed(String),
    #[error("failed to persist artwork artifact: {0}")]
    Persist(#[from] image::ImageError),
}

/// Cover art for the current episode: either the downloaded image or the
/// synthesized blank placeholder. Overwritten every cycle.
pub struct Artwork {
    pub image: DynamicImage,
    pub placeholder: bool,
}

/// Deterministic blank placeholder: a zero-valued RGB square.
pub fn placeholder(dim: u32) -> DynamicImage {
    DynamicImage::new_rgb8(dim, dim)
}

#[derive(Deserialize)]
struct AlbumInfoResponse {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    album: Option<AlbumInfo>,
}

#[derive(Deserialize)]
struct AlbumInfo {
    #[serde(default)]
    image: Vec<ImageEntry>,
}

#[derive(Deserialize)]
struct ImageEntry {
    #[serde(rename = "#text", default)]
    url: String,
}

/// Looks up cover art by exact artist/album strings and keeps the single-slot
/// artwork artifact current.
pub struct ArtworkFetcher {
    http: Client,
    base_url: String,
    api_key: String,
    dimension: u32,
    scratch_dir: PathBuf,
}

impl ArtworkFetcher {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::builder()
                .user_agent("spindle/0.1")
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: config.metadata.base_url.clone(),
            api_key: config.metadata.api_key.clone(),
            dimension: config.display_dim,
            scratch_dir: config.scratch_dir.clone(),
        }
    }

    /// Fetch cover art for the resolved artist/album. No match, an empty
    /// image listing, or a failed download all degrade to the placeholder;
    /// only transport failure on the lookup itself (or an unparseable
    /// response) aborts the episode.
    pub async fn fetch(&self, artist: &str, album: &str) -> Result<Artwork, ArtworkError> {
        info!("Fetching album art for '{}' / '{}'", artist, album);

        let body = self
            .http
            .get(&self.base_url)
            .query(&[
                ("method", "album.getInfo"),
                ("artist", artist),
                ("album", album),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?
            .text()
            .await?;

        let image = match choose_image_url(&body)? {
            Some(url) => self.download(&url).await,
            None => {
                info!("No metadata match; using placeholder art");
                None
            }
        };

        let (image, is_placeholder) = match image {
            Some(img) => (img, false),
            None => (placeholder(self.dimension), true),
        };

        persist(&image, &self.scratch_dir)?;
        Ok(Artwork {
            image,
            placeholder: is_placeholder,
        })
    }

    async fn download(&self, url: &str) -> Option<DynamicImage> {
        let bytes = match self.http.get(url).send().await {
            Ok(resp) => match resp.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Artwork download failed: {}", e);
                    return None;
                }
            },
            Err(e) => {
                warn!("Artwork download failed: {}", e);
                return None;
            }
        };
        match image::load_from_memory(&bytes) {
            Ok(img) => {
                debug!("Downloaded artwork {}x{}", img.width(), img.height());
                Some(img)
            }
            Err(e) => {
                warn!("Artwork decode failed: {}", e);
                None
            }
        }
    }
}

/// Extract the URI of the largest image variant from an album.getInfo
/// response. The service lists variants in ascending size order, so the last
/// entry wins. `Ok(None)` is the no-match path (error field, missing album,
/// empty listing, or a blank final URI).
pub fn choose_image_url(body: &str) -> Result<Option<String>, ArtworkError> {
    let resp: AlbumInfoResponse = serde_json::from_str(body)
        .map_err(|e| ArtworkError::Malformed(e.to_string()))?;
    if resp.error.is_some() {
        return Ok(None);
    }
    let album = match resp.album {
        Some(album) => album,
        None => return Ok(None),
    };
    Ok(album
        .image
        .last()
        .map(|entry| entry.url.clone())
        .filter(|url| !url.is_empty()))
}

/// Write the single-slot `artwork.jpg`, replacing the previous episode's.
/// Downloaded covers may carry alpha, so everything is flattened to RGB
/// before the JPEG encode.
fn persist(img: &DynamicImage, scratch_dir: &Path) -> Result<(), image::ImageError> {
    let path = scratch_dir.join("artwork.jpg");
    DynamicImage::ImageRgb8(img.to_rgb8()).save_with_format(&path, ImageFormat::Jpeg)?;
    debug!("Artwork artifact -> {}", path.display());
    Ok(())
}
