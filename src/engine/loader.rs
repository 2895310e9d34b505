//! Image loading for local previews
//!
//! Template and design images are fetched and decoded as two independent
//! futures. Decoding runs on the blocking pool so async workers stay free.
//! Fetched template bytes are cached per URL since every preview of a session
//! redraws the same reference image.

use std::time::Duration;

use bytes::Bytes;
use dashmap::DashMap;
use image::DynamicImage;
use thiserror::Error;
use tracing::{debug, warn};

/// Image loading errors
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("Failed to fetch image: {0}")]
    FetchFailed(String),
    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),
}

/// Where an image comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    Url(String),
    Bytes(Bytes),
}

/// Fetches and decodes preview inputs
pub struct ImageLoader {
    http_client: reqwest::Client,
    cache: DashMap<String, Bytes>,
    max_cached: usize,
}

impl ImageLoader {
    /// Create a new loader
    pub fn new(timeout: Duration, max_cached: usize) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mockup-studio/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(ImageLoader {
            http_client,
            cache: DashMap::new(),
            max_cached,
        })
    }

    /// Number of cached URLs
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Load and decode an image
    pub async fn load(&self, source: &ImageSource) -> Result<DynamicImage, LoadError> {
        let data = match source {
            ImageSource::Bytes(data) => data.clone(),
            ImageSource::Url(url) => self.fetch(url).await?,
        };
        decode(data).await
    }

    /// Load the template and (optionally) the design concurrently.
    ///
    /// Both futures always resolve; a failure on one side never hides the
    /// result of the other.
    pub async fn load_pair(
        &self,
        template: &ImageSource,
        design: Option<&ImageSource>,
    ) -> (Result<DynamicImage, LoadError>, Option<Result<DynamicImage, LoadError>>) {
        let template_fut = self.load(template);
        let design_fut = async {
            match design {
                Some(source) => Some(self.load(source).await),
                None => None,
            }
        };

        futures::join!(template_fut, design_fut)
    }

    /// Fetch raw bytes, served from the cache when present
    pub async fn fetch(&self, url: &str) -> Result<Bytes, LoadError> {
        if let Some(hit) = self.cache.get(url) {
            debug!(url = %url, "Image cache hit");
            return Ok(hit.value().clone());
        }

        debug!(url = %url, "Fetching image");

        let response = self.http_client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LoadError::FetchFailed(format!(
                "HTTP {}: {}",
                response.status(),
                url
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| LoadError::FetchFailed(e.to_string()))?;

        if self.cache.len() >= self.max_cached {
            warn!(entries = self.cache.len(), "Image cache full, clearing");
            self.cache.clear();
        }
        self.cache.insert(url.to_string(), data.clone());

        Ok(data)
    }
}

/// Decode bytes on the blocking pool
pub async fn decode(data: Bytes) -> Result<DynamicImage, LoadError> {
    tokio::task::spawn_blocking(move || image::load_from_memory(&data))
        .await
        .map_err(|e| LoadError::DecodeFailed(format!("Task join error: {}", e)))?
        .map_err(|e| LoadError::DecodeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Bytes {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buffer, ImageOutputFormat::Png)
            .unwrap();
        Bytes::from(buffer.into_inner())
    }

    fn loader() -> ImageLoader {
        ImageLoader::new(Duration::from_secs(1), 8).unwrap()
    }

    #[tokio::test]
    async fn test_load_bytes() {
        let img = loader().load(&ImageSource::Bytes(png(4, 3))).await.unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
    }

    #[tokio::test]
    async fn test_pair_resolves_both_sides_on_failure() {
        let loader = loader();
        let template = ImageSource::Bytes(png(8, 8));
        let broken = ImageSource::Bytes(Bytes::from_static(b"not an image"));

        let (template, design) = loader.load_pair(&template, Some(&broken)).await;
        assert!(template.is_ok());
        assert!(matches!(design, Some(Err(LoadError::DecodeFailed(_)))));

        let (template, design) = loader.load_pair(&broken, None).await;
        assert!(template.is_err());
        assert!(design.is_none());
    }

    #[test]
    fn test_unreachable_url_is_fetch_error() {
        let loader = loader();
        let result = tokio_test::block_on(loader.load(&ImageSource::Url("http://127.0.0.1:1/a.png".to_string())));
        assert!(matches!(result, Err(LoadError::FetchFailed(_))));
        assert_eq!(loader.cached_count(), 0);
    }
}
