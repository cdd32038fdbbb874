//! Unsplash-backed image search

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

use shared::{ApiFailure, ImageReference};

use crate::config::DesignerConfig;
use crate::error::{DesignerError, DesignerResult};
use crate::services::{http_client, transport_failure};
use crate::traits::ImageSearchProvider;

/// Unsplash caps `per_page` at 30
const MAX_PER_PAGE: usize = 30;

/// Crop parameters appended to every returned image URL
const IMAGE_PARAMS: &[(&str, &str)] = &[("auto", "format"), ("fit", "crop"), ("w", "800"), ("q", "80")];

pub struct UnsplashImageSearch {
    client: reqwest::Client,
    access_key: String,
    base_url: String,
}

impl UnsplashImageSearch {
    pub fn new(access_key: String, base_url: String, timeout: Duration) -> DesignerResult<Self> {
        let client = http_client(timeout)
            .map_err(|e| DesignerError::config(format!("Failed to build image search HTTP client: {e}")))?;

        Ok(Self {
            client,
            access_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &DesignerConfig) -> DesignerResult<Self> {
        Self::new(config.image_api_key.clone(), config.image_base_url.clone(), config.request_timeout)
    }

    fn search_url(&self, query: &str, limit: usize) -> Result<Url, ApiFailure> {
        let mut url = Url::parse(&format!("{}/search/photos", self.base_url))
            .map_err(|e| ApiFailure::NetworkError(format!("Invalid image search URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("per_page", &limit.min(MAX_PER_PAGE).to_string())
            .append_pair("orientation", "landscape");
        Ok(url)
    }

    fn parse_result(result: &serde_json::Value) -> Option<ImageReference> {
        let urls = result.get("urls")?;
        let raw = urls
            .get("raw")
            .or_else(|| urls.get("regular"))
            .and_then(|u| u.as_str())?;

        let mut image_url = Url::parse(raw).ok()?;
        {
            let mut pairs = image_url.query_pairs_mut();
            for (key, value) in IMAGE_PARAMS {
                pairs.append_pair(key, value);
            }
        }

        let photographer = result
            .get("user")
            .and_then(|user| user.get("name"))
            .and_then(|name| name.as_str())
            .unwrap_or("Unknown photographer");

        let source_url = result
            .get("links")
            .and_then(|links| links.get("html"))
            .and_then(|html| html.as_str())
            .map(str::to_string);

        Some(ImageReference {
            url: image_url.to_string(),
            attribution: format!("Photo by {photographer} on Unsplash"),
            source_url,
        })
    }
}

#[async_trait]
impl ImageSearchProvider for UnsplashImageSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ImageReference>, ApiFailure> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let url = self.search_url(query, limit)?;
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiFailure::from_status(status.as_u16(), status.to_string()));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiFailure::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let results = response_json
            .get("results")
            .and_then(|results| results.as_array())
            .ok_or_else(|| ApiFailure::InvalidResponse("No results in response".to_string()))?;

        let images: Vec<ImageReference> = results.iter().filter_map(Self::parse_result).take(limit).collect();

        debug!(query = %query, returned = images.len(), "Image search completed");
        Ok(images)
    }
}
