//! Credential and endpoint configuration
//!
//! Credentials are read from the process environment after loading a `.env`
//! file if one is present. Environment variables take precedence over the
//! file. Both keys are required; startup fails before anything is served
//! when either is missing.
//!
//! ## Required Keys
//! - `GOOGLE_API_KEY`: design-text generator (Gemini)
//! - `UNSPLASH_ACCESS_KEY`: image search (Unsplash)
//!
//! ## Optional Keys
//! - `GEMINI_MODEL`, `GEMINI_BASE_URL`, `UNSPLASH_BASE_URL`

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::core::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::{DesignerError, DesignerResult};
use crate::session::SessionSettings;

pub const GENERATOR_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const IMAGE_KEY_VAR: &str = "UNSPLASH_ACCESS_KEY";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_IMAGES: usize = 3;

#[derive(Clone)]
pub struct DesignerConfig {
    pub generator_api_key: String,
    pub image_api_key: String,
    pub generator_model: String,
    pub generator_base_url: String,
    pub image_base_url: String,
    pub request_timeout: Duration,
    pub max_images: usize,
    pub cache_capacity: usize,
}

impl DesignerConfig {
    const REQUIRED_KEYS: &'static [&'static str] = &[GENERATOR_KEY_VAR, IMAGE_KEY_VAR];

    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> DesignerResult<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read a specific env file; process variables still win
    pub fn from_env_file(path: impl AsRef<Path>) -> DesignerResult<Self> {
        let path = path.as_ref();
        let file_vars: HashMap<String, String> = dotenvy::from_path_iter(path)
            .map_err(|e| DesignerError::config(format!("Failed to read {}: {e}", path.display())))?
            .collect::<Result<_, _>>()
            .map_err(|e| DesignerError::config(format!("Failed to parse {}: {e}", path.display())))?;

        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file_vars.get(key).cloned()))
    }

    /// Build from any key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> DesignerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing: Vec<&str> = Self::REQUIRED_KEYS.iter().copied().filter(|&key| read(key).is_none()).collect();
        if !missing.is_empty() {
            return Err(DesignerError::config(format!(
                "Missing required API keys: {}. These keys must be set as environment variables.",
                missing.join(", ")
            )));
        }

        Ok(Self {
            generator_api_key: read(GENERATOR_KEY_VAR).unwrap_or_default(),
            image_api_key: read(IMAGE_KEY_VAR).unwrap_or_default(),
            generator_model: read("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            generator_base_url: read("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            image_base_url: read("UNSPLASH_BASE_URL").unwrap_or_else(|| DEFAULT_UNSPLASH_BASE_URL.to_string()),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_images: DEFAULT_MAX_IMAGES,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_images(mut self, max_images: usize) -> Self {
        self.max_images = max_images;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            request_timeout: self.request_timeout,
            max_images: self.max_images,
            cache_capacity: self.cache_capacity,
        }
    }
}

impl fmt::Debug for DesignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesignerConfig")
            .field("generator_api_key", &"<redacted>")
            .field("image_api_key", &"<redacted>")
            .field("generator_model", &self.generator_model)
            .field("generator_base_url", &self.generator_base_url)
            .field("image_base_url", &self.image_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("max_images", &self.max_images)
            .field("cache_capacity", &self.cache_capacity)
            .finish()
    }
}
