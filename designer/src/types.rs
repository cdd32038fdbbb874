//! Designer-specific data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{FormSnapshot, ImageReference};
use std::fmt;

/// Deterministic cache key derived from a `FormSnapshot`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn from_hex(hex: String) -> Self {
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First characters only, for log lines
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the collaborators produce for one snapshot
#[derive(Clone, Debug, PartialEq)]
pub struct DesignOutput {
    pub generated_text: String,
    pub image_results: Vec<ImageReference>,
}

/// A stored generation result, one per fingerprint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub generated_text: String,
    pub image_results: Vec<ImageReference>,
    pub snapshot: FormSnapshot,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(fingerprint: Fingerprint, snapshot: FormSnapshot, output: DesignOutput) -> Self {
        Self {
            fingerprint,
            generated_text: output.generated_text,
            image_results: output.image_results,
            snapshot,
            created_at: Utc::now(),
        }
    }
}

/// Cache hit/miss counters
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// Result of a submit: the entry plus whether it came from the cache
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub entry: CacheEntry,
    pub cached: bool,
}

/// A rendered design ready to be saved as a file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: String,
}
