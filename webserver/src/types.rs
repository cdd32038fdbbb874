//! Type definitions for webserver
//!
//! Response bodies for the JSON API. Requests reuse the shared patch types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use designer::{CacheEntry, CacheStats, Submission};
use shared::{FormSnapshot, ImageReference, RoomEntry, SessionId};

/// Standard success envelope: `{"status": "ok", "data": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { status: "ok".to_string(), data }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormView {
    pub session_id: SessionId,
    pub form: FormSnapshot,
    /// Required fields still empty; submit is rejected until this is empty
    pub missing_fields: Vec<String>,
}

impl FormView {
    pub fn new(session_id: SessionId, form: FormSnapshot) -> Self {
        let missing_fields = form.missing_fields();
        Self { session_id, form, missing_fields }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomView {
    pub index: usize,
    pub room: RoomEntry,
    pub room_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignView {
    pub fingerprint: String,
    pub cached: bool,
    pub generated_text: String,
    pub image_results: Vec<ImageReference>,
    pub created_at: DateTime<Utc>,
}

impl DesignView {
    pub fn from_entry(entry: CacheEntry, cached: bool) -> Self {
        Self {
            fingerprint: entry.fingerprint.to_string(),
            cached,
            generated_text: entry.generated_text,
            image_results: entry.image_results,
            created_at: entry.created_at,
        }
    }
}

impl From<Submission> for DesignView {
    fn from(submission: Submission) -> Self {
        Self::from_entry(submission.entry, submission.cached)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheView {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub stats: CacheStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthView {
    pub server_status: String,
    pub active_sessions: usize,
    pub uptime_seconds: u64,
    pub server_time: i64,
    pub version: String,
}
