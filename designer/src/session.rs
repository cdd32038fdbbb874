//! Design session context
//!
//! A `DesignSession` owns one form, one result cache and handles to both
//! collaborators. Every form edit and every submit for a user goes through
//! the same session, and nothing is shared between sessions except the
//! stateless collaborator clients.
//!
//! Submits carry a ticket. A newer submit for a different form, or an explicit
//! [`DesignSession::cancel`], aborts an older submit that is still waiting on
//! the collaborators; it returns [`DesignerError::Superseded`].

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use shared::{session_debug, session_info, session_warn};
use shared::{ApiFailure, FormFieldsPatch, FormSnapshot, RoomEntry, RoomPatch, SessionId};

use crate::config::{DEFAULT_MAX_IMAGES, DEFAULT_REQUEST_TIMEOUT};
use crate::core::cache::DEFAULT_CACHE_CAPACITY;
use crate::core::{build_design_prompt, build_image_query, export_markdown, fingerprint, FormState, ResultCache};
use crate::error::{DesignerError, DesignerResult};
use crate::traits::{DesignTextGenerator, ImageSearchProvider};
use crate::types::{CacheEntry, CacheStats, DesignOutput, ExportDocument, Fingerprint, Submission};

/// Per-session tuning, usually derived from `DesignerConfig`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Upper bound on each collaborator call
    pub request_timeout: Duration,
    /// Images requested per design
    pub max_images: usize,
    pub cache_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_images: DEFAULT_MAX_IMAGES,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Most recent submit; `fingerprint` is `None` after a cancel
#[derive(Debug, Clone, Default)]
struct Ticket {
    seq: u64,
    fingerprint: Option<Fingerprint>,
}

pub struct DesignSession<G, S>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    id: SessionId,
    form: Mutex<FormState>,
    cache: ResultCache,
    generator: Arc<G>,
    search: Arc<S>,
    settings: SessionSettings,
    tickets: watch::Sender<Ticket>,
    latest: Mutex<Option<(u64, CacheEntry)>>,
}

impl<G, S> DesignSession<G, S>
where
    G: DesignTextGenerator,
    S: ImageSearchProvider,
{
    pub fn new(id: SessionId, generator: Arc<G>, search: Arc<S>, settings: SessionSettings) -> Self {
        let (tickets, _) = watch::channel(Ticket::default());
        Self {
            id,
            form: Mutex::new(FormState::new()),
            cache: ResultCache::with_capacity(settings.cache_capacity),
            generator,
            search,
            settings,
            tickets,
            latest: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    // Form editing

    pub async fn add_room(&self) -> usize {
        let index = self.form.lock().await.add_room();
        session_debug!(self.id, index, "Room added");
        index
    }

    pub async fn update_room(&self, index: usize, patch: RoomPatch) -> DesignerResult<RoomEntry> {
        let mut form = self.form.lock().await;
        form.update_room(index, patch).cloned()
    }

    pub async fn remove_room(&self, index: usize) -> DesignerResult<RoomEntry> {
        let removed = self.form.lock().await.remove_room(index)?;
        session_debug!(self.id, index, "Room removed");
        Ok(removed)
    }

    pub async fn rooms(&self) -> Vec<RoomEntry> {
        self.form.lock().await.rooms().to_vec()
    }

    pub async fn update_fields(&self, patch: FormFieldsPatch) {
        self.form.lock().await.update_fields(patch);
    }

    /// Clear the form; cached results are kept
    pub async fn reset(&self) {
        self.form.lock().await.reset();
        session_info!(self.id, "Form reset");
    }

    pub async fn snapshot(&self) -> FormSnapshot {
        self.form.lock().await.snapshot()
    }

    // Submitting

    /// Snapshot the form and return its design, from the cache when possible.
    pub async fn submit(&self) -> DesignerResult<Submission> {
        let snapshot = self.snapshot().await;

        let missing = snapshot.missing_fields();
        if !missing.is_empty() {
            return Err(DesignerError::IncompleteForm { missing });
        }

        let key = fingerprint(&snapshot);
        let (seq, tickets) = self.issue_ticket(Some(key.clone()));
        session_info!(self.id, fingerprint = %key.short(), seq, "Design submitted");

        let compute = |snapshot: FormSnapshot| async move { self.run_collaborators(&snapshot).await };

        let outcome = tokio::select! {
            result = self.cache.get_or_compute(&snapshot, compute) => result,
            _ = superseded(tickets, seq, key.clone()) => Err(DesignerError::Superseded),
        };

        match &outcome {
            Ok(submission) => {
                self.record_latest(seq, &submission.entry).await;
                session_info!(
                    self.id,
                    fingerprint = %key.short(),
                    cached = submission.cached,
                    images = submission.entry.image_results.len(),
                    "Design ready"
                );
            }
            Err(DesignerError::Superseded) => {
                session_info!(self.id, fingerprint = %key.short(), seq, "Design request superseded");
            }
            Err(e) => {
                session_warn!(self.id, fingerprint = %key.short(), retryable = e.is_retryable(), "Design failed: {}", e);
            }
        }

        outcome
    }

    /// Abort any submit still waiting on the collaborators
    pub fn cancel(&self) {
        let (seq, _) = self.issue_ticket(None);
        session_debug!(self.id, seq, "Pending submits cancelled");
    }

    /// Entry of the most recent successful submit
    pub async fn latest(&self) -> Option<CacheEntry> {
        self.latest.lock().await.as_ref().map(|(_, entry)| entry.clone())
    }

    pub async fn export(&self) -> DesignerResult<ExportDocument> {
        let entry = self.latest().await.ok_or(DesignerError::NoResult)?;
        Ok(export_markdown(&entry))
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    fn issue_ticket(&self, fingerprint: Option<Fingerprint>) -> (u64, watch::Receiver<Ticket>) {
        let receiver = self.tickets.subscribe();
        let mut seq = 0;
        self.tickets.send_modify(|ticket| {
            ticket.seq += 1;
            ticket.fingerprint = fingerprint;
            seq = ticket.seq;
        });
        (seq, receiver)
    }

    async fn record_latest(&self, seq: u64, entry: &CacheEntry) {
        let mut latest = self.latest.lock().await;
        let newer_recorded = matches!(latest.as_ref(), Some((recorded, _)) if *recorded > seq);
        if !newer_recorded {
            *latest = Some((seq, entry.clone()));
        }
    }

    async fn run_collaborators(&self, snapshot: &FormSnapshot) -> DesignerResult<DesignOutput> {
        let prompt = build_design_prompt(snapshot);
        let query = build_image_query(snapshot);
        let timeout = self.settings.request_timeout;

        session_debug!(self.id, query = %query, prompt_chars = prompt.len(), "Calling collaborators");

        let text = async {
            match tokio::time::timeout(timeout, self.generator.generate(&prompt)).await {
                Ok(result) => result.map_err(|reason| DesignerError::Generation { reason }),
                Err(_) => Err(DesignerError::Generation { reason: ApiFailure::Timeout }),
            }
        };

        let images = async {
            match tokio::time::timeout(timeout, self.search.search(&query, self.settings.max_images)).await {
                Ok(result) => result.map_err(|reason| DesignerError::Search { reason }),
                Err(_) => Err(DesignerError::Search { reason: ApiFailure::Timeout }),
            }
        };

        let (generated_text, image_results) = tokio::try_join!(text, images)?;
        Ok(DesignOutput { generated_text, image_results })
    }
}

/// Resolves once a ticket other than ours, for a different form, is current
async fn superseded(mut tickets: watch::Receiver<Ticket>, seq: u64, key: Fingerprint) {
    loop {
        let stale = {
            let ticket = tickets.borrow_and_update();
            ticket.seq != seq && ticket.fingerprint.as_ref() != Some(&key)
        };
        if stale {
            return;
        }
        if tickets.changed().await.is_err() {
            // Session dropped; the submit future goes with it
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockDesignTextGenerator, MockImageSearchProvider};
    use shared::{ImageReference, Scenario};

    fn image(n: usize) -> ImageReference {
        ImageReference {
            url: format!("https://images.example.com/{n}.jpg"),
            attribution: format!("Photo by P{n} on Unsplash"),
            source_url: None,
        }
    }

    fn working_mocks() -> (MockDesignTextGenerator, MockImageSearchProvider) {
        let mut generator = MockDesignTextGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Ok("# Modern family home".to_string()));

        let mut search = MockImageSearchProvider::new();
        search
            .expect_search()
            .returning(|_, limit| Ok((0..limit).map(image).collect()));
        (generator, search)
    }

    fn session(
        generator: MockDesignTextGenerator,
        search: MockImageSearchProvider,
    ) -> DesignSession<MockDesignTextGenerator, MockImageSearchProvider> {
        DesignSession::new(SessionId::new(), Arc::new(generator), Arc::new(search), SessionSettings::default())
    }

    async fn fill_form<G: DesignTextGenerator, S: ImageSearchProvider>(session: &DesignSession<G, S>) {
        session
            .update_fields(FormFieldsPatch {
                scenario: Some(Scenario::HomeRenovation),
                style: Some("Modern".to_string()),
                square_footage: Some(Some(1800)),
                ..Default::default()
            })
            .await;
        let index = session.add_room().await;
        session
            .update_room(index, RoomPatch { name: Some("Kitchen".to_string()), ..Default::default() })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_submit_rejects_incomplete_form() {
        let (generator, search) = working_mocks();
        let session = session(generator, search);

        let err = session.submit().await.unwrap_err();
        assert_eq!(
            err,
            DesignerError::IncompleteForm {
                missing: vec!["style".to_string(), "square_footage".to_string(), "rooms".to_string()]
            }
        );
        assert_eq!(session.cache_stats().await.misses, 0);
    }

    #[tokio::test]
    async fn test_submit_then_resubmit_hits_cache() {
        let mut generator = MockDesignTextGenerator::new();
        generator.expect_generate().times(1).returning(|_| Ok("text".to_string()));
        let mut search = MockImageSearchProvider::new();
        search.expect_search().times(1).returning(|_, _| Ok(vec![image(1)]));
        let session = session(generator, search);
        fill_form(&session).await;

        let first = session.submit().await.unwrap();
        let second = session.submit().await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.entry, second.entry);
        let stats = session.cache_stats().await;
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_requested_image_count_follows_settings() {
        let mut generator = MockDesignTextGenerator::new();
        generator.expect_generate().returning(|_| Ok("text".to_string()));
        let mut search = MockImageSearchProvider::new();
        search
            .expect_search()
            .withf(|query, limit| query.to_string() == "modern home interior renovation" && *limit == 5)
            .returning(|_, limit| Ok((0..limit).map(image).collect()));

        let settings = SessionSettings { max_images: 5, ..Default::default() };
        let session = DesignSession::new(SessionId::new(), Arc::new(generator), Arc::new(search), settings);
        fill_form(&session).await;

        let submission = session.submit().await.unwrap();
        assert_eq!(submission.entry.image_results.len(), 5);
    }

    #[tokio::test]
    async fn test_generator_failure_maps_and_is_not_cached() {
        let mut generator = MockDesignTextGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Err(ApiFailure::RateLimitExceeded));
        let mut search = MockImageSearchProvider::new();
        search.expect_search().returning(|_, _| Ok(vec![]));
        let session = session(generator, search);
        fill_form(&session).await;

        let err = session.submit().await.unwrap_err();
        assert_eq!(err, DesignerError::Generation { reason: ApiFailure::RateLimitExceeded });
        assert!(err.is_retryable());
        assert_eq!(session.cache_stats().await.entries, 0);
        assert!(session.latest().await.is_none());
    }

    #[tokio::test]
    async fn test_search_failure_maps_to_search_error() {
        let mut generator = MockDesignTextGenerator::new();
        generator.expect_generate().returning(|_| Ok("text".to_string()));
        let mut search = MockImageSearchProvider::new();
        search
            .expect_search()
            .returning(|_, _| Err(ApiFailure::AuthenticationFailed));
        let session = session(generator, search);
        fill_form(&session).await;

        let err = session.submit().await.unwrap_err();
        assert_eq!(err, DesignerError::Search { reason: ApiFailure::AuthenticationFailed });
    }

    #[tokio::test]
    async fn test_export_requires_a_result() {
        let (generator, search) = working_mocks();
        let session = session(generator, search);
        assert_eq!(session.export().await.unwrap_err(), DesignerError::NoResult);

        fill_form(&session).await;
        session.submit().await.unwrap();

        let document = session.export().await.unwrap();
        assert_eq!(document.file_name, "Modern_home_design.md");
        assert!(document.content.contains("# Modern family home"));
    }

    #[tokio::test]
    async fn test_reset_keeps_latest_result() {
        let (generator, search) = working_mocks();
        let session = session(generator, search);
        fill_form(&session).await;
        session.submit().await.unwrap();

        session.reset().await;

        assert!(session.rooms().await.is_empty());
        assert!(session.latest().await.is_some());
        assert_eq!(session.cache_stats().await.entries, 1);
    }

    #[tokio::test]
    async fn test_out_of_range_edit_passes_through() {
        let (generator, search) = working_mocks();
        let session = session(generator, search);

        let err = session.remove_room(0).await.unwrap_err();
        assert_eq!(err, DesignerError::OutOfRange { index: 0, len: 0 });
    }
}
