//! Test doubles and session builders
//!
//! The mockall mocks cover simple expectations. These counting doubles add
//! latency and scripted failures for the concurrency tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use designer::{DesignSession, DesignTextGenerator, ImageSearchProvider, SessionSettings};
use shared::{ApiFailure, ImageReference, SessionId};

use super::fixtures::TestFixtures;

/// Generator that counts calls, sleeps, and fails the first `failures` calls
#[derive(Default)]
pub struct CountingGenerator {
    calls: AtomicUsize,
    delay: Duration,
    failures: usize,
}

impl CountingGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_first(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DesignTextGenerator for CountingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ApiFailure> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if call < self.failures {
            return Err(ApiFailure::ServiceUnavailable);
        }
        assert!(prompt.contains("Rooms ("), "prompt should list rooms");
        Ok(TestFixtures::design_text())
    }
}

/// Image search that counts calls and returns `limit` fixed references
#[derive(Default)]
pub struct CountingSearch {
    calls: AtomicUsize,
}

impl CountingSearch {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSearchProvider for CountingSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ImageReference>, ApiFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((0..limit)
            .map(|n| ImageReference {
                url: format!("https://images.example.com/{}/{n}.jpg", query.replace(' ', "-")),
                attribution: format!("Photo by Tester {n} on Unsplash"),
                source_url: None,
            })
            .collect())
    }
}

pub type TestSession = DesignSession<CountingGenerator, CountingSearch>;

pub struct TestHelpers;

impl TestHelpers {
    pub fn session(generator: CountingGenerator) -> (Arc<TestSession>, Arc<CountingGenerator>, Arc<CountingSearch>) {
        Self::session_with(generator, SessionSettings::default())
    }

    pub fn session_with(
        generator: CountingGenerator,
        settings: SessionSettings,
    ) -> (Arc<TestSession>, Arc<CountingGenerator>, Arc<CountingSearch>) {
        let generator = Arc::new(generator);
        let search = Arc::new(CountingSearch::default());
        let session = DesignSession::new(SessionId::new(), generator.clone(), search.clone(), settings);
        (Arc::new(session), generator, search)
    }

    /// Fill the scalar fields and append the named rooms in order
    pub async fn fill(session: &TestSession, rooms: &[(&str, Option<f64>)]) {
        session.update_fields(TestFixtures::renovation_fields()).await;
        for (name, size) in rooms {
            let index = session.add_room().await;
            session
                .update_room(index, TestFixtures::room(name, *size))
                .await
                .expect("room index just added");
        }
    }
}
