//! Router builders and request helpers
//!
//! Requests go through `tower::ServiceExt::oneshot` against the real router,
//! with the collaborators replaced by mocks.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use designer::{DesignTextGenerator, ImageSearchProvider, MockDesignTextGenerator, MockImageSearchProvider, SessionSettings};
use shared::{ApiFailure, ImageReference};
use webserver::{WebServer, WebServerState};

pub const DESIGN_TEXT: &str = "# Modern Home\n\n## Layout\nOpen plan living.";

/// Generator that answers after a fixed delay
pub struct SlowGenerator {
    pub delay: Duration,
}

#[async_trait]
impl DesignTextGenerator for SlowGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, ApiFailure> {
        tokio::time::sleep(self.delay).await;
        Ok(DESIGN_TEXT.to_string())
    }
}

pub fn working_generator() -> MockDesignTextGenerator {
    let mut generator = MockDesignTextGenerator::new();
    generator
        .expect_generate()
        .returning(|_| Ok(DESIGN_TEXT.to_string()));
    generator
}

pub fn failing_generator(failure: ApiFailure) -> MockDesignTextGenerator {
    let mut generator = MockDesignTextGenerator::new();
    generator
        .expect_generate()
        .returning(move |_| Err(failure.clone()));
    generator
}

pub fn working_search() -> MockImageSearchProvider {
    let mut search = MockImageSearchProvider::new();
    search.expect_search().returning(|_, limit| {
        Ok((0..limit)
            .map(|n| ImageReference {
                url: format!("https://images.example.com/{n}.jpg?auto=format&fit=crop&w=800&q=80"),
                attribution: format!("Photo by Tester {n} on Unsplash"),
                source_url: Some(format!("https://unsplash.com/photos/{n}")),
            })
            .collect())
    });
    search
}

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_collaborators(working_generator(), working_search(), SessionSettings::default())
    }

    pub fn with_collaborators<G, S>(generator: G, search: S, settings: SessionSettings) -> Self
    where
        G: DesignTextGenerator + 'static,
        S: ImageSearchProvider + 'static,
    {
        let state = WebServerState::new(Arc::new(generator), Arc::new(search), settings);
        Self { router: WebServer::new(state).build_router() }
    }

    /// Send a request; returns status and the parsed JSON body (Null when empty)
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, bytes) = self.raw_request(method, uri, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        };
        (status, json)
    }

    pub async fn raw_request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    /// Create a session and return its id
    pub async fn create_session(&self) -> String {
        let (status, body) = self.request(Method::POST, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["session_id"].as_str().unwrap().to_string()
    }

    /// Create a session whose form is ready to submit
    pub async fn ready_session(&self, rooms: &[&str]) -> String {
        let id = self.create_session().await;
        let fields = serde_json::json!({
            "style": "Modern",
            "square_footage": 1800,
            "budget": "luxury",
            "amenities": ["home_office", "garden"]
        });
        let (status, _) = self.request(Method::PATCH, &format!("/api/sessions/{id}/form"), Some(fields)).await;
        assert_eq!(status, StatusCode::OK);

        for name in rooms {
            let (status, body) = self.request(Method::POST, &format!("/api/sessions/{id}/rooms"), None).await;
            assert_eq!(status, StatusCode::CREATED);
            let index = body["data"]["index"].as_u64().unwrap();
            let (status, _) = self
                .request(
                    Method::PATCH,
                    &format!("/api/sessions/{id}/rooms/{index}"),
                    Some(serde_json::json!({ "name": name })),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
        }
        id
    }
}
