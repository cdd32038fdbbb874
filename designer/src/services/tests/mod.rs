//! Tests for the HTTP collaborators
//!
//! Each service is exercised against a local wiremock server.
