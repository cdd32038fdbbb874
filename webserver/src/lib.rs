//! Webserver library for the home design assistant
//!
//! Exposes design sessions to a browser over a JSON API. Each HTTP session
//! id maps to its own `DesignSession`; the collaborator clients are shared.

pub mod error;
pub mod state;
pub mod types;
pub mod web;
pub mod webserver_impl;

// Re-export main types
pub use error::{WebServerError, WebServerResult};
pub use state::{SessionLimits, WebServerState};
pub use types::*;
pub use webserver_impl::WebServer;
