//! Designer library for the home design assistant
//!
//! Owns the session-scoped form state and result cache, and talks to the
//! design-text and image-search collaborators through injectable traits.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod session;
pub mod traits;
pub mod types;

// Re-export main types
pub use config::DesignerConfig;
pub use error::{DesignerError, DesignerResult};
pub use session::{DesignSession, SessionSettings};
pub use traits::*;
pub use types::*;
