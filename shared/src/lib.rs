//! Shared types for the home design assistant
//!
//! Contains the form domain model, the collaborator failure taxonomy and the
//! logging setup used by both the designer library and the webserver.

pub mod types;
pub mod errors;
pub mod logging;

pub use types::*;
pub use errors::*;
