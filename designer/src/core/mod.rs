//! Designer core business logic

pub mod cache;
pub mod export;
pub mod fingerprint;
pub mod form;
pub mod prompt;

pub use cache::ResultCache;
pub use export::export_markdown;
pub use fingerprint::fingerprint;
pub use form::FormState;
pub use prompt::{build_design_prompt, build_image_query};
