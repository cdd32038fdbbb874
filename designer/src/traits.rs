//! Collaborator trait definitions for dependency injection

use async_trait::async_trait;

use shared::{ApiFailure, ImageReference};

/// Hosted text generator that turns a design prompt into a markdown plan
#[mockall::automock]
#[async_trait]
pub trait DesignTextGenerator: Send + Sync {
    /// Generate a free-text design plan for the prompt
    async fn generate(&self, prompt: &str) -> Result<String, ApiFailure>;
}

/// Hosted image search returning ordered inspiration images
#[mockall::automock]
#[async_trait]
pub trait ImageSearchProvider: Send + Sync {
    /// Search for at most `limit` images matching the query
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ImageReference>, ApiFailure>;
}
