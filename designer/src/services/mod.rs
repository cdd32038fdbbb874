//! Collaborator implementations over HTTP

pub mod gemini_generator;
pub mod unsplash_search;

#[cfg(test)]
pub mod tests;

pub use gemini_generator::GeminiDesignGenerator;
pub use unsplash_search::UnsplashImageSearch;

use shared::ApiFailure;

/// Build a reqwest client with the per-request timeout applied
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Transport-level failure mapping shared by both collaborators
pub(crate) fn transport_failure(error: reqwest::Error) -> ApiFailure {
    if error.is_timeout() {
        ApiFailure::Timeout
    } else {
        ApiFailure::NetworkError(error.to_string())
    }
}
