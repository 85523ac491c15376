use std::time::Duration;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Transcript service errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Failed to fetch transcript (status {status})")]
    ServerError { status: u16 },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors surfaced by the transcript session controller
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No YouTube video found on this page.")]
    NoVideoFound,

    #[error("Error: {0}")]
    TranscriptFetchFailed(#[from] FetchError),

    #[error("Failed to write transcript to clipboard: {0}")]
    ClipboardWriteFailed(String),
}
