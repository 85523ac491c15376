//! Client for the remote transcript service.
//!
//! The service takes a canonical video URL and an optional language code and
//! answers with the transcript text, the video title and the languages the
//! transcript is available in.

use crate::error::FetchError;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

/// A transcript language offered by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LanguageOption {
    pub(crate) code: String,
    #[serde(rename = "name")]
    pub(crate) display_name: String,
}

#[cfg(test)]
impl LanguageOption {
    pub(crate) fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
        }
    }
}

/// Request body sent to the transcript endpoint.
#[derive(Debug, Serialize)]
struct TranscriptRequest<'a> {
    url: &'a str,
    /// Empty means the service's default language
    lang: &'a str,
}

/// Successful response from the transcript endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranscriptResponse {
    pub(crate) transcript: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) languages: Vec<LanguageOption>,
    /// Language the service actually used
    #[serde(default)]
    pub(crate) transcript_language_code: String,
}

/// Anything that can produce a transcript for a canonical video URL
#[async_trait]
pub(crate) trait TranscriptService: Send + Sync {
    async fn fetch_transcript(
        &self,
        url: &str,
        lang: &str,
    ) -> Result<TranscriptResponse, FetchError>;
}

/// HTTP client for the transcript service.
pub(crate) struct TranscriptApiClient {
    endpoint_url: String,
    client: reqwest::Client,
}

impl TranscriptApiClient {
    /// Create a client posting to `base_url` + `endpoint`.
    pub(crate) fn new(
        base_url: &str,
        endpoint: &str,
        connect_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let base = url::Url::parse(base_url)
            .with_context(|| format!("Invalid transcript service URL: {}", base_url))?;
        let endpoint_url = base
            .join(endpoint)
            .with_context(|| format!("Invalid transcript endpoint: {}", endpoint))?;

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .context("Failed to create HTTP client for TranscriptApiClient")?;

        Ok(Self {
            endpoint_url: endpoint_url.to_string(),
            client,
        })
    }

    pub(crate) fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl TranscriptService for TranscriptApiClient {
    /// Single request, no retries. Non-success statuses fail without reading the body.
    #[instrument(skip(self), fields(endpoint = %self.endpoint_url))]
    async fn fetch_transcript(
        &self,
        url: &str,
        lang: &str,
    ) -> Result<TranscriptResponse, FetchError> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .json(&TranscriptRequest { url, lang })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError {
                status: status.as_u16(),
            });
        }

        let transcript: TranscriptResponse = response.json().await.map_err(|e| {
            FetchError::InvalidResponse(format!("Failed to parse transcript response: {}", e))
        })?;

        info!(
            title = %transcript.title,
            language = %transcript.transcript_language_code,
            languages = transcript.languages.len(),
            transcript_len = transcript.transcript.len(),
            "Transcript received"
        );

        Ok(transcript)
    }
}
