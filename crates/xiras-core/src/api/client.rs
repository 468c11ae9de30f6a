//! API client for communicating with the xIRAS REST API.
//!
//! This module provides the `ApiClient` struct for exchanging credentials for
//! a bearer token and making authenticated requests for student data.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::{AccountKey, Credentials};
use crate::config::{Config, CredentialFields, EnvelopePolarity};
use crate::models::{CourseList, Envelope, StudentProfile, TokenResponse};

use super::ApiError;

/// API client for the xIRAS service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<Url>,
    credential_fields: CredentialFields,
    polarity: EnvelopePolarity,
    token: Option<Arc<String>>,
}

impl ApiClient {
    /// Create a new API client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.base_url()?;
        let base_url = Url::parse(&base_url)
            .with_context(|| format!("Invalid API URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid API URL: {}", base_url);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: Arc::new(base_url),
            credential_fields: config.credential_fields,
            polarity: config.envelope_polarity,
            token: None,
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: Arc<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: Arc::clone(&self.base_url),
            credential_fields: self.credential_fields,
            polarity: self.polarity,
            token: Some(token),
        }
    }

    /// Build `{base}/api/<segments>/` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = (*self.base_url).clone();
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Invalid API URL: {}", self.base_url))?
            .pop_if_empty()
            .push("api")
            .extend(segments)
            .push("");
        Ok(url)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Exchange credentials for an access token.
    ///
    /// Succeeds only when the response carries a non-empty `data` list whose
    /// first entry has an `access_token`.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<String> {
        let url = self.endpoint(&["token"])?;
        let mut body = serde_json::Map::new();
        body.insert(
            self.credential_fields.identifier_field().to_string(),
            credentials.identifier().into(),
        );
        body.insert("password".to_string(), credentials.secret().into());

        debug!(url = %url, identifier = credentials.identifier(), "Requesting access token");

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send authentication request")?;

        let response = Self::check_response(response)
            .await
            .context("Token request rejected")?;

        let text = response
            .text()
            .await
            .context("Failed to read token response body")?;
        let parsed: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .context("Failed to parse token response")?;

        parsed
            .first_token()
            .map(str::to_string)
            .ok_or_else(|| ApiError::InvalidResponse("no access token in response".to_string()).into())
    }

    async fn get_envelope<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        debug!(url = %url, "Fetching {}", what);

        let response = self
            .client
            .get(url.clone())
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} response body", what))?;
        let envelope: Envelope<T> = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .with_context(|| format!("Failed to parse {} response", what))?;

        let success = envelope.success;
        envelope.accepted(self.polarity).ok_or_else(|| {
            ApiError::Unsuccessful(format!(
                "{} envelope had success={} and no usable data",
                what, success
            ))
            .into()
        })
    }

    // ===== Data Fetching Methods =====

    /// Fetch the student details record for an account
    pub async fn fetch_profile(&self, key: &AccountKey) -> Result<StudentProfile> {
        let url = self.endpoint(&["student-details", key.as_str()])?;
        self.get_envelope(url, "student details").await
    }

    /// Fetch the course list for an account
    pub async fn fetch_courses(&self, key: &AccountKey) -> Result<CourseList> {
        let url = self.endpoint(&["courses", key.as_str()])?;
        self.get_envelope(url, "courses").await
    }
}
