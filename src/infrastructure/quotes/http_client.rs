//! # HTTP Client Utilities
//!
//! Shared HTTP client for the quote providers.
//!
//! Every request carries the configured timeout and decodes a JSON body.
//! Non-2xx statuses are mapped onto [`QuoteError`] variants.

use super::error::{QuoteError, QuoteResult};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client wrapper for quote providers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::Connection` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> QuoteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| QuoteError::connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a GET request and deserializes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails and
    /// `QuoteError::Protocol` if the response cannot be parsed.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> QuoteResult<T> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }

    /// Makes a GET request with query parameters and deserializes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails and
    /// `QuoteError::Protocol` if the response cannot be parsed.
    pub async fn get_with_params<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        url: &str,
        params: &P,
    ) -> QuoteResult<T> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }

    /// Makes a POST request with query parameters and a JSON body.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails and
    /// `QuoteError::Protocol` if the response cannot be parsed.
    pub async fn post_with_params<T, P, B>(&self, url: &str, params: &P, body: &B) -> QuoteResult<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        debug!(url, "POST");
        let response = self
            .client
            .post(url)
            .query(params)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }

    /// Handles the HTTP response, checking status and deserializing JSON.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> QuoteResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| self.map_reqwest_error(e))?;
            serde_json::from_slice::<T>(&body)
                .map_err(|e| QuoteError::protocol(format!("Failed to parse response: {}", e)))
        } else {
            let error_body = response.text().await.unwrap_or_default();
            Err(self.map_status_error(status, &error_body))
        }
    }

    /// Maps a reqwest error to a QuoteError.
    fn map_reqwest_error(&self, error: reqwest::Error) -> QuoteError {
        if error.is_timeout() {
            QuoteError::timeout(format!("Request timed out after {}ms", self.timeout_ms))
        } else if error.is_connect() {
            QuoteError::connection(format!("Connection failed: {}", error))
        } else {
            QuoteError::connection(format!("HTTP request failed: {}", error))
        }
    }

    /// Maps an HTTP status code to a QuoteError.
    fn map_status_error(&self, status: StatusCode, body: &str) -> QuoteError {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                QuoteError::invalid_request(format!("{}: {}", status, body))
            }
            StatusCode::TOO_MANY_REQUESTS => QuoteError::rate_limited("Rate limit exceeded"),
            StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => {
                QuoteError::connection(format!("Server error ({}): {}", status, body))
            }
            _ => QuoteError::protocol(format!("HTTP error ({}): {}", status, body)),
        }
    }
}
