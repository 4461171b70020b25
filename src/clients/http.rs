//! Shared HTTP helpers for advisor providers

use std::time::Duration;

use reqwest::{Client, Response};

use crate::clients::traits::AdvisorError;

pub fn build_client(timeout_ms: u64) -> Result<Client, AdvisorError> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| AdvisorError::Http(format!("Failed to build HTTP client: {}", e)))
}

/// Error for a non-success status; the body snippet is kept for diagnosis.
pub fn status_error(status: u16, body: &str, context: &str) -> AdvisorError {
    let snippet = truncate_snippet(body.trim(), 500);
    let message = format!("{context}: HTTP {status}: {snippet}");
    match status {
        401 | 403 => AdvisorError::Auth(message),
        429 => AdvisorError::RateLimited(message),
        _ => AdvisorError::Http(message),
    }
}

/// Pass a 2xx response through; consume anything else into an error.
pub async fn ensure_success(resp: Response, context: &str) -> Result<Response, AdvisorError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body_text = resp
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    Err(status_error(status.as_u16(), &body_text, context))
}

pub fn map_send_err(err: reqwest::Error, timeout_ms: u64) -> AdvisorError {
    if err.is_timeout() {
        AdvisorError::Timeout { timeout_ms }
    } else {
        AdvisorError::Http(err.to_string())
    }
}

pub fn truncate_snippet(input: &str, max: usize) -> String {
    if input.len() <= max {
        return input.to_string();
    }
    let mut end = max;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &input[..end])
}
