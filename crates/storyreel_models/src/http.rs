//! Shared HTTP response handling for live providers.

use reqwest::Response;
use storyreel_error::{ProviderError, ProviderErrorKind, ProviderResult};
use tracing::error;

/// Map a transport failure to a provider error.
#[track_caller]
pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> ProviderError {
    error!(provider, error = ?e, "Request to provider failed");
    ProviderError::new(ProviderErrorKind::Request(e.to_string()))
}

/// Pass successful responses through; turn error statuses into `HttpError`.
pub(crate) async fn check_status(provider: &str, response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(provider, status = %status, body = %body, "Provider returned error");
    Err(ProviderError::new(ProviderErrorKind::HttpError {
        status_code: status.as_u16(),
        message: body,
    }))
}

/// Return the API key or a `MissingApiKey` error.
#[track_caller]
pub(crate) fn require_key<'a>(
    key: &'a Option<String>,
    provider: &str,
    variable: &str,
) -> ProviderResult<&'a str> {
    match key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ProviderError::new(ProviderErrorKind::MissingApiKey {
            provider: provider.to_string(),
            variable: variable.to_string(),
        })),
    }
}
