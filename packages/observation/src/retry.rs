//! HTTP send helpers with an opt-in retry policy.
//!
//! Every observation request goes through [`send_json`] instead of calling
//! `reqwest::RequestBuilder::send()` directly. With `max_retries = 0` (the
//! default) a failed request fails immediately and the error propagates
//! unchanged. With a positive budget, transient failures (timeouts,
//! connection resets, HTTP 429, HTTP 5xx) are retried with exponential
//! backoff.
//!
//! ```ignore
//! let body = retry::send_json(|| client.get(url.clone()), 0).await?;
//! ```

use std::time::Duration;

use crate::ObservationError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
///
/// A body that is not valid JSON is not retried: the server answered, it
/// just answered with something unusable.
///
/// # Errors
///
/// Returns [`ObservationError`] if the request fails after all retries, the
/// server returns a non-success status, or the body is not valid JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(
    build_request: F,
    max_retries: u32,
) -> Result<serde_json::Value, ObservationError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, max_retries).await?;

    let url = response.url().to_string();
    let status = response.status();
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|json_err| {
        let preview = if text.len() > BODY_PREVIEW_LEN {
            format!("{}...", truncate(&text, BODY_PREVIEW_LEN))
        } else {
            text.clone()
        };
        log::error!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             received: {} bytes\n  \
             parse error: {json_err}\n  \
             body preview: {preview}",
            text.len(),
        );
        ObservationError::MalformedResponse {
            url,
            message: json_err.to_string(),
        }
    })
}

/// Retry loop behind [`send_json`].
///
/// Returns the successful [`reqwest::Response`] (status 2xx or 3xx).
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, ObservationError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = backoff(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(ObservationError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                let retryable = status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    || status.is_server_error();

                if retryable && attempt < max_retries {
                    log::warn!("  HTTP {status}");
                    attempt += 1;
                    continue;
                }

                if status.is_client_error() || status.is_server_error() {
                    return Err(ObservationError::Status {
                        url: response.url().to_string(),
                        status: status.as_u16(),
                    });
                }

                return Ok(response);
            }
        }
    }
}

/// Exponential backoff: 2s, 4s, 8s, ... capped at 64s.
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(6))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

/// Truncates to at most `max` bytes without splitting a UTF-8 character.
fn truncate(text: &str, max: usize) -> &str {
    let mut end = max.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff(1), Duration::from_secs(2));
        assert_eq!(backoff(3), Duration::from_secs(8));
        assert_eq!(backoff(20), Duration::from_secs(64));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
