use crate::llm::error::GatewayError;
use reqwest::StatusCode;
use std::time::Duration;

const MAX_DELAY: Duration = Duration::from_secs(60);

/// Delay requested by a `Retry-After` header (seconds form), capped at
/// `MAX_DELAY`. Falls back to `fallback` when absent or unparsable.
fn retry_after_delay(header: Option<&str>, fallback: Duration) -> Duration {
    header
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(fallback)
        .min(MAX_DELAY)
}

/// Retries a request closure with exponential backoff.
/// Retries on:
/// - Network errors
/// - 429 Too Many Requests (respects Retry-After header)
/// - 5xx Server Errors
///
/// Returns the last Response (even if error status) or the last network error.
/// With `max_retries == 0` the first outcome is returned as-is.
pub async fn request_with_retry<F, Fut>(
    mut task: F,
    max_retries: u32,
) -> Result<reqwest::Response, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;
    let mut delay = Duration::from_millis(1000);

    loop {
        attempt += 1;
        match task().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || attempt > max_retries {
                    return Ok(response);
                }

                if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok());
                    let retry_delay = retry_after_delay(retry_after, delay);

                    tracing::warn!(
                        %status,
                        ?retry_delay,
                        attempt,
                        max_retries,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(retry_delay).await;
                    delay = std::cmp::min(delay * 2, MAX_DELAY);
                    continue;
                }

                // 400/401/404 and friends will not get better
                return Ok(response);
            }
            Err(e) => {
                if attempt > max_retries {
                    return Err(GatewayError::Transport(e));
                }
                tracing::warn!(error = %e, ?delay, attempt, max_retries, "network error, retrying");
                tokio::time::sleep(delay).await;
                delay = std::cmp::min(delay * 2, MAX_DELAY);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_is_capped() {
        let fallback = Duration::from_secs(1);
        assert_eq!(retry_after_delay(Some("3"), fallback), Duration::from_secs(3));
        assert_eq!(retry_after_delay(Some("86400"), fallback), MAX_DELAY);
        assert_eq!(retry_after_delay(Some(" 0 "), fallback), Duration::ZERO);
    }

    #[test]
    fn unusable_retry_after_uses_backoff() {
        let fallback = Duration::from_secs(2);
        assert_eq!(retry_after_delay(None, fallback), fallback);
        assert_eq!(
            retry_after_delay(Some("Wed, 21 Oct 2015 07:28:00 GMT"), fallback),
            fallback
        );
    }
}
