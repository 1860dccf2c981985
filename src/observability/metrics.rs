//! Metrics collection.
//!
//! # Metrics
//! - `client_requests_total` (counter): completed API calls by method, status
//! - `client_transport_retries_total` (counter): retries after transport errors
//! - `client_token_refresh_total` (counter): refresh exchanges by outcome
//!
//! Recording is a no-op until the embedding application installs a recorder.

/// Record a completed API call. Status 0 means no HTTP response was received.
pub fn record_request(method: &str, status: u16) {
    ::metrics::counter!(
        "client_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a retry after a transport failure.
pub fn record_transport_retry() {
    ::metrics::counter!("client_transport_retries_total").increment(1);
}

/// Record the outcome of a token refresh exchange.
pub fn record_token_refresh(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!("client_token_refresh_total", "outcome" => outcome).increment(1);
}
