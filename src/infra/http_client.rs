//! HTTP client factory with consistent timeout configuration.
//!
//! All outbound clients (Shopify identity, Customer Account API, Loop) go
//! through this module so every external call shares the same timeout
//! behavior. New HTTP clients MUST use `build_client()` or
//! `try_build_client()` rather than constructing `reqwest::Client` directly.

use reqwest::Client;
use std::time::Duration;

/// Default connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout (total request/response time).
///
/// Appropriate for the external APIs this service talks to (Shopify, Loop),
/// which are expected to complete within seconds.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an HTTP client with default timeouts.
///
/// Panics if the client cannot be built (e.g., TLS misconfiguration).
/// This is acceptable for singleton constructors since the service cannot
/// function without HTTP clients.
pub fn build_client() -> Client {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client")
}

/// Build an HTTP client with default timeouts, returning Result for use in
/// fallible contexts (e.g., request handlers).
pub fn try_build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
}
