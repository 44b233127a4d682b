//! Transport seam between a query and the HTTP layer.
//!
//! Queries never talk to reqwest directly; they hand a serialized payload
//! to a [`SqlTransport`] and get back a [`ResponseOutcome`]. That keeps the
//! classification logic independent of the HTTP stack and lets tests
//! substitute a canned transport.

use crate::auth::AuthProvider;
use async_trait::async_trait;
use log::debug;
use std::time::Instant;

/// What came back from one submission attempt.
///
/// A timeout is reported as `TimedOut` even if part of a body had already
/// arrived; a body that cannot be trusted is not worth classifying further.
#[derive(Debug, Clone)]
pub enum ResponseOutcome {
    /// An HTTP response was received, whatever its status.
    Response {
        /// HTTP status code.
        status: u16,
        /// Full response body.
        body: String,
    },

    /// The request failed below HTTP (connection, TLS, DNS, mid-body).
    TransportFailure {
        /// Coarse failure location: `connect`, `request`, or `body`.
        code: String,
        /// Description from the underlying client.
        message: String,
    },

    /// The configured timeout elapsed first.
    TimedOut,
}

/// Submits a serialized query payload to the SQL endpoint.
#[async_trait]
pub trait SqlTransport: Send + Sync {
    /// Submit the payload and report the outcome. Infallible by design —
    /// every failure mode is a [`ResponseOutcome`] variant.
    async fn submit(&self, payload: String) -> ResponseOutcome;
}

/// reqwest-backed transport used by [`crate::DruidLinkClient`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    uri: String,
    http_client: reqwest::Client,
    auth: AuthProvider,
}

impl HttpTransport {
    pub(crate) fn new(uri: String, http_client: reqwest::Client, auth: AuthProvider) -> Self {
        Self {
            uri,
            http_client,
            auth,
        }
    }
}

#[async_trait]
impl SqlTransport for HttpTransport {
    async fn submit(&self, payload: String) -> ResponseOutcome {
        let start = Instant::now();
        debug!(
            "[DRUID_HTTP] Sending POST to {} (payload {} bytes)",
            self.uri,
            payload.len()
        );

        let request = self
            .http_client
            .post(&self.uri)
            .header("Content-Type", "application/json")
            .body(payload);
        let request = self.auth.apply_to_request(request);

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!(
                    "[DRUID_HTTP] Response received: status={} duration_ms={}",
                    status,
                    start.elapsed().as_millis()
                );
                match response.text().await {
                    Ok(body) => ResponseOutcome::Response { status, body },
                    Err(e) if e.is_timeout() => ResponseOutcome::TimedOut,
                    Err(e) => ResponseOutcome::TransportFailure {
                        code: "body".to_string(),
                        message: e.to_string(),
                    },
                }
            }
            Err(e) if e.is_timeout() => {
                debug!(
                    "[DRUID_HTTP] Request timed out after {}ms",
                    start.elapsed().as_millis()
                );
                ResponseOutcome::TimedOut
            }
            Err(e) => {
                let code = if e.is_connect() { "connect" } else { "request" };
                debug!(
                    "[DRUID_HTTP] Request failed ({}): {} duration_ms={}",
                    code,
                    e,
                    start.elapsed().as_millis()
                );
                ResponseOutcome::TransportFailure {
                    code: code.to_string(),
                    message: e.to_string(),
                }
            }
        }
    }
}
