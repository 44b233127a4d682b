//! Authentication for the Druid SQL endpoint.
//!
//! Druid deployments behind an authenticator take HTTP Basic Auth;
//! everything else runs unauthenticated. Credentials usually arrive via
//! the service URI's userinfo and are applied as an Authorization header.

use base64::{engine::general_purpose, Engine as _};

/// Authentication applied to each query request.
///
/// # Examples
///
/// ```rust
/// use druid_link::AuthProvider;
///
/// // HTTP Basic Auth
/// let auth = AuthProvider::basic_auth("druid".to_string(), "secret".to_string());
///
/// // No authentication
/// let auth = AuthProvider::none();
/// ```
#[derive(Debug, Clone)]
pub enum AuthProvider {
    /// HTTP Basic Auth (username, password)
    BasicAuth(String, String),

    /// No authentication
    None,
}

impl AuthProvider {
    /// Create HTTP Basic Auth credentials.
    pub fn basic_auth(username: String, password: String) -> Self {
        Self::BasicAuth(username, password)
    }

    /// No authentication.
    pub fn none() -> Self {
        Self::None
    }

    /// Attach the Authorization header to an HTTP request builder.
    ///
    /// BasicAuth becomes `Authorization: Basic <base64(username:password)>`
    /// per RFC 7617; `None` leaves the request untouched.
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::BasicAuth(username, password) => {
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                request.header("Authorization", format!("Basic {}", encoded))
            }
            Self::None => request,
        }
    }

    /// Whether credentials are configured.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}
