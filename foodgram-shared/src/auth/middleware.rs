/// Request authentication context
///
/// The API server resolves the acting user before controller logic runs:
/// a middleware layer validates the Bearer token and injects one of two
/// request extensions.
///
/// - `AuthContext`: present on routes that require authentication
/// - `OptionalAuth`: present on public routes that still personalize their
///   responses (favorite flags, subscription flags) when a valid token is
///   supplied; anonymous callers carry `OptionalAuth(None)`
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use foodgram_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("acting user: {}", auth.user_id)
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Authentication context for a resolved acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// Authenticated user id
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context from validated JWT claims
    pub fn from_claims(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Acting user for routes that accept anonymous callers
///
/// `None` means the request carried no usable credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalAuth(pub Option<AuthContext>);

impl OptionalAuth {
    /// Resolved user id, if any
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.map(|auth| auth.user_id)
    }

    /// Upgrades to a required auth context
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` for anonymous callers.
    pub fn require(&self) -> Result<AuthContext, AuthError> {
        self.0.ok_or(AuthError::MissingCredentials)
    }
}

/// Error type for authentication failures
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Malformed authorization header
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

/// Extracts the Bearer token from the Authorization header
///
/// # Errors
///
/// Returns `MissingCredentials` when the header is absent and
/// `InvalidFormat` when it is not a Bearer credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));

        assert_eq!(bearer_token(&headers).unwrap(), "abc");
    }

    #[test]
    fn test_missing_header() {
        let headers = HeaderMap::new();

        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_non_bearer_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_optional_auth_require() {
        let anonymous = OptionalAuth(None);
        assert!(anonymous.require().is_err());

        let user = AuthContext::from_claims(Uuid::new_v4());
        let authed = OptionalAuth(Some(user));
        assert_eq!(authed.require().unwrap(), user);
    }
}
