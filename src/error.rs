//! Error types for the Clover backend-for-frontend.

/// Convenience alias used throughout the crate.
pub type Result<T, E = BffError> = core::result::Result<T, E>;

/// All errors that can occur while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum BffError {
    /// The request body, path or query could not be parsed.
    #[error("{0}")]
    BadRequest(String),

    /// A local lookup (merchant, token, user, recommendation) found nothing.
    #[error("{0}")]
    NotFound(String),

    /// Clover rejected the access token.
    #[error("Unauthorized: Please check your Clover access token.")]
    Unauthorized,

    /// Clover answered with a non-success status other than 401.
    #[error("Clover API error: {body}")]
    Upstream {
        /// HTTP status code returned by Clover.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// Clover could not be reached (DNS, connect, timeout).
    #[error("A network error occurred: {0}")]
    ServiceUnavailable(String),

    /// A required credential or setting is missing or invalid.
    #[error("{0}")]
    Unconfigured(String),

    /// Anything else, including structurally malformed Clover responses.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),

    /// Storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),
}

impl BffError {
    /// Returns the HTTP status code this error surfaces as.
    ///
    /// Upstream statuses are passed through verbatim.
    #[inline]
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match *self {
            Self::BadRequest(_) => 422,
            Self::NotFound(_) => 404,
            Self::Unauthorized => 401,
            Self::Upstream { status, .. } => status,
            Self::ServiceUnavailable(_) => 503,
            Self::Unconfigured(_) | Self::Unexpected(_) | Self::Storage(_) => 500,
        }
    }

    /// Builds a [`BffError::Unexpected`] from a malformed provider payload.
    pub(crate) fn malformed(err: &serde_json::Error) -> Self {
        Self::Unexpected(format!("malformed Clover response: {err}"))
    }
}

impl From<reqwest::Error> for BffError {
    #[inline]
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            if status.as_u16() == 401 {
                return Self::Unauthorized;
            }
            return Self::Upstream {
                status: status.as_u16(),
                body: err.to_string(),
            };
        }
        if err.is_builder() || err.is_decode() {
            return Self::Unexpected(err.to_string());
        }
        Self::ServiceUnavailable(err.to_string())
    }
}

impl From<url::ParseError> for BffError {
    #[inline]
    fn from(err: url::ParseError) -> Self {
        Self::Unexpected(format!("invalid Clover URL: {err}"))
    }
}

#[cfg(feature = "storage-sqlite")]
impl From<sqlx::Error> for BffError {
    #[inline]
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(feature = "storage-sqlite")]
impl From<sqlx::migrate::MigrateError> for BffError {
    #[inline]
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Storage(Box::new(err))
    }
}
