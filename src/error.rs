use thiserror::Error;

/// Failures of a backend call. Every variant is scoped to the interaction that
/// issued the call; none of them is fatal to the application.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The request could not complete (connect failure, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// A non-2xx response.
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// A 2xx response whose body lacks the success marker.
    #[error("{message}")]
    Rejected { message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Network("request timed out".to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// A field-level rule violation. Resolved entirely inside the form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{label}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub label: &'static str,
    pub message: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("no administrator account is configured")]
    NotConfigured,
}
