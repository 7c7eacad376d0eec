//! Error types for controller API calls.

use thiserror::Error;

/// Errors surfaced by the controller client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The controller rejected the request (4xx other than 404/409).
    ///
    /// The body is surfaced verbatim so the user sees the controller's
    /// own explanation.
    #[error("{body}")]
    Client {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the controller.
        body: String,
    },

    /// The controller failed (5xx).
    #[error("server error ({status}), the controller may be unhealthy, try again later")]
    Server {
        /// HTTP status code.
        status: u16,
    },

    /// A named resource does not exist (404).
    #[error("could not find {what}")]
    NotFound {
        /// Description of the missing resource.
        what: String,
    },

    /// The request conflicts with existing state (409).
    #[error("{what} already exists or is in a conflicting state")]
    Conflict {
        /// The conflicting identifier.
        what: String,
    },

    /// The controller URL could not be parsed or joined.
    #[error("invalid controller url: {0}")]
    Url(String),

    /// A response body could not be decoded.
    #[error("malformed response body: {0}")]
    Body(#[source] serde_json::Error),
}

impl ApiError {
    /// Replace the description of a [`ApiError::NotFound`] with a
    /// caller-supplied one; other variants pass through unchanged.
    #[must_use]
    pub fn describe_not_found(self, what: impl Into<String>) -> Self {
        match self {
            Self::NotFound { .. } => Self::NotFound { what: what.into() },
            other => other,
        }
    }

    /// Replace the identifier of a [`ApiError::Conflict`]; other variants
    /// pass through unchanged.
    #[must_use]
    pub fn describe_conflict(self, what: impl Into<String>) -> Self {
        match self {
            Self::Conflict { .. } => Self::Conflict { what: what.into() },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_displays_body_verbatim() {
        let err = ApiError::Client {
            status: 400,
            body: "{\"detail\": \"bad input\"}".into(),
        };
        assert_eq!(err.to_string(), "{\"detail\": \"bad input\"}");
    }

    #[test]
    fn not_found_can_be_redescribed() {
        let err = ApiError::NotFound { what: "apps/x/".into() }
            .describe_not_found("process type web in app x");
        assert_eq!(err.to_string(), "could not find process type web in app x");
    }

    #[test]
    fn redescribe_leaves_other_variants_alone() {
        let err = ApiError::Server { status: 502 }.describe_not_found("anything");
        assert!(matches!(err, ApiError::Server { status: 502 }));
    }
}
