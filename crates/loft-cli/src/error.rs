//! CLI error taxonomy.
//!
//! Every command runner returns a [`CliError`]; `main` prints
//! `Error: <message>` to stderr and exits 1. The only silently recovered
//! condition is the API version mismatch warning, which is not an error.

use thiserror::Error;

use loft_api::ApiError;

/// Errors surfaced to the user.
#[derive(Debug, Error)]
pub enum CliError {
    /// No profile on disk.
    #[error("client configuration file not found, run `loft login` to create a new session")]
    NoSession,

    /// Profile file exists but cannot be parsed.
    #[error("client configuration file {path} is corrupt: {detail}")]
    CorruptProfile {
        /// Path of the offending file.
        path: String,
        /// Parser detail.
        detail: String,
    },

    /// A controller call failed; the SDK's classification passes through.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An input parser rejected a token; the message quotes it.
    #[error("{0}")]
    Validation(String),

    /// The user declined a confirmation prompt.
    #[error("{0}")]
    Cancelled(String),

    /// A command ran but reported failure.
    #[error("{0}")]
    Command(String),

    /// Shelling out to git failed.
    #[error("git: {0}")]
    Git(String),

    /// Argument parsing failed; the message is clap's rendered output and
    /// is printed without the `Error:` prefix.
    #[error("{0}")]
    Usage(String),

    /// Filesystem or terminal I/O failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Whether `main` should print the message bare, without the
    /// `Error:` prefix (already-formatted usage output).
    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_session_points_at_login() {
        assert!(CliError::NoSession.to_string().contains("loft login"));
    }

    #[test]
    fn validation_message_is_verbatim() {
        let err = CliError::Validation("500K doesn't fit format [1-9][0-9]*[gG]".into());
        assert!(err.to_string().starts_with("500K doesn't fit format"));
    }

    #[test]
    fn api_errors_pass_through() {
        let err = CliError::from(ApiError::Server { status: 503 });
        assert!(err.to_string().contains("503"));
    }
}
