//! Error handling for fleetops
//!
//! Provides a unified error type and result type for use across all
//! fleetops components.

/// Result type alias for fleetops operations
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for fleetops
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Cloud API call failed (transport, auth, or service error)
    #[error("Cloud API error: {0}")]
    Api(String),

    /// Authentication or signing failure against the cloud provider
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Remote shell command failed or the host is unreachable
    #[error("SSH error: {0}")]
    Ssh(String),

    /// Hardware shape not present in the catalog
    #[error("Unrecognized shape: {0}")]
    UnrecognizedShape(String),

    /// Benchmark output could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operation exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Tag namespace or tag key is missing or could not be created
    #[error("Tag setup error: {0}")]
    TagSetup(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a cloud API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create an SSH error
    pub fn ssh(msg: impl Into<String>) -> Self {
        Self::Ssh(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a tag setup error
    pub fn tag_setup(msg: impl Into<String>) -> Self {
        Self::TagSetup(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Whether this error should abort the run with a non-zero exit.
    ///
    /// Cloud API / auth failures and a failed tag-setup check are fatal.
    /// Everything else (unreachable hosts, unrecognized shapes, benchmark
    /// timeouts, parse failures, local file-system hiccups) degrades to
    /// "skip and continue" in a best-effort diagnostic sweep.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Api(_) | Error::Auth(_) | Error::TagSetup(_) | Error::InvalidConfiguration(_)
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Api(_) => "api",
            Error::Auth(_) => "auth",
            Error::Ssh(_) => "ssh",
            Error::UnrecognizedShape(_) => "shape",
            Error::Parse(_) => "parse",
            Error::Timeout(_) => "timeout",
            Error::NotFound(_) => "not_found",
            Error::TagSetup(_) => "tag_setup",
            Error::InvalidConfiguration(_) => "configuration",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Yaml(_) => "yaml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::api("listing hosts failed");
        assert!(matches!(err, Error::Api(_)));
        assert_eq!(err.to_string(), "Cloud API error: listing hosts failed");
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(Error::api("x").category(), "api");
        assert_eq!(Error::ssh("x").category(), "ssh");
        assert_eq!(Error::UnrecognizedShape("x".into()).category(), "shape");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::api("x").is_fatal());
        assert!(Error::auth("x").is_fatal());
        assert!(Error::tag_setup("x").is_fatal());

        assert!(!Error::ssh("x").is_fatal());
        assert!(!Error::timeout("x").is_fatal());
        assert!(!Error::parse("x").is_fatal());
        assert!(!Error::UnrecognizedShape("BM.GPU.X9.8".into()).is_fatal());
    }
}
