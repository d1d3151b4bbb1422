//! Error types for the unisearch-engine crate.
//!
//! Messages are stable and safe to display. Credentials never appear in
//! error messages; response bodies do, because they are the only
//! diagnostic a failing source gives us.

/// Errors that can occur while querying sources or assembling results.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The source could not be reached, timed out, or sent a body we
    /// could not decode.
    #[error("transport error from {service}: {message}")]
    Transport {
        /// Service bucket the request was issued under.
        service: String,
        /// Human-readable cause.
        message: String,
    },

    /// The source answered with a non-success status code.
    #[error("{service} request failed with status {status}: {body}")]
    RequestFailed {
        /// Service bucket the request was issued under.
        service: String,
        /// HTTP status code.
        status: u16,
        /// Raw response body, preserved for diagnostics.
        body: String,
    },

    /// An adapter failed in a way it did not handle itself (error return,
    /// panic, or missed deadline). Only produced by the aggregator.
    #[error("adapter {adapter} failed: {message}")]
    AdapterFailure {
        /// Name of the offending adapter's source.
        adapter: String,
        /// Human-readable cause.
        message: String,
    },

    /// Failed to extract usable content from a fetched page.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Build a [`SearchError::Transport`] for the given service.
    pub fn transport(service: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.to_owned(),
            message: message.into(),
        }
    }

    /// Short machine-readable kind, used in structured failure records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::RequestFailed { .. } => "request_failed",
            Self::AdapterFailure { .. } => "adapter_failure",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
        }
    }
}

/// Convenience type alias for unisearch-engine results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_transport() {
        let err = SearchError::transport("physrisk", "connection refused");
        assert_eq!(
            err.to_string(),
            "transport error from physrisk: connection refused"
        );
    }

    #[test]
    fn display_request_failed_keeps_body() {
        let err = SearchError::RequestFailed {
            service: "watchman".into(),
            status: 503,
            body: "upstream unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "watchman request failed with status 503: upstream unavailable"
        );
    }

    #[test]
    fn display_adapter_failure() {
        let err = SearchError::AdapterFailure {
            adapter: "trafilatura".into(),
            message: "panicked".into(),
        };
        assert_eq!(err.to_string(), "adapter trafilatura failed: panicked");
    }

    #[test]
    fn display_parse_and_config() {
        assert_eq!(
            SearchError::Parse("no extractable content found".into()).to_string(),
            "parse error: no extractable content found"
        );
        assert_eq!(
            SearchError::Config("result_limit must be greater than 0".into()).to_string(),
            "config error: result_limit must be greater than 0"
        );
    }

    #[test]
    fn kinds_are_distinct() {
        let kinds = [
            SearchError::transport("a", "b").kind(),
            SearchError::RequestFailed {
                service: "a".into(),
                status: 500,
                body: String::new(),
            }
            .kind(),
            SearchError::AdapterFailure {
                adapter: "a".into(),
                message: "b".into(),
            }
            .kind(),
            SearchError::Parse("x".into()).kind(),
            SearchError::Config("x".into()).kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
