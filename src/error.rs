use std::fmt;

use serde::Serialize;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum PathoNetError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP middleware error: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    #[error("API error from {api}: {message}")]
    Api { api: String, message: String },

    #[error("API JSON error from {api}: {source}")]
    ApiJson {
        api: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("GraphQL error from {api}: {message}")]
    GraphQl { api: String, message: String },

    #[error("Missing field in {api} response: {field}")]
    MissingField { api: String, field: String },

    #[error("{stage} timed out after {secs}s")]
    Timeout { stage: String, secs: u64 },

    #[error("{entity} '{id}' not found.\n\n{suggestion}")]
    NotFound {
        entity: String,
        id: String,
        suggestion: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a pipeline stage produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network, DNS, timeout or a non-success HTTP status.
    Transport,
    /// The upstream answered, but not in the shape we expect.
    UpstreamFormat,
    /// Well-formed answer with nothing in it.
    LogicalEmpty,
    /// Raised on this side before or after talking to upstream: bad input,
    /// client setup, templates, file IO.
    Local,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transport => "transport",
            Self::UpstreamFormat => "upstream-format",
            Self::LogicalEmpty => "empty",
            Self::Local => "local",
        })
    }
}

impl PathoNetError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Http(err) if err.is_decode() => FailureKind::UpstreamFormat,
            Self::Http(_)
            | Self::HttpMiddleware(_)
            | Self::Api { .. }
            | Self::Timeout { .. } => FailureKind::Transport,
            Self::ApiJson { .. }
            | Self::GraphQl { .. }
            | Self::MissingField { .. }
            | Self::Json(_) => FailureKind::UpstreamFormat,
            Self::HttpClientInit(_)
            | Self::Io(_)
            | Self::Template(_)
            | Self::InvalidArgument(_) => FailureKind::Local,
            Self::NotFound { .. } => FailureKind::LogicalEmpty,
        }
    }
}

/// Result of one pipeline stage.
///
/// Stages never fail the run: callers that only want data use
/// [`Outcome::into_data_or_default`], which maps both `Empty` and `Failed`
/// to the empty value. The variant itself is kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Data(T),
    Empty,
    Failed { kind: FailureKind, message: String },
}

impl<T> Outcome<T> {
    pub fn from_error(err: &PathoNetError) -> Self {
        match err.failure_kind() {
            FailureKind::LogicalEmpty => Self::Empty,
            kind => Self::Failed {
                kind,
                message: err.to_string(),
            },
        }
    }

    /// `Empty` when `is_empty` holds for the value, `Data` otherwise.
    pub fn non_empty(value: T, is_empty: impl FnOnce(&T) -> bool) -> Self {
        if is_empty(&value) {
            Self::Empty
        } else {
            Self::Data(value)
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Data(_) => None,
            Self::Empty => Some(FailureKind::LogicalEmpty),
            Self::Failed { kind, .. } => Some(*kind),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Failed { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Data(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Data(value) => Outcome::Data(f(value)),
            Self::Empty => Outcome::Empty,
            Self::Failed { kind, message } => Outcome::Failed { kind, message },
        }
    }
}

impl<T: Default> Outcome<T> {
    pub fn into_data_or_default(self) -> T {
        match self {
            Self::Data(value) => value,
            Self::Empty | Self::Failed { .. } => T::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FailureKind, Outcome, PathoNetError};

    #[test]
    fn not_found_display_includes_suggestion() {
        let err = PathoNetError::NotFound {
            entity: "disease".to_string(),
            id: "zzqxnotadisease".to_string(),
            suggestion: "Try a broader phenotype such as \"kidney disease\"".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("disease 'zzqxnotadisease' not found"));
        assert!(msg.contains("Try a broader phenotype"));
    }

    #[test]
    fn api_error_display_includes_api_name() {
        let err = PathoNetError::Api {
            api: "opentargets".to_string(),
            message: "HTTP 500".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("opentargets"));
        assert!(msg.contains("HTTP 500"));
    }

    #[test]
    fn failure_kinds_split_transport_from_format() {
        let status = PathoNetError::Api {
            api: "string".into(),
            message: "HTTP 503".into(),
        };
        let timeout = PathoNetError::Timeout {
            stage: "pathway enrichment".into(),
            secs: 5,
        };
        let graphql = PathoNetError::GraphQl {
            api: "opentargets".into(),
            message: "Cannot query field".into(),
        };
        let missing = PathoNetError::MissingField {
            api: "reactome".into(),
            field: "summary.token".into(),
        };
        let json = PathoNetError::ApiJson {
            api: "reactome".into(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };

        assert_eq!(status.failure_kind(), FailureKind::Transport);
        assert_eq!(timeout.failure_kind(), FailureKind::Transport);
        assert_eq!(graphql.failure_kind(), FailureKind::UpstreamFormat);
        assert_eq!(missing.failure_kind(), FailureKind::UpstreamFormat);
        assert_eq!(json.failure_kind(), FailureKind::UpstreamFormat);
    }

    #[test]
    fn local_errors_are_not_blamed_on_upstream() {
        let invalid = PathoNetError::InvalidArgument("no identifiers".into());
        let io = PathoNetError::Io(std::io::Error::other("disk full"));
        assert_eq!(invalid.failure_kind(), FailureKind::Local);
        assert_eq!(io.failure_kind(), FailureKind::Local);
        assert_eq!(FailureKind::Local.to_string(), "local");

        let outcome = Outcome::<()>::from_error(&invalid);
        assert_eq!(outcome.kind(), Some(FailureKind::Local));
    }

    #[test]
    fn outcome_collapses_to_default_value() {
        let failed: Outcome<Vec<u8>> = Outcome::Failed {
            kind: FailureKind::Transport,
            message: "connect refused".into(),
        };
        assert_eq!(failed.kind(), Some(FailureKind::Transport));
        assert_eq!(failed.message(), Some("connect refused"));
        assert!(failed.into_data_or_default().is_empty());

        let empty: Outcome<Vec<u8>> = Outcome::non_empty(Vec::new(), Vec::is_empty);
        assert_eq!(empty, Outcome::Empty);
        assert_eq!(empty.kind(), Some(FailureKind::LogicalEmpty));

        let data = Outcome::non_empty(vec![1_u8], Vec::is_empty);
        assert_eq!(data.kind(), None);
        assert_eq!(data.map(|v| v.len()), Outcome::Data(1));
    }

    #[test]
    fn outcome_from_not_found_is_empty() {
        let err = PathoNetError::NotFound {
            entity: "disease".into(),
            id: "x".into(),
            suggestion: String::new(),
        };
        assert_eq!(Outcome::<()>::from_error(&err), Outcome::Empty);
    }
}
