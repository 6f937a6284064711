use std::path::PathBuf;
use thiserror::Error;
use timeref_protocol::{ErrorCode, QueryKind};

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Unrecognized time format: {0}")]
    TimeFormat(String),

    #[error("Failed to load table {}: {reason}", path.display())]
    TableLoad { path: PathBuf, reason: String },

    #[error("No matching {} found", kind.label())]
    NoMatch { kind: QueryKind },

    #[error("Missing required argument `{name}` for {kind}")]
    MissingArgument { kind: QueryKind, name: &'static str },

    #[error("Invalid arguments for {kind}: {reason}")]
    InvalidArguments { kind: QueryKind, reason: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl ResolveError {
    pub(crate) fn table_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::TableLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable code used in response envelopes.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TimeFormat(_) => ErrorCode::TimeFormat,
            Self::TableLoad { .. } | Self::Config { .. } => ErrorCode::TableLoad,
            Self::NoMatch { .. } => ErrorCode::NoMatch,
            Self::MissingArgument { .. } => ErrorCode::MissingArgument,
            Self::InvalidArguments { .. } => ErrorCode::InvalidArguments,
            Self::UnknownTool(_) => ErrorCode::UnknownTool,
        }
    }

    /// Short remediation hint, where one exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::TimeFormat(_) => {
                Some("Use YYYY, YYYY-MM, YYYY-MM-DD, or \"<month> YYYY\".".to_string())
            }
            Self::MissingArgument { kind, .. } | Self::InvalidArguments { kind, .. } => Some(
                format!("{kind} takes: {}", kind.required_args().join(", ")),
            ),
            Self::UnknownTool(_) => Some(format!(
                "Known tools: {}",
                QueryKind::ALL
                    .iter()
                    .map(|kind| kind.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            _ => None,
        }
    }
}
