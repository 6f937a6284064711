use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod args;

pub use args::{EntityEventArgs, EntityTimeArgs, EventArgs};

pub const PROTOCOL_SCHEMA_VERSION: u32 = 1;

/// The six reference lookups the engine can answer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    BeforeAbsoluteReference,
    AfterAbsoluteReference,
    BeforeChronologicalReference,
    AfterChronologicalReference,
    EventTime,
    EntityTimeEvent,
}

impl QueryKind {
    pub const ALL: [QueryKind; 6] = [
        QueryKind::BeforeAbsoluteReference,
        QueryKind::AfterAbsoluteReference,
        QueryKind::BeforeChronologicalReference,
        QueryKind::AfterChronologicalReference,
        QueryKind::EventTime,
        QueryKind::EntityTimeEvent,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BeforeAbsoluteReference => "before_absolute_reference",
            Self::AfterAbsoluteReference => "after_absolute_reference",
            Self::BeforeChronologicalReference => "before_chronological_reference",
            Self::AfterChronologicalReference => "after_chronological_reference",
            Self::EventTime => "event_time",
            Self::EntityTimeEvent => "entity_time_event",
        }
    }

    /// Human label used in failure messages, e.g. "before-absolute reference".
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BeforeAbsoluteReference => "before-absolute reference",
            Self::AfterAbsoluteReference => "after-absolute reference",
            Self::BeforeChronologicalReference => "before-chronological reference",
            Self::AfterChronologicalReference => "after-chronological reference",
            Self::EventTime => "event time",
            Self::EntityTimeEvent => "entity-time event",
        }
    }

    /// Argument names the tool requires, in declaration order.
    #[must_use]
    pub const fn required_args(self) -> &'static [&'static str] {
        match self {
            Self::BeforeAbsoluteReference
            | Self::AfterAbsoluteReference
            | Self::EntityTimeEvent => &["entity", "time"],
            Self::BeforeChronologicalReference | Self::AfterChronologicalReference => {
                &["entity", "event"]
            }
            Self::EventTime => &["event"],
        }
    }

    #[must_use]
    pub const fn summary(self) -> &'static str {
        match self {
            Self::BeforeAbsoluteReference => {
                "What happened before an entity at an absolute time (year, optional month)."
            }
            Self::AfterAbsoluteReference => {
                "What happened after an entity at an absolute time (year, optional month)."
            }
            Self::BeforeChronologicalReference => {
                "What an entity did before a reference event."
            }
            Self::AfterChronologicalReference => "What an entity did after a reference event.",
            Self::EventTime => "When an event happened.",
            Self::EntityTimeEvent => "Which event involved an entity at a given time.",
        }
    }

    /// JSON Schema of the argument object this tool accepts.
    #[must_use]
    pub fn input_schema(self) -> serde_json::Value {
        let schema = match self {
            Self::BeforeAbsoluteReference
            | Self::AfterAbsoluteReference
            | Self::EntityTimeEvent => schemars::schema_for!(EntityTimeArgs),
            Self::BeforeChronologicalReference | Self::AfterChronologicalReference => {
                schemars::schema_for!(EntityEventArgs)
            }
            Self::EventTime => schemars::schema_for!(EventArgs),
        };
        serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = UnknownTool;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| UnknownTool(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tool: {0}")]
pub struct UnknownTool(pub String);

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ToolRequest {
    pub tool_name: String,
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Ok,
    Error,
}

/// Stable machine-readable failure codes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    UnknownTool,
    InvalidArguments,
    MissingArgument,
    TimeFormat,
    TableLoad,
    NoMatch,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
pub struct ResponseMeta {
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_cached: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ToolResponse {
    pub status: ToolStatus,
    pub result_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
}

impl ToolResponse {
    pub fn ok(result_text: impl Into<String>, metadata: ResponseMeta) -> Self {
        Self {
            status: ToolStatus::Ok,
            result_text: result_text.into(),
            metadata: Some(metadata),
            error: None,
        }
    }

    /// Failure envelope; `result_text` carries the message verbatim.
    pub fn error(error: ErrorEnvelope) -> Self {
        Self {
            status: ToolStatus::Error,
            result_text: error.message.clone(),
            metadata: None,
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, ToolStatus::Error)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ToolDescriptor {
    pub name: String,
    pub summary: String,
    pub required: Vec<String>,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ToolCatalog {
    pub schema_version: u32,
    pub tools: Vec<ToolDescriptor>,
}

#[must_use]
pub fn tool_catalog() -> ToolCatalog {
    let tools = QueryKind::ALL
        .into_iter()
        .map(|kind| ToolDescriptor {
            name: kind.as_str().to_string(),
            summary: kind.summary().to_string(),
            required: kind
                .required_args()
                .iter()
                .map(|arg| (*arg).to_string())
                .collect(),
            input_schema: kind.input_schema(),
        })
        .collect();
    ToolCatalog {
        schema_version: PROTOCOL_SCHEMA_VERSION,
        tools,
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}
