use crate::error::{ResolveError, Result};
use crate::resolver::{MatchStrategy, Query};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use timeref_protocol::{EntityEventArgs, EntityTimeArgs, EventArgs, QueryKind, UnknownTool};

/// A parsed tool invocation: which lookup to run and with what inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub kind: QueryKind,
    pub query: Query,
}

impl ToolCall {
    /// Validate a tool name and its named arguments.
    ///
    /// Missing, null or blank required arguments are `MissingArgument`; unknown keys
    /// and non-string values are `InvalidArguments`.
    pub fn parse(tool_name: &str, arguments: &Map<String, Value>) -> Result<Self> {
        let kind: QueryKind = tool_name
            .parse()
            .map_err(|UnknownTool(name)| ResolveError::UnknownTool(name))?;

        for &name in kind.required_args() {
            let present = match arguments.get(name) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(ResolveError::MissingArgument { kind, name });
            }
        }

        let query = match MatchStrategy::for_kind(kind) {
            MatchStrategy::EntityAtTime => {
                let args: EntityTimeArgs = decode(kind, arguments)?;
                Query::EntityAtTime {
                    entity: args.entity,
                    time: args.time,
                }
            }
            MatchStrategy::EntityAroundEvent => {
                let args: EntityEventArgs = decode(kind, arguments)?;
                Query::EntityAroundEvent {
                    entity: args.entity,
                    event: args.event,
                }
            }
            MatchStrategy::Event => {
                let args: EventArgs = decode(kind, arguments)?;
                Query::Event { event: args.event }
            }
        };
        Ok(Self { kind, query })
    }
}

fn decode<T: DeserializeOwned>(kind: QueryKind, arguments: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(arguments.clone())).map_err(|err| {
        ResolveError::InvalidArguments {
            kind,
            reason: err.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn parses_each_argument_shape() {
        let call = ToolCall::parse(
            "entity_time_event",
            &args(json!({"entity": "WWII", "time": "1945-09"})),
        )
        .unwrap();
        assert_eq!(call.kind, QueryKind::EntityTimeEvent);
        assert_eq!(
            call.query,
            Query::EntityAtTime {
                entity: "WWII".to_string(),
                time: "1945-09".to_string()
            }
        );

        let call = ToolCall::parse(
            "after_chronological_reference",
            &args(json!({"entity": "Beatles", "event": "Abbey Road"})),
        )
        .unwrap();
        assert_eq!(call.query.strategy(), MatchStrategy::EntityAroundEvent);

        let call = ToolCall::parse("event_time", &args(json!({"event": "Moon landing"}))).unwrap();
        assert_eq!(
            call.query,
            Query::Event {
                event: "Moon landing".to_string()
            }
        );
    }

    #[test]
    fn unknown_tool_is_reported_by_name() {
        let err = ToolCall::parse("translation", &Map::new()).unwrap_err();
        assert!(matches!(err, ResolveError::UnknownTool(ref name) if name == "translation"));

        let err = ToolCall::parse("  translation ", &Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: translation");
    }

    #[test]
    fn chronological_kinds_require_event_not_time() {
        let err = ToolCall::parse(
            "before_chronological_reference",
            &args(json!({"entity": "Beatles", "time": "1964"})),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingArgument { name: "event", .. }
        ));
    }

    #[test]
    fn blank_and_null_arguments_count_as_missing() {
        for value in [json!({"event": ""}), json!({"event": "  "}), json!({"event": null})] {
            let err = ToolCall::parse("event_time", &args(value)).unwrap_err();
            assert!(matches!(err, ResolveError::MissingArgument { .. }), "{err}");
        }
    }

    #[test]
    fn extra_and_mistyped_arguments_are_invalid() {
        let err = ToolCall::parse(
            "event_time",
            &args(json!({"event": "x", "csv_path": "/etc/passwd"})),
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidArguments { .. }), "{err}");

        let err = ToolCall::parse("event_time", &args(json!({"event": 1969}))).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidArguments { .. }), "{err}");
    }
}
