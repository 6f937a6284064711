use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Arguments for the absolute-time lookups and `entity_time_event`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EntityTimeArgs {
    #[schemars(description = "Entity name as written by the user, e.g. \"Einstein's\".")]
    pub entity: String,

    #[schemars(
        description = "Reference time: YYYY, YYYY-MM, YYYY-MM-DD, or \"<month> YYYY\" (e.g. \"July 2005\")."
    )]
    pub time: String,
}

/// Arguments for the event-relative (chronological) lookups.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EntityEventArgs {
    #[schemars(description = "Entity name as written by the user.")]
    pub entity: String,

    #[schemars(description = "Reference event the answer is relative to.")]
    pub event: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EventArgs {
    #[schemars(description = "Event description whose time is requested.")]
    pub event: String,
}
