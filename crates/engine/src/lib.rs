//! Resolve temporal and entity references against CSV reference tables.
//!
//! A lookup normalizes its inputs, scans the table bound to its query kind,
//! drops rows that fail the year/month constraint, scores the rest with a
//! directional lexical similarity and returns the best answer scoring at least
//! [`ACCEPTANCE_THRESHOLD`].

mod cache;
mod config;
mod engine;
mod error;
mod invocation;
mod normalize;
mod resolver;
mod similarity;
mod table;

pub use cache::TableCache;
pub use config::{
    default_file_name, EngineConfig, TablePaths, DEFAULT_CONFIG_FILE, ENV_CONFIG, ENV_DATA_DIR,
};
pub use engine::{Engine, TableReport};
pub use error::{ResolveError, Result};
pub use invocation::ToolCall;
pub use normalize::{normalize_entity, normalize_time, NormalizedTime};
pub use resolver::{
    BestMatch, MatchStrategy, Query, Resolution, Resolver, ACCEPTANCE_THRESHOLD, ENTITY_WEIGHT,
    EVENT_WEIGHT,
};
pub use similarity::{
    char_ngrams, ngram_containment, similarity, token_containment, LexicalScore, NGRAM_SIZE,
    NGRAM_WEIGHT, TOKEN_WEIGHT,
};
pub use table::{Field, ReferenceRow, ReferenceTable};
pub use timeref_protocol::QueryKind;
