use crate::cache::TableCache;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::invocation::ToolCall;
use crate::resolver::{MatchStrategy, PreparedQuery, Query, Resolution, Resolver};
use crate::table::ReferenceTable;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use timeref_protocol::{ErrorEnvelope, QueryKind, ResponseMeta, ToolRequest, ToolResponse};

/// Binds each query kind to its configured table and runs tool invocations.
pub struct Engine {
    config: EngineConfig,
    cache: Option<TableCache>,
}

/// Load status of one configured table.
#[derive(Debug)]
pub struct TableReport {
    pub kind: QueryKind,
    pub path: PathBuf,
    /// Row count, or the load error message.
    pub rows: std::result::Result<usize, String>,
}

impl Engine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let cache = config.cache_tables.then(TableCache::new);
        Self { config, cache }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The table bound to `kind`, checked for the columns its strategy needs.
    pub fn table(&self, kind: QueryKind) -> Result<(Arc<ReferenceTable>, bool)> {
        let path = self.config.table_path(kind);
        let (table, cached) = match &self.cache {
            Some(cache) => cache.get_or_load(&path)?,
            None => (Arc::new(ReferenceTable::load(&path)?), false),
        };
        table.require_fields(MatchStrategy::for_kind(kind).fields())?;
        Ok((table, cached))
    }

    pub fn resolve(&self, kind: QueryKind, query: &Query) -> Result<Resolution> {
        self.resolve_inner(kind, query).map(|(resolution, _)| resolution)
    }

    /// Parse and run a named tool with its argument object.
    pub fn call(&self, tool_name: &str, arguments: &Map<String, Value>) -> Result<Resolution> {
        let call = ToolCall::parse(tool_name, arguments)?;
        self.resolve(call.kind, &call.query)
    }

    /// Run a request and wrap the outcome in a response envelope.
    pub fn dispatch(&self, request: &ToolRequest) -> ToolResponse {
        let started = Instant::now();
        let outcome = ToolCall::parse(&request.tool_name, &request.arguments)
            .and_then(|call| self.resolve_inner(call.kind, &call.query));

        match outcome {
            Ok((resolution, cached)) => {
                let meta = ResponseMeta {
                    latency_ms: started.elapsed().as_millis() as u64,
                    score: Some(resolution.score),
                    row: Some(resolution.row),
                    table_cached: Some(cached),
                };
                ToolResponse::ok(resolution.answer, meta)
            }
            Err(err) => {
                log::info!("{} failed: {err}", request.tool_name);
                ToolResponse::error(ErrorEnvelope {
                    code: err.code(),
                    message: err.to_string(),
                    hint: err.hint(),
                })
            }
        }
    }

    /// Try to load every configured table.
    pub fn check_tables(&self) -> Vec<TableReport> {
        QueryKind::ALL
            .into_iter()
            .map(|kind| TableReport {
                kind,
                path: self.config.table_path(kind),
                rows: self
                    .table(kind)
                    .map(|(table, _)| table.len())
                    .map_err(|err| err.to_string()),
            })
            .collect()
    }

    fn resolve_inner(&self, kind: QueryKind, query: &Query) -> Result<(Resolution, bool)> {
        let prepared = PreparedQuery::new(kind, query)?;
        let (table, cached) = self.table(kind)?;
        let resolution = Resolver::new(kind, &table).scan(&prepared)?;
        Ok((resolution, cached))
    }
}
