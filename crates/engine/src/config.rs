use crate::error::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use timeref_protocol::QueryKind;

pub const ENV_CONFIG: &str = "TIMEREF_CONFIG";
pub const ENV_DATA_DIR: &str = "TIMEREF_DATA_DIR";
pub const DEFAULT_CONFIG_FILE: &str = "timeref.toml";

/// Per-kind table locations. Relative paths are resolved against `data_dir`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TablePaths {
    pub before_absolute_reference: Option<PathBuf>,
    pub after_absolute_reference: Option<PathBuf>,
    pub before_chronological_reference: Option<PathBuf>,
    pub after_chronological_reference: Option<PathBuf>,
    pub event_time: Option<PathBuf>,
    pub entity_time_event: Option<PathBuf>,
}

impl TablePaths {
    #[must_use]
    pub fn get(&self, kind: QueryKind) -> Option<&Path> {
        let path = match kind {
            QueryKind::BeforeAbsoluteReference => &self.before_absolute_reference,
            QueryKind::AfterAbsoluteReference => &self.after_absolute_reference,
            QueryKind::BeforeChronologicalReference => &self.before_chronological_reference,
            QueryKind::AfterChronologicalReference => &self.after_chronological_reference,
            QueryKind::EventTime => &self.event_time,
            QueryKind::EntityTimeEvent => &self.entity_time_event,
        };
        path.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    /// Keep loaded tables between calls, reloading when the file changes.
    pub cache_tables: bool,
    pub tables: TablePaths,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            cache_tables: true,
            tables: TablePaths::default(),
        }
    }
}

/// `<kind>.csv`, the file name a table has when not overridden.
#[must_use]
pub fn default_file_name(kind: QueryKind) -> String {
    format!("{}.csv", kind.as_str())
}

impl EngineConfig {
    /// Parse TOML; a relative `data_dir` is anchored at `base_dir`.
    pub fn from_toml_str(raw: &str, base_dir: &Path) -> std::result::Result<Self, String> {
        let mut cfg: EngineConfig = toml::from_str(raw).map_err(|err| err.to_string())?;
        if cfg.data_dir.is_relative() {
            cfg.data_dir = base_dir.join(&cfg.data_dir);
        }
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let config_err = |reason: String| ResolveError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|err| config_err(err.to_string()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&raw, base_dir).map_err(config_err)
    }

    /// Layered lookup: explicit path, then `TIMEREF_CONFIG`, then `./timeref.toml`
    /// if present, else defaults. `TIMEREF_DATA_DIR` overrides the file's `data_dir`.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let from_env = env::var_os(ENV_CONFIG).map(PathBuf::from);
        let candidate = explicit
            .map(Path::to_path_buf)
            .or(from_env)
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.is_file().then_some(local)
            });

        let mut cfg = match candidate {
            Some(path) => {
                log::debug!("Using config {}", path.display());
                Self::load(&path)?
            }
            None => Self::default(),
        };
        if let Some(dir) = env::var_os(ENV_DATA_DIR) {
            cfg.data_dir = PathBuf::from(dir);
        }
        Ok(cfg)
    }

    #[must_use]
    pub fn table_path(&self, kind: QueryKind) -> PathBuf {
        match self.tables.get(kind) {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.data_dir.join(path),
            None => self.data_dir.join(default_file_name(kind)),
        }
    }
}
