use crate::error::{ResolveError, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Column names a reference table may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Entity,
    Time,
    Event,
    Answer,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Time => "time",
            Self::Event => "event",
            Self::Answer => "answer",
        }
    }
}

/// One immutable record: field name to raw value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceRow {
    values: BTreeMap<String, String>,
}

impl ReferenceRow {
    pub fn new<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.get_raw(field.as_str())
    }

    #[must_use]
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Ordered, read-only rows of one tabular source.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    source: PathBuf,
    headers: Vec<String>,
    rows: Vec<ReferenceRow>,
}

impl ReferenceTable {
    /// Read a CSV file with a header row. Any malformed record fails the whole load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| ResolveError::table_load(path, err))?;
        Self::from_reader(file, path)
    }

    /// Parse CSV from any reader; `source` only labels errors and logs.
    pub fn from_reader<R: Read>(reader: R, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|err| ResolveError::table_load(&source, err))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(ResolveError::table_load(&source, "missing header row"));
        }
        for (idx, name) in headers.iter().enumerate() {
            if headers[..idx].contains(name) {
                return Err(ResolveError::table_load(
                    &source,
                    format!("duplicate column `{name}`"),
                ));
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| ResolveError::table_load(&source, err))?;
            rows.push(ReferenceRow::new(
                headers.iter().cloned().zip(record.iter().map(str::to_string)),
            ));
        }

        log::debug!("Loaded {} rows from {}", rows.len(), source.display());
        Ok(Self {
            source,
            headers,
            rows,
        })
    }

    /// Fail unless every listed column is present in the header.
    pub fn require_fields(&self, fields: &[Field]) -> Result<()> {
        let missing: Vec<&str> = fields
            .iter()
            .map(|f| f.as_str())
            .filter(|name| !self.headers.iter().any(|h| h == name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(ResolveError::table_load(
            &self.source,
            format!("missing column(s): {}", missing.join(", ")),
        ))
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
