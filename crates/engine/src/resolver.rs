use crate::error::{ResolveError, Result};
use crate::normalize::{normalize_entity, normalize_time, NormalizedTime};
use crate::similarity::similarity;
use crate::table::{Field, ReferenceRow, ReferenceTable};
use timeref_protocol::QueryKind;

/// Minimum combined score a best candidate needs to be returned.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.75;
/// Entity share of the two-field (chronological) score.
pub const ENTITY_WEIGHT: f64 = 0.6;
/// Event share of the two-field (chronological) score.
pub const EVENT_WEIGHT: f64 = 0.4;

/// How rows of a table are constrained and scored.
///
/// The before/after pairs share a strategy and differ only by the table they scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Entity similarity under a year/month constraint.
    EntityAtTime,
    /// Weighted entity + event similarity, no time constraint.
    EntityAroundEvent,
    /// Event similarity alone.
    Event,
}

impl MatchStrategy {
    #[must_use]
    pub const fn for_kind(kind: QueryKind) -> Self {
        match kind {
            QueryKind::BeforeAbsoluteReference
            | QueryKind::AfterAbsoluteReference
            | QueryKind::EntityTimeEvent => Self::EntityAtTime,
            QueryKind::BeforeChronologicalReference
            | QueryKind::AfterChronologicalReference => Self::EntityAroundEvent,
            QueryKind::EventTime => Self::Event,
        }
    }

    /// Columns a table must carry to be scanned with this strategy.
    #[must_use]
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::EntityAtTime => &[Field::Entity, Field::Time, Field::Answer],
            Self::EntityAroundEvent => &[Field::Entity, Field::Event, Field::Answer],
            Self::Event => &[Field::Event, Field::Answer],
        }
    }
}

/// Raw query inputs, one shape per strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    EntityAtTime { entity: String, time: String },
    EntityAroundEvent { entity: String, event: String },
    Event { event: String },
}

impl Query {
    #[must_use]
    pub const fn strategy(&self) -> MatchStrategy {
        match self {
            Self::EntityAtTime { .. } => MatchStrategy::EntityAtTime,
            Self::EntityAroundEvent { .. } => MatchStrategy::EntityAroundEvent,
            Self::Event { .. } => MatchStrategy::Event,
        }
    }
}

/// Normalized form of a [`Query`], computed once per resolution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PreparedQuery {
    EntityAtTime { entity: String, time: NormalizedTime },
    EntityAroundEvent { entity: String, event: String },
    Event { event: String },
}

impl PreparedQuery {
    /// Normalize inputs for `kind`; fails before any table is touched.
    pub(crate) fn new(kind: QueryKind, query: &Query) -> Result<Self> {
        if query.strategy() != MatchStrategy::for_kind(kind) {
            return Err(ResolveError::InvalidArguments {
                kind,
                reason: format!("expected {}", kind.required_args().join(", ")),
            });
        }
        let required = |name: &'static str, value: &str| -> Result<String> {
            if value.trim().is_empty() {
                return Err(ResolveError::MissingArgument { kind, name });
            }
            Ok(value.to_string())
        };
        let prepared = match query {
            Query::EntityAtTime { entity, time } => Self::EntityAtTime {
                entity: normalize_entity(&required("entity", entity.as_str())?),
                time: normalize_time(&required("time", time.as_str())?)?,
            },
            Query::EntityAroundEvent { entity, event } => Self::EntityAroundEvent {
                entity: normalize_entity(&required("entity", entity.as_str())?),
                event: normalize_entity(&required("event", event.as_str())?),
            },
            Query::Event { event } => Self::Event {
                event: normalize_entity(&required("event", event.as_str())?),
            },
        };
        Ok(prepared)
    }
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub kind: QueryKind,
    pub answer: String,
    pub score: f64,
    /// Zero-based index of the winning row in its table.
    pub row: usize,
}

/// Running best candidate of one scan. Strictly greater scores replace the
/// current best, so ties keep the earliest row.
#[derive(Debug, Clone, Default)]
pub struct BestMatch<'t> {
    best_score: f64,
    best: Option<(usize, &'t str)>,
}

impl<'t> BestMatch<'t> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offer(&mut self, score: f64, row: usize, answer: &'t str) {
        if score > self.best_score {
            self.best_score = score;
            self.best = Some((row, answer));
        }
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.best_score
    }

    /// Apply the acceptance gate.
    pub fn finish(self, kind: QueryKind) -> Result<Resolution> {
        match self.best {
            Some((row, answer)) if self.best_score >= ACCEPTANCE_THRESHOLD => Ok(Resolution {
                kind,
                answer: answer.to_string(),
                score: self.best_score,
                row,
            }),
            _ => Err(ResolveError::NoMatch { kind }),
        }
    }
}

/// Scans one reference table for the best answer to a query of one kind.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'t> {
    kind: QueryKind,
    table: &'t ReferenceTable,
}

impl<'t> Resolver<'t> {
    #[must_use]
    pub fn new(kind: QueryKind, table: &'t ReferenceTable) -> Self {
        Self { kind, table }
    }

    #[must_use]
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn resolve(&self, query: &Query) -> Result<Resolution> {
        let prepared = PreparedQuery::new(self.kind, query)?;
        self.scan(&prepared)
    }

    /// Fails with `TableLoad` when the table lacks a column the strategy reads.
    pub(crate) fn scan(&self, prepared: &PreparedQuery) -> Result<Resolution> {
        self.table.require_fields(MatchStrategy::for_kind(self.kind).fields())?;
        let mut best = BestMatch::new();
        for (index, row) in self.table.rows().iter().enumerate() {
            let Some(score) = self.score_row(prepared, row, index) else {
                continue;
            };
            best.offer(score, index, row.get(Field::Answer).unwrap_or_default());
        }

        log::debug!(
            "{}: best score {:.4} over {} rows of {}",
            self.kind,
            best.score(),
            self.table.len(),
            self.table.source().display()
        );
        best.finish(self.kind)
    }

    /// `None` when the row is rejected by a hard constraint.
    fn score_row(&self, query: &PreparedQuery, row: &ReferenceRow, index: usize) -> Option<f64> {
        let key = |field: Field| normalize_entity(row.get(field).unwrap_or_default());
        match query {
            PreparedQuery::EntityAtTime { entity, time } => {
                let raw_time = row.get(Field::Time).unwrap_or_default();
                let row_time = match normalize_time(raw_time) {
                    Ok(t) => t,
                    Err(err) => {
                        log::warn!(
                            "{}: skipping row {index} of {}: {err}",
                            self.kind,
                            self.table.source().display()
                        );
                        return None;
                    }
                };
                if !time.agrees_with(&row_time) {
                    return None;
                }
                Some(similarity(entity, &key(Field::Entity)))
            }
            PreparedQuery::EntityAroundEvent { entity, event } => Some(
                ENTITY_WEIGHT * similarity(entity, &key(Field::Entity))
                    + EVENT_WEIGHT * similarity(event, &key(Field::Event)),
            ),
            PreparedQuery::Event { event } => Some(similarity(event, &key(Field::Event))),
        }
    }
}
