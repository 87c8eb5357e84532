//! Document, filter and query types shared by every store implementation.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value as JsonValue};

pub use fields::is_valid_id;

/// A stored document: a JSON object whose `id` key carries the identifier.
pub type Document = Map<String, JsonValue>;

/// A single predicate applied to one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value. `Null` matches missing or null fields.
    Eq(JsonValue),
    /// Numeric field is greater than or equal to the bound.
    Gte(f64),
    /// Field equals any of the values.
    In(Vec<JsonValue>),
    /// Case-insensitive regular expression match. The pattern is used as-is,
    /// callers embedding user text must escape it first.
    Matches(String),
}

/// Conjunction of field conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Condition)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter matching a single identifier.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq("id", JsonValue::String(id.into()))
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.set(field, Condition::Eq(value.into()));
        self
    }

    pub fn gte(mut self, field: impl Into<String>, bound: f64) -> Self {
        self.set(field, Condition::Gte(bound));
        self
    }

    pub fn any_of(mut self, field: impl Into<String>, values: Vec<JsonValue>) -> Self {
        self.set(field, Condition::In(values));
        self
    }

    pub fn matches(mut self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.set(field, Condition::Matches(pattern.into()));
        self
    }

    /// Set the condition for a field, replacing any earlier condition on it.
    pub fn set(&mut self, field: impl Into<String>, condition: Condition) {
        let field = field.into();
        match self.conditions.iter_mut().find(|(name, _)| *name == field) {
            Some(existing) => existing.1 = condition,
            None => self.conditions.push((field, condition)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, condition)| condition)
    }

    pub fn conditions(&self) -> &[(String, Condition)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Parameters of a `find` call.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Filter,
    pub sort: Vec<SortSpec>,
    pub skip: u64,
    pub limit: Option<u64>,
    /// Fields to keep besides `id`. `None` returns whole documents.
    pub projection: Option<Vec<String>>,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn sort(mut self, sort: Vec<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    /// SQLite offsets are signed 64-bit, so `skip` is capped at `i64::MAX`.
    pub fn page(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip.min(i64::MAX as u64);
        self.limit = Some(limit);
        self
    }

    pub fn projection(mut self, projection: Option<Vec<String>>) -> Self {
        self.projection = projection;
        self
    }
}

/// Generate a 24 character hexadecimal identifier: four bytes of unix
/// seconds followed by eight random bytes.
pub fn generate_id() -> String {
    let seconds = Utc::now().timestamp() as u32;
    let random: u64 = rand::random();
    format!("{:08x}{:016x}", seconds, random)
}

/// Current time as a fixed-width RFC 3339 string. Fixed width keeps
/// lexicographic order equal to chronological order inside the store.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
