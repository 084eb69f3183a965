//! Criteria matching.
//!
//! A [`FilterCriteria`] is the untyped description of what a view filters on
//! (it deserializes straight from a query or a saved view). Before touching
//! any record it is compiled into a [`Matcher`] against the entity's accessor
//! table, so every field name, status value and bound is checked once.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, Field, FieldKind, FieldValue, Money, Record, ResultEngine, Status};

/// Equality value that disables a constraint (the "All" entry of a dropdown).
pub const ALL_SENTINEL: &str = "all";

/// A single filter constraint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Constraint {
    /// Exact match. `"all"` and `""` always pass. Money values are minor
    /// units, like range bounds.
    Equals { value: String },
    /// Case-insensitive substring match.
    Contains { pattern: String },
    /// Inclusive range, either bound optional.
    Range {
        #[serde(default)]
        min: Option<Bound>,
        #[serde(default)]
        max: Option<Bound>,
    },
    /// Passes if any of `fields` contains `pattern` (search boxes).
    AnyContains { fields: Vec<String>, pattern: String },
}

impl Constraint {
    pub fn equals(value: impl Into<String>) -> Self {
        Self::Equals {
            value: value.into(),
        }
    }

    pub fn contains(pattern: impl Into<String>) -> Self {
        Self::Contains {
            pattern: pattern.into(),
        }
    }

    pub fn range(min: Option<Bound>, max: Option<Bound>) -> Self {
        Self::Range { min, max }
    }

    pub fn any_contains<I, S>(fields: I, pattern: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AnyContains {
            fields: fields.into_iter().map(Into::into).collect(),
            pattern: pattern.into(),
        }
    }
}

/// Range bound. Money fields take minor units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Number(f64),
    Time(DateTime<Utc>),
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Money> for Bound {
    fn from(value: Money) -> Self {
        Self::Number(value.minor() as f64)
    }
}

impl From<DateTime<Utc>> for Bound {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Time(value)
    }
}

/// Active constraints of a view, keyed by field name (or a free label for
/// [`Constraint::AnyContains`]). A missing key means no constraint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCriteria {
    entries: BTreeMap<String, Constraint>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, constraint: Constraint) -> Self {
        self.set(key, constraint);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, constraint: Constraint) {
        self.entries.insert(key.into(), constraint);
    }

    pub fn remove(&mut self, key: &str) -> Option<Constraint> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, key: &str) -> Option<&Constraint> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c))
    }
}

/// Normalizes text for substring search: NFKD, combining marks dropped,
/// lowercased.
pub(crate) fn normalize_text(input: &str) -> String {
    input
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Clone, Debug)]
enum Expected {
    Text(String),
    Status(&'static str),
    Number(f64),
    Money(Money),
    Timestamp(DateTime<Utc>),
    Flag(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
enum Ordinal {
    Number(f64),
    Time(DateTime<Utc>),
}

#[derive(Debug)]
enum Check<R: 'static> {
    Equals(&'static Field<R>, Expected),
    Contains(&'static Field<R>, String),
    Range {
        field: &'static Field<R>,
        min: Option<Ordinal>,
        max: Option<Ordinal>,
    },
    AnyContains(Vec<&'static Field<R>>, String),
}

/// Criteria compiled against the accessor table of `R`.
#[derive(Debug)]
pub struct Matcher<R: 'static> {
    checks: Vec<Check<R>>,
}

impl<R: Record> Matcher<R> {
    /// Compiles `criteria`, rejecting unknown fields and constraints that
    /// cannot apply to a field's kind.
    pub fn new(criteria: &FilterCriteria) -> ResultEngine<Self> {
        let mut checks = Vec::with_capacity(criteria.len());
        for (key, constraint) in criteria.iter() {
            if let Some(check) = compile_constraint::<R>(key, constraint)? {
                checks.push(check);
            }
        }
        tracing::debug!(
            entity = %R::ENTITY,
            constraints = criteria.len(),
            active = checks.len(),
            "compiled criteria"
        );
        Ok(Self { checks })
    }

    /// A matcher without constraints; matches everything.
    pub fn all() -> Self {
        Self { checks: Vec::new() }
    }

    /// Returns `true` if no constraint survived compilation.
    pub fn is_unconstrained(&self) -> bool {
        self.checks.is_empty()
    }

    /// A record matches iff every constraint passes.
    pub fn matches(&self, record: &R) -> bool {
        self.checks.iter().all(|check| check.passes(record))
    }

    /// Keeps the records this matcher accepts, preserving order.
    pub fn filter<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Decides whether `record` passes every constraint of `criteria`.
///
/// Compiles `criteria` on each call; use a [`Matcher`] when checking many
/// records against the same criteria.
pub fn matches<R: Record>(record: &R, criteria: &FilterCriteria) -> ResultEngine<bool> {
    Ok(Matcher::<R>::new(criteria)?.matches(record))
}

/// Keeps the records accepted by `criteria`, preserving order.
pub fn filter<'a, R: Record>(
    records: &'a [R],
    criteria: &FilterCriteria,
) -> ResultEngine<Vec<&'a R>> {
    Ok(Matcher::<R>::new(criteria)?.filter(records))
}

fn compile_constraint<R: Record>(
    key: &str,
    constraint: &Constraint,
) -> ResultEngine<Option<Check<R>>> {
    match constraint {
        Constraint::Equals { value } => {
            let field = R::require_field(key)?;
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed == ALL_SENTINEL {
                return Ok(None);
            }
            Ok(Some(Check::Equals(field, parse_expected::<R>(field, value)?)))
        }
        Constraint::Contains { pattern } => {
            let field = R::require_field(key)?;
            ensure_textual(field)?;
            let pattern = normalize_text(pattern.trim());
            if pattern.is_empty() {
                return Ok(None);
            }
            Ok(Some(Check::Contains(field, pattern)))
        }
        Constraint::Range { min, max } => {
            let field = R::require_field(key)?;
            if !field.kind.is_ordered() {
                return Err(EngineError::InvalidCriteria(format!(
                    "range on {} field '{}'",
                    field.kind.as_str(),
                    field.name
                )));
            }
            let min = min.map(|b| ordinal(field, b)).transpose()?;
            let max = max.map(|b| ordinal(field, b)).transpose()?;
            if let (Some(lo), Some(hi)) = (min, max)
                && lo > hi
            {
                return Err(EngineError::InvalidCriteria(format!(
                    "invalid range for '{}': min must be <= max",
                    field.name
                )));
            }
            if min.is_none() && max.is_none() {
                return Ok(None);
            }
            Ok(Some(Check::Range { field, min, max }))
        }
        Constraint::AnyContains { fields, pattern } => {
            if fields.is_empty() {
                return Err(EngineError::InvalidCriteria(format!(
                    "search '{key}' must name at least one field"
                )));
            }
            let fields = fields
                .iter()
                .map(|name| {
                    let field = R::require_field(name)?;
                    ensure_textual(field)?;
                    Ok(field)
                })
                .collect::<ResultEngine<Vec<_>>>()?;
            let pattern = normalize_text(pattern.trim());
            if pattern.is_empty() {
                return Ok(None);
            }
            Ok(Some(Check::AnyContains(fields, pattern)))
        }
    }
}

fn ensure_textual<R>(field: &Field<R>) -> ResultEngine<()> {
    if field.kind.is_textual() {
        return Ok(());
    }
    Err(EngineError::InvalidCriteria(format!(
        "substring match on {} field '{}'",
        field.kind.as_str(),
        field.name
    )))
}

/// Text compares exactly; every other kind is parsed from the trimmed value.
fn parse_expected<R: Record>(field: &Field<R>, raw: &str) -> ResultEngine<Expected> {
    let value = raw.trim();
    let invalid = |what: &str| {
        EngineError::InvalidCriteria(format!("'{value}' is not a valid {what} for '{}'", field.name))
    };
    match field.kind {
        FieldKind::Id | FieldKind::Text => Ok(Expected::Text(raw.to_string())),
        FieldKind::Status => R::Status::parse(value)
            .map(|s| Expected::Status(s.as_str()))
            .ok_or_else(|| EngineError::UnknownStatus(format!("{}: {value}", R::ENTITY))),
        FieldKind::Number => value
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Expected::Number)
            .ok_or_else(|| invalid("number")),
        FieldKind::Money => value
            .parse::<i64>()
            .map(|minor| Expected::Money(Money::new(minor)))
            .map_err(|_| invalid("amount in minor units")),
        FieldKind::Timestamp => DateTime::parse_from_rfc3339(value)
            .map(|at| Expected::Timestamp(at.with_timezone(&Utc)))
            .map_err(|_| invalid("RFC 3339 timestamp")),
        FieldKind::Flag => match value {
            "true" | "yes" => Ok(Expected::Flag(true)),
            "false" | "no" => Ok(Expected::Flag(false)),
            _ => Err(invalid("flag")),
        },
    }
}

fn ordinal<R>(field: &Field<R>, bound: Bound) -> ResultEngine<Ordinal> {
    match (field.kind, bound) {
        (FieldKind::Number | FieldKind::Money, Bound::Number(n)) if n.is_finite() => {
            Ok(Ordinal::Number(n))
        }
        (FieldKind::Timestamp, Bound::Time(at)) => Ok(Ordinal::Time(at)),
        _ => Err(EngineError::InvalidCriteria(format!(
            "bound {bound:?} does not fit {} field '{}'",
            field.kind.as_str(),
            field.name
        ))),
    }
}

fn value_ordinal(value: &FieldValue<'_>) -> Option<Ordinal> {
    match value {
        FieldValue::Number(n) => Some(Ordinal::Number(*n)),
        FieldValue::Money(m) => Some(Ordinal::Number(m.minor() as f64)),
        FieldValue::Timestamp(at) => Some(Ordinal::Time(*at)),
        _ => None,
    }
}

fn text_contains(value: &FieldValue<'_>, pattern: &str) -> bool {
    match value {
        FieldValue::Text(text) => normalize_text(text).contains(pattern),
        _ => false,
    }
}

impl<R: Record> Check<R> {
    fn passes(&self, record: &R) -> bool {
        match self {
            Check::Equals(field, expected) => {
                match (field.read(record), expected) {
                    (FieldValue::Text(actual), Expected::Text(wanted)) => actual == wanted,
                    (FieldValue::Status(actual), Expected::Status(wanted)) => actual == *wanted,
                    (FieldValue::Number(actual), Expected::Number(wanted)) => actual == *wanted,
                    (FieldValue::Money(actual), Expected::Money(wanted)) => actual == *wanted,
                    (FieldValue::Timestamp(actual), Expected::Timestamp(wanted)) => {
                        actual == *wanted
                    }
                    (FieldValue::Flag(actual), Expected::Flag(wanted)) => actual == *wanted,
                    _ => false,
                }
            }
            Check::Contains(field, pattern) => text_contains(&field.read(record), pattern),
            Check::Range { field, min, max } => {
                let Some(actual) = value_ordinal(&field.read(record)) else {
                    return false;
                };
                min.is_none_or(|lo| lo <= actual) && max.is_none_or(|hi| actual <= hi)
            }
            Check::AnyContains(fields, pattern) => fields
                .iter()
                .any(|field| text_contains(&field.read(record), pattern)),
        }
    }
}
