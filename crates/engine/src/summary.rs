//! Summary aggregation (the cards at the top of each listing).
//!
//! Aggregation is pure: the same records always give the same summary.
//! Empty inputs never produce NaN; averages and shares fall back to zero.

use std::collections::HashSet;

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

use crate::{
    Currency, EngineError, Field, FieldKind, FieldValue, Money, Record, ResultEngine, Status,
    money::format_percent,
};

/// One metric of a [`SummarySpec`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: MetricKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum MetricKind {
    /// Number of records.
    Count,
    /// One `"{name}.{status}"` entry per status of the entity.
    CountByStatus,
    /// Percent of records in `status`.
    Share { status: String },
    /// Sum of a number or money field.
    Sum { field: String },
    /// Arithmetic mean of a number or money field.
    Mean { field: String },
}

/// Ordered list of metrics to compute.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummarySpec {
    pub metrics: Vec<MetricSpec>,
}

impl SummarySpec {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, name: &str, kind: MetricKind) -> Self {
        self.metrics.push(MetricSpec {
            name: name.to_string(),
            kind,
        });
        self
    }

    #[must_use]
    pub fn count(self, name: &str) -> Self {
        self.push(name, MetricKind::Count)
    }

    #[must_use]
    pub fn count_by_status(self, name: &str) -> Self {
        self.push(name, MetricKind::CountByStatus)
    }

    #[must_use]
    pub fn share(self, name: &str, status: &str) -> Self {
        self.push(
            name,
            MetricKind::Share {
                status: status.to_string(),
            },
        )
    }

    #[must_use]
    pub fn sum(self, name: &str, field: &str) -> Self {
        self.push(
            name,
            MetricKind::Sum {
                field: field.to_string(),
            },
        )
    }

    #[must_use]
    pub fn mean(self, name: &str, field: &str) -> Self {
        self.push(
            name,
            MetricKind::Mean {
                field: field.to_string(),
            },
        )
    }
}

/// A computed metric.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Count(u64),
    Money(Money),
    Number(f64),
    Percent(f64),
}

impl MetricValue {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Count(n) => n as f64,
            Self::Money(m) => m.minor() as f64,
            Self::Number(n) | Self::Percent(n) => n,
        }
    }

    /// Renders the value for a dashboard card.
    pub fn render(self, currency: Currency) -> String {
        match self {
            Self::Count(n) => n.to_string(),
            Self::Money(m) => m.format(currency),
            Self::Number(n) => format!("{n:.2}"),
            Self::Percent(p) => format_percent(p),
        }
    }
}

/// Metric name to value, in declaration order for display.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
    entries: Vec<(String, MetricValue)>,
}

impl Summary {
    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, MetricValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, name: String, value: MetricValue) {
        self.entries.push((name, value));
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug)]
enum Compiled<R: 'static> {
    Count,
    CountByStatus,
    Share(&'static str),
    Sum(&'static Field<R>),
    Mean(&'static Field<R>),
}

/// A [`SummarySpec`] resolved against the accessor table of `R`.
#[derive(Debug)]
pub struct Aggregator<R: 'static> {
    metrics: Vec<(String, Compiled<R>)>,
}

impl<R: Record> Aggregator<R> {
    pub fn new(spec: &SummarySpec) -> ResultEngine<Self> {
        let mut metrics: Vec<(String, Compiled<R>)> = Vec::with_capacity(spec.metrics.len());
        // Output keys, including the per-status keys of CountByStatus.
        let mut keys: HashSet<String> = HashSet::new();
        for metric in &spec.metrics {
            let produced: Vec<String> = match metric.kind {
                MetricKind::CountByStatus => R::Status::ALL
                    .iter()
                    .map(|status| format!("{}.{}", metric.name, status.as_str()))
                    .collect(),
                _ => vec![metric.name.clone()],
            };
            for key in produced {
                if !keys.insert(key.clone()) {
                    return Err(EngineError::InvalidMetric(format!(
                        "duplicate metric '{key}'"
                    )));
                }
            }
            let compiled = match &metric.kind {
                MetricKind::Count => Compiled::Count,
                MetricKind::CountByStatus => Compiled::CountByStatus,
                MetricKind::Share { status } => {
                    let status = R::Status::parse(status).ok_or_else(|| {
                        EngineError::UnknownStatus(format!("{}: {status}", R::ENTITY))
                    })?;
                    Compiled::Share(status.as_str())
                }
                MetricKind::Sum { field } => Compiled::Sum(numeric_field::<R>(field)?),
                MetricKind::Mean { field } => Compiled::Mean(numeric_field::<R>(field)?),
            };
            metrics.push((metric.name.clone(), compiled));
        }
        Ok(Self { metrics })
    }

    pub fn summarize<'a, I>(&self, records: I) -> Summary
    where
        I: IntoIterator<Item = &'a R> + Clone,
    {
        let mut summary = Summary::default();
        for (name, metric) in &self.metrics {
            match metric {
                Compiled::Count => {
                    let n = records.clone().into_iter().count();
                    summary.insert(name.clone(), MetricValue::Count(n as u64));
                }
                Compiled::CountByStatus => {
                    let mut counts = vec![0u64; R::Status::ALL.len()];
                    for record in records.clone() {
                        let status = record.status();
                        if let Some(idx) = R::Status::ALL.iter().position(|s| *s == status) {
                            counts[idx] += 1;
                        }
                    }
                    for (status, count) in R::Status::ALL.iter().zip(counts) {
                        summary.insert(
                            format!("{name}.{}", status.as_str()),
                            MetricValue::Count(count),
                        );
                    }
                }
                Compiled::Share(status) => {
                    let (mut total, mut hits) = (0u64, 0u64);
                    for record in records.clone() {
                        total += 1;
                        if record.status().as_str() == *status {
                            hits += 1;
                        }
                    }
                    let pct = if total == 0 {
                        0.0
                    } else {
                        hits as f64 * 100.0 / total as f64
                    };
                    summary.insert(name.clone(), MetricValue::Percent(pct));
                }
                Compiled::Sum(field) => {
                    let acc = accumulate(field, records.clone());
                    summary.insert(name.clone(), acc.sum(field.kind));
                }
                Compiled::Mean(field) => {
                    let acc = accumulate(field, records.clone());
                    summary.insert(name.clone(), acc.mean(field.kind));
                }
            }
        }
        summary
    }
}

/// Computes `spec` over `records` in one call.
pub fn summarize<R: Record>(records: &[R], spec: &SummarySpec) -> ResultEngine<Summary> {
    Ok(Aggregator::<R>::new(spec)?.summarize(records))
}

fn numeric_field<R: Record>(name: &str) -> ResultEngine<&'static Field<R>> {
    let field = R::require_field(name)?;
    match field.kind {
        FieldKind::Number | FieldKind::Money => Ok(field),
        other => Err(EngineError::InvalidMetric(format!(
            "cannot aggregate {} field '{name}'",
            other.as_str()
        ))),
    }
}

#[derive(Default)]
struct Accumulator {
    present: u64,
    number: f64,
    minor: i128,
}

fn accumulate<'a, R: Record, I>(field: &Field<R>, records: I) -> Accumulator
where
    I: IntoIterator<Item = &'a R>,
{
    let mut acc = Accumulator::default();
    for record in records {
        match field.read(record) {
            FieldValue::Number(n) if n.is_finite() => {
                acc.present += 1;
                acc.number += n;
            }
            FieldValue::Money(m) => {
                acc.present += 1;
                acc.minor += i128::from(m.minor());
            }
            _ => {}
        }
    }
    acc
}

fn clamp_minor(value: i128) -> Money {
    Money::new(value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
}

impl Accumulator {
    fn sum(&self, kind: FieldKind) -> MetricValue {
        match kind {
            FieldKind::Money => MetricValue::Money(clamp_minor(self.minor)),
            _ => MetricValue::Number(self.number),
        }
    }

    fn mean(&self, kind: FieldKind) -> MetricValue {
        match kind {
            FieldKind::Money => {
                if self.present == 0 {
                    return MetricValue::Money(Money::ZERO);
                }
                let n = i128::from(self.present);
                // Round half away from zero.
                let half = n / 2;
                let rounded = if self.minor >= 0 {
                    (self.minor + half) / n
                } else {
                    (self.minor - half) / n
                };
                MetricValue::Money(clamp_minor(rounded))
            }
            _ => {
                if self.present == 0 {
                    return MetricValue::Number(0.0);
                }
                MetricValue::Number(self.number / self.present as f64)
            }
        }
    }
}
