//! The listing engine: filter, sort, paginate and summarize in one call.

use std::cmp::Ordering;
use std::marker::PhantomData;

use serde::Serialize;

use crate::{
    Aggregator, FieldValue, Matcher, PageInfo, Record, ResultEngine, SortDirection,
    SortSpec, Summary, SummarySpec, SummaryScope, ViewState, criteria::normalize_text, paginate,
};

/// What a listing page renders.
#[derive(Debug, Serialize)]
pub struct Listing<'a, R> {
    pub rows: Vec<&'a R>,
    #[serde(flatten)]
    pub page: PageInfo,
    pub summary: Summary,
    pub summary_scope: SummaryScope,
}

/// Listing engine for one entity. Build it once per page and call
/// [`ListingEngine::list`] on every render.
#[derive(Debug)]
pub struct ListingEngine<R: 'static> {
    aggregator: Aggregator<R>,
}

impl<R: Record> ListingEngine<R> {
    /// Return a builder for `ListingEngine`.
    pub fn builder() -> ListingEngineBuilder<R> {
        ListingEngineBuilder::default()
    }

    /// Applies `view` to `records`.
    ///
    /// The criteria are compiled on every call, so an invalid filter is
    /// reported instead of silently showing every row.
    pub fn list<'a>(&self, records: &'a [R], view: &ViewState) -> ResultEngine<Listing<'a, R>> {
        let matcher = Matcher::<R>::new(&view.criteria)?;
        let mut rows = matcher.filter(records);

        if let Some(sort) = &view.sort {
            sort_rows(&mut rows, sort)?;
        }

        let summary = match view.summary_scope {
            SummaryScope::Filtered => self.aggregator.summarize(rows.iter().copied()),
            SummaryScope::Unfiltered => self.aggregator.summarize(records),
        };

        let page = paginate(&rows, view.page, view.page_size)?;
        tracing::debug!(
            entity = %R::ENTITY,
            total = records.len(),
            matched = page.info.total_rows,
            page = page.info.page,
            "listed records"
        );
        Ok(Listing {
            rows: page.rows.to_vec(),
            page: page.info,
            summary,
            summary_scope: view.summary_scope,
        })
    }
}

/// Sorts rows by `sort.field`. Stable; missing values last in either
/// direction; ties broken by id.
pub fn sort_rows<R: Record>(rows: &mut [&R], sort: &SortSpec) -> ResultEngine<()> {
    let field = R::require_field(&sort.field)?;
    rows.sort_by(|a, b| {
        let ord = match (field.read(a), field.read(b)) {
            (FieldValue::Missing, FieldValue::Missing) => Ordering::Equal,
            (FieldValue::Missing, _) => return Ordering::Greater,
            (_, FieldValue::Missing) => return Ordering::Less,
            (left, right) => {
                let ord = compare_values(&left, &right);
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
        };
        ord.then_with(|| a.id().cmp(b.id()))
    });
    Ok(())
}

fn compare_values(left: &FieldValue<'_>, right: &FieldValue<'_>) -> Ordering {
    match (left, right) {
        (FieldValue::Text(l), FieldValue::Text(r)) => normalize_text(l).cmp(&normalize_text(r)),
        (FieldValue::Status(l), FieldValue::Status(r)) => l.cmp(r),
        (FieldValue::Number(l), FieldValue::Number(r)) => l.total_cmp(r),
        (FieldValue::Money(l), FieldValue::Money(r)) => l.cmp(r),
        (FieldValue::Timestamp(l), FieldValue::Timestamp(r)) => l.cmp(r),
        (FieldValue::Flag(l), FieldValue::Flag(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

/// The builder for `ListingEngine`.
pub struct ListingEngineBuilder<R> {
    summary: Option<SummarySpec>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Default for ListingEngineBuilder<R> {
    fn default() -> Self {
        Self {
            summary: None,
            _record: PhantomData,
        }
    }
}

impl<R: Record> ListingEngineBuilder<R> {
    /// Overrides the entity's default summary cards.
    pub fn summary(mut self, spec: SummarySpec) -> Self {
        self.summary = Some(spec);
        self
    }

    /// Compiles the summary spec and builds the engine.
    pub fn build(self) -> ResultEngine<ListingEngine<R>> {
        let spec = self.summary.unwrap_or_else(R::summary_spec);
        Ok(ListingEngine {
            aggregator: Aggregator::new(&spec)?,
        })
    }
}
