//! Caller-owned view state.
//!
//! The listing engine is pure; everything a page remembers between renders
//! (filters, sort, current page, which collection the cards summarize) lives
//! here and is passed in on every call.

use serde::{Deserialize, Serialize};

use crate::{Constraint, EngineError, FilterCriteria, ResultEngine, paginate::DEFAULT_PAGE_SIZE};

/// Which collection the summary cards are computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryScope {
    /// Cards follow the active filters.
    Filtered,
    /// Cards show global KPIs regardless of filters.
    Unfiltered,
}

impl SummaryScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filtered => "filtered",
            Self::Unfiltered => "unfiltered",
        }
    }
}

impl TryFrom<&str> for SummaryScope {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "filtered" => Ok(Self::Filtered),
            "unfiltered" => Ok(Self::Unfiltered),
            other => Err(EngineError::InvalidCriteria(format!(
                "invalid summary scope: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// State of one listing page.
///
/// Changing the criteria or the page size sends the view back to page 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub criteria: FilterCriteria,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    /// 1-based.
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub summary_scope: SummaryScope,
}

impl ViewState {
    pub fn new(summary_scope: SummaryScope) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            summary_scope,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, constraint: Constraint) -> Self {
        self.set_filter(key, constraint);
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> ResultEngine<Self> {
        self.set_page_size(page_size)?;
        Ok(self)
    }

    pub fn set_filter(&mut self, key: impl Into<String>, constraint: Constraint) {
        self.criteria.set(key, constraint);
        self.page = 1;
    }

    pub fn remove_filter(&mut self, key: &str) {
        if self.criteria.remove(key).is_some() {
            self.page = 1;
        }
    }

    pub fn clear_filters(&mut self) {
        self.criteria.clear();
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Sets the page size and resets to the first page.
    pub fn set_page_size(&mut self, page_size: u32) -> ResultEngine<()> {
        if page_size == 0 {
            return Err(EngineError::InvalidPageSize(page_size));
        }
        self.page_size = page_size;
        self.page = 1;
        Ok(())
    }

    /// Moves forward, stopping at `total_pages`.
    pub fn next_page(&mut self, total_pages: u32) {
        self.page = self.page.saturating_add(1).min(total_pages.max(1));
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }
}
