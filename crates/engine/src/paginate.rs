//! Page-based slicing.
//!
//! Pages are **1-based** everywhere in the engine. Out-of-range pages are
//! clamped rather than producing an empty slice.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Position of a page inside a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Page actually served, after clamping.
    pub page: u32,
    pub page_size: u32,
    /// Always at least 1, even for an empty collection.
    pub total_pages: u32,
    pub total_rows: usize,
}

impl PageInfo {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Page 0 reads as the first page, as `paginate` clamps it.
    fn served_page(&self) -> usize {
        self.page.max(1) as usize
    }

    /// 1-based index of the first row on this page, 0 when empty.
    pub fn first_row(&self) -> usize {
        if self.total_rows == 0 {
            return 0;
        }
        (self.served_page() - 1)
            .saturating_mul(self.page_size as usize)
            .saturating_add(1)
            .min(self.total_rows)
    }

    /// 1-based index of the last row on this page, 0 when empty.
    pub fn last_row(&self) -> usize {
        self.served_page()
            .saturating_mul(self.page_size as usize)
            .min(self.total_rows)
    }
}

/// A window over a slice.
#[derive(Debug, PartialEq, Serialize)]
pub struct Page<'a, T> {
    pub rows: &'a [T],
    #[serde(flatten)]
    pub info: PageInfo,
}

/// `max(1, ceil(total_rows / page_size))`.
pub fn total_pages(total_rows: usize, page_size: u32) -> ResultEngine<u32> {
    if page_size == 0 {
        return Err(EngineError::InvalidPageSize(page_size));
    }
    let pages = total_rows.div_ceil(page_size as usize).max(1);
    Ok(u32::try_from(pages).unwrap_or(u32::MAX))
}

/// Slices `items` to the requested page, clamping `page` into
/// `1..=total_pages`.
pub fn paginate<T>(items: &[T], page: u32, page_size: u32) -> ResultEngine<Page<'_, T>> {
    let total_pages = total_pages(items.len(), page_size)?;
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) as usize)
        .saturating_mul(page_size as usize)
        .min(items.len());
    let end = start.saturating_add(page_size as usize).min(items.len());
    Ok(Page {
        rows: &items[start..end],
        info: PageInfo {
            page,
            page_size,
            total_pages,
            total_rows: items.len(),
        },
    })
}
