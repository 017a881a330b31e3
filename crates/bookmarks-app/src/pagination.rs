// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::Range;

use crate::ArticleRow;

pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 3] = [25, 50, 100];

/// Allow-list of page sizes: positive, deduplicated, ascending, never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSizeOptions {
    options: Vec<usize>,
}

impl Default for PageSizeOptions {
    fn default() -> Self {
        Self {
            options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
        }
    }
}

impl PageSizeOptions {
    pub fn normalize(options: &[i64]) -> Self {
        let mut normalized = options
            .iter()
            .filter(|option| **option > 0)
            .filter_map(|option| usize::try_from(*option).ok())
            .collect::<Vec<_>>();
        normalized.sort_unstable();
        normalized.dedup();

        if normalized.is_empty() {
            return Self::default();
        }
        Self {
            options: normalized,
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.options
    }

    pub fn first(&self) -> usize {
        self.options
            .first()
            .copied()
            .unwrap_or(DEFAULT_PAGE_SIZE_OPTIONS[0])
    }

    pub fn find(&self, size: i64) -> Option<usize> {
        let size = usize::try_from(size).ok()?;
        self.options.contains(&size).then_some(size)
    }

    pub fn resolve_initial(&self, initial: Option<i64>) -> usize {
        initial
            .and_then(|size| self.find(size))
            .unwrap_or_else(|| self.first())
    }

    /// Allow-listed `size`, else the resolved initial size.
    pub fn resolve(&self, size: i64, initial: Option<i64>) -> usize {
        self.find(size)
            .unwrap_or_else(|| self.resolve_initial(initial))
    }

    /// Option after `current` wrapping to the smallest; used by the page-size selector.
    pub fn next_after(&self, current: usize) -> usize {
        self.options
            .iter()
            .copied()
            .find(|option| *option > current)
            .unwrap_or_else(|| self.first())
    }

    pub fn previous_before(&self, current: usize) -> usize {
        self.options
            .iter()
            .rev()
            .copied()
            .find(|option| *option < current)
            .or_else(|| self.options.last().copied())
            .unwrap_or(DEFAULT_PAGE_SIZE_OPTIONS[0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub effective_page: usize,
    /// 1-based, inclusive; 0 when there are no items.
    pub range_start: usize,
    pub range_end: usize,
    pub can_go_previous: bool,
    pub can_go_next: bool,
}

impl Pagination {
    pub fn compute(total_items: usize, page_size: usize, current_page: i64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_pages(total_items, page_size);
        let effective_page = clamp_page(current_page, total_pages);
        let (range_start, range_end) = if total_items == 0 {
            (0, 0)
        } else {
            (
                (effective_page - 1) * page_size + 1,
                (effective_page * page_size).min(total_items),
            )
        };

        Self {
            page_size,
            total_items,
            total_pages,
            effective_page,
            range_start,
            range_end,
            can_go_previous: effective_page > 1,
            can_go_next: effective_page < total_pages,
        }
    }

    /// Zero-based index range of the visible slice.
    pub fn slice_range(&self) -> Range<usize> {
        if self.total_items == 0 {
            return 0..0;
        }
        (self.range_start - 1)..self.range_end
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: i64, total_pages: usize) -> usize {
    let last = i64::try_from(total_pages.max(1)).unwrap_or(i64::MAX);
    usize::try_from(page.clamp(1, last)).unwrap_or(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a> {
    pub visible: &'a [ArticleRow],
    pub pagination: Pagination,
}

pub fn paginate(rows: &[ArticleRow], page_size: usize, current_page: i64) -> Page<'_> {
    let pagination = Pagination::compute(rows.len(), page_size, current_page);
    Page {
        visible: &rows[pagination.slice_range()],
        pagination,
    }
}
