// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    ArticleRow, PageSizeOptions, Pagination, PersistedSlot, SlotBackend, SortDirection,
    SortField, SortSpec, ViewCommand, ViewEvent, ViewState, filter_rows, normalize_search_term,
    paginate, sort_rows,
};

pub const SEARCH_SLOT_KEY: &str = "bookmarks-table:search";
pub const SORT_FIELD_SLOT_KEY: &str = "bookmarks-table:sort-field";
pub const SORT_DIRECTION_SLOT_KEY: &str = "bookmarks-table:sort-direction";
pub const PAGE_SIZE_SLOT_KEY: &str = "bookmarks-table:page-size";
pub const PAGE_SLOT_KEY: &str = "bookmarks-table:page";

pub const MISSING_CELL: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIndicator {
    Ascending,
    Descending,
    None,
}

impl SortIndicator {
    pub fn for_column(sort: SortSpec, field: SortField) -> Self {
        if sort.field != field {
            return Self::None;
        }
        match sort.direction {
            SortDirection::Asc => Self::Ascending,
            SortDirection::Desc => Self::Descending,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
            Self::None => MISSING_CELL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeader {
    pub field: SortField,
    pub label: &'static str,
    pub indicator: SortIndicator,
    /// What activating the header will do, for screen readers and the status line.
    pub description: String,
}

impl ColumnHeader {
    fn new(sort: SortSpec, field: SortField) -> Self {
        let indicator = SortIndicator::for_column(sort, field);
        let label = field.label();
        let description = if indicator == SortIndicator::None {
            format!("{label}, activate to sort ascending.")
        } else {
            format!(
                "{label}, currently sorted {}. Activate to switch to {}.",
                sort.direction.label(),
                sort.direction.toggled().label(),
            )
        };
        Self {
            field,
            label,
            indicator,
            description,
        }
    }

    pub fn is_active(&self) -> bool {
        self.indicator != SortIndicator::None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyState {
    NoData,
    NoMatches(String),
}

impl EmptyState {
    pub fn message(&self) -> String {
        match self {
            Self::NoData => "No articles found.".to_owned(),
            Self::NoMatches(term) => format!("No articles found for \"{term}\"."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    /// Rows on the effective page, in display order.
    pub rows: Vec<ArticleRow>,
    /// Absolute index of `rows[0]` within the filtered sequence.
    pub first_index: usize,
    pub pagination: Pagination,
    pub page_size_options: PageSizeOptions,
    pub sort: SortSpec,
    pub search_term: String,
    pub columns: Vec<ColumnHeader>,
    pub empty_state: Option<EmptyState>,
}

impl ViewModel {
    pub fn summary(&self) -> String {
        format!(
            "{}-{} of {}",
            self.pagination.range_start, self.pagination.range_end, self.pagination.total_items
        )
    }

    pub fn page_label(&self) -> String {
        format!(
            "{} of {}",
            self.pagination.effective_page, self.pagination.total_pages
        )
    }

    pub fn active_sort_label(&self) -> String {
        format!(
            "{} sorted {}",
            self.sort.field.label(),
            self.sort.direction.label()
        )
    }

    pub fn shows_pagination(&self) -> bool {
        self.pagination.total_items > 0
    }

    pub fn row_keys(&self) -> Vec<String> {
        self.rows
            .iter()
            .enumerate()
            .map(|(offset, row)| row.display_key(self.first_index + offset))
            .collect()
    }
}

/// Derives everything the renderer needs from the state and the full row set.
/// Sorting happens before filtering so that a match keeps its sorted position.
pub fn compute_view(
    state: &ViewState,
    rows: &[ArticleRow],
    options: &PageSizeOptions,
) -> ViewModel {
    let page_size = if options.as_slice().contains(&state.page_size) {
        state.page_size
    } else {
        options.first()
    };
    let sorted = sort_rows(rows, state.sort.field, state.sort.direction);
    let filtered = filter_rows(&sorted, &state.search_term);
    let requested_page = i64::try_from(state.current_page).unwrap_or(i64::MAX);
    let page = paginate(&filtered, page_size, requested_page);
    let pagination = page.pagination;

    let empty_state = (pagination.total_items == 0).then(|| {
        if normalize_search_term(&state.search_term).is_empty() {
            EmptyState::NoData
        } else {
            EmptyState::NoMatches(state.search_term.trim().to_owned())
        }
    });

    ViewModel {
        rows: page.visible.to_vec(),
        first_index: pagination.range_start.saturating_sub(1),
        pagination,
        page_size_options: options.clone(),
        sort: state.sort,
        search_term: state.search_term.clone(),
        columns: SortField::ALL
            .into_iter()
            .map(|field| ColumnHeader::new(state.sort, field))
            .collect(),
        empty_state,
    }
}

/// Caller-supplied defaults for a table instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewDefaults {
    pub sort: SortSpec,
    pub page_size_options: PageSizeOptions,
    pub initial_page_size: Option<i64>,
}

impl ViewDefaults {
    pub fn resolved_page_size(&self) -> usize {
        self.page_size_options
            .resolve_initial(self.initial_page_size)
    }
}

#[derive(Debug)]
struct ViewSlots {
    search: PersistedSlot<String>,
    sort_field: PersistedSlot<SortField>,
    sort_direction: PersistedSlot<SortDirection>,
    page_size: PersistedSlot<i64>,
    page: PersistedSlot<i64>,
}

impl ViewSlots {
    fn new(defaults: &ViewDefaults) -> Self {
        Self {
            search: PersistedSlot::new(SEARCH_SLOT_KEY, String::new()),
            sort_field: PersistedSlot::new(SORT_FIELD_SLOT_KEY, defaults.sort.field),
            sort_direction: PersistedSlot::new(SORT_DIRECTION_SLOT_KEY, defaults.sort.direction),
            page_size: PersistedSlot::new(
                PAGE_SIZE_SLOT_KEY,
                to_slot_int(defaults.resolved_page_size()),
            ),
            page: PersistedSlot::new(PAGE_SLOT_KEY, 1),
        }
    }

    fn hydrate<B: SlotBackend + ?Sized>(&mut self, backend: &mut B) {
        self.search.hydrate(backend);
        self.sort_field.hydrate(backend);
        self.sort_direction.hydrate(backend);
        self.page_size.hydrate(backend);
        self.page.hydrate(backend);
    }

    fn store<B: SlotBackend + ?Sized>(&mut self, backend: &mut B, state: &ViewState) {
        self.search.set(backend, state.search_term.clone());
        self.sort_field.set(backend, state.sort.field);
        self.sort_direction.set(backend, state.sort.direction);
        self.page_size.set(backend, to_slot_int(state.page_size));
        self.page.set(backend, to_slot_int(state.current_page));
    }
}

fn to_slot_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Owns the rows, the durable backend and the five persisted slots of one
/// bookmarks table. Every transition is persisted before the next view is
/// computed, and the stored page is never left past the last page.
#[derive(Debug)]
pub struct ViewController<B: SlotBackend> {
    backend: B,
    defaults: ViewDefaults,
    slots: ViewSlots,
    state: ViewState,
    rows: Vec<ArticleRow>,
}

impl<B: SlotBackend> ViewController<B> {
    pub fn new(backend: B, defaults: ViewDefaults, rows: Vec<ArticleRow>) -> Self {
        let slots = ViewSlots::new(&defaults);
        let state = ViewState::new(defaults.sort, defaults.resolved_page_size());
        Self {
            backend,
            defaults,
            slots,
            state,
            rows,
        }
    }

    /// Reads every slot, then normalizes what was stored: an unknown page size
    /// falls back to the resolved initial size and the page is pulled into range.
    pub fn hydrate(&mut self) -> Vec<ViewEvent> {
        self.slots.hydrate(&mut self.backend);

        let options = &self.defaults.page_size_options;
        let stored_size = *self.slots.page_size.get();
        let page_size = options.resolve(stored_size, self.defaults.initial_page_size);
        if options.find(stored_size).is_none() {
            tracing::debug!(stored_size, page_size, "normalized stored page size");
        }

        self.state = ViewState {
            search_term: self.slots.search.get().clone(),
            sort: SortSpec::new(*self.slots.sort_field.get(), *self.slots.sort_direction.get()),
            page_size,
            current_page: usize::try_from((*self.slots.page.get()).max(1)).unwrap_or(1),
            default_sort: self.defaults.sort,
        };

        let mut events = Vec::new();
        events.extend(self.state.clamp_page(self.total_pages()));
        self.persist();
        events
    }

    pub fn dispatch(&mut self, command: ViewCommand) -> Vec<ViewEvent> {
        let total_pages = self.total_pages();
        let mut events =
            self.state
                .dispatch(command, &self.defaults.page_size_options, total_pages);
        events.extend(self.state.clamp_page(self.total_pages()));
        self.persist();
        events
    }

    /// Swaps in a freshly fetched row set and re-clamps the page.
    pub fn replace_rows(&mut self, rows: Vec<ArticleRow>) -> Vec<ViewEvent> {
        self.rows = rows;
        let events = self.state.clamp_page(self.total_pages()).into_iter().collect();
        self.persist();
        events
    }

    pub fn view(&self) -> ViewModel {
        compute_view(&self.state, &self.rows, &self.defaults.page_size_options)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn rows(&self) -> &[ArticleRow] {
        &self.rows
    }

    pub fn defaults(&self) -> &ViewDefaults {
        &self.defaults
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn total_pages(&self) -> usize {
        let normalized = normalize_search_term(&self.state.search_term);
        let matching = if normalized.is_empty() {
            self.rows.len()
        } else {
            self.rows
                .iter()
                .filter(|row| crate::row_matches(row, &normalized))
                .count()
        };
        crate::total_pages(matching, self.state.page_size)
    }

    fn persist(&mut self) {
        self.slots.store(&mut self.backend, &self.state);
    }
}
