// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{PageSizeOptions, SortDirection, SortField, SortSpec, clamp_page};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_term: String,
    pub sort: SortSpec,
    pub page_size: usize,
    /// Requested page; may exceed the page count until the next clamp.
    pub current_page: usize,
    /// Last default sort handed in by the caller, used for change detection.
    pub default_sort: SortSpec,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(SortSpec::default(), PageSizeOptions::default().first())
    }
}

impl ViewState {
    pub fn new(default_sort: SortSpec, page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            sort: default_sort,
            page_size,
            current_page: 1,
            default_sort,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    SetSearch(String),
    ClearSearch,
    HeaderClicked(SortField),
    SetPageSize(i64),
    PreviousPage,
    NextPage,
    SyncDefaultSort(SortSpec),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    SearchChanged(String),
    SortChanged(SortSpec),
    PageSizeChanged(usize),
    PageChanged(usize),
}

impl ViewState {
    /// Applies one command. `total_pages` is the page count of the view the
    /// command was issued against.
    pub fn dispatch(
        &mut self,
        command: ViewCommand,
        options: &PageSizeOptions,
        total_pages: usize,
    ) -> Vec<ViewEvent> {
        match command {
            ViewCommand::SetSearch(term) => self.set_search(term),
            ViewCommand::ClearSearch => self.set_search(String::new()),
            ViewCommand::HeaderClicked(field) => {
                self.sort = if self.sort.field == field {
                    SortSpec::new(field, self.sort.direction.toggled())
                } else {
                    SortSpec::new(field, SortDirection::Asc)
                };
                let mut events = vec![ViewEvent::SortChanged(self.sort)];
                events.extend(self.reset_page());
                events
            }
            ViewCommand::SetPageSize(size) => {
                let Some(size) = options.find(size) else {
                    return Vec::new();
                };
                let mut events = Vec::new();
                if self.page_size != size {
                    self.page_size = size;
                    events.push(ViewEvent::PageSizeChanged(size));
                }
                events.extend(self.reset_page());
                events
            }
            ViewCommand::PreviousPage => {
                let previous = self.current_page.max(1).saturating_sub(1).max(1);
                self.move_to(previous)
            }
            ViewCommand::NextPage => {
                let next = (self.current_page.max(1) + 1).min(total_pages.max(1));
                self.move_to(next)
            }
            ViewCommand::SyncDefaultSort(spec) => self.sync_default_sort(spec),
        }
    }

    /// Pulls the stored page back into `[1, total_pages]`.
    pub fn clamp_page(&mut self, total_pages: usize) -> Option<ViewEvent> {
        let requested = i64::try_from(self.current_page).unwrap_or(i64::MAX);
        let clamped = clamp_page(requested, total_pages);
        if clamped == self.current_page {
            return None;
        }
        self.current_page = clamped;
        Some(ViewEvent::PageChanged(clamped))
    }

    fn set_search(&mut self, term: String) -> Vec<ViewEvent> {
        if self.search_term == term {
            return Vec::new();
        }
        let search_changed = self.search_term.trim().to_lowercase() != term.trim().to_lowercase();
        self.search_term = term;
        let mut events = vec![ViewEvent::SearchChanged(self.search_term.clone())];
        if search_changed {
            events.extend(self.reset_page());
        }
        events
    }

    fn sync_default_sort(&mut self, spec: SortSpec) -> Vec<ViewEvent> {
        let mut next = self.sort;
        if self.default_sort.field != spec.field {
            self.default_sort.field = spec.field;
            next.field = spec.field;
        }
        if self.default_sort.direction != spec.direction {
            self.default_sort.direction = spec.direction;
            next.direction = spec.direction;
        }
        if next == self.sort {
            return Vec::new();
        }
        self.sort = next;
        let mut events = vec![ViewEvent::SortChanged(next)];
        events.extend(self.reset_page());
        events
    }

    fn reset_page(&mut self) -> Option<ViewEvent> {
        self.move_to(1).pop()
    }

    fn move_to(&mut self, page: usize) -> Vec<ViewEvent> {
        if self.current_page == page {
            return Vec::new();
        }
        self.current_page = page;
        vec![ViewEvent::PageChanged(page)]
    }
}
