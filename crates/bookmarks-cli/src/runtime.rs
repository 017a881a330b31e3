// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use bookmarks_app::{SortSpec, ViewCommand, ViewController, ViewDefaults, ViewEvent, ViewModel};
use bookmarks_db::Store;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Binds the view controller to a SQLite store and refreshes rows on a
/// fixed interval.
pub struct DbRuntime {
    controller: ViewController<Store>,
    revalidate_every: Duration,
    last_fetch: Instant,
    archive_base_url: Option<String>,
}

impl DbRuntime {
    pub fn new(
        store: Store,
        defaults: ViewDefaults,
        revalidate_every: Duration,
        archive_base_url: Option<String>,
    ) -> Result<Self> {
        let rows = store
            .fetch_articles(defaults.sort)
            .context("load articles")?;
        let mut controller = ViewController::new(store, defaults, rows);
        let events = controller.hydrate();
        debug!(?events, "hydrated view state");
        Ok(Self {
            controller,
            revalidate_every,
            last_fetch: Instant::now(),
            archive_base_url,
        })
    }

    /// Applies a default sort supplied after startup. A changed default
    /// replaces whatever sort was restored from the last session.
    pub fn sync_default_sort(&mut self, spec: SortSpec) -> Vec<ViewEvent> {
        self.dispatch_logged(ViewCommand::SyncDefaultSort(spec))
    }

    pub fn controller(&self) -> &ViewController<Store> {
        &self.controller
    }

    fn revalidation_due(&self) -> bool {
        self.last_fetch.elapsed() >= self.revalidate_every
    }

    fn dispatch_logged(&mut self, command: ViewCommand) -> Vec<ViewEvent> {
        debug!(?command, "dispatch view command");
        let events = self.controller.dispatch(command);
        if !events.is_empty() {
            debug!(?events, "view state changed");
        }
        events
    }
}

impl bookmarks_tui::AppRuntime for DbRuntime {
    fn view(&self) -> ViewModel {
        self.controller.view()
    }

    fn dispatch(&mut self, command: ViewCommand) -> Vec<ViewEvent> {
        self.dispatch_logged(command)
    }

    fn revalidate(&mut self, force: bool) -> Result<Option<usize>> {
        if !force && !self.revalidation_due() {
            return Ok(None);
        }
        // A failed fetch waits a full interval before retrying.
        self.last_fetch = Instant::now();

        let sort = self.controller.state().sort;
        let rows = self
            .controller
            .backend()
            .fetch_articles(sort)
            .context("reload articles")?;
        let count = rows.len();
        self.controller.replace_rows(rows);
        info!(count, force, "revalidated articles");
        Ok(Some(count))
    }

    fn archive_base_url(&self) -> Option<&str> {
        self.archive_base_url.as_deref()
    }
}
