// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Named UI values mirrored to a durable key/value store.
//!
//! A slot starts in [`SlotPhase::Loading`] holding its initial value. Writes
//! are suppressed until [`PersistedSlot::hydrate`] has read the stored value,
//! so a transient default can never clobber what a previous session saved.
//! After hydration every change is written back immediately. Storage failures
//! are logged and ignored: the in-memory value stays authoritative.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Durable store boundary for persisted UI state.
pub trait SlotBackend {
    fn read_slot(&mut self, key: &str) -> Result<Option<String>>;
    fn write_slot(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove_slot(&mut self, key: &str) -> Result<()>;
}

impl<B: SlotBackend + ?Sized> SlotBackend for &mut B {
    fn read_slot(&mut self, key: &str) -> Result<Option<String>> {
        (**self).read_slot(key)
    }

    fn write_slot(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).write_slot(key, value)
    }

    fn remove_slot(&mut self, key: &str) -> Result<()> {
        (**self).remove_slot(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPhase {
    Loading,
    Ready,
}

#[derive(Debug, Clone)]
pub struct PersistedSlot<T> {
    key: String,
    initial: T,
    value: T,
    phase: SlotPhase,
}

impl<T> PersistedSlot<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned,
{
    pub fn new(key: impl Into<String>, initial: T) -> Self {
        Self {
            key: key.into(),
            value: initial.clone(),
            initial,
            phase: SlotPhase::Loading,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn phase(&self) -> SlotPhase {
        self.phase
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Loads the stored value, replacing whatever is in memory. Missing,
    /// unparseable, or unreadable entries resolve to the initial value.
    pub fn hydrate<B: SlotBackend + ?Sized>(&mut self, backend: &mut B) -> &T {
        self.value = match backend.read_slot(&self.key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => value,
                Err(error) => {
                    debug!(key = %self.key, %error, "discarding malformed ui slot");
                    self.initial.clone()
                }
            },
            Ok(None) => self.initial.clone(),
            Err(error) => {
                debug!(key = %self.key, error = %format!("{error:#}"), "ui slot read failed");
                self.initial.clone()
            }
        };
        self.phase = SlotPhase::Ready;
        &self.value
    }

    /// Returns true when the in-memory value changed.
    pub fn set<B: SlotBackend + ?Sized>(&mut self, backend: &mut B, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        if self.phase == SlotPhase::Ready {
            self.persist(backend);
        }
        true
    }

    pub fn update<B, F>(&mut self, backend: &mut B, update: F) -> bool
    where
        B: SlotBackend + ?Sized,
        F: FnOnce(&T) -> T,
    {
        let next = update(&self.value);
        self.set(backend, next)
    }

    fn persist<B: SlotBackend + ?Sized>(&self, backend: &mut B) {
        let result = match serde_json::to_value(&self.value) {
            Ok(Value::Null) => backend.remove_slot(&self.key),
            Ok(value) => backend.write_slot(&self.key, &value.to_string()),
            Err(error) => Err(error.into()),
        };
        if let Err(error) = result {
            debug!(key = %self.key, error = %format!("{error:#}"), "ui slot write failed");
        }
    }
}

/// In-process slot store for tests, with read and write failure injection.
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    entries: BTreeMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, raw: &str) -> Self {
        self.entries.insert(key.to_owned(), raw.to_owned());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Successful writes and removals so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl SlotBackend for MemorySlots {
    fn read_slot(&mut self, key: &str) -> Result<Option<String>> {
        if self.fail_reads {
            bail!("slot storage unavailable");
        }
        Ok(self.entries.get(key).cloned())
    }

    fn write_slot(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            bail!("slot storage quota exceeded");
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        self.writes += 1;
        Ok(())
    }

    fn remove_slot(&mut self, key: &str) -> Result<()> {
        if self.fail_writes {
            bail!("slot storage unavailable");
        }
        self.entries.remove(key);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MemorySlots, PersistedSlot, SlotPhase};
    use crate::SortField;

    const SORT_KEY: &str = "bookmarks-table:sort-field";

    #[test]
    fn corrupt_entry_falls_back_to_initial() {
        let mut slots = MemorySlots::new().with_entry(SORT_KEY, "{bad json");
        let mut slot = PersistedSlot::new(SORT_KEY, SortField::Creator);
        assert_eq!(*slot.hydrate(&mut slots), SortField::Creator);
        assert_eq!(slot.phase(), SlotPhase::Ready);
    }

    #[test]
    fn stored_value_wins_over_initial() {
        let mut slots = MemorySlots::new().with_entry(SORT_KEY, "\"site\"");
        let mut slot = PersistedSlot::new(SORT_KEY, SortField::Title);
        assert_eq!(*slot.hydrate(&mut slots), SortField::Site);
    }

    #[test]
    fn unknown_enum_value_is_treated_as_malformed() {
        let mut slots = MemorySlots::new().with_entry(SORT_KEY, "\"url\"");
        let mut slot = PersistedSlot::new(SORT_KEY, SortField::Title);
        assert_eq!(*slot.hydrate(&mut slots), SortField::Title);
    }

    #[test]
    fn no_writes_before_hydration() {
        let mut slots = MemorySlots::new().with_entry("page", "4");
        let mut slot = PersistedSlot::new("page", 1_i64);
        assert!(slot.set(&mut slots, 2));
        assert_eq!(*slot.get(), 2);
        assert_eq!(slots.write_count(), 0);
        assert_eq!(slots.get("page"), Some("4"));

        assert_eq!(*slot.hydrate(&mut slots), 4);
    }

    #[test]
    fn writes_after_hydration_are_serialized() {
        let mut slots = MemorySlots::new();
        let mut slot = PersistedSlot::new("search", String::new());
        slot.hydrate(&mut slots);
        slot.set(&mut slots, "rust".to_owned());
        assert_eq!(slots.get("search"), Some("\"rust\""));
        assert_eq!(slots.write_count(), 1);
    }

    #[test]
    fn unchanged_value_is_not_rewritten() {
        let mut slots = MemorySlots::new();
        let mut slot = PersistedSlot::new("page", 1_i64);
        slot.hydrate(&mut slots);
        assert!(!slot.set(&mut slots, 1));
        assert!(slot.update(&mut slots, |page| page + 1));
        assert_eq!(slots.write_count(), 1);
        assert_eq!(slots.get("page"), Some("2"));
    }

    #[test]
    fn null_value_removes_the_key() {
        let mut slots = MemorySlots::new().with_entry("note", "\"draft\"");
        let mut slot = PersistedSlot::new("note", None::<String>);
        assert_eq!(slot.hydrate(&mut slots).as_deref(), Some("draft"));
        slot.set(&mut slots, None);
        assert_eq!(slots.get("note"), None);
    }

    #[test]
    fn write_failures_keep_memory_authoritative() {
        let mut slots = MemorySlots::new();
        let mut slot = PersistedSlot::new("page", 1_i64);
        slot.hydrate(&mut slots);
        slots.set_fail_writes(true);
        assert!(slot.set(&mut slots, 3));
        assert_eq!(*slot.get(), 3);
        assert_eq!(slots.get("page"), None);
    }

    #[test]
    fn read_failure_falls_back_to_initial() {
        let mut slots = MemorySlots::new().with_entry("page", "9");
        slots.set_fail_reads(true);
        let mut slot = PersistedSlot::new("page", 1_i64);
        assert_eq!(*slot.hydrate(&mut slots), 1);
        assert_eq!(slot.phase(), SlotPhase::Ready);
    }

    #[test]
    fn mutable_reference_is_a_backend() {
        let mut slots = MemorySlots::new();
        let mut slot = PersistedSlot::new("page", 1_i64);
        {
            let mut borrowed = &mut slots;
            slot.hydrate(&mut borrowed);
            slot.set(&mut borrowed, 5);
        }
        assert_eq!(slots.get("page"), Some("5"));
    }
}
