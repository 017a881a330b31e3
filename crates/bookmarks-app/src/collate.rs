// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Case- and accent-insensitive string ordering used by every article sort.
//!
//! Comparison goes through an English ICU collator at primary strength, so
//! only base letters count: `"apple" < "Banana" < "cherry"`, `"é" == "E"`,
//! `"ø"` sorts with `"o"` and `"ß"` with `"ss"`. Numbers are not special:
//! `"10" < "9"`.

use icu_collator::{Collator, CollatorOptions, Strength};
use icu_locid::locale;
use std::cmp::Ordering;
use tracing::warn;

use crate::{ArticleRow, SortField};

pub const FALLBACK_KEY_SEPARATOR: &str = "::";

thread_local! {
    static COLLATOR: Option<Collator> = build_collator();
}

fn build_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Primary);
    match Collator::try_new(&locale!("en").into(), options) {
        Ok(collator) => Some(collator),
        Err(error) => {
            warn!(%error, "collator unavailable; sorting by code point");
            None
        }
    }
}

pub fn collate(left: &str, right: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(left, right),
        None => left.cmp(right),
    })
}

pub fn normalize_text(value: Option<&str>) -> String {
    value.map(|text| text.trim().to_lowercase()).unwrap_or_default()
}

pub fn comparable_key(row: &ArticleRow, field: SortField) -> String {
    normalize_text(row.field_text(field).as_deref())
}

pub fn fallback_key(row: &ArticleRow) -> String {
    [
        normalize_text(row.title.as_deref()),
        normalize_text(row.url.as_deref()),
        normalize_text(row.archive.as_deref()),
    ]
    .join(FALLBACK_KEY_SEPARATOR)
}

/// Ascending comparison on `field`, falling back to title/url/archive on ties.
pub fn compare_rows(left: &ArticleRow, right: &ArticleRow, field: SortField) -> Ordering {
    collate(&comparable_key(left, field), &comparable_key(right, field))
        .then_with(|| collate(&fallback_key(left), &fallback_key(right)))
}
