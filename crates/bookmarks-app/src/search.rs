// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::borrow::Cow;

use crate::ArticleRow;

pub fn normalize_search_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// `normalized_term` must already be trimmed and lower-cased.
pub fn row_matches(row: &ArticleRow, normalized_term: &str) -> bool {
    let tags = row.tags_label();
    [
        row.title.as_deref(),
        row.creator.as_deref(),
        row.site.as_deref(),
        tags.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|value| !value.is_empty())
    .any(|value| value.to_lowercase().contains(normalized_term))
}

/// Narrows `rows` to those matching `term`. A blank term returns the input as-is.
pub fn filter_rows<'a>(rows: &'a [ArticleRow], term: &str) -> Cow<'a, [ArticleRow]> {
    let normalized = normalize_search_term(term);
    if normalized.is_empty() {
        return Cow::Borrowed(rows);
    }

    Cow::Owned(
        rows.iter()
            .filter(|row| row_matches(row, &normalized))
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::{filter_rows, normalize_search_term, row_matches};
    use crate::ArticleRow;
    use std::borrow::Cow;

    fn rows() -> Vec<ArticleRow> {
        vec![
            ArticleRow {
                tags: Some(vec!["js".to_owned()]),
                ..ArticleRow::titled("Intro to React")
            },
            ArticleRow {
                creator: Some("Jane Doe".to_owned()),
                site: Some("blog.example".to_owned()),
                ..ArticleRow::titled("Gardening")
            },
            ArticleRow {
                tags: Some(vec!["rust".to_owned(), "wasm".to_owned()]),
                ..ArticleRow::default()
            },
            ArticleRow {
                url: Some("https://react.dev".to_owned()),
                archive: Some("react.html".to_owned()),
                ..ArticleRow::default()
            },
        ]
    }

    #[test]
    fn blank_term_borrows_input() {
        let rows = rows();
        let filtered = filter_rows(&rows, "   ");
        assert!(matches!(filtered, Cow::Borrowed(_)));
        assert_eq!(filtered.as_ref(), rows.as_slice());
    }

    #[test]
    fn title_match_is_case_insensitive() {
        let rows = rows();
        let filtered = filter_rows(&rows, "  REACT ");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title.as_deref(), Some("Intro to React"));
    }

    #[test]
    fn url_and_archive_are_not_searched() {
        let rows = rows();
        assert!(!row_matches(&rows[3], "react"));
    }

    #[test]
    fn joined_tags_are_searched() {
        let rows = rows();
        assert_eq!(filter_rows(&rows, "rust, wa").len(), 1);
        assert_eq!(filter_rows(&rows, "doe").len(), 1);
        assert_eq!(filter_rows(&rows, "example").len(), 1);
    }

    #[test]
    fn every_kept_row_matches_and_every_dropped_row_does_not() {
        let rows = rows();
        for term in ["o", "js", "garden", "zzz", "."] {
            let normalized = normalize_search_term(term);
            let filtered = filter_rows(&rows, term);
            for row in &rows {
                let kept = filtered.contains(row);
                assert_eq!(kept, row_matches(row, &normalized), "term {term:?}");
            }
        }
    }

    #[test]
    fn absent_fields_never_match() {
        let row = ArticleRow {
            tags: Some(Vec::new()),
            title: Some(String::new()),
            ..ArticleRow::default()
        };
        assert!(!row_matches(&row, "a"));
    }
}
