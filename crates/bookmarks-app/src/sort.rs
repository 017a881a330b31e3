// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::collate::{collate, comparable_key, fallback_key};
use crate::{ArticleRow, SortDirection, SortField};

/// Returns a freshly ordered copy of `rows`; the input is left untouched.
///
/// Descending order negates both the primary and the fallback comparison, so
/// with no ties the descending result is the ascending result reversed. The
/// underlying sort is stable: rows equal on both keys keep their input order.
pub fn sort_rows(
    rows: &[ArticleRow],
    field: SortField,
    direction: SortDirection,
) -> Vec<ArticleRow> {
    let mut keyed = rows
        .iter()
        .map(|row| (comparable_key(row, field), fallback_key(row), row))
        .collect::<Vec<_>>();

    keyed.sort_by(|left, right| {
        let ordering = collate(&left.0, &right.0).then_with(|| collate(&left.1, &right.1));
        apply_direction(ordering, direction)
    });

    keyed.into_iter().map(|(_, _, row)| row.clone()).collect()
}

fn apply_direction(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::sort_rows;
    use crate::collate::compare_rows;
    use crate::{ArticleRow, SortDirection, SortField};
    use std::cmp::Ordering;

    fn titles(rows: &[ArticleRow]) -> Vec<&str> {
        rows.iter().map(|row| row.title.as_deref().unwrap_or("")).collect()
    }

    fn fruit() -> Vec<ArticleRow> {
        vec![
            ArticleRow::titled("Banana"),
            ArticleRow::titled("apple"),
            ArticleRow::titled("Cherry"),
        ]
    }

    fn with_url(title: &str, url: &str) -> ArticleRow {
        ArticleRow {
            url: Some(url.to_owned()),
            ..ArticleRow::titled(title)
        }
    }

    #[test]
    fn title_ascending_ignores_case() {
        let sorted = sort_rows(&fruit(), SortField::Title, SortDirection::Asc);
        assert_eq!(titles(&sorted), vec!["apple", "Banana", "Cherry"]);
    }

    #[test]
    fn title_descending_reverses() {
        let sorted = sort_rows(&fruit(), SortField::Title, SortDirection::Desc);
        assert_eq!(titles(&sorted), vec!["Cherry", "Banana", "apple"]);
    }

    #[test]
    fn stroked_and_ligature_letters_sort_with_their_base() {
        let cases = [
            (["zoë", "parker", "ørjan"], ["ørjan", "parker", "zoë"]),
            (["pa", "oz", "œuvre"], ["œuvre", "oz", "pa"]),
            (["strasz", "straße", "strasa"], ["strasa", "straße", "strasz"]),
            (["ma", "lz", "łódź"], ["łódź", "lz", "ma"]),
        ];
        for (input, expected) in cases {
            let rows = input.map(ArticleRow::titled);
            let sorted = sort_rows(&rows, SortField::Title, SortDirection::Asc);
            assert_eq!(titles(&sorted), expected, "sorting {input:?}");
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let rows = fruit();
        let before = rows.clone();
        let _ = sort_rows(&rows, SortField::Title, SortDirection::Asc);
        assert_eq!(rows, before);
    }

    #[test]
    fn duplicate_titles_order_by_url() {
        let rows = vec![
            with_url("Untitled", "https://z.example/post"),
            with_url("Untitled", "https://a.example/post"),
        ];
        for _ in 0..3 {
            let sorted = sort_rows(&rows, SortField::Title, SortDirection::Asc);
            assert_eq!(
                sorted[0].url.as_deref(),
                Some("https://a.example/post"),
                "fallback key decides between equal titles"
            );
        }
    }

    #[test]
    fn descending_flips_the_fallback_too() {
        let rows = vec![
            with_url("Untitled", "https://a.example/post"),
            with_url("Untitled", "https://z.example/post"),
        ];
        let sorted = sort_rows(&rows, SortField::Title, SortDirection::Desc);
        assert_eq!(sorted[0].url.as_deref(), Some("https://z.example/post"));
    }

    #[test]
    fn sorting_is_idempotent() {
        let rows = vec![
            with_url("Rust", "https://b"),
            ArticleRow::default(),
            with_url("rust", "https://a"),
            ArticleRow::titled("Go"),
        ];
        for field in SortField::ALL {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let once = sort_rows(&rows, field, direction);
                let twice = sort_rows(&once, field, direction);
                assert_eq!(once, twice, "{field:?} {direction:?}");
            }
        }
    }

    #[test]
    fn descending_is_reverse_of_ascending_without_ties() {
        let rows = vec![
            ArticleRow {
                creator: Some("Zed".to_owned()),
                ..ArticleRow::titled("one")
            },
            ArticleRow {
                creator: Some("amy".to_owned()),
                ..ArticleRow::titled("two")
            },
            ArticleRow {
                creator: Some("Émile".to_owned()),
                ..ArticleRow::titled("three")
            },
            ArticleRow::titled("four"),
        ];
        let mut ascending = sort_rows(&rows, SortField::Creator, SortDirection::Asc);
        let descending = sort_rows(&rows, SortField::Creator, SortDirection::Desc);
        ascending.reverse();
        assert_eq!(ascending, descending);
        assert_eq!(descending.last().and_then(|row| row.creator.as_deref()), None);
    }

    #[test]
    fn tag_order_changes_sort_key() {
        let rows = vec![
            ArticleRow {
                tags: Some(vec!["web".to_owned(), "css".to_owned()]),
                ..ArticleRow::titled("first")
            },
            ArticleRow {
                tags: Some(vec!["css".to_owned(), "web".to_owned()]),
                ..ArticleRow::titled("second")
            },
        ];
        let sorted = sort_rows(&rows, SortField::Tags, SortDirection::Asc);
        assert_eq!(titles(&sorted), vec!["second", "first"]);
    }

    #[test]
    fn sort_agrees_with_pairwise_comparator() {
        let rows = vec![
            ArticleRow {
                site: Some("b.example".to_owned()),
                ..ArticleRow::titled("x")
            },
            ArticleRow {
                site: Some("A.example".to_owned()),
                ..ArticleRow::titled("y")
            },
            ArticleRow::titled("z"),
        ];
        let sorted = sort_rows(&rows, SortField::Site, SortDirection::Asc);
        for pair in sorted.windows(2) {
            assert_ne!(
                compare_rows(&pair[0], &pair[1], SortField::Site),
                Ordering::Greater
            );
        }
    }
}
