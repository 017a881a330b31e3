// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use bookmarks_app::ArticleRow;
use std::path::PathBuf;

const TOPICS: [&str; 16] = [
    "Rust",
    "SQLite",
    "Compilers",
    "Typography",
    "Gardening",
    "Distributed Systems",
    "Écriture",
    "Caching",
    "Terminal UIs",
    "Unicode",
    "Databases",
    "Type Systems",
    "Networking",
    "Árboles",
    "Testing",
    "Observability",
];

const TITLE_TEMPLATES: [&str; 8] = [
    "An introduction to {}",
    "{} in practice",
    "Notes on {}",
    "why {} is hard",
    "The case against {}",
    "{}: a field guide",
    "  Revisiting {}",
    "{} considered harmful",
];

const CREATORS: [&str; 14] = [
    "Avery Walker",
    "jordan martin",
    "Taylor Hill",
    "Zoë Evans",
    "Riley Lopez",
    "Morgan Gray",
    "Émile Ward",
    "Casey Young",
    "quinn diaz",
    "Parker Reed",
    "Kai Campbell",
    "Elliot Turner",
    "Robin Flores",
    "Ørjan Bennett",
];

const SITES: [&str; 10] = [
    "blog.example.com",
    "Example.org",
    "notes.example.net",
    "journal.example.io",
    "papers.example.edu",
    "news.example.com",
    "zine.example.dev",
    "Archive.example",
    "weekly.example.co",
    "digest.example.app",
];

const TAGS: [&str; 12] = [
    "rust", "databases", "design", "ui", "writing", "security", "web", "css", "history",
    "math", "tools", "notes",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    /// True roughly `percent` times out of a hundred.
    fn chance(&mut self, percent: usize) -> bool {
        self.int_n(100) < percent
    }
}

/// Seeded generator for plausible reading-list rows. Roughly one row in ten
/// leaves an optional column empty so sorts and searches see missing data.
#[derive(Debug, Clone)]
pub struct ArticleFaker {
    rng: DeterministicRng,
    seed: u64,
    issued: usize,
}

impl ArticleFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
            issued: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn article(&mut self) -> ArticleRow {
        self.issued += 1;
        let topic = self.pick(&TOPICS);
        let template = self.pick(&TITLE_TEMPLATES);
        let title = template.replace("{}", topic);
        let slug = slugify(&title);
        let site = self.pick(&SITES);
        let creator = self.pick(&CREATORS).to_owned();
        let tags = self.tags();
        let serial = self.issued;
        let url = format!("https://{}/{slug}-{serial}", site.to_ascii_lowercase());
        let archive = format!("{}/{slug}-{serial}.html", 2000 + serial % 25);

        ArticleRow {
            title: self.maybe(title),
            creator: self.maybe(creator),
            site: self.maybe(site.to_owned()),
            tags: self.maybe(tags),
            url: Some(url),
            archive: self.maybe(archive),
        }
    }

    pub fn articles(&mut self, count: usize) -> Vec<ArticleRow> {
        (0..count).map(|_| self.article()).collect()
    }

    fn tags(&mut self) -> Vec<String> {
        let count = 1 + self.rng.int_n(3);
        let mut tags = Vec::with_capacity(count);
        for _ in 0..count {
            let tag = self.pick(&TAGS).to_owned();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    fn maybe<T>(&mut self, value: T) -> Option<T> {
        if self.rng.chance(10) { None } else { Some(value) }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

fn slugify(title: &str) -> String {
    title
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("bookmarks.db");
    Ok((dir, db_path))
}

/// Fixed rows for store tests: mixed case, accents, and missing fields.
pub fn sample_articles() -> Vec<ArticleRow> {
    vec![
        ArticleRow {
            creator: Some("Jane Doe".to_owned()),
            site: Some("blog.example".to_owned()),
            tags: Some(vec!["garden".to_owned()]),
            url: Some("https://blog.example/banana".to_owned()),
            ..ArticleRow::titled("Banana")
        },
        ArticleRow {
            creator: Some("émile".to_owned()),
            tags: Some(vec!["food".to_owned(), "fruit".to_owned()]),
            url: Some("https://example.org/apple".to_owned()),
            ..ArticleRow::titled("apple")
        },
        ArticleRow {
            site: Some("Cherry.example".to_owned()),
            archive: Some("2021/cherry.html".to_owned()),
            ..ArticleRow::titled("Cherry")
        },
        ArticleRow {
            tags: Some(vec!["js".to_owned()]),
            url: Some("https://react.dev/learn".to_owned()),
            ..ArticleRow::titled("Intro to React")
        },
        ArticleRow {
            archive: Some("orphans/clip.html".to_owned()),
            ..ArticleRow::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::{ArticleFaker, sample_articles, slugify, temp_db_path};

    #[test]
    fn new_deterministic_seed() {
        let mut left = ArticleFaker::new(42);
        let mut right = ArticleFaker::new(42);
        assert_eq!(left.articles(20), right.articles(20));
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(ArticleFaker::new(0).seed(), 1);
    }

    #[test]
    fn every_article_has_a_unique_url() {
        let mut faker = ArticleFaker::new(9);
        let rows = faker.articles(200);
        let mut urls = rows
            .iter()
            .filter_map(|row| row.url.clone())
            .collect::<Vec<_>>();
        assert_eq!(urls.len(), 200);
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), 200);
    }

    #[test]
    fn some_fields_are_left_empty() {
        let mut faker = ArticleFaker::new(5);
        let rows = faker.articles(200);
        assert!(rows.iter().any(|row| row.title.is_none()));
        assert!(rows.iter().any(|row| row.tags.is_none()));
        assert!(rows.iter().any(|row| row.creator.is_some()));
    }

    #[test]
    fn tags_are_deduplicated() {
        let mut faker = ArticleFaker::new(11);
        for row in faker.articles(100) {
            let Some(tags) = row.tags else { continue };
            let mut unique = tags.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), tags.len());
        }
    }

    #[test]
    fn slugify_drops_punctuation() {
        assert_eq!(slugify("  Revisiting Type Systems"), "revisiting-type-systems");
        assert_eq!(slugify("Rust: a field guide"), "rust-a-field-guide");
    }

    #[test]
    fn sample_rows_cover_missing_fields() {
        let rows = sample_articles();
        assert!(rows.iter().any(|row| row.title.is_none()));
        assert!(rows.iter().any(|row| row.creator.is_none()));
    }

    #[test]
    fn temp_db_path_lives_in_temp_dir() -> anyhow::Result<()> {
        let (dir, path) = temp_db_path()?;
        assert!(path.starts_with(dir.path()));
        Ok(())
    }
}
