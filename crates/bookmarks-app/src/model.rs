// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub const DEFAULT_SORT_FIELD: SortField = SortField::Title;
pub const DEFAULT_SORT_DIRECTION: SortDirection = SortDirection::Asc;

/// One bookmark as stored upstream. Every column is nullable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArticleRow {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub site: Option<String>,
    pub tags: Option<Vec<String>>,
    pub url: Option<String>,
    pub archive: Option<String>,
}

impl ArticleRow {
    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_owned()),
            ..Self::default()
        }
    }

    pub fn tags_label(&self) -> Option<String> {
        self.tags.as_ref().map(|tags| tags.join(", "))
    }

    /// Raw text of a sortable column; tags are flattened in list order.
    pub fn field_text(&self, field: SortField) -> Option<Cow<'_, str>> {
        match field {
            SortField::Title => self.title.as_deref().map(Cow::Borrowed),
            SortField::Creator => self.creator.as_deref().map(Cow::Borrowed),
            SortField::Site => self.site.as_deref().map(Cow::Borrowed),
            SortField::Tags => self.tags_label().map(Cow::Owned),
        }
    }

    /// Identity used when listing rows: title, then archive, then url, then position.
    pub fn display_key(&self, absolute_index: usize) -> String {
        self.title
            .as_deref()
            .or(self.archive.as_deref())
            .or(self.url.as_deref())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("article-{absolute_index}"))
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    pub fn archive_href(&self, base_url: &str) -> Option<String> {
        let archive = self.archive.as_deref()?.trim();
        if archive.is_empty() {
            return None;
        }
        Some(resolve_href(base_url.trim_end_matches('/'), archive))
    }
}

pub fn resolve_href(base_url: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_owned();
    }
    let relative = href.strip_prefix('/').unwrap_or(href);
    format!("{base_url}/{relative}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Title,
    Creator,
    Site,
    Tags,
}

impl SortField {
    pub const ALL: [Self; 4] = [Self::Title, Self::Creator, Self::Site, Self::Tags];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Creator => "creator",
            Self::Site => "site",
            Self::Tags => "tags",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(Self::Title),
            "creator" => Some(Self::Creator),
            "site" => Some(Self::Site),
            "tags" => Some(Self::Tags),
            _ => None,
        }
    }

    pub fn normalize(value: Option<&str>, fallback: Self) -> Self {
        value.and_then(Self::parse).unwrap_or(fallback)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Creator => "Creator",
            Self::Site => "Site",
            Self::Tags => "Tags",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Coerces untrusted input to a direction, keeping the fallback otherwise.
    pub fn normalize(value: Option<&str>, fallback: Self) -> Self {
        value.and_then(Self::parse).unwrap_or(fallback)
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Asc => "ascending",
            Self::Desc => "descending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(DEFAULT_SORT_FIELD, DEFAULT_SORT_DIRECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::{ArticleRow, SortDirection, SortField, resolve_href};

    #[test]
    fn sort_field_parse_is_exact() {
        assert_eq!(SortField::parse("creator"), Some(SortField::Creator));
        assert_eq!(SortField::parse("Creator"), None);
        assert_eq!(SortField::parse("url"), None);
        assert_eq!(
            SortField::normalize(Some("archive"), SortField::Site),
            SortField::Site
        );
    }

    #[test]
    fn sort_direction_normalize_ignores_case_and_keeps_fallback() {
        assert_eq!(
            SortDirection::normalize(Some("DESC"), SortDirection::Asc),
            SortDirection::Desc
        );
        assert_eq!(
            SortDirection::normalize(Some("sideways"), SortDirection::Desc),
            SortDirection::Desc
        );
        assert_eq!(
            SortDirection::normalize(None, SortDirection::Asc),
            SortDirection::Asc
        );
    }

    #[test]
    fn sort_field_serializes_as_lowercase_name() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&SortField::Tags)?, "\"tags\"");
        assert_eq!(
            serde_json::from_str::<SortDirection>("\"desc\"")?,
            SortDirection::Desc
        );
        Ok(())
    }

    #[test]
    fn field_text_joins_tags_in_order() {
        let row = ArticleRow {
            tags: Some(vec!["rust".to_owned(), "async".to_owned()]),
            ..ArticleRow::default()
        };
        assert_eq!(
            row.field_text(SortField::Tags).as_deref(),
            Some("rust, async")
        );
        assert_eq!(row.field_text(SortField::Title), None);
    }

    #[test]
    fn display_key_falls_back_through_archive_and_url() {
        let mut row = ArticleRow {
            archive: Some("a/b.html".to_owned()),
            url: Some("https://example.com".to_owned()),
            ..ArticleRow::default()
        };
        assert_eq!(row.display_key(3), "a/b.html");
        row.archive = None;
        assert_eq!(row.display_key(3), "https://example.com");
        row.url = None;
        assert_eq!(row.display_key(3), "article-3");
    }

    #[test]
    fn resolve_href_keeps_absolute_links() {
        assert_eq!(
            resolve_href("https://blob.example/articles", "https://other.example/x"),
            "https://other.example/x"
        );
        assert_eq!(
            resolve_href("https://blob.example/articles", "/2024/post.html"),
            "https://blob.example/articles/2024/post.html"
        );
    }

    #[test]
    fn archive_href_trims_base_slash() {
        let row = ArticleRow {
            archive: Some("post.html".to_owned()),
            ..ArticleRow::default()
        };
        assert_eq!(
            row.archive_href("https://blob.example/articles/").as_deref(),
            Some("https://blob.example/articles/post.html")
        );
        assert_eq!(ArticleRow::default().archive_href("https://x"), None);
    }
}
