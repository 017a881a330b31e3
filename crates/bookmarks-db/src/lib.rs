// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use bookmarks_app::{ArticleRow, SlotBackend, SortDirection, SortField, SortSpec, sort_rows};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

pub const APP_NAME: &str = "bookmarks";
pub const DB_PATH_ENV: &str = "BOOKMARKS_DB_PATH";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    (
        "articles",
        &[
            "id",
            "title",
            "creator",
            "site",
            "tags",
            "url",
            "archive",
            "created_at",
            "updated_at",
        ],
    ),
    ("ui_slots", &["key", "value", "updated_at"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_articles_title",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_articles_title ON articles (title);",
    },
    RequiredIndex {
        name: "idx_articles_url",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_articles_url ON articles (url);",
    },
];

const DEMO_ARTICLES: &[DemoArticle] = &[
    DemoArticle {
        title: Some("The Log: What every software engineer should know"),
        creator: Some("Jay Kreps"),
        site: Some("engineering.linkedin.com"),
        tags: &["distributed systems", "databases"],
        url: Some("https://engineering.linkedin.com/distributed-systems/log"),
        archive: Some("2013/the-log.html"),
    },
    DemoArticle {
        title: Some("Écrire du code lisible"),
        creator: Some("Émilie Durand"),
        site: Some("blog.example.fr"),
        tags: &["writing", "craft"],
        url: Some("https://blog.example.fr/lisible"),
        archive: None,
    },
    DemoArticle {
        title: Some("awesome lists considered harmful"),
        creator: None,
        site: Some("example.org"),
        tags: &[],
        url: Some("https://example.org/awesome"),
        archive: Some("2019/awesome.html"),
    },
    DemoArticle {
        title: Some("Untitled"),
        creator: Some("anonymous"),
        site: None,
        tags: &["notes"],
        url: Some("https://b.example.com/post"),
        archive: None,
    },
    DemoArticle {
        title: Some("Untitled"),
        creator: Some("anonymous"),
        site: None,
        tags: &["notes"],
        url: Some("https://a.example.com/post"),
        archive: None,
    },
    DemoArticle {
        title: Some("Parse, don't validate"),
        creator: Some("Alexis King"),
        site: Some("lexi-lambda.github.io"),
        tags: &["types", "haskell"],
        url: Some("https://lexi-lambda.github.io/blog/2019/11/05/parse-don-t-validate/"),
        archive: Some("2019/parse-dont-validate.html"),
    },
    DemoArticle {
        title: Some("Reflections on Trusting Trust"),
        creator: Some("Ken Thompson"),
        site: Some("cs.cmu.edu"),
        tags: &["security", "compilers"],
        url: Some("https://www.cs.cmu.edu/~rdriley/487/papers/Thompson_1984_ReflectionsonTrustingTrust.pdf"),
        archive: Some("1984/trusting-trust.pdf"),
    },
    DemoArticle {
        title: None,
        creator: None,
        site: None,
        tags: &[],
        url: None,
        archive: Some("orphans/clipping-01.html"),
    },
    DemoArticle {
        title: Some("Choose Boring Technology"),
        creator: Some("Dan McKinley"),
        site: Some("mcfunley.com"),
        tags: &["engineering", "management"],
        url: Some("https://mcfunley.com/choose-boring-technology"),
        archive: Some("2015/boring.html"),
    },
    DemoArticle {
        title: Some("  zettelkasten, revisited"),
        creator: Some("zoë"),
        site: Some("notes.example.net"),
        tags: &["notes", "writing"],
        url: Some("https://notes.example.net/zk"),
        archive: None,
    },
];

struct DemoArticle {
    title: Option<&'static str>,
    creator: Option<&'static str>,
    site: Option<&'static str>,
    tags: &'static [&'static str],
    url: Option<&'static str>,
    archive: Option<&'static str>,
}

impl DemoArticle {
    fn to_row(&self) -> ArticleRow {
        ArticleRow {
            title: self.title.map(str::to_owned),
            creator: self.creator.map(str::to_owned),
            site: self.site.map(str::to_owned),
            tags: (!self.tags.is_empty())
                .then(|| self.tags.iter().map(|tag| (*tag).to_owned()).collect()),
            url: self.url.map(str::to_owned),
            archive: self.archive.map(str::to_owned),
        }
    }
}

pub fn demo_articles() -> Vec<ArticleRow> {
    DEMO_ARTICLES.iter().map(DemoArticle::to_row).collect()
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates missing tables, then checks that an existing database carries
    /// every column and index the view reads.
    pub fn bootstrap(&self) -> Result<()> {
        let fresh = !has_user_tables(&self.conn)?;
        self.conn
            .execute_batch(include_str!("sql/schema.sql"))
            .context("create schema")?;
        if !fresh {
            validate_schema(&self.conn)?;
        }
        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    /// Rows for the initial view, ordered for `spec`.
    ///
    /// SQL does a coarse `LOWER(TRIM(...))` ordering with title and id as
    /// tie-breakers; the result is then re-sorted with the same comparator
    /// the view uses so both sides always agree.
    pub fn fetch_articles(&self, spec: SortSpec) -> Result<Vec<ArticleRow>> {
        let sql = format!(
            "
            SELECT title, creator, site, tags, url, archive
            FROM articles
            ORDER BY LOWER(TRIM(COALESCE({column}, ''))) {direction},
                     LOWER(TRIM(COALESCE(title, ''))) ASC,
                     id ASC
            ",
            column = sort_column(spec.field),
            direction = sql_direction(spec.direction),
        );

        let mut stmt = self.conn.prepare(&sql).context("prepare articles query")?;
        let rows = stmt
            .query_map([], |row| {
                let tags_raw: Option<String> = row.get(3)?;
                Ok(ArticleRow {
                    title: row.get(0)?,
                    creator: row.get(1)?,
                    site: row.get(2)?,
                    tags: parse_tags(tags_raw),
                    url: row.get(4)?,
                    archive: row.get(5)?,
                })
            })
            .context("query articles")?;
        let rows = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("collect articles")?;

        info!(
            count = rows.len(),
            field = spec.field.as_str(),
            direction = spec.direction.as_str(),
            "fetched articles"
        );
        Ok(sort_rows(&rows, spec.field, spec.direction))
    }

    pub fn article_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))
            .context("count articles")?;
        usize::try_from(count).context("article count out of range")
    }

    pub fn insert_article(&self, article: &ArticleRow) -> Result<i64> {
        let now = now_rfc3339()?;
        let tags = article
            .tags
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("encode article tags")?;
        self.conn
            .execute(
                "
                INSERT INTO articles (
                  title, creator, site, tags, url, archive,
                  created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    article.title,
                    article.creator,
                    article.site,
                    tags,
                    article.url,
                    article.archive,
                    now,
                    now,
                ],
            )
            .context("insert article")?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn import_articles(&self, articles: &[ArticleRow]) -> Result<usize> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin article import")?;
        for article in articles {
            self.insert_article(article)?;
        }
        tx.commit().context("commit article import")?;
        Ok(articles.len())
    }

    /// Fills an empty database with a small demo reading list. Returns the
    /// number of rows inserted; a populated database is left alone.
    pub fn seed_demo_data(&self) -> Result<usize> {
        if self.article_count()? > 0 {
            debug!("articles present; skipping demo seed");
            return Ok(0);
        }
        self.import_articles(&demo_articles())
    }

    pub fn get_ui_slot(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM ui_slots WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read ui slot {key}"))
    }

    pub fn put_ui_slot(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO ui_slots (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert ui slot {key}"))?;
        Ok(())
    }

    pub fn delete_ui_slot(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM ui_slots WHERE key = ?", params![key])
            .with_context(|| format!("delete ui slot {key}"))?;
        Ok(())
    }
}

impl SlotBackend for Store {
    fn read_slot(&mut self, key: &str) -> Result<Option<String>> {
        self.get_ui_slot(key)
    }

    fn write_slot(&mut self, key: &str, value: &str) -> Result<()> {
        self.put_ui_slot(key, value)
    }

    fn remove_slot(&mut self, key: &str) -> Result<()> {
        self.delete_ui_slot(key)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os(DB_PATH_ENV) {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set {DB_PATH_ENV} to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("bookmarks.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Title => "title",
        SortField::Creator => "creator",
        SortField::Site => "site",
        SortField::Tags => "tags",
    }
}

fn sql_direction(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

/// Tags are stored as a JSON array. Rows imported by other tools may hold a
/// plain comma-separated list instead.
fn parse_tags(raw: Option<String>) -> Option<Vec<String>> {
    let raw = raw?;
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(tags) => Some(tags),
        Err(error) => {
            debug!(%error, "tags column is not a JSON array; splitting on commas");
            Some(
                raw.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_owned)
                    .collect(),
            )
        }
    }
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        let columns = table_columns(conn, table)?;
        if columns.is_empty() {
            bail!(
                "database is missing required table `{table}`; use a bookmarks-compatible database"
            );
        }
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();
        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; migrate the database before launching",
                missing.join(", ")
            );
        }
    }
    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("ensure required index `{}`", index.name))?;
    }

    let existing_indexes = index_names(conn)?;
    let missing = REQUIRED_INDEXES
        .iter()
        .filter(|index| !existing_indexes.contains(index.name))
        .map(|index| index.name)
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!(
            "database is missing required indexes: {}; migrate the database before launching",
            missing.join(", ")
        );
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn index_names(conn: &Connection) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT name
            FROM sqlite_master
            WHERE type = 'index'
              AND name NOT LIKE 'sqlite_%'
            ORDER BY name ASC
            ",
        )
        .context("prepare index names query")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .context("query index names")?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .context("collect index names")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

#[cfg(test)]
mod tests {
    use super::{parse_tags, sort_column};
    use bookmarks_app::SortField;

    #[test]
    fn tags_accept_json_or_comma_lists() {
        assert_eq!(
            parse_tags(Some("[\"b\",\"a\"]".to_owned())),
            Some(vec!["b".to_owned(), "a".to_owned()])
        );
        assert_eq!(
            parse_tags(Some("rust, wasm,,".to_owned())),
            Some(vec!["rust".to_owned(), "wasm".to_owned()])
        );
        assert_eq!(parse_tags(None), None);
    }

    #[test]
    fn every_sort_field_maps_to_a_column() {
        let columns = SortField::ALL.map(sort_column);
        assert_eq!(columns, ["title", "creator", "site", "tags"]);
    }
}
