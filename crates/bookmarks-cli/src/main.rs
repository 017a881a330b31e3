// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use bookmarks_db::Store;
use config::Config;
use runtime::DbRuntime;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `bookmarks --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    init_tracing(&config)?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or {}",
            db_path.display(),
            bookmarks_db::DB_PATH_ENV
        )
    })?;
    store.bootstrap()?;
    if options.demo {
        store.seed_demo_data()?;
    }

    match prepare_runtime(store, &config, &options)? {
        Some(mut runtime) => bookmarks_tui::run_app(&mut runtime),
        None => Ok(()),
    }
}

/// Builds the runtime for an interactive session. Check mode only loads the
/// articles and returns `None` before any UI slot is read or written.
fn prepare_runtime(
    store: Store,
    config: &Config,
    options: &CliOptions,
) -> Result<Option<DbRuntime>> {
    let revalidate_every = config.revalidate_interval()?;
    let defaults = config.view_defaults(config.default_sort(None, None));
    if options.check_only {
        let count = store
            .fetch_articles(defaults.sort)
            .context("load articles")?
            .len();
        info!(count, "check passed");
        return Ok(None);
    }

    let mut runtime = DbRuntime::new(
        store,
        defaults,
        revalidate_every,
        config.archive_base_url().map(str::to_owned),
    )?;
    if options.sort.is_some() || options.direction.is_some() {
        let requested =
            config.default_sort(options.sort.as_deref(), options.direction.as_deref());
        runtime.sync_default_sort(requested);
    }
    Ok(Some(runtime))
}

/// `RUST_LOG` wins over the configured level. Logs go to the configured file
/// since the terminal belongs to the table.
fn init_tracing(config: &Config) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = env::var("RUST_LOG").map_or_else(
        |_| EnvFilter::try_new(config.log_level()),
        EnvFilter::try_new,
    )?;

    let builder = fmt().with_env_filter(filter).with_ansi(false);
    let installed = match config.log_file() {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    sort: Option<String>,
    direction: Option<String>,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        sort: None,
        direction: None,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--sort" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow!("--sort requires a column: title, creator, site, or tags")
                })?;
                options.sort = Some(value.as_ref().to_owned());
            }
            "--direction" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--direction requires asc or desc"))?;
                options.direction = Some(value.as_ref().to_owned());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("bookmarks: browse saved articles");
    println!("  --config <path>          Use a specific config path");
    println!("  --sort <column>          Default sort column (title, creator, site, tags)");
    println!("  --direction <asc|desc>   Default sort direction");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch with seeded demo data (in-memory)");
    println!("  --check                  Validate config + DB, load articles, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args, prepare_runtime};
    use crate::config::Config;
    use anyhow::Result;
    use bookmarks_app::{PAGE_SLOT_KEY, SORT_FIELD_SLOT_KEY};
    use bookmarks_db::Store;
    use bookmarks_testkit::{ArticleFaker, temp_db_path};
    use std::path::{Path, PathBuf};

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/bookmarks-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                sort: None,
                direction: None,
                print_config_path: false,
                print_db_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_keeps_sort_values_verbatim() -> Result<()> {
        let options = parse_cli_args(
            vec!["--sort", "rating", "--direction", "DESC"],
            default_options_path(),
        )?;
        assert_eq!(options.sort.as_deref(), Some("rating"));
        assert_eq!(options.direction.as_deref(), Some("DESC"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--sort"], default_options_path())
            .expect_err("missing sort value should fail");
        assert!(error.to_string().contains("--sort requires a column"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.print_db_path);
        assert!(!options.demo);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_demo_and_db_path_print_flags() -> Result<()> {
        let options = parse_cli_args(vec!["--demo", "--print-path"], default_options_path())?;
        assert!(!options.print_config_path);
        assert!(options.print_db_path);
        assert!(options.demo);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    fn store_with_stale_page(path: &Path) -> Result<Store> {
        let store = Store::open(path)?;
        store.bootstrap()?;
        store.import_articles(&ArticleFaker::new(8).articles(12))?;
        store.put_ui_slot(PAGE_SLOT_KEY, "99")?;
        Ok(store)
    }

    #[test]
    fn check_mode_leaves_saved_view_state_untouched() -> Result<()> {
        let (_dir, path) = temp_db_path()?;
        let store = store_with_stale_page(&path)?;
        let options = parse_cli_args(vec!["--check", "--sort", "site"], default_options_path())?;

        let runtime = prepare_runtime(store, &Config::default(), &options)?;
        assert!(runtime.is_none());

        let reopened = Store::open(&path)?;
        assert_eq!(reopened.get_ui_slot(PAGE_SLOT_KEY)?.as_deref(), Some("99"));
        assert_eq!(reopened.get_ui_slot(SORT_FIELD_SLOT_KEY)?, None);
        Ok(())
    }

    #[test]
    fn interactive_startup_hydrates_and_applies_requested_sort() -> Result<()> {
        let (_dir, path) = temp_db_path()?;
        let store = store_with_stale_page(&path)?;
        let options = parse_cli_args(vec!["--sort", "site"], default_options_path())?;

        let runtime = prepare_runtime(store, &Config::default(), &options)?
            .expect("interactive startup builds a runtime");
        let backend = runtime.controller().backend();
        assert_eq!(backend.get_ui_slot(PAGE_SLOT_KEY)?.as_deref(), Some("1"));
        assert_eq!(
            backend.get_ui_slot(SORT_FIELD_SLOT_KEY)?.as_deref(),
            Some("\"site\"")
        );
        Ok(())
    }
}
