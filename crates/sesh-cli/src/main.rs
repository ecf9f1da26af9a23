// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use runtime::DbRuntime;
use sesh_app::{AppState, ListeningDataset, Theme};
use sesh_db::Store;
use sesh_tui::UiOptions;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

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
            "load config {}; run `sesh --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let db_path = config.db_path()?;
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    logging::init(&config.log_level(), &config.log_path()?)?;
    info!(config = %options.config_path.display(), db = %db_path.display(), "starting sesh");

    let store = Store::open(&db_path).with_context(|| {
        format!(
            "open preference database {} -- if this path is wrong, set [storage].db_path or SESH_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;

    let input_dir = options
        .input_dir
        .clone()
        .unwrap_or_else(|| config.input_dir());
    let history = sesh_db::load_history_dir(&input_dir)?;
    let dataset = ListeningDataset::from_records(&history.records, config.min_milliseconds());
    if dataset.is_empty() {
        warn!(dir = %input_dir.display(), "no countable plays found");
    }
    if options.check_only {
        return Ok(());
    }

    let theme = resolve_theme(&store, config.default_theme());
    let mut state = AppState::new(dataset.year_scopes(), theme, config.initial_mode());
    let mut runtime = DbRuntime::new(&store, dataset);
    sesh_tui::run_app(
        &mut state,
        &mut runtime,
        UiOptions {
            items_per_page: config.items_per_page(),
        },
    )
}

/// Stored theme beats the config default; a corrupt value falls back to it.
fn resolve_theme(store: &Store, fallback: Theme) -> Theme {
    match store.get_theme() {
        Ok(Some(theme)) => theme,
        Ok(None) => fallback,
        Err(error) => {
            warn!(error = %format!("{error:#}"), "ignoring stored theme");
            fallback
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    input_dir: Option<PathBuf>,
    print_config_path: bool,
    print_db_path: bool,
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
        input_dir: None,
        print_config_path: false,
        print_db_path: false,
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
            "--input" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--input requires a directory path"))?;
                options.input_dir = Some(PathBuf::from(value.as_ref()));
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
    println!("sesh: browse your streaming history year by year");
    println!("  --config <path>          Use a specific config path");
    println!("  --input <dir>            Read exported history JSON files from <dir>");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved preference database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config, database, and history input");
    println!("  --help                   Show this help");
}
