use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, warn};
use tracing_subscriber::FmtSubscriber;
use wptool_core::config::{WptoolConfig, load_config, resolve_config_path};
use wptool_core::dispatch::{GetOptions, dispatch};
use wptool_core::output::emit;
use wptool_core::query::QueryOptions;

const DESCRIPTION: &str = "Get Wikipedia article info and Wikidata via MediaWiki APIs.

Gets a random English Wikipedia article by default, or in the
language -lang, or from the wikisite -wiki, or by specific
title -title. The output is a plain text extract unless -HTML.";

/// Long flags that are also accepted with a single dash (`-title Foo`).
const LEGACY_LONG_FLAGS: [&str; 8] = [
    "HTML", "lang", "nowrap", "query", "silent", "title", "verbose", "wiki",
];

#[derive(Debug, Parser)]
#[command(
    name = "wptool",
    version,
    about = "Get Wikipedia article info and Wikidata via MediaWiki APIs",
    long_about = DESCRIPTION,
    after_help = concat!("Powered by https://github.com/siznax/wptools/ ", env!("CARGO_PKG_VERSION"))
)]
struct Cli {
    #[arg(short = 'H', long = "HTML", help = "output HTML extract")]
    html: bool,
    #[arg(
        short = 'l',
        long = "lang",
        value_name = "LANG",
        help = "language code [default: en]"
    )]
    lang: Option<String>,
    #[arg(short = 'n', long = "nowrap", help = "do not wrap text")]
    nowrap: bool,
    #[arg(short = 'q', long = "query", help = "show query and exit")]
    query: bool,
    #[arg(short = 's', long = "silent", help = "quiet output to stderr")]
    silent: bool,
    #[arg(
        short = 't',
        long = "title",
        value_name = "TITLE",
        help = "get a specific title"
    )]
    title: Option<String>,
    #[arg(short = 'v', long = "verbose", help = "HTTP status to stderr")]
    verbose: bool,
    #[arg(
        short = 'w',
        long = "wiki",
        value_name = "SITE",
        help = "use alternative wikisite"
    )]
    wiki: Option<String>,
    #[arg(
        long,
        value_name = "PATH",
        help = "config file [default: .wptool/config.toml]"
    )]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_legacy_flags(env::args_os()));
    if let Err(error) = initialize_logging(&cli) {
        eprintln!("{error:#}");
    }

    let start = Instant::now();
    let config = load_runtime_config(&cli).unwrap_or_else(|error| {
        warn!("{error:#}; using built-in defaults");
        WptoolConfig::default()
    });
    let (get_options, query_options) = build_options(&cli, &config);
    let output = dispatch(&get_options, query_options);
    emit(start, &output);

    ExitCode::SUCCESS
}

fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.silent {
        Level::WARN
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_level(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;
    Ok(())
}

fn load_runtime_config(cli: &Cli) -> Result<WptoolConfig> {
    dotenvy::dotenv().ok();

    let cwd = env::current_dir().context("failed to read current directory")?;
    let path = resolve_config_path(cli.config.as_deref(), &cwd);
    load_config(&path)
}

fn build_options(cli: &Cli, config: &WptoolConfig) -> (GetOptions, QueryOptions) {
    let query = QueryOptions {
        lang: cli.lang.clone().unwrap_or_else(|| config.lang()),
        wiki: cli.wiki.clone().or_else(|| config.wiki()),
        user_agent: config.user_agent(),
        timeout: config.timeout(),
        silent: cli.silent,
        verbose: cli.verbose,
    };
    let get = GetOptions {
        html: cli.html,
        no_wrap: cli.nowrap,
        query: cli.query,
        title: cli.title.clone(),
        wrap_width: Some(config.wrap_width()),
    };
    (get, query)
}

/// Rewrite `-title`/`-title=Foo` style flags to their `--` form so clap can parse them.
fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 || passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            match legacy_long_flag(text) {
                Some(rewritten) => OsString::from(rewritten),
                None => arg,
            }
        })
        .collect()
}

fn legacy_long_flag(arg: &str) -> Option<String> {
    let rest = arg.strip_prefix('-')?;
    if rest.starts_with('-') {
        return None;
    }
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    LEGACY_LONG_FLAGS
        .contains(&name)
        .then(|| format!("-{arg}"))
}
