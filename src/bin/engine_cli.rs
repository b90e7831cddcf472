//! engine-cli: run the translation engine over stdin from the command line.
//!
//! Usage:
//!   engine-cli translate [--batch <n>] [--rate <requests>/<seconds>]   Translate stdin lines
//!   engine-cli options                                                 Show resolved options
//!   engine-cli version

use anyhow::{bail, Context};
use custom_engine::{CustomEngine, EngineOptions, FnCallbacks, HttpFetcher, RateLimit};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "translate" => cmd_translate(&args[2..]).await,
        "options" => cmd_options(),
        "version" | "--version" | "-V" => {
            println!("engine-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"engine-cli: batched and rate-limited translation from the command line

USAGE:
    engine-cli <COMMAND> [OPTIONS]

COMMANDS:
    translate [--batch <n>] [--rate <requests>/<seconds>]
                                Translate stdin, one row per line
    options                     Show the resolved engine options
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    ENGINE_API_KEY              Provider API key (required for translate)
    ENGINE_TARGET_LANGUAGE      Target language (default "English - US")
    ENGINE_API_TYPE             free | pro (default free)
    ENGINE_TIMEOUT_SECS         Per-request timeout, 0 disables (default 0)
    ENGINE_FREE_URL             Endpoint for free accounts
    ENGINE_PRO_URL              Endpoint for pro accounts
    RUST_LOG                    Log filter (default warn)"#
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_rate(raw: &str) -> anyhow::Result<RateLimit> {
    let Some((requests, seconds)) = raw.split_once('/') else {
        bail!("--rate expects <requests>/<seconds>, got {raw:?}");
    };
    let requests: u32 = requests.trim().parse().context("invalid request count")?;
    let seconds: f64 = seconds.trim().parse().context("invalid window length")?;
    Ok(RateLimit::new(requests, seconds)?)
}

async fn cmd_translate(args: &[String]) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::from_env()?;
    let mut builder =
        CustomEngine::builder(Arc::new(fetcher)).with_options(EngineOptions::from_env()?);
    if let Some(n) = flag_value(args, "--batch") {
        builder = builder.with_max_batch_size(n.parse().context("invalid --batch")?);
    }
    if let Some(rate) = flag_value(args, "--rate") {
        builder = builder.with_rate_limit(parse_rate(rate)?);
    }
    let engine = builder.build()?;
    engine.init();

    let rows: Vec<String> = std::io::stdin()
        .lock()
        .lines()
        .collect::<std::io::Result<_>>()
        .context("failed to read stdin")?;

    let callbacks = FnCallbacks::new()
        .on_after_loading(|unit| {
            let mut out = std::io::stdout().lock();
            for line in &unit.translation {
                let _ = writeln!(out, "{}", line);
            }
        })
        .on_error(|failure, message| match &failure.status {
            Some(status) => eprintln!("error ({}): {}", status, message),
            None => eprintln!("error: {}", message),
        });

    match engine.translate(rows, &callbacks).await {
        custom_engine::TranslateOutcome::Translated(_) => Ok(()),
        custom_engine::TranslateOutcome::Failed => std::process::exit(2),
        custom_engine::TranslateOutcome::Aborted => std::process::exit(3),
    }
}

fn cmd_options() -> anyhow::Result<()> {
    let options = EngineOptions::from_env()?;
    let mut shown = serde_json::Map::new();
    for name in custom_engine::engine::config::OPTION_NAMES {
        let mut value = options.get(name)?;
        if name == "api_key" && !value.is_null() {
            value = serde_json::Value::from("<set>");
        }
        shown.insert(name.to_string(), value);
    }
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}
