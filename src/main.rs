//! Trendboard terminal dashboard
//!
//! Usage:
//!   trendboard                      overview of the latest US trending day
//!   trendboard channels
//!   trendboard tags
//!   trendboard tag <tag> [month]    month as listed by the backend, e.g. 2024-03-01
//!   trendboard video <id>
//!   trendboard channel <id>
//!
//! `--env-file <path>` reads settings from that file instead of `./.env`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;

use trendboard::config::DashboardConfig;
use trendboard::page::Page;
use trendboard::state::MonthKey;
use trendboard::telemetry;

/// Pull `--env-file <path>` out of the arguments, leaving the page words.
fn split_env_file(args: Vec<String>) -> Result<(Option<PathBuf>, Vec<String>)> {
    let mut env_file = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--env-file" {
            match args.next() {
                Some(path) => env_file = Some(PathBuf::from(path)),
                None => bail!("--env-file needs a path"),
            }
        } else {
            rest.push(arg);
        }
    }
    Ok((env_file, rest))
}

/// Starting page from the command-line arguments (program name excluded).
fn parse_page(args: &[String]) -> Result<Page> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let page = match args.as_slice() {
        [] | ["overview"] => Page::Overview,
        ["channels"] => Page::Channels,
        ["tags"] => Page::Tags,
        ["tag", tag] => Page::Tag { tag: tag.to_string(), month: None },
        ["tag", tag, month] => Page::Tag {
            tag: tag.to_string(),
            month: Some(MonthKey::new(*month)),
        },
        ["video", id] => Page::Video { id: id.to_string() },
        ["channel", id] => Page::Channel { id: id.to_string() },
        other => bail!("unrecognized arguments: {}", other.join(" ")),
    };
    Ok(page)
}

#[tokio::main]
async fn main() -> Result<()> {
    let (env_file, args) = split_env_file(std::env::args().skip(1).collect())?;
    let page = parse_page(&args)?;
    let config = match env_file {
        Some(path) => DashboardConfig::from_env_file(path)?,
        None => {
            dotenv::dotenv().ok();
            DashboardConfig::from_env().context("reading TRENDBOARD_* settings")?
        }
    };

    // Dropping the guard flushes buffered log lines.
    let _guard = telemetry::init_logging(&config.log)?;
    info!("Starting on {} ({})", page, config.country);

    trendboard::tui::run(config, page).await
}
