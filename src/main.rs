mod config;
mod error;
mod export;
mod fetch;
mod images;
mod loader;
mod model;
mod pipeline;
mod transform;

#[cfg(test)]
mod test_support;

use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::config::Config;

/// Fetch the Tarkov item price dataset and build an offline CSV table and searchable HTML page.
#[derive(Parser)]
#[command(name = "tarkov_prices", version)]
struct Cli {}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let _ = Cli::parse();
    let t0 = Instant::now();
    let cfg = Config::default();

    let summary = pipeline::run(&cfg).context("price table run aborted")?;

    info!(
        "Done: {} items{}",
        summary.items,
        if summary.fetched { " (fresh download)" } else { "" }
    );
    println!("\nAll done!");
    println!("1. Page:  {}", summary.html_path.display());
    println!("2. Table: {}", summary.csv_path.display());
    println!("Finished in {}", format_duration(t0.elapsed()));
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
