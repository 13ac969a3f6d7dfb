// src/main.rs
// =============================================================================
// This is the entry point of the crawler.
//
// What happens here:
// 1. Set up logging and parse command-line arguments
// 2. Read the broker settings from the environment, once
// 3. Connect to the broker and dispatch to the producer or consumer
// 4. Exit with a proper code (0 = done or interrupted, 1 = fatal error)
//
// A page that fails to download is never fatal. Failing to reach the broker
// is: the process reports it and exits, and restarting is left to whoever
// supervises it.
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod frontier;
mod worker;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use config::Config;
use crawl::{Fetcher, LinkCandidate};
use frontier::AmqpFrontier;
use worker::ConsumerLoop;

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so that `produce --json` keeps stdout clean.
// RUST_LOG overrides the default level.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Produce { seed_url, json } => handle_produce(&config, &seed_url, json).await,
        Commands::Consume => handle_consume(&config).await,
    }
}

// Handles the 'produce' subcommand
async fn handle_produce(config: &Config, seed_url: &str, json: bool) -> Result<i32> {
    let fetcher = Fetcher::new().context("failed to build HTTP client")?;
    let mut frontier = AmqpFrontier::connect(config)
        .await
        .context("error connecting to RabbitMQ")?;

    let links = worker::produce(&fetcher, &mut frontier, seed_url).await?;

    if let Err(e) = frontier.close().await {
        warn!(error = %e, "error closing broker connection");
    }

    if json {
        print_links(&links)?;
    }

    info!(published = links.len(), "producer finished");
    Ok(0)
}

// Handles the 'consume' subcommand
async fn handle_consume(config: &Config) -> Result<i32> {
    let fetcher = Fetcher::new().context("failed to build HTTP client")?;
    let frontier = AmqpFrontier::connect(config)
        .await
        .context("error connecting to RabbitMQ")?;

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_on_interrupt(shutdown.clone()));

    let mut consumer = ConsumerLoop::new(fetcher, frontier, shutdown);
    consumer.run().await.context("consumer failed")?;

    if let Err(e) = consumer.into_queue().close().await {
        warn!(error = %e, "error closing broker connection");
    }

    Ok(0)
}

// Turns Ctrl-C into a cancellation the consumer checks between cycles.
async fn shutdown_on_interrupt(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("shutting down gracefully...");
            shutdown.cancel();
        }
        Err(e) => error!(error = %e, "cannot listen for interrupt signal"),
    }
}

fn print_links(links: &[LinkCandidate]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(links)?;
    println!("{}", json_output);
    Ok(())
}
