// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands, one per way of running the crawler:
//   link-frontier produce <SEED_URL> [--json]   seed the queue once and exit
//   link-frontier consume                       crawl from the queue forever
//
// Broker settings are not flags; they come from RABBITMQ_* environment
// variables (see config.rs).
// =============================================================================

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "link-frontier",
    version,
    about = "A distributed same-site crawler whose frontier lives in a RabbitMQ queue",
    long_about = "link-frontier discovers same-site links on web pages and feeds them into a \
                  durable RabbitMQ queue. Seed the queue with `produce`, then run as many \
                  `consume` workers as you like against it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Fetch one page and publish its same-site links to the queue
    ///
    /// Example: link-frontier produce https://example.com
    Produce {
        /// Page to start from (e.g., https://example.com)
        seed_url: String,

        /// Also print the published links as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Take URLs off the queue, crawl them and publish what they link to
    ///
    /// Runs until interrupted with Ctrl-C. The page being processed at that
    /// moment is finished first.
    Consume,
}
