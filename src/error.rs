// src/error.rs
// =============================================================================
// Error types for the two things that can go wrong while crawling:
//
// - FetchError: a page could not be downloaded. This is never fatal. Callers
//   log it and carry on as if the page had no links.
// - QueueError: the broker is unreachable or the channel broke. This is
//   fatal for the process; restarting it is left to whatever supervises it.
//
// There is no parse error: scraper recovers from any markup.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

/// Failure to retrieve a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL handed to the fetcher is not an absolute URL
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The URL parsed but has no host to derive an origin from
    #[error("URL has no host: {0}")]
    NoHost(String),

    /// Network-level failure (DNS, connection refused, TLS, body read...)
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with something outside 2xx
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: StatusCode },
}

/// Failure talking to the broker.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The configured host/port/credentials do not form a valid AMQP URI
    #[error("invalid broker address: {0}")]
    InvalidAddress(String),

    /// Could not open the connection or channel, or declare the queue
    #[error("could not connect to broker: {0}")]
    Connect(#[source] lapin::Error),

    /// An established channel failed while publishing, consuming or acking
    #[error("broker channel error: {0}")]
    Channel(#[from] lapin::Error),

    /// The broker refused to take a published message
    #[error("broker rejected message for {0}")]
    Rejected(String),

    /// The broker cancelled our consumer or the connection went away
    #[error("consumer stream closed by broker")]
    Closed,
}
