// src/worker/mod.rs
// =============================================================================
// The two ways of driving a crawl:
//
// - producer: one-shot. Fetch a seed URL, publish its links, exit.
// - consumer: forever. Take a URL off the queue, fetch it, publish its
//   links back onto the same queue, acknowledge, repeat.
//
// Both share discover_links(), the fetch + extract half of the work.
//
// Nothing here remembers which URLs were already seen and nothing limits
// depth: a site whose pages link to each other is crawled over and over.
// The queue is the whole frontier.
// =============================================================================

mod consumer;
mod producer;

pub use consumer::ConsumerLoop;
pub use producer::produce;

use tracing::info;

use crate::crawl::{extract_links, page_title, Fetcher, LinkCandidate, NO_TITLE};
use crate::error::FetchError;

/// Fetches `url` and returns the same-site links found on it, in document
/// order.
pub async fn discover_links(
    fetcher: &Fetcher,
    url: &str,
) -> Result<Vec<LinkCandidate>, FetchError> {
    let page = fetcher.fetch(url).await?;

    let title = page_title(&page.body);
    info!(
        title = title.as_deref().unwrap_or(NO_TITLE),
        url = %page.url,
        "processing page"
    );

    let links = extract_links(&page.body, &page.origin);
    for link in &links {
        info!(text = %link.text, url = %link.url, "found link");
    }

    Ok(links)
}
