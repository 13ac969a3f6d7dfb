// src/worker/producer.rs
// =============================================================================
// One-shot seeding of the frontier.
//
// Fetch the seed page once, publish every same-site link on it in the order
// it was found, and return. A page that cannot be fetched is reported and
// treated as having no links; only broker failures are errors.
// =============================================================================

use tracing::{error, info};

use super::discover_links;
use crate::crawl::{Fetcher, LinkCandidate};
use crate::error::QueueError;
use crate::frontier::FrontierQueue;

/// Seeds the queue from `seed` and returns the links that were published.
pub async fn produce<Q>(
    fetcher: &Fetcher,
    queue: &mut Q,
    seed: &str,
) -> Result<Vec<LinkCandidate>, QueueError>
where
    Q: FrontierQueue + ?Sized,
{
    let links = match discover_links(fetcher, seed).await {
        Ok(links) => links,
        Err(e) => {
            error!(url = seed, error = %e, "error fetching page");
            return Ok(Vec::new());
        }
    };

    if links.is_empty() {
        info!(url = seed, "no internal links found");
        return Ok(links);
    }

    for link in &links {
        queue.publish(&link.url).await?;
        info!(url = %link.url, "link sent");
    }

    Ok(links)
}
