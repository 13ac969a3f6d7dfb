// src/crawl/mod.rs
// =============================================================================
// Everything needed to turn one URL into a list of same-site links:
//
// - fetch: downloads the page and works out its origin
// - extract: parses the HTML and collects the links that stay on that origin
//
// Neither half keeps any state between pages. There is no visited set here:
// the crawl frontier lives in the broker queue, not in this process.
// =============================================================================

mod extract;
mod fetch;

pub use extract::{extract_links, page_title, LinkCandidate, NO_TITLE};
pub use fetch::Fetcher;
