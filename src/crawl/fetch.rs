// src/crawl/fetch.rs
// =============================================================================
// Downloads a page and works out which site it belongs to.
//
// How it works:
// 1. Parse the requested URL and derive its origin (scheme + host)
// 2. GET it with a shared reqwest client, following redirects
// 3. Reject anything that is not a 2xx
// 4. Hand back the body together with the origin of the URL we ASKED for
//
// The origin always comes from the requested URL, even if a redirect took
// us to another host. Links are later filtered against that origin.
//
// There is no explicit timeout: the transport defaults apply.
// =============================================================================

use reqwest::Client;
use std::fmt;
use url::Url;

use crate::error::FetchError;

// The scheme + host of a page, used both to resolve relative references and
// to decide whether a link stays on the same site.
//
// An explicit port is kept so that "/about" on http://localhost:8080 resolves
// to http://localhost:8080/about, but the same-site check only looks at
// scheme and host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    base: Url,
}

impl Origin {
    /// Origin of an absolute URL, or None if the URL has no host
    /// (mailto:, data:, file:///...).
    pub fn of(url: &Url) -> Option<Self> {
        url.host_str()?;

        let mut base = url.clone();
        base.set_path("/");
        base.set_query(None);
        base.set_fragment(None);
        // Both only fail for cannot-be-a-base URLs, which have no host anyway
        let _ = base.set_username("");
        let _ = base.set_password(None);

        Some(Self { base })
    }

    /// Resolves a (possibly relative) reference against this origin,
    /// the way a browser would against the site root.
    pub fn resolve(&self, reference: &str) -> Option<Url> {
        self.base.join(reference).ok()
    }

    /// True when `url` has exactly this origin's scheme and host.
    /// Path, query and port are not compared.
    pub fn contains(&self, url: &Url) -> bool {
        url.scheme() == self.base.scheme() && url.host_str() == self.base.host_str()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // base always serializes as "scheme://host[:port]/"
        f.write_str(self.base.as_str().trim_end_matches('/'))
    }
}

/// A downloaded page. Lives only until its links have been extracted.
#[derive(Debug, Clone)]
pub struct PageDocument {
    /// The URL that was requested
    pub url: Url,
    /// Origin of `url` (not of any redirect target)
    pub origin: Origin,
    /// Response body decoded as text
    pub body: String,
}

/// Thin wrapper around a reqwest client.
///
/// One fetcher is created per process so that connections get reused across
/// pages.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        // reqwest follows up to 10 redirects by default, which is what we want
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// GETs `url` and returns its body plus origin.
    pub async fn fetch(&self, url: &str) -> Result<PageDocument, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let origin = Origin::of(&parsed).ok_or_else(|| FetchError::NoHost(url.to_string()))?;

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        Ok(PageDocument {
            url: parsed,
            origin,
            body,
        })
    }
}
