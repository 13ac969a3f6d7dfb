// src/crawl/extract.rs
// =============================================================================
// This module pulls same-site links out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, so broken markup never produces an error, only
//   a smaller tree
//
// What counts as a link:
// - <a>, <img>, <video> and <audio> elements, in document order
// - both their href and their src attribute, checked independently, so one
//   element can produce two links
// - only if the resolved URL has the page's scheme and host
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use super::fetch::Origin;

/// Placeholder text for elements with no visible text (images, empty anchors).
pub const NO_TEXT: &str = "No Text";

/// Placeholder used in logs when a page has no <title>.
pub const NO_TITLE: &str = "No Title";

const LINK_ELEMENTS: &str = "a, img, video, audio";
const REFERENCE_ATTRIBUTES: [&str; 2] = ["href", "src"];

/// Which kind of element a link was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Anchor,
    Image,
    Video,
    Audio,
}

impl ElementKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "a" => Some(Self::Anchor),
            "img" => Some(Self::Image),
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }
}

/// A same-site URL discovered on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCandidate {
    /// Absolute URL
    pub url: String,
    /// Trimmed visible text of the element, or "No Text"
    pub text: String,
    pub kind: ElementKind,
}

// Extracts all same-origin links from HTML content
//
// Parameters:
//   html: the page body
//   origin: scheme + host of the page, used to resolve and to filter
//
// Returns: the candidates in document order, possibly empty
//
// Example:
//   html = "<a href='/about'>About</a><a href='http://other.com/x'>X</a>"
//   origin = "http://example.com"
//   result = [LinkCandidate { url: "http://example.com/about", text: "About", .. }]
pub fn extract_links(html: &str, origin: &Origin) -> Vec<LinkCandidate> {
    let document = Html::parse_document(html);
    let selector = link_selector();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(kind) = ElementKind::from_tag(element.value().name()) else {
            continue;
        };

        for attribute in REFERENCE_ATTRIBUTES {
            let Some(reference) = element.value().attr(attribute) else {
                continue;
            };
            if reference.trim().is_empty() {
                continue;
            }

            let Some(absolute) = origin.resolve(reference) else {
                continue;
            };
            if !origin.contains(&absolute) {
                continue;
            }

            links.push(LinkCandidate {
                url: absolute.to_string(),
                text: visible_text(&element),
                kind,
            });
        }
    }

    links
}

/// Trimmed text of the page's <title>, if it has a non-empty one.
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").expect("static selector is valid");

    document
        .select(&selector)
        .next()
        .map(|title| title.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn link_selector() -> Selector {
    // Constant and known to be valid, so a failure here is a programmer error
    Selector::parse(LINK_ELEMENTS).expect("static selector is valid")
}

// Each text node is trimmed on its own and the pieces are glued together,
// so "<a> Read <b>more</b> </a>" gives "Readmore".
fn visible_text(element: &ElementRef) -> String {
    let text: String = element.text().map(str::trim).collect();

    if text.is_empty() {
        NO_TEXT.to_string()
    } else {
        text
    }
}
