//! URL classification: raw user input → [`UrlDescriptor`].
//!
//! ```text
//! https://www.youtube.com/watch?v=NjYt_7R-1Dk        → YouTube  NjYt_7R-1Dk
//! https://youtu.be/ABC123                            → YouTube  ABC123
//! https://www.youtube.com/shorts/XYZ789              → YouTube  XYZ789
//! https://x.com/OpenAI/status/1790432049117327631    → Twitter  1790432049117327631
//! https://example.com                                → None
//! ```
//!
//! Host matching is substring-based and case-insensitive, so `m.youtube.com`,
//! `www.youtube.com` and `mobile.twitter.com` all classify. A recognised
//! platform without an extractable id yields a descriptor with an empty id;
//! callers decide whether that is acceptable.

use crate::types::{Platform, UrlDescriptor};
use url::Url;

/// Classify a raw string. Never panics; anything unrecognised is `None`.
pub fn classify(raw: &str) -> Option<UrlDescriptor> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let url = Url::parse(trimmed).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();

    if host.contains("youtu.be") {
        let id = segments(&url).next().unwrap_or_default();
        return Some(descriptor(Platform::YouTube, id));
    }

    if host.contains("youtube.com") {
        let id = if url.path().contains("/shorts/") {
            shorts_id(&url).to_string()
        } else {
            url.query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
                .unwrap_or_default()
        };
        return Some(descriptor(Platform::YouTube, &id));
    }

    if host.contains("twitter.com") || host.contains("x.com") {
        let id = segments(&url).last().unwrap_or_default();
        return Some(descriptor(Platform::Twitter, id));
    }

    None
}

/// Non-empty path segments.
fn segments(url: &Url) -> impl Iterator<Item = &str> {
    url.path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
}

/// The segment right after `shorts`; empty when the link stops there.
fn shorts_id(url: &Url) -> &str {
    url.path_segments()
        .into_iter()
        .flatten()
        .skip_while(|s| *s != "shorts")
        .nth(1)
        .unwrap_or_default()
}

/// Ready-made links for trying the tool without finding one first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SampleLink {
    Youtube,
    Twitter,
}

impl SampleLink {
    pub fn url(self) -> &'static str {
        match self {
            SampleLink::Youtube => "https://www.youtube.com/watch?v=NjYt_7R-1Dk",
            SampleLink::Twitter => "https://x.com/OpenAI/status/1790432049117327631",
        }
    }
}

fn descriptor(platform: Platform, id: &str) -> UrlDescriptor {
    UrlDescriptor {
        platform,
        id: id.to_string(),
    }
}
