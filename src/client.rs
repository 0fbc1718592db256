//! Summary client: descriptor → [`ContentDetail`].
//!
//! Two implementations of [`SummaryClient`]:
//!
//! - [`HttpSummaryClient`] posts `{url, platform, id}` to the summarization
//!   backend and decodes the JSON answer. One attempt per submission: no
//!   retry, no cache.
//! - [`DemoClient`] serves fixed content without touching the network. It is
//!   an operating mode chosen up front (`--demo` / `api.demo`), never a
//!   fallback for a failed request.
//!
//! ## API base resolution
//!
//! ```text
//! 1. explicit override     --api-base, MAGIC_CARD_API_BASE
//! 2. document config       [api] base
//! 3. origin default        no origin / file: / localhost / loopback → local_endpoint
//!                          anything else → remote_endpoint, else the origin itself
//! ```

use crate::config::ApiConfig;
use crate::types::{ContentDetail, Highlight, Platform, UrlDescriptor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::{Host, Url};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with an error payload carrying a message.
    #[error("{message}")]
    Server { status: u16, message: String },
    /// The backend answered with an error status and no usable message.
    #[error("request failed (HTTP {0})")]
    Status(u16),
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Anything that can turn a descriptor into a summary.
#[async_trait]
pub trait SummaryClient: Send + Sync {
    async fn fetch_summary(
        &self,
        descriptor: &UrlDescriptor,
        raw_url: &str,
    ) -> Result<ContentDetail, FetchError>;
}

// =============================================================================
// API base resolution
// =============================================================================

/// Inputs to [`resolve_api_base`], highest priority first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiBaseSources<'a> {
    pub explicit: Option<&'a str>,
    pub document: Option<&'a str>,
    pub origin: Option<&'a str>,
    pub local_endpoint: &'a str,
    pub remote_endpoint: Option<&'a str>,
}

impl<'a> ApiBaseSources<'a> {
    pub fn from_config(api: &'a ApiConfig, explicit: Option<&'a str>) -> Self {
        Self {
            explicit,
            document: api.base.as_deref(),
            origin: api.origin.as_deref(),
            local_endpoint: &api.local_endpoint,
            remote_endpoint: api.remote_endpoint.as_deref(),
        }
    }
}

/// Pick the API base address. Blank overrides are skipped; the result has no
/// trailing slash. A remote origin without a `remote_endpoint` resolves to
/// the origin itself (scheme, host and port), so the page path never leaks
/// into the request URL.
pub fn resolve_api_base(sources: &ApiBaseSources<'_>) -> String {
    if let Some(explicit) = non_blank(sources.explicit) {
        return trim_base(explicit);
    }
    if let Some(document) = non_blank(sources.document) {
        return trim_base(document);
    }
    let Some(origin) = non_blank(sources.origin) else {
        return trim_base(sources.local_endpoint);
    };
    match Url::parse(origin) {
        Ok(url) if is_local_origin(&url) => trim_base(sources.local_endpoint),
        Ok(url) => match non_blank(sources.remote_endpoint) {
            Some(remote) => trim_base(remote),
            None => url.origin().ascii_serialization(),
        },
        Err(e) => {
            warn!("Unparseable origin {origin:?} ({e}), using local endpoint");
            trim_base(sources.local_endpoint)
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn trim_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

/// `file:` and other opaque origins, `localhost` and loopback addresses count
/// as local.
fn is_local_origin(url: &Url) -> bool {
    if url.scheme() == "file" || !url.origin().is_tuple() {
        return true;
    }
    match url.host() {
        None => true,
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
    }
}

// =============================================================================
// HTTP client
// =============================================================================

#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    url: &'a str,
    platform: Platform,
    id: &'a str,
}

/// Error payloads differ between backend versions: some send `message`,
/// some only `error`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.trim().is_empty())
            .or(self.error.filter(|e| !e.trim().is_empty()))
    }
}

/// Summarization backend reached over HTTP.
pub struct HttpSummaryClient {
    client: reqwest::Client,
    endpoint_url: String,
}

impl HttpSummaryClient {
    /// `base` as produced by [`resolve_api_base`]; `endpoint` starts with `/`.
    pub fn new(base: &str, endpoint: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint_url: format!("{}{}", base.trim_end_matches('/'), endpoint),
        })
    }

    /// Build a client from the `[api]` section plus an optional explicit base.
    pub fn from_config(api: &ApiConfig, explicit_base: Option<&str>) -> Result<Self, FetchError> {
        let base = resolve_api_base(&ApiBaseSources::from_config(api, explicit_base));
        debug!("Resolved API base: {base:?}");
        Self::new(&base, &api.endpoint, api.timeout_secs.map(Duration::from_secs))
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl SummaryClient for HttpSummaryClient {
    async fn fetch_summary(
        &self,
        descriptor: &UrlDescriptor,
        raw_url: &str,
    ) -> Result<ContentDetail, FetchError> {
        info!(
            "Requesting summary for {} {} from {}",
            descriptor.platform, descriptor.id, self.endpoint_url
        );
        let body = SummaryRequest {
            url: raw_url.trim(),
            platform: descriptor.platform,
            id: &descriptor.id,
        };
        // `.json()` sets `Content-Type: application/json`
        let response = self.client.post(&self.endpoint_url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("Backend answered HTTP {} ({} bytes)", status.as_u16(), text.len());

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(ErrorBody::into_message);
            warn!("Backend failure HTTP {}: {:?}", status.as_u16(), message);
            return Err(match message {
                Some(message) => FetchError::Server {
                    status: status.as_u16(),
                    message,
                },
                None => FetchError::Status(status.as_u16()),
            });
        }

        serde_json::from_str(&text).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

// =============================================================================
// Demo mode
// =============================================================================

/// Offline client returning fixed, platform-specific content.
#[derive(Debug, Default, Clone, Copy)]
pub struct DemoClient;

impl DemoClient {
    pub fn detail_for(platform: Platform) -> ContentDetail {
        match platform {
            Platform::YouTube => ContentDetail {
                title: "How transformers read a sentence".to_string(),
                summary: "A visual walk through attention: each token looks at every other \
                          token, weighs what matters, and builds its meaning from context."
                    .to_string(),
                length: Some("18 min".to_string()),
                confidence: "demo".to_string(),
                highlights: vec![
                    Highlight {
                        label: "Idea".to_string(),
                        text: "Attention scores decide which words inform each other.".to_string(),
                    },
                    Highlight {
                        label: "Demo".to_string(),
                        text: "Stacked layers refine meaning step by step.".to_string(),
                    },
                    Highlight {
                        label: "Takeaway".to_string(),
                        text: "Context, not position alone, drives understanding.".to_string(),
                    },
                ],
            },
            Platform::Twitter => ContentDetail {
                title: "Product launch thread".to_string(),
                summary: "A short announcement introducing a new model with faster responses, \
                          lower prices and a live demo of voice and vision features."
                    .to_string(),
                length: Some("280 chars".to_string()),
                confidence: "demo".to_string(),
                highlights: vec![
                    Highlight {
                        label: "Launch".to_string(),
                        text: "New model available to all users today.".to_string(),
                    },
                    Highlight {
                        label: "Pricing".to_string(),
                        text: "API costs cut in half.".to_string(),
                    },
                ],
            },
        }
    }
}

#[async_trait]
impl SummaryClient for DemoClient {
    async fn fetch_summary(
        &self,
        descriptor: &UrlDescriptor,
        _raw_url: &str,
    ) -> Result<ContentDetail, FetchError> {
        info!("Demo mode: serving fixed content for {}", descriptor.platform);
        Ok(Self::detail_for(descriptor.platform))
    }
}
