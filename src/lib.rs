//! # Magic Card
//!
//! Turn a YouTube or X link into a summary card, rendered in every theme at
//! once, and export the card you like as a PNG.
//!
//! # Architecture: Parse → Fetch → Render → Export
//!
//! ```text
//! 1. Classify  raw URL     →  UrlDescriptor   (platform + content id, no I/O)
//! 2. Fetch     descriptor  →  ContentDetail   (POST {base}/api/magic)
//! 3. Render    state       →  Gallery         (one card per theme, Maud)
//! 4. Export    one card    →  <prefix>-<ms>.png (capture backend)
//! ```
//!
//! Only step 2 touches the network and only step 4 touches the filesystem.
//! Classification and rendering are pure functions, which is what most of the
//! test suite exercises.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`classify`] | URL → `{platform, id}`; YouTube (watch, `youtu.be`, shorts) and X/Twitter |
//! | [`client`] | Summary backend client, API base resolution, offline demo client |
//! | [`render`] | Card and gallery markup with Maud; capture document for export |
//! | [`gallery`] | Controller owning application state, status, selection and re-rendering |
//! | [`export`] | Capture backends and PNG validation/writing |
//! | [`config`] | `magic-card.toml` loading, merging, validation, and CSS generation |
//! | [`types`] | Descriptors, content details, themes and style settings |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Total Re-render
//!
//! Every state change rebuilds every themed card from `(style, data)`. There is
//! no diffing and no per-card state, so the same state always produces
//! byte-identical markup and a failed update cannot leave cards half-changed.
//!
//! ## One Owner for State
//!
//! [`gallery::GalleryController`] owns the card data and style. Submitting a
//! link borrows it mutably until the request finishes, so overlapping
//! submissions are ruled out by the borrow checker rather than by a disabled
//! button.
//!
//! ## Pluggable Backends
//!
//! The summary source ([`client::SummaryClient`]) and the rasterizer
//! ([`export::Capturer`]) are traits. The CLI picks the HTTP client or the
//! demo client, and headless Chrome when the `capture` feature is enabled;
//! tests swap in mocks for both.
//!
//! ## Maud Over Template Engines
//!
//! Markup is generated with [Maud](https://maud.lambda.xyz/): malformed HTML is
//! a build error and every interpolated backend string is escaped, which
//! matters because titles and summaries come straight from a remote service.

pub mod classify;
pub mod client;
pub mod config;
pub mod export;
pub mod gallery;
pub mod output;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
