//! Gallery controller: the single owner of application state.
//!
//! Every user action goes through [`GalleryController`]: submitting a link,
//! changing a style control, selecting a card, exporting one. After each
//! state change the whole gallery is rebuilt from `(style, data)`; there is
//! no incremental patching, so rendering the same state twice always gives
//! byte-identical markup.
//!
//! Failures never leave partial updates behind. A failed fetch keeps the
//! previous card data and gallery, an invalid style patch is rejected before
//! anything changes, and an export clears its capture marker whatever the
//! outcome.

use crate::classify::classify;
use crate::client::{FetchError, SummaryClient};
use crate::config::{self, AppConfig, ExportConfig};
use crate::export::{self, CaptureRequest, Capturer, ExportError};
use crate::render::{self, Gallery};
use crate::types::{CardData, StyleConfig, StyleError, StylePatch, Theme};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("unsupported link: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// What the status line shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Unsupported,
    Parsing,
    Ready,
    Failed(String),
    Exported(PathBuf),
    ExportUnavailable,
    ExportFailed(String),
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Status::Unsupported
                | Status::Failed(_)
                | Status::ExportUnavailable
                | Status::ExportFailed(_)
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => f.write_str("Paste a YouTube or X link to make your card."),
            Status::Unsupported => {
                f.write_str("Unsupported link. Use a YouTube or X/Twitter URL.")
            }
            Status::Parsing => f.write_str("Parsing link…"),
            Status::Ready => f.write_str("Card ready."),
            Status::Failed(message) => f.write_str(message),
            Status::Exported(path) => write!(f, "Saved {}", path.display()),
            Status::ExportUnavailable => {
                f.write_str("Export unavailable: no capture backend loaded.")
            }
            Status::ExportFailed(message) => write!(f, "Export failed: {message}"),
        }
    }
}

/// Everything rendering depends on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub data: Option<CardData>,
    /// The link `data` was made from, as submitted (trimmed).
    pub source_url: Option<String>,
    pub style: StyleConfig,
}

pub struct GalleryController {
    state: AppState,
    status: Status,
    selected: Option<Theme>,
    capturing: Option<Theme>,
    gallery: Gallery,
    server_side_ids: bool,
}

impl GalleryController {
    pub fn new(style: StyleConfig) -> Self {
        let mut controller = Self {
            state: AppState {
                data: None,
                source_url: None,
                style,
            },
            status: Status::Idle,
            selected: None,
            capturing: None,
            gallery: Gallery::default(),
            server_side_ids: false,
        };
        controller.rerender();
        controller
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut controller = Self::new(config.style.clone());
        controller.server_side_ids = config.api.server_side_ids;
        controller
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn selected(&self) -> Option<Theme> {
        self.selected
    }

    /// The last total rendering.
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Full gallery page for the current state and status.
    pub fn document(&self) -> String {
        render::render_gallery_document(
            &self.gallery,
            &self.state.style,
            &self.status.to_string(),
            self.state.source_url.as_deref(),
        )
        .into_string()
    }

    fn rerender(&mut self) {
        self.gallery = render::render_gallery(
            self.state.data.as_ref(),
            &self.state.style,
            self.selected,
            self.capturing,
        );
    }

    /// Classify `raw`, fetch its summary and rebuild the gallery.
    ///
    /// Takes `&mut self` for the whole request, so a second submission cannot
    /// start while one is outstanding.
    pub async fn on_submit(
        &mut self,
        client: &dyn SummaryClient,
        raw: &str,
    ) -> Result<(), SubmitError> {
        let descriptor = match classify(raw) {
            Some(d) if d.has_id() => d,
            Some(d) if self.server_side_ids => d.or_sentinel(),
            _ => {
                warn!("Unsupported link: {:?}", raw.trim());
                self.status = Status::Unsupported;
                return Err(SubmitError::Unsupported(raw.trim().to_string()));
            }
        };

        self.status = Status::Parsing;
        debug!("Submitting {} {}", descriptor.platform, descriptor.id);

        match client.fetch_summary(&descriptor, raw).await {
            Ok(detail) => {
                self.state.data = Some(CardData {
                    platform: descriptor.platform,
                    id: descriptor.id,
                    detail,
                });
                self.state.source_url = Some(raw.trim().to_string());
                self.status = Status::Ready;
                self.rerender();
                info!("Rendered {} themed cards", self.gallery.len());
                Ok(())
            }
            Err(e) => {
                warn!("Summary request failed: {}", e);
                self.status = Status::Failed(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Shallow-merge `patch` into the style and rebuild. Invalid patches are
    /// rejected with the current style left as it was.
    pub fn on_style_change(&mut self, patch: StylePatch) -> Result<&Gallery, StyleError> {
        let mut style = self.state.style.clone();
        style.apply(patch);
        style.validate()?;
        self.state.style = style;
        if self.selected.is_some_and(|t| !self.state.style.themes.contains(&t)) {
            self.selected = None;
        }
        self.rerender();
        Ok(&self.gallery)
    }

    /// Exclusive selection: selecting a theme deselects every other card.
    pub fn select(&mut self, theme: Theme) -> &Gallery {
        self.selected = Some(theme);
        self.rerender();
        &self.gallery
    }

    /// Capture one card as PNG into `out_dir`.
    pub fn export(
        &mut self,
        theme: Theme,
        capturer: Option<&dyn Capturer>,
        settings: &ExportConfig,
        out_dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        if !self.gallery.contains(theme) {
            return Err(ExportError::NotRendered(theme.to_string()));
        }
        let Some(capturer) = capturer.filter(|c| c.is_available()) else {
            warn!("No capture backend available");
            self.status = Status::ExportUnavailable;
            return Err(ExportError::Unavailable);
        };

        self.capturing = Some(theme);
        self.rerender();

        let result = self.capture_marked(theme, capturer, settings, out_dir);

        self.capturing = None;
        self.rerender();

        self.status = match &result {
            Ok(path) => Status::Exported(path.clone()),
            Err(e) => {
                warn!("Export of {} failed: {}", theme, e);
                Status::ExportFailed(e.to_string())
            }
        };
        result
    }

    fn capture_marked(
        &self,
        theme: Theme,
        capturer: &dyn Capturer,
        settings: &ExportConfig,
        out_dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let card = self
            .gallery
            .card(theme)
            .ok_or_else(|| ExportError::NotRendered(theme.to_string()))?;
        let request = CaptureRequest {
            html: render::render_capture_document(&card.html, &self.state.style, settings.width)
                .into_string(),
            width: settings.width,
            pixel_ratio: config::effective_pixel_ratio(settings.device_pixel_ratio),
        };
        export::export_card(capturer, &request, out_dir, &settings.filename_prefix)
    }
}
