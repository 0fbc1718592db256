//! PNG export of a single rendered card.
//!
//! The [`Capturer`] trait is the seam between the pure card markup and
//! whatever can rasterize it. The production implementation is
//! [`ChromeCapturer`] (headless Chrome, behind the default `capture` feature);
//! tests use a mock that returns canned bytes.
//!
//! ## Export Flow
//!
//! ```text
//! capture document (fixed width, is-capturing marker)
//!   → Capturer::capture at pixel ratio clamp(device, 2, 4)
//!   → decode check (non-empty, valid PNG)
//!   → temp file in out_dir → persist (never overwriting) as <prefix>-<unix_ms>.png
//! ```
//!
//! Marker handling and status reporting live in the gallery controller; this
//! module only turns a capture request into a file, and leaves nothing behind
//! on failure.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("could not start capture backend: {0}")]
    Launch(String),
    #[error("capture failed: {0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("card for theme {0} is not rendered")]
    NotRendered(String),
    #[error("export unavailable: no capture backend loaded")]
    Unavailable,
    #[error("capture produced an empty image")]
    EmptyImage,
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("capture produced an invalid PNG: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a backend needs to rasterize one card.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    /// Standalone HTML document containing exactly one `.card`.
    pub html: String,
    /// Card frame width in CSS pixels.
    pub width: u32,
    /// Output pixels per CSS pixel, already clamped.
    pub pixel_ratio: f64,
}

/// A backend that can rasterize a card document to PNG bytes.
pub trait Capturer {
    /// Whether the backend is loaded and usable. Checked before any visual
    /// state is touched.
    fn is_available(&self) -> bool;

    /// Render `request.html` and return the `.card` element as PNG.
    fn capture(&self, request: &CaptureRequest) -> Result<Vec<u8>, CaptureError>;
}

/// `<prefix>-<unix_ms>.png`
pub fn export_filename(prefix: &str, unix_ms: u128) -> String {
    format!("{prefix}-{unix_ms}.png")
}

fn unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Decode the capture to make sure it is a real, non-empty PNG.
pub fn validate_png(bytes: &[u8]) -> Result<(u32, u32), ExportError> {
    if bytes.is_empty() {
        return Err(ExportError::EmptyImage);
    }
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(ExportError::EmptyImage);
    }
    Ok((img.width(), img.height()))
}

/// Capture a card and write it to `out_dir`. Returns the written path.
///
/// The image is first written to a temporary file in `out_dir`, then renamed
/// into place, so a failure never leaves a partial PNG behind.
pub fn export_card(
    capturer: &dyn Capturer,
    request: &CaptureRequest,
    out_dir: &Path,
    prefix: &str,
) -> Result<PathBuf, ExportError> {
    if !capturer.is_available() {
        return Err(ExportError::Unavailable);
    }
    debug!(
        "Capturing card at {}px, pixel ratio {}",
        request.width, request.pixel_ratio
    );
    let bytes = capturer.capture(request)?;
    let (width, height) = validate_png(&bytes)?;

    let path = write_png(&bytes, out_dir, &export_filename(prefix, unix_ms()))?;
    info!("Exported {}x{} card to {}", width, height, path.display());
    Ok(path)
}

/// Write `bytes` to `out_dir/file_name` through a temp file. An existing file
/// with that name is left untouched and reported as an IO error.
fn write_png(bytes: &[u8], out_dir: &Path, file_name: &str) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(out_dir)?;
    let mut tmp = NamedTempFile::new_in(out_dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    let path = out_dir.join(file_name);
    tmp.persist_noclobber(&path)
        .map_err(|e| ExportError::Io(e.error))?;
    Ok(path)
}

// =============================================================================
// Headless Chrome backend
// =============================================================================

#[cfg(feature = "capture")]
pub use chrome::ChromeCapturer;

#[cfg(feature = "capture")]
mod chrome {
    use super::{CaptureError, CaptureRequest, Capturer};
    use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
    use headless_chrome::{Browser, LaunchOptions};
    use std::ffi::OsStr;
    use std::path::PathBuf;

    /// Tall enough that a card never overflows the viewport.
    const VIEWPORT_HEIGHT: u32 = 2400;
    /// Room around the fixed-width frame.
    const VIEWPORT_MARGIN: u32 = 96;

    /// Rasterizes cards with a headless Chrome found on this machine.
    pub struct ChromeCapturer {
        executable: Option<PathBuf>,
    }

    impl ChromeCapturer {
        /// Locate Chrome/Chromium (honours `CHROME` and the usual install paths).
        pub fn detect() -> Self {
            Self {
                executable: headless_chrome::browser::default_executable().ok(),
            }
        }

        pub fn with_executable(path: PathBuf) -> Self {
            Self {
                executable: Some(path),
            }
        }
    }

    fn failed(e: impl std::fmt::Display) -> CaptureError {
        CaptureError::Failed(e.to_string())
    }

    impl Capturer for ChromeCapturer {
        fn is_available(&self) -> bool {
            self.executable.as_ref().is_some_and(|p| p.exists())
        }

        fn capture(&self, request: &CaptureRequest) -> Result<Vec<u8>, CaptureError> {
            let executable = self
                .executable
                .clone()
                .ok_or_else(|| CaptureError::Launch("no Chrome executable found".into()))?;

            let dir = tempfile::TempDir::new().map_err(failed)?;
            let page = dir.path().join("card.html");
            std::fs::write(&page, &request.html).map_err(failed)?;

            let scale_flag = format!("--force-device-scale-factor={}", request.pixel_ratio);
            let browser = Browser::new(LaunchOptions {
                path: Some(executable),
                window_size: Some((request.width + VIEWPORT_MARGIN, VIEWPORT_HEIGHT)),
                args: vec![OsStr::new(&scale_flag)],
                ..Default::default()
            })
            .map_err(|e| CaptureError::Launch(e.to_string()))?;

            let tab = browser.new_tab().map_err(failed)?;
            tab.navigate_to(&format!("file://{}", page.display()))
                .map_err(failed)?
                .wait_until_navigated()
                .map_err(failed)?;
            // Web fonts must settle before the screenshot or text reflows mid-capture
            tab.evaluate(
                "document.fonts ? document.fonts.ready.then(() => true) : true",
                true,
            )
            .map_err(failed)?;

            tab.wait_for_element(".card")
                .map_err(failed)?
                .capture_screenshot(CaptureScreenshotFormatOption::Png)
                .map_err(failed)
        }
    }
}

/// The capture backend compiled into this build, if any.
pub fn default_capturer() -> Option<Box<dyn Capturer>> {
    #[cfg(feature = "capture")]
    {
        Some(Box::new(ChromeCapturer::detect()))
    }
    #[cfg(not(feature = "capture"))]
    {
        None
    }
}
