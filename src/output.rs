//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! The primary line for every entity is its identity: platform and source id
//! for a link, positional index and display name for a theme. Paths and card
//! fields follow as indented context lines.
//!
//! # Output Format
//!
//! ## Classify
//!
//! ```text
//! YouTube abc123
//! ```
//!
//! ## Card
//!
//! ```text
//! YouTube abc123 → dist/gallery.html
//!     Title: Rust in ten minutes
//!     Summary: Ownership, borrowing and lifetimes explained with one runn...
//!     Length: 10:42
//!     Confidence: 97%
//!     Highlights: 2
//! 001 Nebula
//! 002 Circuit
//! ```
//!
//! ## Export
//!
//! ```text
//! Circuit → dist/magic-card-1718000000123.png
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::gallery::Status;
use crate::render::Gallery;
use crate::types::{CardData, Theme, UrlDescriptor};
use std::path::Path;

const SUMMARY_WIDTH: usize = 60;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn descriptor_line(descriptor: &UrlDescriptor) -> String {
    if descriptor.has_id() {
        format!("{} {}", descriptor.platform, descriptor.id)
    } else {
        format!("{} (no id)", descriptor.platform)
    }
}

// ============================================================================
// classify
// ============================================================================

pub fn format_classify(descriptor: Option<&UrlDescriptor>) -> Vec<String> {
    match descriptor {
        Some(d) => vec![descriptor_line(d)],
        None => vec!["unsupported link".to_string()],
    }
}

pub fn print_classify(descriptor: Option<&UrlDescriptor>) {
    for line in format_classify(descriptor) {
        println!("{}", line);
    }
}

// ============================================================================
// card / preview
// ============================================================================

/// Card fields plus the themes written to the gallery document.
pub fn format_card(data: Option<&CardData>, gallery: &Gallery, written: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    match data {
        Some(card) => {
            let descriptor = UrlDescriptor {
                platform: card.platform,
                id: card.id.clone(),
            };
            lines.push(format!("{} → {}", descriptor_line(&descriptor), written.display()));
            let detail = &card.detail;
            if !detail.title.is_empty() {
                lines.push(format!("{}Title: {}", indent(1), detail.title));
            }
            if !detail.summary.is_empty() {
                lines.push(format!(
                    "{}Summary: {}",
                    indent(1),
                    truncate(&detail.summary, SUMMARY_WIDTH)
                ));
            }
            if let Some(length) = detail.length.as_deref().filter(|l| !l.is_empty()) {
                lines.push(format!("{}Length: {}", indent(1), length));
            }
            lines.push(format!("{}Confidence: {}", indent(1), detail.confidence));
            if !detail.highlights.is_empty() {
                lines.push(format!("{}Highlights: {}", indent(1), detail.highlights.len()));
            }
        }
        None => lines.push(format!("Preview → {}", written.display())),
    }
    for (i, card) in gallery.cards.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), card.theme.display_name()));
    }
    lines
}

pub fn print_card(data: Option<&CardData>, gallery: &Gallery, written: &Path) {
    for line in format_card(data, gallery, written) {
        println!("{}", line);
    }
}

// ============================================================================
// export
// ============================================================================

pub fn format_export(theme: Theme, path: &Path) -> Vec<String> {
    vec![format!("{} → {}", theme.display_name(), path.display())]
}

pub fn print_export(theme: Theme, path: &Path) {
    for line in format_export(theme, path) {
        println!("{}", line);
    }
}

// ============================================================================
// status
// ============================================================================

/// Error statuses go to stderr, so only successful output lands on stdout.
pub fn format_status(status: &Status) -> String {
    if status.is_error() {
        format!("error: {}", status)
    } else {
        status.to_string()
    }
}

pub fn print_status(status: &Status) {
    if status.is_error() {
        eprintln!("{}", format_status(status));
    } else {
        println!("{}", format_status(status));
    }
}

// ============================================================================
// themes
// ============================================================================

/// Every theme, marking the ones enabled in the current config.
pub fn format_themes(enabled: &[Theme]) -> Vec<String> {
    Theme::ALL
        .iter()
        .enumerate()
        .map(|(i, theme)| {
            let mark = if enabled.contains(theme) { "" } else { " (disabled)" };
            format!(
                "{} {} [{}]{}",
                format_index(i + 1),
                theme.display_name(),
                theme.slug(),
                mark
            )
        })
        .collect()
}

pub fn print_themes(enabled: &[Theme]) {
    for line in format_themes(enabled) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_gallery;
    use crate::test_helpers::sample_detail;
    use crate::types::{Platform, StyleConfig};
    use std::path::PathBuf;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn truncate_short_and_long() {
        assert_eq!(truncate("Short text", 40), "Short text");
        assert_eq!(truncate(&"a".repeat(40), 40), "a".repeat(40));
        assert_eq!(truncate(&"a".repeat(50), 40), format!("{}...", "a".repeat(40)));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    // =========================================================================
    // Command output
    // =========================================================================

    #[test]
    fn classify_lines() {
        let d = UrlDescriptor {
            platform: Platform::Twitter,
            id: "42".to_string(),
        };
        assert_eq!(format_classify(Some(&d)), vec!["Twitter 42"]);
        assert_eq!(format_classify(None), vec!["unsupported link"]);

        let empty = UrlDescriptor {
            platform: Platform::YouTube,
            id: String::new(),
        };
        assert_eq!(format_classify(Some(&empty)), vec!["YouTube (no id)"]);
    }

    #[test]
    fn card_lines() {
        let card = CardData {
            platform: Platform::YouTube,
            id: "abc123".to_string(),
            detail: sample_detail(),
        };
        let style = StyleConfig::default();
        let gallery = render_gallery(Some(&card), &style, None, None);
        let lines = format_card(Some(&card), &gallery, &PathBuf::from("dist/gallery.html"));

        assert_eq!(lines[0], "YouTube abc123 → dist/gallery.html");
        assert_eq!(lines[1], "    Title: Rust in ten minutes");
        assert!(lines[2].starts_with("    Summary: Ownership"));
        assert_eq!(lines[3], "    Length: 10:42");
        assert_eq!(lines[4], "    Confidence: 97%");
        assert_eq!(lines[5], "    Highlights: 2");
        assert_eq!(lines[6], "001 Nebula");
        assert_eq!(lines.len(), 6 + Theme::ALL.len());
    }

    #[test]
    fn preview_lines() {
        let gallery = render_gallery(None, &StyleConfig::default(), None, None);
        let lines = format_card(None, &gallery, &PathBuf::from("out/gallery.html"));
        assert_eq!(lines[0], "Preview → out/gallery.html");
        assert_eq!(lines.len(), 1 + Theme::ALL.len());
    }

    #[test]
    fn export_line() {
        assert_eq!(
            format_export(Theme::Circuit, &PathBuf::from("dist/magic-card-1.png")),
            vec!["Circuit → dist/magic-card-1.png"]
        );
    }

    #[test]
    fn status_prefixes_errors() {
        assert_eq!(format_status(&Status::Ready), "Card ready.");
        assert_eq!(
            format_status(&Status::Failed("Video is private".into())),
            "error: Video is private"
        );
    }

    #[test]
    fn themes_mark_disabled() {
        let lines = format_themes(&[Theme::Nebula, Theme::Aurora]);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "001 Nebula [nebula]");
        assert!(lines[1].ends_with("(disabled)"));
        assert!(!lines[3].ends_with("(disabled)"));
    }
}
