//! Shared types used across the pipeline.
//!
//! Descriptors and details travel from the classifier through the summary
//! client into the gallery controller; the style types are both part of the
//! config file (`[style]`) and of the live application state.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Content ID used when the backend, not the client, extracts the real ID.
pub const ID_SENTINEL: &str = "pending";

/// Supported source platforms. Serialized exactly as the backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    YouTube,
    Twitter,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Twitter => "Twitter",
        }
    }

    /// Small glyph shown next to the platform name in card headers.
    pub fn icon(self) -> &'static str {
        match self {
            Platform::YouTube => "▶",
            Platform::Twitter => "𝕏",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{platform, id}` pair extracted from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlDescriptor {
    pub platform: Platform,
    /// May be empty when the URL names a platform but no content
    /// (e.g. `youtube.com/watch` without `v`).
    pub id: String,
}

impl UrlDescriptor {
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Replace an empty id with [`ID_SENTINEL`], for backends that extract
    /// the id themselves.
    pub fn or_sentinel(self) -> Self {
        if self.has_id() {
            self
        } else {
            Self {
                id: ID_SENTINEL.to_string(),
                ..self
            }
        }
    }
}

/// One labelled key point of a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

/// Summarized content as returned by the backend.
///
/// Every field tolerates absence and `null`: the backend variants disagree on
/// which fields they send, and an empty title or summary renders as
/// placeholder text rather than failing the whole request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default = "default_confidence", deserialize_with = "null_as_confidence")]
    pub confidence: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlights: Vec<Highlight>,
}

fn default_confidence() -> String {
    "--".to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_confidence<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_confidence))
}

/// A fetched detail merged with the descriptor it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardData {
    pub platform: Platform,
    pub id: String,
    pub detail: ContentDetail,
}

// =============================================================================
// Style
// =============================================================================

/// Named visual variant of a card.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Nebula,
    Circuit,
    Prism,
    Aurora,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Nebula, Theme::Circuit, Theme::Prism, Theme::Aurora];

    /// Lowercase identifier used in CSS classes, config files and filenames.
    pub fn slug(self) -> &'static str {
        match self {
            Theme::Nebula => "nebula",
            Theme::Circuit => "circuit",
            Theme::Prism => "prism",
            Theme::Aurora => "aurora",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Theme::Nebula => "Nebula",
            Theme::Circuit => "Circuit",
            Theme::Prism => "Prism",
            Theme::Aurora => "Aurora",
        }
    }

    pub fn css_class(self) -> String {
        format!("theme-{}", self.slug())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    #[default]
    Normal,
    Compact,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    #[default]
    Show,
    Hide,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Standard,
    Quote,
    Minimal,
}

impl Layout {
    pub fn css_class(self) -> &'static str {
        match self {
            Layout::Standard => "layout-standard",
            Layout::Quote => "layout-quote",
            Layout::Minimal => "layout-minimal",
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StyleError {
    #[error("accent must be a hex color like #4c6fff, got {0:?}")]
    InvalidAccent(String),
    #[error("at least one theme is required")]
    NoThemes,
    #[error("theme {0} is listed more than once")]
    DuplicateTheme(Theme),
}

/// Card styling shared by every theme in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// Accent color, `#rgb` or `#rrggbb`.
    pub accent: String,
    pub density: Density,
    pub highlights: HighlightMode,
    pub layout: Layout,
    /// Themes rendered side by side, in display order.
    pub themes: Vec<Theme>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            accent: "#4c6fff".to_string(),
            density: Density::Normal,
            highlights: HighlightMode::Show,
            layout: Layout::Standard,
            themes: Theme::ALL.to_vec(),
        }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> Result<(), StyleError> {
        if !is_hex_color(&self.accent) {
            return Err(StyleError::InvalidAccent(self.accent.clone()));
        }
        if self.themes.is_empty() {
            return Err(StyleError::NoThemes);
        }
        for (i, theme) in self.themes.iter().enumerate() {
            if self.themes[..i].contains(theme) {
                return Err(StyleError::DuplicateTheme(*theme));
            }
        }
        Ok(())
    }

    /// Shallow-merge a patch: every field present in the patch replaces the
    /// current value wholesale.
    pub fn apply(&mut self, patch: StylePatch) {
        if let Some(accent) = patch.accent {
            self.accent = accent;
        }
        if let Some(density) = patch.density {
            self.density = density;
        }
        if let Some(highlights) = patch.highlights {
            self.highlights = highlights;
        }
        if let Some(layout) = patch.layout {
            self.layout = layout;
        }
        if let Some(themes) = patch.themes {
            self.themes = themes;
        }
    }
}

/// A partial [`StyleConfig`], as produced by a single control change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylePatch {
    pub accent: Option<String>,
    pub density: Option<Density>,
    pub highlights: Option<HighlightMode>,
    pub layout: Option<Layout>,
    pub themes: Option<Vec<Theme>>,
}

impl StylePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_serializes_as_backend_names() {
        assert_eq!(serde_json::to_string(&Platform::YouTube).unwrap(), r#""YouTube""#);
        assert_eq!(serde_json::to_string(&Platform::Twitter).unwrap(), r#""Twitter""#);
    }

    #[test]
    fn sentinel_only_fills_empty_ids() {
        let empty = UrlDescriptor {
            platform: Platform::YouTube,
            id: String::new(),
        };
        assert_eq!(empty.or_sentinel().id, ID_SENTINEL);

        let real = UrlDescriptor {
            platform: Platform::Twitter,
            id: "42".to_string(),
        };
        assert_eq!(real.or_sentinel().id, "42");
    }

    #[test]
    fn detail_tolerates_missing_fields() {
        let detail: ContentDetail = serde_json::from_str(r#"{"title": "Hi"}"#).unwrap();
        assert_eq!(detail.title, "Hi");
        assert_eq!(detail.summary, "");
        assert_eq!(detail.length, None);
        assert_eq!(detail.confidence, "--");
        assert!(detail.highlights.is_empty());
    }

    #[test]
    fn detail_tolerates_null_fields() {
        let detail: ContentDetail = serde_json::from_str(
            r#"{"title": "T", "summary": null, "length": null, "confidence": null, "highlights": null}"#,
        )
        .unwrap();
        assert_eq!(detail.title, "T");
        assert_eq!(detail.summary, "");
        assert_eq!(detail.length, None);
        assert_eq!(detail.confidence, "--");
        assert!(detail.highlights.is_empty());

        let detail: ContentDetail =
            serde_json::from_str(r#"{"highlights": [{"label": null, "text": "only text"}]}"#)
                .unwrap();
        assert_eq!(detail.highlights[0].label, "");
        assert_eq!(detail.highlights[0].text, "only text");
    }

    #[test]
    fn detail_keeps_highlight_order() {
        let detail: ContentDetail = serde_json::from_str(
            r#"{"highlights": [{"label": "A", "text": "first"}, {"label": "B", "text": "second"}]}"#,
        )
        .unwrap();
        let labels: Vec<_> = detail.highlights.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, ["A", "B"]);
    }

    #[test]
    fn default_style_is_valid() {
        assert!(StyleConfig::default().validate().is_ok());
    }

    #[test]
    fn accent_validation() {
        let mut style = StyleConfig::default();
        style.accent = "#abc".to_string();
        assert!(style.validate().is_ok());

        style.accent = "red".to_string();
        assert_eq!(
            style.validate(),
            Err(StyleError::InvalidAccent("red".to_string()))
        );

        style.accent = "#12345g".to_string();
        assert!(style.validate().is_err());
    }

    #[test]
    fn themes_must_be_nonempty_and_unique() {
        let mut style = StyleConfig::default();
        style.themes = vec![];
        assert_eq!(style.validate(), Err(StyleError::NoThemes));

        style.themes = vec![Theme::Prism, Theme::Nebula, Theme::Prism];
        assert_eq!(style.validate(), Err(StyleError::DuplicateTheme(Theme::Prism)));
    }

    #[test]
    fn apply_patch_is_shallow() {
        let mut style = StyleConfig::default();
        style.apply(StylePatch {
            density: Some(Density::Compact),
            ..Default::default()
        });
        assert_eq!(style.density, Density::Compact);
        // Untouched fields keep their values
        assert_eq!(style.accent, "#4c6fff");
        assert_eq!(style.themes, Theme::ALL.to_vec());

        style.apply(StylePatch {
            themes: Some(vec![Theme::Aurora]),
            ..Default::default()
        });
        assert_eq!(style.themes, vec![Theme::Aurora]);
    }

    #[test]
    fn style_parses_lowercase_enums() {
        let style: StyleConfig = toml::from_str(
            r#"
density = "compact"
highlights = "hide"
layout = "quote"
themes = ["prism", "nebula"]
"#,
        )
        .unwrap();
        assert_eq!(style.density, Density::Compact);
        assert_eq!(style.highlights, HighlightMode::Hide);
        assert_eq!(style.layout, Layout::Quote);
        assert_eq!(style.themes, vec![Theme::Prism, Theme::Nebula]);
    }
}
