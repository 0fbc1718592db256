//! Card rendering.
//!
//! Rendering is a pure function of `(theme, card data, style, marks)`: no I/O,
//! no hidden state. The controller rebuilds every card on every change, and
//! the same inputs always produce byte-identical markup.
//!
//! ## Card Structure
//!
//! ```text
//! article.card.theme-<theme>.layout-<layout>[.compact][.selected][.is-capturing]
//! ├── header.card-header      icon · platform · length (omitted when absent)
//! ├── h2.card-title           ┐ swapped for the quote layout
//! ├── p.card-summary          ┘
//! ├── section.card-highlights always present; empty + .hidden when not shown
//! ├── footer.card-footer      attribution · source id · confidence
//! └── button.download-card    disabled while this card is being captured
//! ```
//!
//! Density and layout only change classes and ordering, never content. The
//! accent color is set once per card as the `--accent` custom property.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/); all interpolated text is escaped, so
//! backend-provided titles and summaries cannot inject markup.

use crate::config;
use crate::types::{
    CardData, ContentDetail, Density, Highlight, HighlightMode, Layout, Platform, StyleConfig,
    Theme,
};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STATIC: &str = include_str!("../static/card.css");
const JS: &str = include_str!("../static/gallery.js");

const UNTITLED: &str = "Untitled";
const NO_SUMMARY: &str = "No summary available.";

/// Transient per-card markers owned by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardMarks {
    pub selected: bool,
    pub capturing: bool,
}

/// One themed card, rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard {
    pub theme: Theme,
    pub html: String,
}

/// Every themed card for the current state, in theme order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    pub cards: Vec<RenderedCard>,
}

impl Gallery {
    pub fn card(&self, theme: Theme) -> Option<&RenderedCard> {
        self.cards.iter().find(|c| c.theme == theme)
    }

    pub fn contains(&self, theme: Theme) -> bool {
        self.card(theme).is_some()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Sample content shown before the first successful fetch.
pub fn placeholder_card() -> CardData {
    CardData {
        platform: Platform::YouTube,
        id: String::new(),
        detail: ContentDetail {
            title: "Paste a link to make your card".to_string(),
            summary: "Drop a YouTube video or an X post above. The summary, key points \
                      and confidence will appear here in every theme."
                .to_string(),
            length: None,
            confidence: "--".to_string(),
            highlights: vec![
                Highlight {
                    label: "Step 1".to_string(),
                    text: "Paste a YouTube or X link.".to_string(),
                },
                Highlight {
                    label: "Step 2".to_string(),
                    text: "Pick an accent, density and layout.".to_string(),
                },
                Highlight {
                    label: "Step 3".to_string(),
                    text: "Download the card you like as PNG.".to_string(),
                },
            ],
        },
    }
}

/// CSS class list for a card.
pub fn card_classes(theme: Theme, style: &StyleConfig, marks: CardMarks) -> String {
    let mut classes = vec![
        "card".to_string(),
        theme.css_class(),
        style.layout.css_class().to_string(),
    ];
    if style.density == Density::Compact {
        classes.push("compact".to_string());
    }
    if marks.selected {
        classes.push("selected".to_string());
    }
    if marks.capturing {
        classes.push("is-capturing".to_string());
    }
    classes.join(" ")
}

/// Render a single themed card.
pub fn render_card(theme: Theme, card: &CardData, style: &StyleConfig, marks: CardMarks) -> Markup {
    let detail = &card.detail;
    let title = non_empty_or(&detail.title, UNTITLED);
    let summary = non_empty_or(&detail.summary, NO_SUMMARY);
    let length = detail.length.as_deref().filter(|l| !l.trim().is_empty());
    let accent = format!("--accent: {};", style.accent);

    let title_markup = html! { h2.card-title { (title) } };
    let summary_markup = html! { p.card-summary { (summary) } };

    html! {
        article class=(card_classes(theme, style, marks)) data-theme=(theme.slug()) style=(accent) {
            header.card-header {
                span.platform-icon aria-hidden="true" { (card.platform.icon()) }
                span.platform-name { (card.platform) }
                @if let Some(length) = length {
                    span.card-length { (length) }
                }
            }
            @if style.layout == Layout::Quote {
                (summary_markup)
                (title_markup)
            } @else {
                (title_markup)
                (summary_markup)
            }
            (render_highlights(&detail.highlights, style.highlights))
            footer.card-footer {
                span.attribution { "Magic Card · " (theme.display_name()) }
                span.source-id { "Source ID: " (non_empty_or(&card.id, "--")) }
                span.confidence { "Confidence: " (detail.confidence) }
            }
            button.download-card type="button" data-theme=(theme.slug()) disabled[marks.capturing] {
                "Export PNG"
            }
        }
    }
}

/// The highlights block is never dropped from the tree: when hidden or empty
/// it stays as an empty placeholder so toggling only swaps its content.
fn render_highlights(highlights: &[Highlight], mode: HighlightMode) -> Markup {
    let visible = mode == HighlightMode::Show && !highlights.is_empty();
    html! {
        @if visible {
            section.card-highlights {
                @for item in highlights {
                    div.highlight {
                        span.highlight-label { (item.label) }
                        div.highlight-text { (item.text) }
                    }
                }
            }
        } @else {
            section.card-highlights.hidden aria-hidden="true" {}
        }
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

/// Render every configured theme. `data` falls back to the placeholder so
/// the gallery is never empty.
pub fn render_gallery(
    data: Option<&CardData>,
    style: &StyleConfig,
    selected: Option<Theme>,
    capturing: Option<Theme>,
) -> Gallery {
    let placeholder;
    let card = match data {
        Some(card) => card,
        None => {
            placeholder = placeholder_card();
            &placeholder
        }
    };
    let cards = style
        .themes
        .iter()
        .map(|&theme| {
            let marks = CardMarks {
                selected: selected == Some(theme),
                capturing: capturing == Some(theme),
            };
            RenderedCard {
                theme,
                html: render_card(theme, card, style, marks).into_string(),
            }
        })
        .collect();
    Gallery { cards }
}

// ============================================================================
// Documents
// ============================================================================

fn stylesheet(style: &StyleConfig) -> String {
    format!("{}\n\n{}", config::generate_style_css(style), CSS_STATIC)
}

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Full gallery page: status line plus every card. `gallery.js` handles
/// exclusive selection, and its download buttons write the matching
/// `magic-card export` command for `source_url` into the status line.
pub fn render_gallery_document(
    gallery: &Gallery,
    style: &StyleConfig,
    status: &str,
    source_url: Option<&str>,
) -> Markup {
    let content = html! {
        main.gallery-page {
            p.status role="status" { (status) }
            div.gallery data-source-url=[source_url] {
                @for card in &gallery.cards {
                    (PreEscaped(card.html.as_str()))
                }
            }
        }
        script { (PreEscaped(JS)) }
    };
    base_document("Magic Card", &stylesheet(style), None, content)
}

/// Single card in a fixed-width frame, for rasterizing. The width is set in
/// CSS pixels so exports don't depend on the capture viewport.
pub fn render_capture_document(card_html: &str, style: &StyleConfig, width: u32) -> Markup {
    let frame = format!("width: {width}px;");
    let content = html! {
        div.capture-frame style=(frame) {
            (PreEscaped(card_html))
        }
    };
    base_document("Magic Card", &stylesheet(style), Some("capture"), content)
}

// ============================================================================
// Tests
// ============================================================================
