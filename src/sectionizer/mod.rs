//! Turns a free-text job description into titled, bulleted sections.
//!
//! The transform is pure: the same description always yields the same
//! sections, and nothing is cached between calls.

mod headings;

pub use headings::{HeadingRegistry, DEFAULT_HEADINGS};

use headings::DEFAULT_REGISTRY;
use serde::Serialize;

/// Lines at or above this many characters are dropped from a section body.
pub const MAX_ITEM_LEN: usize = 500;

/// In the fallback section, only lines longer than this are kept.
/// Independent of [`MAX_ITEM_LEN`], which still caps every item.
pub const FALLBACK_MIN_LEN: usize = 10;

/// Title of the single section produced when no headed section survives.
pub const FALLBACK_TITLE: &str = "About This Role";

const BULLET_GLYPHS: [char; 3] = ['-', '•', '*'];

/// A titled group of bullet items. `items` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub items: Vec<String>,
}

/// Sectionize a description using the built-in heading registry.
///
/// Empty or absent input yields no sections; callers render an empty state.
///
/// # Example
/// ```
/// use job_scraper_client::sectionize;
///
/// let sections = sectionize(Some("Requirements:\n- SQL\n- Python"));
/// assert_eq!(sections[0].title, "Requirements");
/// assert_eq!(sections[0].items, vec!["SQL", "Python"]);
/// ```
pub fn sectionize(description: Option<&str>) -> Vec<Section> {
    sectionize_with(&DEFAULT_REGISTRY, description)
}

/// Sectionize a description against a custom heading registry.
pub fn sectionize_with(registry: &HeadingRegistry, description: Option<&str>) -> Vec<Section> {
    let description = match description {
        Some(text) if !text.is_empty() => text,
        _ => return Vec::new(),
    };

    let sections: Vec<Section> = registry
        .split(description)
        .into_iter()
        .filter_map(|(heading, body)| {
            let items = body_items(body);
            if items.is_empty() {
                None
            } else {
                Some(Section {
                    title: heading_title(heading),
                    items,
                })
            }
        })
        .collect();

    // Headings whose bodies were all empty or overlong count as no headings
    if sections.is_empty() {
        return fallback_section(description).into_iter().collect();
    }
    sections
}

/// Remove one leading bullet glyph and the whitespace after it.
pub fn strip_bullet(line: &str) -> &str {
    match line.strip_prefix(&BULLET_GLYPHS[..]) {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}

fn heading_title(heading: &str) -> String {
    let heading = heading.trim();
    heading
        .strip_suffix(':')
        .unwrap_or(heading)
        .trim()
        .to_string()
}

fn body_items(body: &str) -> Vec<String> {
    body.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.chars().count() < MAX_ITEM_LEN)
        .map(strip_bullet)
        // A bare glyph line would otherwise survive as an empty bullet
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn fallback_section(description: &str) -> Option<Section> {
    let items: Vec<String> = description
        .split('\n')
        .map(str::trim)
        .filter(|line| {
            let len = line.chars().count();
            len > FALLBACK_MIN_LEN && len < MAX_ITEM_LEN
        })
        .map(String::from)
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(Section {
            title: FALLBACK_TITLE.to_string(),
            items,
        })
    }
}
