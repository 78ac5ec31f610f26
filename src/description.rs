//! Turn scraped descriptions into the plain text the sectionizer reads.
//!
//! Some platforms hand back HTML fragments, others plain text with the odd
//! entity left in. Both come out as newline-separated lines.

use html_escape::decode_html_entities;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::sync::LazyLock;

static TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"</?[a-zA-Z][a-zA-Z0-9]*(\s[^<>]*)?/?>").ok());

enum Piece {
    Text(String),
    Break,
    Bullet,
}

/// Whether `text` contains at least one HTML tag
pub fn looks_like_html(text: &str) -> bool {
    TAG.as_ref().is_some_and(|tag| tag.is_match(text))
}

/// Convert a description to plain text.
///
/// HTML block elements and `<br>` end a line, list items start with `- `,
/// and scripts, styles and hidden elements are dropped. Text without tags
/// only has its entities decoded.
pub fn to_plain_text(description: &str) -> String {
    if !looks_like_html(description) {
        return decode_html_entities(description).into_owned();
    }

    let fragment = Html::parse_fragment(description);
    let mut pieces = Vec::new();
    collect(&fragment.root_element(), &mut pieces);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut bullet = false;

    // Inline nodes are glued as-is; only their own whitespace separates them
    let mut flush = |current: &mut String, bullet: &mut bool| {
        let line = collapse_whitespace(current);
        let line = line.trim();
        if !line.is_empty() {
            if *bullet {
                lines.push(format!("- {line}"));
            } else {
                lines.push(line.to_string());
            }
        }
        current.clear();
        *bullet = false;
    };

    for piece in pieces {
        match piece {
            Piece::Text(text) => current.push_str(&text),
            Piece::Break => flush(&mut current, &mut bullet),
            Piece::Bullet => {
                flush(&mut current, &mut bullet);
                bullet = true;
            }
        }
    }
    flush(&mut current, &mut bullet);

    lines.join("\n")
}

fn collect(element: &ElementRef, pieces: &mut Vec<Piece>) {
    if is_hidden(element) || is_skipped(element) {
        return;
    }

    let tag = element.value().name().to_lowercase();
    if tag == "br" {
        pieces.push(Piece::Break);
        return;
    }
    if tag == "li" {
        pieces.push(Piece::Bullet);
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                if !text.is_empty() {
                    pieces.push(Piece::Text(collapse_whitespace(text)));
                }
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect(&child, pieces);
                }
            }
            _ => {}
        }
    }

    if is_block(&tag) {
        pieces.push(Piece::Break);
    } else if matches!(tag.as_str(), "td" | "th") {
        pieces.push(Piece::Text(" ".to_string()));
    }
}

fn is_hidden(element: &ElementRef) -> bool {
    element.value().attr("hidden").is_some()
        || element
            .value()
            .attr("style")
            .is_some_and(|s| s.contains("display: none") || s.contains("display:none"))
}

fn is_skipped(element: &ElementRef) -> bool {
    matches!(
        element.value().name(),
        "script" | "style" | "noscript" | "template" | "svg"
    )
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "dl"
            | "dt"
            | "dd"
            | "table"
            | "tr"
            | "blockquote"
            | "pre"
            | "hr"
    )
}

/// Runs of whitespace become one space. Leading and trailing runs are kept.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
