//! CMS content documents.
//!
//! The CMS stores page and post bodies as structured rich-text documents.
//! Tools accept plain text and use the builders here to produce the stored
//! shape: a `root` node holding block children, where each block holds text
//! leaves.
//!
//! - Pages: a layout array with one full-width `content` block whose rich
//!   text is an `h1` heading (the title) followed by a paragraph (the body)
//! - Posts: a rich-text `root` with a single paragraph
//! - Both: a `meta` object with the title and a summary of the body

use serde_json::{json, Value};

/// Maximum length, in characters, of the summary stored in `meta.description`.
pub const SUMMARY_MAX_CHARS: usize = 160;

/// Truncates `body` to at most [`SUMMARY_MAX_CHARS`] characters.
///
/// Counts Unicode scalar values, never splitting a character.
#[must_use]
pub fn summarise(body: &str) -> String {
    body.chars().take(SUMMARY_MAX_CHARS).collect()
}

fn paragraph(text: &str) -> Value {
    json!({
        "type": "paragraph",
        "children": [{ "text": text }]
    })
}

fn rich_text(children: Vec<Value>) -> Value {
    json!({
        "root": {
            "type": "root",
            "children": children
        }
    })
}

/// Builds the layout document for a page.
#[must_use]
pub fn page_layout(title: &str, body: &str) -> Value {
    let heading = json!({
        "type": "heading",
        "tag": "h1",
        "children": [{ "text": title }]
    });

    json!([{
        "blockType": "content",
        "columns": [{
            "size": "full",
            "richText": rich_text(vec![heading, paragraph(body)])
        }]
    }])
}

/// Builds the hero block for a page. Pages created through MCP have none.
#[must_use]
pub fn page_hero() -> Value {
    json!({ "type": "none" })
}

/// Builds the rich-text body for a post.
#[must_use]
pub fn post_body(body: &str) -> Value {
    rich_text(vec![paragraph(body)])
}

/// Builds the SEO metadata shared by pages and posts.
#[must_use]
pub fn meta(title: &str, body: &str) -> Value {
    json!({
        "title": title,
        "description": summarise(body)
    })
}

/// Extracts the body paragraph text from a page layout, if present.
#[must_use]
pub fn layout_body(layout: &Value) -> Option<&str> {
    layout
        .pointer("/0/columns/0/richText/root/children")?
        .as_array()?
        .iter()
        .find(|node| node.get("type").and_then(Value::as_str) == Some("paragraph"))?
        .pointer("/children/0/text")?
        .as_str()
}

/// Derives a URL slug from a title.
///
/// Lowercases ASCII alphanumerics and collapses every other run of
/// characters into a single hyphen.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
