//! Article text extraction.
//!
//! Strips a fetched page down to readable text: parse the HTML, drop
//! `<script>` and `<style>` subtrees outright, collect the remaining text,
//! then normalize it line by line — trim, split on runs of two or more
//! spaces (a crude sentence/column separator), drop empty fragments, and
//! rejoin with newlines. The page `<title>` becomes the article title.
//!
//! Extraction is pure and deterministic: no I/O, and identical input always
//! produces identical output. Input that yields no usable text produces an
//! empty [`ExtractedArticle`] rather than an error.

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node, Selector};

use crate::models::ExtractedArticle;

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());

/// Two or more consecutive spaces, treated as a fragment separator.
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"  +").unwrap());

/// Extract title and body text from raw HTML.
pub fn extract(html: &str) -> ExtractedArticle {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let mut raw = String::new();
    collect_text(document.tree.root(), &mut raw);

    ExtractedArticle {
        title,
        body: clean_text(&raw),
    }
}

/// Append the text content under `node`, skipping script and style subtrees.
fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text.as_ref()),
            Node::Element(el) => {
                if matches!(el.name(), "script" | "style") {
                    continue;
                }
                collect_text(child, out);
            }
            _ => {}
        }
    }
}

/// Normalize collected text into newline-separated fragments.
fn clean_text(raw: &str) -> Option<String> {
    let fragments: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .flat_map(|line| SPACE_RUN.split(line))
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_splits_on_double_spaces() {
        let html = "<html><body><script>x</script><p>Hello  World</p></body></html>";
        let extracted = extract(html);
        assert_eq!(extracted.title, None);
        assert_eq!(extracted.body.as_deref(), Some("Hello\nWorld"));
    }

    #[test]
    fn takes_title_from_the_title_element() {
        let html = "<html><head><title> Breaking News </title></head>\
                    <body><p>Something happened.</p></body></html>";
        let extracted = extract(html);
        assert_eq!(extracted.title.as_deref(), Some("Breaking News"));
        assert!(
            extracted
                .body
                .as_deref()
                .unwrap()
                .contains("Something happened.")
        );
    }

    #[test]
    fn style_subtrees_are_dropped() {
        let html = "<html><head><style>p { color: red; }</style></head>\
                    <body><p>Visible</p></body></html>";
        let extracted = extract(html);
        assert_eq!(extracted.body.as_deref(), Some("Visible"));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let extracted = extract("");
        assert_eq!(extracted, ExtractedArticle::default());
    }

    #[test]
    fn markup_without_text_yields_nothing() {
        let extracted = extract("<html><body><div></div><img src=\"x.png\"></body></html>");
        assert_eq!(extracted, ExtractedArticle::default());
    }

    #[test]
    fn blank_lines_are_dropped() {
        let html = "<html><body><p>first</p>\n\n   \n<p>second</p></body></html>";
        let extracted = extract(html);
        assert_eq!(extracted.body.as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn inline_markup_is_flattened() {
        let html = "<p>a<b>b</b>c</p>";
        let extracted = extract(html);
        assert_eq!(extracted.body.as_deref(), Some("abc"));
    }

    #[test]
    fn extraction_is_deterministic() {
        let html = "<html><head><title>T</title></head>\
                    <body><p>Alpha  beta</p><p>gamma</p></body></html>";
        assert_eq!(extract(html), extract(html));
    }
}
