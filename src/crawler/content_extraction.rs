//! Content extraction functionality for the crawler module
//!
//! Readable text is pulled out of a page in a fixed priority order: every `<p>`,
//! otherwise every `<div>`, otherwise all remaining text. Boilerplate subtrees
//! (`script`, `style`, `head`, `nav`, `footer`, `header`, `svg`) never contribute.

use std::sync::LazyLock;

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tracing::{trace, warn};

/// Documents shorter than this many bytes are treated as having no content
pub const MIN_HTML_LENGTH: usize = 100;

/// Extracted text must be longer than this many characters to count as a page
pub(crate) const MIN_TEXT_LENGTH: usize = 100;

/// Elements whose whole subtree is dropped before text selection
const STRIPPED_TAGS: [&str; 7] = ["script", "style", "head", "nav", "footer", "header", "svg"];

/// Block elements tried in priority order
const BLOCK_TAGS: [&str; 2] = ["p", "div"];

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Extract the readable text of an HTML document.
///
/// Returns an empty string for documents under `MIN_HTML_LENGTH` bytes. Paragraph and
/// div texts are whitespace-collapsed individually and joined by a blank line; the
/// raw fallback is collapsed into a single line.
pub fn extract_text_content(html: &str) -> String {
    if html.len() < MIN_HTML_LENGTH {
        return String::new();
    }

    let document = Html::parse_document(html);
    // Only a block selector that fails to parse lands here; `BLOCK_TAGS` are all valid today
    match select_text(&document) {
        Ok(text) => text,
        Err(e) => {
            warn!("Structured extraction failed, stripping tags instead: {}", e);
            strip_tags(html)
        }
    }
}

fn select_text(document: &Html) -> Result<String, String> {
    for tag in BLOCK_TAGS {
        let selector = Selector::parse(tag).map_err(|e| format!("bad selector {}: {:?}", tag, e))?;

        let blocks: Vec<String> = document
            .select(&selector)
            .filter(|element| !inside_stripped(element))
            .map(|element| collapse_whitespace(&block_text(element)))
            .filter(|text| !text.is_empty())
            .collect();

        if !blocks.is_empty() {
            trace!("Selected {} <{}> blocks", blocks.len(), tag);
            return Ok(blocks.join("\n\n"));
        }
    }

    trace!("No <p> or <div> content, using all text");
    Ok(collapse_whitespace(&visible_text(document)))
}

/// Text owned by a block element: descendant text nodes whose nearest enclosing
/// element of the same name is `block` itself, so nested divs are not counted twice.
fn block_text(block: ElementRef<'_>) -> String {
    let name = block.value().name();
    let mut pieces = Vec::new();

    for node in block.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let owned = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != block.id())
            .filter_map(|ancestor| ancestor.value().as_element())
            .all(|element| element.name() != name && !STRIPPED_TAGS.contains(&element.name()));

        if owned {
            pieces.push(&**text);
        }
    }

    pieces.join(" ")
}

/// All text in the document outside the stripped subtrees
fn visible_text(document: &Html) -> String {
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let stripped = node.ancestors().any(|ancestor| {
                matches!(ancestor.value(), Node::Element(element) if STRIPPED_TAGS.contains(&element.name()))
            });
            (!stripped).then_some(&**text)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn inside_stripped(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(|ancestor| ancestor.value().as_element())
        .any(|ancestor| STRIPPED_TAGS.contains(&ancestor.name()))
}

/// Replace every tag with a space and collapse whitespace
pub(crate) fn strip_tags(html: &str) -> String {
    collapse_whitespace(&TAG_PATTERN.replace_all(html, " "))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pad a fragment past the minimum length with markup that carries no text
    fn padded(body: &str) -> String {
        format!(
            "<html><head><title>Legal</title><meta name=\"description\" content=\"padding\"></head><body>{}</body></html>",
            body
        )
    }

    #[test]
    fn test_short_input_is_empty() {
        assert_eq!(extract_text_content("<p>Short</p>"), "");
        assert_eq!(extract_text_content(""), "");
    }

    #[test]
    fn test_paragraphs_joined_and_scripts_removed() {
        let html = padded("<p>A</p><script>x</script><p>B</p>");
        assert_eq!(extract_text_content(&html), "A\n\nB");
    }

    #[test]
    fn test_never_includes_script_or_style_text() {
        let html = padded(
            "<style>.terms { color: red }</style><p>Visible <script>var hidden = 1;</script>text</p>",
        );
        let text = extract_text_content(&html);
        assert_eq!(text, "Visible text");
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color"));
        assert!(!text.contains("Legal"));
    }

    #[test]
    fn test_boilerplate_sections_are_stripped() {
        let html = padded(
            "<header><p>Site header</p></header>\
             <nav><p>Menu</p></nav>\
             <p>Section 1. Acceptance of terms.</p>\
             <footer><p>Copyright</p></footer>\
             <svg><text>Logo</text></svg>",
        );
        assert_eq!(extract_text_content(&html), "Section 1. Acceptance of terms.");
    }

    #[test]
    fn test_inner_tags_do_not_join_words() {
        let html = padded("<p>We<br>collect <b>your</b><i>data</i>\n\n  daily</p>");
        assert_eq!(extract_text_content(&html), "We collect your data daily");
    }

    #[test]
    fn test_falls_back_to_divs() {
        let html = padded("<div>First   block</div><div><span>Second</span> block</div><div> </div>");
        assert_eq!(extract_text_content(&html), "First block\n\nSecond block");
    }

    #[test]
    fn test_nested_divs_are_not_duplicated() {
        let html = padded("<div>Outer <div>Inner</div> tail</div>");
        assert_eq!(extract_text_content(&html), "Outer tail\n\nInner");
    }

    #[test]
    fn test_falls_back_to_all_text() {
        let html = padded("<h1>Terms</h1><ul><li>No <em>refunds</em></li><li>Be nice</li></ul><span>Thanks</span>");
        assert_eq!(extract_text_content(&html), "Terms No refunds Be nice Thanks");
    }

    #[test]
    fn test_entities_are_decoded() {
        let html = padded("<p>Terms &amp; Conditions</p>");
        assert_eq!(extract_text_content(&html), "Terms & Conditions");
    }

    #[test]
    fn test_block_selectors_parse() {
        for tag in BLOCK_TAGS {
            assert!(Selector::parse(tag).is_ok(), "{}", tag);
        }
        let html = padded("<p>Structured</p>");
        assert_eq!(select_text(&Html::parse_document(&html)).unwrap(), "Structured");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<div><b>Hello</b>\n<i>world</i></div>"),
            "Hello world"
        );
    }
}
