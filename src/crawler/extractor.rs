//! Structured content extraction from a parsed document
//!
//! Turns a document tree into a [`PageRecord`]: title, description, favicon,
//! keyword tags, main content, images from the content region and outgoing
//! links. Works against the [`Element`] trait so any parser can feed it.

use crate::document::{collect_text, find_all, find_first, parse_document, Element};
use crate::url::{normalize_url, origin_of, resolve_asset, resolve_link};
use std::collections::HashSet;

/// Paragraphs shorter than this are treated as navigation or UI chrome
const MIN_PARAGRAPH_CHARS: usize = 50;

/// Paragraph gathering stops once the content exceeds this length
const PARAGRAPH_TARGET_CHARS: usize = 500;

/// Paragraph content shorter than this falls back to the container text
const MIN_CONTENT_CHARS: usize = 100;

/// Hard cap on stored main content
const MAX_CONTENT_CHARS: usize = 2000;

const TRUNCATION_MARKER: &str = "...";

/// Substrings that mark a paragraph as navigation rather than prose
const NAVIGATION_MARKERS: &[&str] = &["Toggle", "languages", "Jump to"];

/// Containers searched, in order, for the main content region
const CONTENT_CONTAINERS: &[&str] = &["article", "main", "body"];

const REJECTED_IMAGE_MARKERS: &[&str] = &[".ico", ".gif", "favicon"];
const ACCEPTED_IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".webp", ".svg"];

/// One crawled page, as extracted from its markup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRecord {
    /// Normalized URL; the storage uniqueness key
    pub url: String,
    pub title: String,
    pub description: String,
    /// Bounded-length extracted text
    pub main_content: String,
    /// The fetched document, verbatim
    pub raw_markup: String,
    /// Absolute favicon URL
    pub favicon: String,
    pub tags: Vec<String>,
    /// Unique absolute image URLs from the main content region
    pub images: Vec<String>,
    /// Unique absolute URLs linked from the page, in first-seen order
    pub outgoing_links: Vec<String>,
}

/// Parses `markup` fetched from `page_url` and extracts its record
///
/// The document tree lives only for the duration of this call.
///
/// # Arguments
///
/// * `markup` - The fetched document, verbatim
/// * `page_url` - The URL the document was fetched from
///
/// # Returns
///
/// The extracted [`PageRecord`], with `raw_markup` set to `markup`.
pub fn extract_page(markup: &str, page_url: &str) -> PageRecord {
    let document = parse_document(markup);
    let mut record = extract(document.root_element(), page_url);
    record.raw_markup = markup.to_string();
    record
}

/// Extracts a page record from a document tree
///
/// Relative references are resolved against `page_url` as fetched; the
/// record's own `url` is its normalized form. `raw_markup` is left empty.
pub fn extract<'t, E: Element<'t>>(root: E, page_url: &str) -> PageRecord {
    let metas = find_all(root, "meta");

    let title = find_first(root, "title")
        .map(|node| collect_text(node).trim().to_string())
        .unwrap_or_default();

    let description = meta_description(&metas);
    let container = content_container(root);

    let main_content = match &description {
        Some(text) => text.clone(),
        None => container.map(main_content_of).unwrap_or_default(),
    };

    PageRecord {
        url: normalize_url(page_url),
        title,
        description: description.unwrap_or_default(),
        main_content,
        raw_markup: String::new(),
        favicon: favicon(root, page_url),
        tags: keyword_tags(&metas),
        images: container
            .map(|node| content_images(node, page_url))
            .unwrap_or_default(),
        outgoing_links: outgoing_links(root, page_url),
    }
}

/// Returns true when an image URL points at a content image format
///
/// Checked on the lower-cased URL with any query string removed. Icons, GIFs
/// and anything mentioning "favicon" are rejected before the extension list
/// is consulted.
pub fn is_valid_image_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    let path = lower.split('?').next().unwrap_or_default();

    if REJECTED_IMAGE_MARKERS
        .iter()
        .any(|marker| path.contains(marker))
    {
        return false;
    }

    ACCEPTED_IMAGE_EXTENSIONS
        .iter()
        .any(|extension| path.contains(extension))
}

fn meta_description<'t, E: Element<'t>>(metas: &[E]) -> Option<String> {
    metas
        .iter()
        .filter(|meta| {
            meta.attr("name") == Some("description")
                || meta.attr("property") == Some("og:description")
        })
        .filter_map(|meta| meta.attr("content"))
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn keyword_tags<'t, E: Element<'t>>(metas: &[E]) -> Vec<String> {
    metas
        .iter()
        .filter(|meta| meta.attr("name") == Some("keywords"))
        .filter_map(|meta| meta.attr("content"))
        .flat_map(|content| content.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn favicon<'t, E: Element<'t>>(root: E, page_url: &str) -> String {
    let declared = find_all(root, "link")
        .into_iter()
        .filter(|link| link.attr("rel").is_some_and(|rel| rel.contains("icon")))
        .filter_map(|link| link.attr("href"))
        .find(|href| !href.trim().is_empty())
        .and_then(|href| resolve_asset(href, page_url));

    match declared {
        Some(url) => url,
        None => origin_of(page_url)
            .map(|origin| format!("{}/favicon.ico", origin))
            .unwrap_or_default(),
    }
}

fn content_container<'t, E: Element<'t>>(root: E) -> Option<E> {
    CONTENT_CONTAINERS
        .iter()
        .find_map(|tag| find_first(root, tag))
}

fn main_content_of<'t, E: Element<'t>>(container: E) -> String {
    let mut content = String::new();

    for paragraph in find_all(container, "p") {
        let text = collect_text(paragraph);

        if text.chars().count() < MIN_PARAGRAPH_CHARS {
            continue;
        }
        if NAVIGATION_MARKERS.iter().any(|marker| text.contains(marker)) {
            continue;
        }

        content.push_str(&text);
        content.push(' ');

        if content.chars().count() > PARAGRAPH_TARGET_CHARS {
            break;
        }
    }

    if content.chars().count() < MIN_CONTENT_CHARS {
        content = collect_text(container);
    }

    truncate_chars(&collapse_whitespace(&content), MAX_CONTENT_CHARS)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

fn content_images<'t, E: Element<'t>>(container: E, page_url: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    find_all(container, "img")
        .into_iter()
        .filter_map(|img| img.attr("src"))
        .filter_map(|src| resolve_asset(src, page_url))
        .filter(|src| is_valid_image_url(src))
        .filter(|src| seen.insert(src.clone()))
        .collect()
}

fn outgoing_links<'t, E: Element<'t>>(root: E, page_url: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    find_all(root, "a")
        .into_iter()
        .filter_map(|anchor| anchor.attr("href"))
        .filter_map(|href| resolve_link(href, page_url))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://example.com/wiki/Tides";

    fn paragraph(len: usize, fill: char) -> String {
        std::iter::repeat(fill).take(len).collect()
    }

    #[test]
    fn test_meta_description_seeds_content() {
        let html = r#"<html><head><title> Tides </title>
            <meta name="description" content="X"></head>
            <body><p>This paragraph is long enough to be picked up by the scan of paragraphs.</p></body></html>"#;
        let record = extract_page(html, PAGE);
        assert_eq!(record.title, "Tides");
        assert_eq!(record.description, "X");
        assert_eq!(record.main_content, "X");
    }

    #[test]
    fn test_og_description_and_empty_meta() {
        let html = r#"<html><head><title>T</title>
            <meta name="description" content="">
            <meta property="og:description" content="From open graph"></head><body></body></html>"#;
        let record = extract_page(html, PAGE);
        assert_eq!(record.description, "From open graph");
        assert_eq!(record.main_content, "From open graph");
    }

    #[test]
    fn test_paragraph_thresholds() {
        let short = paragraph(10, 'a');
        let medium = paragraph(80, 'b');
        let long = paragraph(600, 'c');
        let html = format!(
            "<html><head><title>T</title></head><body><p>{}</p><p>{}</p><p>{}</p></body></html>",
            short, medium, long
        );
        let record = extract_page(&html, PAGE);

        assert!(record.main_content.starts_with(&medium));
        assert!(record.main_content.contains(&long));
        assert!(!record.main_content.contains(&short));
        assert_eq!(record.main_content, format!("{} {}", medium, long));
    }

    #[test]
    fn test_navigation_paragraphs_skipped() {
        let nav = format!("Toggle the table of contents {}", paragraph(40, 'n'));
        let prose = paragraph(120, 'p');
        let html = format!("<html><body><p>{}</p><p>{}</p></body></html>", nav, prose);
        let record = extract_page(&html, PAGE);
        assert_eq!(record.main_content, prose);
    }

    #[test]
    fn test_short_content_falls_back_to_container_text() {
        let html = "<html><body><article><h1>Heading</h1><p>tiny</p><div>Some   \n more text</div>\
                    <script>var hidden = 1;</script></article></body></html>";
        let record = extract_page(html, PAGE);
        assert_eq!(record.main_content, "Heading tiny Some more text");
    }

    #[test]
    fn test_container_precedence() {
        let html = "<html><body><p>body text</p><main><p>main text</p></main></body></html>";
        let record = extract_page(html, PAGE);
        assert_eq!(record.main_content, "main text");
    }

    #[test]
    fn test_content_truncated() {
        let paragraphs: String = (0..30)
            .map(|_| format!("<p>{}</p>", paragraph(99, 'w')))
            .collect();
        let html = format!("<html><body><div>{}</div></body></html>", paragraphs);
        let record = extract_page(&html, PAGE);
        // paragraph gathering stops after crossing 500 characters
        assert!(record.main_content.chars().count() < 700);

        let huge = format!(
            "<html><body><article><span>{}</span></article></body></html>",
            paragraph(2500, 'z')
        );
        let record = extract_page(&huge, PAGE);
        assert_eq!(record.main_content.chars().count(), 2003);
        assert!(record.main_content.ends_with("..."));
    }

    #[test]
    fn test_favicon_resolution() {
        let html = r#"<html><head><link rel="stylesheet" href="/s.css">
            <link rel="shortcut icon" href="/static/icon.png"></head></html>"#;
        let record = extract_page(html, PAGE);
        assert_eq!(record.favicon, "https://example.com/static/icon.png");

        let html = r#"<html><head><link rel="icon" href="//cdn.example.com/i.svg"></head></html>"#;
        let record = extract_page(html, "http://example.com/");
        assert_eq!(record.favicon, "http://cdn.example.com/i.svg");

        let record = extract_page("<html><head></head></html>", PAGE);
        assert_eq!(record.favicon, "https://example.com/favicon.ico");
    }

    #[test]
    fn test_keyword_tags() {
        let html = r#"<html><head><meta name="keywords" content=" ocean, tides ,, moon ,"></head></html>"#;
        let record = extract_page(html, PAGE);
        assert_eq!(record.tags, vec!["ocean", "tides", "moon"]);
    }

    #[test]
    fn test_outgoing_links() {
        let html = r##"<html><body>
            <a href="/wiki/Moon">Moon</a>
            <a href="#history">skip</a>
            <a href="mailto:x@example.com">skip</a>
            <a href="javascript:void(0)">skip</a>
            <a href="tel:123">skip</a>
            <a href="relative/page">skip</a>
            <a href="//other.org/x">proto</a>
            <a href="https://example.com/wiki/Moon">dup-ish</a>
            <a href="/wiki/Moon">dup</a>
            <a>no href</a>
        </body></html>"##;
        let record = extract_page(html, PAGE);
        assert_eq!(
            record.outgoing_links,
            vec!["https://example.com/wiki/Moon", "https://other.org/x"]
        );
    }

    #[test]
    fn test_images_from_container_only() {
        let html = r#"<html><body>
            <img src="/outside.jpg">
            <article>
                <img src="/a.jpg">
                <img src="//cdn.example.com/b.PNG?w=200">
                <img src="/icons/favicon.png">
                <img src="/anim.gif">
                <img src="/a.jpg">
                <img src="/doc.pdf">
                <img src="data:image/png;base64,AAAA">
            </article></body></html>"#;
        let record = extract_page(html, PAGE);
        assert_eq!(
            record.images,
            vec![
                "https://example.com/a.jpg",
                "https://cdn.example.com/b.PNG?w=200",
            ]
        );
    }

    #[test]
    fn test_record_url_normalized_and_markup_kept() {
        let html = "<html><head><title>T</title></head></html>";
        let record = extract_page(html, "https://Example.com/Wiki/Page/#top");
        assert_eq!(record.url, "https://example.com/wiki/page");
        assert_eq!(record.raw_markup, html);
    }

    #[test]
    fn test_is_valid_image_url() {
        assert!(is_valid_image_url("https://x.com/a.JPG"));
        assert!(is_valid_image_url("https://x.com/a.webp?size=large"));
        assert!(is_valid_image_url("https://x.com/logo.svg"));
        assert!(!is_valid_image_url("https://x.com/a.gif"));
        assert!(!is_valid_image_url("https://x.com/favicon.png"));
        assert!(!is_valid_image_url("https://x.com/a.ico"));
        assert!(!is_valid_image_url("https://x.com/image?format=.png"));
        assert!(!is_valid_image_url("https://x.com/a.bmp"));
    }
}
