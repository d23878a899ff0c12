//! Document tree contract used by content extraction
//!
//! Extraction only needs tag names, attribute lookup and ordered children, so
//! it is written against the [`Element`] trait rather than a concrete parser.
//! The trait is implemented for `scraper::ElementRef`; [`parse_document`] is
//! the one place markup becomes a tree.

use scraper::{ElementRef, Html, Node};

/// Tags whose subtrees never contribute visible text
const NON_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "iframe"];

/// A child of an element: either another element or a text run
#[derive(Debug, Clone, Copy)]
pub enum Child<'t, E> {
    Element(E),
    Text(&'t str),
}

/// Read-only view of an element node borrowed from a document tree
pub trait Element<'t>: Copy {
    /// Lower-case tag name
    fn tag_name(&self) -> &'t str;

    /// Attribute value, if present
    fn attr(&self, name: &str) -> Option<&'t str>;

    /// Element and text children in document order
    ///
    /// Comments and processing instructions are omitted.
    fn children(&self) -> Vec<Child<'t, Self>>;
}

impl<'a> Element<'a> for ElementRef<'a> {
    fn tag_name(&self) -> &'a str {
        self.value().name()
    }

    fn attr(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }

    fn children(&self) -> Vec<Child<'a, Self>> {
        let mut out = Vec::new();
        for child in (**self).children() {
            match child.value() {
                Node::Text(text) => out.push(Child::Text(&**text)),
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        out.push(Child::Element(element));
                    }
                }
                _ => {}
            }
        }
        out
    }
}

/// Parses raw markup into a document tree
///
/// Malformed markup never fails; the parser recovers the way browsers do.
pub fn parse_document(markup: &str) -> Html {
    Html::parse_document(markup)
}

/// Returns every element named `tag` in the subtree rooted at `root`
///
/// Results are in document (pre-order) order and include `root` itself when
/// it matches.
pub fn find_all<'t, E: Element<'t>>(root: E, tag: &str) -> Vec<E> {
    let mut found = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.tag_name().eq_ignore_ascii_case(tag) {
            found.push(node);
        }

        let children: Vec<E> = node
            .children()
            .into_iter()
            .filter_map(|child| match child {
                Child::Element(element) => Some(element),
                Child::Text(_) => None,
            })
            .collect();

        stack.extend(children.into_iter().rev());
    }

    found
}

/// Returns the first element named `tag` in document order
pub fn find_first<'t, E: Element<'t>>(root: E, tag: &str) -> Option<E> {
    find_all(root, tag).into_iter().next()
}

/// Concatenates every descendant text node, each followed by a single space
///
/// `script`, `style`, `noscript` and `iframe` subtrees are skipped.
pub fn collect_text<'t, E: Element<'t>>(root: E) -> String {
    let mut text = String::new();
    append_text(root, &mut text);
    text
}

fn append_text<'t, E: Element<'t>>(node: E, out: &mut String) {
    if NON_TEXT_TAGS
        .iter()
        .any(|tag| node.tag_name().eq_ignore_ascii_case(tag))
    {
        return;
    }

    for child in node.children() {
        match child {
            Child::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Child::Element(element) => append_text(element, out),
        }
    }
}
