//! Minimal structured-document capability used by the listing extractor.
//!
//! Extraction only needs to find a container, walk children or descendants
//! matching a tag+class signature, read attributes and flatten text. Keeping
//! that behind [`StructuredDocument`] / [`DocumentNode`] lets the extractor run
//! against `scraper` documents in production and hand-built trees in tests.

use common::ElementSignature;
use scraper::{ElementRef, Html};

pub trait DocumentNode<'a>: Sized {
    fn tag_name(&self) -> &str;
    fn has_css_class(&self, class: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<&'a str>;
    /// Direct element children, in document order.
    fn child_elements(&self) -> Vec<Self>;
    /// All element descendants (excluding self), in document order.
    fn descendant_elements(&self) -> Vec<Self>;
    /// Text nodes trimmed, empty ones dropped, joined with `separator`.
    fn flat_text(&self, separator: &str) -> String;

    fn matches_signature(&self, sig: &ElementSignature) -> bool {
        self.tag_name().eq_ignore_ascii_case(&sig.tag)
            && sig.class.as_deref().map_or(true, |class| self.has_css_class(class))
    }

    fn children_matching(&self, sig: &ElementSignature) -> Vec<Self> {
        self.child_elements()
            .into_iter()
            .filter(|n| n.matches_signature(sig))
            .collect()
    }

    fn descendants_matching(&self, sig: &ElementSignature) -> Vec<Self> {
        self.descendant_elements()
            .into_iter()
            .filter(|n| n.matches_signature(sig))
            .collect()
    }

    fn find_first(&self, sig: &ElementSignature) -> Option<Self> {
        self.descendant_elements()
            .into_iter()
            .find(|n| n.matches_signature(sig))
    }
}

pub trait StructuredDocument {
    type Node<'a>: DocumentNode<'a>
    where
        Self: 'a;

    fn root(&self) -> Self::Node<'_>;

    /// First element anywhere in the document matching `sig`.
    fn find_container(&self, sig: &ElementSignature) -> Option<Self::Node<'_>> {
        let root = self.root();
        if root.matches_signature(sig) {
            return Some(root);
        }
        root.find_first(sig)
    }
}

/// Parsed HTML page.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }
}

impl StructuredDocument for HtmlDocument {
    type Node<'a> = ElementRef<'a>;

    fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }
}

impl<'a> DocumentNode<'a> for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn has_css_class(&self, class: &str) -> bool {
        self.value().classes().any(|c| c == class)
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        // `value()` borrows from the tree, not from `self`
        let element: &'a scraper::node::Element = self.value();
        element.attr(name)
    }

    fn child_elements(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn descendant_elements(&self) -> Vec<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .collect()
    }

    fn flat_text(&self, separator: &str) -> String {
        flatten_text(self.text(), separator)
    }
}

pub(crate) fn flatten_text<'s, I>(parts: I, separator: &str) -> String
where
    I: IntoIterator<Item = &'s str>,
{
    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Hand-built element tree, for exercising extraction without HTML.
#[derive(Debug, Clone, Default)]
pub struct MemoryElement {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<MemoryElement>,
}

impl MemoryElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_child(mut self, child: MemoryElement) -> Self {
        self.children.push(child);
        self
    }

    fn collect_text<'s>(&'s self, out: &mut Vec<&'s str>) {
        if let Some(text) = &self.text {
            out.push(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    fn collect_descendants<'s>(&'s self, out: &mut Vec<&'s MemoryElement>) {
        for child in &self.children {
            out.push(child);
            child.collect_descendants(out);
        }
    }
}

impl<'a> DocumentNode<'a> for &'a MemoryElement {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn has_css_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        let node: &'a MemoryElement = *self;
        node.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn child_elements(&self) -> Vec<Self> {
        let node: &'a MemoryElement = *self;
        node.children.iter().collect()
    }

    fn descendant_elements(&self) -> Vec<Self> {
        let node: &'a MemoryElement = *self;
        let mut out = Vec::new();
        node.collect_descendants(&mut out);
        out
    }

    fn flat_text(&self, separator: &str) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        flatten_text(parts, separator)
    }
}

/// In-memory document rooted at a single element.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    pub root: MemoryElement,
}

impl StructuredDocument for MemoryDocument {
    type Node<'a> = &'a MemoryElement;

    fn root(&self) -> &MemoryElement {
        &self.root
    }
}
