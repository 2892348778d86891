use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tag name used for text runs in a snapshot.
pub const TEXT_TAG: &str = "#text";

/// One node of a DOM snapshot, as produced by the in-page snapshot script
/// or by parsing a saved HTML document.
///
/// Text is carried by `#text` children so that the order of text and
/// elements is preserved the way `textContent` sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name (e.g., "div", "a"), lower-case, or `#text`
    pub tag_name: String,

    /// Element attributes (e.g., class, href, role)
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Raw text of a `#text` node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,

    /// Child nodes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,

    /// Identity assigned by the live page; stable across snapshots while the
    /// element stays attached
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<u64>,
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: HashMap::new(),
            text_content: None,
            children: Vec::new(),
            key: None,
        }
    }

    /// Create a text run
    pub fn text(text: impl Into<String>) -> Self {
        let mut node = Self::new(TEXT_TAG);
        node.text_content = Some(text.into());
        node
    }

    /// Builder method: set attributes
    pub fn with_attributes(mut self, attributes: HashMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builder method: set a single attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: append a text run as the last child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Self::text(text));
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: set the page-assigned key
    pub fn with_key(mut self, key: u64) -> Self {
        self.key = Some(key);
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child node
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Check if node is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    pub fn is_text(&self) -> bool {
        self.tag_name == TEXT_TAG
    }

    /// Drop subtrees whose text never renders (scripts, styles)
    pub fn simplify(&mut self) {
        self.children.retain(|child| {
            !matches!(child.tag_name.as_str(), "script" | "style" | "noscript" | "template")
        });

        for child in &mut self.children {
            child.simplify();
        }
    }
}
