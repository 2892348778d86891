use crate::dom::element::{ElementNode, TEXT_TAG};
use crate::dom::text::{clean_text, contains_ignore_case};
use crate::error::{ImportError, Result};
use headless_chrome::Tab;
use scraper::{ElementRef, Html, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Keys synthesised for nodes the page did not key carry this bit, so they
/// never collide with page-assigned counters.
const SYNTHETIC_KEY_BIT: u64 = 1 << 63;

/// Position of a node inside one snapshot's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Identity of a DOM node across snapshots of the same live page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey(pub u64);

#[derive(Debug, Clone)]
struct DomNode {
    tag_name: String,
    attributes: HashMap<String, String>,
    text: Option<String>,
    key: NodeKey,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed snapshot of a page's DOM.
///
/// Nodes are stored in document (pre-)order, so comparing two `NodeId`s
/// compares their document position.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
    keys: HashSet<NodeKey>,
}

impl DomTree {
    /// Flatten an element tree into an arena
    pub fn new(root: ElementNode) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            keys: HashSet::new(),
        };
        tree.push_node(root, None);
        tree
    }

    fn push_node(&mut self, element: ElementNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let key = NodeKey(element.key.unwrap_or(SYNTHETIC_KEY_BIT | id.0 as u64));

        let ElementNode {
            tag_name,
            attributes,
            text_content,
            children,
            ..
        } = element;

        self.nodes.push(DomNode {
            tag_name: tag_name.to_ascii_lowercase(),
            attributes,
            text: text_content,
            key,
            parent,
            children: Vec::with_capacity(children.len()),
        });
        self.keys.insert(key);

        for child in children {
            let child_id = self.push_node(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }

        id
    }

    /// Parse the JSON produced by the in-page snapshot script
    pub fn from_snapshot_json(json: &str) -> Result<Self> {
        let mut root: ElementNode = serde_json::from_str(json)
            .map_err(|e| ImportError::DomParseFailed(format!("Failed to parse DOM JSON: {}", e)))?;
        root.simplify();
        Ok(Self::new(root))
    }

    /// Parse a saved HTML document
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut root = convert_element(document.root_element());
        root.simplify();
        Self::new(root)
    }

    /// Snapshot the live DOM of a browser tab
    pub fn from_tab(tab: &Arc<Tab>) -> Result<Self> {
        let js_code = include_str!("snapshot_dom.js");

        let result = tab
            .evaluate(js_code, false)
            .map_err(|e| ImportError::EvaluationFailed(format!("Failed to execute DOM snapshot script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| ImportError::DomParseFailed("No value returned from DOM snapshot".to_string()))?;

        // The script returns a JSON string rather than an object
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| ImportError::DomParseFailed(format!("Failed to get JSON string: {}", e)))?;

        Self::from_snapshot_json(&json_str)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Total number of nodes, text runs included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn tag_name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].tag_name
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.nodes[id.0].tag_name != TEXT_TAG
    }

    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.nodes[id.0].tag_name.eq_ignore_ascii_case(tag)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0].attributes.get(name).map(String::as_str)
    }

    /// Loose `[class*=needle]` match, ignoring ASCII case
    pub fn class_contains(&self, id: NodeId, needle: &str) -> bool {
        self.attribute(id, "class")
            .is_some_and(|class| contains_ignore_case(class, needle))
    }

    pub fn key(&self, id: NodeId) -> NodeKey {
        self.nodes[id.0].key
    }

    /// Whether a node with this key is part of the snapshot
    pub fn contains_key(&self, key: NodeKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Descendants in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Whether `node` is `ancestor` or lies below it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Concatenated text runs below `id`, like `textContent`
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = &self.nodes[id.0].text {
            return text.clone();
        }

        self.descendants(id)
            .filter_map(|d| self.nodes[d.0].text.as_deref())
            .collect()
    }

    /// Whitespace-collapsed text content
    pub fn clean_text(&self, id: NodeId) -> String {
        clean_text(&self.text_content(id))
    }

    /// Count element nodes (text runs excluded)
    pub fn count_elements(&self) -> usize {
        self.nodes.iter().filter(|n| n.tag_name != TEXT_TAG).count()
    }
}

/// Pre-order walk below a node
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

fn convert_element(element: ElementRef<'_>) -> ElementNode {
    let mut node = ElementNode::new(element.value().name());
    for (name, value) in element.value().attrs() {
        node.add_attribute(name, value);
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => node.add_child(ElementNode::text(&text[..])),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(convert_element(child_element));
                }
            }
            _ => {}
        }
    }

    node
}
