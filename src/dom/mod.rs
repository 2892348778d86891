//! DOM snapshot module
//!
//! This module provides a browser-independent view of a page's DOM:
//! - ElementNode: serde form of a snapshot, as produced in the page or from HTML
//! - DomTree: arena with parent links, document order and `textContent` semantics
//! - ProcessedSet: side table of nodes that already produced a record
//! - clean_text: the whitespace normalisation every parser relies on

pub mod element;
pub mod processed;
pub mod text;
pub mod tree;

pub use element::ElementNode;
pub use processed::ProcessedSet;
pub use text::clean_text;
pub use tree::{DomTree, NodeId, NodeKey};
