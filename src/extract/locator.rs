//! Card boundary detection.
//!
//! Each load card renders exactly one "Call…" contact link, and that link is
//! the only anchor that survives the page's generated class names. Starting
//! from the nearest structural container of each contact link, the locator
//! climbs while the ancestor still reads like a single card: both landmark
//! phrases present and no second contact link swallowed.

use crate::dom::{DomTree, NodeId, NodeKey, ProcessedSet};
use crate::extract::fields::{identifier, is_contact_anchor};
use std::collections::{HashMap, HashSet};

/// Phrases every card's text contains (compared lower-cased)
pub const LANDMARKS: [&str; 2] = ["dispatch info", "load info"];

/// Tags that can delimit a card
const STRUCTURAL_TAGS: [&str; 4] = ["div", "article", "section", "li"];

/// A located load card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub node: NodeId,
    pub key: NodeKey,
    /// Contact-link text (or fallback link text), possibly empty
    pub identifier: String,
    /// Key used for within-scan deduplication: the identifier, or `card-N`
    /// when the identifier is empty
    pub dedup_key: String,
}

/// Find every card under `root`, in discovery order.
pub fn locate(tree: &DomTree, root: NodeId) -> Vec<Card> {
    CardLocator::new(tree, root).locate()
}

/// Like [`locate`], but skip cards already in the processed side table.
pub fn locate_new(tree: &DomTree, root: NodeId, processed: &ProcessedSet) -> Vec<Card> {
    locate(tree, root)
        .into_iter()
        .filter(|card| {
            let seen = processed.contains(card.key);
            if seen {
                log::trace!("Skipping processed card {:?} ({})", card.key, card.dedup_key);
            }
            !seen
        })
        .collect()
}

/// Whether a node's text carries both landmark phrases
pub fn has_landmarks(tree: &DomTree, id: NodeId) -> bool {
    let text = tree.clean_text(id).to_lowercase();
    LANDMARKS.iter().all(|landmark| text.contains(landmark))
}

/// One locate pass over a snapshot
pub struct CardLocator<'a> {
    tree: &'a DomTree,
    root: NodeId,
    /// Contact anchors under `root`, in document order
    anchors: Vec<NodeId>,
    landmark_cache: HashMap<NodeId, bool>,
}

impl<'a> CardLocator<'a> {
    pub fn new(tree: &'a DomTree, root: NodeId) -> Self {
        let anchors = std::iter::once(root)
            .chain(tree.descendants(root))
            .filter(|&id| is_contact_anchor(tree, id))
            .collect();

        Self {
            tree,
            root,
            anchors,
            landmark_cache: HashMap::new(),
        }
    }

    pub fn anchors(&self) -> &[NodeId] {
        &self.anchors
    }

    pub fn locate(mut self) -> Vec<Card> {
        if self.anchors.is_empty() {
            log::debug!("No contact anchors found");
            return Vec::new();
        }

        let mut seen_nodes = HashSet::new();
        let mut seen_keys = HashSet::new();
        let mut cards = Vec::new();

        for (position, anchor) in self.anchors.clone().into_iter().enumerate() {
            let Some(seed) = self.structural_parent(anchor) else {
                log::debug!("Contact anchor {:?} has no structural container", anchor);
                continue;
            };

            let container = self.ascend(seed);
            if !self.has_landmarks(container) {
                log::debug!("Container {:?} for anchor {:?} lacks landmarks", container, anchor);
                continue;
            }

            if !seen_nodes.insert(container) {
                continue;
            }

            let identifier = identifier(self.tree, container);
            let dedup_key = if identifier.is_empty() {
                format!("card-{position}")
            } else {
                identifier.clone()
            };

            if !seen_keys.insert(dedup_key.clone()) {
                log::debug!("Dropping duplicate card {:?} ({})", container, dedup_key);
                continue;
            }

            cards.push(Card {
                node: container,
                key: self.tree.key(container),
                identifier,
                dedup_key,
            });
        }

        log::debug!("Located {} card(s) from {} contact anchor(s)", cards.len(), self.anchors.len());
        cards
    }

    /// Climb from `seed` while the next structural ancestor is still a
    /// single card: both landmarks present and exactly one contact anchor.
    /// The first ancestor failing either check ends the climb.
    fn ascend(&mut self, seed: NodeId) -> NodeId {
        let mut current = seed;

        while let Some(candidate) = self.structural_parent(current) {
            if !self.has_landmarks(candidate) || self.anchors_within(candidate) != 1 {
                break;
            }

            current = candidate;
        }

        current
    }

    /// Nearest `div`/`article`/`section`/`li` above `id`, not above `root`
    fn structural_parent(&self, id: NodeId) -> Option<NodeId> {
        if id == self.root {
            return None;
        }

        for ancestor in self.tree.ancestors(id) {
            if STRUCTURAL_TAGS.iter().any(|tag| self.tree.is_tag(ancestor, tag)) {
                return Some(ancestor);
            }
            if ancestor == self.root {
                break;
            }
        }

        None
    }

    fn anchors_within(&self, container: NodeId) -> usize {
        self.anchors
            .iter()
            .filter(|&&anchor| self.tree.contains(container, anchor))
            .count()
    }

    fn has_landmarks(&mut self, id: NodeId) -> bool {
        if let Some(&cached) = self.landmark_cache.get(&id) {
            return cached;
        }
        let result = has_landmarks(self.tree, id);
        self.landmark_cache.insert(id, result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementNode;

    fn card(call: &str) -> ElementNode {
        ElementNode::new("div").with_attribute("class", "css-q1").with_children(vec![
            ElementNode::new("div").with_text("Dispatch Info"),
            ElementNode::new("div").with_children(vec![ElementNode::new("span").with_text("Load Info")]),
            ElementNode::new("p")
                .with_children(vec![ElementNode::new("span").with_children(vec![ElementNode::new("a").with_text(call)])]),
        ])
    }

    fn find_call(tree: &DomTree, text: &str) -> NodeId {
        tree.descendants(tree.root())
            .find(|&id| tree.is_tag(id, "a") && tree.clean_text(id) == text)
            .unwrap()
    }

    #[test]
    fn test_no_anchors_yields_nothing() {
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("div").with_text("Dispatch Info Load Info"),
        ]));

        assert!(locate(&tree, tree.root()).is_empty());
    }

    #[test]
    fn test_single_card_located() {
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![card("Call 1")]));
        let cards = locate(&tree, tree.root());

        assert_eq!(cards.len(), 1);
        assert_eq!(tree.attribute(cards[0].node, "class"), Some("css-q1"));
        assert_eq!(cards[0].identifier, "Call 1");
        assert_eq!(cards[0].dedup_key, "Call 1");
    }

    #[test]
    fn test_sibling_cards_are_not_merged() {
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("section").with_children(vec![card("Call A"), card("Call B")]),
        ]));
        let cards = locate(&tree, tree.root());

        assert_eq!(cards.len(), 2);
        assert_ne!(cards[0].node, cards[1].node);
        assert!(cards.iter().all(|c| tree.is_tag(c.node, "div")));
        assert_eq!(cards[0].identifier, "Call A");
        assert_eq!(cards[1].identifier, "Call B");
    }

    #[test]
    fn test_stops_before_ancestor_with_second_anchor() {
        // Parent carries both landmarks but also a second contact link
        let seed = ElementNode::new("div")
            .with_attribute("id", "seed")
            .with_children(vec![
                ElementNode::new("p").with_text("Dispatch Info / Load Info"),
                ElementNode::new("a").with_text("Call One"),
            ]);
        let parent = ElementNode::new("div").with_attribute("id", "parent").with_children(vec![
            seed,
            ElementNode::new("a").with_text("Call Two"),
        ]);
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![parent]));

        let cards = locate(&tree, tree.root());
        assert_eq!(cards.len(), 1);
        assert_eq!(tree.attribute(cards[0].node, "id"), Some("seed"));
    }

    #[test]
    fn test_climbs_through_wrapper_of_same_card() {
        // The wrapper holds the same single card, so the climb continues
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("li").with_attribute("id", "outer").with_children(vec![card("Call X")]),
        ]));
        let cards = locate(&tree, tree.root());

        assert_eq!(cards.len(), 1);
        assert_eq!(tree.attribute(cards[0].node, "id"), Some("outer"));
    }

    #[test]
    fn test_anchor_outside_landmarks_is_discarded() {
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("div").with_children(vec![ElementNode::new("a").with_text("Call support")]),
        ]));

        assert!(locate(&tree, tree.root()).is_empty());
    }

    #[test]
    fn test_seed_without_landmarks_is_not_widened() {
        // The only contact link sits in a nav block; the listing beside it has none
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("div").with_attribute("id", "app").with_children(vec![
                ElementNode::new("div").with_attribute("class", "nav").with_children(vec![
                    ElementNode::new("div").with_children(vec![ElementNode::new("a").with_text("Call us")]),
                ]),
                ElementNode::new("div").with_attribute("class", "listing").with_children(vec![
                    ElementNode::new("p").with_text("Dispatch Info"),
                    ElementNode::new("div").with_attribute("class", "loadInfo").with_text("Load Info $900"),
                ]),
            ]),
        ]));

        assert!(locate(&tree, tree.root()).is_empty());
    }

    #[test]
    fn test_seed_missing_a_landmark_is_discarded() {
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("div").with_attribute("id", "outer").with_children(vec![
                ElementNode::new("div").with_attribute("id", "inner").with_children(vec![
                    ElementNode::new("p").with_text("Dispatch Info"),
                    ElementNode::new("a").with_text("Call Inner"),
                ]),
                ElementNode::new("p").with_text("Load Info"),
            ]),
        ]));

        assert!(locate(&tree, tree.root()).is_empty());
    }

    #[test]
    fn test_same_identifier_keeps_first() {
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("section").with_children(vec![card("Call Same"), card("Call Same")]),
        ]));
        let cards = locate(&tree, tree.root());

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].node, tree.children(NodeId(1))[0]);
    }

    #[test]
    fn test_two_anchors_in_one_container_yield_one_card() {
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("div").with_children(vec![
                ElementNode::new("span").with_text("Dispatch Info Load Info"),
                ElementNode::new("a").with_text("Call Office"),
                ElementNode::new("a").with_text("Call Driver"),
            ]),
        ]));
        let cards = locate(&tree, tree.root());

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].identifier, "Call Office");
    }

    #[test]
    fn test_locate_respects_root() {
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("main").with_children(vec![card("Call In")]),
            card("Call Out"),
        ]));
        let main = tree.children(tree.root())[0];

        let cards = locate(&tree, main);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].identifier, "Call In");
    }

    #[test]
    fn test_locate_new_skips_processed() {
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("section").with_children(vec![card("Call A"), card("Call B")]),
        ]));

        let mut processed = ProcessedSet::new();
        let first = locate_new(&tree, tree.root(), &processed);
        assert_eq!(first.len(), 2);

        processed.mark(first[0].key);
        let second = locate_new(&tree, tree.root(), &processed);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].identifier, "Call B");

        processed.mark(second[0].key);
        assert!(locate_new(&tree, tree.root(), &processed).is_empty());
    }

    #[test]
    fn test_landmarks_are_case_insensitive() {
        let tree = DomTree::new(ElementNode::new("div").with_text("DISPATCH INFO and load info"));
        assert!(has_landmarks(&tree, tree.root()));

        let tree = DomTree::new(ElementNode::new("div").with_text("Dispatch Info only"));
        assert!(!has_landmarks(&tree, tree.root()));
    }

    #[test]
    fn test_anchors_collected_in_document_order() {
        let tree = DomTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("section").with_children(vec![card("Call A"), card("Call B")]),
            ElementNode::new("a").with_text("Home"),
        ]));
        let locator = CardLocator::new(&tree, tree.root());

        assert_eq!(locator.anchors().len(), 2);
        assert_eq!(locator.anchors()[0], find_call(&tree, "Call A"));
        assert_eq!(locator.anchors()[1], find_call(&tree, "Call B"));
    }
}
