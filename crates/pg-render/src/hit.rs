//! Hit testing: world point → topmost node.
//!
//! Nodes are considered back-to-front in ascending z-order, ties broken by
//! list order. The last node whose box contains the point wins. Rotation
//! is ignored.

use pg_core::model::{Document, Node};
use std::sync::Arc;

/// Visible nodes in paint order (back to front).
pub fn paint_order(doc: &Document) -> Vec<&Arc<Node>> {
    let mut nodes: Vec<&Arc<Node>> = doc.nodes().iter().filter(|n| !n.hidden).collect();
    // Stable sort, so equal z keeps list order.
    nodes.sort_by(|a, b| a.z_order().total_cmp(&b.z_order()));
    nodes
}

/// Find the topmost visible node at world position (wx, wy).
/// Returns `None` if the point is over the background.
///
/// Locked nodes are still returned: they occlude whatever lies beneath
/// them, and it is up to the caller to refuse to drag them.
pub fn hit_test(doc: &Document, wx: f32, wy: f32) -> Option<&Arc<Node>> {
    paint_order(doc)
        .into_iter()
        .rev()
        .find(|n| n.bounds().contains(wx, wy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_core::{Color, NodeId, Page};
    use pretty_assertions::assert_eq;

    fn id_at(doc: &Document, x: f32, y: f32) -> Option<&str> {
        hit_test(doc, x, y).map(|n| n.id.as_str())
    }

    #[test]
    fn later_node_wins_on_equal_z() {
        let doc = Document::with_nodes(
            Page::default(),
            [
                Node::rect("under", 0.0, 0.0, 100.0, 100.0, Color::BLACK),
                Node::rect("over", 50.0, 50.0, 100.0, 100.0, Color::BLACK),
            ],
        );
        assert_eq!(id_at(&doc, 75.0, 75.0), Some("over"));
        assert_eq!(id_at(&doc, 10.0, 10.0), Some("under"));
        assert_eq!(id_at(&doc, 500.0, 500.0), None);
    }

    #[test]
    fn higher_z_wins_regardless_of_order() {
        let doc = Document::with_nodes(
            Page::default(),
            [
                Node::rect("top", 0.0, 0.0, 100.0, 100.0, Color::BLACK).with_z(5.0),
                Node::rect("bottom", 0.0, 0.0, 100.0, 100.0, Color::BLACK),
            ],
        );
        assert_eq!(id_at(&doc, 50.0, 50.0), Some("top"));
    }

    #[test]
    fn hidden_nodes_are_skipped() {
        let doc = Document::with_nodes(
            Page::default(),
            [
                Node::rect("base", 0.0, 0.0, 100.0, 100.0, Color::BLACK),
                Node::rect("ghost", 0.0, 0.0, 100.0, 100.0, Color::BLACK).hidden(),
            ],
        );
        assert_eq!(id_at(&doc, 50.0, 50.0), Some("base"));
    }

    #[test]
    fn locked_nodes_still_occlude() {
        let doc = Document::with_nodes(
            Page::default(),
            [
                Node::rect("base", 0.0, 0.0, 100.0, 100.0, Color::BLACK),
                Node::rect("lid", 0.0, 0.0, 100.0, 100.0, Color::BLACK).locked(),
            ],
        );
        let hit = hit_test(&doc, 50.0, 50.0).unwrap();
        assert_eq!(hit.id, NodeId::intern("lid"));
        assert!(hit.locked);
    }

    #[test]
    fn edges_are_inclusive() {
        let doc = Document::with_nodes(
            Page::default(),
            [Node::rect("a", 10.0, 10.0, 20.0, 20.0, Color::BLACK)],
        );
        assert_eq!(id_at(&doc, 10.0, 10.0), Some("a"));
        assert_eq!(id_at(&doc, 30.0, 30.0), Some("a"));
        assert_eq!(id_at(&doc, 30.01, 30.0), None);
    }

    #[test]
    fn paint_order_is_stable() {
        let doc = Document::with_nodes(
            Page::default(),
            [
                Node::rect("a", 0.0, 0.0, 1.0, 1.0, Color::BLACK).with_z(1.0),
                Node::rect("b", 0.0, 0.0, 1.0, 1.0, Color::BLACK),
                Node::rect("c", 0.0, 0.0, 1.0, 1.0, Color::BLACK),
                Node::rect("d", 0.0, 0.0, 1.0, 1.0, Color::BLACK).with_z(-1.0),
            ],
        );
        let ids: Vec<&str> = paint_order(&doc).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "b", "c", "a"]);
    }
}
