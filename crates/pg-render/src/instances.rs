//! Packing rectangle nodes into per-instance GPU data.
//!
//! Each visible rect node becomes one `RectInstance`: its screen-space
//! rectangle in CSS pixels and its fill color. Selected nodes get their
//! color brightened instead of a separate highlight pass.

use crate::hit::paint_order;
use bytemuck::{Pod, Zeroable};
use pg_core::math::{Viewport, world_to_screen};
use pg_core::model::{Document, NodeKind};
use pg_core::NodeId;

/// One instanced quad. Matches vertex locations 1 and 2 in `rect.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RectInstance {
    /// x, y, w, h in screen pixels.
    pub rect: [f32; 4],
    /// Linear RGBA.
    pub color: [f32; 4],
}

/// Fill `out` with one instance per visible rect node, in paint order.
///
/// Image and text nodes are part of the document but are not rasterized
/// here.
pub fn pack_instances(
    doc: &Document,
    vp: &Viewport,
    selection: &[NodeId],
    highlight: f32,
    out: &mut Vec<RectInstance>,
) {
    out.clear();
    for node in paint_order(doc) {
        let NodeKind::Rect { fill } = node.kind else {
            continue;
        };
        let p = world_to_screen(node.x, node.y, vp);
        let color = if selection.contains(&node.id) {
            fill.highlighted(highlight)
        } else {
            fill
        };
        out.push(RectInstance {
            rect: [p.x, p.y, node.w * vp.zoom, node.h * vp.zoom],
            color: color.to_array(),
        });
    }
}

/// Instance capacity after growth: unchanged if `needed` fits, otherwise
/// about 1.5× the current capacity plus 64 slots of headroom.
pub fn grown_capacity(current: usize, needed: usize) -> usize {
    if needed <= current {
        return current;
    }
    needed.max(current + current / 2 + 64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pg_core::{Color, Node, Page};
    use pretty_assertions::assert_eq;

    fn doc() -> Document {
        Document::with_nodes(
            Page::default(),
            [
                Node::rect("a", 10.0, 20.0, 30.0, 40.0, Color::rgba(0.5, 0.2, 1.0, 0.8)),
                Node::new(
                    NodeId::intern("label"),
                    NodeKind::Text {
                        text: "hi".into(),
                        color: Color::BLACK,
                        font_size: 12.0,
                    },
                    0.0,
                    0.0,
                    10.0,
                    10.0,
                ),
                Node::rect("gone", 0.0, 0.0, 5.0, 5.0, Color::BLACK).hidden(),
            ],
        )
    }

    #[test]
    fn packs_visible_rects_in_screen_space() {
        let mut out = Vec::new();
        pack_instances(&doc(), &Viewport::new(5.0, 10.0, 2.0), &[], 1.15, &mut out);
        assert_eq!(
            out,
            vec![RectInstance {
                rect: [10.0, 20.0, 60.0, 80.0],
                color: [0.5, 0.2, 1.0, 0.8],
            }]
        );
    }

    #[test]
    fn selected_rects_are_brightened() {
        let mut out = Vec::new();
        let selection = [NodeId::intern("a")];
        pack_instances(&doc(), &Viewport::IDENTITY, &selection, 1.5, &mut out);
        assert_eq!(out[0].color, [0.75, 0.3, 1.0, 0.8]);
    }

    #[test]
    fn reuses_output_buffer() {
        let mut out = vec![RectInstance::zeroed(); 10];
        pack_instances(&doc(), &Viewport::IDENTITY, &[], 1.15, &mut out);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn instance_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<RectInstance>(), 32);
    }

    #[test]
    fn capacity_grows_geometrically() {
        assert_eq!(grown_capacity(0, 0), 0);
        assert_eq!(grown_capacity(0, 1), 64);
        assert_eq!(grown_capacity(64, 64), 64);
        assert_eq!(grown_capacity(64, 65), 160);
        assert_eq!(grown_capacity(100, 1000), 1000);
        assert_eq!(grown_capacity(1000, 1001), 1564);
    }
}
