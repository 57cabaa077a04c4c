//! Scene document data model.
//!
//! A `Document` is a page plus an ordered list of nodes. It is the unit of
//! commit and of undo/redo: every mutation produces a brand-new document
//! value. The node list is reference counted at two levels
//! (`Arc<Vec<Arc<Node>>>`) so cloning a document is O(1) and an edit only
//! copies the node it touches. Edits go through `Arc::make_mut`, so a
//! document that has been committed (and therefore shared) is never changed
//! in place.

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0], `[r, g, b, a]` on the wire.
///
/// Channels are not clamped here. Producers are expected to supply
/// in-range values (see `lint_document`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Scale the RGB channels by `k`, clamping each to 1.0. Alpha is kept.
    /// Used to brighten selected nodes instead of drawing a separate outline.
    #[must_use]
    pub fn highlighted(self, k: f32) -> Self {
        Self {
            r: (self.r * k).min(1.0),
            g: (self.g * k).min(1.0),
            b: (self.b * k).min(1.0),
            a: self.a,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[f32; 4]> for Color {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

// ─── Page ────────────────────────────────────────────────────────────────

/// Authoring-time page. `width`/`height` are logical document units, not
/// the size of the render surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub width: f32,
    pub height: f32,
    pub background: Color,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: Color::rgba(0.1, 0.1, 0.12, 1.0),
        }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Kind tag plus kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// Solid rectangle. The only kind the GPU renderer rasterizes.
    #[serde(rename = "rect")]
    Rect { fill: Color },

    /// Image by source reference (URL or host asset key).
    #[serde(rename = "image")]
    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opacity: Option<f32>,
    },

    /// Text label. Layout and shaping are up to the host.
    #[serde(rename = "text")]
    Text {
        text: String,
        color: Color,
        #[serde(rename = "fontSize")]
        font_size: f32,
    },
}

impl NodeKind {
    /// Wire name of the kind tag.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Rect { .. } => "rect",
            NodeKind::Image { .. } => "image",
            NodeKind::Text { .. } => "text",
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A positioned, sized scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,

    #[serde(flatten)]
    pub kind: NodeKind,

    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,

    /// Rotation in degrees. Carried as data only; hit testing ignores it.
    #[serde(rename = "r", default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,

    /// Paint/hit order. Missing means 0; ties fall back to list order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,

    /// Locked nodes cannot be picked up by a drag.
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,

    /// Hidden nodes are neither hit-tested nor rendered.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            w,
            h,
            rotation: None,
            z: None,
            locked: false,
            hidden: false,
        }
    }

    /// Shorthand for a filled rectangle.
    pub fn rect(id: impl Into<NodeId>, x: f32, y: f32, w: f32, h: f32, fill: Color) -> Self {
        Self::new(id.into(), NodeKind::Rect { fill }, x, y, w, h)
    }

    #[must_use]
    pub fn with_z(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    #[must_use]
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Effective z-order (missing = 0).
    pub fn z_order(&self) -> f32 {
        self.z.unwrap_or(0.0)
    }

    /// Axis-aligned world-space bounds (rotation ignored).
    pub fn bounds(&self) -> Bounds {
        Bounds {
            x: self.x,
            y: self.y,
            width: self.w,
            height: self.h,
        }
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// A page plus its ordered node list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub page: Page,
    nodes: Arc<Vec<Arc<Node>>>,
}

impl Document {
    /// An empty document on the given page.
    pub fn new(page: Page) -> Self {
        Self {
            page,
            nodes: Arc::default(),
        }
    }

    /// Build a document from a page and a node list.
    pub fn with_nodes(page: Page, nodes: impl IntoIterator<Item = Node>) -> Self {
        Self {
            page,
            nodes: Arc::new(nodes.into_iter().map(Arc::new).collect()),
        }
    }

    /// Nodes in list (insertion) order.
    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by id. Unknown ids are simply `None`.
    pub fn get(&self, id: NodeId) -> Option<&Arc<Node>> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Copy-on-write access to one node. Clones the node list spine and the
    /// node itself only if they are shared with another document.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        let nodes = Arc::make_mut(&mut self.nodes);
        Some(Arc::make_mut(&mut nodes[pos]))
    }

    /// Put a snapshotted node back in place of the node with the same id.
    /// Returns `false` if the id is not in the document.
    pub fn restore(&mut self, node: Arc<Node>) -> bool {
        let Some(pos) = self.nodes.iter().position(|n| n.id == node.id) else {
            return false;
        };
        Arc::make_mut(&mut self.nodes)[pos] = node;
        true
    }

    /// Append a node at the end of the list (top of the default paint order).
    pub fn push(&mut self, node: Node) {
        Arc::make_mut(&mut self.nodes).push(Arc::new(node));
    }

    /// Drop every node matching `remove`. Returns how many were removed.
    pub fn remove_where(&mut self, mut remove: impl FnMut(&Node) -> bool) -> usize {
        if !self.nodes.iter().any(|n| remove(n)) {
            return 0;
        }
        let nodes = Arc::make_mut(&mut self.nodes);
        let before = nodes.len();
        nodes.retain(|n| !remove(n));
        before - nodes.len()
    }

    /// Apply `f` to every node, copying only the nodes `f` reports as changed.
    pub fn update_each(&mut self, mut f: impl FnMut(&Node) -> Option<Node>) {
        let mut changed: Vec<(usize, Node)> = Vec::new();
        for (i, n) in self.nodes.iter().enumerate() {
            if let Some(next) = f(n) {
                changed.push((i, next));
            }
        }
        if changed.is_empty() {
            return;
        }
        let nodes = Arc::make_mut(&mut self.nodes);
        for (i, next) in changed {
            nodes[i] = Arc::new(next);
        }
    }

    /// Whether two documents share the same node list allocation.
    pub fn shares_nodes_with(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes)
    }
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Axis-aligned bounding box in world units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Inclusive point-in-box test.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}
