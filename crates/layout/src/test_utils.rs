use crate::tree::{NodeKind, NodeTree};
use weft_types::{NodeId, Rect};

/// Builds small arenas by hand for classifier tests. Every element is
/// attached to its parent's layout run.
pub struct TreeBuilder {
    pub tree: NodeTree,
    pub root: NodeId,
}

impl TreeBuilder {
    pub fn new(bounds: Rect) -> Self {
        let mut tree = NodeTree::new();
        let root = tree.alloc(NodeKind::Root, "body");
        let node = tree.node_mut(root).unwrap();
        node.bounds = bounds;
        node.style.set("display", "block");
        Self { tree, root }
    }

    pub fn child(&mut self, parent: NodeId, tag: &str, bounds: Rect, style: &[(&str, &str)]) -> NodeId {
        let id = self.tree.alloc(NodeKind::Element, tag);
        self.tree.attach(parent, id, Some(parent)).unwrap();
        let node = self.tree.node_mut(id).unwrap();
        node.bounds = bounds;
        for (k, v) in style {
            node.style.set(*k, *v);
        }
        id
    }

    pub fn block(&mut self, parent: NodeId, bounds: Rect) -> NodeId {
        self.child(parent, "div", bounds, &[("display", "block")])
    }

    pub fn text(&mut self, parent: NodeId, text: &str, bounds: Rect) -> NodeId {
        let id = self.tree.alloc(NodeKind::Text, "#text");
        self.tree.attach(parent, id, Some(parent)).unwrap();
        let node = self.tree.node_mut(id).unwrap();
        node.bounds = bounds;
        node.text = Some(text.to_string());
        id
    }
}

pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect::new(x, y, w, h)
}
