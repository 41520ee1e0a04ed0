//! The node arena.
//!
//! Nodes live in one flat vector and refer to each other by [`NodeId`]. Four
//! relations are kept side by side: `parent` (source structure),
//! `document_parent` (nearest ancestor taking part in layout), `render_parent`
//! (output structure, assigned once) and `companion` (lookup only).

use crate::decision::GridShape;
use crate::flags::{ContainerType, LayoutFlags};
use std::collections::{BTreeMap, HashSet, VecDeque};
use thiserror::Error;
use weft_style::ComputedStyle;
use weft_types::{Edges, ElementHandle, NodeId, Rect, ResourceName, Size};

/// Finalized platform attributes, qualified name to value.
pub type AttributeSet = BTreeMap<String, String>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("Node {node} already renders under {existing}; refusing to move it under {requested}")]
    RenderParentReassigned {
        node: NodeId,
        existing: NodeId,
        requested: NodeId,
    },

    #[error("Ancestor chain of node {0} loops back on itself")]
    AncestorCycle(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A document root.
    Root,
    Element,
    Text,
    /// Synthetic wrapper created by the classifier.
    Group,
    /// Named relocation target outside every source document.
    Host,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub tag: String,
    pub element: Option<ElementHandle>,

    pub depth: u32,
    pub render_depth: u32,
    pub sibling_index: usize,
    /// Slot in the render parent's output order; -1 keeps discovery order.
    pub render_position: i32,

    /// Border box.
    pub bounds: Rect,
    pub margin: Edges,
    pub border: Edges,
    pub padding: Edges,
    pub intrinsic_size: Option<Size>,

    pub style: ComputedStyle,
    /// Attributes of the source element (`id`, `for`, `type`...).
    pub source_attributes: BTreeMap<String, String>,
    pub attributes: AttributeSet,
    pub style_ref: Option<ResourceName>,

    pub flags: LayoutFlags,
    pub container: ContainerType,
    pub grid: Option<GridShape>,

    pub visible: bool,
    pub rendered: bool,
    pub excluded: bool,

    pub parent: Option<NodeId>,
    pub document_parent: Option<NodeId>,
    render_parent: Option<NodeId>,
    pub companion: Option<NodeId>,

    pub children: Vec<NodeId>,
    pub layout_children: Vec<NodeId>,
    render_children: Vec<NodeId>,

    pub text: Option<String>,
    pub image_src: Option<String>,
    /// `option` labels of a `select`.
    pub entries: Vec<String>,
}

impl Node {
    fn new(id: NodeId, kind: NodeKind, tag: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            tag: tag.into(),
            element: None,
            depth: 0,
            render_depth: 0,
            sibling_index: 0,
            render_position: -1,
            bounds: Rect::default(),
            margin: Edges::default(),
            border: Edges::default(),
            padding: Edges::default(),
            intrinsic_size: None,
            style: ComputedStyle::default(),
            source_attributes: BTreeMap::new(),
            attributes: AttributeSet::new(),
            style_ref: None,
            flags: LayoutFlags::empty(),
            container: ContainerType::None,
            grid: None,
            visible: true,
            rendered: false,
            excluded: false,
            parent: None,
            document_parent: None,
            render_parent: None,
            companion: None,
            children: Vec::new(),
            layout_children: Vec::new(),
            render_children: Vec::new(),
            text: None,
            image_src: None,
            entries: Vec::new(),
        }
    }

    pub fn margin_box(&self) -> Rect {
        self.bounds.expand(&self.margin)
    }

    /// The box children are laid out in: border box minus border and padding.
    pub fn content_box(&self) -> Rect {
        self.bounds.contract(&(self.border + self.padding))
    }

    pub fn render_parent(&self) -> Option<NodeId> {
        self.render_parent
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text || self.text.is_some()
    }

    pub fn is_image(&self) -> bool {
        self.image_src.is_some()
    }

    /// Image or text content with nothing nested inside.
    pub fn is_leaf_content(&self) -> bool {
        self.layout_children.is_empty() && (self.is_text() || self.is_image())
    }

    pub fn is_forced_break(&self) -> bool {
        self.tag.eq_ignore_ascii_case("br")
    }

    pub fn source_attribute(&self, name: &str) -> Option<&str> {
        self.source_attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Default, Clone)]
pub struct NodeTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes.get(id.index()).ok_or(TreeError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(TreeError::UnknownNode(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Document roots and relocation hosts, in creation order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Allocates a detached node. Ids are handed out in creation order.
    pub fn alloc(&mut self, kind: NodeKind, tag: impl Into<String>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        let mut node = Node::new(id, kind, tag);
        if matches!(kind, NodeKind::Root | NodeKind::Host) {
            node.rendered = true;
            if kind == NodeKind::Host {
                node.flags |= LayoutFlags::RELOCATION_TARGET;
            }
            self.roots.push(id);
        }
        self.nodes.push(node);
        id
    }

    /// Hangs `child` under `parent` in the source tree. When `layout_parent`
    /// is given the child also joins that node's layout run.
    pub fn attach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        layout_parent: Option<NodeId>,
    ) -> Result<(), TreeError> {
        self.node(child)?;
        let sibling_index = {
            let p = self.node_mut(parent)?;
            p.children.push(child);
            p.children.len() - 1
        };
        let depth = match layout_parent {
            Some(lp) => {
                let lp_node = self.node_mut(lp)?;
                lp_node.layout_children.push(child);
                lp_node.depth + 1
            }
            None => self.node(parent)?.depth + 1,
        };
        let c = self.node_mut(child)?;
        c.parent = Some(parent);
        c.document_parent = layout_parent;
        c.sibling_index = sibling_index;
        c.depth = depth;
        Ok(())
    }

    /// Allocates a synthetic group under `parent`, sized to `bounds`.
    pub fn alloc_group(&mut self, parent: NodeId, bounds: Rect) -> Result<NodeId, TreeError> {
        let depth = self.node(parent)?.depth + 1;
        let id = self.alloc(NodeKind::Group, "group");
        let group = self.node_mut(id)?;
        group.parent = Some(parent);
        group.document_parent = Some(parent);
        group.depth = depth;
        group.bounds = bounds;
        group.style.set("display", "block");
        Ok(id)
    }

    /// Members of a node's layout run that still need a render parent.
    pub fn pending_run(&self, parent: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let node = self.node(parent)?;
        Ok(node
            .layout_children
            .iter()
            .copied()
            .filter(|id| {
                self.get(*id)
                    .is_some_and(|n| !n.excluded && !n.rendered)
            })
            .collect())
    }

    /// Places `child` in the render tree under `parent`. A node gets exactly
    /// one render parent over its lifetime.
    pub fn set_render_parent(&mut self, child: NodeId, parent: NodeId) -> Result<(), TreeError> {
        self.node(parent)?;
        let c = self.node_mut(child)?;
        if let Some(existing) = c.render_parent {
            return Err(TreeError::RenderParentReassigned {
                node: child,
                existing,
                requested: parent,
            });
        }
        c.render_parent = Some(parent);
        c.rendered = true;
        self.node_mut(parent)?.render_children.push(child);
        Ok(())
    }

    /// Moves `child` under an arbitrary target ahead of classification.
    pub fn relocate(&mut self, child: NodeId, target: NodeId) -> Result<(), TreeError> {
        self.set_render_parent(child, target)?;
        self.node_mut(child)?.flags |= LayoutFlags::RELOCATED;
        Ok(())
    }

    /// Render children in output order: explicit positions first, then the
    /// remaining children in the order they were attached.
    pub fn render_children(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let node = self.node(id)?;
        let mut ordered: Vec<(bool, i32, usize, NodeId)> = node
            .render_children
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let pos = self.get(*c).map(|n| n.render_position).unwrap_or(-1);
                (pos < 0, pos, i, *c)
            })
            .collect();
        ordered.sort();
        Ok(ordered.into_iter().map(|(_, _, _, c)| c).collect())
    }

    /// Walks `document_parent` links up to the root sentinel.
    pub fn ancestors(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut seen = HashSet::from([id]);
        let mut chain = Vec::new();
        let mut current = self.node(id)?.document_parent;
        while let Some(next) = current {
            if !seen.insert(next) {
                return Err(TreeError::AncestorCycle(id));
            }
            chain.push(next);
            current = self.node(next)?.document_parent;
        }
        Ok(chain)
    }

    /// Every node reachable from `root` through layout runs, parents first.
    pub fn layout_subtree(&self, root: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return Err(TreeError::AncestorCycle(id));
            }
            out.push(id);
            stack.extend(self.node(id)?.layout_children.iter().rev().copied());
        }
        Ok(out)
    }

    /// Every node reachable from `root` through render links, parents first.
    /// A render cycle is cut at the first revisit.
    pub fn render_subtree(&self, root: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            let mut children = self.render_children(id)?;
            children.reverse();
            stack.extend(children);
        }
        Ok(out)
    }

    /// Parents of non-empty runs below `root`, deepest first, ties in id order.
    pub fn classification_order(&self, root: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut parents: Vec<(u32, NodeId)> = self
            .layout_subtree(root)?
            .into_iter()
            .filter_map(|id| self.get(id))
            .filter(|n| !n.excluded && !n.layout_children.is_empty())
            .map(|n| (n.depth, n.id))
            .collect();
        parents.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(parents.into_iter().map(|(_, id)| id).collect())
    }

    /// Assigns render depths top-down: 0 for roots and relocation targets
    /// without a render parent, parent + 1 below them.
    pub fn compute_render_depths(&mut self) {
        let mut queue: VecDeque<(NodeId, u32)> = self
            .nodes
            .iter()
            .filter(|n| n.render_parent.is_none())
            .map(|n| (n.id, 0))
            .collect();
        let mut seen = HashSet::new();
        while let Some((id, depth)) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            let Some(node) = self.nodes.get_mut(id.index()) else {
                continue;
            };
            node.render_depth = depth;
            for child in node.render_children.clone() {
                queue.push_back((child, depth + 1));
            }
        }
    }

    /// Nodes whose render depth disagrees with their render parent's.
    pub fn render_depth_violations(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| match n.render_parent.and_then(|p| self.get(p)) {
                Some(p) => n.render_depth != p.render_depth + 1,
                None => n.render_depth != 0,
            })
            .map(|n| n.id)
            .collect()
    }

    /// The document root a node belongs to, following source parents.
    pub fn document_of(&self, id: NodeId) -> Result<NodeId, TreeError> {
        let mut seen = HashSet::new();
        let mut current = id;
        loop {
            if !seen.insert(current) {
                return Err(TreeError::AncestorCycle(id));
            }
            match self.node(current)?.parent {
                Some(p) => current = p,
                None => return Ok(current),
            }
        }
    }

    pub fn find_by_source_id(&self, root: NodeId, source_id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.source_attribute("id") == Some(source_id))
            .find(|n| self.document_of(n.id).ok() == Some(root))
            .map(|n| n.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (NodeTree, NodeId, NodeId, NodeId) {
        let mut tree = NodeTree::new();
        let root = tree.alloc(NodeKind::Root, "body");
        let a = tree.alloc(NodeKind::Element, "div");
        let b = tree.alloc(NodeKind::Element, "p");
        tree.attach(root, a, Some(root)).unwrap();
        tree.attach(a, b, Some(a)).unwrap();
        (tree, root, a, b)
    }

    #[test]
    fn test_attach_sets_depth_and_runs() {
        let (tree, root, a, b) = chain();
        assert_eq!(tree.node(b).unwrap().depth, 2);
        assert_eq!(tree.node(root).unwrap().layout_children, vec![a]);
        assert_eq!(tree.ancestors(b).unwrap(), vec![a, root]);
        assert_eq!(tree.classification_order(root).unwrap(), vec![a, root]);
    }

    #[test]
    fn test_render_parent_is_set_once() {
        let (mut tree, root, a, b) = chain();
        tree.set_render_parent(b, a).unwrap();
        let err = tree.set_render_parent(b, root).unwrap_err();
        assert_eq!(
            err,
            TreeError::RenderParentReassigned {
                node: b,
                existing: a,
                requested: root
            }
        );
        assert_eq!(tree.node(b).unwrap().render_parent(), Some(a));
    }

    #[test]
    fn test_ancestor_cycle_is_detected() {
        let (mut tree, _root, a, b) = chain();
        tree.node_mut(a).unwrap().document_parent = Some(b);
        assert_eq!(tree.ancestors(b), Err(TreeError::AncestorCycle(b)));
    }

    #[test]
    fn test_render_depths_follow_render_parents() {
        let (mut tree, root, a, b) = chain();
        tree.set_render_parent(a, root).unwrap();
        tree.set_render_parent(b, a).unwrap();
        tree.compute_render_depths();
        assert_eq!(tree.node(b).unwrap().render_depth, 2);
        assert!(tree.render_depth_violations().is_empty());
    }

    #[test]
    fn test_render_children_respect_positions() {
        let (mut tree, root, a, _b) = chain();
        let c = tree.alloc(NodeKind::Element, "span");
        tree.attach(root, c, Some(root)).unwrap();
        tree.set_render_parent(a, root).unwrap();
        tree.set_render_parent(c, root).unwrap();
        tree.node_mut(a).unwrap().render_position = 1;
        tree.node_mut(c).unwrap().render_position = 0;
        assert_eq!(tree.render_children(root).unwrap(), vec![c, a]);
    }

    #[test]
    fn test_find_by_source_id_stays_in_document() {
        let (mut tree, root, a, _b) = chain();
        tree.node_mut(a)
            .unwrap()
            .source_attributes
            .insert("id".into(), "email".into());
        let other = tree.alloc(NodeKind::Root, "body");
        assert_eq!(tree.find_by_source_id(root, "email"), Some(a));
        assert_eq!(tree.find_by_source_id(other, "email"), None);
    }
}
