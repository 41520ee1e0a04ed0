//! The Template Assembler.
//!
//! Nodes are placed one render level at a time, deepest first. Placing a
//! node builds its fragment (one slot per render child) and announces the
//! node to its render parent through the depth map. When the level closes,
//! announcements whose parent fragment exists are bound; the rest wait in
//! the render queue until that parent is placed. Final resolution expands
//! each document root by following bindings, guarded against cycles.

use crate::TemplateError;
use crate::placeholder::{Fragment, Piece, Placeholder};
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};
use weft_layout::NodeTree;
use weft_types::NodeId;

/// The expanded piece list of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub root: NodeId,
    pub pieces: Vec<Piece>,
    /// Slots with nothing bound, emitted as literal markers.
    pub unresolved: Vec<Placeholder>,
    /// Slots that lead back onto the current expansion path.
    pub cycles: Vec<Placeholder>,
    /// Slots filled from a node of another document.
    pub cross_document: usize,
}

#[derive(Debug, Default)]
pub struct Assembler {
    fragments: BTreeMap<NodeId, Fragment>,
    replaced: HashSet<NodeId>,
    bindings: BTreeMap<Placeholder, NodeId>,
    depth_map: BTreeMap<Placeholder, NodeId>,
    render_queue: BTreeMap<NodeId, Vec<(Placeholder, NodeId)>>,
    saved_orders: BTreeMap<NodeId, Vec<NodeId>>,
    level: Option<u32>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_level(&mut self, render_depth: u32) {
        if let Some(open) = self.level {
            warn!("Level {} was still open when level {} began", open, render_depth);
        }
        self.level = Some(render_depth);
    }

    pub fn is_placed(&self, node: NodeId) -> bool {
        self.fragments.contains_key(&node)
    }

    pub fn fragment(&self, node: NodeId) -> Option<&Fragment> {
        self.fragments.get(&node)
    }

    pub fn binding(&self, placeholder: &Placeholder) -> Option<NodeId> {
        self.bindings.get(placeholder).copied()
    }

    pub fn queued(&self) -> usize {
        self.render_queue.values().map(Vec::len).sum()
    }

    /// Builds the fragment of `node` and announces it to its render parent.
    /// Leaf children are bound at once; container children were announced
    /// when they were placed.
    pub fn place(&mut self, tree: &NodeTree, node: NodeId) -> Result<(), TemplateError> {
        if !self.replaced.contains(&node) {
            let children = tree.render_children(node)?;
            self.fragments
                .insert(node, Fragment::container(node, children.len()));
            for (i, child) in children.iter().enumerate() {
                if tree.render_children(*child)?.is_empty() && !self.replaced.contains(child) {
                    self.bindings.insert(Placeholder::new(node, i as i32), *child);
                }
            }
        }
        self.announce(tree, node)?;
        self.drain_queue(node);
        Ok(())
    }

    /// Substitutes extension output for a node's own fragment. Slot markers
    /// in `text` still take part in resolution.
    pub fn replace(&mut self, tree: &NodeTree, node: NodeId, text: &str) -> Result<(), TemplateError> {
        self.replaced.insert(node);
        self.fragments.insert(node, Fragment::from_raw(text));
        self.announce(tree, node)?;
        self.drain_queue(node);
        Ok(())
    }

    /// Records the output order a parent must end up with. Applied when
    /// the level closes, and only if every saved id is bound.
    pub fn save_order(&mut self, owner: NodeId, order: Vec<NodeId>) {
        self.saved_orders.insert(owner, order);
    }

    fn announce(&mut self, tree: &NodeTree, node: NodeId) -> Result<(), TemplateError> {
        let Some(parent) = tree.node(node)?.render_parent() else {
            return Ok(());
        };
        let Some(position) = tree.render_children(parent)?.iter().position(|c| *c == node) else {
            return Err(TemplateError::NotARenderChild { node, parent });
        };
        let placeholder = Placeholder::new(parent, position as i32);
        if self.level.is_some() {
            self.depth_map.insert(placeholder, node);
        } else {
            self.commit(placeholder, node);
        }
        Ok(())
    }

    fn commit(&mut self, placeholder: Placeholder, node: NodeId) {
        match self.fragments.get(&placeholder.owner) {
            Some(fragment) if fragment.contains_slot(&placeholder) => {
                self.bindings.insert(placeholder, node);
            }
            _ => self
                .render_queue
                .entry(placeholder.owner)
                .or_default()
                .push((placeholder, node)),
        }
    }

    fn drain_queue(&mut self, owner: NodeId) {
        let Some(waiting) = self.render_queue.remove(&owner) else {
            return;
        };
        let fragment = self.fragments.get(&owner);
        let mut still_waiting = Vec::new();
        for (placeholder, node) in waiting {
            if fragment.is_some_and(|f| f.contains_slot(&placeholder)) {
                self.bindings.insert(placeholder, node);
            } else {
                still_waiting.push((placeholder, node));
            }
        }
        if !still_waiting.is_empty() {
            self.render_queue.insert(owner, still_waiting);
        }
    }

    /// Commits the depth map and any saved orders whose owner is complete.
    /// Rejected reorders are returned; their owner keeps discovery order.
    pub fn finish_level(&mut self) -> Vec<TemplateError> {
        for (placeholder, node) in std::mem::take(&mut self.depth_map) {
            self.commit(placeholder, node);
        }
        let owners: Vec<NodeId> = self
            .saved_orders
            .keys()
            .copied()
            .filter(|owner| self.fragments.contains_key(owner))
            .collect();
        let mut rejected = Vec::new();
        for owner in owners {
            if let Some(order) = self.saved_orders.remove(&owner) {
                if let Err(e) = self.apply_order(owner, &order) {
                    warn!("{}", e);
                    rejected.push(e);
                }
            }
        }
        self.level = None;
        rejected
    }

    fn apply_order(&mut self, owner: NodeId, order: &[NodeId]) -> Result<(), TemplateError> {
        let bound: BTreeMap<NodeId, Placeholder> = self
            .bindings
            .iter()
            .filter(|(ph, _)| ph.owner == owner)
            .map(|(ph, node)| (*node, *ph))
            .collect();
        let missing: Vec<NodeId> = order
            .iter()
            .copied()
            .filter(|id| !bound.contains_key(id))
            .collect();
        if !missing.is_empty() {
            return Err(TemplateError::PartialReorder { owner, missing });
        }
        let mut slots: Vec<Placeholder> = order.iter().filter_map(|id| bound.get(id).copied()).collect();
        slots.sort();
        for (slot, id) in slots.into_iter().zip(order) {
            self.bindings.insert(slot, *id);
        }
        debug!("Reordered {} slot(s) of {}", order.len(), owner);
        Ok(())
    }

    /// Expands every document. Announcements still queued for owners placed
    /// after their level closed are bound first.
    pub fn resolve_all(&mut self, tree: &NodeTree, roots: &[NodeId]) -> Vec<Resolution> {
        let owners: Vec<NodeId> = self.render_queue.keys().copied().collect();
        for owner in owners {
            self.drain_queue(owner);
        }
        roots.iter().map(|root| self.resolve(tree, *root)).collect()
    }

    pub fn resolve(&self, tree: &NodeTree, root: NodeId) -> Resolution {
        let mut resolution = Resolution {
            root,
            pieces: Vec::new(),
            unresolved: Vec::new(),
            cycles: Vec::new(),
            cross_document: 0,
        };
        let mut path = vec![root];
        self.expand(tree, root, &mut path, &mut resolution);
        resolution
    }

    fn expand(&self, tree: &NodeTree, node: NodeId, path: &mut Vec<NodeId>, out: &mut Resolution) {
        let leaf;
        let fragment = match self.fragments.get(&node) {
            Some(fragment) => fragment,
            None => {
                leaf = Fragment::leaf(node);
                &leaf
            }
        };
        for piece in &fragment.pieces {
            let Piece::Slot(placeholder) = piece else {
                out.pieces.push(piece.clone());
                continue;
            };
            let Some(child) = self.bindings.get(placeholder).copied() else {
                warn!("Unresolved placeholder {} in document {}", placeholder, out.root);
                out.unresolved.push(*placeholder);
                out.pieces.push(Piece::Raw(placeholder.to_string()));
                continue;
            };
            if path.contains(&child) {
                warn!("Placeholder {} refers back to node {} on its own path", placeholder, child);
                out.cycles.push(*placeholder);
                out.pieces.push(Piece::Raw(placeholder.to_string()));
                continue;
            }
            if tree.document_of(child).is_ok_and(|doc| doc != out.root) {
                out.cross_document += 1;
            }
            path.push(child);
            self.expand(tree, child, path, out);
            path.pop();
        }
    }
}
