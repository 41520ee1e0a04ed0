use crate::flags::{ContainerType, LayoutFlags};
use serde::{Deserialize, Serialize};
use weft_types::NodeId;

/// Row and column counts of a grid container, derived from member geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub columns: usize,
    pub rows: usize,
}

/// How one run of siblings is grouped and what container holds it.
///
/// Decisions are produced children-first: a synthetic group's decision
/// always precedes the decision of the node that contains the group.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDecision {
    /// The classified parent, or a synthetic group allocated for the run.
    pub owner: NodeId,
    pub synthetic: bool,
    pub container: ContainerType,
    pub flags: LayoutFlags,
    /// Members in source order. Slot `i` of the owner belongs to `members[i]`.
    pub members: Vec<NodeId>,
    /// Output order when it differs from source order.
    pub reorder: Option<Vec<NodeId>>,
    pub grid: Option<GridShape>,
    pub baseline: Option<NodeId>,
}

impl LayoutDecision {
    /// Members in the order they will be emitted.
    pub fn output_order(&self) -> &[NodeId] {
        self.reorder.as_deref().unwrap_or(&self.members)
    }

    pub fn is_degenerate(&self) -> bool {
        self.flags.contains(LayoutFlags::DEGENERATE)
    }
}
