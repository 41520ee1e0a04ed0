//! Splitting a run at floats and clears.
//!
//! Scanning from the first float, floats collect on their side until a
//! clear consumes them. Clearing one side while the other still has pending
//! floats is a partial clear: later floats land in the `below` sides. The
//! first clear that leaves nothing pending starts the `below` partition.
//! Non-floating boxes between the first float and that clear wrap around the
//! floats and form the `inline` partition.

use crate::tree::Node;
use weft_style::Float;
use weft_types::NodeId;

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct FloatPartitions {
    pub above: Vec<NodeId>,
    pub left_above: Vec<NodeId>,
    pub right_above: Vec<NodeId>,
    pub inline: Vec<NodeId>,
    pub left_below: Vec<NodeId>,
    pub right_below: Vec<NodeId>,
    pub below: Vec<NodeId>,
}

pub(crate) fn partition(members: &[&Node]) -> FloatPartitions {
    let mut parts = FloatPartitions::default();
    let Some(first_float) = members.iter().position(|n| n.style.float().is_floating()) else {
        parts.above = members.iter().map(|n| n.id).collect();
        return parts;
    };
    parts.above = members[..first_float].iter().map(|n| n.id).collect();

    let (mut pending_left, mut pending_right) = (0usize, 0usize);
    let mut partial = false;
    for (offset, node) in members[first_float..].iter().enumerate() {
        let clear = node.style.clear();
        if clear.is_clearing() && pending_left + pending_right > 0 {
            if clear.clears_left() {
                pending_left = 0;
            }
            if clear.clears_right() {
                pending_right = 0;
            }
            if pending_left + pending_right == 0 {
                parts.below = members[first_float + offset..]
                    .iter()
                    .map(|n| n.id)
                    .collect();
                return parts;
            }
            partial = true;
        }
        match node.style.float() {
            Float::Left => {
                pending_left += 1;
                if partial {
                    parts.left_below.push(node.id);
                } else {
                    parts.left_above.push(node.id);
                }
            }
            Float::Right => {
                pending_right += 1;
                if partial {
                    parts.right_below.push(node.id);
                } else {
                    parts.right_above.push(node.id);
                }
            }
            Float::None => parts.inline.push(node.id),
        }
    }
    parts
}
