//! Geometric and flow predicates over sibling boxes.

use crate::tree::{Node, NodeKind};
use weft_types::Rect;

/// In normal flow and block-level: always starts a new line.
pub(crate) fn is_block_in_flow(node: &Node) -> bool {
    node.style.display().is_block_level()
        && !node.style.float().is_floating()
        && !node.style.position().is_out_of_flow()
}

pub(crate) fn is_inline_level(node: &Node) -> bool {
    node.kind == NodeKind::Text || node.style.display().is_inline_level()
}

pub(crate) fn is_floating(node: &Node) -> bool {
    node.style.float().is_floating()
}

/// Every member shares a horizontal band with every earlier member, none
/// overlap sideways, and nothing clears or forces a break.
pub(crate) fn is_single_axis_horizontal(members: &[&Node], tolerance: f32) -> bool {
    if members
        .iter()
        .any(|n| n.style.clear().is_clearing() || n.is_forced_break())
    {
        return false;
    }
    members.iter().enumerate().all(|(j, later)| {
        members[..j].iter().all(|earlier| {
            later.bounds.overlaps_vertically(&earlier.bounds, tolerance)
                && !later.bounds.overlaps_horizontally(&earlier.bounds, tolerance)
        })
    })
}

/// Every adjacent pair stacks.
pub(crate) fn is_single_axis_vertical(members: &[&Node], content: &Rect, tolerance: f32) -> bool {
    members
        .windows(2)
        .all(|pair| stacks_vertically(pair[0], pair[1], content, tolerance))
}

/// Whether `next` goes below `prev`. A float sharing a band with its
/// neighbour interrupts the stack even when the other box is a block.
pub(crate) fn stacks_vertically(prev: &Node, next: &Node, content: &Rect, tolerance: f32) -> bool {
    if (is_floating(prev) || is_floating(next))
        && prev.bounds.overlaps_vertically(&next.bounds, tolerance)
    {
        return false;
    }
    let too_wide = |n: &Node| n.bounds.width > content.width + tolerance;
    prev.is_forced_break()
        || next.is_forced_break()
        || is_block_in_flow(prev)
        || is_block_in_flow(next)
        || too_wide(prev)
        || too_wide(next)
        || next.bounds.y >= prev.bounds.bottom() - tolerance
}

/// Rows of a grid: members that share a band with the current row join it.
pub(crate) fn rows(members: &[&Node], tolerance: f32) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..members.len()).collect();
    order.sort_by(|a, b| {
        members[*a]
            .bounds
            .y
            .total_cmp(&members[*b].bounds.y)
            .then(members[*a].bounds.x.total_cmp(&members[*b].bounds.x))
    });
    let mut rows: Vec<(Rect, Vec<usize>)> = Vec::new();
    for index in order {
        let bounds = members[index].bounds;
        match rows.last_mut() {
            Some((band, cells)) if band.overlaps_vertically(&bounds, tolerance) => {
                *band = band.union(&bounds);
                cells.push(index);
            }
            _ => rows.push((bounds, vec![index])),
        }
    }
    rows.into_iter().map(|(_, cells)| cells).collect()
}
