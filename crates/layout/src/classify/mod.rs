//! The layout classifier.
//!
//! For each parent, the run of children still waiting for a render parent is
//! turned into one or more [`LayoutDecision`]s that together place every
//! member exactly once. Positioned boxes are split off first and layered
//! over whatever the flow resolves to. The flow itself is tested in a fixed
//! order: horizontal band, vertical stack, float split, inline/baseline run,
//! and finally the frame fallback which never fails.

mod axis;
mod floats;

use crate::LayoutError;
use crate::config::LayoutConfig;
use crate::decision::{GridShape, LayoutDecision};
use crate::flags::{ContainerType, LayoutFlags};
use crate::tree::{Node, NodeTree, TreeError};
use log::{debug, warn};
use weft_style::{Dimension, Direction, FlexDirection};
use weft_types::{NodeId, Rect, geometry::union_all};

#[derive(Debug, Default)]
pub struct ClassifyOutcome {
    /// Children-first: a group's decision precedes its container's.
    pub decisions: Vec<LayoutDecision>,
    /// Members left out because placing them would break a tree invariant.
    pub skipped: Vec<(NodeId, TreeError)>,
}

impl ClassifyOutcome {
    pub fn merge(&mut self, other: ClassifyOutcome) {
        self.decisions.extend(other.decisions);
        self.skipped.extend(other.skipped);
    }

    pub fn degenerate(&self) -> impl Iterator<Item = &LayoutDecision> {
        self.decisions.iter().filter(|d| d.is_degenerate())
    }
}

#[derive(Debug, Clone)]
enum Plan {
    Member(NodeId),
    Group(GroupPlan),
}

#[derive(Debug, Clone)]
struct GroupPlan {
    container: ContainerType,
    flags: LayoutFlags,
    members: Vec<Plan>,
    grid: Option<GridShape>,
    baseline: Option<NodeId>,
}

impl GroupPlan {
    fn new(container: ContainerType, members: Vec<Plan>) -> Self {
        Self {
            container,
            flags: LayoutFlags::empty(),
            members,
            grid: None,
            baseline: None,
        }
    }

    fn with_flags(mut self, flags: LayoutFlags) -> Self {
        self.flags |= flags;
        self
    }

    fn of(container: ContainerType, ids: &[NodeId]) -> Self {
        Self::new(container, ids.iter().copied().map(Plan::Member).collect())
    }

    fn leaf_ids(&self, out: &mut Vec<NodeId>) {
        for member in &self.members {
            match member {
                Plan::Member(id) => out.push(*id),
                Plan::Group(g) => g.leaf_ids(out),
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: LayoutConfig,
}

impl Classifier {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Classifies every run below `root`, deepest parents first.
    pub fn classify_document(
        &self,
        tree: &mut NodeTree,
        root: NodeId,
    ) -> Result<ClassifyOutcome, LayoutError> {
        let mut outcome = ClassifyOutcome::default();
        for parent in tree.classification_order(root)? {
            outcome.merge(self.classify(tree, parent)?);
        }
        Ok(outcome)
    }

    /// Classifies the pending run of one parent. Members that already have a
    /// render parent (relocated, or placed earlier) are never revisited.
    pub fn classify(&self, tree: &mut NodeTree, parent: NodeId) -> Result<ClassifyOutcome, LayoutError> {
        let mut outcome = ClassifyOutcome::default();
        let run = tree.pending_run(parent)?;
        if run.is_empty() {
            return Ok(outcome);
        }

        let content = tree.node(parent)?.content_box();
        let (pageflow, positioned) = self.split_positioned(tree, &content, &run)?;

        let flow = if pageflow.is_empty() {
            None
        } else {
            Some(self.plan_parent(tree, parent, &content, &pageflow)?)
        };
        let plan = match (flow, positioned.is_empty()) {
            (Some(flow), true) => flow,
            (flow, _) => {
                for id in &positioned {
                    tree.node_mut(*id)?.flags |= LayoutFlags::OVERLAY;
                }
                let mut members: Vec<Plan> = flow.map(|g| flatten(Plan::Group(g))).into_iter().collect();
                members.extend(positioned.iter().copied().map(Plan::Member));
                GroupPlan::new(ContainerType::Frame, members)
            }
        };

        self.materialize(tree, parent, parent, false, plan, &mut outcome)?;
        Ok(outcome)
    }

    /// Absolute and fixed boxes away from the content origin leave the flow,
    /// ordered by stacking index and then source order.
    fn split_positioned(
        &self,
        tree: &NodeTree,
        content: &Rect,
        run: &[NodeId],
    ) -> Result<(Vec<NodeId>, Vec<NodeId>), LayoutError> {
        let tol = self.config.origin_tolerance_px;
        let mut pageflow = Vec::new();
        let mut positioned = Vec::new();
        for (index, id) in run.iter().enumerate() {
            let node = tree.node(*id)?;
            let anchored = (node.bounds.x - content.x).abs() <= tol
                && (node.bounds.y - content.y).abs() <= tol;
            if node.style.position().is_out_of_flow() && !anchored {
                positioned.push((node.style.z_index(), index, *id));
            } else {
                pageflow.push(*id);
            }
        }
        positioned.sort();
        Ok((pageflow, positioned.into_iter().map(|(_, _, id)| id).collect()))
    }

    /// Parent-level tests (grid, multi-column, reversal) wrapped around the
    /// generic run decision.
    fn plan_parent(
        &self,
        tree: &NodeTree,
        parent: NodeId,
        content: &Rect,
        members: &[NodeId],
    ) -> Result<GroupPlan, LayoutError> {
        let parent_node = tree.node(parent)?;
        let nodes = lookup(tree, members)?;

        if parent_node.style.display().is_grid_like() {
            let rows = axis::rows(&nodes, self.config.tolerance_px);
            let shape = GridShape {
                columns: rows.iter().map(Vec::len).max().unwrap_or(0),
                rows: rows.len(),
            };
            let mut plan = GroupPlan::of(ContainerType::Grid, members);
            plan.grid = Some(shape);
            return Ok(plan);
        }

        if parent_node.style.column_count() > 1 {
            return Ok(GroupPlan::of(ContainerType::Frame, members).with_flags(LayoutFlags::MULTI_COLUMN));
        }

        let mut plan = self.plan_run(tree, content, &nodes, true)?;
        let style = &parent_node.style;
        let reversed = match plan.container {
            ContainerType::LinearHorizontal => {
                style.direction() == Direction::Rtl || style.flex_direction() == FlexDirection::RowReverse
            }
            ContainerType::LinearVertical => style.flex_direction() == FlexDirection::ColumnReverse,
            _ => false,
        };
        if reversed {
            plan.flags |= LayoutFlags::REVERSED;
        }
        Ok(plan)
    }

    fn plan_run(
        &self,
        tree: &NodeTree,
        content: &Rect,
        nodes: &[&Node],
        allow_split: bool,
    ) -> Result<GroupPlan, LayoutError> {
        let tol = self.config.tolerance_px;
        let ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();

        if let [only] = nodes {
            let container = if axis::is_block_in_flow(only) || only.is_forced_break() {
                ContainerType::LinearVertical
            } else {
                ContainerType::LinearHorizontal
            };
            return Ok(GroupPlan::of(container, &ids));
        }
        if axis::is_single_axis_horizontal(nodes, tol) {
            return Ok(GroupPlan::of(ContainerType::LinearHorizontal, &ids));
        }
        if axis::is_single_axis_vertical(nodes, content, tol) {
            return Ok(GroupPlan::of(ContainerType::LinearVertical, &ids));
        }
        if allow_split && nodes.iter().any(|n| axis::is_floating(n)) {
            return self.plan_floats(tree, content, nodes);
        }
        if let Some(anchor) = relative_anchor(nodes) {
            let mut plan = GroupPlan::of(ContainerType::Relative, &ids);
            plan.baseline = Some(anchor);
            return Ok(plan);
        }

        warn!(
            "Degenerate run of {} member(s) starting at node {}; falling back to frame",
            ids.len(),
            ids[0]
        );
        Ok(GroupPlan::of(ContainerType::Frame, &ids).with_flags(LayoutFlags::DEGENERATE))
    }

    fn plan_floats(&self, tree: &NodeTree, content: &Rect, nodes: &[&Node]) -> Result<GroupPlan, LayoutError> {
        let parts = floats::partition(nodes);
        let tol = self.config.tolerance_px;
        let sub = |ids: &[NodeId], allow_split: bool| -> Result<Option<Plan>, LayoutError> {
            Ok(match ids {
                [] => None,
                [only] => Some(Plan::Member(*only)),
                _ => Some(Plan::Group(self.plan_run(
                    tree,
                    content,
                    &lookup(tree, ids)?,
                    allow_split,
                )?)),
            })
        };

        let mut stack: Vec<Plan> = Vec::new();
        stack.extend(sub(parts.above.as_slice(), false)?);
        // Leading floats only share a band with the inline content that wraps
        // them; with nothing inline every partition keeps its own slot.
        let band: Vec<NodeId> = [&parts.left_above, &parts.inline, &parts.right_above]
            .iter()
            .flat_map(|p| p.iter().copied())
            .collect();
        let merged = self.config.float_overlap
            && !parts.inline.is_empty()
            && band.len() > 1
            && axis::is_single_axis_horizontal(&lookup(tree, &band)?, tol);
        if merged {
            stack.push(Plan::Group(
                GroupPlan::of(ContainerType::LinearHorizontal, &band).with_flags(LayoutFlags::FLOAT_SPLIT),
            ));
        } else {
            for part in [&parts.left_above, &parts.right_above, &parts.inline] {
                stack.extend(sub(part.as_slice(), false)?);
            }
        }
        for part in [&parts.left_below, &parts.right_below] {
            stack.extend(sub(part.as_slice(), false)?);
        }
        // Everything from the full clear on is a shorter run, so the split may recurse.
        stack.extend(sub(parts.below.as_slice(), true)?);

        if let [Plan::Group(_)] = stack.as_slice() {
            if let Some(Plan::Group(only)) = stack.pop() {
                return Ok(only);
            }
        }
        Ok(GroupPlan::new(ContainerType::LinearVertical, stack).with_flags(LayoutFlags::FLOAT_SPLIT))
    }

    /// Turns a plan into decisions, allocating synthetic groups for nested
    /// plans with more than one member.
    fn materialize(
        &self,
        tree: &mut NodeTree,
        parent: NodeId,
        owner: NodeId,
        synthetic: bool,
        plan: GroupPlan,
        out: &mut ClassifyOutcome,
    ) -> Result<(), LayoutError> {
        let mut members = Vec::with_capacity(plan.members.len());
        for member in plan.members {
            members.push(self.realize(tree, parent, member, out)?);
        }

        let owner_node = tree.node(owner)?;
        let content = if synthetic {
            owner_node.bounds
        } else {
            owner_node.content_box()
        };

        let mut flags = plan.flags;
        let reorder = if flags.contains(LayoutFlags::REVERSED) {
            let geometric = geometric_order(tree, &members, plan.container)?;
            (geometric != members).then_some(geometric)
        } else {
            None
        };
        if reorder.is_none() {
            flags.remove(LayoutFlags::REVERSED);
        }

        let output = reorder.clone().unwrap_or_else(|| members.clone());
        let mut placed = Vec::with_capacity(output.len());
        for id in output {
            match tree.set_render_parent(id, owner) {
                Ok(()) => {
                    tree.node_mut(id)?.render_position = placed.len() as i32;
                    placed.push(id);
                }
                Err(e) => {
                    warn!("Skipping member {} of {}: {}", id, owner, e);
                    out.skipped.push((id, e));
                }
            }
        }
        members.retain(|id| placed.contains(id));
        let reorder = reorder.map(|_| placed);

        self.apply_member_flags(tree, plan.container, &content, &members)?;
        if let Some(anchor) = plan.baseline {
            tree.node_mut(anchor)?.flags |= LayoutFlags::BASELINE_ANCHOR;
        }

        let node = tree.node_mut(owner)?;
        node.container = plan.container;
        node.flags |= flags;
        node.grid = plan.grid;

        debug!(
            "{} {} -> {} with {} member(s){}",
            if synthetic { "Group" } else { "Node" },
            owner,
            plan.container,
            members.len(),
            if flags.is_empty() {
                String::new()
            } else {
                format!(" {:?}", flags)
            }
        );
        out.decisions.push(LayoutDecision {
            owner,
            synthetic,
            container: plan.container,
            flags,
            members,
            reorder,
            grid: plan.grid,
            baseline: plan.baseline,
        });
        Ok(())
    }

    fn realize(
        &self,
        tree: &mut NodeTree,
        parent: NodeId,
        plan: Plan,
        out: &mut ClassifyOutcome,
    ) -> Result<NodeId, LayoutError> {
        match flatten(plan) {
            Plan::Member(id) => Ok(id),
            Plan::Group(group) => {
                let mut leaves = Vec::new();
                group.leaf_ids(&mut leaves);
                let bounds = lookup(tree, &leaves)?
                    .iter()
                    .map(|n| n.bounds)
                    .collect::<Vec<_>>();
                let bounds = union_all(&bounds).unwrap_or_default();
                let group_id = tree.alloc_group(parent, bounds)?;
                self.materialize(tree, parent, group_id, true, group, out)?;
                Ok(group_id)
            }
        }
    }

    fn apply_member_flags(
        &self,
        tree: &mut NodeTree,
        container: ContainerType,
        content: &Rect,
        members: &[NodeId],
    ) -> Result<(), LayoutError> {
        let tol = self.config.tolerance_px;
        for id in members {
            let node = tree.node_mut(*id)?;
            let b = node.bounds;
            let mut flags = LayoutFlags::empty();
            if content.width > 0.0 && b.width >= content.width - tol {
                flags |= LayoutFlags::MATCH_WIDTH;
            }
            if container == ContainerType::LinearHorizontal
                && matches!(node.style.width(), Dimension::Percent(_))
            {
                flags |= LayoutFlags::PERCENT_WIDTH;
            }
            if container == ContainerType::LinearVertical
                && !flags.contains(LayoutFlags::MATCH_WIDTH)
                && b.x > content.x + tol
            {
                if (b.center_x() - content.center_x()).abs() <= tol {
                    flags |= LayoutFlags::CENTER_HORIZONTAL;
                } else if (b.right() - content.right()).abs() <= tol {
                    flags |= LayoutFlags::ALIGN_END;
                }
            }
            node.flags |= flags;
        }
        Ok(())
    }
}

/// A single-member group collapses onto its member.
fn flatten(plan: Plan) -> Plan {
    match plan {
        Plan::Group(mut g) if g.members.len() == 1 => match g.members.pop() {
            Some(inner) => flatten(inner),
            None => Plan::Group(g),
        },
        other => other,
    }
}

fn lookup<'t>(tree: &'t NodeTree, ids: &[NodeId]) -> Result<Vec<&'t Node>, TreeError> {
    ids.iter().map(|id| tree.node(*id)).collect()
}

/// Members sorted along the container's main axis.
fn geometric_order(
    tree: &NodeTree,
    members: &[NodeId],
    container: ContainerType,
) -> Result<Vec<NodeId>, TreeError> {
    let mut keyed = Vec::with_capacity(members.len());
    for (index, id) in members.iter().enumerate() {
        let b = tree.node(*id)?.bounds;
        let key = if container == ContainerType::LinearVertical { b.y } else { b.x };
        keyed.push((key, index, *id));
    }
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    Ok(keyed.into_iter().map(|(_, _, id)| id).collect())
}

/// The baseline reference of an inline run, or `None` if the run cannot be
/// expressed as a relative container.
fn relative_anchor(nodes: &[&Node]) -> Option<NodeId> {
    let eligible = nodes.iter().all(|n| {
        let negative_top = matches!(n.style.top(), Dimension::Px(v) if v < 0.0) || n.margin.top < 0.0;
        axis::is_inline_level(n) && !negative_top && n.style.vertical_align().is_relative_compatible()
    });
    if !eligible {
        return None;
    }
    let on_baseline: Vec<&Node> = nodes
        .iter()
        .copied()
        .filter(|n| n.style.vertical_align().is_baseline())
        .collect();
    if on_baseline.is_empty() {
        pick_baseline(nodes)
    } else {
        pick_baseline(&on_baseline)
    }
}

/// Largest line height wins, then leaf image/text content, then source order.
fn pick_baseline(candidates: &[&Node]) -> Option<NodeId> {
    let mut best: Option<(NodeId, f32, bool)> = None;
    for node in candidates {
        let line_height = node.style.line_height();
        let leaf = node.is_leaf_content();
        let better = match best {
            None => true,
            Some((_, best_lh, best_leaf)) => {
                line_height > best_lh + f32::EPSILON
                    || ((line_height - best_lh).abs() <= f32::EPSILON && leaf && !best_leaf)
            }
        };
        if better {
            best = Some((node.id, line_height, leaf));
        }
    }
    best.map(|(id, _, _)| id)
}
