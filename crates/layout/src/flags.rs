use serde::{Deserialize, Serialize};
use std::fmt;

bitflags::bitflags! {
    /// Alignment and classification marks carried by a node or a decision.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayoutFlags: u32 {
        /// Width is a percentage of a horizontal linear parent.
        const PERCENT_WIDTH = 1 << 0;
        /// The box spans its parent's content width.
        const MATCH_WIDTH = 1 << 1;
        const CENTER_HORIZONTAL = 1 << 2;
        const ALIGN_END = 1 << 3;
        /// Output order follows geometry, not source order.
        const REVERSED = 1 << 4;
        /// Chosen baseline reference of a relative run.
        const BASELINE_ANCHOR = 1 << 5;
        /// Absolutely positioned member layered over the flow.
        const OVERLAY = 1 << 6;
        /// No axis or relative test matched.
        const DEGENERATE = 1 << 7;
        /// Produced by splitting a run at floats and clears.
        const FLOAT_SPLIT = 1 << 8;
        const MULTI_COLUMN = 1 << 9;
        /// Rendered under a node other than its document ancestor.
        const RELOCATED = 1 << 10;
        /// Accepts relocated nodes at render depth 0.
        const RELOCATION_TARGET = 1 << 11;
        /// Output is a hook-supplied raw fragment.
        const REPLACED = 1 << 12;
        const HIDDEN = 1 << 13;
    }
}

/// Abstract container kinds; a dialect maps them to platform view classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContainerType {
    /// Leaf content, no children in the render tree.
    #[default]
    None,
    LinearHorizontal,
    LinearVertical,
    /// Inline run aligned on a shared baseline.
    Relative,
    /// Free placement; the fallback that never fails.
    Frame,
    Grid,
}

impl ContainerType {
    pub fn is_container(&self) -> bool {
        !matches!(self, ContainerType::None)
    }

    pub fn is_linear(&self) -> bool {
        matches!(
            self,
            ContainerType::LinearHorizontal | ContainerType::LinearVertical
        )
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerType::None => "leaf",
            ContainerType::LinearHorizontal => "linear-horizontal",
            ContainerType::LinearVertical => "linear-vertical",
            ContainerType::Relative => "relative",
            ContainerType::Frame => "frame",
            ContainerType::Grid => "grid",
        };
        f.write_str(name)
    }
}
