//! Keyword properties that decide how a box takes part in normal flow.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Display {
    Block,
    #[default]
    Inline,
    InlineBlock,
    Flex,
    InlineFlex,
    Grid,
    InlineGrid,
    Table,
    InlineTable,
    TableRow,
    TableCell,
    ListItem,
    /// The box itself generates nothing; its children join the parent's run.
    Contents,
    None,
}

impl Display {
    pub fn parse(s: &str) -> Result<Self, String> {
        // Two-value syntax ("block flow", "inline flex") collapses to the legacy keyword.
        let normalized = s.trim().to_lowercase();
        let normalized = match normalized.as_str() {
            "block flow" | "block flow-root" | "flow-root" => "block",
            "inline flow" => "inline",
            "inline flow-root" => "inline-block",
            "block flex" => "flex",
            "inline flex" => "inline-flex",
            "block grid" => "grid",
            "inline grid" => "inline-grid",
            other => other,
        };
        match normalized {
            "block" => Ok(Display::Block),
            "inline" => Ok(Display::Inline),
            "inline-block" => Ok(Display::InlineBlock),
            "flex" => Ok(Display::Flex),
            "inline-flex" => Ok(Display::InlineFlex),
            "grid" => Ok(Display::Grid),
            "inline-grid" => Ok(Display::InlineGrid),
            "table" => Ok(Display::Table),
            "inline-table" => Ok(Display::InlineTable),
            "table-row" => Ok(Display::TableRow),
            "table-cell" => Ok(Display::TableCell),
            "list-item" => Ok(Display::ListItem),
            "contents" => Ok(Display::Contents),
            "none" => Ok(Display::None),
            _ => Err(format!("Invalid display: '{}'", s)),
        }
    }

    pub fn is_inline_level(&self) -> bool {
        matches!(
            self,
            Display::Inline
                | Display::InlineBlock
                | Display::InlineFlex
                | Display::InlineGrid
                | Display::InlineTable
        )
    }

    pub fn is_block_level(&self) -> bool {
        matches!(
            self,
            Display::Block
                | Display::Flex
                | Display::Grid
                | Display::Table
                | Display::TableRow
                | Display::ListItem
        )
    }

    /// Containers whose children are laid out on a two-dimensional grid.
    pub fn is_grid_like(&self) -> bool {
        matches!(
            self,
            Display::Grid | Display::InlineGrid | Display::Table | Display::InlineTable
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

impl Position {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(Position::Static),
            "relative" => Ok(Position::Relative),
            "absolute" => Ok(Position::Absolute),
            "fixed" => Ok(Position::Fixed),
            "sticky" | "-webkit-sticky" => Ok(Position::Sticky),
            _ => Err(format!("Invalid position: '{}'", s)),
        }
    }

    /// Absolute and fixed boxes leave normal flow.
    pub fn is_out_of_flow(&self) -> bool {
        matches!(self, Position::Absolute | Position::Fixed)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

impl Float {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Float::None),
            "left" | "inline-start" => Ok(Float::Left),
            "right" | "inline-end" => Ok(Float::Right),
            _ => Err(format!("Invalid float: '{}'", s)),
        }
    }

    pub fn is_floating(&self) -> bool {
        !matches!(self, Float::None)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Clear {
    #[default]
    None,
    Left,
    Right,
    Both,
}

impl Clear {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Clear::None),
            "left" | "inline-start" => Ok(Clear::Left),
            "right" | "inline-end" => Ok(Clear::Right),
            "both" => Ok(Clear::Both),
            _ => Err(format!("Invalid clear: '{}'", s)),
        }
    }

    pub fn is_clearing(&self) -> bool {
        !matches!(self, Clear::None)
    }

    pub fn clears_left(&self) -> bool {
        matches!(self, Clear::Left | Clear::Both)
    }

    pub fn clears_right(&self) -> bool {
        matches!(self, Clear::Right | Clear::Both)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum VerticalAlign {
    #[default]
    Baseline,
    Top,
    Middle,
    Bottom,
    TextTop,
    TextBottom,
    Sub,
    Super,
    /// A resolved offset in px, positive raises the box.
    Length(f32),
    Percent(f32),
}

impl VerticalAlign {
    /// Values a relative/baseline container can express directly.
    pub fn is_relative_compatible(&self) -> bool {
        match self {
            VerticalAlign::Baseline
            | VerticalAlign::Top
            | VerticalAlign::Middle
            | VerticalAlign::Bottom => true,
            VerticalAlign::Length(v) | VerticalAlign::Percent(v) => *v >= 0.0,
            _ => false,
        }
    }

    pub fn is_baseline(&self) -> bool {
        matches!(self, VerticalAlign::Baseline)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum TextAlign {
    #[default]
    Start,
    Left,
    Right,
    Center,
    Justify,
    End,
}

impl TextAlign {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "start" | "-webkit-auto" => Ok(TextAlign::Start),
            "left" | "-webkit-left" => Ok(TextAlign::Left),
            "right" | "-webkit-right" => Ok(TextAlign::Right),
            "center" | "-webkit-center" => Ok(TextAlign::Center),
            "justify" => Ok(TextAlign::Justify),
            "end" => Ok(TextAlign::End),
            _ => Err(format!("Invalid text-align: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "ltr" => Ok(Direction::Ltr),
            "rtl" => Ok(Direction::Rtl),
            _ => Err(format!("Invalid direction: '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "visible" => Ok(Visibility::Visible),
            "hidden" => Ok(Visibility::Hidden),
            "collapse" => Ok(Visibility::Collapse),
            _ => Err(format!("Invalid visibility: '{}'", s)),
        }
    }
}
