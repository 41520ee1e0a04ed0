use serde::{Deserialize, Serialize};

/// Comparisons between measured boxes use this slack unless a caller
/// supplies its own tolerance.
pub const EPSILON: f32 = 0.01;

/// An axis-aligned box in document pixels. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.width.abs() < EPSILON && self.height.abs() < EPSILON
    }
}

/// Per-side thickness of a margin, border or padding ring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub right: f32,
    #[serde(default)]
    pub bottom: f32,
    #[serde(default)]
    pub left: f32,
}

impl Edges {
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        self.top.abs() < EPSILON
            && self.right.abs() < EPSILON
            && self.bottom.abs() < EPSILON
            && self.left.abs() < EPSILON
    }

    /// True when every side carries the same thickness.
    pub fn is_uniform(&self) -> bool {
        (self.top - self.right).abs() < EPSILON
            && (self.top - self.bottom).abs() < EPSILON
            && (self.top - self.left).abs() < EPSILON
    }
}

impl std::ops::Add for Edges {
    type Output = Edges;

    fn add(self, rhs: Edges) -> Edges {
        Edges {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= EPSILON || self.height <= EPSILON
    }

    /// Grows the box outward by `edges` (border box -> margin box).
    pub fn expand(&self, edges: &Edges) -> Rect {
        Rect {
            x: self.x - edges.left,
            y: self.y - edges.top,
            width: self.width + edges.horizontal(),
            height: self.height + edges.vertical(),
        }
    }

    /// Shrinks the box inward by `edges`, never below zero size.
    pub fn contract(&self, edges: &Edges) -> Rect {
        Rect {
            x: self.x + edges.left,
            y: self.y + edges.top,
            width: (self.width - edges.horizontal()).max(0.0),
            height: (self.height - edges.vertical()).max(0.0),
        }
    }

    /// Smallest box enclosing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// True if the two boxes share a horizontal band of positive height.
    pub fn overlaps_vertically(&self, other: &Rect, tolerance: f32) -> bool {
        self.y < other.bottom() - tolerance && other.y < self.bottom() - tolerance
    }

    /// True if the two boxes share a vertical band of positive width.
    pub fn overlaps_horizontally(&self, other: &Rect, tolerance: f32) -> bool {
        self.x < other.right() - tolerance && other.x < self.right() - tolerance
    }

    pub fn intersects(&self, other: &Rect, tolerance: f32) -> bool {
        self.overlaps_vertically(other, tolerance) && self.overlaps_horizontally(other, tolerance)
    }
}

/// Union of every rect in the iterator, or `None` for an empty input.
pub fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
    rects.into_iter().fold(None, |acc: Option<Rect>, r| match acc {
        Some(a) => Some(a.union(r)),
        None => Some(*r),
    })
}
