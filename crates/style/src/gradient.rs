use serde::{Deserialize, Serialize};
use weft_types::Color;

/// A resolved `linear-gradient(...)` background reduced to what a shape
/// drawable can express: a direction and up to three color stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// CSS angle in degrees: 0 points up, 90 points right, 180 (the default) points down.
    pub angle: f32,
    pub start: Color,
    pub center: Option<Color>,
    pub end: Color,
}

impl Gradient {
    pub fn new(angle: f32, stops: &[Color]) -> Option<Self> {
        let (first, rest) = stops.split_first()?;
        let last = rest.last()?;
        let center = if rest.len() >= 2 {
            rest.get(rest.len() / 2 - usize::from(rest.len() % 2 == 0))
                .copied()
        } else {
            None
        };
        Some(Self {
            angle: angle.rem_euclid(360.0),
            start: *first,
            center,
            end: *last,
        })
    }
}
