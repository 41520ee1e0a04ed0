use crate::ValueError;
use std::collections::BTreeMap;
use weft_types::Color;

const BASIC: [(&str, &str); 16] = [
    ("aqua", "#00FFFF"),
    ("black", "#000000"),
    ("blue", "#0000FF"),
    ("fuchsia", "#FF00FF"),
    ("gray", "#808080"),
    ("green", "#008000"),
    ("lime", "#00FF00"),
    ("maroon", "#800000"),
    ("navy", "#000080"),
    ("olive", "#808000"),
    ("purple", "#800080"),
    ("red", "#FF0000"),
    ("silver", "#C0C0C0"),
    ("teal", "#008080"),
    ("white", "#FFFFFF"),
    ("yellow", "#FFFF00"),
];

/// Named reference colors. Interned colors borrow the name of their nearest
/// entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<(String, Color)>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::basic()
    }
}

impl Palette {
    /// The sixteen CSS basic colors.
    pub fn basic() -> Self {
        Self {
            entries: BASIC
                .iter()
                .filter_map(|(name, hex)| Color::parse(hex).ok().map(|c| (name.to_string(), c)))
                .collect(),
        }
    }

    pub fn basic_map() -> BTreeMap<String, String> {
        BASIC
            .iter()
            .map(|(name, hex)| (name.to_string(), hex.to_string()))
            .collect()
    }

    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, ValueError> {
        let entries = map
            .iter()
            .map(|(name, value)| {
                Color::parse(value)
                    .map(|c| (name.clone(), c))
                    .map_err(|reason| ValueError::InvalidPalette {
                        name: name.clone(),
                        reason,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Closest entry by RGB distance; the first entry wins a tie.
    pub fn nearest(&self, color: &Color) -> Option<(&str, Color)> {
        let mut best: Option<(&str, Color, u32)> = None;
        for (name, candidate) in &self.entries {
            let distance = candidate.distance_sq(color);
            if best.is_none_or(|(_, _, d)| distance < d) {
                best = Some((name, *candidate, distance));
            }
        }
        best.map(|(name, c, _)| (name, c))
    }
}
