//! Defines primitives for size values reported by the computed style.
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
#[derive(Default)]
pub enum Dimension {
    Px(f32),
    Percent(f32),
    #[default]
    Auto,
}

impl Hash for Dimension {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Dimension::Px(v) => {
                0u8.hash(state);
                v.to_bits().hash(state);
            }
            Dimension::Percent(v) => {
                1u8.hash(state);
                v.to_bits().hash(state);
            }
            Dimension::Auto => {
                2u8.hash(state);
            }
        }
    }
}

impl Eq for Dimension {}

impl Dimension {
    pub fn is_auto(&self) -> bool {
        matches!(self, Dimension::Auto)
    }

    pub fn percent(&self) -> Option<f32> {
        match self {
            Dimension::Percent(p) => Some(*p),
            _ => None,
        }
    }

    /// Resolves against a containing length; `Auto` has no resolved value.
    pub fn resolve(&self, base: f32) -> Option<f32> {
        match self {
            Dimension::Px(v) => Some(*v),
            Dimension::Percent(p) => Some(base * p / 100.0),
            Dimension::Auto => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(Dimension::Px(12.0).resolve(300.0), Some(12.0));
        assert_eq!(Dimension::Percent(50.0).resolve(300.0), Some(150.0));
        assert_eq!(Dimension::Auto.resolve(300.0), None);
    }

    #[test]
    fn test_percent_accessor() {
        assert_eq!(Dimension::Percent(25.0).percent(), Some(25.0));
        assert_eq!(Dimension::Px(25.0).percent(), None);
        assert!(Dimension::default().is_auto());
    }
}
