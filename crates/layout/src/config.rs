use serde::{Deserialize, Serialize};

/// Tuning knobs for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// When a float band passes the single-axis tests, leading floats and the
    /// inline content after them share one horizontal group instead of each
    /// partition getting its own vertical slot.
    ///
    /// Defaults to `true`.
    pub float_overlap: bool,

    /// Slack in px for every geometric comparison (bands, widths, alignment).
    ///
    /// Defaults to `1.0`.
    pub tolerance_px: f32,

    /// An absolutely positioned box closer than this to its parent's content
    /// origin stays in page flow.
    ///
    /// Defaults to `1.0`.
    pub origin_tolerance_px: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            float_overlap: true,
            tolerance_px: 1.0,
            origin_tolerance_px: 1.0,
        }
    }
}
