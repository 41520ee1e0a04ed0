use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use weft_layout::LayoutConfig;
use weft_values::{DedupConfig, Palette, ValueConfig, ValueStore};

/// Everything a conversion run can be tuned with. Every field has a default,
/// so a partial JSON document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionConfig {
    pub layout: LayoutConfig,

    /// Document pixels per density-independent pixel.
    ///
    /// Defaults to `1.0`.
    pub density: f32,

    /// Multiplier applied when text sizes become scale-independent pixels.
    ///
    /// Defaults to `1.0`.
    pub text_scale: f32,

    /// Color names used for interning, name to hex value. Defaults to the
    /// sixteen basic CSS colors.
    pub palette: BTreeMap<String, String>,

    pub values: ValueConfig,
    pub dedup: DedupConfig,

    pub layout_dir: String,
    pub values_dir: String,
    pub drawable_dir: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            density: 1.0,
            text_scale: 1.0,
            palette: Palette::basic_map(),
            values: ValueConfig::default(),
            dedup: DedupConfig::default(),
            layout_dir: "res/layout".to_string(),
            values_dir: "res/values".to_string(),
            drawable_dir: "res/drawable".to_string(),
        }
    }
}

impl ConversionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        let config: ConversionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(PipelineError::Config(format!(
                "density must be a positive number, got {}",
                self.density
            )));
        }
        if !(self.text_scale.is_finite() && self.text_scale > 0.0) {
            return Err(PipelineError::Config(format!(
                "textScale must be a positive number, got {}",
                self.text_scale
            )));
        }
        Palette::from_map(&self.palette)?;
        Ok(())
    }

    /// A fresh value store for one run.
    pub fn value_store(&self) -> Result<ValueStore, PipelineError> {
        let palette = Palette::from_map(&self.palette)?;
        Ok(ValueStore::new(self.values.clone(), palette))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ConversionConfig::from_json_str(
            r#"{ "density": 2.0, "layout": { "floatOverlap": false } }"#,
        )
        .unwrap();
        assert_eq!(config.density, 2.0);
        assert!(!config.layout.float_overlap);
        assert_eq!(config.text_scale, 1.0);
        assert_eq!(config.layout_dir, "res/layout");
        assert!(config.dedup.enabled);
        assert_eq!(config.palette.len(), 16);
    }

    #[test]
    fn test_rejects_non_positive_density() {
        let err = ConversionConfig::from_json_str(r#"{ "density": 0 }"#).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_palette_entry() {
        let err = ConversionConfig::from_json_str(r#"{ "palette": { "brand": "not-a-color" } }"#)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Value(_)));
    }
}
