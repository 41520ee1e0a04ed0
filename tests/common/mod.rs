pub mod fixtures;

use weft::{ConversionConfig, ConversionOutput, Converter, PipelineError, SnapshotProvider};
use serde_json::Value;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Converts a snapshot value with the default configuration.
pub fn convert_snapshot(snapshot: Value) -> Result<ConversionOutput, PipelineError> {
    convert_snapshot_with(snapshot, ConversionConfig::default())
}

pub fn convert_snapshot_with(
    snapshot: Value,
    config: ConversionConfig,
) -> Result<ConversionOutput, PipelineError> {
    let provider = SnapshotProvider::from_value(snapshot).map_err(|e| PipelineError::Config(e.to_string()))?;
    Converter::builder()
        .with_config(config)
        .build()?
        .convert_blocking(&provider)
}

/// Layout XML of the named document, or an empty string.
pub fn layout_of<'a>(output: &'a ConversionOutput, name: &str) -> &'a str {
    output
        .document(name)
        .map(|d| d.content.as_str())
        .unwrap_or_default()
}

#[macro_export]
macro_rules! assert_layout_contains {
    ($layout:expr, $needle:expr) => {
        assert!(
            $layout.contains($needle),
            "expected layout to contain {:?}\n{}",
            $needle,
            $layout
        )
    };
}
