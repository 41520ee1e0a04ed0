mod common;

use common::fixtures::*;
use common::{TestResult, convert_snapshot, convert_snapshot_with, layout_of};
use std::collections::BTreeMap;
use std::fs;
use tempfile::tempdir;
use weft::{
    ConversionConfig, DedupConfig, Deduplicator, FilesystemEmitter, InMemoryEmitter, NodeId,
    crates::values::DedupMember,
};

fn repeated_lines(count: usize, style: &[(&str, &str)]) -> serde_json::Value {
    body((0..count).map(|i| paragraph(i as f32 * 40.0, "Hello", style)).collect())
}

#[test]
fn test_repeated_color_and_text_are_interned_once() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let output = convert_snapshot(snapshot(vec![("main", repeated_lines(10, &[("color", "#FF0000")]))]))?;

    assert_eq!(output.tables.colors, vec![("red".to_string(), "#FF0000".to_string())]);
    assert_eq!(output.tables.strings, vec![("hello".to_string(), "Hello".to_string())]);
    assert_eq!(layout_of(&output, "main").matches("@string/hello").count(), 10);
    Ok(())
}

#[test]
fn test_unnamed_color_gets_generated_name() -> TestResult {
    let output = convert_snapshot(snapshot(vec![("main", repeated_lines(2, &[("color", "#123456")]))]))?;

    assert_eq!(output.tables.colors.len(), 1);
    let (name, value) = &output.tables.colors[0];
    assert_eq!(value, "#123456");
    assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    Ok(())
}

#[test]
fn test_dedup_disabled_keeps_attributes_inline() -> TestResult {
    let config = ConversionConfig::from_json_str(r#"{ "dedup": { "enabled": false } }"#)?;
    let shared = [("font-size", "14px"), ("color", "#333333")];
    let output = convert_snapshot_with(snapshot(vec![("main", repeated_lines(4, &shared))]), config)?;
    let layout = layout_of(&output, "main");

    assert!(output.tables.styles.is_empty());
    assert!(!layout.contains("style=\"@style/"));
    assert_eq!(layout.matches("android:textColor").count(), 4);
    Ok(())
}

#[test]
fn test_conversion_is_deterministic() -> TestResult {
    let page = || {
        snapshot(vec![
            ("floats", floated_page()),
            ("main", repeated_lines(6, &[("font-family", "Roboto"), ("color", "#0000FF")])),
        ])
    };
    let first = convert_snapshot(page())?.files()?;
    let second = convert_snapshot(page())?.files()?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_deduplicator_is_pure() {
    let member = |raw: u32, color: &str| DedupMember {
        id: NodeId::new(raw),
        tag: "TextView".to_string(),
        attributes: BTreeMap::from([
            ("android:textColor".to_string(), color.to_string()),
            ("android:textSize".to_string(), "@dimen/dimen_14sp".to_string()),
            ("android:text".to_string(), format!("@string/line_{}", raw)),
        ]),
    };
    let members: Vec<DedupMember> = (1..=6)
        .map(|i| member(i, if i % 2 == 0 { "@color/red" } else { "@color/blue" }))
        .collect();

    let dedup = Deduplicator::new(DedupConfig::default());
    let first = dedup.run(&members);
    let second = dedup.run(&members);

    assert_eq!(first, second);
    assert!(!first.styles.is_empty());
    // Text is never promoted.
    assert!(
        first
            .styles
            .iter()
            .all(|s| s.attributes.iter().all(|(k, _)| k != "android:text"))
    );
}

#[test]
fn test_emit_writes_resource_tree() -> TestResult {
    let dir = tempdir()?;
    let output = convert_snapshot(snapshot(vec![("main", repeated_lines(3, &[("color", "#FF0000")]))]))?;

    let written = output.emit(&FilesystemEmitter::new(dir.path()))?;

    assert_eq!(written, output.files()?.len());
    let layout = fs::read_to_string(dir.path().join("res/layout/main.xml"))?;
    assert!(layout.starts_with("<?xml"));
    let strings = fs::read_to_string(dir.path().join("res/values/strings.xml"))?;
    assert!(strings.contains("name=\"hello\""));
    let colors = fs::read_to_string(dir.path().join("res/values/colors.xml"))?;
    assert!(colors.contains("#FF0000"));
    Ok(())
}

#[test]
fn test_custom_output_directories() -> TestResult {
    let config = ConversionConfig::from_json_str(
        r#"{ "layoutDir": "app/layout", "valuesDir": "app/values", "drawableDir": "app/drawable" }"#,
    )?;
    let output = convert_snapshot_with(snapshot(vec![("main", repeated_lines(1, &[]))]), config)?;
    let emitter = InMemoryEmitter::new();
    output.emit(&emitter)?;

    assert!(emitter.get("app/layout", "main.xml").is_some());
    assert!(emitter.get("app/values", "strings.xml").is_some());
    assert!(emitter.get("res/layout", "main.xml").is_none());
    Ok(())
}

#[test]
fn test_string_values_are_escaped() -> TestResult {
    let output = convert_snapshot(snapshot(vec![("main", body(vec![paragraph(0.0, "@home", &[])]))]))?;
    let emitter = InMemoryEmitter::new();
    output.emit(&emitter)?;

    // The table keeps the raw text; only the file form is escaped.
    assert!(output.tables.strings.iter().any(|(_, v)| v == "@home"));
    let strings = emitter.get("res/values", "strings.xml").unwrap_or_default();
    assert!(strings.contains(r"\@home"), "{}", strings);
    Ok(())
}
