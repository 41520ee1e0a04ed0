use serde_json::{Value, json};

/// One measured element with inline style pairs.
pub fn element(tag: &str, bounds: (f32, f32, f32, f32), style: &[(&str, &str)], children: Vec<Value>) -> Value {
    let style: serde_json::Map<String, Value> = style
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    json!({
        "tag": tag,
        "bounds": { "x": bounds.0, "y": bounds.1, "width": bounds.2, "height": bounds.3 },
        "style": style,
        "children": children,
    })
}

/// A full-width paragraph at `y` holding `text`.
pub fn paragraph(y: f32, text: &str, style: &[(&str, &str)]) -> Value {
    let mut pairs = vec![("display", "block")];
    pairs.extend_from_slice(style);
    let mut value = element("p", (0.0, y, 360.0, 30.0), &pairs, vec![]);
    value["text"] = Value::String(text.to_string());
    value
}

pub fn with_text(mut value: Value, text: &str) -> Value {
    value["text"] = Value::String(text.to_string());
    value
}

pub fn with_attribute(mut value: Value, name: &str, attr: &str) -> Value {
    value["attributes"][name] = Value::String(attr.to_string());
    value
}

/// A 360x640 block body.
pub fn body(children: Vec<Value>) -> Value {
    element("body", (0.0, 0.0, 360.0, 640.0), &[("display", "block")], children)
}

pub fn snapshot(documents: Vec<(&str, Value)>) -> Value {
    let documents: Vec<Value> = documents
        .into_iter()
        .map(|(name, root)| json!({ "name": name, "root": root }))
        .collect();
    json!({ "documents": documents })
}

/// A page with a left float, a right float and a clearing footer.
pub fn floated_page() -> Value {
    body(vec![
        with_text(
            element("div", (0.0, 0.0, 100.0, 50.0), &[("display", "block"), ("float", "left")], vec![]),
            "Left",
        ),
        with_text(
            element("div", (260.0, 0.0, 100.0, 50.0), &[("display", "block"), ("float", "right")], vec![]),
            "Right",
        ),
        with_text(
            element("footer", (0.0, 50.0, 360.0, 20.0), &[("display", "block"), ("clear", "both")], vec![]),
            "Footer",
        ),
    ])
}
