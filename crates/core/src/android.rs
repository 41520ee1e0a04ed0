//! The Android view dialect.
//!
//! Containers map onto the stock layouts and leaves onto the basic widgets.
//! Every literal goes through the [`ValueStore`], so the attributes written
//! here only ever reference `@string`, `@color`, `@dimen`, `@array` and
//! `@drawable` resources.

use log::warn;
use weft_layout::{AttributeSet, ContainerType, LayoutFlags, Node, NodeKind, NodeTree};
use weft_style::{Dimension, TextAlign};
use weft_template::ViewDialect;
use weft_types::{NodeId, Rect};
use weft_values::{DimenUnit, Drawable, Stroke, ValueStore, format_number};

pub const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";

/// Offsets below this many dp are not worth a margin attribute.
const MIN_OFFSET_DP: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AndroidDialect {
    density: f32,
    text_scale: f32,
}

impl Default for AndroidDialect {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl AndroidDialect {
    pub fn new(density: f32, text_scale: f32) -> Self {
        Self {
            density: if density > 0.0 { density } else { 1.0 },
            text_scale: if text_scale > 0.0 { text_scale } else { 1.0 },
        }
    }

    fn dp(&self, px: f32) -> f32 {
        (px / self.density * 10.0).round() / 10.0
    }

    fn dimen(&self, values: &mut ValueStore, px: f32) -> String {
        format!("@dimen/{}", values.dimension(self.dp(px), DimenUnit::Dp))
    }

    fn size_attributes(&self, node: &Node, parent: Option<&Node>, values: &mut ValueStore, out: &mut AttributeSet) {
        let top_level = matches!(node.kind, NodeKind::Root | NodeKind::Host) || parent.is_none();
        let in_horizontal = parent.is_some_and(|p| p.container == ContainerType::LinearHorizontal);
        let fixed = node.is_image() || node.kind == NodeKind::Element && node.container == ContainerType::None && !node.is_text();

        let width = if top_level || node.flags.contains(LayoutFlags::MATCH_WIDTH) {
            "match_parent".to_string()
        } else if node.flags.contains(LayoutFlags::PERCENT_WIDTH) && in_horizontal {
            if let Some(percent) = node.style.width().percent() {
                out.insert("android:layout_weight".into(), format_number(percent));
            }
            "0dp".to_string()
        } else if matches!(node.style.width(), Dimension::Px(_)) || fixed {
            self.dimen(values, node.bounds.width)
        } else {
            "wrap_content".to_string()
        };
        out.insert("android:layout_width".into(), width);

        let height = if top_level {
            "match_parent".to_string()
        } else if matches!(node.style.height(), Dimension::Px(_)) || fixed {
            self.dimen(values, node.bounds.height)
        } else {
            "wrap_content".to_string()
        };
        out.insert("android:layout_height".into(), height);
    }

    /// Position attributes a member needs from its parent's container kind.
    fn placement_attributes(&self, tree: &NodeTree, node: &Node, parent: &Node, values: &mut ValueStore, out: &mut AttributeSet) {
        match parent.container {
            ContainerType::LinearVertical => {
                if node.flags.contains(LayoutFlags::CENTER_HORIZONTAL) {
                    out.insert("android:layout_gravity".into(), "center_horizontal".into());
                } else if node.flags.contains(LayoutFlags::ALIGN_END) {
                    out.insert("android:layout_gravity".into(), "end".into());
                }
            }
            ContainerType::Relative => {
                let members = tree.render_children(parent.id).unwrap_or_default();
                let anchor = members
                    .iter()
                    .copied()
                    .find(|m| tree.get(*m).is_some_and(|n| n.flags.contains(LayoutFlags::BASELINE_ANCHOR)));
                if let Some(index) = members.iter().position(|m| *m == node.id) {
                    if let Some(previous) = index.checked_sub(1).and_then(|i| members.get(i)) {
                        if let Some(name) = tree.get(*previous).and_then(|p| view_name(tree, p)) {
                            out.insert("android:layout_toEndOf".into(), format!("@id/{}", name));
                        }
                    }
                }
                if let Some(anchor) = anchor.filter(|a| *a != node.id) {
                    if let Some(name) = tree.get(anchor).and_then(|a| view_name(tree, a)) {
                        out.insert("android:layout_alignBaseline".into(), format!("@id/{}", name));
                    }
                }
            }
            ContainerType::Frame | ContainerType::None => {
                let origin = match parent.kind {
                    NodeKind::Group | NodeKind::Host => parent.bounds,
                    _ => parent.content_box(),
                };
                self.offset_margins(node.bounds, origin, values, out);
            }
            ContainerType::LinearHorizontal | ContainerType::Grid => {}
        }
    }

    fn offset_margins(&self, bounds: Rect, origin: Rect, values: &mut ValueStore, out: &mut AttributeSet) {
        let start = self.dp(bounds.x - origin.x);
        let top = self.dp(bounds.y - origin.y);
        if start.abs() >= MIN_OFFSET_DP {
            out.insert(
                "android:layout_marginStart".into(),
                format!("@dimen/{}", values.dimension(start, DimenUnit::Dp)),
            );
        }
        if top.abs() >= MIN_OFFSET_DP {
            out.insert(
                "android:layout_marginTop".into(),
                format!("@dimen/{}", values.dimension(top, DimenUnit::Dp)),
            );
        }
    }

    fn text_attributes(&self, node: &Node, values: &mut ValueStore, out: &mut AttributeSet) {
        let style = &node.style;
        if let Some(color) = style.color() {
            out.insert("android:textColor".into(), format!("@color/{}", values.color(color)));
        }
        if let Some(size) = style.font_size() {
            let sp = (size / self.density * self.text_scale * 10.0).round() / 10.0;
            out.insert(
                "android:textSize".into(),
                format!("@dimen/{}", values.dimension(sp, DimenUnit::Sp)),
            );
        }
        if let Some(family) = style.font_family() {
            out.insert("android:fontFamily".into(), format!("@string/{}", values.font(family)));
        }
        let bold = style.font_weight().is_bold();
        let italic = style.font_style().is_slanted();
        let text_style = match (bold, italic) {
            (true, true) => Some("bold|italic"),
            (true, false) => Some("bold"),
            (false, true) => Some("italic"),
            (false, false) => None,
        };
        if let Some(text_style) = text_style {
            out.insert("android:textStyle".into(), text_style.into());
        }
        match style.text_align() {
            TextAlign::Center => {
                out.insert("android:gravity".into(), "center_horizontal".into());
            }
            TextAlign::Right | TextAlign::End => {
                out.insert("android:gravity".into(), "end".into());
            }
            _ => {}
        }
    }

    fn background_attribute(&self, node: &Node, values: &mut ValueStore, out: &mut AttributeSet) {
        let style = &node.style;
        let border_width = node.border.top.max(node.border.right).max(node.border.bottom).max(node.border.left);
        let stroke = style
            .border_color()
            .filter(|_| border_width > 0.0)
            .map(|color| Stroke {
                width_dp: self.dp(border_width),
                color,
            });
        let radius = style.border_radius();

        let drawable = if let Some(gradient) = style.background_gradient() {
            Some(Drawable::Gradient(gradient))
        } else if let Some(url) = style.background_image_url() {
            Some(Drawable::Image(url))
        } else if stroke.is_some() || radius > 0.0 {
            Some(Drawable::Bordered {
                fill: style.background_color(),
                stroke,
                radius_dp: self.dp(radius),
            })
        } else {
            None
        };

        match drawable {
            Some(drawable) => match values.drawable(drawable) {
                Ok(name) => {
                    out.insert("android:background".into(), format!("@drawable/{}", name));
                }
                Err(e) => warn!("Dropping background of node {}: {}", node.id, e),
            },
            None => {
                if let Some(color) = style.background_color() {
                    out.insert("android:background".into(), format!("@color/{}", values.color(color)));
                }
            }
        }
    }

    fn padding_attributes(&self, node: &Node, values: &mut ValueStore, out: &mut AttributeSet) {
        let padding = node.padding;
        if padding.is_zero() {
            return;
        }
        if padding.is_uniform() {
            out.insert("android:padding".into(), self.dimen(values, padding.top));
            return;
        }
        for (name, px) in [
            ("android:paddingTop", padding.top),
            ("android:paddingEnd", padding.right),
            ("android:paddingBottom", padding.bottom),
            ("android:paddingStart", padding.left),
        ] {
            if px > 0.0 {
                out.insert(name.into(), self.dimen(values, px));
            }
        }
    }
}

/// The id a node is declared and referenced with. Source ids win; nodes
/// that others point at (relative siblings, label targets) get one made up
/// from their arena id.
fn view_name(tree: &NodeTree, node: &Node) -> Option<String> {
    if let Some(source) = node.source_attribute("id") {
        let name = slug::slugify(source).replace('-', "_");
        if !name.is_empty() {
            return Some(if name.starts_with(|c: char| c.is_ascii_digit()) {
                format!("id_{}", name)
            } else {
                name
            });
        }
    }
    let in_relative = node
        .render_parent()
        .and_then(|p| tree.get(p))
        .is_some_and(|p| p.container == ContainerType::Relative);
    let is_label_target = tree.iter().any(|n| n.companion == Some(node.id));
    (in_relative || is_label_target).then(|| format!("view_{}", node.id.raw()))
}

impl ViewDialect for AndroidDialect {
    fn container_tag(&self, container: ContainerType) -> &str {
        match container {
            ContainerType::LinearHorizontal | ContainerType::LinearVertical => "LinearLayout",
            ContainerType::Relative => "RelativeLayout",
            ContainerType::Grid => "GridLayout",
            ContainerType::Frame | ContainerType::None => "FrameLayout",
        }
    }

    fn leaf_tag(&self, node: &Node) -> String {
        let input_type = node.source_attribute("type").unwrap_or("text").to_ascii_lowercase();
        let tag = match node.tag.as_str() {
            "img" | "svg" | "picture" => "ImageView",
            "input" => match input_type.as_str() {
                "checkbox" => "CheckBox",
                "radio" => "RadioButton",
                "submit" | "button" | "reset" => "Button",
                _ => "EditText",
            },
            "textarea" => "EditText",
            "button" => "Button",
            "select" => "Spinner",
            _ if node.is_image() => "ImageView",
            _ if node.is_text() => "TextView",
            _ => "View",
        };
        tag.to_string()
    }

    fn root_attributes(&self) -> Vec<(String, String)> {
        vec![("xmlns:android".to_string(), ANDROID_NS.to_string())]
    }

    fn style_attribute(&self) -> &str {
        "style"
    }

    fn finalize_attributes(&self, tree: &NodeTree, id: NodeId, values: &mut ValueStore) -> AttributeSet {
        let mut out = AttributeSet::new();
        let Some(node) = tree.get(id) else {
            return out;
        };
        let parent = node.render_parent().and_then(|p| tree.get(p));

        if let Some(name) = view_name(tree, node) {
            out.insert("android:id".into(), format!("@+id/{}", name));
        }
        self.size_attributes(node, parent, values, &mut out);
        if let Some(parent) = parent {
            self.placement_attributes(tree, node, parent, values, &mut out);
        }

        match node.container {
            ContainerType::LinearHorizontal => {
                out.insert("android:orientation".into(), "horizontal".into());
            }
            ContainerType::LinearVertical => {
                out.insert("android:orientation".into(), "vertical".into());
            }
            ContainerType::Grid => {
                if let Some(grid) = node.grid {
                    out.insert("android:columnCount".into(), grid.columns.to_string());
                }
            }
            _ => {}
        }

        let is_leaf = tree.render_children(id).map(|c| c.is_empty()).unwrap_or(true);
        if is_leaf && node.kind != NodeKind::Group {
            if let Some(text) = &node.text {
                out.insert("android:text".into(), format!("@string/{}", values.string(text)));
            } else if let Some(value) = node.source_attribute("value").filter(|v| !v.is_empty()) {
                out.insert("android:text".into(), format!("@string/{}", values.string(value)));
            }
            if let Some(hint) = node.source_attribute("placeholder").filter(|v| !v.is_empty()) {
                out.insert("android:hint".into(), format!("@string/{}", values.string(hint)));
            }
            if node.is_text() || matches!(node.tag.as_str(), "input" | "textarea" | "button") {
                self.text_attributes(node, values, &mut out);
            }
            if let Some(src) = &node.image_src {
                match values.drawable(Drawable::Image(src.clone())) {
                    Ok(name) => {
                        out.insert("android:src".into(), format!("@drawable/{}", name));
                    }
                    Err(e) => warn!("Dropping image of node {}: {}", id, e),
                }
                if let Some(alt) = node.source_attribute("alt").filter(|a| !a.is_empty()) {
                    out.insert(
                        "android:contentDescription".into(),
                        format!("@string/{}", values.string(alt)),
                    );
                }
            }
            if !node.entries.is_empty() {
                let hint = node.source_attribute("name").or(node.source_attribute("id")).unwrap_or(node.tag.as_str());
                out.insert(
                    "android:entries".into(),
                    format!("@array/{}", values.string_array(hint, &node.entries)),
                );
            }
        }

        if node.kind != NodeKind::Text && node.kind != NodeKind::Group {
            self.background_attribute(node, values, &mut out);
            self.padding_attributes(node, values, &mut out);
        }
        if let Some(target) = node.companion.and_then(|c| tree.get(c)) {
            if let Some(name) = view_name(tree, target) {
                out.insert("android:labelFor".into(), format!("@id/{}", name));
            }
        }
        if !node.visible {
            out.insert("android:visibility".into(), "invisible".into());
        }
        let opacity = node.style.opacity();
        if opacity < 1.0 {
            out.insert("android:alpha".into(), format_number(opacity));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(parent_container: ContainerType) -> (NodeTree, NodeId, NodeId) {
        let mut tree = NodeTree::new();
        let root = tree.alloc(NodeKind::Root, "body");
        tree.node_mut(root).unwrap().bounds = Rect::new(0.0, 0.0, 400.0, 800.0);
        tree.node_mut(root).unwrap().container = parent_container;
        let child = tree.alloc(NodeKind::Element, "p");
        tree.attach(root, child, Some(root)).unwrap();
        tree.set_render_parent(child, root).unwrap();
        (tree, root, child)
    }

    #[test]
    fn test_root_fills_parent_and_declares_orientation() {
        let (tree, root, _) = tree_with(ContainerType::LinearVertical);
        let mut values = ValueStore::default();
        let attrs = AndroidDialect::default().finalize_attributes(&tree, root, &mut values);
        assert_eq!(attrs["android:layout_width"], "match_parent");
        assert_eq!(attrs["android:layout_height"], "match_parent");
        assert_eq!(attrs["android:orientation"], "vertical");
    }

    #[test]
    fn test_text_leaf_interns_every_literal() {
        let (mut tree, _, child) = tree_with(ContainerType::LinearVertical);
        {
            let node = tree.node_mut(child).unwrap();
            node.text = Some("Hello world".into());
            node.bounds = Rect::new(0.0, 0.0, 400.0, 20.0);
            node.flags |= LayoutFlags::MATCH_WIDTH;
            node.style.set("color", "#FF0000");
            node.style.set("font-size", "32px");
            node.style.set("font-family", "Roboto, sans-serif");
            node.style.set("font-weight", "bold");
        }
        let mut values = ValueStore::default();
        let attrs = AndroidDialect::new(2.0, 1.0).finalize_attributes(&tree, child, &mut values);
        assert_eq!(attrs["android:layout_width"], "match_parent");
        assert_eq!(attrs["android:layout_height"], "wrap_content");
        assert_eq!(attrs["android:text"], "@string/hello_world");
        assert_eq!(attrs["android:textColor"], "@color/red");
        assert_eq!(attrs["android:textSize"], "@dimen/dimen_16sp");
        assert_eq!(attrs["android:fontFamily"], "@string/font_roboto");
        assert_eq!(attrs["android:textStyle"], "bold");
    }

    #[test]
    fn test_percent_width_becomes_weight() {
        let (mut tree, _, child) = tree_with(ContainerType::LinearHorizontal);
        {
            let node = tree.node_mut(child).unwrap();
            node.text = Some("Half".into());
            node.style.set("width", "50%");
            node.flags |= LayoutFlags::PERCENT_WIDTH;
        }
        let mut values = ValueStore::default();
        let attrs = AndroidDialect::default().finalize_attributes(&tree, child, &mut values);
        assert_eq!(attrs["android:layout_width"], "0dp");
        assert_eq!(attrs["android:layout_weight"], "50");
    }

    #[test]
    fn test_frame_member_is_offset_by_margins() {
        let (mut tree, _, child) = tree_with(ContainerType::Frame);
        {
            let node = tree.node_mut(child).unwrap();
            node.text = Some("Badge".into());
            node.bounds = Rect::new(40.0, 20.0, 50.0, 20.0);
        }
        let mut values = ValueStore::default();
        let attrs = AndroidDialect::default().finalize_attributes(&tree, child, &mut values);
        assert_eq!(attrs["android:layout_marginStart"], "@dimen/dimen_40dp");
        assert_eq!(attrs["android:layout_marginTop"], "@dimen/dimen_20dp");
    }

    #[test]
    fn test_bordered_background_becomes_drawable() {
        let (mut tree, _, child) = tree_with(ContainerType::LinearVertical);
        {
            let node = tree.node_mut(child).unwrap();
            node.border = weft_types::Edges::all(2.0);
            node.style.set("border-color", "#000000");
            node.style.set("background-color", "#FFFFFF");
        }
        let mut values = ValueStore::default();
        let attrs = AndroidDialect::default().finalize_attributes(&tree, child, &mut values);
        assert_eq!(attrs["android:background"], "@drawable/shape");
        assert_eq!(values.drawables().len(), 1);
    }

    #[test]
    fn test_relative_members_chain_on_anchor() {
        let (mut tree, root, first) = tree_with(ContainerType::Relative);
        let second = tree.alloc(NodeKind::Element, "span");
        tree.attach(root, second, Some(root)).unwrap();
        tree.set_render_parent(second, root).unwrap();
        tree.node_mut(first).unwrap().flags |= LayoutFlags::BASELINE_ANCHOR;
        tree.node_mut(second)
            .unwrap()
            .source_attributes
            .insert("id".into(), "price-tag".into());
        let mut values = ValueStore::default();
        let dialect = AndroidDialect::default();
        let attrs = dialect.finalize_attributes(&tree, second, &mut values);
        let anchor = format!("@id/view_{}", first.raw());
        assert_eq!(attrs["android:id"], "@+id/price_tag");
        assert_eq!(attrs["android:layout_toEndOf"], anchor);
        assert_eq!(attrs["android:layout_alignBaseline"], anchor);
    }

    #[test]
    fn test_leaf_tags() {
        let dialect = AndroidDialect::default();
        let mut tree = NodeTree::new();
        let input = tree.alloc(NodeKind::Element, "input");
        tree.node_mut(input)
            .unwrap()
            .source_attributes
            .insert("type".into(), "checkbox".into());
        assert_eq!(dialect.leaf_tag(tree.node(input).unwrap()), "CheckBox");
        let select = tree.alloc(NodeKind::Element, "select");
        assert_eq!(dialect.leaf_tag(tree.node(select).unwrap()), "Spinner");
        let text = tree.alloc(NodeKind::Text, "#text");
        tree.node_mut(text).unwrap().text = Some("hi".into());
        assert_eq!(dialect.leaf_tag(tree.node(text).unwrap()), "TextView");
    }
}
