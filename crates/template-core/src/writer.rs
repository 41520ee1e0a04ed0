//! Renders resolved pieces as indented view XML.

use crate::dialect::ViewDialect;
use crate::placeholder::Piece;
use quick_xml::escape::escape;
use weft_layout::NodeTree;
use weft_types::NodeId;

const INDENT: &str = "    ";

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

/// Writes a document. Attributes are read from the tree at this point, so
/// the output reflects deduplication and style references.
pub fn write_document(tree: &NodeTree, dialect: &dyn ViewDialect, pieces: &[Piece]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    let mut depth = 0usize;
    let mut root_written = false;
    for piece in pieces {
        match piece {
            Piece::Open(id) | Piece::SelfClose(id) => {
                let self_close = matches!(piece, Piece::SelfClose(_));
                write_start(&mut out, tree, dialect, *id, depth, !root_written, self_close);
                root_written = true;
                if !self_close {
                    depth += 1;
                }
            }
            Piece::Close(id) => {
                depth = depth.saturating_sub(1);
                if let Some(node) = tree.get(*id) {
                    indent(&mut out, depth);
                    out.push_str("</");
                    out.push_str(&dialect.element_tag(tree, node));
                    out.push_str(">\n");
                }
            }
            Piece::Raw(text) => {
                for line in text.lines() {
                    indent(&mut out, depth);
                    out.push_str(line);
                    out.push('\n');
                }
            }
            Piece::Slot(placeholder) => {
                indent(&mut out, depth);
                out.push_str(&placeholder.to_string());
                out.push('\n');
            }
        }
    }
    out
}

fn write_start(
    out: &mut String,
    tree: &NodeTree,
    dialect: &dyn ViewDialect,
    id: NodeId,
    depth: usize,
    is_root: bool,
    self_close: bool,
) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let mut attributes: Vec<(String, String)> = Vec::new();
    if is_root {
        attributes.extend(dialect.root_attributes());
    }
    if let Some(style) = &node.style_ref {
        attributes.push((
            dialect.style_attribute().to_string(),
            format!("@style/{}", style),
        ));
    }
    attributes.extend(node.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));

    indent(out, depth);
    out.push('<');
    out.push_str(&dialect.element_tag(tree, node));
    for (name, value) in &attributes {
        out.push('\n');
        indent(out, depth + 1);
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    out.push_str(if self_close { " />\n" } else { ">\n" });
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_layout::{AttributeSet, ContainerType, Node, NodeKind};
    use weft_types::ResourceName;
    use weft_values::ValueStore;

    struct PlainDialect;

    impl ViewDialect for PlainDialect {
        fn container_tag(&self, container: ContainerType) -> &str {
            match container {
                ContainerType::LinearVertical => "Column",
                _ => "Box",
            }
        }

        fn leaf_tag(&self, node: &Node) -> String {
            node.tag.to_uppercase()
        }

        fn root_attributes(&self) -> Vec<(String, String)> {
            vec![("xmlns:ui".into(), "urn:ui".into())]
        }

        fn style_attribute(&self) -> &str {
            "style"
        }

        fn finalize_attributes(&self, _: &NodeTree, _: NodeId, _: &mut ValueStore) -> AttributeSet {
            AttributeSet::new()
        }
    }

    #[test]
    fn test_document_is_indented_and_escaped() {
        let mut tree = NodeTree::new();
        let root = tree.alloc(NodeKind::Root, "body");
        let label = tree.alloc(NodeKind::Element, "p");
        tree.attach(root, label, Some(root)).unwrap();
        tree.set_render_parent(label, root).unwrap();
        tree.node_mut(root).unwrap().container = ContainerType::LinearVertical;
        let node = tree.node_mut(label).unwrap();
        node.attributes.insert("ui:text".into(), "a < b".into());
        node.style_ref = Some(ResourceName::new("P"));

        let xml = write_document(
            &tree,
            &PlainDialect,
            &[Piece::Open(root), Piece::SelfClose(label), Piece::Close(root)],
        );

        let expected = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<Column\n    xmlns:ui=\"urn:ui\">\n    <P\n        style=\"@style/P\"\n        ui:text=\"a &lt; b\" />\n</Column>\n";
        assert_eq!(xml, expected);
    }
}
