//! Builds the node arena from a box-model provider.
//!
//! Each element is measured exactly once. Elements the provider cannot
//! measure, and `display: none` subtrees, become excluded nodes so later
//! passes can still report them. After the walk a few structural rewrites
//! run: text collapse, `select` options and `label` companions.

use crate::LayoutError;
use crate::flags::LayoutFlags;
use crate::tree::{NodeKind, NodeTree};
use log::{debug, warn};
use std::collections::HashSet;
use weft_style::{ComputedStyle, Display, StyleParseError, Visibility};
use weft_traits::{BoxMeasure, BoxModelProvider, ProviderError};
use weft_types::{ElementHandle, NodeId};

const TEXT_TAG: &str = "#text";

#[derive(Debug, Default)]
pub struct IngestReport {
    pub root: Option<NodeId>,
    pub node_count: usize,
    /// Elements that could not be measured and were hidden.
    pub unmeasured: Vec<(ElementHandle, ProviderError)>,
    /// Style problems seen for the first time during this run.
    pub style_errors: Vec<StyleParseError>,
}

/// Walks provider documents into a [`NodeTree`]. Style warnings are issued
/// once per property name for the lifetime of the ingestor.
pub struct Ingestor<'a> {
    provider: &'a dyn BoxModelProvider,
    warned_properties: HashSet<String>,
}

impl<'a> Ingestor<'a> {
    pub fn new(provider: &'a dyn BoxModelProvider) -> Self {
        Self {
            provider,
            warned_properties: HashSet::new(),
        }
    }

    pub fn ingest(
        &mut self,
        tree: &mut NodeTree,
        element: ElementHandle,
    ) -> Result<IngestReport, LayoutError> {
        let mut report = IngestReport::default();
        let measure = self
            .provider
            .measure(element)
            .map_err(|e| LayoutError::RootUnmeasurable(element, e))?;

        let display = ComputedStyle::from_map(measure.style.clone()).display();
        if matches!(display, Display::None | Display::Contents) {
            warn!("Root {} has display {:?} and generates no layout", element, display);
            return Ok(report);
        }

        let before = tree.len();
        let root = tree.alloc(NodeKind::Root, measure.tag.clone());
        self.fill(tree, root, element, measure, &mut report)?;

        let mut visited = HashSet::from([element]);
        self.walk(tree, root, root, element, &mut visited, &mut report)?;

        collapse_text(tree, root)?;
        gather_options(tree, root)?;
        bind_companions(tree, root)?;

        report.root = Some(root);
        report.node_count = tree.len() - before;
        debug!(
            "Ingested {} node(s) under root {} ({} unmeasured)",
            report.node_count,
            root,
            report.unmeasured.len()
        );
        Ok(report)
    }

    fn walk(
        &mut self,
        tree: &mut NodeTree,
        parent: NodeId,
        layout_parent: NodeId,
        element: ElementHandle,
        visited: &mut HashSet<ElementHandle>,
        report: &mut IngestReport,
    ) -> Result<(), LayoutError> {
        for child in self.provider.children(element) {
            if !visited.insert(child) {
                warn!("Element {} appears twice in the provider tree; skipping", child);
                continue;
            }
            let measure = match self.provider.measure(child) {
                Ok(m) => m,
                Err(e) => {
                    warn!("Hiding {}: {}", child, e);
                    let id = tree.alloc(NodeKind::Element, "");
                    tree.attach(parent, id, None)?;
                    let node = tree.node_mut(id)?;
                    node.element = Some(child);
                    node.excluded = true;
                    report.unmeasured.push((child, e));
                    continue;
                }
            };

            let is_text = measure.tag == TEXT_TAG || (measure.tag.is_empty() && measure.text_content.is_some());
            if is_text {
                let text = normalize_text(measure.text_content.as_deref().unwrap_or(""));
                if text.is_empty() {
                    continue;
                }
                let id = tree.alloc(NodeKind::Text, TEXT_TAG);
                tree.attach(parent, id, Some(layout_parent))?;
                let node = tree.node_mut(id)?;
                node.element = Some(child);
                node.bounds = measure.bounds;
                node.text = Some(text);
                node.style = ComputedStyle::from_map(measure.style);
                continue;
            }

            let id = tree.alloc(NodeKind::Element, measure.tag.to_ascii_lowercase());
            let display = ComputedStyle::from_map(measure.style.clone()).display();
            let joins_run = display != Display::Contents && display != Display::None;
            tree.attach(parent, id, joins_run.then_some(layout_parent))?;
            self.fill(tree, id, child, measure, report)?;

            match display {
                Display::None => {
                    tree.node_mut(id)?.excluded = true;
                }
                Display::Contents => {
                    // The wrapper vanishes; its children join our run.
                    tree.node_mut(id)?.excluded = true;
                    self.walk(tree, id, layout_parent, child, visited, report)?;
                }
                _ => self.walk(tree, id, id, child, visited, report)?,
            }
        }
        Ok(())
    }

    fn fill(
        &mut self,
        tree: &mut NodeTree,
        id: NodeId,
        element: ElementHandle,
        measure: BoxMeasure,
        report: &mut IngestReport,
    ) -> Result<(), LayoutError> {
        let mut style = ComputedStyle::from_map(measure.style);
        self.sanitize(&mut style, report);
        let hidden = style.visibility() != Visibility::Visible;
        let image_src = measure.image_src.or_else(|| {
            (measure.tag.eq_ignore_ascii_case("img"))
                .then(|| measure.attributes.get("src").cloned())
                .flatten()
        });

        let node = tree.node_mut(id)?;
        node.element = Some(element);
        node.bounds = measure.bounds;
        node.margin = measure.margin;
        node.border = measure.border;
        node.padding = measure.padding;
        node.style = style;
        node.source_attributes = measure.attributes;
        node.text = measure
            .text_content
            .map(|t| normalize_text(&t))
            .filter(|t| !t.is_empty());
        node.image_src = image_src;
        if hidden {
            node.visible = false;
            node.flags |= LayoutFlags::HIDDEN;
        }
        Ok(())
    }

    fn sanitize(&mut self, style: &mut ComputedStyle, report: &mut IngestReport) {
        for error in style.sanitize() {
            let property = match &error {
                StyleParseError::InvalidValue { property, .. } => property.clone(),
                StyleParseError::Parse(msg) => msg.clone(),
            };
            if self.warned_properties.insert(property) {
                warn!("Skipping malformed style: {}", error);
                report.style_errors.push(error);
            }
        }
    }
}

/// Collapses runs of whitespace the way inline formatting does.
fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// An element whose whole run is a single text node absorbs the text.
fn collapse_text(tree: &mut NodeTree, root: NodeId) -> Result<(), LayoutError> {
    for id in tree.layout_subtree(root)? {
        let node = tree.node(id)?;
        let [only] = node.layout_children.as_slice() else {
            continue;
        };
        let only = *only;
        let child = tree.node(only)?;
        if child.kind != NodeKind::Text || node.kind == NodeKind::Text {
            continue;
        }
        let text = child.text.clone();
        let parent = tree.node_mut(id)?;
        parent.text = text;
        parent.layout_children.clear();
        tree.node_mut(only)?.excluded = true;
    }
    Ok(())
}

/// `option` children of a `select` become its entry list.
fn gather_options(tree: &mut NodeTree, root: NodeId) -> Result<(), LayoutError> {
    for id in tree.layout_subtree(root)? {
        if tree.node(id)?.tag != "select" {
            continue;
        }
        let mut entries = Vec::new();
        for child in tree.node(id)?.children.clone() {
            let option = tree.node_mut(child)?;
            if option.tag == "option" || option.tag == "optgroup" {
                entries.extend(option.text.clone());
                option.excluded = true;
            }
        }
        let select = tree.node_mut(id)?;
        select.entries = entries;
        select.layout_children.clear();
    }
    Ok(())
}

/// `<label for="x">` pairs with the element whose id is `x`.
fn bind_companions(tree: &mut NodeTree, root: NodeId) -> Result<(), LayoutError> {
    let labels: Vec<(NodeId, String)> = tree
        .layout_subtree(root)?
        .into_iter()
        .filter_map(|id| tree.get(id))
        .filter(|n| n.tag == "label")
        .filter_map(|n| n.source_attribute("for").map(|f| (n.id, f.to_string())))
        .collect();
    for (label, target_id) in labels {
        match tree.find_by_source_id(root, &target_id) {
            Some(target) => tree.node_mut(label)?.companion = Some(target),
            None => debug!("Label {} points at missing id '{}'", label, target_id),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use weft_traits::DocumentRoot;
    use weft_types::Rect;

    type Pairs = Vec<(&'static str, &'static str)>;
    /// (tag, parent index, style, text, source attributes)
    type ElementSpec = (String, Option<usize>, Pairs, Option<String>, Pairs);

    struct ListProvider {
        elements: Vec<ElementSpec>,
    }

    impl BoxModelProvider for ListProvider {
        fn documents(&self) -> Vec<DocumentRoot> {
            vec![DocumentRoot {
                name: "main".into(),
                root: Some(ElementHandle::new(0)),
            }]
        }

        fn measure(&self, element: ElementHandle) -> Result<BoxMeasure, ProviderError> {
            let (tag, _, style, text, attrs) = self
                .elements
                .get(element.raw() as usize)
                .ok_or(ProviderError::UnknownElement(element))?;
            if tag == "broken" {
                return Err(ProviderError::Unmeasurable {
                    element,
                    reason: "detached".into(),
                });
            }
            Ok(BoxMeasure {
                tag: tag.clone(),
                bounds: Rect::new(0.0, 0.0, 100.0, 20.0),
                style: style.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                attributes: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<BTreeMap<_, _>>(),
                text_content: text.clone(),
                ..Default::default()
            })
        }

        fn children(&self, element: ElementHandle) -> Vec<ElementHandle> {
            self.elements
                .iter()
                .enumerate()
                .filter(|(_, e)| e.1 == Some(element.raw() as usize))
                .map(|(i, _)| ElementHandle::new(i as u64))
                .collect()
        }
    }

    fn el(tag: &str, parent: Option<usize>, style: Pairs) -> ElementSpec {
        (tag.to_string(), parent, style, None, vec![])
    }

    fn ingest(provider: &ListProvider) -> (NodeTree, IngestReport) {
        let mut tree = NodeTree::new();
        let report = Ingestor::new(provider)
            .ingest(&mut tree, ElementHandle::new(0))
            .unwrap();
        (tree, report)
    }

    #[test]
    fn test_display_contents_children_join_outer_run() {
        let provider = ListProvider {
            elements: vec![
                el("body", None, vec![("display", "block")]),
                el("div", Some(0), vec![("display", "contents")]),
                el("p", Some(1), vec![("display", "block")]),
                el("p", Some(1), vec![("display", "block")]),
            ],
        };
        let (tree, report) = ingest(&provider);
        let root = report.root.unwrap();
        let run = tree.pending_run(root).unwrap();
        assert_eq!(run.len(), 2);
        for id in run {
            let node = tree.node(id).unwrap();
            assert_eq!(node.tag, "p");
            assert_eq!(node.document_parent, Some(root));
            assert_eq!(node.depth, 1);
        }
    }

    #[test]
    fn test_unmeasurable_and_display_none_are_excluded() {
        let provider = ListProvider {
            elements: vec![
                el("body", None, vec![("display", "block")]),
                el("broken", Some(0), vec![]),
                el("div", Some(0), vec![("display", "none")]),
                el("span", Some(2), vec![]),
            ],
        };
        let (tree, report) = ingest(&provider);
        assert_eq!(report.unmeasured.len(), 1);
        assert!(tree.pending_run(report.root.unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_text_collapse_and_hidden_flag() {
        let mut elements = vec![
            el("body", None, vec![("display", "block")]),
            el("p", Some(0), vec![("display", "block"), ("visibility", "hidden")]),
        ];
        elements.push(("#text".into(), Some(1), vec![], Some("  Hello \n world ".into()), vec![]));
        let (tree, report) = ingest(&ListProvider { elements });
        let run = tree.pending_run(report.root.unwrap()).unwrap();
        let p = tree.node(run[0]).unwrap();
        assert_eq!(p.text.as_deref(), Some("Hello world"));
        assert!(p.layout_children.is_empty());
        assert!(!p.visible);
        assert!(p.flags.contains(LayoutFlags::HIDDEN));
    }

    #[test]
    fn test_select_options_become_entries() {
        let elements = vec![
            el("body", None, vec![("display", "block")]),
            el("select", Some(0), vec![("display", "inline-block")]),
            ("option".into(), Some(1), vec![], Some("Red".into()), vec![]),
            ("option".into(), Some(1), vec![], Some("Blue".into()), vec![]),
        ];
        let (tree, report) = ingest(&ListProvider { elements });
        let select = tree.pending_run(report.root.unwrap()).unwrap()[0];
        let node = tree.node(select).unwrap();
        assert_eq!(node.entries, vec!["Red".to_string(), "Blue".to_string()]);
        assert!(tree.pending_run(select).unwrap().is_empty());
    }

    #[test]
    fn test_label_companion_binding() {
        let elements = vec![
            el("body", None, vec![("display", "block")]),
            ("label".into(), Some(0), vec![], Some("Email".into()), vec![("for", "email")]),
            ("input".into(), Some(0), vec![], None, vec![("id", "email")]),
        ];
        let (tree, report) = ingest(&ListProvider { elements });
        let run = tree.pending_run(report.root.unwrap()).unwrap();
        assert_eq!(tree.node(run[0]).unwrap().companion, Some(run[1]));
    }

    #[test]
    fn test_root_without_a_box_is_not_a_root() {
        for display in ["none", "contents"] {
            let provider = ListProvider {
                elements: vec![
                    el("body", None, vec![("display", display)]),
                    el("p", Some(0), vec![("display", "block")]),
                ],
            };
            let (tree, report) = ingest(&provider);
            assert_eq!(report.root, None, "display: {}", display);
            assert_eq!(report.node_count, 0);
            assert!(tree.is_empty());
        }
    }

    #[test]
    fn test_malformed_style_warns_once_per_property() {
        let provider = ListProvider {
            elements: vec![
                el("body", None, vec![("display", "block")]),
                el("div", Some(0), vec![("width", "wide"), ("display", "block")]),
                el("div", Some(0), vec![("width", "wider"), ("display", "block")]),
            ],
        };
        let (tree, report) = ingest(&provider);
        assert_eq!(report.style_errors.len(), 1);
        for id in tree.pending_run(report.root.unwrap()).unwrap() {
            assert!(tree.node(id).unwrap().style.get("width").is_none());
        }
    }
}
