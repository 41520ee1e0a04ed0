use weft_layout::{AttributeSet, ContainerType, Node, NodeTree};
use weft_types::NodeId;
use weft_values::ValueStore;

/// Maps abstract containers and leaves onto one platform's element names
/// and attribute syntax.
pub trait ViewDialect: Send + Sync {
    fn container_tag(&self, container: ContainerType) -> &str;

    fn leaf_tag(&self, node: &Node) -> String;

    /// Attributes only the outermost element of a document carries.
    fn root_attributes(&self) -> Vec<(String, String)>;

    /// The attribute that references a shared style.
    fn style_attribute(&self) -> &str;

    /// Turns computed style and classification into platform attributes,
    /// interning literal values through `values`.
    fn finalize_attributes(&self, tree: &NodeTree, id: NodeId, values: &mut ValueStore) -> AttributeSet;

    /// The element name a node is written with. Anything holding render
    /// children is a container; a container without a decision (a
    /// relocation host) falls back to the frame.
    fn element_tag(&self, tree: &NodeTree, node: &Node) -> String {
        let has_children = tree
            .render_children(node.id)
            .map(|c| !c.is_empty())
            .unwrap_or(false);
        match node.container {
            ContainerType::None if has_children => self.container_tag(ContainerType::Frame).to_string(),
            ContainerType::None => self.leaf_tag(node),
            container => self.container_tag(container).to_string(),
        }
    }
}
