//! The image barrier, the run's only suspension point.

use crate::context::ConversionContext;
use crate::diagnostics::{DiagnosticKind, Severity};
use futures::future::join_all;
use log::{debug, info};
use std::collections::BTreeMap;
use weft_traits::ImageLoader;
use weft_types::{NodeId, Size};

/// Loads every distinct image source once, concurrently, and waits for all
/// of them. Failed loads leave a zero intrinsic size behind. Image boxes the
/// provider measured as empty adopt the intrinsic size.
pub(crate) async fn load_images(loader: &dyn ImageLoader, ctx: &mut ConversionContext) {
    let mut by_source: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
    for node in ctx.tree.iter().filter(|n| !n.excluded) {
        if let Some(src) = &node.image_src {
            by_source.entry(src.clone()).or_default().push(node.id);
        }
    }
    if by_source.is_empty() {
        return;
    }
    info!("Waiting for {} image(s)", by_source.len());

    let loads = by_source.keys().map(|src| loader.intrinsic_size(src));
    let results = join_all(loads).await;

    for ((src, nodes), result) in by_source.into_iter().zip(results) {
        let size = match result {
            Ok(size) => {
                debug!("Image '{}' is {}x{}", src, size.width, size.height);
                size
            }
            Err(e) => {
                let document = nodes
                    .first()
                    .and_then(|id| ctx.tree.document_of(*id).ok())
                    .and_then(|root| {
                        ctx.documents()
                            .iter()
                            .find(|d| d.root == root)
                            .map(|d| d.name.clone())
                    });
                ctx.diagnostics.report(
                    Severity::Warning,
                    DiagnosticKind::ImageLoad,
                    document.as_deref(),
                    nodes.first().copied(),
                    e.to_string(),
                );
                Size::zero()
            }
        };
        for id in nodes {
            if let Ok(node) = ctx.tree.node_mut(id) {
                node.intrinsic_size = Some(size);
                if node.bounds.width <= 0.0 || node.bounds.height <= 0.0 {
                    node.bounds.width = size.width;
                    node.bounds.height = size.height;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use weft_layout::NodeKind;
    use weft_traits::ImageError;
    use weft_types::Rect;
    use weft_values::ValueStore;

    struct OnlyLogo;

    impl ImageLoader for OnlyLogo {
        fn intrinsic_size<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<Size, ImageError>> {
            Box::pin(async move {
                if src == "logo.png" {
                    Ok(Size::new(64.0, 32.0))
                } else {
                    Err(ImageError::Load(src.to_string(), "not found".to_string()))
                }
            })
        }
    }

    #[tokio::test]
    async fn test_barrier_sizes_images_and_tolerates_failures() {
        let mut ctx = ConversionContext::new(ValueStore::default());
        let root = ctx.tree.alloc(NodeKind::Root, "body");
        ctx.add_document("main", root);
        let logo = ctx.tree.alloc(NodeKind::Element, "img");
        let broken = ctx.tree.alloc(NodeKind::Element, "img");
        ctx.tree.attach(root, logo, Some(root)).unwrap();
        ctx.tree.attach(root, broken, Some(root)).unwrap();
        ctx.tree.node_mut(logo).unwrap().image_src = Some("logo.png".into());
        {
            let b = ctx.tree.node_mut(broken).unwrap();
            b.image_src = Some("gone.png".into());
            b.bounds = Rect::new(0.0, 0.0, 20.0, 20.0);
        }

        load_images(&OnlyLogo, &mut ctx).await;

        let logo = ctx.tree.node(logo).unwrap();
        assert_eq!(logo.intrinsic_size, Some(Size::new(64.0, 32.0)));
        assert_eq!(logo.bounds.width, 64.0);
        let broken = ctx.tree.node(broken).unwrap();
        assert_eq!(broken.intrinsic_size, Some(Size::zero()));
        assert_eq!(broken.bounds.width, 20.0);
        assert_eq!(ctx.diagnostics.count(DiagnosticKind::ImageLoad), 1);
        assert_eq!(
            ctx.diagnostics.iter().next().unwrap().document.as_deref(),
            Some("main")
        );
    }
}
