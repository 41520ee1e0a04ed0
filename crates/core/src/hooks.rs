//! Extension hook call sites.
//!
//! Extensions are consulted in registration order at each [`HookPoint`];
//! the first one that answers with something other than
//! [`HookAction::Continue`] decides. Which actions a call site honours is
//! listed on the variant.

use crate::context::ConversionContext;
use log::debug;
use std::fmt;
use std::sync::Arc;
use weft_types::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Once per document, before it is measured. No node yet.
    BeforeIngest,
    /// With the freshly ingested document root.
    AfterIngest,
    /// With each parent about to have its run classified. `Replace` vetoes
    /// classification and substitutes the fragment; `Redirect` moves the
    /// parent under the given target first.
    BeforeClassify,
    /// With the owner of each decision. Observation only.
    AfterClassify,
    /// Once, after attribute finalisation. No node.
    BeforeResourcePass,
    /// With each document root. `Replace` substitutes the whole document.
    AfterFinalize,
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookPoint::BeforeIngest => "before-ingest",
            HookPoint::AfterIngest => "after-ingest",
            HookPoint::BeforeClassify => "before-classify",
            HookPoint::AfterClassify => "after-classify",
            HookPoint::BeforeResourcePass => "before-resource-pass",
            HookPoint::AfterFinalize => "after-finalize",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HookAction {
    #[default]
    Continue,
    /// Raw output used in place of the node's own. May embed slot markers.
    Replace(String),
    /// Render the node under another node, typically an external host.
    Redirect(NodeId),
}

pub trait Extension: Send + Sync {
    fn name(&self) -> &str;

    fn on_hook(&self, point: HookPoint, node: Option<NodeId>, ctx: &mut ConversionContext) -> HookAction;
}

/// Registered extensions, consulted in order.
#[derive(Clone, Default)]
pub struct HookRegistry {
    extensions: Vec<Arc<dyn Extension>>,
}

impl HookRegistry {
    pub fn register(&mut self, extension: Arc<dyn Extension>) {
        self.extensions.push(extension);
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn dispatch(&self, point: HookPoint, node: Option<NodeId>, ctx: &mut ConversionContext) -> HookAction {
        for extension in &self.extensions {
            let action = extension.on_hook(point, node, ctx);
            if action != HookAction::Continue {
                debug!(
                    "Extension '{}' answered {} on {:?} with {:?}",
                    extension.name(),
                    point,
                    node,
                    action
                );
                return action;
            }
        }
        HookAction::Continue
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.extensions.iter().map(|e| e.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_values::ValueStore;

    struct Fixed(&'static str, HookAction);

    impl Extension for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn on_hook(&self, _: HookPoint, _: Option<NodeId>, _: &mut ConversionContext) -> HookAction {
            self.1.clone()
        }
    }

    #[test]
    fn test_first_non_continue_wins() {
        let mut registry = HookRegistry::default();
        registry.register(Arc::new(Fixed("quiet", HookAction::Continue)));
        registry.register(Arc::new(Fixed("first", HookAction::Replace("<A/>".into()))));
        registry.register(Arc::new(Fixed("second", HookAction::Replace("<B/>".into()))));
        let mut ctx = ConversionContext::new(ValueStore::default());
        let action = registry.dispatch(HookPoint::BeforeClassify, None, &mut ctx);
        assert_eq!(action, HookAction::Replace("<A/>".into()));
    }

    #[test]
    fn test_empty_registry_continues() {
        let registry = HookRegistry::default();
        let mut ctx = ConversionContext::new(ValueStore::default());
        assert_eq!(
            registry.dispatch(HookPoint::AfterIngest, None, &mut ctx),
            HookAction::Continue
        );
    }
}
