//! The conversion pipeline.
//!
//! Stages run in a fixed order over one [`ConversionContext`]: ingestion,
//! the image barrier, classification, render-tree finalisation, attribute
//! finalisation, assembly, deduplication and final resolution.

use crate::android::AndroidDialect;
use crate::config::ConversionConfig;
use crate::context::{CancelFlag, ConversionContext, DocumentEntry};
use crate::diagnostics::{DiagnosticKind, Severity};
use crate::error::PipelineError;
use crate::hooks::{Extension, HookAction, HookPoint, HookRegistry};
use crate::images;
use crate::output::{ConversionOutput, DocumentOutput, file_stem};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use weft_layout::{Classifier, Ingestor, LayoutError, LayoutFlags};
use weft_template::{Assembler, ViewDialect, write_document};
use weft_traits::{BoxModelProvider, ImageLoader};
use weft_types::NodeId;
use weft_values::{DedupMember, Deduplicator, ResourceTables, StyleEntry};

/// Builds a [`Converter`]. Everything is optional; the defaults convert to
/// Android layouts with no extensions and no image loader.
pub struct ConverterBuilder {
    config: ConversionConfig,
    hooks: HookRegistry,
    dialect: Option<Arc<dyn ViewDialect>>,
    image_loader: Option<Arc<dyn ImageLoader>>,
    cancel: CancelFlag,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
            hooks: HookRegistry::default(),
            dialect: None,
            image_loader: None,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_config(mut self, config: ConversionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_config_json(mut self, json: &str) -> Result<Self, PipelineError> {
        self.config = ConversionConfig::from_json_str(json)?;
        Ok(self)
    }

    pub fn with_extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.hooks.register(extension);
        self
    }

    /// Replaces the Android dialect built from the configured density.
    pub fn with_dialect(mut self, dialect: Arc<dyn ViewDialect>) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn with_image_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.image_loader = Some(loader);
        self
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn build(self) -> Result<Converter, PipelineError> {
        self.config.validate()?;
        let dialect = self.dialect.unwrap_or_else(|| {
            Arc::new(AndroidDialect::new(self.config.density, self.config.text_scale))
        });
        info!(
            "Building converter: {} extension(s), image loader {}",
            self.hooks.len(),
            if self.image_loader.is_some() { "set" } else { "absent" }
        );
        Ok(Converter {
            config: self.config,
            hooks: self.hooks,
            dialect,
            image_loader: self.image_loader,
            cancel: self.cancel,
        })
    }
}

/// State carried from classification into assembly.
#[derive(Default)]
struct RunState {
    replacements: BTreeMap<NodeId, String>,
    orders: Vec<(NodeId, Vec<NodeId>)>,
}

/// A document or external host that gets written out.
struct Target {
    name: String,
    root: NodeId,
}

pub struct Converter {
    config: ConversionConfig,
    hooks: HookRegistry,
    dialect: Arc<dyn ViewDialect>,
    image_loader: Option<Arc<dyn ImageLoader>>,
    cancel: CancelFlag,
}

impl Converter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Converts every document the provider offers. Only a run in which no
    /// document has a convertible root fails; everything else is reported
    /// through the output's diagnostics.
    pub async fn convert(&self, provider: &dyn BoxModelProvider) -> Result<ConversionOutput, PipelineError> {
        let mut ctx = ConversionContext::new(self.config.value_store()?);
        let mut state = RunState::default();

        let requested = self.ingest_all(provider, &mut ctx);
        if ctx.documents().is_empty() && requested > ctx.diagnostics.count(DiagnosticKind::Cancelled) {
            return Err(PipelineError::NoRoot);
        }

        if let Some(loader) = &self.image_loader {
            images::load_images(loader.as_ref(), &mut ctx).await;
        }

        self.classify_all(&mut ctx, &mut state);

        ctx.tree.compute_render_depths();
        let targets = self.targets(&ctx);
        for id in ctx.tree.render_depth_violations() {
            warn!("Node {} has an inconsistent render depth", id);
        }

        info!("Finalizing attributes for {} output document(s)", targets.len());
        let rendered = self.rendered_nodes(&ctx, &targets, &state)?;
        for id in &rendered {
            let attributes = self.dialect.finalize_attributes(&ctx.tree, *id, &mut ctx.values);
            ctx.tree.node_mut(*id)?.attributes = attributes;
        }
        let action = self.hooks.dispatch(HookPoint::BeforeResourcePass, None, &mut ctx);
        self.ignore_action(&mut ctx, HookPoint::BeforeResourcePass, None, None, action);

        let mut assembler = self.assemble(&mut ctx, &targets, &state)?;
        let styles = self.deduplicate(&mut ctx, &rendered);
        let documents = self.resolve(&mut ctx, &mut assembler, &targets);

        let tables = ResourceTables::collect(&ctx.values, &styles);
        info!(
            "Conversion finished: {} document(s), {} style(s), {} diagnostic(s)",
            documents.len(),
            tables.styles.len(),
            ctx.diagnostics.len()
        );
        Ok(ConversionOutput {
            documents,
            tables,
            diagnostics: ctx.diagnostics,
            layout_dir: self.config.layout_dir.clone(),
            values_dir: self.config.values_dir.clone(),
            drawable_dir: self.config.drawable_dir.clone(),
        })
    }

    /// Runs [`Converter::convert`] on a current-thread runtime.
    pub fn convert_blocking(&self, provider: &dyn BoxModelProvider) -> Result<ConversionOutput, PipelineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.convert(provider))
    }

    /// Returns how many documents the provider offered.
    fn ingest_all(&self, provider: &dyn BoxModelProvider, ctx: &mut ConversionContext) -> usize {
        let documents = provider.documents();
        info!("Ingesting {} document(s)", documents.len());
        let mut ingestor = Ingestor::new(provider);

        for document in &documents {
            let name = document.name.as_str();
            if self.cancel.is_cancelled() {
                ctx.diagnostics.report(
                    Severity::Info,
                    DiagnosticKind::Cancelled,
                    Some(name),
                    None,
                    "skipped before ingestion",
                );
                continue;
            }
            let action = self.hooks.dispatch(HookPoint::BeforeIngest, None, ctx);
            self.ignore_action(ctx, HookPoint::BeforeIngest, Some(name), None, action);

            let Some(element) = document.root else {
                ctx.diagnostics.report(Severity::Error, DiagnosticKind::NoRoot, Some(name), None, "no root element");
                continue;
            };
            let report = match ingestor.ingest(&mut ctx.tree, element) {
                Ok(report) => report,
                Err(LayoutError::RootUnmeasurable(handle, e)) => {
                    ctx.diagnostics.report(
                        Severity::Error,
                        DiagnosticKind::NoRoot,
                        Some(name),
                        None,
                        format!("root element {} could not be measured: {}", handle, e),
                    );
                    continue;
                }
                Err(e) => {
                    ctx.diagnostics.report(
                        Severity::Error,
                        DiagnosticKind::DocumentDiscarded,
                        Some(name),
                        None,
                        e.to_string(),
                    );
                    continue;
                }
            };
            for (handle, e) in &report.unmeasured {
                ctx.diagnostics.warning(
                    DiagnosticKind::Unmeasured,
                    name,
                    None,
                    format!("element {} hidden: {}", handle, e),
                );
            }
            for e in &report.style_errors {
                ctx.diagnostics.warning(DiagnosticKind::StyleParse, name, None, e.to_string());
            }
            let Some(root) = report.root else {
                ctx.diagnostics.report(
                    Severity::Error,
                    DiagnosticKind::NoRoot,
                    Some(name),
                    None,
                    "root element does not participate in layout",
                );
                continue;
            };
            ctx.add_document(name, root);
            let action = self.hooks.dispatch(HookPoint::AfterIngest, Some(root), ctx);
            self.ignore_action(ctx, HookPoint::AfterIngest, Some(name), Some(root), action);
        }
        documents.len()
    }

    fn classify_all(&self, ctx: &mut ConversionContext, state: &mut RunState) {
        let classifier = Classifier::new(self.config.layout);
        for document in ctx.documents().to_vec() {
            if self.cancel.is_cancelled() {
                ctx.diagnostics.report(
                    Severity::Info,
                    DiagnosticKind::Cancelled,
                    Some(&document.name),
                    None,
                    "skipped before classification",
                );
                ctx.remove_document(document.root);
                continue;
            }
            info!("Classifying document '{}'", document.name);
            if let Err(e) = self.classify_document(ctx, &classifier, &document, state) {
                ctx.diagnostics.report(
                    Severity::Error,
                    DiagnosticKind::DocumentDiscarded,
                    Some(&document.name),
                    Some(document.root),
                    e.to_string(),
                );
                ctx.remove_document(document.root);
            }
        }
    }

    fn classify_document(
        &self,
        ctx: &mut ConversionContext,
        classifier: &Classifier,
        document: &DocumentEntry,
        state: &mut RunState,
    ) -> Result<(), PipelineError> {
        let name = document.name.as_str();
        for parent in ctx.tree.classification_order(document.root)? {
            match self.hooks.dispatch(HookPoint::BeforeClassify, Some(parent), ctx) {
                HookAction::Continue => {}
                HookAction::Replace(text) => {
                    ctx.tree.node_mut(parent)?.flags |= LayoutFlags::REPLACED;
                    state.replacements.insert(parent, text);
                    continue;
                }
                HookAction::Redirect(target) => {
                    if let Err(e) = ctx.tree.relocate(parent, target) {
                        ctx.diagnostics.warning(DiagnosticKind::SkippedMember, name, Some(parent), e.to_string());
                    }
                }
            }

            let outcome = classifier.classify(&mut ctx.tree, parent)?;
            for (id, e) in &outcome.skipped {
                ctx.diagnostics.warning(DiagnosticKind::SkippedMember, name, Some(*id), e.to_string());
            }
            for decision in &outcome.decisions {
                if decision.is_degenerate() {
                    ctx.diagnostics.warning(
                        DiagnosticKind::Degenerate,
                        name,
                        Some(decision.owner),
                        format!("{} member(s) fell back to a frame", decision.members.len()),
                    );
                }
                if let Some(order) = &decision.reorder {
                    state.orders.push((decision.owner, order.clone()));
                }
                let action = self.hooks.dispatch(HookPoint::AfterClassify, Some(decision.owner), ctx);
                self.ignore_action(ctx, HookPoint::AfterClassify, Some(name), Some(decision.owner), action);
            }
        }
        Ok(())
    }

    /// Documents whose root still renders on its own, then every external
    /// host something was redirected to.
    fn targets(&self, ctx: &ConversionContext) -> Vec<Target> {
        let mut targets: Vec<Target> = ctx
            .documents()
            .iter()
            .filter(|d| ctx.tree.get(d.root).is_some_and(|n| n.render_parent().is_none()))
            .map(|d| Target {
                name: d.name.clone(),
                root: d.root,
            })
            .collect();
        for (name, host) in ctx.hosts() {
            let used = ctx.tree.render_children(host).map(|c| !c.is_empty()).unwrap_or(false);
            if used {
                targets.push(Target {
                    name: name.to_string(),
                    root: host,
                });
            }
        }
        targets
    }

    /// Every node reachable through render links from a target, skipping
    /// the inside of replaced nodes.
    fn rendered_nodes(&self, ctx: &ConversionContext, targets: &[Target], state: &RunState) -> Result<Vec<NodeId>, PipelineError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for target in targets {
            for id in ctx.tree.render_subtree(target.root)? {
                if state.replacements.contains_key(&id) || !seen.insert(id) {
                    continue;
                }
                out.push(id);
            }
        }
        Ok(out)
    }

    fn assemble(&self, ctx: &mut ConversionContext, targets: &[Target], state: &RunState) -> Result<Assembler, PipelineError> {
        let mut levels: BTreeMap<u32, Vec<NodeId>> = BTreeMap::new();
        let mut seen = HashSet::new();
        for target in targets {
            for id in ctx.tree.render_subtree(target.root)? {
                if seen.insert(id) {
                    levels.entry(ctx.tree.node(id)?.render_depth).or_default().push(id);
                }
            }
        }

        let mut assembler = Assembler::new();
        for (owner, order) in &state.orders {
            assembler.save_order(*owner, order.clone());
        }
        info!("Assembling {} render level(s)", levels.len());
        for (depth, mut nodes) in levels.into_iter().rev() {
            nodes.sort();
            assembler.begin_level(depth);
            for id in nodes {
                if let Some(text) = state.replacements.get(&id) {
                    assembler.replace(&ctx.tree, id, text)?;
                } else if !ctx.tree.render_children(id)?.is_empty() {
                    assembler.place(&ctx.tree, id)?;
                }
            }
            for rejected in assembler.finish_level() {
                let owner = match &rejected {
                    weft_template::TemplateError::PartialReorder { owner, .. } => Some(*owner),
                    _ => None,
                };
                let document = owner.and_then(|o| self.document_name(ctx, o));
                ctx.diagnostics.report(
                    Severity::Warning,
                    DiagnosticKind::RejectedReorder,
                    document.as_deref(),
                    owner,
                    rejected.to_string(),
                );
            }
        }
        debug!("{} announcement(s) still queued after assembly", assembler.queued());
        Ok(assembler)
    }

    fn deduplicate(&self, ctx: &mut ConversionContext, rendered: &[NodeId]) -> Vec<StyleEntry> {
        let members: Vec<DedupMember> = rendered
            .iter()
            .filter_map(|id| ctx.tree.get(*id))
            .filter(|n| !n.attributes.is_empty())
            .map(|n| DedupMember {
                id: n.id,
                tag: self.dialect.element_tag(&ctx.tree, n),
                attributes: n.attributes.clone(),
            })
            .collect();
        info!("Deduplicating attributes of {} node(s)", members.len());
        let result = Deduplicator::new(self.config.dedup.clone()).run(&members);

        for (id, names) in &result.removals {
            if let Ok(node) = ctx.tree.node_mut(*id) {
                for name in names {
                    node.attributes.remove(name);
                }
            }
        }
        for (id, style) in &result.assignments {
            if let Ok(node) = ctx.tree.node_mut(*id) {
                node.style_ref = Some(style.clone());
            }
        }
        result.styles
    }

    fn resolve(&self, ctx: &mut ConversionContext, assembler: &mut Assembler, targets: &[Target]) -> Vec<DocumentOutput> {
        let roots: Vec<NodeId> = targets.iter().map(|t| t.root).collect();
        let resolutions = assembler.resolve_all(&ctx.tree, &roots);
        let mut documents = Vec::with_capacity(targets.len());

        for (target, resolution) in targets.iter().zip(resolutions) {
            let name = target.name.as_str();
            for placeholder in &resolution.unresolved {
                ctx.diagnostics.warning(
                    DiagnosticKind::UnresolvedPlaceholder,
                    name,
                    Some(placeholder.owner),
                    format!("{} left as a literal marker", placeholder),
                );
            }
            for placeholder in &resolution.cycles {
                ctx.diagnostics.warning(
                    DiagnosticKind::PlaceholderCycle,
                    name,
                    Some(placeholder.owner),
                    format!("{} refers back to an enclosing fragment", placeholder),
                );
            }
            if resolution.cross_document > 0 {
                debug!("Document '{}' pulled in {} relocated fragment(s)", name, resolution.cross_document);
            }

            let mut content = write_document(&ctx.tree, self.dialect.as_ref(), &resolution.pieces);
            match self.hooks.dispatch(HookPoint::AfterFinalize, Some(target.root), ctx) {
                HookAction::Continue => {}
                HookAction::Replace(text) => content = text,
                action => self.ignore_action(ctx, HookPoint::AfterFinalize, Some(name), Some(target.root), action),
            }
            documents.push(DocumentOutput {
                name: target.name.clone(),
                file_stem: file_stem(name, target.root),
                root: target.root,
                content,
            });
        }
        documents
    }

    fn ignore_action(
        &self,
        ctx: &mut ConversionContext,
        point: HookPoint,
        document: Option<&str>,
        node: Option<NodeId>,
        action: HookAction,
    ) {
        if action != HookAction::Continue {
            ctx.diagnostics.report(
                Severity::Warning,
                DiagnosticKind::IgnoredHookAction,
                document,
                node,
                format!("{:?} has no effect at {}", action, point),
            );
        }
    }

    fn document_name(&self, ctx: &ConversionContext, node: NodeId) -> Option<String> {
        let root = ctx.tree.document_of(node).ok()?;
        ctx.documents()
            .iter()
            .find(|d| d.root == root)
            .map(|d| d.name.clone())
            .or_else(|| ctx.hosts().find(|(_, h)| *h == root).map(|(n, _)| n.to_string()))
    }
}
