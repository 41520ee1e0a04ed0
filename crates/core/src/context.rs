//! Per-run state.
//!
//! A [`ConversionContext`] is created at the start of a run, handed by
//! reference to every stage and to every extension hook, and dropped when
//! the run ends. Nothing in the pipeline keeps state between runs.

use crate::diagnostics::Diagnostics;
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use weft_layout::{NodeKind, NodeTree};
use weft_types::NodeId;
use weft_values::ValueStore;

/// A document that made it through ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub name: String,
    pub root: NodeId,
}

pub struct ConversionContext {
    pub tree: NodeTree,
    pub values: ValueStore,
    pub diagnostics: Diagnostics,
    documents: Vec<DocumentEntry>,
    hosts: BTreeMap<String, NodeId>,
}

impl ConversionContext {
    pub fn new(values: ValueStore) -> Self {
        Self {
            tree: NodeTree::new(),
            values,
            diagnostics: Diagnostics::new(),
            documents: Vec::new(),
            hosts: BTreeMap::new(),
        }
    }

    /// The named host outside every source document, created on first use.
    /// Nodes redirected to it are written out as a document of that name.
    pub fn external_host(&mut self, name: &str) -> NodeId {
        if let Some(id) = self.hosts.get(name) {
            return *id;
        }
        let id = self.tree.alloc(NodeKind::Host, "host");
        debug!("Registered external host '{}' as node {}", name, id);
        self.hosts.insert(name.to_string(), id);
        id
    }

    pub fn hosts(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.hosts.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn documents(&self) -> &[DocumentEntry] {
        &self.documents
    }

    pub fn document_named(&self, name: &str) -> Option<NodeId> {
        self.documents.iter().find(|d| d.name == name).map(|d| d.root)
    }

    pub(crate) fn add_document(&mut self, name: &str, root: NodeId) {
        self.documents.push(DocumentEntry {
            name: name.to_string(),
            root,
        });
    }

    pub(crate) fn remove_document(&mut self, root: NodeId) {
        self.documents.retain(|d| d.root != root);
    }
}

/// Shared stop request. Checked before each document; a document that has
/// started classifying is finished or dropped as a whole.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
