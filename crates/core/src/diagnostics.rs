//! Recoverable problems collected during a run.
//!
//! Each entry is logged where it is detected and travels back to the caller
//! with the output, so a run always ends in "best-effort output plus a list
//! of what went wrong".

use log::{info, warn};
use serde::Serialize;
use std::fmt;
use weft_types::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Info,
    Warning,
    /// The affected document produced no output.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// The provider could not measure an element; it was hidden.
    Unmeasured,
    /// A computed style value was malformed and skipped.
    StyleParse,
    ImageLoad,
    /// No axis or relative test matched; the frame fallback was used.
    Degenerate,
    /// A classifier member was skipped because the tree refused it.
    SkippedMember,
    RejectedReorder,
    UnresolvedPlaceholder,
    PlaceholderCycle,
    /// A hook returned an action that does not apply at its call site.
    IgnoredHookAction,
    NoRoot,
    /// Classification of a document failed; none of it was written.
    DocumentDiscarded,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub document: Option<String>,
    pub node: Option<NodeId>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {:?}", self.severity, self.kind)?;
        if let Some(doc) = &self.document {
            write!(f, " in '{}'", doc)?;
        }
        if let Some(node) = self.node {
            write!(f, " at node {}", node)?;
        }
        write!(f, ": {}", self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => info!("{}", diagnostic),
            _ => warn!("{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    pub fn report(
        &mut self,
        severity: Severity,
        kind: DiagnosticKind,
        document: Option<&str>,
        node: Option<NodeId>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic {
            severity,
            kind,
            document: document.map(str::to_string),
            node,
            message: message.into(),
        });
    }

    pub fn warning(&mut self, kind: DiagnosticKind, document: &str, node: Option<NodeId>, message: impl Into<String>) {
        self.report(Severity::Warning, kind, Some(document), node, message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
