//! Story session context.
//!
//! # Responsibility
//! - Hold the in-memory rule list between save cycles.
//! - Run one load (decode, project, import) and one save (reconcile,
//!   serialize, commit) cycle.
//!
//! # Invariants
//! - A failed or cancelled load leaves the prior rule list authoritative.
//! - A failed save leaves the rule list, the live graph and the authoring
//!   delta untouched.
//! - The delta is cleared only after both save transforms succeeded.

use crate::authoring::commit::{commit_authoring_state, CommitSummary};
use crate::authoring::state::AuthoringState;
use crate::graph::memory::InMemoryGraph;
use crate::graph::model::GraphModel;
use crate::model::rule::{decode_rules, RuleFormatError, SceneRule};
use crate::projection::quads::{project_rules, project_schema, Projection};
use crate::reconcile::engine::{export_rules, ReconcileError, RuleExport};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation flag shared between the host and a running load.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Importer/layout failure reported by the graph editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportError {
    pub message: String,
}

impl ImportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "graph import failed: {}", self.message)
    }
}

impl Error for ImportError {}

/// Editor-side step that takes a projection in and lays it out.
///
/// Implementations should return early when `signal` is cancelled.
pub trait GraphImporter {
    fn import_projection(
        &mut self,
        projection: &Projection,
        signal: &CancelSignal,
    ) -> Result<(), ImportError>;
}

/// Replaces the whole graph with the imported projection.
impl GraphImporter for InMemoryGraph {
    fn import_projection(
        &mut self,
        projection: &Projection,
        signal: &CancelSignal,
    ) -> Result<(), ImportError> {
        if signal.is_cancelled() {
            return Ok(());
        }
        self.reset();
        projection.emit_into(self);
        Ok(())
    }
}

/// Session-level errors.
#[derive(Debug)]
pub enum SessionError {
    Io(std::io::Error),
    Format(RuleFormatError),
    Import(ImportError),
    Cancelled,
    Reconcile(ReconcileError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "rule file I/O failed: {err}"),
            Self::Format(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "{err}"),
            Self::Cancelled => write!(f, "load cancelled"),
            Self::Reconcile(err) => write!(f, "save aborted: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Format(err) => Some(err),
            Self::Import(err) => Some(err),
            Self::Cancelled => None,
            Self::Reconcile(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RuleFormatError> for SessionError {
    fn from(value: RuleFormatError) -> Self {
        Self::Format(value)
    }
}

impl From<ImportError> for SessionError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<ReconcileError> for SessionError {
    fn from(value: ReconcileError) -> Self {
        Self::Reconcile(value)
    }
}

/// Result of one successful save cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub export: RuleExport,
    pub commit: CommitSummary,
}

/// Context object carrying the rule list across save cycles.
#[derive(Debug, Clone, Default)]
pub struct StorySession {
    rules: Vec<SceneRule>,
}

impl StorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<SceneRule>) -> Self {
        Self { rules }
    }

    /// Current rule list of record.
    pub fn rules(&self) -> &[SceneRule] {
        &self.rules
    }

    /// Loads a JSON rule list and imports its projection.
    pub fn load_json(
        &mut self,
        json: &str,
        importer: &mut impl GraphImporter,
        signal: &CancelSignal,
    ) -> Result<Projection, SessionError> {
        let rules = decode_rules(json).inspect_err(|_| {
            error!("event=rules_load module=session status=error reason=format");
        })?;
        self.load_rules(rules, importer, signal)
    }

    /// Reads and loads one rule file.
    pub fn load_file(
        &mut self,
        path: &Path,
        importer: &mut impl GraphImporter,
        signal: &CancelSignal,
    ) -> Result<Projection, SessionError> {
        let json = std::fs::read_to_string(path)?;
        self.load_json(&json, importer, signal)
    }

    /// Projects `rules`, imports them and makes them the rule list of record.
    pub fn load_rules(
        &mut self,
        rules: Vec<SceneRule>,
        importer: &mut impl GraphImporter,
        signal: &CancelSignal,
    ) -> Result<Projection, SessionError> {
        let mut projection = project_schema();
        projection.extend(project_rules(&rules));

        if signal.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        importer.import_projection(&projection, signal)?;
        if signal.is_cancelled() {
            info!("event=rules_load module=session status=cancelled");
            return Err(SessionError::Cancelled);
        }

        info!(
            "event=rules_load module=session status=ok rules={} entities={} relations={}",
            rules.len(),
            projection.entities.len(),
            projection.relations.len()
        );
        self.rules = rules;
        Ok(projection)
    }

    /// Reconciles `state` into a new rule list without touching the session.
    pub fn export(&self, state: &AuthoringState) -> Result<RuleExport, SessionError> {
        export_rules(&self.rules, state).map_err(Into::into)
    }

    /// Runs one save cycle: export, adopt the new rules, commit the delta.
    pub fn save(
        &mut self,
        state: &mut AuthoringState,
        model: &mut impl GraphModel,
    ) -> Result<SaveOutcome, SessionError> {
        let export = self.export_for_save(state)?;
        Ok(self.adopt(export, state, model))
    }

    /// Runs one save cycle and writes the rule file to `path` before the
    /// delta is committed.
    pub fn save_to_file(
        &mut self,
        path: &Path,
        state: &mut AuthoringState,
        model: &mut impl GraphModel,
    ) -> Result<SaveOutcome, SessionError> {
        let export = self.export_for_save(state)?;
        std::fs::write(path, export.json.as_bytes()).inspect_err(|_| {
            error!("event=rules_save module=session status=error reason=io");
        })?;
        Ok(self.adopt(export, state, model))
    }

    fn export_for_save(&self, state: &AuthoringState) -> Result<RuleExport, SessionError> {
        self.export(state).inspect_err(|_| {
            error!("event=rules_save module=session status=error reason=reconcile");
        })
    }

    fn adopt(
        &mut self,
        export: RuleExport,
        state: &mut AuthoringState,
        model: &mut impl GraphModel,
    ) -> SaveOutcome {
        self.rules = export.rules.clone();
        let commit = commit_authoring_state(model, state);
        info!(
            "event=rules_save module=session status=ok rules={}",
            self.rules.len()
        );
        SaveOutcome { export, commit }
    }
}
