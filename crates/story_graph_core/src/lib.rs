//! Core domain logic for the story adventure scene graph.
//! This crate owns the rule list invariants, the graph projection of rules,
//! and the reconciliation of authoring edits back into rules.

pub mod authoring;
pub mod codec;
pub mod graph;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod projection;
pub mod reconcile;
pub mod session;
pub mod vocabulary;

pub use authoring::commit::{commit_authoring_state, CommitSummary, COMMIT_BATCH_LABEL};
pub use authoring::state::{AuthoringState, EntityEvent, RelationEvent};
pub use codec::condition::{deserialize_condition, serialize_condition, ConditionError};
pub use codec::editor::{parse_term, validate_condition, ConditionEditor, ParsedCondition};
pub use graph::data::{EntityData, RelationData, RelationKey};
pub use graph::memory::InMemoryGraph;
pub use graph::model::{GraphElement, GraphLink, GraphModel, ProjectionSink};
pub use graph::term::{Literal, Term};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use metadata::SceneMetadataPolicy;
pub use model::rule::{
    decode_rules, encode_rules, ConditionOperator, RuleFormatError, RuleValidationError,
    SceneRule, SceneRuleCondition,
};
pub use projection::quads::{project_rules, project_schema, Projection, Quad, QuadSubject};
pub use reconcile::engine::{
    export_rules, reconcile_rules, reconcile_rules_with_stats, ReconcileError, ReconcileResult,
    ReconcileStats, RuleExport,
};
pub use session::{
    CancelSignal, GraphImporter, ImportError, SaveOutcome, SessionError, StorySession,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
