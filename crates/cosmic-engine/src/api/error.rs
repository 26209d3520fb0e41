//! Error types for the orbital core.
//!
//! Construction-time failures are returned to the caller. Failures inside a
//! frame tick are logged by the orchestrator and never stop the loop.

use thiserror::Error;

use crate::api::types::BodyId;

/// Failure while building an [`OrbitalHierarchy`](crate::OrbitalHierarchy)
/// or computing a position from it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HierarchyError {
    #[error("hierarchy contains no bodies")]
    Empty,

    #[error("hierarchy has no root body")]
    NoRoot,

    #[error("hierarchy has more than one root: {first} and {second}")]
    MultipleRoots { first: BodyId, second: BodyId },

    #[error("duplicate body id {0}")]
    DuplicateId(BodyId),

    #[error("{child} references unknown parent {parent}")]
    UnknownParent { child: BodyId, parent: BodyId },

    #[error("parent chain of {0} forms a cycle")]
    Cycle(BodyId),

    #[error("{id} has invalid orbit radius {radius}")]
    InvalidRadius { id: BodyId, radius: f64 },

    #[error("{id} has non-finite {field}")]
    NonFiniteParameter { id: BodyId, field: &'static str },

    #[error("unknown body {0}")]
    UnknownBody(BodyId),

    #[error("position of {0} is not finite")]
    NonFinitePosition(BodyId),
}

/// Failure reported by a rendering sink for one frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SinkError {
    #[error("render sink unavailable")]
    Unavailable,

    #[error("render sink rejected frame: {0}")]
    Rejected(String),
}

/// Failure while asking the scheduler for the next tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("scheduler unavailable")]
    Unavailable,

    #[error("scheduler rejected request: {0}")]
    Rejected(String),
}

/// Failure while loading a body set from a JSON manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}
