use thiserror::Error;

/// Errors surfaced by the orchestrator while driving a run.
///
/// None of these are retried by the runner; unless the failing node is
/// marked best-effort they end the run with a `Failed` terminal event.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("node `{node_id}` references unregistered capability `{name}`")]
    CapabilityNotFound { node_id: String, name: String },

    #[error("node `{node_id}` references `{source_id}.{field}`, which has not been produced")]
    UnresolvedReference {
        node_id: String,
        source_id: String,
        field: String,
    },

    #[error("capability `{name}` failed at node `{node_id}`: {source}")]
    CapabilityExecution {
        node_id: String,
        name: String,
        #[source]
        source: CapabilityError,
    },

    #[error("input `{name}` never arrived for node `{node_id}`")]
    MissingInput { node_id: String, name: String },

    #[error("invalid graph: {0}")]
    GraphMutation(String),

    #[error("run cancelled")]
    Cancelled,
}

impl FlowError {
    /// Id of the node the error originated at, when there is one.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            FlowError::CapabilityNotFound { node_id, .. }
            | FlowError::UnresolvedReference { node_id, .. }
            | FlowError::CapabilityExecution { node_id, .. }
            | FlowError::MissingInput { node_id, .. } => Some(node_id),
            FlowError::GraphMutation(_) | FlowError::Cancelled => None,
        }
    }
}

/// Errors returned by capability implementations
#[derive(Error, Debug, Clone)]
pub enum CapabilityError {
    #[error("missing argument: {0}")]
    MissingArg(String),

    #[error("invalid argument `{name}`: expected {expected}")]
    InvalidArg { name: String, expected: String },

    #[error("execution failed: {0}")]
    Failed(String),

    #[error("provider error: {0}")]
    Provider(String),
}
