use crate::events::InputReceiver;
use serde_json::Value;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// String-keyed parameter/output map; values are treated opaquely except
/// when resolved as cross-node references.
pub type ParamMap = HashMap<String, Value>;

/// Per-run invocation state.
///
/// Holds the run's input parameters, every completed node's output map, and
/// (for bidirectional runs) the inbound channel the caller pushes late-bound
/// parameters through. The runner is the only writer; capabilities receive
/// `&SystemContext` and may read prior results via [`lookup`].
///
/// [`lookup`]: SystemContext::lookup
pub struct SystemContext {
    run_id: Uuid,
    inputs: ParamMap,
    outputs: HashMap<String, ParamMap>,
    inbound: Option<InputReceiver>,
    cancellation: CancellationToken,
}

impl SystemContext {
    pub fn new(inputs: ParamMap) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            inputs,
            outputs: HashMap::new(),
            inbound: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_inbound(mut self, inbound: InputReceiver) -> Self {
        self.inbound = Some(inbound);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Current value of a run input parameter.
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name)
    }

    /// Merge one inbound frame into the input map.
    pub fn apply_frame(&mut self, frame: ParamMap) {
        self.inputs.extend(frame);
    }

    /// Apply every frame the caller has already pushed, in arrival order.
    pub fn drain_frames(&mut self) {
        if let Some(rx) = &mut self.inbound {
            while let Ok(frame) = rx.try_recv() {
                self.inputs.extend(frame);
            }
        }
    }

    /// Await the next inbound frame without applying it.
    ///
    /// Returns `None` once the inbound source has completed, or immediately
    /// when the run has no inbound channel at all.
    pub async fn next_frame(&mut self) -> Option<ParamMap> {
        match &mut self.inbound {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// Record a completed node's output map under its id.
    pub fn record_output(&mut self, node_id: impl Into<String>, outputs: ParamMap) {
        self.outputs.insert(node_id.into(), outputs);
    }

    /// Full output map of a previously completed node.
    pub fn result_of(&self, node_id: &str) -> Option<&ParamMap> {
        self.outputs.get(node_id)
    }

    /// Single output field of a previously completed node.
    ///
    /// `None` covers both "node not executed yet" and "field absent from its
    /// output map"; the runner maps either to an unresolved-reference error.
    pub fn lookup(&self, node_id: &str, field: &str) -> Option<&Value> {
        self.outputs.get(node_id).and_then(|map| map.get(field))
    }
}
