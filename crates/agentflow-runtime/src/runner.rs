use agentflow_core::{
    CapabilityRegistry, FlowCanvas, FlowError, FlowNode, InputReceiver, ParamBinding, ParamMap,
    ResultEvent, ResultStream, SystemContext,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The three invocation contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeMode {
    /// The run has fully finished (or failed) before `run` returns; the
    /// stream holds the complete ordered sequence.
    Sync,
    /// The run executes on a spawned task; events arrive as nodes complete.
    Async,
    /// Like `Async`, plus the caller pushes late-bound input parameters
    /// through an inbound channel.
    Bidi,
}

/// What to execute and how: invocation mode, initial input parameters, and
/// (for bidirectional runs) the inbound event source.
pub struct Request {
    mode: InvokeMode,
    params: ParamMap,
    inbound: Option<InputReceiver>,
}

impl Request {
    pub fn new(mode: InvokeMode) -> Self {
        Self {
            mode,
            params: ParamMap::new(),
            inbound: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: ParamMap) -> Self {
        self.params.extend(params);
        self
    }

    pub fn with_inbound(mut self, inbound: InputReceiver) -> Self {
        self.inbound = Some(inbound);
        self
    }
}

/// Walks a canvas from its root, executes each node's capability, stores
/// results into the run-scoped `SystemContext`, evaluates branch guards to
/// choose the next node, and emits the ordered result stream.
///
/// The registry is the only structure shared across concurrent runs; one
/// `Runner` may drive any number of canvases at once.
pub struct Runner {
    registry: Arc<CapabilityRegistry>,
}

impl Runner {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Start a run and return its result stream.
    ///
    /// Structural problems (no root, duplicate node ids) surface here as
    /// `GraphMutation` errors before any node executes. Execution failures
    /// are delivered through the stream as a `Failed` terminal event.
    pub async fn run(
        &self,
        canvas: Arc<FlowCanvas>,
        request: Request,
    ) -> Result<ResultStream, FlowError> {
        canvas.validate()?;

        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut ctx = SystemContext::new(request.params).with_cancellation(cancel.clone());
        if let Some(inbound) = request.inbound {
            ctx = ctx.with_inbound(inbound);
        }

        let registry = self.registry.clone();
        match request.mode {
            InvokeMode::Sync => {
                drive(canvas, registry, ctx, tx, cancel.clone()).await;
            }
            InvokeMode::Async | InvokeMode::Bidi => {
                tokio::spawn(drive(canvas, registry, ctx, tx, cancel.clone()));
            }
        }

        Ok(ResultStream::new(rx, cancel))
    }
}

/// Per-run execution loop: one path at a time, events in completion order.
async fn drive(
    canvas: Arc<FlowCanvas>,
    registry: Arc<CapabilityRegistry>,
    mut ctx: SystemContext,
    tx: mpsc::UnboundedSender<ResultEvent>,
    cancel: CancellationToken,
) {
    let run_id = ctx.run_id();
    tracing::info!("starting flow run {}", run_id);
    let start = Instant::now();

    let mut current = canvas.root();
    while let Some(node) = current {
        if cancel.is_cancelled() {
            tracing::info!("run {} cancelled before node {}", run_id, node.id());
            let _ = tx.send(ResultEvent::cancelled());
            return;
        }

        // Inbound frames already pushed by the caller are applied before the
        // node executes, one frame at a time in arrival order.
        ctx.drain_frames();

        let node_start = Instant::now();
        let outputs = match execute_node(&registry, node, &mut ctx, &cancel).await {
            Ok(outputs) => outputs,
            Err(FlowError::Cancelled) => {
                tracing::info!("run {} cancelled at node {}", run_id, node.id());
                let _ = tx.send(ResultEvent::cancelled());
                return;
            }
            Err(err) if node.is_best_effort() => {
                tracing::warn!("best-effort node {} failed: {}", node.id(), err);
                ParamMap::new()
            }
            Err(err) => {
                tracing::error!("node {} failed: {}", node.id(), err);
                let _ = tx.send(ResultEvent::failed(Some(node.id().to_string()), err));
                return;
            }
        };

        tracing::debug!(
            "node {} completed in {}ms",
            node.id(),
            node_start.elapsed().as_millis()
        );

        ctx.record_output(node.id(), outputs.clone());
        if tx
            .send(ResultEvent::node_completed(node.id(), outputs))
            .is_err()
        {
            // Receiver dropped: the caller discarded the stream.
            tracing::info!("run {} abandoned by caller", run_id);
            return;
        }

        current = next_node(node, &ctx);
    }

    tracing::info!(
        "flow run {} completed in {}ms",
        run_id,
        start.elapsed().as_millis()
    );
    let _ = tx.send(ResultEvent::completed());
}

/// Select the successor after a node completes.
///
/// Guarded successors take precedence over the unconditional `next`:
/// the first guard evaluating true wins, in insertion order; with every
/// guard false the else-successor is entered when present, otherwise the
/// path terminates.
fn next_node<'a>(node: &'a FlowNode, ctx: &SystemContext) -> Option<&'a FlowNode> {
    let branches = node.branches();
    if !branches.is_empty() {
        for branch in branches {
            if (branch.when)(ctx) {
                return Some(&branch.node);
            }
        }
        return node.else_next();
    }
    node.unconditional_next()
}

/// Resolve bindings, look up the capability, and invoke it.
async fn execute_node(
    registry: &CapabilityRegistry,
    node: &FlowNode,
    ctx: &mut SystemContext,
    cancel: &CancellationToken,
) -> Result<ParamMap, FlowError> {
    let args = resolve_params(node, ctx, cancel).await?;

    let name = node.capability();
    let capability = registry
        .lookup(name)
        .ok_or_else(|| FlowError::CapabilityNotFound {
            node_id: node.id().to_string(),
            name: name.to_string(),
        })?;

    capability
        .execute(args, ctx)
        .await
        .map_err(|source| FlowError::CapabilityExecution {
            node_id: node.id().to_string(),
            name: name.to_string(),
            source,
        })
}

/// Build the argument map for a node from its parameter bindings.
///
/// An `Input` binding with no value yet suspends the node on the inbound
/// channel; inbound completion with the value still missing fails it.
async fn resolve_params(
    node: &FlowNode,
    ctx: &mut SystemContext,
    cancel: &CancellationToken,
) -> Result<ParamMap, FlowError> {
    let mut args = ParamMap::new();
    for param in node.params() {
        let value = match &param.binding {
            ParamBinding::Literal(value) => value.clone(),
            ParamBinding::Reference { node_id, field } => ctx
                .lookup(node_id, field)
                .cloned()
                .ok_or_else(|| FlowError::UnresolvedReference {
                    node_id: node.id().to_string(),
                    source_id: node_id.clone(),
                    field: field.clone(),
                })?,
            ParamBinding::Input(key) => await_input(node, ctx, cancel, key).await?,
        };
        args.insert(param.name.clone(), value);
    }
    Ok(args)
}

async fn await_input(
    node: &FlowNode,
    ctx: &mut SystemContext,
    cancel: &CancellationToken,
    key: &str,
) -> Result<Value, FlowError> {
    loop {
        if let Some(value) = ctx.input(key) {
            return Ok(value.clone());
        }
        let frame = tokio::select! {
            _ = cancel.cancelled() => return Err(FlowError::Cancelled),
            frame = ctx.next_frame() => frame,
        };
        match frame {
            Some(frame) => ctx.apply_frame(frame),
            None => {
                return Err(FlowError::MissingInput {
                    node_id: node.id().to_string(),
                    name: key.to_string(),
                })
            }
        }
    }
}
