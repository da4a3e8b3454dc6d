use crate::SystemContext;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Predicate attached to a guarded successor, evaluated against the
/// invocation state. Must not mutate state (enforced by the shared borrow).
pub type Guard = Arc<dyn Fn(&SystemContext) -> bool + Send + Sync>;

/// Discriminates what a node invokes. Both kinds execute through the same
/// capability contract; the tag keeps the runner loop exhaustive-checkable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Invokes a registered tool capability
    Tool { capability: String },
    /// Invokes a capability wrapping a generative-model call
    Model { capability: String },
}

/// How a bound parameter obtains its value at execution time.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamBinding {
    /// Passed through as-is
    Literal(Value),
    /// Resolved from a previously executed node's output map
    Reference { node_id: String, field: String },
    /// Resolved from the run's input parameter map; in bidirectional runs
    /// the caller may push the value after the run has started
    Input(String),
}

/// A named parameter bound to a node.
#[derive(Debug, Clone)]
pub struct ToolParam {
    pub name: String,
    pub binding: ParamBinding,
}

/// A guarded successor: the nested node is entered when the guard is the
/// first in its parent's list to evaluate true.
pub struct ConditionalBranch {
    pub when: Guard,
    pub node: FlowNode,
}

impl fmt::Debug for ConditionalBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalBranch")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

/// A single step in the execution graph.
///
/// Nodes own their successors, so a canvas is an acyclic tree built before
/// any run and immutable once shared with one. Builders consume and return
/// `self`; chains compose inside-out:
///
/// ```
/// use agentflow_core::FlowNode;
///
/// let root = FlowNode::tool("fetch")
///     .with_id("a")
///     .next(FlowNode::tool("summarize").with_id("b"));
/// ```
#[derive(Debug)]
pub struct FlowNode {
    id: String,
    kind: NodeKind,
    params: Vec<ToolParam>,
    next: Option<Box<FlowNode>>,
    branches: Vec<ConditionalBranch>,
    else_next: Option<Box<FlowNode>>,
    best_effort: bool,
}

impl FlowNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            params: Vec::new(),
            next: None,
            branches: Vec::new(),
            else_next: None,
            best_effort: false,
        }
    }

    /// Node invoking the named tool capability
    pub fn tool(capability: impl Into<String>) -> Self {
        Self::new(NodeKind::Tool {
            capability: capability.into(),
        })
    }

    /// Node invoking the named model capability
    pub fn model(capability: impl Into<String>) -> Self {
        Self::new(NodeKind::Model {
            capability: capability.into(),
        })
    }

    /// Override the auto-generated id. Ids must be unique within a canvas
    /// for result lookup to be unambiguous; duplicates are rejected at run
    /// entry.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Bind a literal parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.push(ToolParam {
            name: name.into(),
            binding: ParamBinding::Literal(value.into()),
        });
        self
    }

    /// Bind a parameter to another node's output field.
    pub fn with_reference(
        mut self,
        name: impl Into<String>,
        node_id: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.params.push(ToolParam {
            name: name.into(),
            binding: ParamBinding::Reference {
                node_id: node_id.into(),
                field: field.into(),
            },
        });
        self
    }

    /// Bind a parameter to a run input key.
    pub fn with_input(mut self, name: impl Into<String>, key: impl Into<String>) -> Self {
        self.params.push(ToolParam {
            name: name.into(),
            binding: ParamBinding::Input(key.into()),
        });
        self
    }

    /// Set the unconditional successor. Guarded successors, when present,
    /// take precedence over it.
    pub fn next(mut self, node: FlowNode) -> Self {
        self.next = Some(Box::new(node));
        self
    }

    /// Append a guarded successor; insertion order is evaluation order.
    pub fn branch<F>(mut self, when: F, node: FlowNode) -> Self
    where
        F: Fn(&SystemContext) -> bool + Send + Sync + 'static,
    {
        self.branches.push(ConditionalBranch {
            when: Arc::new(when),
            node,
        });
        self
    }

    /// Successor entered when every guard evaluates false.
    pub fn or_else(mut self, node: FlowNode) -> Self {
        self.else_next = Some(Box::new(node));
        self
    }

    /// Mark the node best-effort: a failure is logged and recorded as an
    /// empty output map instead of terminating the run.
    pub fn best_effort(mut self) -> Self {
        self.best_effort = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Name of the capability this node invokes.
    pub fn capability(&self) -> &str {
        match &self.kind {
            NodeKind::Tool { capability } | NodeKind::Model { capability } => capability,
        }
    }

    pub fn params(&self) -> &[ToolParam] {
        &self.params
    }

    pub fn unconditional_next(&self) -> Option<&FlowNode> {
        self.next.as_deref()
    }

    pub fn branches(&self) -> &[ConditionalBranch] {
        &self.branches
    }

    pub fn else_next(&self) -> Option<&FlowNode> {
        self.else_next.as_deref()
    }

    pub fn is_best_effort(&self) -> bool {
        self.best_effort
    }

    /// All directly attached successors, for canvas traversal.
    pub(crate) fn successors(&self) -> impl Iterator<Item = &FlowNode> {
        self.next
            .as_deref()
            .into_iter()
            .chain(self.branches.iter().map(|b| &b.node))
            .chain(self.else_next.as_deref())
    }
}
