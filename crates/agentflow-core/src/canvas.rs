use crate::{FlowError, FlowNode};
use std::collections::HashSet;

/// Container for one invocation graph: holds the root node and construction
/// helpers. Purely data; execution belongs to the runtime's `Runner`.
///
/// A canvas may be executed concurrently by any number of independent runs:
/// nodes are read-only during execution and all mutable state lives in the
/// run-scoped `SystemContext`.
#[derive(Debug, Default)]
pub struct FlowCanvas {
    root: Option<FlowNode>,
}

impl FlowCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_root(&mut self, node: FlowNode) {
        self.root = Some(node);
    }

    /// Builder-style variant of [`set_root`].
    ///
    /// [`set_root`]: FlowCanvas::set_root
    pub fn with_root(mut self, node: FlowNode) -> Self {
        self.root = Some(node);
        self
    }

    pub fn root(&self) -> Option<&FlowNode> {
        self.root.as_ref()
    }

    /// Structural checks run at entry: a root must be set and node ids must
    /// be unique, otherwise result lookup by id would be ambiguous.
    pub fn validate(&self) -> Result<(), FlowError> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| FlowError::GraphMutation("canvas has no root node".to_string()))?;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !seen.insert(node.id()) {
                return Err(FlowError::GraphMutation(format!(
                    "duplicate node id `{}`",
                    node.id()
                )));
            }
            stack.extend(node.successors());
        }
        Ok(())
    }
}
