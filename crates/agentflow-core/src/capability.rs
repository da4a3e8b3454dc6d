use crate::{CapabilityError, ParamMap, SystemContext};
use async_trait::async_trait;

/// A named, invocable unit of work: a tool call, a model call, or anything
/// else satisfying the uniform map-in/map-out contract.
///
/// Capabilities are registered once and shared across runs; implementations
/// must be safe to invoke concurrently.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Unique registry name (e.g., "search.vector", "model.dashscope")
    fn name(&self) -> &str;

    /// Execute with the resolved arguments and the current invocation state.
    async fn execute(
        &self,
        args: ParamMap,
        ctx: &SystemContext,
    ) -> Result<ParamMap, CapabilityError>;
}

type CapabilityFn =
    dyn Fn(ParamMap, &SystemContext) -> Result<ParamMap, CapabilityError> + Send + Sync;

/// Closure-backed capability, for tests and lightweight in-process tools.
pub struct FnCapability {
    name: String,
    func: Box<CapabilityFn>,
}

impl FnCapability {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(ParamMap, &SystemContext) -> Result<ParamMap, CapabilityError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }
}

#[async_trait]
impl Capability for FnCapability {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        args: ParamMap,
        ctx: &SystemContext,
    ) -> Result<ParamMap, CapabilityError> {
        (self.func)(args, ctx)
    }
}
