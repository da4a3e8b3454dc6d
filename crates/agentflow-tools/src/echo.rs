use agentflow_core::{Capability, CapabilityError, ParamMap, SystemContext};
use async_trait::async_trait;

/// Returns its arguments unchanged. Handy for wiring tests and for carrying
/// literal bindings into the invocation state under a node id.
pub struct EchoCapability;

#[async_trait]
impl Capability for EchoCapability {
    fn name(&self) -> &str {
        "echo"
    }

    async fn execute(
        &self,
        args: ParamMap,
        _ctx: &SystemContext,
    ) -> Result<ParamMap, CapabilityError> {
        tracing::debug!("echoing {} argument(s)", args.len());
        Ok(args)
    }
}
