use agentflow_core::{Capability, CapabilityError, ParamMap, SystemContext};
use async_trait::async_trait;
use tokio::time::{sleep, Duration};

/// Sleeps for `ms` milliseconds, then passes the remaining arguments through.
pub struct DelayCapability;

#[async_trait]
impl Capability for DelayCapability {
    fn name(&self) -> &str {
        "delay"
    }

    async fn execute(
        &self,
        mut args: ParamMap,
        _ctx: &SystemContext,
    ) -> Result<ParamMap, CapabilityError> {
        let ms = args
            .remove("ms")
            .ok_or_else(|| CapabilityError::MissingArg("ms".to_string()))?
            .as_u64()
            .ok_or(CapabilityError::InvalidArg {
                name: "ms".to_string(),
                expected: "non-negative integer".to_string(),
            })?;

        tracing::debug!("delaying for {}ms", ms);
        sleep(Duration::from_millis(ms)).await;

        Ok(args)
    }
}
