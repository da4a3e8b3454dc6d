//! Standard capability library
//!
//! Generic capabilities usable from any canvas: echo, delay, and the
//! generative-model adapter. Concrete SaaS and vector-store connectors live
//! with the surrounding application, not here.

mod delay;
mod echo;
mod model;

pub use delay::DelayCapability;
pub use echo::EchoCapability;
pub use model::{Message, ModelCapability, ModelProvider, ModelRequest, ModelResponse};

use agentflow_core::CapabilityRegistry;
use std::sync::Arc;

/// Register every provider-less standard capability.
pub fn register_all(registry: &CapabilityRegistry) {
    registry.register(Arc::new(EchoCapability));
    registry.register(Arc::new(DelayCapability));
}
