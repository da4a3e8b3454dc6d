//! Core abstractions for the agentflow orchestration kernel
//!
//! This crate provides the fundamental types that the runtime and the
//! standard capability library depend on: flow nodes and the canvas that
//! roots them, the per-run invocation state, the capability contract and
//! registry, and the result-stream protocol.

mod canvas;
mod capability;
mod context;
mod error;
pub mod events;
mod node;
mod registry;

pub use canvas::FlowCanvas;
pub use capability::{Capability, FnCapability};
pub use context::{ParamMap, SystemContext};
pub use error::{CapabilityError, FlowError};
pub use events::{input_channel, InputFrame, InputReceiver, InputSender, ResultEvent, ResultStream};
pub use node::{ConditionalBranch, FlowNode, Guard, NodeKind, ParamBinding, ToolParam};
pub use registry::CapabilityRegistry;

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
