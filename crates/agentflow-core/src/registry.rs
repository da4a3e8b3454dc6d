use crate::Capability;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Lookup table from capability name to implementation.
///
/// Registered once at startup (or test setup), read during graph execution.
/// Safe for concurrent register/lookup across runs; registration is
/// last-write-wins, so re-registering a name swaps the implementation for
/// all subsequent lookups without affecting executions already completed.
///
/// Every operation panics if the inner lock is poisoned: a registration that
/// panicked mid-write may have left the table incomplete, and continuing
/// against it would hand out capabilities nondeterministically.
pub struct CapabilityRegistry {
    entries: RwLock<HashMap<String, Arc<dyn Capability>>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Store or overwrite a capability under its name.
    pub fn register(&self, capability: Arc<dyn Capability>) {
        let name = capability.name().to_string();
        tracing::info!("registering capability: {}", name);
        self.entries
            .write()
            .expect("capability registry lock poisoned")
            .insert(name, capability);
    }

    /// Look up a capability by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.entries
            .read()
            .expect("capability registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Names of all registered capabilities, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .expect("capability registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
