use crate::error::RegistryError;
use crate::registry::VerifierRegistry;
use crate::types::VerifierRecord;
use parking_lot::RwLock;
use std::sync::Arc;
use verireg_token::Address;

/// Thread-safe handle to a registry.
///
/// Writers are serialised by the lock, so each operation still runs as a single
/// uninterrupted unit; readers never observe a half-applied call.
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<RwLock<VerifierRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: VerifierRegistry) -> Self {
        SharedRegistry {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&VerifierRegistry) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut VerifierRegistry) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub fn count(&self) -> u64 {
        self.inner.read().count()
    }

    pub fn get_verifier(&self, id: &Address) -> Result<VerifierRecord, RegistryError> {
        self.inner.read().get_verifier(id).cloned()
    }
}
