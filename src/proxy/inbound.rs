//! Inbound proxy: a host object exposed to script code
//!
//! Script code reads and writes properties and calls methods on the wrapped
//! host handle as if it were a native script value. Member lookup is lazy:
//! `get_member` resolves the name and returns a bound member handle without
//! invoking; the actual call/read/write happens on the handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{ResolveError, ScriptError, ScriptResult};
use crate::marshal::to_host;
use crate::proxy::BoundMemberHandle;
use crate::value::{DispatchHandle, InvokeKind, ScriptObject, ScriptValue};

/// Wraps one host dispatchable handle as a script object value.
///
/// Holds one counted reference to the handle for exactly its own lifetime.
/// The proxy also carries its own associative store, used as the fallback
/// when the host reports an unknown name — array-like host objects stay
/// addressable by key even when the late-bound name table has no entry.
pub struct InboundProxy {
    handle: DispatchHandle,
    local: Mutex<HashMap<String, ScriptValue>>,
    validate_puts: bool,
}

impl InboundProxy {
    pub fn new(handle: DispatchHandle) -> Self {
        Self::with_validation(handle, true)
    }

    /// `validate` controls the post-write resolution check in `put_member`.
    pub fn with_validation(handle: DispatchHandle, validate: bool) -> Self {
        Self {
            handle,
            local: Mutex::new(HashMap::new()),
            validate_puts: validate,
        }
    }

    pub fn handle(&self) -> &DispatchHandle {
        &self.handle
    }
}

impl ScriptObject for InboundProxy {
    fn get_member(&self, key: &str) -> ScriptResult<ScriptValue> {
        match self.handle.resolve(key) {
            Ok(id) => Ok(ScriptValue::Object(Arc::new(BoundMemberHandle::new(
                self.handle.clone(),
                id,
            )))),
            Err(ResolveError::UnknownName { .. }) => {
                tracing::debug!(target: "bridge.inbound", key, "unknown name, indexed fallback");
                self.index(key)
            }
            Err(e) => Err(ScriptError::HostProtocol(e.to_string())),
        }
    }

    fn put_member(&self, key: &str, value: ScriptValue) -> ScriptResult<()> {
        let id = self
            .handle
            .resolve(key)
            .map_err(|e| ScriptError::HostProtocol(e.to_string()))?;
        let host_value = to_host(&value)?;
        self.handle
            .invoke(id, InvokeKind::PropertyPut, &[host_value])
            .map_err(|e| ScriptError::HostProtocol(e.to_string()))?;
        if self.validate_puts {
            // Post-write validation: the name must still resolve. Kept from
            // the original behavior; failure is reported distinctly.
            self.handle
                .resolve(key)
                .map_err(|e| ScriptError::PutValidation(e.to_string()))?;
        }
        Ok(())
    }

    fn index(&self, key: &str) -> ScriptResult<ScriptValue> {
        let local = self.local.lock().expect("proxy store lock poisoned");
        Ok(local.get(key).cloned().unwrap_or(ScriptValue::Nil))
    }

    fn set_index(&self, key: &str, value: ScriptValue) -> ScriptResult<()> {
        let mut local = self.local.lock().expect("proxy store lock poisoned");
        local.insert(key.to_string(), value);
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "host_object"
    }
}
