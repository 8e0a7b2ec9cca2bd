//! Outbound proxy: a script value exposed to the host side
//!
//! The host drives this object through the late-bound protocol: it resolves
//! member names to ids, then invokes by id. The proxy owns the member name
//! table; the 1-based position of a name in the table is its durable id for
//! the proxy's lifetime. Every failure inside an invocation is caught here
//! and converted to the protocol's failure signal — script errors never
//! escape into the host's call stack.

use std::sync::Mutex;

use crate::error::{HostError, HostResult, ResolveError, ScriptResult};
use crate::marshal::{to_host, to_script};
use crate::value::{Dispatch, HostString, HostValue, InvokeKind, MemberId, ScriptValue};

struct Inner {
    /// Host-held reference count.
    count: i64,
    /// The wrapped script value; cleared on destruction.
    wrapped: Option<ScriptValue>,
    /// Member name table. Insertion-ordered; repeat resolution appends a
    /// duplicate entry with a new higher id, and ids already issued never
    /// change meaning.
    names: Vec<String>,
}

/// Wraps one script value behind the dispatch protocol.
///
/// Created when a non-primitive script value is marshaled out; the creator
/// performs one `acquire`, transferring a host-owned reference that the host
/// must release exactly once. When the count returns to zero the wrapped
/// value and name table are destroyed; the count itself stays valid, so a
/// late release reports the proxy already destroyed instead of touching
/// freed state.
pub struct OutboundProxy {
    inner: Mutex<Inner>,
}

impl OutboundProxy {
    pub fn new(wrapped: ScriptValue) -> Self {
        Self {
            inner: Mutex::new(Inner {
                count: 0,
                wrapped: Some(wrapped),
                names: Vec::new(),
            }),
        }
    }

    /// Current host-held reference count.
    pub fn count(&self) -> usize {
        let inner = self.inner.lock().expect("proxy lock poisoned");
        inner.count.max(0) as usize
    }

    /// Snapshot the wrapped value and the name at `id`, under the lock.
    fn snapshot(&self, id: MemberId) -> HostResult<(ScriptValue, Option<String>)> {
        let inner = self.inner.lock().expect("proxy lock poisoned");
        let wrapped = inner.wrapped.clone().ok_or_else(|| {
            tracing::warn!(target: "bridge.outbound", "invoke on a released proxy");
            HostError::UnexpectedInternal
        })?;
        let name = if id == 0 {
            None
        } else {
            Some(
                inner
                    .names
                    .get(id as usize - 1)
                    .cloned()
                    .ok_or(HostError::UnexpectedInternal)?,
            )
        };
        Ok((wrapped, name))
    }

    fn invoke_method(&self, args: &[HostValue]) -> HostResult<HostValue> {
        let (wrapped, _) = self.snapshot(0)?;
        self.invoke_method_impl(&wrapped, args).map_err(|e| {
            tracing::warn!(target: "bridge.outbound", "method invocation failed: {e}");
            HostError::UnexpectedInternal
        })
    }

    fn invoke_method_impl(
        &self,
        wrapped: &ScriptValue,
        args: &[HostValue],
    ) -> ScriptResult<HostValue> {
        // Arguments arrive in protocol order (last logical argument first);
        // rebuild the logical-order script argument array.
        let mut script_args = Vec::with_capacity(args.len());
        for arg in args.iter().rev() {
            script_args.push(to_script(arg.clone())?);
        }
        let result = wrapped.call(&script_args)?;
        Ok(to_host(&result)?)
    }

    fn invoke_property_get(&self, id: MemberId) -> HostResult<HostValue> {
        let (wrapped, name) = self.snapshot(id)?;
        match name {
            // The default member is the wrapped value's string coercion.
            None => Ok(HostValue::Str(HostString::from(wrapped.display_string()))),
            Some(name) => self.property_get_impl(&wrapped, &name).map_err(|e| {
                tracing::warn!(target: "bridge.outbound", name = %name, "property get failed: {e}");
                HostError::UnexpectedInternal
            }),
        }
    }

    fn property_get_impl(&self, wrapped: &ScriptValue, name: &str) -> ScriptResult<HostValue> {
        let value = wrapped.get_key(name)?;
        Ok(to_host(&value)?)
    }
}

impl Dispatch for OutboundProxy {
    fn resolve(&self, name: &str) -> Result<MemberId, ResolveError> {
        let mut inner = self.inner.lock().expect("proxy lock poisoned");
        if inner.wrapped.is_none() {
            return Err(ResolveError::Protocol("proxy has been released".to_string()));
        }
        inner.names.push(name.to_string());
        Ok(inner.names.len() as MemberId)
    }

    fn invoke(&self, id: MemberId, kind: InvokeKind, args: &[HostValue]) -> HostResult<HostValue> {
        tracing::trace!(target: "bridge.outbound", id, ?kind, argc = args.len(), "invoke");
        match kind {
            InvokeKind::Method => self.invoke_method(args),
            InvokeKind::PropertyGet => self.invoke_property_get(id),
            InvokeKind::PropertyPut => Err(HostError::NotSupported {
                what: "property-put on an outbound proxy",
            }),
        }
    }

    fn acquire(&self) -> usize {
        let mut inner = self.inner.lock().expect("proxy lock poisoned");
        inner.count += 1;
        inner.count as usize
    }

    fn release(&self) -> usize {
        let mut inner = self.inner.lock().expect("proxy lock poisoned");
        if inner.count < 1 {
            tracing::warn!(target: "bridge.outbound", "release on an already-destroyed proxy");
            return 0;
        }
        inner.count -= 1;
        if inner.count == 0 {
            // Destroy strictly before reporting; the counter is never
            // touched after this point in this call.
            inner.wrapped = None;
            inner.names.clear();
            tracing::debug!(target: "bridge.outbound", "proxy destroyed on last release");
        }
        inner.count as usize
    }
}

impl std::fmt::Debug for OutboundProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().expect("proxy lock poisoned");
        f.debug_struct("OutboundProxy")
            .field("count", &inner.count)
            .field("names", &inner.names.len())
            .field("alive", &inner.wrapped.is_some())
            .finish()
    }
}
