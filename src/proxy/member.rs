//! Bound member handle: a deferred (object, member-id) invocation target
//!
//! Produced by the inbound proxy's member lookup. Holds its own counted
//! reference to the host handle, so it stays valid after the proxy that
//! created it is gone. Polymorphic over call, read and write like any other
//! script object value.

use crate::error::{ScriptError, ScriptResult};
use crate::marshal::{to_host, to_script};
use crate::value::{DispatchHandle, InvokeKind, MemberId, ScriptObject, ScriptValue};

pub struct BoundMemberHandle {
    handle: DispatchHandle,
    id: MemberId,
}

impl BoundMemberHandle {
    pub fn new(handle: DispatchHandle, id: MemberId) -> Self {
        Self { handle, id }
    }

    pub fn id(&self) -> MemberId {
        self.id
    }
}

impl ScriptObject for BoundMemberHandle {
    fn call(&self, args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
        // Protocol order: last logical argument first.
        let mut host_args = Vec::with_capacity(args.len());
        for arg in args.iter().rev() {
            host_args.push(to_host(arg)?);
        }
        let result = self
            .handle
            .invoke(self.id, InvokeKind::Method, &host_args)
            .map_err(|e| ScriptError::HostInvocation(e.to_string()))?;
        Ok(to_script(result)?)
    }

    fn read(&self) -> ScriptResult<ScriptValue> {
        let result = self
            .handle
            .invoke(self.id, InvokeKind::PropertyGet, &[])
            .map_err(|e| ScriptError::HostInvocation(e.to_string()))?;
        Ok(to_script(result)?)
    }

    /// Writes the converted value at the held id and returns `rhs` unchanged.
    /// A host-side put failure is logged and swallowed: assignment
    /// expressions evaluate to their right-hand side either way.
    fn write(&self, rhs: ScriptValue) -> ScriptResult<ScriptValue> {
        let host_value = to_host(&rhs)?;
        if let Err(e) = self
            .handle
            .invoke(self.id, InvokeKind::PropertyPut, &[host_value])
        {
            tracing::warn!(target: "bridge.inbound", id = self.id, "property write failed: {e}");
        }
        Ok(rhs)
    }

    fn type_name(&self) -> &'static str {
        "bound_member"
    }

    fn display(&self) -> String {
        format!("[bound member {}]", self.id)
    }
}
