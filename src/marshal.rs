//! Value Marshaler
//!
//! Pure conversion between the script side's tagged variant and the host
//! side's tagged union. No state; unsupported kinds refuse loudly. Callers at
//! the proxy layer catch marshal failures and translate them into their own
//! failure signal — a marshal error never crosses the dispatch boundary raw.

use std::sync::Arc;

use crate::error::{MarshalError, MarshalResult};
use crate::proxy::{InboundProxy, OutboundProxy};
use crate::value::host::Dispatch;
use crate::value::{DispatchHandle, HostString, HostValue, ScriptStr, ScriptValue};

/// Convert a script value to a host value.
///
/// Callable and object kinds are wrapped in a new outbound proxy carrying one
/// host-held reference; the host must release it exactly once. Integer values
/// are passed through as signed 32-bit host integers — values outside that
/// range are a caller contract violation, not validated here.
pub fn to_host(v: &ScriptValue) -> MarshalResult<HostValue> {
    match v {
        ScriptValue::Nil => Ok(HostValue::Null),
        ScriptValue::Int(i) => Ok(HostValue::I32(*i)),
        ScriptValue::Byte(b) => Ok(HostValue::U32(u32::from(*b))),
        ScriptValue::Float(f) => Ok(HostValue::F64(*f)),
        ScriptValue::Str(s) => Ok(HostValue::Str(HostString::new(s.as_bytes().to_vec()))),
        // The pointer payload already is a valid dispatchable handle; no
        // wrapping.
        ScriptValue::Pointer(handle) => Ok(HostValue::Dispatch(handle.clone())),
        ScriptValue::Array(_) => {
            tracing::debug!(target: "bridge.marshal", "refusing to marshal array value");
            Err(MarshalError::Unsupported { kind: "array" })
        }
        ScriptValue::Thread(_) => {
            tracing::debug!(target: "bridge.marshal", "refusing to marshal thread value");
            Err(MarshalError::Unsupported { kind: "thread" })
        }
        ScriptValue::Object(_) => {
            let proxy = OutboundProxy::new(v.clone());
            proxy.acquire();
            Ok(HostValue::Dispatch(DispatchHandle::from_dispatch(proxy)))
        }
    }
}

/// Convert a host value to a script value, consuming it.
///
/// Host strings are owned by the conversion: exactly `byte_len` bytes are
/// taken (a null buffer yields an empty string) and the host string is freed.
/// Booleans become integer 0/1 — the script value model has no boolean kind.
pub fn to_script(v: HostValue) -> MarshalResult<ScriptValue> {
    match v {
        HostValue::Dispatch(handle) => Ok(ScriptValue::Object(Arc::new(InboundProxy::new(handle)))),
        HostValue::Empty | HostValue::Null => Ok(ScriptValue::Nil),
        HostValue::Bool(b) => Ok(ScriptValue::Int(i32::from(b))),
        HostValue::Str(s) => Ok(ScriptValue::Str(ScriptStr::from_bytes(s.into_bytes()))),
        HostValue::I32(i) => Ok(ScriptValue::Int(i)),
        HostValue::U32(u) => Ok(ScriptValue::Int(u as i32)),
        HostValue::F64(f) => Ok(ScriptValue::Float(f)),
        HostValue::Array(_) => {
            tracing::debug!(target: "bridge.marshal", "refusing to marshal host array value");
            Err(MarshalError::Unsupported { kind: "array" })
        }
    }
}
