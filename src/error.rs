//! Unified error handling for the bridge
//!
//! Error types are layered by boundary:
//!
//! - **Marshaling errors** (`MarshalError`): value conversion refusals
//! - **Host-facing errors** (`HostError`, `ResolveError`): the failure signals
//!   delivered across the late-bound dispatch protocol
//! - **Script-facing errors** (`ScriptError`): errors propagated into script
//!   code as runtime errors
//! - **Engine errors** (`EngineError`): embedding lifecycle failures
//!
//! Errors discovered on the script-consuming-host path propagate as
//! `ScriptError`. Errors discovered on the host-consuming-script path are
//! caught at the dispatch boundary and converted to `HostError` — a script
//! error escaping into the host's call stack is a defect.

use thiserror::Error;

/// Value conversion errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarshalError {
    /// The value kind has no marshaled representation. Array, thread and
    /// vector kinds fail here loudly instead of coercing to null.
    #[error("Unsupported value kind for marshaling: {kind}")]
    Unsupported { kind: &'static str },
}

/// Name resolution errors reported through the dispatch protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The object has no member with this name.
    #[error("Unknown member name: {name}")]
    UnknownName { name: String },

    /// Resolution failed for a reason other than an unknown name.
    #[error("Name resolution error: {0}")]
    Protocol(String),
}

/// Host-facing failure signals, returned across the dispatch boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// An error escaped an invocation on a host-driven proxy. Always caught
    /// at the boundary; the invocation result is an empty host value.
    #[error("Unexpected internal error during proxy invocation")]
    UnexpectedInternal,

    /// The operation has no implementation on this object.
    #[error("Operation not supported: {what}")]
    NotSupported { what: &'static str },

    /// The host object reported an invocation failure.
    #[error("Host protocol error: {0}")]
    Protocol(String),

    /// The embedding site reported a lookup failure.
    #[error("Host site error: {0}")]
    Site(String),
}

/// Errors propagated to script code.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Name resolution or invocation failure reported by the host side.
    #[error("Host protocol error: {0}")]
    HostProtocol(String),

    /// A bound member's call or read failed on the host side.
    #[error("Host invocation failed: {0}")]
    HostInvocation(String),

    /// The post-write validation resolve failed. Distinct from the write
    /// failure so callers can tell the phases apart.
    #[error("Property write validation failed: {0}")]
    PutValidation(String),

    #[error("Value of type '{type_name}' is not callable")]
    NotCallable { type_name: &'static str },

    #[error("Value of type '{type_name}' has no readable target")]
    NotReadable { type_name: &'static str },

    #[error("Value of type '{type_name}' has no writable target")]
    NotWritable { type_name: &'static str },

    /// An error raised inside the script runtime itself.
    #[error("Script runtime error: {0}")]
    Runtime(String),

    #[error("Marshal error: {0}")]
    Marshal(#[from] MarshalError),
}

/// Embedding lifecycle errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No host site has been attached")]
    NoSite,

    #[error("The engine has been closed")]
    Closed,

    #[error("Invalid scriptlet: {0}")]
    InvalidScriptlet(String),

    #[error("Component lifecycle is saturated; cannot create another engine")]
    LifecycleSaturated,

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

pub type MarshalResult<T> = Result<T, MarshalError>;
pub type HostResult<T> = Result<T, HostError>;
pub type ScriptResult<T> = Result<T, ScriptError>;
pub type EngineResult<T> = Result<T, EngineError>;
