//! Value models for both sides of the bridge
//!
//! `script` holds the script runtime's tagged variant; `host` holds the
//! late-bound protocol's tagged union and the dispatch seam. The two value
//! representations never mix except through the marshaler.

pub mod host;
pub mod script;

pub use host::{Dispatch, DispatchHandle, HostString, HostValue, InvokeKind, MemberId, DEFAULT_MEMBER};
pub use script::{NativeFunction, ScriptObject, ScriptStr, ScriptValue, TableObject};
