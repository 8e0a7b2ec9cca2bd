//! # Script Bridge
//!
//! The interop layer of a scripting-engine host adapter: a dynamically-typed
//! script runtime and an external late-bound object protocol call into each
//! other as if they shared one object model.
//!
//! ## Architecture
//!
//! - **Value Marshaler** ([`marshal`]): pure conversion between the script
//!   side's tagged variant and the host side's tagged union.
//! - **Outbound Proxy** ([`proxy::OutboundProxy`]): exposes a script value to
//!   the host through name→id resolution and invoke-by-id.
//! - **Inbound Proxy** ([`proxy::InboundProxy`]): exposes a host object to
//!   script code as an ordinary script value; member lookup yields a
//!   [`proxy::BoundMemberHandle`] supporting deferred call, read and write.
//! - **Host Site Adapter** ([`host::SiteAdapter`]): resolves named globals
//!   from the embedding host at engine setup.
//! - **Engine** ([`engine::ScriptEngine`]): the embedding lifecycle state
//!   machine the host drives.
//!
//! ## Example
//!
//! ```ignore
//! use script_bridge::engine::ScriptEngine;
//!
//! let mut engine = ScriptEngine::new(runtime);
//! engine.set_site(site);
//! engine.add_named_item("window")?;
//! engine.parse_and_run("window.title = \"hello\"")?;
//! ```

/// Bridge configuration and logging setup
pub mod config;
/// Embedding lifecycle state machine
pub mod engine;
/// Error taxonomy
pub mod error;
/// Host site adapter and component lifecycle
pub mod host;
/// Value marshaling between the two sides
pub mod marshal;
/// Outbound and inbound proxies
pub mod proxy;
/// Value models for both sides
pub mod value;

pub use config::{init_logging, BridgeConfig, LoggingConfig};
pub use engine::{EngineState, ScriptEngine, ScriptRuntime, StateChange};
pub use error::{
    EngineError, EngineResult, HostError, HostResult, MarshalError, MarshalResult, ResolveError,
    ScriptError, ScriptResult,
};
pub use host::{ComponentLifecycle, EngineFactory, HostSite, SiteAdapter};
pub use marshal::{to_host, to_script};
pub use proxy::{BoundMemberHandle, InboundProxy, OutboundProxy};
pub use value::{
    Dispatch, DispatchHandle, HostString, HostValue, InvokeKind, MemberId, NativeFunction,
    ScriptObject, ScriptStr, ScriptValue, TableObject, DEFAULT_MEMBER,
};
