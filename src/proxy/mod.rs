//! The two proxy kinds of the dynamic object bridge
//!
//! - [`OutboundProxy`] exposes a script value to the host side through the
//!   late-bound dispatch protocol.
//! - [`InboundProxy`] exposes a host object to script code as an ordinary
//!   script value; its member lookup yields a [`BoundMemberHandle`], a
//!   deferred call/read/write target.

pub mod inbound;
pub mod member;
pub mod outbound;

pub use inbound::InboundProxy;
pub use member::BoundMemberHandle;
pub use outbound::OutboundProxy;
