//! Host embedding support
//!
//! The site adapter (named-global resolution at engine setup) and the
//! component lifecycle counter consumed by the process entry point.

pub mod lifecycle;
pub mod site;

pub use lifecycle::{ComponentLifecycle, EngineFactory, LifecycleGuard};
pub use site::{HostSite, SiteAdapter};
