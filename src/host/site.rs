//! Host site adapter
//!
//! The embedding host hands the engine a site: the object that owns the
//! host-side global namespace and receives lifecycle notifications. The
//! adapter resolves named globals from the site and materializes them as
//! inbound proxies; used only at engine setup.

use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::engine::EngineState;
use crate::error::{HostError, HostResult};
use crate::proxy::InboundProxy;
use crate::value::{DispatchHandle, ScriptValue};

/// The embedding host's site, as consumed by the bridge.
pub trait HostSite: Send + Sync {
    /// Look up a named global item. `Ok(None)` means the site has no item
    /// with this name.
    fn item(&self, name: &str) -> HostResult<Option<DispatchHandle>>;

    /// Engine state transition notification.
    fn on_state_change(&self, _state: EngineState) {}

    fn on_enter_script(&self) {}

    fn on_leave_script(&self) {}
}

/// Resolves named site globals into script values.
#[derive(Clone)]
pub struct SiteAdapter {
    site: Arc<dyn HostSite>,
    validate_puts: bool,
}

impl SiteAdapter {
    pub fn new(site: Arc<dyn HostSite>) -> Self {
        Self {
            site,
            validate_puts: true,
        }
    }

    pub fn with_config(site: Arc<dyn HostSite>, config: &BridgeConfig) -> Self {
        Self {
            site,
            validate_puts: config.validate_puts,
        }
    }

    /// Fetch a named item and wrap it as a script value. A failed or empty
    /// lookup yields nil — setup installs the global either way.
    pub fn named_item(&self, name: &str) -> ScriptValue {
        match self.site.item(name) {
            Ok(Some(handle)) => ScriptValue::Object(Arc::new(InboundProxy::with_validation(
                handle,
                self.validate_puts,
            ))),
            Ok(None) => {
                tracing::debug!(target: "bridge.site", name, "named item not present");
                ScriptValue::Nil
            }
            Err(e) => {
                tracing::warn!(target: "bridge.site", name, "named item lookup failed: {e}");
                ScriptValue::Nil
            }
        }
    }

    /// Fetch the raw dispatch handle for a named item.
    pub fn dispatch_for(&self, name: &str) -> HostResult<DispatchHandle> {
        self.site
            .item(name)?
            .ok_or_else(|| HostError::Site(format!("named item not found: {name}")))
    }

    pub fn notify_state(&self, state: EngineState) {
        self.site.on_state_change(state);
    }

    pub fn on_enter_script(&self) {
        self.site.on_enter_script();
    }

    pub fn on_leave_script(&self) {
        self.site.on_leave_script();
    }
}
