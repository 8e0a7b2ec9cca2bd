//! Component lifecycle bookkeeping
//!
//! Tracks how many outstanding handles keep the component loaded, so the
//! process entry point can answer unload queries. Owned state, not a global.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::engine::{ScriptEngine, ScriptRuntime};
use crate::error::{EngineError, EngineResult};

/// Reference counter for process-wide component lifetime.
#[derive(Debug, Default)]
pub struct ComponentLifecycle {
    count: AtomicI64,
}

impl ComponentLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outstanding reference. Returns false when saturated.
    pub fn acquire(&self) -> bool {
        self.count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                if count >= i64::MAX - 1 {
                    None
                } else {
                    Some(count + 1)
                }
            })
            .is_ok()
    }

    /// Drop one outstanding reference. Returns false on underflow; the count
    /// is never driven negative.
    pub fn release(&self) -> bool {
        self.count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                if count <= 0 {
                    None
                } else {
                    Some(count - 1)
                }
            })
            .is_ok()
    }

    /// Whether nothing holds the component anymore.
    pub fn can_unload(&self) -> bool {
        self.count.load(Ordering::SeqCst) == 0
    }

    pub fn count(&self) -> i64 {
        self.count.load(Ordering::SeqCst)
    }

    /// Acquire with RAII release.
    pub fn guard(self: &Arc<Self>) -> Option<LifecycleGuard> {
        if self.acquire() {
            Some(LifecycleGuard {
                lifecycle: Arc::clone(self),
            })
        } else {
            None
        }
    }
}

/// Releases its lifecycle reference on drop.
#[derive(Debug)]
pub struct LifecycleGuard {
    lifecycle: Arc<ComponentLifecycle>,
}

impl Drop for LifecycleGuard {
    fn drop(&mut self) {
        self.lifecycle.release();
    }
}

/// Creates engines, holding one lifecycle reference per live engine.
pub struct EngineFactory {
    lifecycle: Arc<ComponentLifecycle>,
    config: BridgeConfig,
}

impl EngineFactory {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            lifecycle: Arc::new(ComponentLifecycle::new()),
            config,
        }
    }

    pub fn lifecycle(&self) -> &Arc<ComponentLifecycle> {
        &self.lifecycle
    }

    pub fn create<R: ScriptRuntime>(&self, runtime: R) -> EngineResult<ScriptEngine<R>> {
        let guard = self
            .lifecycle
            .guard()
            .ok_or(EngineError::LifecycleSaturated)?;
        Ok(ScriptEngine::with_config(runtime, self.config.clone()).with_lifecycle(guard))
    }
}
