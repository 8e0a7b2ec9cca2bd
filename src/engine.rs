//! Embedding lifecycle
//!
//! The state machine an embedding host drives: attach a site, push named
//! global items into the script runtime, parse and run script text, observe
//! state transitions. The engine composes the site adapter, the script
//! runtime and the bridge configuration; host-facing capabilities are
//! methods on this one type.

use std::sync::Arc;

use crate::config::BridgeConfig;
use crate::error::{EngineError, EngineResult, ScriptResult};
use crate::host::lifecycle::LifecycleGuard;
use crate::host::site::{HostSite, SiteAdapter};
use crate::value::{DispatchHandle, ScriptValue};

/// Engine lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initialized,
    Started,
    Connected,
    Disconnected,
    Closed,
}

/// Result of a state transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Changed,
    Unchanged,
}

/// The script runtime, as consumed by the bridge.
pub trait ScriptRuntime: Send {
    /// Load and execute script text.
    fn eval(&mut self, text: &str) -> ScriptResult<()>;

    /// Install a value as a global in the runtime's namespace.
    fn set_global(&mut self, name: &str, value: ScriptValue) -> ScriptResult<()>;

    /// Garbage collection hook; runtimes without one ignore it.
    fn collect_garbage(&mut self) {}
}

/// A script engine wired to an embedding host.
pub struct ScriptEngine<R: ScriptRuntime> {
    runtime: R,
    site: Option<SiteAdapter>,
    state: EngineState,
    config: BridgeConfig,
    _lifecycle: Option<LifecycleGuard>,
}

impl<R: ScriptRuntime> ScriptEngine<R> {
    pub fn new(runtime: R) -> Self {
        Self::with_config(runtime, BridgeConfig::default())
    }

    pub fn with_config(runtime: R, config: BridgeConfig) -> Self {
        Self {
            runtime,
            site: None,
            state: EngineState::Uninitialized,
            config,
            _lifecycle: None,
        }
    }

    pub(crate) fn with_lifecycle(mut self, guard: LifecycleGuard) -> Self {
        self._lifecycle = Some(guard);
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    /// Attach the host site and move to `Initialized`.
    pub fn set_site(&mut self, site: Arc<dyn HostSite>) {
        self.site = Some(SiteAdapter::with_config(site, &self.config));
        self.state = EngineState::Initialized;
        tracing::debug!(target: "bridge.engine", "site attached");
    }

    /// Request a state transition. A request for the current state is a
    /// reported no-op; transitions to any state except `Uninitialized` are
    /// signaled to the site.
    pub fn set_state(&mut self, new_state: EngineState) -> StateChange {
        if self.state == new_state {
            return StateChange::Unchanged;
        }
        if new_state != EngineState::Uninitialized {
            if let Some(site) = &self.site {
                site.notify_state(new_state);
            }
        }
        tracing::debug!(target: "bridge.engine", from = ?self.state, to = ?new_state, "state change");
        self.state = new_state;
        StateChange::Changed
    }

    /// First-time initialization: report `Initialized` if a site is attached.
    pub fn init_new(&mut self) -> StateChange {
        if self.site.is_some() {
            self.set_state(EngineState::Initialized)
        } else {
            StateChange::Unchanged
        }
    }

    /// Fetch `name` from the site and install it as a global in the script
    /// runtime. A missing site item installs nil.
    pub fn add_named_item(&mut self, name: &str) -> EngineResult<()> {
        let item = self
            .site
            .as_ref()
            .ok_or(EngineError::NoSite)?
            .named_item(name);
        self.runtime.set_global(name, item)?;
        tracing::debug!(target: "bridge.engine", name, "named item installed");
        Ok(())
    }

    /// Fetch the raw dispatch handle for a named site item.
    pub fn script_dispatch(&self, name: &str) -> EngineResult<DispatchHandle> {
        let site = self.site.as_ref().ok_or(EngineError::NoSite)?;
        Ok(site.dispatch_for(name)?)
    }

    /// Run script text: signal `Started`, evaluate, then return to
    /// `Initialized` with both transitions delivered to the site. Runtime
    /// errors propagate after the state is restored.
    pub fn parse_and_run(&mut self, text: &str) -> EngineResult<()> {
        if self.state == EngineState::Closed {
            return Err(EngineError::Closed);
        }
        let site = self.site.as_ref().ok_or(EngineError::NoSite)?.clone();
        if self.config.trace_calls {
            tracing::debug!(target: "bridge.engine", bytes = text.len(), "parse_and_run");
        }

        self.state = EngineState::Started;
        site.notify_state(EngineState::Started);
        let result = self.runtime.eval(text);
        site.on_leave_script();
        self.state = EngineState::Initialized;
        site.notify_state(EngineState::Initialized);

        result.map_err(|e| {
            tracing::warn!(target: "bridge.engine", "script evaluation failed: {e}");
            EngineError::Script(e)
        })
    }

    /// Install an event-handler scriptlet: binds `body` as a function-valued
    /// `event` member of the named item.
    pub fn install_event_handler(
        &mut self,
        item: &str,
        subitem: Option<&str>,
        event: &str,
        body: &str,
    ) -> EngineResult<()> {
        self.site.as_ref().ok_or(EngineError::NoSite)?;
        if item.is_empty() || event.is_empty() {
            return Err(EngineError::InvalidScriptlet(
                "item and event names are required".to_string(),
            ));
        }
        if subitem.is_some() {
            return Err(EngineError::InvalidScriptlet(
                "sub-item qualification is not supported".to_string(),
            ));
        }
        let code = format!("{item}.{event} = function() {{ {body} }}");
        self.runtime.eval(&code)?;
        Ok(())
    }

    /// Close the engine: signal `Closed` and detach the site.
    pub fn close(&mut self) {
        self.set_state(EngineState::Closed);
        self.site = None;
    }

    /// Host-driven garbage collection request.
    pub fn collect_garbage(&mut self) {
        self.runtime.collect_garbage();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HostResult, ScriptError};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubRuntime {
        evals: Vec<String>,
        globals: Vec<(String, ScriptValue)>,
        collected: usize,
        fail_next_eval: bool,
    }

    impl ScriptRuntime for StubRuntime {
        fn eval(&mut self, text: &str) -> ScriptResult<()> {
            if self.fail_next_eval {
                self.fail_next_eval = false;
                return Err(ScriptError::Runtime("parse error".to_string()));
            }
            self.evals.push(text.to_string());
            Ok(())
        }

        fn set_global(&mut self, name: &str, value: ScriptValue) -> ScriptResult<()> {
            self.globals.push((name.to_string(), value));
            Ok(())
        }

        fn collect_garbage(&mut self) {
            self.collected += 1;
        }
    }

    #[derive(Default)]
    struct RecordingSite {
        states: Mutex<Vec<EngineState>>,
        leaves: Mutex<usize>,
    }

    impl HostSite for RecordingSite {
        fn item(&self, _name: &str) -> HostResult<Option<DispatchHandle>> {
            Ok(None)
        }

        fn on_state_change(&self, state: EngineState) {
            self.states.lock().unwrap().push(state);
        }

        fn on_leave_script(&self) {
            *self.leaves.lock().unwrap() += 1;
        }
    }

    fn engine_with_site() -> (ScriptEngine<StubRuntime>, Arc<RecordingSite>) {
        let site = Arc::new(RecordingSite::default());
        let mut engine = ScriptEngine::new(StubRuntime::default());
        engine.set_site(site.clone());
        (engine, site)
    }

    #[test]
    fn test_set_site_initializes() {
        let (engine, site) = engine_with_site();
        assert_eq!(engine.state(), EngineState::Initialized);
        // Attaching itself does not notify.
        assert!(site.states.lock().unwrap().is_empty());
    }

    #[test]
    fn test_set_state_no_op_when_unchanged() {
        let (mut engine, site) = engine_with_site();
        assert_eq!(
            engine.set_state(EngineState::Initialized),
            StateChange::Unchanged
        );
        assert!(site.states.lock().unwrap().is_empty());

        assert_eq!(
            engine.set_state(EngineState::Connected),
            StateChange::Changed
        );
        assert_eq!(&*site.states.lock().unwrap(), &[EngineState::Connected]);
    }

    #[test]
    fn test_uninitialized_transition_is_not_notified() {
        let (mut engine, site) = engine_with_site();
        assert_eq!(
            engine.set_state(EngineState::Uninitialized),
            StateChange::Changed
        );
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(site.states.lock().unwrap().is_empty());
    }

    #[test]
    fn test_parse_and_run_round_trips_state() {
        let (mut engine, site) = engine_with_site();
        engine.parse_and_run("x = 1").unwrap();

        assert_eq!(engine.state(), EngineState::Initialized);
        assert_eq!(engine.runtime().evals, vec!["x = 1".to_string()]);
        assert_eq!(
            &*site.states.lock().unwrap(),
            &[EngineState::Started, EngineState::Initialized]
        );
        assert_eq!(*site.leaves.lock().unwrap(), 1);
    }

    #[test]
    fn test_parse_and_run_restores_state_on_error() {
        let (mut engine, site) = engine_with_site();
        engine.runtime_mut().fail_next_eval = true;
        let err = engine.parse_and_run("bad (").unwrap_err();
        assert!(matches!(err, EngineError::Script(_)));
        assert_eq!(engine.state(), EngineState::Initialized);
        assert_eq!(
            &*site.states.lock().unwrap(),
            &[EngineState::Started, EngineState::Initialized]
        );
    }

    #[test]
    fn test_operations_require_a_site() {
        let mut engine = ScriptEngine::new(StubRuntime::default());
        assert!(matches!(
            engine.parse_and_run("x = 1").unwrap_err(),
            EngineError::NoSite
        ));
        assert!(matches!(
            engine.add_named_item("window").unwrap_err(),
            EngineError::NoSite
        ));
        assert!(matches!(
            engine.script_dispatch("window").unwrap_err(),
            EngineError::NoSite
        ));
        assert_eq!(engine.init_new(), StateChange::Unchanged);
    }

    #[test]
    fn test_add_named_item_installs_global() {
        let (mut engine, _site) = engine_with_site();
        engine.add_named_item("window").unwrap();
        let globals = &engine.runtime().globals;
        assert_eq!(globals.len(), 1);
        assert_eq!(globals[0].0, "window");
        // The recording site has no items; nil is installed.
        assert_eq!(globals[0].1, ScriptValue::Nil);
    }

    #[test]
    fn test_install_event_handler_generates_binding() {
        let (mut engine, _site) = engine_with_site();
        engine
            .install_event_handler("window", None, "onload", "ready = 1")
            .unwrap();
        assert_eq!(
            engine.runtime().evals,
            vec!["window.onload = function() { ready = 1 }".to_string()]
        );

        let err = engine
            .install_event_handler("window", Some("frame"), "onload", "x")
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidScriptlet(_)));

        let err = engine
            .install_event_handler("", None, "onload", "x")
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidScriptlet(_)));
    }

    #[test]
    fn test_close_detaches_and_rejects_runs() {
        let (mut engine, site) = engine_with_site();
        engine.close();
        assert_eq!(engine.state(), EngineState::Closed);
        assert_eq!(&*site.states.lock().unwrap(), &[EngineState::Closed]);
        assert!(matches!(
            engine.parse_and_run("x = 1").unwrap_err(),
            EngineError::Closed
        ));
    }

    #[test]
    fn test_collect_garbage_delegates() {
        let (mut engine, _site) = engine_with_site();
        engine.collect_garbage();
        assert_eq!(engine.runtime().collected, 1);
    }
}
