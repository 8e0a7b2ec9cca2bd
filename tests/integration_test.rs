use script_bridge::{
    to_host, to_script, BridgeConfig, Dispatch, DispatchHandle, EngineFactory, EngineState,
    HostError, HostResult, HostSite, HostValue, InvokeKind, MemberId, NativeFunction,
    ResolveError, ScriptError, ScriptObject, ScriptResult, ScriptRuntime, ScriptValue,
    TableObject,
};
use std::sync::{Arc, Mutex};

/// A host object with one property "Count" = 42 and one method "Add" that
/// computes first * 10 + second from protocol-order arguments.
struct HostCounter;

impl Dispatch for HostCounter {
    fn resolve(&self, name: &str) -> Result<MemberId, ResolveError> {
        match name {
            "Count" => Ok(1),
            "Add" => Ok(2),
            _ => Err(ResolveError::UnknownName {
                name: name.to_string(),
            }),
        }
    }

    fn invoke(&self, id: MemberId, kind: InvokeKind, args: &[HostValue]) -> HostResult<HostValue> {
        match (id, kind) {
            (1, InvokeKind::PropertyGet) => Ok(HostValue::I32(42)),
            (2, InvokeKind::Method) => {
                // Protocol order: last logical argument first.
                let (HostValue::I32(b), HostValue::I32(a)) = (&args[0], &args[1]) else {
                    return Err(HostError::Protocol("two ints required".to_string()));
                };
                Ok(HostValue::I32(a * 10 + b))
            }
            _ => Err(HostError::Protocol("bad invoke".to_string())),
        }
    }
}

struct CounterSite;

impl HostSite for CounterSite {
    fn item(&self, name: &str) -> HostResult<Option<DispatchHandle>> {
        match name {
            "counter" => Ok(Some(DispatchHandle::from_dispatch(HostCounter))),
            _ => Ok(None),
        }
    }
}

#[derive(Default)]
struct StubRuntime {
    globals: Mutex<Vec<(String, ScriptValue)>>,
    evals: Mutex<Vec<String>>,
}

impl ScriptRuntime for StubRuntime {
    fn eval(&mut self, text: &str) -> ScriptResult<()> {
        self.evals.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn set_global(&mut self, name: &str, value: ScriptValue) -> ScriptResult<()> {
        self.globals.lock().unwrap().push((name.to_string(), value));
        Ok(())
    }
}

fn adder() -> ScriptValue {
    ScriptValue::object(NativeFunction::new("add", |args| {
        let (ScriptValue::Int(a), ScriptValue::Int(b)) = (&args[0], &args[1]) else {
            return Err(ScriptError::Runtime("add() requires two ints".to_string()));
        };
        Ok(ScriptValue::Int(a + b))
    }))
}

#[test]
fn test_host_invokes_script_callable_with_reversed_arguments() {
    let f = adder();
    let direct = f.call(&[ScriptValue::Int(3), ScriptValue::Int(5)]).unwrap();

    // Expose to the host; the host sends arguments in protocol order.
    let HostValue::Dispatch(proxy) = to_host(&f).unwrap() else {
        panic!("expected a dispatch handle");
    };
    let result = proxy
        .invoke(
            0,
            InvokeKind::Method,
            &[HostValue::I32(5), HostValue::I32(3)],
        )
        .unwrap();

    assert_eq!(to_script(result).unwrap(), direct);
    assert_eq!(direct, ScriptValue::Int(8));
}

#[test]
fn test_script_reads_host_property_through_bound_member() {
    let host = to_script(HostValue::Dispatch(DispatchHandle::from_dispatch(
        HostCounter,
    )))
    .unwrap();
    let ScriptValue::Object(proxy) = host else {
        panic!("expected an inbound proxy");
    };
    let ScriptValue::Object(member) = proxy.get_member("Count").unwrap() else {
        panic!("expected a bound member");
    };
    assert_eq!(member.read().unwrap(), ScriptValue::Int(42));
}

#[test]
fn test_script_calls_host_method_in_logical_order() {
    let proxy = to_script(HostValue::Dispatch(DispatchHandle::from_dispatch(
        HostCounter,
    )))
    .unwrap();
    let ScriptValue::Object(proxy) = proxy else {
        panic!("expected an inbound proxy");
    };
    let ScriptValue::Object(add) = proxy.get_member("Add").unwrap() else {
        panic!("expected a bound member");
    };
    // Logical call Add(3, 5): the handle reverses into protocol order, the
    // host computes first * 10 + second.
    let result = add
        .call(&[ScriptValue::Int(3), ScriptValue::Int(5)])
        .unwrap();
    assert_eq!(result, ScriptValue::Int(35));
}

#[test]
fn test_unknown_name_falls_back_to_indexed_access() {
    let proxy = to_script(HostValue::Dispatch(DispatchHandle::from_dispatch(
        HostCounter,
    )))
    .unwrap();
    let ScriptValue::Object(proxy) = proxy else {
        panic!("expected an inbound proxy");
    };
    proxy.set_index("x", ScriptValue::Int(9)).unwrap();
    assert_eq!(proxy.get_member("x").unwrap(), ScriptValue::Int(9));
}

#[test]
fn test_object_round_trip_behaves_like_the_original() {
    let table = TableObject::new();
    table.set_index("hp", ScriptValue::Int(100)).unwrap();
    let original = ScriptValue::object(table);

    // Out to the host and back: a new inbound proxy whose reads round-trip
    // through the original object.
    let host = to_host(&original).unwrap();
    let back = to_script(host).unwrap();
    let ScriptValue::Object(proxy) = back else {
        panic!("expected an inbound proxy");
    };
    let ScriptValue::Object(member) = proxy.get_member("hp").unwrap() else {
        panic!("expected a bound member");
    };
    assert_eq!(member.read().unwrap(), ScriptValue::Int(100));
}

#[test]
fn test_host_release_obligation_destroys_proxy() {
    let HostValue::Dispatch(proxy) = to_host(&adder()).unwrap() else {
        panic!("expected a dispatch handle");
    };
    // The marshaler acquired once on the host's behalf.
    assert_eq!(proxy.release(), 0);
    let err = proxy.invoke(0, InvokeKind::Method, &[]).unwrap_err();
    assert_eq!(err, HostError::UnexpectedInternal);
}

#[test]
fn test_engine_setup_and_run() {
    let factory = EngineFactory::new(BridgeConfig::default());
    let mut engine = factory.create(StubRuntime::default()).unwrap();
    assert!(!factory.lifecycle().can_unload());

    engine.set_site(Arc::new(CounterSite));
    engine.add_named_item("counter").unwrap();
    engine.parse_and_run("count = counter.Count").unwrap();
    assert_eq!(engine.state(), EngineState::Initialized);

    // The installed global is an inbound proxy over the site's object.
    let globals = engine.runtime().globals.lock().unwrap();
    let (name, value) = &globals[0];
    assert_eq!(name, "counter");
    let ScriptValue::Object(proxy) = value else {
        panic!("expected an inbound proxy global");
    };
    let ScriptValue::Object(member) = proxy.get_member("Count").unwrap() else {
        panic!("expected a bound member");
    };
    assert_eq!(member.read().unwrap(), ScriptValue::Int(42));
    drop(globals);

    // A name the site does not have installs nil.
    engine.add_named_item("missing").unwrap();
    assert_eq!(
        engine.runtime().globals.lock().unwrap()[1].1,
        ScriptValue::Nil
    );

    drop(engine);
    assert!(factory.lifecycle().can_unload());
}

#[test]
fn test_marshal_refusals_are_loud_end_to_end() {
    // An array argument from the script side never silently reaches the host.
    let proxy = to_script(HostValue::Dispatch(DispatchHandle::from_dispatch(
        HostCounter,
    )))
    .unwrap();
    let ScriptValue::Object(proxy) = proxy else {
        panic!("expected an inbound proxy");
    };
    let ScriptValue::Object(add) = proxy.get_member("Add").unwrap() else {
        panic!("expected a bound member");
    };
    let err = add.call(&[ScriptValue::array(vec![])]).unwrap_err();
    assert!(matches!(err, ScriptError::Marshal(_)));
}
