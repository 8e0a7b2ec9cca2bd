//! Script-side value model
//!
//! The script runtime's value type as consumed by the bridge: a tagged
//! variant with keyed access, primitive coercions and a generic call
//! operation. The bridge produces and consumes instances; it never extends
//! the variant set.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::{ScriptError, ScriptResult};
use crate::value::host::DispatchHandle;

/// A script string: a byte string, not a char-counted one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScriptStr(Vec<u8>);

impl ScriptStr {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Byte length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for ScriptStr {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for ScriptStr {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl PartialEq<str> for ScriptStr {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for ScriptStr {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for ScriptStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

/// Capabilities every script object value supports.
///
/// Objects are polymorphic over call, keyed member access, deferred read and
/// write; each capability defaults to a typed refusal so implementors only
/// provide what their kind supports.
pub trait ScriptObject: Send + Sync {
    /// Invoke the object as a callable with a logical-order argument array.
    fn call(&self, _args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
        Err(ScriptError::NotCallable {
            type_name: self.type_name(),
        })
    }

    /// Keyed member lookup. Defaults to plain indexed access.
    fn get_member(&self, key: &str) -> ScriptResult<ScriptValue> {
        self.index(key)
    }

    /// Keyed member write.
    fn put_member(&self, _key: &str, _value: ScriptValue) -> ScriptResult<()> {
        Err(ScriptError::NotWritable {
            type_name: self.type_name(),
        })
    }

    /// Plain keyed slot access on the object's own associative store.
    fn index(&self, _key: &str) -> ScriptResult<ScriptValue> {
        Ok(ScriptValue::Nil)
    }

    /// Plain keyed slot write.
    fn set_index(&self, _key: &str, _value: ScriptValue) -> ScriptResult<()> {
        Err(ScriptError::NotWritable {
            type_name: self.type_name(),
        })
    }

    /// Deferred-value read.
    fn read(&self) -> ScriptResult<ScriptValue> {
        Err(ScriptError::NotReadable {
            type_name: self.type_name(),
        })
    }

    /// Deferred-value write.
    fn write(&self, _rhs: ScriptValue) -> ScriptResult<ScriptValue> {
        Err(ScriptError::NotWritable {
            type_name: self.type_name(),
        })
    }

    fn type_name(&self) -> &'static str {
        "object"
    }

    /// String coercion.
    fn display(&self) -> String {
        format!("[object {}]", self.type_name())
    }
}

/// The script runtime's tagged value variant.
#[derive(Clone)]
pub enum ScriptValue {
    Nil,
    Int(i32),
    Byte(u8),
    Float(f64),
    Str(ScriptStr),
    /// A payload the script side already holds that is a valid host
    /// dispatchable handle. Carried typed; no wrapping happens on marshal.
    Pointer(DispatchHandle),
    Array(Arc<Mutex<Vec<ScriptValue>>>),
    /// Opaque coroutine token.
    Thread(u64),
    Object(Arc<dyn ScriptObject>),
}

impl ScriptValue {
    pub fn array(items: Vec<ScriptValue>) -> Self {
        Self::Array(Arc::new(Mutex::new(items)))
    }

    pub fn string(s: &str) -> Self {
        Self::Str(ScriptStr::from(s))
    }

    pub fn object<O: ScriptObject + 'static>(o: O) -> Self {
        Self::Object(Arc::new(o))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Int(_) => "int",
            Self::Byte(_) => "byte",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Pointer(_) => "pointer",
            Self::Array(_) => "array",
            Self::Thread(_) => "thread",
            Self::Object(o) => o.type_name(),
        }
    }

    /// Generic call operation.
    pub fn call(&self, args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
        match self {
            Self::Object(o) => o.call(args),
            _ => Err(ScriptError::NotCallable {
                type_name: self.type_name(),
            }),
        }
    }

    /// Keyed access. Objects delegate to their member lookup; arrays accept
    /// decimal index keys; other kinds yield nil.
    pub fn get_key(&self, key: &str) -> ScriptResult<ScriptValue> {
        match self {
            Self::Object(o) => o.get_member(key),
            Self::Array(items) => {
                let items = items.lock().expect("array lock poisoned");
                Ok(key
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i).cloned())
                    .unwrap_or(ScriptValue::Nil))
            }
            _ => Ok(ScriptValue::Nil),
        }
    }

    /// Length query for aggregate kinds.
    pub fn length(&self) -> usize {
        match self {
            Self::Array(items) => items.lock().expect("array lock poisoned").len(),
            Self::Str(s) => s.len(),
            _ => 0,
        }
    }

    /// Append to an array value.
    pub fn push(&self, value: ScriptValue) -> ScriptResult<()> {
        match self {
            Self::Array(items) => {
                items.lock().expect("array lock poisoned").push(value);
                Ok(())
            }
            _ => Err(ScriptError::NotWritable {
                type_name: self.type_name(),
            }),
        }
    }

    /// String coercion for every kind.
    pub fn display_string(&self) -> String {
        match self {
            Self::Nil => "nil".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Byte(b) => b.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => s.to_string_lossy(),
            Self::Pointer(_) => "[pointer]".to_string(),
            Self::Array(items) => {
                format!("[array {}]", items.lock().expect("array lock poisoned").len())
            }
            Self::Thread(id) => format!("[thread {id}]"),
            Self::Object(o) => o.display(),
        }
    }
}

impl fmt::Debug for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("Nil"),
            Self::Int(i) => write!(f, "Int({i})"),
            Self::Byte(b) => write!(f, "Byte({b})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Pointer(_) => f.write_str("Pointer"),
            Self::Array(items) => {
                write!(f, "Array(len={})", items.lock().expect("array lock poisoned").len())
            }
            Self::Thread(id) => write!(f, "Thread({id})"),
            Self::Object(o) => write!(f, "Object({})", o.type_name()),
        }
    }
}

impl PartialEq for ScriptValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Pointer(a), Self::Pointer(b)) => a.ptr_eq(b),
            (Self::Array(a), Self::Array(b)) => Arc::ptr_eq(a, b),
            (Self::Thread(a), Self::Thread(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A native function exposed to script code as a callable object value.
pub struct NativeFunction {
    name: String,
    func: Box<dyn Fn(&[ScriptValue]) -> ScriptResult<ScriptValue> + Send + Sync>,
}

impl NativeFunction {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&[ScriptValue]) -> ScriptResult<ScriptValue> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            func: Box::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ScriptObject for NativeFunction {
    fn call(&self, args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
        (self.func)(args)
    }

    fn type_name(&self) -> &'static str {
        "function"
    }

    fn display(&self) -> String {
        format!("[function {}]", self.name)
    }
}

/// A plain script object backed by an associative store. Script runtimes use
/// richer representations; this one covers natives and tests.
#[derive(Default)]
pub struct TableObject {
    slots: Mutex<HashMap<String, ScriptValue>>,
}

impl TableObject {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScriptObject for TableObject {
    fn index(&self, key: &str) -> ScriptResult<ScriptValue> {
        let slots = self.slots.lock().expect("table lock poisoned");
        Ok(slots.get(key).cloned().unwrap_or(ScriptValue::Nil))
    }

    fn set_index(&self, key: &str, value: ScriptValue) -> ScriptResult<()> {
        let mut slots = self.slots.lock().expect("table lock poisoned");
        slots.insert(key.to_string(), value);
        Ok(())
    }

    fn put_member(&self, key: &str, value: ScriptValue) -> ScriptResult<()> {
        self.set_index(key, value)
    }

    fn type_name(&self) -> &'static str {
        "table"
    }
}
