//! Raw and coerced values.
//!
//! One tree type carries both sides of coercion: raw input (null, scalars,
//! `Map`, `List`, `Tuple`) and reconstructed output (`Dict` wrapper instances
//! and opaque `Object`s built by plain constructors).
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::attr_dict::AttrDict;
use crate::error::{Error, Result};

/// Raw mapping. Keeps insertion order like serde_json's `preserve_order`.
pub type Map = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    /// Variable-length sequence.
    List(Vec<Value>),
    /// Fixed-length sequence.
    Tuple(Vec<Value>),
    Map(Map),
    Dict(AttrDict),
    Object(Object),
}

/// Runtime shape used to dispatch reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Null,
    Scalar,
    Mapping,
    Sequence,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Null => "null",
            Shape::Scalar => "scalar",
            Shape::Mapping => "mapping",
            Shape::Sequence => "sequence",
        })
    }
}

impl Value {
    pub fn shape(&self) -> Shape {
        match self {
            Value::Null => Shape::Null,
            Value::Map(_) | Value::Dict(_) => Shape::Mapping,
            Value::List(_) | Value::Tuple(_) => Shape::Sequence,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) | Value::Object(_) => {
                Shape::Scalar
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
            Value::Dict(_) => "dict",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats here; raw JSON often writes `5` for `5.0`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f.into_inner()),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::List(xs) | Value::Tuple(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&AttrDict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut AttrDict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Object(o) => o.downcast_ref(),
            _ => None,
        }
    }

    pub fn try_bool(&self) -> Result<bool> {
        self.as_bool().ok_or_else(|| self.mismatch("bool"))
    }

    pub fn try_i64(&self) -> Result<i64> {
        self.as_i64().ok_or_else(|| self.mismatch("int"))
    }

    pub fn try_f64(&self) -> Result<f64> {
        self.as_f64().ok_or_else(|| self.mismatch("float"))
    }

    pub fn try_str(&self) -> Result<&str> {
        self.as_str().ok_or_else(|| self.mismatch("str"))
    }

    pub fn try_slice(&self) -> Result<&[Value]> {
        self.as_slice().ok_or_else(|| self.mismatch("sequence"))
    }

    pub fn try_dict_mut(&mut self) -> Result<&mut AttrDict> {
        let found = self.kind_name();
        self.as_dict_mut()
            .ok_or(Error::Mismatch { expected: "dict", found })
    }

    /// One attribute hop: coerced `get` on wrapper instances, keyed lookup on
    /// plain mappings.
    pub fn attr_mut(&mut self, name: &str) -> Result<&mut Value> {
        match self {
            Value::Dict(d) => d.get_mut(name),
            Value::Map(m) => m.get_mut(name).ok_or_else(|| Error::FieldNotFound {
                class: "map",
                name: name.to_owned(),
            }),
            other => Err(other.mismatch("mapping")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::Mismatch { expected, found: self.kind_name() }
    }
}

// ------------------------------- Objects ---------------------------------- //

trait Opaque: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> Opaque for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A value built by a plain constructor (enum, value object, serde type).
/// Clones share the same instance.
#[derive(Clone)]
pub struct Object {
    type_name: &'static str,
    inner: Arc<dyn Opaque>,
}

impl Object {
    pub fn new<T: Any + fmt::Debug + Send + Sync>(value: T) -> Self {
        Self { type_name: std::any::type_name::<T>(), inner: Arc::new(value) }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// ----------------------------- Conversions -------------------------------- //

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map_or(Value::Null, |f| Value::Float(OrderedFloat(f))),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(xs) => Value::List(xs.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(m) => {
                Value::Map(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(OrderedFloat(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(xs: Vec<Value>) -> Self {
        Value::List(xs)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

impl From<AttrDict> for Value {
    fn from(d: AttrDict) -> Self {
        Value::Dict(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(x: Option<T>) -> Self {
        x.map_or(Value::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => s.serialize_unit(),
            Value::Bool(b) => s.serialize_bool(*b),
            Value::Int(i) => s.serialize_i64(*i),
            Value::Float(f) => s.serialize_f64(f.into_inner()),
            Value::Str(x) => s.serialize_str(x),
            Value::List(xs) | Value::Tuple(xs) => s.collect_seq(xs),
            Value::Map(m) => s.collect_map(m),
            Value::Dict(d) => d.serialize(s),
            Value::Object(o) => Err(serde::ser::Error::custom(format!(
                "`{}` has no raw form",
                o.type_name()
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(d).map(Value::from)
    }
}
