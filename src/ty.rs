// Declared field descriptors. Built once per record type, introspected by the
// coercion engine (origin, args, nullability) instead of a runtime type system.
use std::any::Any;
use std::fmt;

use serde::de::DeserializeOwned;

use crate::catalog::{Class, Record};
use crate::error::{Error, Result};
use crate::value::{Object, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqKind {
    List,
    Tuple,
}

/// What a parameterized descriptor constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Scalar(ScalarKind),
    Map,
    Seq(SeqKind),
    Union,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    /// The "null allowed" alternative of a union.
    Null,
    Scalar(ScalarKind),
    /// Plain callable: a record type, built as a wrapper instance of that class.
    Record(Class),
    /// Plain callable: a value constructor (enum, value object, serde type).
    Construct(Constructor),
    /// Mapping with an optional value descriptor. Keys are always strings.
    Map(Option<Box<Ty>>),
    /// `origin: None` keeps the runtime container kind.
    Seq { origin: Option<SeqKind>, args: Vec<Ty> },
    Union(Vec<Ty>),
    /// Parameterized alias over a primitive, e.g. a tagged string.
    Generic { origin: ScalarKind, args: Vec<Ty> },
}

impl Ty {
    pub const fn bool() -> Self {
        Ty::Scalar(ScalarKind::Bool)
    }

    pub const fn int() -> Self {
        Ty::Scalar(ScalarKind::Int)
    }

    pub const fn float() -> Self {
        Ty::Scalar(ScalarKind::Float)
    }

    pub const fn str() -> Self {
        Ty::Scalar(ScalarKind::Str)
    }

    pub fn record<R: Record>() -> Self {
        Ty::Record(Class::of::<R>())
    }

    pub fn deserialize<T>() -> Self
    where
        T: DeserializeOwned + Any + fmt::Debug + Send + Sync,
    {
        Ty::Construct(Constructor::serde::<T>())
    }

    pub fn constructor(name: &'static str, build: fn(&Value) -> Result<Value>) -> Self {
        Ty::Construct(Constructor::new(name, build))
    }

    pub fn map() -> Self {
        Ty::Map(None)
    }

    pub fn map_of(value: Ty) -> Self {
        Ty::Map(Some(Box::new(value)))
    }

    pub fn list() -> Self {
        Ty::Seq { origin: Some(SeqKind::List), args: Vec::new() }
    }

    pub fn list_of(item: Ty) -> Self {
        Ty::Seq { origin: Some(SeqKind::List), args: vec![item] }
    }

    pub fn tuple() -> Self {
        Ty::Seq { origin: Some(SeqKind::Tuple), args: Vec::new() }
    }

    /// More than one element type is accepted here but fails on coercion.
    pub fn tuple_of(elems: impl IntoIterator<Item = Ty>) -> Self {
        Ty::Seq { origin: Some(SeqKind::Tuple), args: elems.into_iter().collect() }
    }

    pub fn seq_of(item: Ty) -> Self {
        Ty::Seq { origin: None, args: vec![item] }
    }

    pub fn optional(ty: Ty) -> Self {
        Ty::Union(vec![ty, Ty::Null])
    }

    pub fn union(alternatives: impl IntoIterator<Item = Ty>) -> Self {
        Ty::Union(alternatives.into_iter().collect())
    }

    pub fn generic(origin: ScalarKind, args: impl IntoIterator<Item = Ty>) -> Self {
        Ty::Generic { origin, args: args.into_iter().collect() }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Ty::Scalar(_))
    }

    pub fn origin(&self) -> Option<Origin> {
        match self {
            Ty::Map(_) => Some(Origin::Map),
            Ty::Seq { origin, .. } => origin.map(Origin::Seq),
            Ty::Union(_) => Some(Origin::Union),
            Ty::Generic { origin, .. } => Some(Origin::Scalar(*origin)),
            Ty::Null | Ty::Scalar(_) | Ty::Record(_) | Ty::Construct(_) => None,
        }
    }

    pub fn args(&self) -> &[Ty] {
        match self {
            Ty::Map(value) => value.as_deref().map_or(&[][..], std::slice::from_ref),
            Ty::Seq { args, .. } | Ty::Union(args) | Ty::Generic { args, .. } => args,
            Ty::Null | Ty::Scalar(_) | Ty::Record(_) | Ty::Construct(_) => &[],
        }
    }

    /// True for a union that names the null alternative.
    pub fn admits_null(&self) -> bool {
        matches!(self, Ty::Union(alts) if alts.contains(&Ty::Null))
    }
}

impl From<ScalarKind> for Ty {
    fn from(kind: ScalarKind) -> Self {
        Ty::Scalar(kind)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Str => "str",
        })
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Null => f.write_str("null"),
            Ty::Scalar(kind) => write!(f, "{kind}"),
            Ty::Record(class) => f.write_str(class.name()),
            Ty::Construct(ctor) => f.write_str(ctor.name()),
            Ty::Map(None) => f.write_str("map"),
            Ty::Map(Some(value)) => write!(f, "map<str, {value}>"),
            Ty::Seq { origin, args } => {
                f.write_str(match origin {
                    Some(SeqKind::List) => "list",
                    Some(SeqKind::Tuple) => "tuple",
                    None => "seq",
                })?;
                write_args(f, args, ", ")
            }
            Ty::Union(alts) => match alts.as_slice() {
                [ty, Ty::Null] | [Ty::Null, ty] => write!(f, "optional<{ty}>"),
                _ => {
                    f.write_str("union")?;
                    write_args(f, alts, " | ")
                }
            },
            Ty::Generic { origin, args } => {
                write!(f, "{origin}")?;
                write_args(f, args, ", ")
            }
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Ty], sep: &str) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(">")
}

// ----------------------------- Constructors ------------------------------- //

/// A plain callable applied to a raw value (mapping entries or a scalar).
#[derive(Clone, Copy)]
pub struct Constructor {
    name: &'static str,
    build: fn(&Value) -> Result<Value>,
}

impl Constructor {
    pub const fn new(name: &'static str, build: fn(&Value) -> Result<Value>) -> Self {
        Self { name, build }
    }

    /// Builds `T` through serde, reporting the JSON path of any failure.
    pub fn serde<T>() -> Self
    where
        T: DeserializeOwned + Any + fmt::Debug + Send + Sync,
    {
        Self::new(std::any::type_name::<T>(), build_serde::<T>)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, value: &Value) -> Result<Value> {
        (self.build)(value)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constructor").field(&self.name).finish()
    }
}

impl PartialEq for Constructor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn build_serde<T>(value: &Value) -> Result<Value>
where
    T: DeserializeOwned + Any + fmt::Debug + Send + Sync,
{
    if let Value::Object(obj) = value {
        if obj.is::<T>() {
            return Ok(value.clone());
        }
    }
    let target = std::any::type_name::<T>();
    let json = serde_json::to_value(value)
        .map_err(|e| Error::Construct { target: target.to_owned(), reason: e.to_string() })?;
    let typed = crate::path_de::from_value_with_path::<T>(json)
        .map_err(|reason| Error::Construct { target: target.to_owned(), reason })?;
    Ok(Value::Object(Object::new(typed)))
}
