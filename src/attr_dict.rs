//! Wrapper instances: a raw store exposed through attribute-style access.
//!
//! Every read through [`AttrDict::get`] is coerced against the class catalog
//! and cached per field name. [`AttrDict::set`] and [`AttrDict::delete`] evict
//! the cached entry; recomputation happens on the next read.
//!
//! Direct keyed access ([`AttrDict::raw_mut`], [`AttrDict::insert`],
//! [`AttrDict::remove`]) does NOT touch the cache, so a field that was already
//! read keeps its old coerced value until it is set or deleted as an attribute.
use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::catalog::{Class, Fields, Record};
use crate::coerce::coerce;
use crate::error::{Error, Result};
use crate::ty::Ty;
use crate::value::{Map, Value};

// ------------------------------- Policy ----------------------------------- //

/// Names starting with this bypass coercion and the cache.
const PRIVATE_FIELD_MARKER: char = '_';

// -------------------------------- Types ----------------------------------- //

#[derive(Clone)]
pub struct AttrDict {
    class: Class,
    raw: Map,
    /// Created on first attribute read.
    cache: Option<HashMap<String, Value>>,
}

/// The base wrapper type declares nothing.
impl Record for AttrDict {
    const NAME: &'static str = "AttrDict";
    fn declare(_: &mut Fields) {}
}

impl AttrDict {
    pub fn new() -> Self {
        Self::from_map(Map::new())
    }

    pub fn from_map(raw: Map) -> Self {
        Self::with_class(Class::base(), raw)
    }

    pub fn of<R: Record>(raw: Map) -> Self {
        Self::with_class(Class::of::<R>(), raw)
    }

    pub fn with_class(class: Class, raw: Map) -> Self {
        Self { class, raw, cache: None }
    }

    /// Wrap a JSON object. Anything else is a mismatch.
    pub fn from_json(class: Class, json: serde_json::Value) -> Result<Self> {
        match Value::from(json) {
            Value::Map(raw) => Ok(Self::with_class(class, raw)),
            other => Err(Error::Mismatch { expected: "map", found: other.kind_name() }),
        }
    }

    pub fn class(&self) -> Class {
        self.class
    }

    /// Exactly of class `R`.
    pub fn is<R: Record>(&self) -> bool {
        self.class == Class::of::<R>()
    }

    /// Of class `R` or of a class declaring `R` as an ancestor.
    pub fn is_instance_of<R: Record>(&self) -> bool {
        let target = Class::of::<R>();
        target.is_base() || self.class.is_subclass_of(target)
    }

    // --------------------------- Attribute access ------------------------- //

    pub fn get(&mut self, name: &str) -> Result<&Value> {
        self.get_mut(name).map(|v| &*v)
    }

    /// Like [`get`](Self::get). Changes made through the returned reference
    /// stay in the cache; the raw store keeps its original value.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Value> {
        let class = self.class.name();
        if name.starts_with(PRIVATE_FIELD_MARKER) {
            return self.raw.get_mut(name).ok_or_else(|| not_found(class, name));
        }

        let hit = self.cache.as_ref().is_some_and(|cache| cache.contains_key(name));
        if !hit {
            let value = self.resolve(name)?;
            self.cache.get_or_insert_with(HashMap::new).insert(name.to_owned(), value);
        }
        self.cache
            .as_mut()
            .and_then(|cache| cache.get_mut(name))
            .ok_or_else(|| not_found(class, name))
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        self.evict(&name);
        self.raw.insert(name, value.into());
    }

    /// Remove and return the raw value of `name`.
    pub fn delete(&mut self, name: &str) -> Result<Value> {
        let removed = self
            .raw
            .shift_remove(name)
            .ok_or_else(|| not_found(self.class.name(), name))?;
        self.evict(name);
        Ok(removed)
    }

    /// Walk a dotted path (`"products.EndpointSecure.maxDevices"`), coercing
    /// and caching at every wrapper instance on the way.
    pub fn lookup(&mut self, path: &str) -> Result<&Value> {
        let mut hops = path.split('.');
        let mut current = self.get_mut(hops.next().unwrap_or(path))?;
        for hop in hops {
            current = current.attr_mut(hop)?;
        }
        Ok(&*current)
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.as_ref().is_some_and(|cache| cache.contains_key(name))
    }

    fn resolve(&self, name: &str) -> Result<Value> {
        let catalog = self.class.catalog();
        match self.raw.get(name) {
            // own declarations only: ancestors matter just for absent fields
            Some(raw) => {
                tracing::trace!(class = self.class.name(), field = name, "coercing attribute");
                coerce(raw, catalog.get(name))
            }
            None => {
                let declared_optional = catalog.get(name).is_some_and(Ty::admits_null)
                    || self
                        .class
                        .ancestors()
                        .any(|ancestor| ancestor.catalog().get(name).is_some_and(Ty::admits_null));
                if declared_optional {
                    Ok(Value::Null)
                } else {
                    Err(not_found(self.class.name(), name))
                }
            }
        }
    }

    fn evict(&mut self, name: &str) {
        if let Some(cache) = self.cache.as_mut() {
            cache.remove(name);
        }
    }

    // ----------------------------- Keyed access --------------------------- //

    pub fn raw(&self) -> &Map {
        &self.raw
    }

    /// Direct access to the raw store. Cached attributes are not invalidated.
    pub fn raw_mut(&mut self) -> &mut Map {
        &mut self.raw
    }

    /// Keyed insert. Cached attributes are not invalidated.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.raw.insert(key.into(), value.into())
    }

    /// Keyed removal. Cached attributes are not invalidated.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.raw.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.raw.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.raw.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn into_map(self) -> Map {
        self.raw
    }
}

fn not_found(class: &'static str, name: &str) -> Error {
    Error::FieldNotFound { class, name: name.to_owned() }
}

impl Default for AttrDict {
    fn default() -> Self {
        Self::new()
    }
}

/// Equal when class and raw store are; the cache is derived state.
impl PartialEq for AttrDict {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.raw == other.raw
    }
}

impl fmt::Debug for AttrDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(self.class.name()).field(&self.raw).finish()
    }
}

impl fmt::Display for AttrDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.raw) {
            Ok(json) => write!(f, "{}({json})", self.class.name()),
            Err(_) => write!(f, "{}({:?})", self.class.name(), self.raw),
        }
    }
}

impl Serialize for AttrDict {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(s)
    }
}
