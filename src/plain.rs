//! Attribute access with no declarations: every read, write, and delete goes
//! straight to the backing store. No coercion, no cache.
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::value::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlainDict {
    raw: Map,
}

impl PlainDict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(raw: Map) -> Self {
        Self { raw }
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        self.raw.get(name).ok_or_else(|| not_found(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Value> {
        self.raw.get_mut(name).ok_or_else(|| not_found(name))
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.raw.insert(name.into(), value.into());
    }

    pub fn delete(&mut self, name: &str) -> Result<Value> {
        self.raw.shift_remove(name).ok_or_else(|| not_found(name))
    }

    pub fn raw(&self) -> &Map {
        &self.raw
    }

    pub fn into_map(self) -> Map {
        self.raw
    }
}

fn not_found(name: &str) -> Error {
    Error::FieldNotFound { class: "PlainDict", name: name.to_owned() }
}

impl From<Map> for PlainDict {
    fn from(raw: Map) -> Self {
        Self::from_map(raw)
    }
}

impl fmt::Display for PlainDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.raw) {
            Ok(json) => write!(f, "PlainDict({json})"),
            Err(_) => write!(f, "PlainDict({:?})", self.raw),
        }
    }
}

impl Serialize for PlainDict {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(s)
    }
}
