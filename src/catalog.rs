//! Field catalogs: per record type, the declared descriptor of each field.
//!
//! A catalog holds exactly the fields a type declares itself. Inherited
//! declarations are reached through [`Class::ancestors`]. Catalogs are computed
//! on first use and memoized for the life of the process, keyed by type
//! identity; declarations are static so nothing ever invalidates them.
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::ty::Ty;

/// A record type whose instances are wrapper instances tagged with its class.
///
/// ```
/// use attr_osi::{Fields, Record, Ty};
///
/// struct Product;
///
/// impl Record for Product {
///     const NAME: &'static str = "Product";
///     fn declare(fields: &mut Fields) {
///         fields.field("maxDevices", Ty::int());
///     }
/// }
/// ```
pub trait Record: 'static {
    const NAME: &'static str;

    /// Declare this type's own fields. Must be pure: it may run more than
    /// once if threads race on first access.
    fn declare(fields: &mut Fields);

    /// The next type up the declaration chain, if any.
    fn parent() -> Option<Class> {
        None
    }
}

/// Runtime handle for a [`Record`] type.
#[derive(Clone, Copy)]
pub struct Class {
    id: fn() -> TypeId,
    name: &'static str,
    declare: fn(&mut Fields),
    parent: fn() -> Option<Class>,
}

impl Class {
    pub fn of<R: Record>() -> Self {
        Self { id: TypeId::of::<R>, name: R::NAME, declare: R::declare, parent: R::parent }
    }

    /// The engine's own wrapper type.
    pub fn base() -> Self {
        Self::of::<crate::attr_dict::AttrDict>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        (self.id)()
    }

    pub fn is_base(&self) -> bool {
        *self == Self::base()
    }

    pub fn parent(&self) -> Option<Class> {
        (self.parent)()
    }

    /// Declaring ancestors, most-derived first. Never yields the base type.
    pub fn ancestors(&self) -> impl Iterator<Item = Class> + use<> {
        std::iter::successors(self.parent(), Class::parent).filter(|c| !c.is_base())
    }

    pub fn is_subclass_of(&self, other: Class) -> bool {
        *self == other || self.ancestors().any(|c| c == other)
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        catalog(*self)
    }

    fn compute(&self) -> Catalog {
        let mut fields = Fields::default();
        (self.declare)(&mut fields);
        Catalog { fields: fields.fields }
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Class").field(&self.name).finish()
    }
}

/// Declaration builder handed to [`Record::declare`].
#[derive(Debug, Default)]
pub struct Fields {
    fields: IndexMap<String, Ty>,
}

impl Fields {
    /// Declaring a name twice keeps the later descriptor.
    pub fn field(&mut self, name: impl Into<String>, ty: Ty) -> &mut Self {
        self.fields.insert(name.into(), ty);
        self
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Catalog {
    fields: IndexMap<String, Ty>,
}

impl Catalog {
    pub fn get(&self, name: &str) -> Option<&Ty> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Ty)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ------------------------------- Memo ------------------------------------- //

static CATALOGS: Lazy<RwLock<HashMap<TypeId, Arc<Catalog>>>> = Lazy::new(Default::default);

/// The memoized catalog of `class`.
///
/// Computed outside the lock: racing first calls may each compute, but only
/// the first insert is kept and every caller gets that one.
pub fn catalog(class: Class) -> Arc<Catalog> {
    let id = class.type_id();
    let cached = CATALOGS.read().unwrap_or_else(PoisonError::into_inner).get(&id).cloned();
    if let Some(found) = cached {
        return found;
    }
    let computed = Arc::new(class.compute());
    tracing::trace!(class = class.name(), fields = computed.len(), "field catalog computed");
    let mut catalogs = CATALOGS.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(catalogs.entry(id).or_insert(computed))
}
