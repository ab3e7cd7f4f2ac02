//! Typed attribute access over loosely-structured nested data.
//!
//! Declare a record type's fields once ([`Record`]), wrap a raw mapping in an
//! [`AttrDict`] of that class, and read fields by name. Nested mappings and
//! sequences are rebuilt into the declared shape on first read and cached.
//!
//! ```
//! use attr_osi::{AttrDict, Class, Fields, Record, Ty};
//!
//! struct Product;
//! impl Record for Product {
//!     const NAME: &'static str = "Product";
//!     fn declare(fields: &mut Fields) {
//!         fields.field("maxDevices", Ty::int());
//!     }
//! }
//!
//! struct Account;
//! impl Record for Account {
//!     const NAME: &'static str = "Account";
//!     fn declare(fields: &mut Fields) {
//!         fields.field("products", Ty::map_of(Ty::record::<Product>()));
//!     }
//! }
//!
//! let json = serde_json::json!({"products": {"EndpointSecure": {"maxDevices": 5}}});
//! let mut account = AttrDict::from_json(Class::of::<Account>(), json)?;
//! let max = account.lookup("products.EndpointSecure.maxDevices")?.try_i64()?;
//! assert_eq!(max, 5);
//! # Ok::<(), attr_osi::Error>(())
//! ```
pub mod attr_dict;
pub mod catalog;
pub mod coerce;
pub mod error;
pub mod path_de;
pub mod plain;
pub mod ty;
pub mod value;

pub use attr_dict::AttrDict;
pub use catalog::{catalog, Catalog, Class, Fields, Record};
pub use coerce::coerce;
pub use error::{Ambiguity, Error, Result};
pub use plain::PlainDict;
pub use ty::{Constructor, Origin, ScalarKind, SeqKind, Ty};
pub use value::{Map, Object, Shape, Value};
