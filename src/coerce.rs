//! Structural coercion: rebuild a raw value into the shape a descriptor asks for.
//!
//! Dispatch order:
//! - null stays null, whatever the descriptor;
//! - a primitive descriptor keeps the value as is (no cross-kind conversion);
//! - otherwise the *runtime* shape picks the rule (mapping, sequence, scalar)
//!   and the descriptor picks the target.
//!
//! Mapping and scalar values resolve a union to its single non-null
//! alternative. When there are several, mappings fail and scalars are kept
//! raw. Sequence values never resolve a union.
mod mapping;
mod scalar;
mod sequence;

use crate::attr_dict::AttrDict;
use crate::error::{Ambiguity, Error, Result};
use crate::ty::{SeqKind, Ty};
use crate::value::Value;

pub fn coerce(value: &Value, ty: Option<&Ty>) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    if ty.is_some_and(Ty::is_primitive) {
        return Ok(value.clone());
    }
    match value {
        // already wrapped: never wrap twice
        Value::Dict(_) => Ok(value.clone()),
        Value::Map(entries) => mapping::reconstruct(value, entries, ty),
        Value::List(items) => sequence::reconstruct(value, items, SeqKind::List, ty),
        Value::Tuple(items) => sequence::reconstruct(value, items, SeqKind::Tuple, ty),
        _ => scalar::reconstruct(value, ty),
    }
}

// ------------------------------- Helpers ---------------------------------- //

enum Pick<'a> {
    One(&'a Ty),
    Ambiguous(usize),
}

/// The single non-null alternative of `union`.
fn pick_alternative(union: &Ty) -> Result<Pick<'_>> {
    let mut non_null = union.args().iter().filter(|alt| **alt != Ty::Null);
    match (non_null.next(), non_null.count()) {
        (None, _) => Err(Error::ambiguous(union, Ambiguity::NakedUnion)),
        (Some(alt), 0) => Ok(Pick::One(alt)),
        (Some(_), rest) => Ok(Pick::Ambiguous(rest + 1)),
    }
}

/// Call a plain (unparameterized) descriptor on a raw value.
fn construct(ty: &Ty, value: &Value) -> Result<Value> {
    match ty {
        Ty::Record(class) => match value {
            Value::Map(entries) => Ok(Value::Dict(AttrDict::with_class(*class, entries.clone()))),
            other => Err(Error::Construct {
                target: class.name().to_owned(),
                reason: format!("expected mapping entries, found {}", other.kind_name()),
            }),
        },
        // already constructed
        Ty::Construct(_) if matches!(value, Value::Object(_)) => Ok(value.clone()),
        Ty::Construct(ctor) => ctor.call(value),
        Ty::Scalar(_) => Ok(value.clone()),
        _ => Err(Error::unsupported(ty, value.shape())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Class, Fields, Record};
    use crate::value::{Object, Shape};
    use serde_json::json;

    struct Dns;

    impl Record for Dns {
        const NAME: &'static str = "Dns";
        fn declare(fields: &mut Fields) {
            fields.field("server", Ty::str());
        }
    }

    struct Proxy;

    impl Record for Proxy {
        const NAME: &'static str = "Proxy";
        fn declare(fields: &mut Fields) {
            fields.field("port", Ty::int());
        }
    }

    #[derive(Debug, PartialEq)]
    enum Tier {
        Free,
        Pro,
    }

    fn tier(value: &Value) -> Result<Value> {
        match value.try_str()? {
            "free" => Ok(Value::Object(Object::new(Tier::Free))),
            "pro" => Ok(Value::Object(Object::new(Tier::Pro))),
            other => Err(Error::Construct {
                target: "Tier".to_owned(),
                reason: format!("unknown tier `{other}`"),
            }),
        }
    }

    fn raw(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn null_is_never_manufactured_into_anything() {
        for ty in [Ty::int(), Ty::record::<Dns>(), Ty::list_of(Ty::int()), Ty::Union(Vec::new())] {
            assert_eq!(coerce(&Value::Null, Some(&ty)).unwrap(), Value::Null);
        }
        assert_eq!(coerce(&Value::Null, None).unwrap(), Value::Null);
    }

    #[test]
    fn primitive_descriptors_do_not_convert() {
        let v = raw(json!("5"));
        assert_eq!(coerce(&v, Some(&Ty::int())).unwrap(), v);
        let m = raw(json!({"a": 1}));
        assert_eq!(coerce(&m, Some(&Ty::str())).unwrap(), m);
    }

    #[test]
    fn undeclared_mapping_becomes_base_wrapper() {
        let out = coerce(&raw(json!({"a": 1})), None).unwrap();
        let dict = out.as_dict().unwrap();
        assert!(dict.class().is_base());
        assert_eq!(dict.raw()["a"], Value::Int(1));
    }

    #[test]
    fn record_descriptor_builds_that_class() {
        let out = coerce(&raw(json!({"server": "1.1.1.1"})), Some(&Ty::record::<Dns>())).unwrap();
        assert!(out.as_dict().unwrap().is::<Dns>());
    }

    #[test]
    fn wrapper_instances_pass_through_any_descriptor() {
        let wrapped = coerce(&raw(json!({"server": "x"})), Some(&Ty::record::<Dns>())).unwrap();
        for ty in [
            None,
            Some(Ty::record::<Proxy>()),
            Some(Ty::union([Ty::record::<Dns>(), Ty::record::<Proxy>()])),
            Some(Ty::list_of(Ty::int())),
        ] {
            let again = coerce(&wrapped, ty.as_ref()).unwrap();
            assert_eq!(again, wrapped);
            assert!(again.as_dict().unwrap().is::<Dns>());
        }
    }

    #[test]
    fn optional_record_on_mapping_selects_the_record() {
        let ty = Ty::optional(Ty::record::<Proxy>());
        let out = coerce(&raw(json!({"port": 8080})), Some(&ty)).unwrap();
        assert!(out.as_dict().unwrap().is::<Proxy>());
    }

    #[test]
    fn ambiguous_union_on_mapping_fails() {
        let ty = Ty::union([Ty::record::<Dns>(), Ty::record::<Proxy>(), Ty::Null]);
        let err = coerce(&raw(json!({"port": 1})), Some(&ty)).unwrap_err();
        assert_eq!(
            err,
            Error::AmbiguousDeclaration {
                ty: ty.to_string(),
                reason: Ambiguity::Optional { alternatives: 2 },
            }
        );
    }

    #[test]
    fn ambiguous_union_on_scalar_keeps_raw_value() {
        let ty = Ty::union([Ty::constructor("Tier", tier), Ty::int()]);
        let v = raw(json!("pro"));
        assert_eq!(coerce(&v, Some(&ty)).unwrap(), v);
    }

    #[test]
    fn naked_union_fails_on_every_path() {
        for ty in [Ty::Union(Vec::new()), Ty::optional(Ty::Null)] {
            for v in [raw(json!({"a": 1})), raw(json!("x")), raw(json!([1]))] {
                let err = coerce(&v, Some(&ty)).unwrap_err();
                assert!(
                    matches!(err, Error::AmbiguousDeclaration { reason: Ambiguity::NakedUnion, .. }),
                    "{err}"
                );
            }
        }
    }

    #[test]
    fn scalar_constructor_wraps_value_objects() {
        let out = coerce(&raw(json!("pro")), Some(&Ty::constructor("Tier", tier))).unwrap();
        assert_eq!(out.downcast_ref::<Tier>(), Some(&Tier::Pro));

        let opt = Ty::optional(Ty::constructor("Tier", tier));
        let out = coerce(&raw(json!("free")), Some(&opt)).unwrap();
        assert_eq!(out.downcast_ref::<Tier>(), Some(&Tier::Free));

        let err = coerce(&raw(json!("gold")), Some(&opt)).unwrap_err();
        assert!(matches!(err, Error::Construct { .. }));
    }

    #[test]
    fn generic_over_primitive_is_identity_on_scalars() {
        let ty = Ty::generic(crate::ty::ScalarKind::Str, [Ty::str()]);
        let v = raw(json!("abc"));
        assert_eq!(coerce(&v, Some(&ty)).unwrap(), v);
    }

    #[test]
    fn container_descriptors_reject_scalars() {
        for ty in [Ty::map_of(Ty::int()), Ty::list_of(Ty::int())] {
            let err = coerce(&raw(json!(3)), Some(&ty)).unwrap_err();
            assert_eq!(err, Error::UnsupportedShape { ty: ty.to_string(), shape: Shape::Scalar });
        }
    }

    #[test]
    fn record_descriptor_rejects_scalars() {
        let err = coerce(&raw(json!(3)), Some(&Ty::record::<Dns>())).unwrap_err();
        assert!(matches!(err, Error::Construct { target, .. } if target == "Dns"));
    }

    #[test]
    fn map_descriptor_coerces_each_value() {
        let ty = Ty::map_of(Ty::record::<Proxy>());
        let out = coerce(&raw(json!({"a": {"port": 1}, "b": {"port": 2}})), Some(&ty)).unwrap();
        let m = out.as_map().unwrap();
        assert!(m.values().all(|v| v.as_dict().is_some_and(|d| d.is::<Proxy>())));
    }

    #[test]
    fn bare_map_descriptor_copies_entries() {
        let v = raw(json!({"a": {"b": 1}}));
        assert_eq!(coerce(&v, Some(&Ty::map())).unwrap(), v);
    }

    #[test]
    fn tuple_against_list_descriptor_becomes_list() {
        let tuple = Value::Tuple(vec![raw(json!({"port": 1})), raw(json!({"port": 2}))]);
        let out = coerce(&tuple, Some(&Ty::list_of(Ty::record::<Proxy>()))).unwrap();
        let Value::List(items) = out else { panic!("expected list") };
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|v| v.as_dict().is_some_and(|d| d.is::<Proxy>())));
    }

    #[test]
    fn undeclared_sequences_keep_their_kind_and_wrap_mappings() {
        let tuple = Value::Tuple(vec![raw(json!({"a": 1})), Value::Int(2)]);
        let Value::Tuple(items) = coerce(&tuple, None).unwrap() else { panic!("kind lost") };
        assert!(items[0].as_dict().is_some());
        assert_eq!(items[1], Value::Int(2));

        let list = raw(json!([[{"a": 1}]]));
        let out = coerce(&list, Some(&Ty::seq_of(Ty::list()))).unwrap();
        let inner = &out.as_slice().unwrap()[0].as_slice().unwrap()[0];
        assert!(inner.as_dict().is_some());
    }

    #[test]
    fn plain_descriptor_on_sequence_recurses_without_element_type() {
        let out = coerce(&raw(json!([{"server": "a"}])), Some(&Ty::record::<Dns>())).unwrap();
        assert!(out.as_slice().unwrap()[0].as_dict().unwrap().class().is_base());
    }

    #[test]
    fn multi_argument_sequence_is_ambiguous() {
        let ty = Ty::tuple_of([Ty::int(), Ty::str()]);
        let err = coerce(&raw(json!([1, "a"])), Some(&ty)).unwrap_err();
        assert!(matches!(
            err,
            Error::AmbiguousDeclaration { reason: Ambiguity::Sequence { arity: 2 }, .. }
        ));
    }

    #[test]
    fn union_on_sequence_is_ambiguous() {
        let seq = raw(json!([1, 2]));
        for ty in [
            Ty::optional(Ty::list_of(Ty::int())),
            Ty::union([Ty::list(), Ty::tuple()]),
        ] {
            let err = coerce(&seq, Some(&ty)).unwrap_err();
            assert_eq!(
                err,
                Error::AmbiguousDeclaration {
                    ty: ty.to_string(),
                    reason: Ambiguity::Sequence { arity: 2 },
                }
            );
        }
    }

    #[test]
    fn single_primitive_alternative_keeps_the_value() {
        let opt_int = Ty::optional(Ty::int());
        let five = raw(json!("5"));
        assert_eq!(coerce(&five, Some(&opt_int)).unwrap(), five);

        let opt_str = Ty::optional(Ty::str());
        let m = raw(json!({"a": 1}));
        assert_eq!(coerce(&m, Some(&opt_str)).unwrap(), m);
    }

    #[test]
    fn constructed_objects_are_not_rebuilt() {
        let ctor = Ty::constructor("Tier", tier);
        let built = coerce(&raw(json!("pro")), Some(&ctor)).unwrap();
        let again = coerce(&built, Some(&ctor)).unwrap();
        assert_eq!(again, built);
        assert_eq!(again.downcast_ref::<Tier>(), Some(&Tier::Pro));

        let again = coerce(&built, Some(&Ty::optional(ctor))).unwrap();
        assert_eq!(again, built);
    }

    #[test]
    fn mapping_descriptor_rejects_sequences() {
        let err = coerce(&raw(json!([1])), Some(&Ty::map())).unwrap_err();
        assert!(matches!(err, Error::UnsupportedShape { shape: Shape::Sequence, .. }));
    }

    #[test]
    fn base_class_is_the_default_wrapper() {
        let out = coerce(&raw(json!({})), None).unwrap();
        assert_eq!(out.as_dict().unwrap().class(), Class::base());
    }
}
