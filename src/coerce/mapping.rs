use super::{coerce, construct, pick_alternative, Pick};
use crate::attr_dict::AttrDict;
use crate::error::{Ambiguity, Error, Result};
use crate::ty::{Origin, Ty};
use crate::value::{Map, Shape, Value};

pub(super) fn reconstruct(value: &Value, entries: &Map, ty: Option<&Ty>) -> Result<Value> {
    let Some(ty) = ty else {
        return Ok(Value::Dict(AttrDict::from_map(entries.clone())));
    };
    match ty.origin() {
        // e.g. a record type
        None => construct(ty, value),
        // e.g. optional<Dns>: a non-null value needs exactly one candidate
        Some(Origin::Union) => match pick_alternative(ty)? {
            Pick::One(alt) => coerce(value, Some(alt)),
            Pick::Ambiguous(alternatives) => {
                Err(Error::ambiguous(ty, Ambiguity::Optional { alternatives }))
            }
        },
        Some(Origin::Map) => match ty.args().first() {
            None => Ok(Value::Map(entries.clone())),
            Some(value_ty) => entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), coerce(v, Some(value_ty))?)))
                .collect::<Result<Map>>()
                .map(Value::Map),
        },
        Some(Origin::Seq(_) | Origin::Scalar(_)) => Err(Error::unsupported(ty, Shape::Mapping)),
    }
}
