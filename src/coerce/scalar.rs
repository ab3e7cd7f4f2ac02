use super::{coerce, construct, pick_alternative, Pick};
use crate::error::{Error, Result};
use crate::ty::{Origin, Ty};
use crate::value::{Shape, Value};

pub(super) fn reconstruct(value: &Value, ty: Option<&Ty>) -> Result<Value> {
    let Some(ty) = ty else {
        return Ok(value.clone());
    };
    match ty.origin() {
        None => construct(ty, value),
        Some(Origin::Scalar(_)) => Ok(value.clone()),
        Some(Origin::Union) => match pick_alternative(ty)? {
            Pick::One(alt) => coerce(value, Some(alt)),
            // Unlike mappings, an ambiguous union keeps the raw scalar.
            Pick::Ambiguous(alternatives) => {
                tracing::debug!(%ty, alternatives, "ambiguous union on scalar, keeping raw value");
                Ok(value.clone())
            }
        },
        Some(Origin::Map | Origin::Seq(_)) => Err(Error::unsupported(ty, Shape::Scalar)),
    }
}
