use super::{coerce, pick_alternative};
use crate::error::{Ambiguity, Error, Result};
use crate::ty::{Origin, SeqKind, Ty};
use crate::value::{Shape, Value};

/// Rebuild `items` into the descriptor's container kind, or the runtime kind
/// when the descriptor names none.
pub(super) fn reconstruct(
    value: &Value,
    items: &[Value],
    runtime: SeqKind,
    ty: Option<&Ty>,
) -> Result<Value> {
    let (kind, element) = match ty {
        None => (runtime, None),
        Some(ty) => match ty.origin() {
            None => (runtime, element_type(ty)?),
            Some(Origin::Seq(kind)) => (kind, element_type(ty)?),
            // A union names several types, never a single element type.
            Some(Origin::Union) => {
                pick_alternative(ty)?;
                return Err(Error::ambiguous(ty, Ambiguity::Sequence { arity: ty.args().len() }));
            }
            Some(Origin::Map | Origin::Scalar(_)) => {
                return Err(Error::unsupported(ty, Shape::Sequence));
            }
        },
    };

    let items = items
        .iter()
        .map(|item| coerce(item, element))
        .collect::<Result<Vec<_>>>()?;
    Ok(match kind {
        SeqKind::List => Value::List(items),
        SeqKind::Tuple => Value::Tuple(items),
    })
}

fn element_type(ty: &Ty) -> Result<Option<&Ty>> {
    match ty.args() {
        [] => Ok(None),
        [element] => Ok(Some(element)),
        args => Err(Error::ambiguous(ty, Ambiguity::Sequence { arity: args.len() })),
    }
}
