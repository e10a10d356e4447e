//! Rest parameters and spread into array literals

use crate::error::JsError;
use crate::interpreter::Runtime;
use crate::value::{to_uint32, JsValue, PropertyKey};

use super::arg;

/// copyRestArgs(from)
///
/// Collects the caller's arguments starting at `from` into a new array.
/// Returns `undefined` when there is no caller frame or `from` is not a
/// number.
pub fn copy_rest_args(rt: &mut Runtime, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let JsValue::Number(from) = arg(args, 0) else {
        return Ok(JsValue::Undefined);
    };
    let Some(frame) = rt.caller_frame() else {
        return Ok(JsValue::Undefined);
    };
    let from = to_uint32(from) as usize;
    // The caller's arguments stay rooted by its call for the whole copy
    let rest: Vec<JsValue> = frame.args().get(from..).unwrap_or_default().to_vec();

    let scope = rt.open_scope();
    let array = rt.create_array_from(&scope, &rest)?;
    Ok(array.into())
}

/// arraySpread(target, source, nextIndex)
///
/// Iterates `source` and defines each value on the array `target` starting
/// at `nextIndex`. Returns the index after the last value written.
pub fn array_spread(rt: &mut Runtime, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let target_value = arg(args, 0);
    let Some(target) = target_value.as_object().filter(|_| rt.is_array(&target_value)) else {
        return Err(JsError::type_error("arraySpread requires an array target"));
    };
    let source = arg(args, 1);
    let start = arg(args, 2);
    let mut next_index = rt.to_number(&start)?;

    let scope = rt.open_scope();
    let record = rt.get_iterator(&scope, &source)?;
    let marker = scope.marker();
    while let Some(value) = rt.iterator_step_value(&scope, &record)? {
        // Non-index starts such as -1 land on their string key
        let key = PropertyKey::from_value(&JsValue::Number(next_index));
        rt.create_data_property_or_throw(target, &key, value)?;
        next_index += 1.0;
        scope.flush(marker);
    }

    Ok(JsValue::Number(next_index))
}
