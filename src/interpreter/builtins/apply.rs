//! Fast call/construct with an argument array

use crate::error::JsError;
use crate::interpreter::Runtime;
use crate::value::JsValue;

use super::arg;

/// Largest argument array `apply` will stage into a frame
pub const MAX_APPLY_ARGUMENTS: u32 = 65_535;

/// apply(fn, argArray, thisVal?)
///
/// With two arguments constructs `new fn(...argArray)`; with three calls
/// `fn` with `thisVal`. Elements are read straight from the array's element
/// table: holes and accessors read as `undefined` and no getter runs.
pub fn apply(rt: &mut Runtime, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let func = arg(args, 0);
    if !rt.is_callable(&func) {
        return Err(JsError::type_error(format!(
            "{} is not a function",
            rt.describe(&func)
        )));
    }
    let array_value = arg(args, 1);
    let Some(array) = array_value.as_object().filter(|_| rt.is_array(&array_value)) else {
        return Err(JsError::type_error("args must be an array"));
    };

    let length = rt.array_length(array)?;
    if length > MAX_APPLY_ARGUMENTS {
        return Err(JsError::range_error("Maximum call stack size exceeded"));
    }
    let elements = &rt.object(array)?.elements;
    let call_args: Vec<JsValue> = (0..length)
        .map(|index| match elements.get(&index) {
            Some(prop) if !prop.is_accessor() => prop.value.clone(),
            _ => JsValue::Undefined,
        })
        .collect();

    if args.len() == 2 {
        rt.construct(&func, &call_args)
    } else {
        rt.call(&func, arg(args, 2), &call_args)
    }
}
