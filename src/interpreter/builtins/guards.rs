//! Guard and control hooks emitted around destructuring, classes and `yield*`

use crate::error::JsError;
use crate::interpreter::Runtime;
use crate::value::JsValue;

use super::arg;

/// ensureObject(value, message): TypeError with `message` unless `value` is
/// an object
pub fn ensure_object(_rt: &mut Runtime, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    if arg(args, 0).is_object() {
        Ok(JsValue::Undefined)
    } else {
        Err(JsError::type_error(arg(args, 1).to_js_string().to_string()))
    }
}

/// throwTypeError(message)
pub fn throw_type_error(_rt: &mut Runtime, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    Err(JsError::type_error(arg(args, 0).to_js_string().to_string()))
}

/// silentSetPrototypeOf(obj, proto)
///
/// Sets the prototype when `obj` is an object and `proto` an object or
/// null. Never raises.
pub fn silent_set_prototype_of(
    rt: &mut Runtime,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let Some(obj) = arg(args, 0).as_object() else {
        return Ok(JsValue::Undefined);
    };
    let proto = match arg(args, 1) {
        JsValue::Object(proto) => Some(proto),
        JsValue::Null => None,
        _ => return Ok(JsValue::Undefined),
    };
    match rt.set_prototype_of(obj, proto) {
        Ok(true) => {}
        Ok(false) => tracing::trace!("silentSetPrototypeOf: prototype change refused"),
        Err(err) => tracing::trace!(%err, "silentSetPrototypeOf: failure discarded"),
    }
    rt.clear_thrown_value();
    Ok(JsValue::Undefined)
}

/// generatorSetDelegated()
///
/// Marks the calling generator activation as delegating to an inner
/// iterator.
pub fn generator_set_delegated(
    rt: &mut Runtime,
    _this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let not_in_yield_star =
        || JsError::type_error("generatorSetDelegated can only be called as part of yield*");
    let generator = rt
        .caller_frame()
        .and_then(|frame| frame.generator())
        .ok_or_else(not_in_yield_star)?;
    let state = rt
        .object_mut(generator)?
        .as_generator_mut()
        .ok_or_else(not_in_yield_star)?;
    state.delegated = true;
    Ok(JsValue::Undefined)
}
