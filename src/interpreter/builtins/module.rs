//! CommonJS-style module loading for modules bundled in a compilation unit

use crate::error::JsError;
use crate::interpreter::Runtime;
use crate::value::JsValue;

use super::arg;

/// requireFast(moduleIndex)
///
/// Returns `module.exports` of module `moduleIndex` in the calling unit,
/// running its factory on first use. The module is cached before the
/// factory runs, so a cyclic require sees the partially filled exports.
pub fn require_fast(rt: &mut Runtime, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let Some(unit) = rt.caller_frame().and_then(|frame| frame.code_unit()) else {
        return Err(JsError::type_error("Cannot be called from native code"));
    };
    let JsValue::Number(index) = arg(args, 0) else {
        return Err(JsError::type_error("Invalid module index"));
    };
    if index < 0.0 || index.fract() != 0.0 || index > u32::MAX as f64 {
        return Err(JsError::type_error("Invalid module index"));
    }
    let index = index as u32;
    let exports_key = rt.key("exports");

    if let Some(module) = rt.cached_module(unit, index) {
        return rt.get(module, &exports_key);
    }
    let Some(factory) = rt.module_factory(unit, index) else {
        return Err(JsError::type_error("Module not found"));
    };

    tracing::trace!(unit = unit.as_u32(), index, "module initializing");
    let scope = rt.open_scope();
    let exports = rt.new_object(&scope);
    let module = rt.new_object(&scope);
    rt.create_data_property_or_throw(module.get(), &exports_key, exports.into())?;
    rt.set_cached_module(unit, index, Some(module.get()));

    let init = rt.call(
        &JsValue::Object(factory),
        exports.into(),
        &[exports.into(), JsValue::Undefined, module.into()],
    );
    if let Err(err) = init {
        rt.set_cached_module(unit, index, None);
        return Err(err);
    }
    rt.get(module.get(), &exports_key)
}
