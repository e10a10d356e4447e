//! Tagged template objects

use crate::error::JsError;
use crate::value::{to_uint32, JsHandle, JsValue, PropertyDescriptor, PropertyKey, Scope};

use crate::interpreter::Runtime;

/// getTemplateObject(templateId, rawAndCookedIdentical, raw..., cooked...)
///
/// Returns the frozen template object for `templateId` in the calling
/// unit, creating and caching it on first use. When the two lists are
/// identical only the raw strings are passed.
pub fn get_template_object(
    rt: &mut Runtime,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    if args.len() < 3 {
        return Err(JsError::type_error("At least three arguments expected"));
    }
    let Some(JsValue::Number(template_id)) = args.first() else {
        return Err(JsError::type_error("First argument should be a number"));
    };
    let Some(JsValue::Boolean(identical)) = args.get(1) else {
        return Err(JsError::type_error("Second argument should be a bool"));
    };
    let Some(unit) = rt.caller_frame().and_then(|frame| frame.code_unit()) else {
        return Err(JsError::type_error("Cannot be called from native code"));
    };

    let template_id = to_uint32(*template_id);
    if let Some(cached) = rt.cached_template_object(unit, template_id) {
        tracing::trace!(unit = unit.as_u32(), template_id, "template cache hit");
        return Ok(JsValue::Object(cached));
    }

    let (raw_strings, cooked_strings) = if *identical {
        let raw = args.get(2..).unwrap_or_default();
        (raw, raw)
    } else {
        if args.len() % 2 != 0 {
            return Err(JsError::type_error(
                "There must be the same number of raw and cooked strings.",
            ));
        }
        let count = args.len() / 2 - 1;
        (
            args.get(2..2 + count).unwrap_or_default(),
            args.get(2 + count..).unwrap_or_default(),
        )
    };

    let scope = rt.open_scope();
    let raw = create_template_array(rt, &scope, raw_strings)?;
    freeze_array(rt, raw)?;

    let template = create_template_array(rt, &scope, cooked_strings)?;
    let raw_key = rt.key("raw");
    rt.define_own_property_or_throw(
        template.get(),
        &raw_key,
        &PropertyDescriptor::constant(raw.into()),
    )?;
    freeze_array(rt, template)?;

    tracing::trace!(
        unit = unit.as_u32(),
        template_id,
        strings = raw_strings.len(),
        "template object created"
    );
    let cached = rt
        .cache_template_object(unit, template_id, template.get())
        .ok_or_else(|| JsError::internal_error("calling unit is not loaded"))?;
    Ok(JsValue::Object(cached))
}

/// Array of `strings` whose elements are enumerable, read-only and
/// non-configurable
fn create_template_array(
    rt: &mut Runtime,
    scope: &Scope,
    strings: &[JsValue],
) -> Result<JsHandle, JsError> {
    let length = u32::try_from(strings.len())
        .map_err(|_| JsError::range_error("Invalid array length"))?;
    let array = rt.new_array(scope, length);
    let marker = scope.marker();
    for (index, value) in (0u32..).zip(strings) {
        rt.define_own_property_or_throw(
            array.get(),
            &PropertyKey::Index(index),
            &PropertyDescriptor::frozen_element(value.clone()),
        )?;
        scope.flush(marker);
    }
    Ok(array)
}

/// Lock `length` and prevent extensions
fn freeze_array(rt: &mut Runtime, array: JsHandle) -> Result<(), JsError> {
    let length_key = rt.key("length");
    rt.define_own_property_or_throw(array.get(), &length_key, &PropertyDescriptor::frozen())?;
    rt.prevent_extensions(array.get())
}
