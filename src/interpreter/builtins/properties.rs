//! Bulk property transfer: object spread and module re-export

use std::ops::ControlFlow;

use crate::error::JsError;
use crate::interpreter::Runtime;
use crate::value::{JsValue, PropertyDescriptor, PropertyKey};

use super::arg;

/// copyDataProperties(target, source, excluded?)
///
/// Copies the own enumerable properties of `source` onto `target` as fresh
/// data properties, skipping keys that `excluded` has as own properties.
/// Indexed keys come first in ascending order, then named keys in
/// enumeration order. A failure aborts the copy; properties already copied
/// stay on `target`.
pub fn copy_data_properties(
    rt: &mut Runtime,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let Some(target) = arg(args, 0).as_object() else {
        return Ok(JsValue::Undefined);
    };
    let source_value = arg(args, 1);
    if source_value.is_null_or_undefined() {
        return Ok(JsValue::Object(target));
    }
    let excluded = arg(args, 2).as_object();

    let scope = rt.open_scope();
    let source = rt.to_object(&scope, &source_value)?.get();
    let marker = scope.marker();

    rt.for_each_own_property_while(source, |rt, key, flags| {
        if !flags.enumerable {
            return ControlFlow::Continue(());
        }
        if let Some(excluded) = excluded {
            match rt.has_own_property(excluded, key) {
                Ok(true) => return ControlFlow::Continue(()),
                Ok(false) => {}
                Err(err) => return ControlFlow::Break(err),
            }
        }
        let copied = rt
            .get(source, key)
            .and_then(|value| rt.create_data_property_or_throw(target, key, value));
        scope.flush(marker);
        match copied {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => ControlFlow::Break(err),
        }
    })?;

    Ok(JsValue::Object(target))
}

/// exportAll(exports, source)
///
/// Re-exports every own enumerable string or index keyed property of `source` except
/// `default` as a writable, enumerable, non-configurable property of
/// `exports`.
pub fn export_all(rt: &mut Runtime, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let Some(exports) = arg(args, 0).as_object() else {
        return Err(JsError::type_error("exportAll() exports argument must be object"));
    };
    let Some(source) = arg(args, 1).as_object() else {
        return Err(JsError::type_error("exportAll() source argument must be object"));
    };

    let scope = rt.open_scope();
    let marker = scope.marker();

    rt.for_each_own_property_while(source, |rt, key, flags| {
        if !flags.enumerable || key.is_symbol() || key.eq_str("default") {
            return ControlFlow::Continue(());
        }
        let exported = rt.get(source, key).and_then(|value| {
            rt.define_own_property_or_throw(exports, key, &PropertyDescriptor::export(value))
        });
        scope.flush(marker);
        match exported {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => ControlFlow::Break(err),
        }
    })?;

    Ok(JsValue::Undefined)
}
