//! Integration tests for the builtins, organized by builtin
//!
//! These tests exercise the builtins through the public runtime API, calling
//! them from compiled functions the way generated code does.
//!
//! ## Aggressive Test Defaults
//!
//! Tests use aggressive defaults to catch bugs early:
//! - `GC_THRESHOLD=1` - GC on every allocation to catch rooting bugs
//!
//! Override via environment variables:
//!
//! ```bash
//! cargo test                           # Default: aggressive settings
//! GC_THRESHOLD=100 cargo test          # Less aggressive GC for faster runs
//! ```

mod copy_data_properties;
mod gc;
mod math;
mod modules;
mod registration;
mod template;

use tsrun_builtins::{
    FunctionKind, JsError, JsObjectRef, JsValue, PropertyKey, Runtime, RuntimeConfig, Scope,
    UnitId,
};

/// Create a new runtime with aggressive defaults for testing:
/// - GC_THRESHOLD=1 (GC on every allocation) to catch rooting bugs
pub fn create_test_runtime() -> Runtime {
    // GC_THRESHOLD=100 cargo test  # Faster runs
    // GC_THRESHOLD=0 cargo test    # Disable automatic GC
    let gc_threshold = std::env::var("GC_THRESHOLD")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1);
    Runtime::with_config(RuntimeConfig::default().with_gc_threshold(gc_threshold))
}

/// Call `body` as a compiled function of `unit` with `args`, so that builtins
/// invoked from it see a compiled caller frame
pub fn run_in_unit<F>(
    rt: &mut Runtime,
    unit: UnitId,
    args: &[JsValue],
    body: F,
) -> Result<JsValue, JsError>
where
    F: Fn(&mut Runtime, &[JsValue]) -> Result<JsValue, JsError> + 'static,
{
    let scope = rt.open_scope();
    let func = rt.new_compiled_function(
        &scope,
        Some("caller"),
        unit,
        FunctionKind::Normal,
        move |rt, _this, args| body(rt, args),
    );
    let result = rt.call(&func.into(), JsValue::Undefined, args);
    if let Ok(value) = &result {
        keep(rt, value);
    }
    result
}

/// Like [`run_in_unit`] with a freshly loaded unit
pub fn run_compiled<F>(rt: &mut Runtime, args: &[JsValue], body: F) -> Result<JsValue, JsError>
where
    F: Fn(&mut Runtime, &[JsValue]) -> Result<JsValue, JsError> + 'static,
{
    let unit = rt.load_unit();
    run_in_unit(rt, unit, args, body)
}

/// Keep an object alive for the rest of the test
pub fn keep(rt: &mut Runtime, value: &JsValue) {
    if let JsValue::Object(obj) = value {
        rt.add_root(*obj);
    }
}

/// Unwrap an object value
pub fn as_obj(value: &JsValue) -> JsObjectRef {
    match value {
        JsValue::Object(obj) => *obj,
        other => panic!("expected object, got {:?}", other),
    }
}

/// Create an object with the given data properties
pub fn object_with(rt: &mut Runtime, scope: &Scope, props: &[(&str, JsValue)]) -> JsObjectRef {
    let obj = rt.new_object(scope).get();
    for (name, value) in props {
        let key = rt.key(name);
        rt.create_data_property_or_throw(obj, &key, value.clone())
            .unwrap();
    }
    obj
}

/// Create an array holding `values`
pub fn array_of(rt: &mut Runtime, scope: &Scope, values: &[JsValue]) -> JsObjectRef {
    rt.create_array_from(scope, values).unwrap().get()
}

/// Read a named property
pub fn prop(rt: &mut Runtime, obj: JsObjectRef, name: &str) -> JsValue {
    let key = rt.key(name);
    rt.get(obj, &key).unwrap()
}

/// Own keys as strings, in enumeration order
pub fn own_keys(rt: &Runtime, obj: JsObjectRef) -> Vec<String> {
    rt.own_property_keys(obj)
        .unwrap()
        .iter()
        .map(|key| key.to_string())
        .collect()
}

/// Elements `[0, length)` of an array
pub fn elements(rt: &mut Runtime, array: JsObjectRef) -> Vec<JsValue> {
    let length = rt.array_length(array).unwrap();
    (0..length)
        .map(|i| rt.get(array, &PropertyKey::Index(i)).unwrap())
        .collect()
}

/// Assert that a result is a TypeError with exactly `message`
pub fn assert_type_error(result: Result<JsValue, JsError>, message: &str) {
    match result {
        Err(err) => {
            assert!(err.is_type_error(), "expected TypeError, got {:?}", err);
            assert_eq!(err.message(), Some(message));
        }
        Ok(value) => panic!("expected TypeError '{}', got {:?}", message, value),
    }
}

pub fn num(n: f64) -> JsValue {
    JsValue::Number(n)
}

pub fn s(value: &str) -> JsValue {
    JsValue::from(value)
}
