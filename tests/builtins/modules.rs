//! Tests for requireFast

use super::*;
use tsrun_builtins::BuiltinMethod;

fn require(rt: &mut Runtime, index: JsValue) -> Result<JsValue, JsError> {
    rt.call_builtin(BuiltinMethod::RequireFast, &[index])
}

/// Factory: `module.exports = { fresh: true }`
fn replacing_factory(rt: &mut Runtime, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let module = as_obj(args.get(2).unwrap_or(&JsValue::Undefined));
    let scope = rt.open_scope();
    let exports = rt.new_object(&scope).get();
    let fresh = rt.key("fresh");
    rt.create_data_property_or_throw(exports, &fresh, JsValue::Boolean(true))?;
    let exports_key = rt.key("exports");
    rt.set(module, &exports_key, exports.into())?;
    Ok(JsValue::Undefined)
}

/// Factory: `exports.value = 42`, checking `this === exports`
fn filling_factory(rt: &mut Runtime, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let exports = args.first().cloned().unwrap_or_default();
    assert!(this.strict_equals(&exports));
    assert_eq!(args.get(1), Some(&JsValue::Undefined));
    let value = rt.key("value");
    rt.set(as_obj(&exports), &value, num(42.0))?;
    Ok(JsValue::Undefined)
}

fn failing_factory(_rt: &mut Runtime, _this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    Err(JsError::type_error("factory failed"))
}

fn register(rt: &mut Runtime, unit: UnitId, factory: tsrun_builtins::value::NativeFn) -> u32 {
    let scope = rt.open_scope();
    let func = rt.new_native_function(&scope, "factory", factory, 3).get();
    rt.register_module(unit, func).unwrap()
}

#[test]
fn test_runs_factory_and_returns_exports() {
    let mut rt = create_test_runtime();
    let unit = rt.load_unit();
    let index = register(&mut rt, unit, filling_factory);

    let exports = run_in_unit(&mut rt, unit, &[], move |rt, _| require(rt, num(index as f64)))
        .unwrap();
    assert_eq!(prop(&mut rt, as_obj(&exports), "value"), num(42.0));
}

#[test]
fn test_factory_runs_once() {
    let mut rt = create_test_runtime();
    let unit = rt.load_unit();
    let index = register(&mut rt, unit, replacing_factory);

    let result = run_in_unit(&mut rt, unit, &[], move |rt, _| {
        let first = require(rt, num(index as f64))?;
        let scope = rt.open_scope();
        first.root(&scope);
        let second = require(rt, num(index as f64))?;
        Ok(JsValue::Boolean(first.strict_equals(&second)))
    })
    .unwrap();
    assert_eq!(result, JsValue::Boolean(true));
}

#[test]
fn test_failed_factory_is_not_cached() {
    let mut rt = create_test_runtime();
    let unit = rt.load_unit();
    let index = register(&mut rt, unit, failing_factory);

    for _ in 0..2 {
        let result = run_in_unit(&mut rt, unit, &[], move |rt, _| require(rt, num(index as f64)));
        assert_type_error(result, "factory failed");
    }
}

#[test]
fn test_cyclic_require_sees_partial_exports() {
    let mut rt = create_test_runtime();
    let unit = rt.load_unit();
    let scope = rt.open_scope();
    let factory = rt
        .new_compiled_function(&scope, Some("cyclic"), unit, FunctionKind::Normal, |rt, _this, args| {
            let exports = args.first().cloned().unwrap_or_default();
            let again = require(rt, num(0.0))?;
            let same = rt.key("sameExports");
            rt.set(as_obj(&exports), &same, JsValue::Boolean(again.strict_equals(&exports)))?;
            Ok(JsValue::Undefined)
        })
        .get();
    assert_eq!(rt.register_module(unit, factory), Some(0));
    drop(scope);

    let exports = run_in_unit(&mut rt, unit, &[], |rt, _| require(rt, num(0.0))).unwrap();
    assert_eq!(
        prop(&mut rt, as_obj(&exports), "sameExports"),
        JsValue::Boolean(true)
    );
}

#[test]
fn test_invalid_requests() {
    let mut rt = create_test_runtime();
    let unit = rt.load_unit();
    register(&mut rt, unit, filling_factory);

    assert_type_error(require(&mut rt, num(0.0)), "Cannot be called from native code");
    run_in_unit(&mut rt, unit, &[], |rt, _| {
        assert_type_error(require(rt, s("0")), "Invalid module index");
        assert_type_error(require(rt, num(-1.0)), "Invalid module index");
        assert_type_error(require(rt, num(5.0)), "Module not found");
        Ok(JsValue::Undefined)
    })
    .unwrap();
}

#[test]
fn test_modules_are_per_unit() {
    let mut rt = create_test_runtime();
    let with_module = rt.load_unit();
    let without = rt.load_unit();
    register(&mut rt, with_module, filling_factory);

    let result = run_in_unit(&mut rt, without, &[], |rt, _| require(rt, num(0.0)));
    assert_type_error(result, "Module not found");
}
