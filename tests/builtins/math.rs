//! Tests for exponentiationOperator

use super::*;
use tsrun_builtins::BuiltinMethod;

fn pow(rt: &mut Runtime, base: JsValue, exponent: JsValue) -> Result<JsValue, JsError> {
    rt.call_builtin(BuiltinMethod::ExponentiationOperator, &[base, exponent])
}

fn to_f64(value: JsValue) -> f64 {
    match value {
        JsValue::Number(n) => n,
        other => panic!("expected number, got {:?}", other),
    }
}

#[test]
fn test_numbers() {
    let mut rt = create_test_runtime();
    assert_eq!(pow(&mut rt, num(2.0), num(10.0)).unwrap(), num(1024.0));
    assert_eq!(pow(&mut rt, num(2.0), num(-2.0)).unwrap(), num(0.25));
    assert_eq!(pow(&mut rt, num(0.0), num(0.0)).unwrap(), num(1.0));
}

#[test]
fn test_nan_results() {
    let mut rt = create_test_runtime();
    assert!(to_f64(pow(&mut rt, num(1.0), num(f64::NAN)).unwrap()).is_nan());
    assert!(to_f64(pow(&mut rt, num(-1.0), num(f64::INFINITY)).unwrap()).is_nan());
    assert!(to_f64(pow(&mut rt, JsValue::Undefined, num(2.0)).unwrap()).is_nan());
}

#[test]
fn test_operands_are_converted() {
    let mut rt = create_test_runtime();
    assert_eq!(pow(&mut rt, s("2"), s("3")).unwrap(), num(8.0));
    assert_eq!(pow(&mut rt, JsValue::Boolean(true), num(5.0)).unwrap(), num(1.0));
    assert_eq!(pow(&mut rt, JsValue::Null, num(2.0)).unwrap(), num(0.0));
    assert_eq!(pow(&mut rt, s(" 0x10 "), num(2.0)).unwrap(), num(256.0));
}

fn value_of_three(_rt: &mut Runtime, _this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Number(3.0))
}

#[test]
fn test_object_operand_uses_value_of() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let obj = rt.new_object(&scope).get();
    let value_of = rt
        .new_native_function(&scope, "valueOf", value_of_three, 0)
        .get();
    let key = rt.key("valueOf");
    rt.create_data_property_or_throw(obj, &key, value_of.into())
        .unwrap();

    assert_eq!(pow(&mut rt, obj.into(), num(2.0)).unwrap(), num(9.0));
}

#[test]
fn test_symbol_operand_is_type_error() {
    let mut rt = create_test_runtime();
    let symbol = rt.new_symbol(Some("s"));
    let err = pow(&mut rt, JsValue::Symbol(symbol), num(2.0)).unwrap_err();
    assert!(err.is_type_error());
}
