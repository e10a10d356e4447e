//! Tests for copyDataProperties (object spread / rest destructuring)

use super::*;
use tsrun_builtins::{BuiltinMethod, PropertyDescriptor};

fn copy(rt: &mut Runtime, args: &[JsValue]) -> Result<JsValue, JsError> {
    rt.call_builtin(BuiltinMethod::CopyDataProperties, args)
}

#[test]
fn test_copies_enumerable_properties_except_excluded() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let target = rt.new_object(&scope).get();
    let source = object_with(&mut rt, &scope, &[("a", num(1.0)), ("b", num(2.0))]);
    let excluded = object_with(&mut rt, &scope, &[("b", num(1.0))]);

    let result = copy(&mut rt, &[target.into(), source.into(), excluded.into()]).unwrap();
    assert_eq!(result, JsValue::Object(target));
    assert_eq!(own_keys(&rt, target), vec!["a"]);
    assert_eq!(prop(&mut rt, target, "a"), num(1.0));
}

#[test]
fn test_copied_properties_use_default_flags() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let target = rt.new_object(&scope).get();
    let source = rt.new_object(&scope).get();
    let key = rt.key("x");
    // Read-only on the source, ordinary on the target
    rt.define_own_property_or_throw(source, &key, &PropertyDescriptor::frozen_element(num(5.0)))
        .unwrap();

    copy(&mut rt, &[target.into(), source.into()]).unwrap();
    let copied = rt.get_own_property(target, &key).unwrap().unwrap();
    assert_eq!(copied.value, num(5.0));
    assert!(copied.writable && copied.enumerable && copied.configurable);
}

#[test]
fn test_null_and_undefined_sources_return_target() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let target = object_with(&mut rt, &scope, &[("keep", num(1.0))]);

    for source in [JsValue::Null, JsValue::Undefined] {
        let result = copy(&mut rt, &[target.into(), source]).unwrap();
        assert_eq!(result, JsValue::Object(target));
    }
    assert_eq!(own_keys(&rt, target), vec!["keep"]);
}

#[test]
fn test_non_object_target_is_ignored() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let source = object_with(&mut rt, &scope, &[("a", num(1.0))]);
    let result = copy(&mut rt, &[num(1.0), source.into()]).unwrap();
    assert_eq!(result, JsValue::Undefined);
}

#[test]
fn test_indexed_keys_first_then_named_in_insertion_order() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let target = rt.new_object(&scope).get();
    let source = rt.new_object(&scope).get();
    let sym = rt.new_symbol(Some("tag"));
    let keys = [
        rt.key("b"),
        PropertyKey::Index(2),
        PropertyKey::Symbol(sym),
        rt.key("a"),
        PropertyKey::Index(0),
    ];
    for (i, key) in keys.iter().enumerate() {
        rt.create_data_property_or_throw(source, key, num(i as f64))
            .unwrap();
    }

    copy(&mut rt, &[target.into(), source.into()]).unwrap();
    assert_eq!(own_keys(&rt, target), vec!["0", "2", "b", "a", "Symbol(tag)"]);
}

#[test]
fn test_skips_non_enumerable() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let target = rt.new_object(&scope).get();
    let source = object_with(&mut rt, &scope, &[("visible", num(1.0))]);
    let hidden = rt.key("hidden");
    rt.define_own_property_or_throw(source, &hidden, &PropertyDescriptor::constant(num(2.0)))
        .unwrap();

    copy(&mut rt, &[target.into(), source.into()]).unwrap();
    assert_eq!(own_keys(&rt, target), vec!["visible"]);
}

#[test]
fn test_string_source_contributes_characters() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let target = rt.new_object(&scope).get();

    copy(&mut rt, &[target.into(), s("hi")]).unwrap();
    assert_eq!(own_keys(&rt, target), vec!["0", "1"]);
    assert_eq!(rt.get(target, &PropertyKey::Index(1)).unwrap(), s("i"));

    // Other primitives have no own enumerable properties
    copy(&mut rt, &[target.into(), num(42.0)]).unwrap();
    copy(&mut rt, &[target.into(), JsValue::Boolean(true)]).unwrap();
    assert_eq!(own_keys(&rt, target).len(), 2);
}

fn answer_getter(_rt: &mut Runtime, _this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Number(42.0))
}

#[test]
fn test_getters_are_invoked() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let target = rt.new_object(&scope).get();
    let source = rt.new_object(&scope).get();
    let getter = rt.new_native_function(&scope, "answer", answer_getter, 0).get();
    let key = rt.key("answer");
    rt.define_own_property_or_throw(source, &key, &PropertyDescriptor::accessor(Some(getter), None))
        .unwrap();

    copy(&mut rt, &[target.into(), source.into()]).unwrap();
    let copied = rt.get_own_property(target, &key).unwrap().unwrap();
    assert!(!copied.is_accessor());
    assert_eq!(copied.value, num(42.0));
}

#[test]
fn test_failure_keeps_already_copied_properties() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let target = rt.new_object(&scope).get();
    let locked = rt.key("b");
    rt.define_own_property_or_throw(target, &locked, &PropertyDescriptor::constant(num(0.0)))
        .unwrap();
    let source = object_with(
        &mut rt,
        &scope,
        &[("a", num(1.0)), ("b", num(2.0)), ("c", num(3.0))],
    );

    let err = copy(&mut rt, &[target.into(), source.into()]).unwrap_err();
    assert!(err.is_type_error());
    assert_eq!(prop(&mut rt, target, "a"), num(1.0));
    assert_eq!(prop(&mut rt, target, "b"), num(0.0));
    assert_eq!(prop(&mut rt, target, "c"), JsValue::Undefined);
}

#[test]
fn test_excluded_matches_indexed_keys() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let target = rt.new_object(&scope).get();
    let source = array_of(&mut rt, &scope, &[s("x"), s("y")]);
    let excluded = object_with(&mut rt, &scope, &[("0", JsValue::Boolean(true))]);

    copy(&mut rt, &[target.into(), source.into(), excluded.into()]).unwrap();
    assert_eq!(own_keys(&rt, target), vec!["1"]);
}
