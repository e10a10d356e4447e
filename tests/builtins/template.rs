//! Tests for getTemplateObject

use super::*;
use tsrun_builtins::BuiltinMethod;

fn get_template(rt: &mut Runtime, args: &[JsValue]) -> Result<JsValue, JsError> {
    rt.call_builtin(BuiltinMethod::GetTemplateObject, args)
}

#[test]
fn test_identical_raw_and_cooked() {
    let mut rt = create_test_runtime();
    let template = run_compiled(&mut rt, &[], |rt, _| {
        get_template(rt, &[num(0.0), JsValue::Boolean(true), s("a"), s("b")])
    })
    .unwrap();
    let template = as_obj(&template);

    assert_eq!(elements(&mut rt, template), vec![s("a"), s("b")]);
    let raw = as_obj(&prop(&mut rt, template, "raw"));
    assert_eq!(elements(&mut rt, raw), vec![s("a"), s("b")]);
}

#[test]
fn test_separate_raw_and_cooked() {
    let mut rt = create_test_runtime();
    let template = run_compiled(&mut rt, &[], |rt, _| {
        get_template(
            rt,
            &[num(1.0), JsValue::Boolean(false), s("x\\n"), s("y"), s("x\n"), s("y")],
        )
    })
    .unwrap();
    let template = as_obj(&template);

    assert_eq!(elements(&mut rt, template), vec![s("x\n"), s("y")]);
    let raw = as_obj(&prop(&mut rt, template, "raw"));
    assert_eq!(elements(&mut rt, raw), vec![s("x\\n"), s("y")]);
}

#[test]
fn test_template_and_raw_are_frozen() {
    let mut rt = create_test_runtime();
    let template = run_compiled(&mut rt, &[], |rt, _| {
        get_template(rt, &[num(0.0), JsValue::Boolean(true), s("a")])
    })
    .unwrap();
    let template = as_obj(&template);
    let raw = as_obj(&prop(&mut rt, template, "raw"));
    let length_key = rt.key("length");

    for array in [template, raw] {
        assert!(!rt.is_extensible(array).unwrap());
        let length = rt.get_own_property(array, &length_key).unwrap().unwrap();
        assert!(!length.writable);
        assert!(!length.configurable);
        let element = rt
            .get_own_property(array, &PropertyKey::Index(0))
            .unwrap()
            .unwrap();
        assert!(element.enumerable);
        assert!(!element.writable);
        assert!(!element.configurable);
    }

    let raw_key = rt.key("raw");
    let raw_prop = rt.get_own_property(template, &raw_key).unwrap().unwrap();
    assert!(!raw_prop.enumerable);
    assert!(!raw_prop.writable);
    assert!(!raw_prop.configurable);

    // Writes are rejected
    assert!(rt.set(template, &PropertyKey::Index(0), s("z")).is_err());
    assert!(rt.set(template, &PropertyKey::Index(1), s("z")).is_err());
}

#[test]
fn test_same_id_returns_same_object() {
    let mut rt = create_test_runtime();
    let result = run_compiled(&mut rt, &[], |rt, _| {
        let first = get_template(rt, &[num(7.0), JsValue::Boolean(true), s("a")])?;
        let scope = rt.open_scope();
        first.root(&scope);
        let second = get_template(rt, &[num(7.0), JsValue::Boolean(true), s("a")])?;
        let other = get_template(rt, &[num(8.0), JsValue::Boolean(true), s("a")])?;
        Ok(JsValue::Boolean(
            first.strict_equals(&second) && !first.strict_equals(&other),
        ))
    })
    .unwrap();
    assert_eq!(result, JsValue::Boolean(true));
}

#[test]
fn test_units_have_separate_caches() {
    let mut rt = create_test_runtime();
    let body = |rt: &mut Runtime, _: &[JsValue]| {
        get_template(rt, &[num(0.0), JsValue::Boolean(true), s("a")])
    };
    let first = run_compiled(&mut rt, &[], body).unwrap();
    let second = run_compiled(&mut rt, &[], body).unwrap();
    assert!(!first.strict_equals(&second));
}

#[test]
fn test_argument_validation() {
    let mut rt = create_test_runtime();
    run_compiled(&mut rt, &[], |rt, _| {
        assert_type_error(
            get_template(rt, &[num(0.0), JsValue::Boolean(true)]),
            "At least three arguments expected",
        );
        assert_type_error(
            get_template(rt, &[s("0"), JsValue::Boolean(true), s("a")]),
            "First argument should be a number",
        );
        assert_type_error(
            get_template(rt, &[num(0.0), num(1.0), s("a")]),
            "Second argument should be a bool",
        );
        assert_type_error(
            get_template(rt, &[num(0.0), JsValue::Boolean(false), s("a"), s("b"), s("c")]),
            "There must be the same number of raw and cooked strings.",
        );
        Ok(JsValue::Undefined)
    })
    .unwrap();
}

#[test]
fn test_native_caller_rejected() {
    let mut rt = create_test_runtime();
    assert_type_error(
        get_template(&mut rt, &[num(0.0), JsValue::Boolean(true), s("a")]),
        "Cannot be called from native code",
    );
}

#[test]
fn test_failed_call_leaves_cache_untouched() {
    let mut rt = create_test_runtime();
    let unit = rt.load_unit();
    let failed = run_in_unit(&mut rt, unit, &[], |rt, _| {
        get_template(rt, &[num(3.0), JsValue::Boolean(false), s("a"), s("b"), s("c")])
    });
    assert!(failed.is_err());
    assert_eq!(rt.cached_template_object(unit, 3), None);

    let created = run_in_unit(&mut rt, unit, &[], |rt, _| {
        get_template(rt, &[num(3.0), JsValue::Boolean(false), s("a"), s("b")])
    })
    .unwrap();
    assert_eq!(rt.cached_template_object(unit, 3), Some(as_obj(&created)));
}

#[test]
fn test_unloading_unit_releases_templates() {
    let mut rt = create_test_runtime();
    let unit = rt.load_unit();
    let template = {
        let scope = rt.open_scope();
        let func = rt.new_compiled_function(
            &scope,
            None,
            unit,
            FunctionKind::Normal,
            |rt, _this, _args| get_template(rt, &[num(0.0), JsValue::Boolean(true), s("a")]),
        );
        as_obj(&rt.call(&func.into(), JsValue::Undefined, &[]).unwrap())
    };
    let raw = as_obj(&prop(&mut rt, template, "raw"));

    rt.collect_garbage();
    assert!(rt.is_live(template));
    assert!(rt.is_live(raw));

    assert!(rt.unload_unit(unit));
    rt.collect_garbage();
    assert!(!rt.is_live(template));
    assert!(!rt.is_live(raw));
    assert!(!rt.unload_unit(unit));
}
