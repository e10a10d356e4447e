//! Rooting tests: builtin results stay reachable while referenced and are
//! released once nothing refers to them

use super::*;
use tsrun_builtins::BuiltinMethod;

#[test]
fn test_template_cache_is_released_on_unload() {
    let mut rt = create_test_runtime();
    let unit = rt.load_unit();
    let template = run_in_unit(&mut rt, unit, &[], |rt, _| {
        rt.call_builtin(
            BuiltinMethod::GetTemplateObject,
            &[num(0.0), JsValue::Boolean(true), s("a")],
        )
    })
    .unwrap();
    let template = as_obj(&template);
    // Drop the extra root taken by run_in_unit
    rt.remove_root(template);

    rt.collect_garbage();
    assert!(rt.is_live(template));
    assert_eq!(rt.unit(unit).unwrap().template_count(), 1);

    assert!(rt.unload_unit(unit));
    rt.collect_garbage();
    assert!(!rt.is_live(template));
    assert!(!rt.unload_unit(unit));
}

#[test]
fn test_cached_module_is_released_on_unload() {
    let mut rt = create_test_runtime();
    let unit = rt.load_unit();
    let scope = rt.open_scope();
    let factory = rt
        .new_compiled_function(&scope, Some("m"), unit, FunctionKind::Normal, |_rt, _this, _args| {
            Ok(JsValue::Undefined)
        })
        .get();
    rt.register_module(unit, factory).unwrap();
    drop(scope);

    let exports = run_in_unit(&mut rt, unit, &[], |rt, _| {
        rt.call_builtin(BuiltinMethod::RequireFast, &[num(0.0)])
    })
    .unwrap();
    let exports = as_obj(&exports);
    rt.remove_root(exports);

    rt.collect_garbage();
    assert!(rt.is_live(exports));
    assert!(rt.is_live(factory));

    rt.unload_unit(unit);
    rt.collect_garbage();
    assert!(!rt.is_live(exports));
    assert!(!rt.is_live(factory));
}

#[test]
fn test_unrooted_results_are_collected() {
    let mut rt = create_test_runtime();
    let scope = rt.open_scope();
    let target = rt.new_object(&scope).get();
    let source = object_with(&mut rt, &scope, &[("a", num(1.0))]);
    drop(scope);

    rt.collect_garbage();
    assert!(!rt.is_live(target));
    assert!(!rt.is_live(source));
}

#[test]
fn test_scopes_restore_registry_depth() {
    let mut rt = create_test_runtime();
    let depth = rt.registry_depth();
    {
        let scope = rt.open_scope();
        let target = rt.new_object(&scope).get();
        let source = object_with(
            &mut rt,
            &scope,
            &[("a", num(1.0)), ("b", num(2.0)), ("c", num(3.0))],
        );
        rt.call_builtin(
            BuiltinMethod::CopyDataProperties,
            &[target.into(), source.into()],
        )
        .unwrap();
        assert!(rt.registry_depth() > depth);
    }
    assert_eq!(rt.registry_depth(), depth);
}

#[test]
fn test_config_threshold_is_applied() {
    let rt = Runtime::with_config(RuntimeConfig::default().with_gc_threshold(7));
    assert_eq!(rt.config().gc_threshold, 7);

    let rt = Runtime::with_config(RuntimeConfig::from_json(r#"{"gc_threshold": 3}"#).unwrap());
    assert_eq!(rt.config().gc_threshold, 3);
    assert_eq!(rt.config().max_call_depth, tsrun_builtins::config::DEFAULT_MAX_CALL_DEPTH);
}
