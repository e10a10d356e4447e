//! Tests for the builtin table

use super::*;
use tsrun_builtins::BuiltinMethod;
use tsrun_builtins::interpreter::builtins::BUILTIN_COUNT;

#[test]
fn test_every_slot_is_filled() {
    let rt = create_test_runtime();
    assert_eq!(rt.builtins().len(), BUILTIN_COUNT);
    for (slot, (method, func)) in rt.builtins().iter().enumerate() {
        assert_eq!(method.slot(), slot);
        assert_eq!(BuiltinMethod::from_slot(slot), Some(method));
        assert_eq!(rt.builtin(method), Some(func));
        assert!(rt.is_callable(&func.into()));
    }
    assert_eq!(BuiltinMethod::from_slot(BUILTIN_COUNT), None);
}

#[test]
fn test_slot_order() {
    let names: Vec<&str> = BuiltinMethod::ALL.iter().map(|m| m.name()).collect();
    assert_eq!(
        names,
        vec![
            "silentSetPrototypeOf",
            "getTemplateObject",
            "ensureObject",
            "throwTypeError",
            "generatorSetDelegated",
            "copyDataProperties",
            "copyRestArgs",
            "arraySpread",
            "apply",
            "exportAll",
            "exponentiationOperator",
            "requireFast",
        ]
    );
}

#[test]
fn test_name_and_length_properties() {
    let mut rt = create_test_runtime();
    let table: Vec<_> = rt.builtins().iter().collect();
    for (method, func) in table {
        assert_eq!(prop(&mut rt, func, "name"), s(method.name()));
        assert_eq!(prop(&mut rt, func, "length"), num(method.arity() as f64));
    }
}

#[test]
fn test_builtins_are_not_constructors() {
    let rt = create_test_runtime();
    for (_, func) in rt.builtins().iter() {
        assert!(!rt.is_constructor(&func.into()));
    }
}

#[test]
fn test_builtins_survive_collection() {
    let mut rt = create_test_runtime();
    rt.collect_garbage();
    for method in BuiltinMethod::ALL {
        let func = rt.builtin(method).unwrap();
        assert!(rt.is_live(func));
    }
    assert_eq!(
        rt.call_builtin(BuiltinMethod::ExponentiationOperator, &[num(3.0), num(2.0)])
            .unwrap(),
        num(9.0)
    );
}
