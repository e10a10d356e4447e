//! Array iteration: `Array.prototype.values` / `[Symbol.iterator]` and
//! `%ArrayIteratorPrototype%.next`

use crate::error::JsError;
use crate::interpreter::Runtime;
use crate::value::{to_uint32, ExoticObject, JsObject, JsObjectRef, JsValue, PropertyKey};

/// Install array iteration on the realm prototypes
pub fn init_array_prototype(rt: &mut Runtime) {
    let array_proto = rt.realm().array_prototype;
    let iterator_proto = rt.realm().array_iterator_prototype;

    let values_key = rt.key("values");
    rt.register_method(array_proto, values_key, "values", array_values, 0);
    let iterator_key = PropertyKey::Symbol(rt.symbol_iterator());
    rt.register_method(array_proto, iterator_key, "values", array_values, 0);

    let next_key = rt.key("next");
    rt.register_method(iterator_proto, next_key, "next", array_iterator_next, 0);
}

/// Array.prototype.values()
pub fn array_values(rt: &mut Runtime, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    let scope = rt.open_scope();
    let target = rt.to_object(&scope, &this)?;
    let mut iterator = JsObject::with_prototype(Some(rt.realm().array_iterator_prototype));
    iterator.exotic = ExoticObject::ArrayIterator {
        iterated: Some(target.get()),
        next_index: 0,
    };
    Ok(rt.alloc(&scope, iterator).into())
}

/// %ArrayIteratorPrototype%.next()
pub fn array_iterator_next(
    rt: &mut Runtime,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let incompatible = || JsError::type_error("next method called on incompatible receiver");
    let iterator = this.as_object().ok_or_else(incompatible)?;
    let (iterated, index) = match &rt.object(iterator)?.exotic {
        ExoticObject::ArrayIterator {
            iterated,
            next_index,
        } => (*iterated, *next_index),
        _ => return Err(incompatible()),
    };

    let scope = rt.open_scope();
    let Some(target) = iterated else {
        return Ok(rt.create_iter_result(&scope, JsValue::Undefined, true)?.into());
    };
    let length = if rt.object(target)?.is_array() {
        rt.array_length(target)?
    } else {
        let length_key = rt.key("length");
        let length = rt.get(target, &length_key)?;
        to_uint32(rt.to_number(&length)?)
    };

    if index >= length {
        set_array_iterator_state(rt, iterator, None, index)?;
        return Ok(rt.create_iter_result(&scope, JsValue::Undefined, true)?.into());
    }
    set_array_iterator_state(rt, iterator, Some(target), index + 1)?;
    let value = rt.get(target, &PropertyKey::Index(index))?;
    Ok(rt.create_iter_result(&scope, value, false)?.into())
}

fn set_array_iterator_state(
    rt: &mut Runtime,
    iterator: JsObjectRef,
    target: Option<JsObjectRef>,
    index: u32,
) -> Result<(), JsError> {
    if let ExoticObject::ArrayIterator {
        iterated,
        next_index,
    } = &mut rt.object_mut(iterator)?.exotic
    {
        *iterated = target;
        *next_index = index;
    }
    Ok(())
}
