//! String iteration and UTF-16 indexing helpers

use crate::error::JsError;
use crate::interpreter::Runtime;
use crate::value::{ExoticObject, JsObject, JsString, JsValue, PropertyKey};

/// Install string iteration on the realm prototypes
pub fn init_string_prototype(rt: &mut Runtime) {
    let string_proto = rt.realm().string_prototype;
    let iterator_proto = rt.realm().string_iterator_prototype;

    let iterator_key = PropertyKey::Symbol(rt.symbol_iterator());
    rt.register_method(string_proto, iterator_key, "[Symbol.iterator]", string_iterator, 0);

    let next_key = rt.key("next");
    rt.register_method(iterator_proto, next_key, "next", string_iterator_next, 0);
}

/// UTF-16 code units of a string; JavaScript indexes strings by these
pub fn code_units(s: &JsString) -> Vec<u16> {
    s.as_str().encode_utf16().collect()
}

/// One-unit string for a code unit. Lone surrogates become U+FFFD.
pub fn from_code_unit(unit: u16) -> JsString {
    JsString::from(String::from_utf16_lossy(&[unit]))
}

fn this_string(rt: &Runtime, this: &JsValue) -> Result<JsString, JsError> {
    match this {
        JsValue::String(s) => Ok(s.clone()),
        JsValue::Object(obj) => match &rt.object(*obj)?.exotic {
            ExoticObject::Primitive(JsValue::String(s)) => Ok(s.clone()),
            _ => Err(JsError::type_error(
                "String.prototype[Symbol.iterator] called on non-string",
            )),
        },
        JsValue::Undefined | JsValue::Null => Err(JsError::type_error(
            "String.prototype[Symbol.iterator] called on null or undefined",
        )),
        other => Ok(other.to_js_string()),
    }
}

/// String.prototype[Symbol.iterator]()
pub fn string_iterator(rt: &mut Runtime, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    let string = this_string(rt, &this)?;
    let scope = rt.open_scope();
    let mut iterator = JsObject::with_prototype(Some(rt.realm().string_iterator_prototype));
    iterator.exotic = ExoticObject::StringIterator {
        string,
        position: 0,
    };
    Ok(rt.alloc(&scope, iterator).into())
}

/// %StringIteratorPrototype%.next(): yields one code point at a time
pub fn string_iterator_next(
    rt: &mut Runtime,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let incompatible = || JsError::type_error("next method called on incompatible receiver");
    let iterator = this.as_object().ok_or_else(incompatible)?;
    let next = match &mut rt.object_mut(iterator)?.exotic {
        ExoticObject::StringIterator { string, position } => {
            let ch = string.as_str().get(*position..).and_then(|rest| rest.chars().next());
            if let Some(ch) = ch {
                *position += ch.len_utf8();
            }
            ch
        }
        _ => return Err(incompatible()),
    };

    let scope = rt.open_scope();
    let result = match next {
        Some(ch) => rt.create_iter_result(&scope, JsValue::from(ch.to_string()), false)?,
        None => rt.create_iter_result(&scope, JsValue::Undefined, true)?,
    };
    Ok(result.into())
}
