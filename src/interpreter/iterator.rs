//! Iterator protocol
//!
//! GetIterator / IteratorStep over `Symbol.iterator`, plus
//! the shared `%IteratorPrototype%`.

use crate::error::JsError;
use crate::value::{JsHandle, JsObjectRef, JsValue, PropertyKey, Scope};

use super::Runtime;

/// An iterator together with its `next` method, both registered in the
/// scope passed to [`Runtime::get_iterator`]
#[derive(Debug, Clone)]
pub struct IteratorRecord {
    pub iterator: JsHandle,
    pub next_method: JsValue,
}

impl Runtime {
    /// GetIterator(value, sync)
    pub fn get_iterator(&mut self, scope: &Scope, value: &JsValue) -> Result<IteratorRecord, JsError> {
        let iterator_key = PropertyKey::Symbol(self.symbol_iterator());
        let method = self.get_v(value, &iterator_key)?;
        if !self.is_callable(&method) {
            return Err(JsError::type_error(format!(
                "{} is not iterable",
                self.describe(value)
            )));
        }
        let iterator = match self.call(&method, value.clone(), &[])? {
            JsValue::Object(obj) => scope.handle(obj),
            _ => {
                return Err(JsError::type_error(
                    "Result of the Symbol.iterator method is not an object",
                ));
            }
        };
        let next_key = self.key("next");
        let next_method = self.get(iterator.get(), &next_key)?;
        next_method.root(scope);
        Ok(IteratorRecord {
            iterator,
            next_method,
        })
    }

    /// Step the iterator. Returns `None` once it reports `done`.
    ///
    /// The returned value is registered in `scope`.
    pub fn iterator_step_value(
        &mut self,
        scope: &Scope,
        record: &IteratorRecord,
    ) -> Result<Option<JsValue>, JsError> {
        let result = self.call(&record.next_method, record.iterator.into(), &[])?;
        let Some(result) = result.as_object() else {
            return Err(JsError::type_error(format!(
                "Iterator result {} is not an object",
                self.describe(&result)
            )));
        };
        scope.handle(result);
        let done_key = self.key("done");
        if self.get(result, &done_key)?.to_boolean() {
            return Ok(None);
        }
        let value_key = self.key("value");
        let value = self.get(result, &value_key)?;
        value.root(scope);
        Ok(Some(value))
    }

    /// CreateIterResultObject
    pub fn create_iter_result(
        &mut self,
        scope: &Scope,
        value: JsValue,
        done: bool,
    ) -> Result<JsHandle, JsError> {
        value.root(scope);
        let result = self.new_object(scope);
        let value_key = self.key("value");
        let done_key = self.key("done");
        self.create_data_property_or_throw(result.get(), &value_key, value)?;
        self.create_data_property_or_throw(result.get(), &done_key, JsValue::Boolean(done))?;
        Ok(result)
    }
}

/// `%IteratorPrototype%[Symbol.iterator]` returns `this`
pub(super) fn init_iterator_prototype(rt: &mut Runtime) {
    let proto: JsObjectRef = rt.realm.iterator_prototype;
    let key = PropertyKey::Symbol(rt.symbol_iterator());
    rt.register_method(proto, key, "[Symbol.iterator]", iterator_self, 0);
}

fn iterator_self(_rt: &mut Runtime, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(this)
}
