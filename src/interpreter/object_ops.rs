//! Object internal methods: property lookup, definition, assignment,
//! prototype mutation and enumeration

use std::ops::ControlFlow;

use crate::error::JsError;
use crate::value::{
    to_uint32, ExoticObject, JsObject, JsObjectRef, JsValue, Property, PropertyDescriptor,
    PropertyFlags, PropertyKey,
};

use super::builtins::string::{code_units, from_code_unit};
use super::Runtime;

/// Result of looking up a key on one object of a prototype chain
enum Lookup {
    Value(JsValue),
    Getter(Option<JsObjectRef>),
    NotFound(Option<JsObjectRef>),
}

impl Runtime {
    /// A copy of an own property
    pub fn get_own_property(
        &self,
        obj: JsObjectRef,
        key: &PropertyKey,
    ) -> Result<Option<Property>, JsError> {
        Ok(self.object(obj)?.get_own_property(key).cloned())
    }

    pub fn has_own_property(&self, obj: JsObjectRef, key: &PropertyKey) -> Result<bool, JsError> {
        Ok(self.object(obj)?.has_own_property(key))
    }

    /// [[Get]] with `obj` as the receiver
    pub fn get(&mut self, obj: JsObjectRef, key: &PropertyKey) -> Result<JsValue, JsError> {
        self.get_with_receiver(obj, key, JsValue::Object(obj))
    }

    /// GetV: property lookup on any value, primitives going through their
    /// prototype
    pub fn get_v(&mut self, value: &JsValue, key: &PropertyKey) -> Result<JsValue, JsError> {
        let proto = match value {
            JsValue::Object(obj) => return self.get(*obj, key),
            JsValue::Undefined | JsValue::Null => {
                return Err(JsError::type_error(format!(
                    "Cannot read properties of {:?} (reading '{}')",
                    value, key
                )));
            }
            JsValue::String(s) => {
                if key.eq_str("length") {
                    return Ok(JsValue::Number(code_units(s).len() as f64));
                }
                if let PropertyKey::Index(index) = key {
                    if let Some(unit) = code_units(s).get(*index as usize) {
                        return Ok(JsValue::String(from_code_unit(*unit)));
                    }
                }
                self.realm.string_prototype
            }
            JsValue::Number(_) => self.realm.number_prototype,
            JsValue::Boolean(_) => self.realm.boolean_prototype,
            JsValue::Symbol(_) => self.realm.symbol_prototype,
        };
        self.get_with_receiver(proto, key, value.clone())
    }

    fn get_with_receiver(
        &mut self,
        start: JsObjectRef,
        key: &PropertyKey,
        receiver: JsValue,
    ) -> Result<JsValue, JsError> {
        let mut current = Some(start);
        while let Some(obj) = current {
            let lookup = {
                let object = self.object(obj)?;
                match object.get_own_property(key) {
                    Some(prop) if prop.is_accessor() => Lookup::Getter(prop.getter),
                    Some(prop) => Lookup::Value(prop.value.clone()),
                    None => Lookup::NotFound(object.prototype),
                }
            };
            match lookup {
                Lookup::Value(value) => return Ok(value),
                Lookup::Getter(Some(getter)) => {
                    return self.call(&JsValue::Object(getter), receiver, &[]);
                }
                Lookup::Getter(None) => return Ok(JsValue::Undefined),
                Lookup::NotFound(proto) => current = proto,
            }
        }
        Ok(JsValue::Undefined)
    }

    /// [[DefineOwnProperty]]. Returns false when the definition is refused.
    pub fn define_own_property(
        &mut self,
        obj: JsObjectRef,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> Result<bool, JsError> {
        if self.object(obj)?.is_array() {
            if let PropertyKey::Index(index) = key {
                return self.define_array_index(obj, *index, desc);
            }
            if key.eq_str("length") {
                return self.define_array_length(obj, desc);
            }
        }
        Ok(validate_and_apply(self.object_mut(obj)?, key, desc))
    }

    /// [[DefineOwnProperty]] raising a TypeError on refusal
    pub fn define_own_property_or_throw(
        &mut self,
        obj: JsObjectRef,
        key: &PropertyKey,
        desc: &PropertyDescriptor,
    ) -> Result<(), JsError> {
        if self.define_own_property(obj, key, desc)? {
            return Ok(());
        }
        if self.has_own_property(obj, key)? {
            Err(JsError::type_error(format!("Cannot redefine property: {}", key)))
        } else {
            Err(JsError::type_error(format!(
                "Cannot define property {}, object is not extensible",
                key
            )))
        }
    }

    /// CreateDataProperty: define `key` as writable, enumerable, configurable
    pub fn create_data_property(
        &mut self,
        obj: JsObjectRef,
        key: &PropertyKey,
        value: JsValue,
    ) -> Result<bool, JsError> {
        self.define_own_property(obj, key, &PropertyDescriptor::new_data(value))
    }

    pub fn create_data_property_or_throw(
        &mut self,
        obj: JsObjectRef,
        key: &PropertyKey,
        value: JsValue,
    ) -> Result<(), JsError> {
        self.define_own_property_or_throw(obj, key, &PropertyDescriptor::new_data(value))
    }

    fn define_array_index(
        &mut self,
        obj: JsObjectRef,
        index: u32,
        desc: &PropertyDescriptor,
    ) -> Result<bool, JsError> {
        let length_key = self.key("length");
        let object = self.object_mut(obj)?;
        let (length, length_writable) = match object.get_own_property(&length_key) {
            Some(prop) => (to_uint32(prop.value.to_number()), prop.writable),
            None => (0, true),
        };
        if index >= length && !length_writable {
            return Ok(false);
        }
        if !validate_and_apply(object, &PropertyKey::Index(index), desc) {
            return Ok(false);
        }
        if index >= length {
            if let Some(prop) = object.get_own_property_mut(&length_key) {
                prop.value = JsValue::Number(index as f64 + 1.0);
            }
        }
        Ok(true)
    }

    fn define_array_length(
        &mut self,
        obj: JsObjectRef,
        desc: &PropertyDescriptor,
    ) -> Result<bool, JsError> {
        let length_key = self.key("length");
        let Some(value) = &desc.value else {
            return Ok(validate_and_apply(self.object_mut(obj)?, &length_key, desc));
        };
        let number = value.to_number();
        let new_len = to_uint32(number);
        if new_len as f64 != number {
            return Err(JsError::range_error("Invalid array length"));
        }

        let object = self.object_mut(obj)?;
        let (old_len, writable) = match object.get_own_property(&length_key) {
            Some(prop) => (to_uint32(prop.value.to_number()), prop.writable),
            None => (0, true),
        };
        let mut new_desc = desc.clone();
        new_desc.value = Some(JsValue::Number(new_len as f64));
        if new_len >= old_len {
            return Ok(validate_and_apply(object, &length_key, &new_desc));
        }
        if !writable {
            return Ok(false);
        }

        // Delete from the top; a non-configurable element stops the truncation
        let doomed: Vec<u32> = object.elements.range(new_len..).map(|(i, _)| *i).rev().collect();
        let mut final_len = new_len;
        for index in doomed {
            if object.elements.get(&index).is_some_and(|p| p.configurable) {
                object.elements.remove(&index);
            } else {
                final_len = index + 1;
                break;
            }
        }
        new_desc.value = Some(JsValue::Number(final_len as f64));
        let applied = validate_and_apply(object, &length_key, &new_desc);
        Ok(applied && final_len == new_len)
    }

    /// [[Set]] with `obj` as the receiver. Failures raise a TypeError.
    pub fn set(&mut self, obj: JsObjectRef, key: &PropertyKey, value: JsValue) -> Result<(), JsError> {
        let mut current = Some(obj);
        while let Some(holder) = current {
            let (prop, proto) = {
                let object = self.object(holder)?;
                (object.get_own_property(key).cloned(), object.prototype)
            };
            let Some(prop) = prop else {
                current = proto;
                continue;
            };
            if prop.is_accessor() {
                return match prop.setter {
                    Some(setter) => self
                        .call(&JsValue::Object(setter), JsValue::Object(obj), &[value])
                        .map(|_| ()),
                    None => Err(JsError::type_error(format!(
                        "Cannot set property {} which has only a getter",
                        key
                    ))),
                };
            }
            if !prop.writable {
                return Err(JsError::type_error(format!(
                    "Cannot assign to read only property '{}'",
                    key
                )));
            }
            if holder == obj {
                let desc = PropertyDescriptor {
                    value: Some(value),
                    ..Default::default()
                };
                return self.define_own_property_or_throw(obj, key, &desc);
            }
            break;
        }
        if self.create_data_property(obj, key, value)? {
            Ok(())
        } else {
            Err(JsError::type_error(format!(
                "Cannot add property {}, object is not extensible",
                key
            )))
        }
    }

    /// [[SetPrototypeOf]]. Returns false if the object is not extensible or
    /// the new prototype would create a cycle.
    pub fn set_prototype_of(
        &mut self,
        obj: JsObjectRef,
        proto: Option<JsObjectRef>,
    ) -> Result<bool, JsError> {
        let object = self.object(obj)?;
        if object.prototype == proto {
            return Ok(true);
        }
        if !object.extensible {
            return Ok(false);
        }
        let mut ancestor = proto;
        while let Some(p) = ancestor {
            if p == obj {
                return Ok(false);
            }
            ancestor = self.object(p)?.prototype;
        }
        self.object_mut(obj)?.prototype = proto;
        Ok(true)
    }

    pub fn prevent_extensions(&mut self, obj: JsObjectRef) -> Result<(), JsError> {
        self.object_mut(obj)?.extensible = false;
        Ok(())
    }

    pub fn is_extensible(&self, obj: JsObjectRef) -> Result<bool, JsError> {
        Ok(self.object(obj)?.extensible)
    }

    /// [[OwnPropertyKeys]]: indices ascending, strings, then symbols
    pub fn own_property_keys(&self, obj: JsObjectRef) -> Result<Vec<PropertyKey>, JsError> {
        Ok(self.object(obj)?.own_keys())
    }

    /// Visit own properties in [[OwnPropertyKeys]] order until the callback
    /// breaks.
    ///
    /// The key list is taken up front; keys deleted by an earlier callback
    /// are skipped. The callback's error is returned; mutations it already
    /// made stay.
    pub fn for_each_own_property_while<F>(
        &mut self,
        obj: JsObjectRef,
        mut callback: F,
    ) -> Result<(), JsError>
    where
        F: FnMut(&mut Runtime, &PropertyKey, PropertyFlags) -> ControlFlow<JsError>,
    {
        let keys = self.own_property_keys(obj)?;
        for key in keys {
            let Some(flags) = self.object(obj)?.get_own_property(&key).map(Property::flags) else {
                continue;
            };
            if let ControlFlow::Break(err) = callback(self, &key, flags) {
                return Err(err);
            }
        }
        Ok(())
    }

    /// Value of an array's `length`
    pub fn array_length(&mut self, obj: JsObjectRef) -> Result<u32, JsError> {
        let length_key = self.key("length");
        Ok(self
            .object(obj)?
            .get_own_property(&length_key)
            .map(|prop| to_uint32(prop.value.to_number()))
            .unwrap_or(0))
    }

    pub fn is_array(&self, value: &JsValue) -> bool {
        value
            .as_object()
            .and_then(|obj| self.heap.get(obj))
            .is_some_and(JsObject::is_array)
    }

    /// ToNumber, running valueOf/toString on objects
    pub fn to_number(&mut self, value: &JsValue) -> Result<f64, JsError> {
        match value {
            JsValue::Symbol(_) => Err(JsError::type_error(
                "Cannot convert a Symbol value to a number",
            )),
            JsValue::Object(obj) => {
                let primitive = self.to_primitive_number(*obj)?;
                self.to_number(&primitive)
            }
            other => Ok(other.to_number()),
        }
    }

    fn to_primitive_number(&mut self, obj: JsObjectRef) -> Result<JsValue, JsError> {
        if let ExoticObject::Primitive(value) = &self.object(obj)?.exotic {
            return Ok(value.clone());
        }
        for name in ["valueOf", "toString"] {
            let key = self.key(name);
            let method = self.get(obj, &key)?;
            if self.is_callable(&method) {
                let result = self.call(&method, JsValue::Object(obj), &[])?;
                if !result.is_object() {
                    return Ok(result);
                }
            }
        }
        Err(JsError::type_error("Cannot convert object to primitive value"))
    }
}

/// ValidateAndApplyPropertyDescriptor on an ordinary property table
fn validate_and_apply(object: &mut JsObject, key: &PropertyKey, desc: &PropertyDescriptor) -> bool {
    if !object.has_own_property(key) {
        if !object.extensible {
            return false;
        }
        object.insert_property(key.clone(), desc.to_new_property());
        return true;
    }
    let Some(current) = object.get_own_property_mut(key) else {
        return false;
    };

    if !current.configurable {
        if desc.configurable == Some(true) {
            return false;
        }
        if desc.enumerable.is_some_and(|e| e != current.enumerable) {
            return false;
        }
        if (desc.is_accessor_descriptor() && !current.is_accessor())
            || (desc.is_data_descriptor() && current.is_accessor())
        {
            return false;
        }
        if current.is_accessor() {
            if desc.getter.is_some_and(|g| g != current.getter)
                || desc.setter.is_some_and(|s| s != current.setter)
            {
                return false;
            }
        } else if !current.writable {
            if desc.writable == Some(true) {
                return false;
            }
            if desc
                .value
                .as_ref()
                .is_some_and(|v| !v.same_value(&current.value))
            {
                return false;
            }
        }
    }

    if desc.is_accessor_descriptor() && !current.is_accessor() {
        let mut replacement = Property::accessor(None, None);
        replacement.enumerable = current.enumerable;
        replacement.configurable = current.configurable;
        *current = replacement;
    } else if desc.is_data_descriptor() && current.is_accessor() {
        *current = Property::with_attributes(
            JsValue::Undefined,
            false,
            current.enumerable,
            current.configurable,
        );
    }

    if let Some(value) = &desc.value {
        current.value = value.clone();
    }
    if let Some(writable) = desc.writable {
        current.writable = writable;
    }
    if let Some(enumerable) = desc.enumerable {
        current.enumerable = enumerable;
    }
    if let Some(configurable) = desc.configurable {
        current.configurable = configurable;
    }
    if let Some(getter) = desc.getter {
        current.getter = getter;
    }
    if let Some(setter) = desc.setter {
        current.setter = setter;
    }
    true
}
