//! JavaScript value representation
//!
//! The core JsValue type and the object model the builtins operate on:
//! property keys, property descriptors, ordinary/array/function objects.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::error::JsError;
use crate::gc::{Gc, Handle, HandleScope, Reset, Traceable};
use crate::interpreter::{Runtime, UnitId};

/// Trait for types that have cheap (O(1), reference-counted) clones.
///
/// This trait makes it explicit when a clone is cheap (just incrementing a
/// reference count) vs when it might be expensive (copying data).
pub trait CheapClone: Clone {
    /// Create a cheap (reference-counted) clone of this value.
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}

/// Reference to a heap-allocated object (GC-managed, unrooted)
pub type JsObjectRef = Gc<JsObject>;

/// A JavaScript object reference registered in a handle scope
pub type JsHandle = Handle<JsObject>;

/// A handle scope over the object heap
pub type Scope = HandleScope<JsObject>;

impl<T> CheapClone for Gc<T> {}

/// A JavaScript value
#[derive(Clone, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Symbol(JsSymbol),
    Object(JsObjectRef),
}

impl JsValue {
    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, JsValue::Null | JsValue::Undefined)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, JsValue::Object(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, JsValue::Number(_))
    }

    /// The object reference, if this is an object
    pub fn as_object(&self) -> Option<JsObjectRef> {
        match self {
            JsValue::Object(obj) => Some(*obj),
            _ => None,
        }
    }

    /// Register the object (if any) in `scope`
    pub fn root(&self, scope: &Scope) -> Option<JsHandle> {
        self.as_object().map(|obj| scope.handle(obj))
    }

    /// Convert to boolean (ToBoolean)
    pub fn to_boolean(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::String(s) => !s.is_empty(),
            JsValue::Symbol(_) => true,
            JsValue::Object(_) => true,
        }
    }

    /// Convert a primitive to number (ToNumber). Objects yield NaN; callers
    /// that need ToPrimitive must run it first.
    pub fn to_number(&self) -> f64 {
        match self {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(true) => 1.0,
            JsValue::Boolean(false) => 0.0,
            JsValue::Number(n) => *n,
            JsValue::String(s) => string_to_number(s.as_str()),
            JsValue::Symbol(_) => f64::NAN,
            JsValue::Object(_) => f64::NAN,
        }
    }

    /// Convert to string (ToString) for primitives
    pub fn to_js_string(&self) -> JsString {
        match self {
            JsValue::Undefined => JsString::from("undefined"),
            JsValue::Null => JsString::from("null"),
            JsValue::Boolean(true) => JsString::from("true"),
            JsValue::Boolean(false) => JsString::from("false"),
            JsValue::Number(n) => JsString::from(number_to_string(*n)),
            JsValue::String(s) => s.cheap_clone(),
            JsValue::Symbol(s) => JsString::from(s.to_string()),
            JsValue::Object(_) => JsString::from("[object Object]"),
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Symbol(a), JsValue::Symbol(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => Gc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// SameValue: like === but NaN equals NaN and +0 differs from -0
    pub fn same_value(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Number(a), JsValue::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b && a.is_sign_negative() == b.is_sign_negative()
                }
            }
            _ => self.strict_equals(other),
        }
    }
}

/// ToUint32 on a number
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    let int = n.trunc();
    let modulo = int.rem_euclid(4_294_967_296.0);
    modulo as u32
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let (Some(radix), Some(digits)) = (radix, trimmed.get(2..)) {
        return u64::from_str_radix(digits, radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }
    // Rust accepts "inf" and "nan"; JavaScript does not
    if trimmed
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Boolean(b) => write!(f, "{}", b),
            JsValue::Number(n) => write!(f, "{}", n),
            JsValue::String(s) => write!(f, "\"{}\"", s.as_str()),
            JsValue::Symbol(s) => write!(f, "{}", s),
            JsValue::Object(obj) => write!(f, "[object {:?}]", obj),
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

// Conversions from Rust types

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<u32> for JsValue {
    fn from(n: u32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<JsString> for JsValue {
    fn from(s: JsString) -> Self {
        JsValue::String(s)
    }
}

impl From<JsSymbol> for JsValue {
    fn from(s: JsSymbol) -> Self {
        JsValue::Symbol(s)
    }
}

impl From<JsObjectRef> for JsValue {
    fn from(obj: JsObjectRef) -> Self {
        JsValue::Object(obj)
    }
}

impl From<JsHandle> for JsValue {
    fn from(handle: JsHandle) -> Self {
        JsValue::Object(handle.get())
    }
}

/// Reference-counted string for efficient string handling
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsString(Rc<str>);

impl CheapClone for JsString {}

impl JsString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for JsString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(s.into())
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(s.into())
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// JavaScript Symbol primitive
/// Symbols are unique identifiers, optionally with a description
#[derive(Clone, Debug)]
pub struct JsSymbol {
    id: u64,
    pub description: Option<JsString>,
}

impl JsSymbol {
    pub fn new(id: u64, description: Option<JsString>) -> Self {
        Self { id, description }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for JsSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for JsSymbol {}

impl std::hash::Hash for JsSymbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for JsSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "Symbol({})", desc),
            None => write!(f, "Symbol()"),
        }
    }
}

/// Property key (string, index, or symbol)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(JsString),
    Index(u32),
    Symbol(JsSymbol),
}

/// Largest valid array index is 2^32 - 2
const MAX_ARRAY_INDEX: u32 = u32::MAX - 1;

impl PropertyKey {
    pub fn from_value(value: &JsValue) -> Self {
        match value {
            JsValue::Number(n) => {
                let idx = *n as u32;
                if idx as f64 == *n && idx <= MAX_ARRAY_INDEX && !n.is_sign_negative() {
                    PropertyKey::Index(idx)
                } else {
                    PropertyKey::String(value.to_js_string())
                }
            }
            JsValue::String(s) => PropertyKey::from(s.cheap_clone()),
            JsValue::Symbol(s) => PropertyKey::Symbol(s.clone()),
            _ => PropertyKey::String(value.to_js_string()),
        }
    }

    /// Check if this is a symbol key
    pub fn is_symbol(&self) -> bool {
        matches!(self, PropertyKey::Symbol(_))
    }

    /// The array index, if this key is one
    pub fn as_index(&self) -> Option<u32> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            _ => None,
        }
    }

    /// Check if this key equals a string literal (avoids allocation)
    #[inline]
    pub fn eq_str(&self, s: &str) -> bool {
        match self {
            PropertyKey::String(js_str) => js_str.as_str() == s,
            PropertyKey::Index(_) | PropertyKey::Symbol(_) => false,
        }
    }

    /// The key as a script value (indices become strings)
    pub fn to_value(&self) -> JsValue {
        match self {
            PropertyKey::String(s) => JsValue::String(s.cheap_clone()),
            PropertyKey::Index(i) => JsValue::String(JsString::from(i.to_string())),
            PropertyKey::Symbol(s) => JsValue::Symbol(s.clone()),
        }
    }
}

fn canonical_index(s: &str) -> Option<u32> {
    let first = s.bytes().next()?;
    if !first.is_ascii_digit() {
        return None;
    }
    let idx = s.parse::<u32>().ok()?;
    // Verify it's canonical (no leading zeros except "0")
    (idx <= MAX_ARRAY_INDEX && idx.to_string() == s).then_some(idx)
}

impl From<&str> for PropertyKey {
    #[inline]
    fn from(s: &str) -> Self {
        match canonical_index(s) {
            Some(idx) => PropertyKey::Index(idx),
            None => PropertyKey::String(JsString::from(s)),
        }
    }
}

impl From<JsString> for PropertyKey {
    #[inline]
    fn from(s: JsString) -> Self {
        match canonical_index(s.as_str()) {
            Some(idx) => PropertyKey::Index(idx),
            None => PropertyKey::String(s),
        }
    }
}

impl From<u32> for PropertyKey {
    fn from(idx: u32) -> Self {
        PropertyKey::Index(idx)
    }
}

impl From<JsSymbol> for PropertyKey {
    fn from(sym: JsSymbol) -> Self {
        PropertyKey::Symbol(sym)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{}", s),
            PropertyKey::Index(i) => write!(f, "{}", i),
            PropertyKey::Symbol(s) => write!(f, "{}", s),
        }
    }
}

/// Object property (data or accessor) with its attribute flags
#[derive(Debug, Clone)]
pub struct Property {
    pub value: JsValue,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
    /// Getter function (for accessor properties)
    pub getter: Option<JsObjectRef>,
    /// Setter function (for accessor properties)
    pub setter: Option<JsObjectRef>,
    accessor: bool,
}

impl Property {
    /// Data property with the default flags of a new own property
    pub fn data(value: JsValue) -> Self {
        Self::with_attributes(value, true, true, true)
    }

    /// Create an accessor property with getter and/or setter
    pub fn accessor(getter: Option<JsObjectRef>, setter: Option<JsObjectRef>) -> Self {
        Self {
            value: JsValue::Undefined,
            writable: false,
            enumerable: true,
            configurable: true,
            getter,
            setter,
            accessor: true,
        }
    }

    /// Create a data property with custom attributes
    pub fn with_attributes(
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            value,
            writable,
            enumerable,
            configurable,
            getter: None,
            setter: None,
            accessor: false,
        }
    }

    pub fn is_accessor(&self) -> bool {
        self.accessor
    }

    /// The attribute flags of this property
    pub fn flags(&self) -> PropertyFlags {
        PropertyFlags {
            writable: self.writable,
            enumerable: self.enumerable,
            configurable: self.configurable,
            accessor: self.accessor,
        }
    }

    fn trace(&self, visitor: &mut impl FnMut(JsObjectRef)) {
        if let JsValue::Object(obj) = &self.value {
            visitor(*obj);
        }
        if let Some(getter) = self.getter {
            visitor(getter);
        }
        if let Some(setter) = self.setter {
            visitor(setter);
        }
    }
}

/// Attribute flags of an own property, as seen during enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyFlags {
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
    pub accessor: bool,
}

/// A partial property descriptor, as passed to [[DefineOwnProperty]].
///
/// Absent fields leave the existing attribute unchanged, or default to
/// `false`/`undefined` when a new property is created.
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
    pub getter: Option<Option<JsObjectRef>>,
    pub setter: Option<Option<JsObjectRef>>,
}

impl PropertyDescriptor {
    /// Writable, enumerable, configurable data property
    pub fn new_data(value: JsValue) -> Self {
        Self {
            value: Some(value),
            writable: Some(true),
            enumerable: Some(true),
            configurable: Some(true),
            ..Default::default()
        }
    }

    /// Non-writable, non-enumerable, non-configurable data property
    pub fn constant(value: JsValue) -> Self {
        Self {
            value: Some(value),
            writable: Some(false),
            enumerable: Some(false),
            configurable: Some(false),
            ..Default::default()
        }
    }

    /// Enumerable but otherwise locked data property (frozen array element)
    pub fn frozen_element(value: JsValue) -> Self {
        Self {
            value: Some(value),
            writable: Some(false),
            enumerable: Some(true),
            configurable: Some(false),
            ..Default::default()
        }
    }

    /// Writable, enumerable, non-configurable data property (module export)
    pub fn export(value: JsValue) -> Self {
        Self {
            value: Some(value),
            writable: Some(true),
            enumerable: Some(true),
            configurable: Some(false),
            ..Default::default()
        }
    }

    /// Lock an existing property: non-writable and non-configurable, value kept
    pub fn frozen() -> Self {
        Self {
            writable: Some(false),
            configurable: Some(false),
            ..Default::default()
        }
    }

    /// Enumerable, configurable accessor property
    pub fn accessor(getter: Option<JsObjectRef>, setter: Option<JsObjectRef>) -> Self {
        Self {
            getter: Some(getter),
            setter: Some(setter),
            enumerable: Some(true),
            configurable: Some(true),
            ..Default::default()
        }
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.getter.is_some() || self.setter.is_some()
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// Build the property created when this descriptor defines a new key
    pub fn to_new_property(&self) -> Property {
        let enumerable = self.enumerable.unwrap_or(false);
        let configurable = self.configurable.unwrap_or(false);
        if self.is_accessor_descriptor() {
            let mut prop = Property::accessor(self.getter.flatten(), self.setter.flatten());
            prop.enumerable = enumerable;
            prop.configurable = configurable;
            prop
        } else {
            Property::with_attributes(
                self.value.clone().unwrap_or_default(),
                self.writable.unwrap_or(false),
                enumerable,
                configurable,
            )
        }
    }
}

/// A JavaScript object
#[derive(Debug)]
pub struct JsObject {
    /// Prototype link
    pub prototype: Option<JsObjectRef>,
    /// Whether the object can have properties added
    pub extensible: bool,
    /// Indexed properties, kept in ascending index order
    pub elements: BTreeMap<u32, Property>,
    /// Named properties (strings and symbols) in insertion order
    pub properties: IndexMap<PropertyKey, Property, FxBuildHasher>,
    /// Exotic object behavior
    pub exotic: ExoticObject,
}

impl JsObject {
    /// Create a new ordinary object
    pub fn new() -> Self {
        Self {
            prototype: None,
            extensible: true,
            elements: BTreeMap::new(),
            properties: IndexMap::default(),
            exotic: ExoticObject::Ordinary,
        }
    }

    /// Create a new ordinary object with a prototype
    pub fn with_prototype(prototype: Option<JsObjectRef>) -> Self {
        Self {
            prototype,
            ..Self::new()
        }
    }

    /// Check if this object is callable
    pub fn is_callable(&self) -> bool {
        matches!(self.exotic, ExoticObject::Function(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.exotic, ExoticObject::Array)
    }

    /// Get an own property
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<&Property> {
        match key {
            PropertyKey::Index(i) => self.elements.get(i),
            _ => self.properties.get(key),
        }
    }

    /// Mutably get an own property
    pub fn get_own_property_mut(&mut self, key: &PropertyKey) -> Option<&mut Property> {
        match key {
            PropertyKey::Index(i) => self.elements.get_mut(i),
            _ => self.properties.get_mut(key),
        }
    }

    /// Check if object has own property
    pub fn has_own_property(&self, key: &PropertyKey) -> bool {
        self.get_own_property(key).is_some()
    }

    /// Insert or replace an own property without any validation
    pub fn insert_property(&mut self, key: PropertyKey, prop: Property) {
        match key {
            PropertyKey::Index(i) => {
                self.elements.insert(i, prop);
            }
            _ => {
                self.properties.insert(key, prop);
            }
        }
    }

    /// Remove an own property, preserving the order of the remaining ones
    pub fn remove_property(&mut self, key: &PropertyKey) -> Option<Property> {
        match key {
            PropertyKey::Index(i) => self.elements.remove(i),
            _ => self.properties.shift_remove(key),
        }
    }

    /// Own property keys: indices ascending, then strings in insertion
    /// order, then symbols in insertion order
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let mut keys: Vec<PropertyKey> = Vec::with_capacity(self.elements.len() + self.properties.len());
        keys.extend(self.elements.keys().map(|i| PropertyKey::Index(*i)));
        keys.extend(self.properties.keys().filter(|k| !k.is_symbol()).cloned());
        keys.extend(self.properties.keys().filter(|k| k.is_symbol()).cloned());
        keys
    }

    /// The function data, if this object is callable
    pub fn as_function(&self) -> Option<&JsFunction> {
        match &self.exotic {
            ExoticObject::Function(func) => Some(func),
            _ => None,
        }
    }

    /// The generator state, if this object is a generator
    pub fn as_generator(&self) -> Option<&GeneratorState> {
        match &self.exotic {
            ExoticObject::Generator(state) => Some(state),
            _ => None,
        }
    }

    pub fn as_generator_mut(&mut self) -> Option<&mut GeneratorState> {
        match &mut self.exotic {
            ExoticObject::Generator(state) => Some(state),
            _ => None,
        }
    }
}

impl Default for JsObject {
    fn default() -> Self {
        Self::new()
    }
}

/// Reset implementation for JsObject - collected slots drop their contents
impl Reset for JsObject {
    fn reset(&mut self) {
        self.prototype = None;
        self.extensible = true;
        self.elements.clear();
        self.properties.clear();
        self.exotic = ExoticObject::Ordinary;
    }
}

impl Traceable for JsObject {
    fn trace<F: FnMut(Gc<Self>)>(&self, mut visitor: F) {
        if let Some(proto) = self.prototype {
            visitor(proto);
        }
        for prop in self.elements.values() {
            prop.trace(&mut visitor);
        }
        for prop in self.properties.values() {
            prop.trace(&mut visitor);
        }
        match &self.exotic {
            ExoticObject::ArrayIterator {
                iterated: Some(target),
                ..
            } => visitor(*target),
            ExoticObject::Generator(state) => visitor(state.function),
            ExoticObject::Ordinary
            | ExoticObject::Array
            | ExoticObject::Function(_)
            | ExoticObject::Primitive(_)
            | ExoticObject::ArrayIterator { iterated: None, .. }
            | ExoticObject::StringIterator { .. } => {}
        }
    }
}

/// Exotic object behavior
#[derive(Debug)]
pub enum ExoticObject {
    /// Ordinary object
    Ordinary,
    /// Array exotic object; its length lives in the own `length` property
    Array,
    /// Function exotic object
    Function(JsFunction),
    /// Boolean/Number/String/Symbol wrapper created by ToObject
    Primitive(JsValue),
    /// Iterator over an array-like; `iterated` is cleared once exhausted
    ArrayIterator {
        iterated: Option<JsObjectRef>,
        next_index: u32,
    },
    /// Iterator over the code points of a string
    StringIterator { string: JsString, position: usize },
    /// Generator object
    Generator(GeneratorState),
}

/// Generator object state
#[derive(Debug, Clone)]
pub struct GeneratorState {
    /// The generator function whose body runs on each resumption
    pub function: JsObjectRef,
    pub status: GeneratorStatus,
    /// Set while the activation forwards to an inner iterator (`yield*`)
    pub delegated: bool,
}

/// Status of generator execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorStatus {
    SuspendedStart,
    SuspendedYield,
    Executing,
    Completed,
}

/// Native function signature
pub type NativeFn = fn(&mut Runtime, JsValue, &[JsValue]) -> Result<JsValue, JsError>;

/// Entry point supplied by the host interpreter for a compiled function's bytecode
pub type ScriptBody = Rc<dyn Fn(&mut Runtime, JsValue, &[JsValue]) -> Result<JsValue, JsError>>;

/// Function representation
#[derive(Debug, Clone)]
pub enum JsFunction {
    /// Native Rust function
    Native(NativeFunction),
    /// Function compiled to bytecode in some compilation unit
    Compiled(CompiledFunction),
}

impl JsFunction {
    pub fn name(&self) -> Option<&str> {
        match self {
            JsFunction::Native(f) => Some(f.name.as_str()),
            JsFunction::Compiled(f) => f.name.as_ref().map(|s| s.as_str()),
        }
    }

    /// Whether the function supports [[Construct]]
    pub fn is_constructor(&self) -> bool {
        match self {
            JsFunction::Native(_) => false,
            JsFunction::Compiled(f) => f.kind == FunctionKind::Normal,
        }
    }
}

/// Native function wrapper
#[derive(Clone)]
pub struct NativeFunction {
    pub name: JsString,
    pub func: NativeFn,
    pub arity: u32,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Kind of a compiled function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Normal,
    Arrow,
    /// Generator inner function: runs as the body of a generator activation
    Generator,
}

/// Function compiled into a compilation unit
#[derive(Clone)]
pub struct CompiledFunction {
    pub name: Option<JsString>,
    /// Compilation unit owning the code
    pub unit: UnitId,
    pub kind: FunctionKind,
    pub body: ScriptBody,
}

impl fmt::Debug for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFunction")
            .field("name", &self.name)
            .field("unit", &self.unit)
            .field("kind", &self.kind)
            .finish()
    }
}
