//! Runtime state shared by the builtins
//!
//! The [`Runtime`] owns the object heap, the realm intrinsics, the call stack
//! and the loaded compilation units. Builtins receive `&mut Runtime` and reach
//! everything else through it.

pub mod builtins;
mod iterator;
mod object_ops;
mod stack;
mod unit;

use rustc_hash::FxHashMap;

pub use builtins::{BuiltinMethod, BuiltinTable};
pub use iterator::IteratorRecord;
pub use stack::{CallStack, Frame, FrameView};
pub use unit::{CompilationUnit, UnitId};

use crate::config::RuntimeConfig;
use crate::error::JsError;
use crate::gc::{GcStats, Heap};
use crate::string_dict::StringDict;
use crate::value::{
    CheapClone, CompiledFunction, ExoticObject, FunctionKind, GeneratorState, GeneratorStatus,
    JsFunction, JsHandle, JsObject, JsObjectRef, JsString, JsSymbol, JsValue, NativeFn,
    NativeFunction, Property, PropertyKey, Scope, ScriptBody,
};

/// Intrinsic objects of the realm. All of them are persistent roots.
#[derive(Debug, Clone, Copy)]
pub struct Realm {
    pub object_prototype: JsObjectRef,
    pub function_prototype: JsObjectRef,
    pub array_prototype: JsObjectRef,
    pub string_prototype: JsObjectRef,
    pub number_prototype: JsObjectRef,
    pub boolean_prototype: JsObjectRef,
    pub symbol_prototype: JsObjectRef,
    pub iterator_prototype: JsObjectRef,
    pub array_iterator_prototype: JsObjectRef,
    pub string_iterator_prototype: JsObjectRef,
    pub generator_prototype: JsObjectRef,
}

impl Realm {
    fn create(heap: &mut Heap<JsObject>) -> Self {
        let scope = heap.open_scope();
        let object_prototype = heap.alloc(&scope, JsObject::new()).get();
        let derived = |heap: &mut Heap<JsObject>, proto: JsObjectRef| {
            heap.alloc(&scope, JsObject::with_prototype(Some(proto)))
                .get()
        };
        let function_prototype = derived(heap, object_prototype);
        let array_prototype = derived(heap, object_prototype);
        let string_prototype = derived(heap, object_prototype);
        let number_prototype = derived(heap, object_prototype);
        let boolean_prototype = derived(heap, object_prototype);
        let symbol_prototype = derived(heap, object_prototype);
        let iterator_prototype = derived(heap, object_prototype);
        let array_iterator_prototype = derived(heap, iterator_prototype);
        let string_iterator_prototype = derived(heap, iterator_prototype);
        let generator_prototype = derived(heap, iterator_prototype);

        let realm = Self {
            object_prototype,
            function_prototype,
            array_prototype,
            string_prototype,
            number_prototype,
            boolean_prototype,
            symbol_prototype,
            iterator_prototype,
            array_iterator_prototype,
            string_iterator_prototype,
            generator_prototype,
        };
        for intrinsic in realm.all() {
            heap.add_root(intrinsic);
        }
        realm
    }

    fn all(&self) -> [JsObjectRef; 11] {
        [
            self.object_prototype,
            self.function_prototype,
            self.array_prototype,
            self.string_prototype,
            self.number_prototype,
            self.boolean_prototype,
            self.symbol_prototype,
            self.iterator_prototype,
            self.array_iterator_prototype,
            self.string_iterator_prototype,
            self.generator_prototype,
        ]
    }
}

/// The runtime state
pub struct Runtime {
    heap: Heap<JsObject>,
    stack: CallStack,
    realm: Realm,
    units: FxHashMap<UnitId, CompilationUnit>,
    next_unit_id: u32,
    builtins: BuiltinTable,
    /// Value of the pending `JsError::Thrown`, rooted while set
    thrown_value: Option<JsValue>,
    string_dict: StringDict,
    next_symbol_id: u64,
    symbol_iterator: JsSymbol,
    config: RuntimeConfig,
}

impl Runtime {
    /// Create a runtime with the default configuration
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let mut heap = Heap::with_threshold(config.gc_threshold);
        let realm = Realm::create(&mut heap);
        let mut rt = Self {
            heap,
            stack: CallStack::default(),
            realm,
            units: FxHashMap::default(),
            next_unit_id: 0,
            builtins: BuiltinTable::default(),
            thrown_value: None,
            string_dict: StringDict::with_common_strings(),
            next_symbol_id: 1,
            symbol_iterator: JsSymbol::new(0, Some(JsString::from("Symbol.iterator"))),
            config,
        };
        iterator::init_iterator_prototype(&mut rt);
        builtins::array::init_array_prototype(&mut rt);
        builtins::string::init_string_prototype(&mut rt);
        rt.builtins = BuiltinTable::create(&mut rt);
        tracing::debug!(
            gc_threshold = rt.config.gc_threshold,
            max_call_depth = rt.config.max_call_depth,
            "runtime created"
        );
        rt
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Heap
    // ═══════════════════════════════════════════════════════════════════════

    /// Open a handle scope; handles registered through it live until it drops
    pub fn open_scope(&self) -> Scope {
        self.heap.open_scope()
    }

    /// Allocate an object. May collect first, so everything `obj` refers to
    /// must already be rooted.
    pub fn alloc(&mut self, scope: &Scope, obj: JsObject) -> JsHandle {
        self.heap.alloc(scope, obj)
    }

    /// Borrow a live object
    pub fn object(&self, obj: JsObjectRef) -> Result<&JsObject, JsError> {
        self.heap.get(obj).ok_or_else(stale_reference)
    }

    /// Mutably borrow a live object
    pub fn object_mut(&mut self, obj: JsObjectRef) -> Result<&mut JsObject, JsError> {
        self.heap.get_mut(obj).ok_or_else(stale_reference)
    }

    pub fn is_live(&self, obj: JsObjectRef) -> bool {
        self.heap.is_live(obj)
    }

    pub fn is_registered(&self, handle: &JsHandle) -> bool {
        self.heap.is_registered(handle)
    }

    /// Current depth of the root registry
    pub fn registry_depth(&self) -> usize {
        self.heap.registry_depth()
    }

    pub fn add_root(&mut self, obj: JsObjectRef) {
        self.heap.add_root(obj);
    }

    pub fn remove_root(&mut self, obj: JsObjectRef) {
        self.heap.remove_root(obj);
    }

    /// Run a full collection, returning the number of objects freed
    pub fn collect_garbage(&mut self) -> usize {
        self.heap.collect()
    }

    pub fn gc_stats(&self) -> GcStats {
        self.heap.stats()
    }

    pub fn set_gc_threshold(&mut self, threshold: usize) {
        self.config.gc_threshold = threshold;
        self.heap.set_gc_threshold(threshold);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Strings and symbols
    // ═══════════════════════════════════════════════════════════════════════

    pub fn intern(&mut self, s: &str) -> JsString {
        self.string_dict.get_or_insert(s)
    }

    /// Interned property key
    pub fn key(&mut self, s: &str) -> PropertyKey {
        self.string_dict.key(s)
    }

    pub fn new_symbol(&mut self, description: Option<&str>) -> JsSymbol {
        let id = self.next_symbol_id;
        self.next_symbol_id += 1;
        JsSymbol::new(id, description.map(JsString::from))
    }

    /// The well-known `Symbol.iterator`
    pub fn symbol_iterator(&self) -> JsSymbol {
        self.symbol_iterator.clone()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Object creation
    // ═══════════════════════════════════════════════════════════════════════

    /// Create an ordinary object inheriting from `Object.prototype`
    pub fn new_object(&mut self, scope: &Scope) -> JsHandle {
        let proto = self.realm.object_prototype;
        self.alloc(scope, JsObject::with_prototype(Some(proto)))
    }

    /// Create an empty array with the given length
    pub fn new_array(&mut self, scope: &Scope, length: u32) -> JsHandle {
        let length_key = self.key("length");
        let mut obj = JsObject::with_prototype(Some(self.realm.array_prototype));
        obj.exotic = ExoticObject::Array;
        obj.insert_property(
            length_key,
            Property::with_attributes(JsValue::Number(length as f64), true, false, false),
        );
        self.alloc(scope, obj)
    }

    /// Create an array holding `values`. The values must be rooted by the caller.
    pub fn create_array_from(
        &mut self,
        scope: &Scope,
        values: &[JsValue],
    ) -> Result<JsHandle, JsError> {
        let length = u32::try_from(values.len())
            .map_err(|_| JsError::range_error("Invalid array length"))?;
        let array = self.new_array(scope, length);
        let obj = self.object_mut(array.get())?;
        for (index, value) in (0u32..).zip(values) {
            obj.elements.insert(index, Property::data(value.clone()));
        }
        Ok(array)
    }

    /// Create a native function object
    pub fn new_native_function(
        &mut self,
        scope: &Scope,
        name: &str,
        func: NativeFn,
        arity: u32,
    ) -> JsHandle {
        let name = self.intern(name);
        let function = JsFunction::Native(NativeFunction {
            name: name.cheap_clone(),
            func,
            arity,
        });
        let obj = self.function_object(function, name, arity);
        self.alloc(scope, obj)
    }

    /// Create a function whose body is supplied by the host interpreter.
    ///
    /// Normal functions get a fresh `prototype` object so they can be used
    /// with `new`.
    pub fn new_compiled_function<F>(
        &mut self,
        scope: &Scope,
        name: Option<&str>,
        unit: UnitId,
        kind: FunctionKind,
        body: F,
    ) -> JsHandle
    where
        F: Fn(&mut Runtime, JsValue, &[JsValue]) -> Result<JsValue, JsError> + 'static,
    {
        let name = name.map(|n| self.intern(n));
        let body: ScriptBody = std::rc::Rc::new(body);
        let function = JsFunction::Compiled(CompiledFunction {
            name: name.as_ref().map(CheapClone::cheap_clone),
            unit,
            kind,
            body,
        });
        let display_name = match name {
            Some(name) => name,
            None => self.intern(""),
        };
        let obj = self.function_object(function, display_name, 0);
        let func = self.alloc(scope, obj);

        if kind == FunctionKind::Normal {
            let proto_key = self.key("prototype");
            let ctor_key = self.key("constructor");
            let proto = self.new_object(scope);
            if let Some(p) = self.heap.get_mut(proto.get()) {
                p.insert_property(
                    ctor_key,
                    Property::with_attributes(func.into(), true, false, true),
                );
            }
            if let Some(f) = self.heap.get_mut(func.get()) {
                f.insert_property(
                    proto_key,
                    Property::with_attributes(proto.into(), true, false, false),
                );
            }
        }
        func
    }

    fn function_object(&mut self, function: JsFunction, name: JsString, arity: u32) -> JsObject {
        let name_key = self.key("name");
        let length_key = self.key("length");
        let mut obj = JsObject::with_prototype(Some(self.realm.function_prototype));
        obj.exotic = ExoticObject::Function(function);
        obj.insert_property(
            name_key,
            Property::with_attributes(JsValue::String(name), false, false, true),
        );
        obj.insert_property(
            length_key,
            Property::with_attributes(JsValue::Number(arity as f64), false, false, true),
        );
        obj
    }

    /// Install a native method on `target` (writable, non-enumerable, configurable)
    pub fn register_method(
        &mut self,
        target: JsObjectRef,
        key: PropertyKey,
        name: &str,
        func: NativeFn,
        arity: u32,
    ) {
        let scope = self.open_scope();
        let method = self.new_native_function(&scope, name, func, arity);
        if let Some(obj) = self.heap.get_mut(target) {
            obj.insert_property(
                key,
                Property::with_attributes(method.into(), true, false, true),
            );
        }
    }

    /// ToObject: wrap primitives, reject null and undefined
    pub fn to_object(&mut self, scope: &Scope, value: &JsValue) -> Result<JsHandle, JsError> {
        let proto = match value {
            JsValue::Object(obj) => return Ok(scope.handle(*obj)),
            JsValue::Undefined | JsValue::Null => {
                return Err(JsError::type_error(format!(
                    "Cannot convert {:?} to object",
                    value
                )));
            }
            JsValue::Boolean(_) => self.realm.boolean_prototype,
            JsValue::Number(_) => self.realm.number_prototype,
            JsValue::String(_) => self.realm.string_prototype,
            JsValue::Symbol(_) => self.realm.symbol_prototype,
        };
        let mut obj = JsObject::with_prototype(Some(proto));
        if let JsValue::String(s) = value {
            let length_key = self.key("length");
            let units = builtins::string::code_units(s);
            obj.insert_property(
                length_key,
                Property::with_attributes(JsValue::Number(units.len() as f64), false, false, false),
            );
            for (index, unit) in (0u32..).zip(&units) {
                obj.elements.insert(
                    index,
                    Property::with_attributes(
                        JsValue::String(builtins::string::from_code_unit(*unit)),
                        false,
                        true,
                        false,
                    ),
                );
            }
        }
        obj.exotic = ExoticObject::Primitive(value.clone());
        Ok(self.alloc(scope, obj))
    }

    /// Short description of a value for error messages
    pub fn describe(&self, value: &JsValue) -> String {
        match value {
            JsValue::Object(obj) => match self.heap.get(*obj) {
                Some(o) => match &o.exotic {
                    ExoticObject::Function(f) => match f.name() {
                        Some(name) if !name.is_empty() => format!("function {}", name),
                        _ => "function".to_string(),
                    },
                    ExoticObject::Array => "[object Array]".to_string(),
                    _ => "[object Object]".to_string(),
                },
                None => "[object Object]".to_string(),
            },
            JsValue::String(s) => format!("\"{}\"", s),
            other => other.to_js_string().to_string(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Calls
    // ═══════════════════════════════════════════════════════════════════════

    pub fn is_callable(&self, value: &JsValue) -> bool {
        value
            .as_object()
            .and_then(|obj| self.heap.get(obj))
            .is_some_and(JsObject::is_callable)
    }

    pub fn is_constructor(&self, value: &JsValue) -> bool {
        value
            .as_object()
            .and_then(|obj| self.heap.get(obj))
            .and_then(JsObject::as_function)
            .is_some_and(JsFunction::is_constructor)
    }

    /// [[Call]]
    pub fn call(
        &mut self,
        func: &JsValue,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let callee = match func {
            JsValue::Object(obj) if self.is_callable(func) => *obj,
            _ => {
                return Err(JsError::type_error(format!(
                    "{} is not a function",
                    self.describe(func)
                )));
            }
        };
        self.invoke(callee, this, args, None, false)
    }

    /// [[Construct]]: returns the function's object result, or the receiver
    pub fn construct(&mut self, func: &JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
        let callee = match func {
            JsValue::Object(obj) if self.is_constructor(func) => *obj,
            _ => {
                return Err(JsError::type_error(format!(
                    "{} is not a constructor",
                    self.describe(func)
                )));
            }
        };
        let scope = self.open_scope();
        scope.handle(callee);
        for arg in args {
            arg.root(&scope);
        }
        let receiver = self.create_this_for_construct(&scope, callee)?;
        let result = self.invoke(callee, receiver.into(), args, None, true)?;
        if result.is_object() {
            Ok(result)
        } else {
            Ok(receiver.into())
        }
    }

    /// Allocate the receiver for `new callee(...)`, inheriting from
    /// `callee.prototype` or `Object.prototype` when that is not an object
    pub fn create_this_for_construct(
        &mut self,
        scope: &Scope,
        callee: JsObjectRef,
    ) -> Result<JsHandle, JsError> {
        let proto_key = self.key("prototype");
        let proto = match self.get(callee, &proto_key)? {
            JsValue::Object(proto) => proto,
            _ => self.realm.object_prototype,
        };
        scope.handle(proto);
        Ok(self.alloc(scope, JsObject::with_prototype(Some(proto))))
    }

    fn invoke(
        &mut self,
        callee: JsObjectRef,
        this: JsValue,
        args: &[JsValue],
        generator: Option<JsObjectRef>,
        construct: bool,
    ) -> Result<JsValue, JsError> {
        let function = self
            .object(callee)?
            .as_function()
            .cloned()
            .ok_or_else(|| JsError::internal_error("callee is not a function"))?;
        if self.stack.depth() >= self.config.max_call_depth {
            return Err(JsError::range_error("Maximum call stack size exceeded"));
        }

        let scope = self.open_scope();
        scope.handle(callee);
        this.root(&scope);
        for arg in args {
            arg.root(&scope);
        }
        if let Some(generator) = generator {
            scope.handle(generator);
        }

        let code_unit = match &function {
            JsFunction::Compiled(f) => Some(f.unit),
            JsFunction::Native(_) => None,
        };
        self.stack.push(Frame {
            callee,
            this: this.clone(),
            args: args.to_vec(),
            code_unit,
            generator,
            construct,
        });
        let result = match &function {
            JsFunction::Native(f) => (f.func)(self, this, args),
            JsFunction::Compiled(f) => (f.body)(self, this, args),
        };
        self.stack.pop();
        result
    }

    /// Frame of the function that called the currently executing one
    pub fn caller_frame(&self) -> Option<FrameView<'_>> {
        self.stack.caller().map(FrameView::new)
    }

    pub fn call_depth(&self) -> usize {
        self.stack.depth()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Builtins
    // ═══════════════════════════════════════════════════════════════════════

    /// The function object installed for `method`
    pub fn builtin(&self, method: BuiltinMethod) -> Option<JsObjectRef> {
        self.builtins.get(method)
    }

    pub fn builtins(&self) -> &BuiltinTable {
        &self.builtins
    }

    /// Invoke a builtin with `this = undefined`
    pub fn call_builtin(
        &mut self,
        method: BuiltinMethod,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let func = self.builtins.get(method).ok_or_else(|| {
            JsError::internal_error(format!("builtin {} is not installed", method.name()))
        })?;
        self.call(&JsValue::Object(func), JsValue::Undefined, args)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Exceptions
    // ═══════════════════════════════════════════════════════════════════════

    /// Record `value` as the pending thrown value and return the marker error
    pub fn throw_value(&mut self, value: JsValue) -> JsError {
        self.clear_thrown_value();
        if let JsValue::Object(obj) = &value {
            self.heap.add_root(*obj);
        }
        self.thrown_value = Some(value);
        JsError::Thrown
    }

    pub fn thrown_value(&self) -> Option<&JsValue> {
        self.thrown_value.as_ref()
    }

    /// Discard the pending thrown value, if any
    pub fn clear_thrown_value(&mut self) {
        if let Some(JsValue::Object(obj)) = self.thrown_value.take() {
            self.heap.remove_root(obj);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Generators
    // ═══════════════════════════════════════════════════════════════════════

    /// Create a suspended generator object for a generator function
    pub fn create_generator(
        &mut self,
        scope: &Scope,
        function: JsObjectRef,
    ) -> Result<JsHandle, JsError> {
        let is_generator = matches!(
            self.object(function)?.as_function(),
            Some(JsFunction::Compiled(f)) if f.kind == FunctionKind::Generator
        );
        if !is_generator {
            return Err(JsError::type_error("not a generator function"));
        }
        scope.handle(function);
        let mut obj = JsObject::with_prototype(Some(self.realm.generator_prototype));
        obj.exotic = ExoticObject::Generator(GeneratorState {
            function,
            status: GeneratorStatus::SuspendedStart,
            delegated: false,
        });
        Ok(self.alloc(scope, obj))
    }

    /// Run the generator's body as a generator activation with `sent` as its
    /// only argument. The activation completes when the body returns.
    pub fn resume_generator(
        &mut self,
        generator: JsObjectRef,
        sent: JsValue,
    ) -> Result<JsValue, JsError> {
        let state = self
            .object(generator)?
            .as_generator()
            .cloned()
            .ok_or_else(|| JsError::type_error("not a generator object"))?;
        match state.status {
            GeneratorStatus::Completed => return Ok(JsValue::Undefined),
            GeneratorStatus::Executing => {
                return Err(JsError::type_error("Generator is already running"));
            }
            GeneratorStatus::SuspendedStart | GeneratorStatus::SuspendedYield => {}
        }
        self.set_generator_status(generator, GeneratorStatus::Executing)?;
        let result = self.invoke(
            state.function,
            JsValue::Undefined,
            &[sent],
            Some(generator),
            false,
        );
        self.set_generator_status(generator, GeneratorStatus::Completed)?;
        result
    }

    pub fn generator_is_delegated(&self, generator: JsObjectRef) -> Result<bool, JsError> {
        self.object(generator)?
            .as_generator()
            .map(|state| state.delegated)
            .ok_or_else(|| JsError::type_error("not a generator object"))
    }

    fn set_generator_status(
        &mut self,
        generator: JsObjectRef,
        status: GeneratorStatus,
    ) -> Result<(), JsError> {
        if let Some(state) = self.object_mut(generator)?.as_generator_mut() {
            state.status = status;
        }
        Ok(())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

fn stale_reference() -> JsError {
    JsError::internal_error("stale object reference")
}
