//! Builtins invoked directly from compiled code
//!
//! Each [`BuiltinMethod`] occupies a fixed slot of the [`BuiltinTable`]. The
//! table is filled once when the runtime is created and never changes; the
//! interpreter invokes a slot like any other callable.

pub mod apply;
pub mod arguments;
pub mod array;
pub mod guards;
pub mod math;
pub mod module;
pub mod properties;
pub mod string;
pub mod template;

pub use apply::*;
pub use arguments::*;
pub use guards::*;
pub use math::*;
pub use module::*;
pub use properties::*;
pub use template::*;

use crate::value::{JsObjectRef, JsValue, NativeFn};

use crate::interpreter::Runtime;

/// Number of builtin slots
pub const BUILTIN_COUNT: usize = 12;

/// Slot of a builtin in the table
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinMethod {
    SilentSetPrototypeOf = 0,
    GetTemplateObject = 1,
    EnsureObject = 2,
    ThrowTypeError = 3,
    GeneratorSetDelegated = 4,
    CopyDataProperties = 5,
    CopyRestArgs = 6,
    ArraySpread = 7,
    Apply = 8,
    ExportAll = 9,
    ExponentiationOperator = 10,
    RequireFast = 11,
}

impl BuiltinMethod {
    /// Every builtin, in slot order
    pub const ALL: [BuiltinMethod; BUILTIN_COUNT] = [
        BuiltinMethod::SilentSetPrototypeOf,
        BuiltinMethod::GetTemplateObject,
        BuiltinMethod::EnsureObject,
        BuiltinMethod::ThrowTypeError,
        BuiltinMethod::GeneratorSetDelegated,
        BuiltinMethod::CopyDataProperties,
        BuiltinMethod::CopyRestArgs,
        BuiltinMethod::ArraySpread,
        BuiltinMethod::Apply,
        BuiltinMethod::ExportAll,
        BuiltinMethod::ExponentiationOperator,
        BuiltinMethod::RequireFast,
    ];

    pub fn slot(self) -> usize {
        self as u8 as usize
    }

    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::ALL.get(slot).copied()
    }

    /// Name the compiler uses to reference the builtin
    pub fn name(self) -> &'static str {
        match self {
            BuiltinMethod::SilentSetPrototypeOf => "silentSetPrototypeOf",
            BuiltinMethod::GetTemplateObject => "getTemplateObject",
            BuiltinMethod::EnsureObject => "ensureObject",
            BuiltinMethod::ThrowTypeError => "throwTypeError",
            BuiltinMethod::GeneratorSetDelegated => "generatorSetDelegated",
            BuiltinMethod::CopyDataProperties => "copyDataProperties",
            BuiltinMethod::CopyRestArgs => "copyRestArgs",
            BuiltinMethod::ArraySpread => "arraySpread",
            BuiltinMethod::Apply => "apply",
            BuiltinMethod::ExportAll => "exportAll",
            BuiltinMethod::ExponentiationOperator => "exponentiationOperator",
            BuiltinMethod::RequireFast => "requireFast",
        }
    }

    /// Arity hint, exposed as the function's `length`
    pub fn arity(self) -> u32 {
        match self {
            BuiltinMethod::SilentSetPrototypeOf => 2,
            BuiltinMethod::GetTemplateObject => 0,
            BuiltinMethod::EnsureObject => 2,
            BuiltinMethod::ThrowTypeError => 1,
            BuiltinMethod::GeneratorSetDelegated => 1,
            BuiltinMethod::CopyDataProperties => 3,
            BuiltinMethod::CopyRestArgs => 1,
            BuiltinMethod::ArraySpread => 2,
            BuiltinMethod::Apply => 2,
            BuiltinMethod::ExportAll => 0,
            BuiltinMethod::ExponentiationOperator => 2,
            BuiltinMethod::RequireFast => 1,
        }
    }

    fn native(self) -> NativeFn {
        match self {
            BuiltinMethod::SilentSetPrototypeOf => silent_set_prototype_of,
            BuiltinMethod::GetTemplateObject => get_template_object,
            BuiltinMethod::EnsureObject => ensure_object,
            BuiltinMethod::ThrowTypeError => throw_type_error,
            BuiltinMethod::GeneratorSetDelegated => generator_set_delegated,
            BuiltinMethod::CopyDataProperties => copy_data_properties,
            BuiltinMethod::CopyRestArgs => copy_rest_args,
            BuiltinMethod::ArraySpread => array_spread,
            BuiltinMethod::Apply => apply,
            BuiltinMethod::ExportAll => export_all,
            BuiltinMethod::ExponentiationOperator => exponentiation_operator,
            BuiltinMethod::RequireFast => require_fast,
        }
    }
}

/// The builtin function objects, indexed by slot. Every entry is a
/// persistent root.
#[derive(Debug, Default)]
pub struct BuiltinTable {
    functions: Vec<JsObjectRef>,
}

impl BuiltinTable {
    /// Allocate one function object per builtin slot
    pub fn create(rt: &mut Runtime) -> Self {
        let scope = rt.open_scope();
        let mut functions = Vec::with_capacity(BUILTIN_COUNT);
        for method in BuiltinMethod::ALL {
            let func = rt.new_native_function(&scope, method.name(), method.native(), method.arity());
            rt.add_root(func.get());
            functions.push(func.get());
        }
        tracing::debug!(count = functions.len(), "builtin table created");
        Self { functions }
    }

    pub fn get(&self, method: BuiltinMethod) -> Option<JsObjectRef> {
        self.functions.get(method.slot()).copied()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// `(method, function)` pairs in slot order
    pub fn iter(&self) -> impl Iterator<Item = (BuiltinMethod, JsObjectRef)> + '_ {
        BuiltinMethod::ALL.into_iter().zip(self.functions.iter().copied())
    }
}

/// Argument `index`, or `undefined` when out of range
#[inline]
pub(crate) fn arg(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or_default()
}
