//! Native builtin support layer for a bytecode JavaScript engine
//!
//! Compiled code calls these builtins for the parts of the language that are
//! awkward to express in script: tagged template objects, rest/spread
//! marshaling, object spread and `export *`, `apply`, and a few guard hooks.
//! They run on a precise, scope-rooted heap that may collect at any
//! allocation.
//!
//! # Example
//!
//! ```
//! use tsrun_builtins::{BuiltinMethod, JsValue, Runtime};
//!
//! let mut rt = Runtime::new();
//! let result = rt
//!     .call_builtin(
//!         BuiltinMethod::ExponentiationOperator,
//!         &[JsValue::Number(2.0), JsValue::Number(10.0)],
//!     )
//!     .unwrap();
//! assert_eq!(result, JsValue::Number(1024.0));
//! ```

pub mod config;
pub mod error;
pub mod gc;
pub mod interpreter;
pub mod string_dict;
pub mod value;

pub use config::RuntimeConfig;
pub use error::JsError;
pub use gc::{Gc, GcStats, Handle, HandleScope, Marker};
pub use interpreter::{
    BuiltinMethod, BuiltinTable, FrameView, IteratorRecord, Realm, Runtime, UnitId,
};
pub use value::{
    CheapClone, FunctionKind, JsHandle, JsObject, JsObjectRef, JsString, JsSymbol, JsValue,
    Property, PropertyDescriptor, PropertyFlags, PropertyKey, Scope,
};
