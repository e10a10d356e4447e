//! Call stack
//!
//! One [`Frame`] per active call. The references a frame holds are rooted by
//! the handle scope of the call that pushed it, so frames themselves are not
//! traced.

use crate::value::{JsObjectRef, JsValue};

use super::UnitId;

/// An active call
#[derive(Debug, Clone)]
pub struct Frame {
    /// The function being executed
    pub callee: JsObjectRef,
    pub this: JsValue,
    /// Argument slots as passed by the caller
    pub args: Vec<JsValue>,
    /// Compilation unit of the executing code; `None` for native functions
    pub code_unit: Option<UnitId>,
    /// Generator object, when this frame is a generator activation
    pub generator: Option<JsObjectRef>,
    /// Whether the frame was entered through [[Construct]]
    pub construct: bool,
}

/// Stack of active frames, innermost last
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The innermost frame
    pub fn current(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// The frame that called the innermost one
    pub fn caller(&self) -> Option<&Frame> {
        let depth = self.frames.len();
        depth.checked_sub(2).and_then(|i| self.frames.get(i))
    }
}

/// Read-only view of a caller's frame.
///
/// Borrowed from the runtime, so it cannot outlive the next mutation.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    frame: &'a Frame,
}

impl<'a> FrameView<'a> {
    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }

    pub fn arg_count(&self) -> usize {
        self.frame.args.len()
    }

    /// Argument `index`, or `undefined` when out of range
    pub fn arg(&self, index: usize) -> JsValue {
        self.frame.args.get(index).cloned().unwrap_or_default()
    }

    pub fn args(&self) -> &'a [JsValue] {
        &self.frame.args
    }

    pub fn this(&self) -> &'a JsValue {
        &self.frame.this
    }

    pub fn callee(&self) -> JsObjectRef {
        self.frame.callee
    }

    /// Compilation unit of the frame's code, if it is compiled code
    pub fn code_unit(&self) -> Option<UnitId> {
        self.frame.code_unit
    }

    /// The generator object, if the frame is a generator activation
    pub fn generator(&self) -> Option<JsObjectRef> {
        self.frame.generator
    }

    pub fn is_construct(&self) -> bool {
        self.frame.construct
    }
}
