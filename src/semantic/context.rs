//! Validation context
//!
//! Tracks which function body (if any) and how many loops enclose the node
//! being validated. The validator changes it only through scoped helpers that
//! restore the previous state on every exit path, errors included.

use crate::semantic::symbols::FunctionSig;

#[derive(Debug, Clone, Default)]
pub struct Context {
    function: Option<FunctionSig>,
    loop_depth: usize,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signature of the enclosing function
    pub fn function(&self) -> Option<&FunctionSig> {
        self.function.as_ref()
    }

    pub fn loop_depth(&self) -> usize {
        self.loop_depth
    }

    pub fn in_loop(&self) -> bool {
        self.loop_depth > 0
    }

    /// Enter a function body; returns the context to restore afterwards.
    pub(crate) fn enter_function(&mut self, sig: FunctionSig) -> Option<FunctionSig> {
        self.function.replace(sig)
    }

    pub(crate) fn leave_function(&mut self, previous: Option<FunctionSig>) {
        self.function = previous;
    }

    pub(crate) fn enter_loop(&mut self) {
        self.loop_depth += 1;
    }

    pub(crate) fn leave_loop(&mut self) {
        self.loop_depth = self.loop_depth.saturating_sub(1);
    }
}
