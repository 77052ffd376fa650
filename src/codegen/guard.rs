//! The scoped acquisition primitive mandated for entering a new scope.
//!
//! Entering a Proc or Prog body swaps out two pieces of emitter state at
//! once: the active LLVM `Builder` and the `named_values` map. Both must
//! be restored together on every exit path, including early returns from
//! a failed `?`. A guard tied to `Drop` is the only way to get that for
//! free on the error path as well as the success path — see
//! `ori_llvm`'s `BuilderPositionGuard` for the single-field version of
//! the same idea.
use std::collections::HashMap;

use inkwell::builder::Builder;

use crate::ir::DefId;

use super::{Emitter, VarSlot};

/// Restores the emitter's previous `builder` and `named_values` when
/// dropped, regardless of how the enclosing scope's emission exits.
pub(super) struct ScopeGuard<'a, 'ctx, 'ir> {
    emitter: &'a mut Emitter<'ctx, 'ir>,
    saved_builder: Option<Builder<'ctx>>,
    saved_named_values: Option<HashMap<DefId, VarSlot<'ctx>>>,
}

impl<'a, 'ctx, 'ir> ScopeGuard<'a, 'ctx, 'ir> {
    /// Swaps in a fresh builder (positioned by the caller after this
    /// call returns) and an empty `named_values` map, stashing the
    /// previous ones to be restored on drop.
    pub(super) fn enter(emitter: &'a mut Emitter<'ctx, 'ir>, fresh_builder: Builder<'ctx>) -> Self {
        let saved_builder = Some(std::mem::replace(&mut emitter.builder, fresh_builder));
        let saved_named_values = Some(std::mem::take(&mut emitter.named_values));
        ScopeGuard {
            emitter,
            saved_builder,
            saved_named_values,
        }
    }

    pub(super) fn emitter_mut(&mut self) -> &mut Emitter<'ctx, 'ir> {
        self.emitter
    }
}

impl Drop for ScopeGuard<'_, '_, '_> {
    fn drop(&mut self) {
        if let Some(builder) = self.saved_builder.take() {
            self.emitter.builder = builder;
        }
        if let Some(named_values) = self.saved_named_values.take() {
            self.emitter.named_values = named_values;
        }
    }
}
