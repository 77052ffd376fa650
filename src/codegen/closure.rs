//! The closure ABI (§4.5): packing a scope's free variables into an
//! environment struct and a `{fn_ptr, env}` closure value, and unpacking
//! a closure value back into a callable pair.
//!
//! The general shape (build the env struct, pull field values from the
//! current scope, assemble the closure struct) follows
//! `ori_llvm/src/functions/lambdas.rs`'s lambda-compilation code; this
//! backend does **not** adopt that file's heap-boxed/refcounted closure
//! representation — this backend's closures are stack-allocated per
//! scope instantiation with no garbage collection (§1 Non-goals, §3
//! invariants), so packing always allocas the environment on the
//! caller's stack rather than boxing it.

use inkwell::values::{PointerValue, StructValue};
use inkwell::AddressSpace;

use crate::ir::{DefId, NodeId};

use super::error::CodegenError;
use super::types::closure_struct_type;
use super::Emitter;

/// Packs a closure value `{fn_ptr, env}` over `fn_ptr`, capturing
/// `free_ids` (in order) into a freshly allocated, packed environment
/// struct on the caller's stack.
///
/// `free_ids` must already be resolvable in `emitter.named_values` —
/// the caller (the expression compiler, emitting a Quote or Fun node in
/// the *enclosing* scope) is responsible for passing the right list:
/// `scope.free` for a Proc, `owned_persist ++ scope.free` for a Prog.
pub(super) fn pack<'ctx, 'ir>(
    emitter: &mut Emitter<'ctx, 'ir>,
    fn_ptr: PointerValue<'ctx>,
    free_ids: &[DefId],
    node: NodeId,
) -> Result<StructValue<'ctx>, CodegenError> {
    let mut field_types = Vec::with_capacity(free_ids.len());
    let mut field_values = Vec::with_capacity(free_ids.len());
    for &id in free_ids {
        let slot = emitter
            .named_values
            .get(&id)
            .ok_or_else(|| CodegenError::unknown_variable(id, node))?;
        let loaded = emitter
            .builder
            .build_load(slot.ty, slot.ptr, "capture")
            .map_err(|e| CodegenError::internal(format!("failed to load captured variable: {e}")))?;
        field_types.push(slot.ty);
        field_values.push(loaded);
    }

    let env_struct_ty = emitter.context.struct_type(&field_types, true);
    let mut env_value = env_struct_ty.get_undef();
    for (i, value) in field_values.into_iter().enumerate() {
        env_value = emitter
            .builder
            .build_insert_value(env_value, value, i as u32, "env_field")
            .map_err(|e| CodegenError::internal(format!("failed to build environment struct: {e}")))?
            .into_struct_value();
    }

    let env_alloca = emitter
        .builder
        .build_alloca(env_struct_ty, "env")
        .map_err(|e| CodegenError::internal(format!("failed to alloca environment: {e}")))?;
    emitter
        .builder
        .build_store(env_alloca, env_value)
        .map_err(|e| CodegenError::internal(format!("failed to store environment: {e}")))?;

    let closure_ty = closure_struct_type(emitter.context);
    let mut closure_value = closure_ty.get_undef();
    closure_value = emitter
        .builder
        .build_insert_value(closure_value, fn_ptr, 0, "closure_fn")
        .map_err(|e| CodegenError::internal(format!("failed to build closure struct: {e}")))?
        .into_struct_value();
    closure_value = emitter
        .builder
        .build_insert_value(closure_value, env_alloca, 1, "closure_env")
        .map_err(|e| CodegenError::internal(format!("failed to build closure struct: {e}")))?
        .into_struct_value();

    Ok(closure_value)
}

/// Unpacks a closure value into `(fn_ptr, env_ptr)` by storing it to a
/// fresh stack slot and loading each field back out, matching §4.5's
/// documented rationale: a GEP on a stored copy keeps the aggregate
/// addressable across basic blocks at `-O0`, and `mem2reg` folds the
/// round trip away in later passes.
pub(super) fn unpack<'ctx, 'ir>(
    emitter: &mut Emitter<'ctx, 'ir>,
    closure_value: StructValue<'ctx>,
) -> Result<(PointerValue<'ctx>, PointerValue<'ctx>), CodegenError> {
    let closure_ty = closure_struct_type(emitter.context);
    let slot = emitter
        .builder
        .build_alloca(closure_ty, "closure")
        .map_err(|e| CodegenError::internal(format!("failed to alloca closure slot: {e}")))?;
    emitter
        .builder
        .build_store(slot, closure_value)
        .map_err(|e| CodegenError::internal(format!("failed to store closure value: {e}")))?;

    let ptr_ty = emitter.context.ptr_type(AddressSpace::default());
    let fn_field = emitter
        .builder
        .build_struct_gep(closure_ty, slot, 0, "fn_field")
        .map_err(|e| CodegenError::internal(format!("failed to gep closure fn field: {e}")))?;
    let fn_ptr = emitter
        .builder
        .build_load(ptr_ty, fn_field, "fn_ptr")
        .map_err(|e| CodegenError::internal(format!("failed to load closure fn field: {e}")))?
        .into_pointer_value();

    let env_field = emitter
        .builder
        .build_struct_gep(closure_ty, slot, 1, "env_field")
        .map_err(|e| CodegenError::internal(format!("failed to gep closure env field: {e}")))?;
    let env_ptr = emitter
        .builder
        .build_load(ptr_ty, env_field, "env_ptr")
        .map_err(|e| CodegenError::internal(format!("failed to load closure env field: {e}")))?
        .into_pointer_value();

    Ok((fn_ptr, env_ptr))
}
