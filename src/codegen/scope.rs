//! The scope compiler (§4.3): emits one LLVM function per reachable
//! Proc/Prog, following the eleven-step algorithm the distilled spec
//! lays out for `emit_scope`.
//!
//! Grounded on the teacher's two-pass `compile()` /
//! `generate_function_body()` / `generate_main()` structure
//! (`codegen/mod.rs`), generalized from Lak's flat function list to
//! this backend's recursive, closure-converted scope tree: children are
//! emitted before their parent's body (so quote/fun references always
//! resolve), and every function gains a trailing `i8*` environment
//! parameter whether or not it captures anything.

use inkwell::values::FunctionValue;
use tracing::{instrument, trace};

use crate::ir::{DefId, Proc, Prog, ScopeId, Type};

use super::error::CodegenError;
use super::guard::ScopeGuard;
use super::types;
use super::variant::{self, Resolved};
use super::{expr, Emitter, VarSlot};

fn type_of_def<'ir>(ir: &'ir crate::ir::CompilerIR, def: DefId) -> Result<&'ir Type, CodegenError> {
    ir.type_of_def(def)
        .ok_or_else(|| CodegenError::internal(format!("{def} has no recorded type")))
}

/// Emits `main`, transitively emitting everything reachable from it.
#[instrument(skip_all)]
pub(super) fn emit_main<'ctx, 'ir>(emitter: &mut Emitter<'ctx, 'ir>) -> Result<(), CodegenError> {
    let main = emitter.ir.main.clone();
    emit_function(emitter, "main".to_string(), &main.params, &main.scope, &[])?;
    Ok(())
}

/// Returns the LLVM function for Proc `id`, emitting it (and its
/// children) on first use. Memoized via `Module::get_function` so a
/// Proc referenced from multiple call sites is only ever defined once.
pub(super) fn ensure_proc_emitted<'ctx, 'ir>(
    emitter: &mut Emitter<'ctx, 'ir>,
    id: ScopeId,
) -> Result<FunctionValue<'ctx>, CodegenError> {
    let name = format!("proc{}", id.0);
    if let Some(f) = emitter.module.get_function(&name) {
        return Ok(f);
    }
    let proc = resolve_proc(emitter, id)?;
    emit_function(emitter, name, &proc.params, &proc.scope, &[])
}

/// Returns the LLVM function for Prog `id`, emitting it (and its
/// children) on first use. A Prog takes no value parameters; its
/// environment carries `owned_persist ++ scope.free`.
pub(super) fn ensure_prog_emitted<'ctx, 'ir>(
    emitter: &mut Emitter<'ctx, 'ir>,
    id: ScopeId,
) -> Result<FunctionValue<'ctx>, CodegenError> {
    let name = format!("prog{}", id.0);
    if let Some(f) = emitter.module.get_function(&name) {
        return Ok(f);
    }
    let prog = resolve_prog(emitter, id)?;
    emit_function(emitter, name, &[], &prog.scope, &prog.owned_persist)
}

fn resolve_proc<'ir>(emitter: &Emitter<'_, 'ir>, id: ScopeId) -> Result<Proc, CodegenError> {
    match variant::resolve(emitter.ir, emitter.variant, id) {
        Resolved::Proc(p) => Ok(p.clone()),
        Resolved::Prog(_) => Err(CodegenError::internal(format!("{id} names a Prog, not a Proc"))),
        Resolved::None => Err(CodegenError::unknown_scope(id)),
    }
}

fn resolve_prog<'ir>(emitter: &Emitter<'_, 'ir>, id: ScopeId) -> Result<Prog, CodegenError> {
    match variant::resolve(emitter.ir, emitter.variant, id) {
        Resolved::Prog(p) => Ok(p.clone()),
        Resolved::Proc(_) => Err(CodegenError::internal(format!("{id} names a Proc, not a Prog"))),
        Resolved::None => Err(CodegenError::unknown_scope(id)),
    }
}

/// Emits whichever of Proc/Prog `id` resolves to, used when pre-emitting
/// a scope's children (step 4: children must exist before the parent's
/// body references them via `Quote`/`Fun`).
fn ensure_child_emitted<'ctx, 'ir>(emitter: &mut Emitter<'ctx, 'ir>, id: ScopeId) -> Result<(), CodegenError> {
    match variant::resolve(emitter.ir, emitter.variant, id) {
        Resolved::Proc(_) => {
            ensure_proc_emitted(emitter, id)?;
        }
        Resolved::Prog(_) => {
            ensure_prog_emitted(emitter, id)?;
        }
        Resolved::None => return Err(CodegenError::unknown_scope(id)),
    }
    Ok(())
}

/// The shared body of `emit_scope`: builds the function signature,
/// pushes a fresh builder/`named_values` via the scoped acquisition
/// guard, materializes parameter and free-variable storage, allocates
/// (uninitialized) storage for every `bound` id, emits the body, and
/// returns.
#[instrument(skip_all, fields(name = %name))]
fn emit_function<'ctx, 'ir>(
    emitter: &mut Emitter<'ctx, 'ir>,
    name: String,
    params: &[DefId],
    scope: &crate::ir::Scope,
    owned_persist: &[DefId],
) -> Result<FunctionValue<'ctx>, CodegenError> {
    if !scope.persist.is_empty() {
        return Err(CodegenError::not_implemented("persist", scope.body.node));
    }

    // Step 4: emit every child scope before this one's body, so a
    // Quote/Fun node inside `scope.body` can always find its function.
    for &child in &scope.children {
        ensure_child_emitted(emitter, child)?;
    }

    let mut free_ids = owned_persist.to_vec();
    free_ids.extend(scope.free.iter().copied());

    // Step 5: the function type is (lower(params)…, i8*) -> lower(body).
    let mut param_types = Vec::with_capacity(params.len());
    for &p in params {
        param_types.push(type_of_def(emitter.ir, p)?.clone());
    }
    let ret_type = emitter
        .ir
        .type_of(scope.body.node)
        .cloned()
        .ok_or_else(|| CodegenError::internal(format!("{} has no recorded type", scope.body.node)))?;
    let fn_type = types::fn_type_for(emitter.context, &param_types, &ret_type, scope.body.node)?;
    let function = emitter.module.add_function(&name, fn_type, None);

    // Step 6: fresh entry block, fresh builder, fresh named_values — the
    // scoped acquisition primitive restores the caller's on drop no
    // matter how this function's body exits.
    trace!(params = params.len(), free = free_ids.len(), "emitting scope");
    let entry = emitter.context.append_basic_block(function, "entry");
    let fresh_builder = emitter.context.create_builder();
    fresh_builder.position_at_end(entry);
    let mut guard = ScopeGuard::enter(emitter, fresh_builder);
    let result = emit_function_body(guard.emitter_mut(), function, params, &param_types, &free_ids, &ret_type, scope);
    drop(guard);
    result?;

    Ok(function)
}

fn emit_function_body<'ctx, 'ir>(
    emitter: &mut Emitter<'ctx, 'ir>,
    function: FunctionValue<'ctx>,
    params: &[DefId],
    param_types: &[Type],
    free_ids: &[DefId],
    ret_type: &Type,
    scope: &crate::ir::Scope,
) -> Result<(), CodegenError> {
    // Step 7: materialize each value parameter into its own alloca.
    for (i, (&def, ty)) in params.iter().zip(param_types).enumerate() {
        let llvm_ty = types::lower(emitter.context, ty, scope.body.node)?;
        let alloca = emitter
            .builder
            .build_alloca(llvm_ty, &format!("arg{}", def.0))
            .map_err(|e| CodegenError::internal(format!("failed to alloca parameter: {e}")))?;
        let incoming = function
            .get_nth_param(i as u32)
            .ok_or_else(|| CodegenError::internal("parameter count mismatch building function body"))?;
        emitter
            .builder
            .build_store(alloca, incoming)
            .map_err(|e| CodegenError::internal(format!("failed to store parameter: {e}")))?;
        emitter.named_values.insert(def, VarSlot { ptr: alloca, ty: llvm_ty });
    }

    // Step 8: the trailing parameter is always the i8* environment. In
    // this backend's opaque-pointer lowering there is no bitcast to
    // perform — every pointer type is already `ptr`.
    let env_param = function
        .get_nth_param(params.len() as u32)
        .ok_or_else(|| CodegenError::internal("missing trailing environment parameter"))?
        .into_pointer_value();

    if !free_ids.is_empty() {
        let mut field_types = Vec::with_capacity(free_ids.len());
        for &f in free_ids {
            let ty = type_of_def(emitter.ir, f)?.clone();
            field_types.push(types::lower(emitter.context, &ty, scope.body.node)?);
        }
        let env_struct_ty = emitter.context.struct_type(&field_types, true);
        for (i, (&f, field_ty)) in free_ids.iter().zip(&field_types).enumerate() {
            let field_ptr = emitter
                .builder
                .build_struct_gep(env_struct_ty, env_param, i as u32, "env_field")
                .map_err(|e| CodegenError::internal(format!("failed to gep environment field: {e}")))?;
            let loaded = emitter
                .builder
                .build_load(*field_ty, field_ptr, "env_load")
                .map_err(|e| CodegenError::internal(format!("failed to load environment field: {e}")))?;
            let alloca = emitter
                .builder
                .build_alloca(*field_ty, &format!("free{}", f.0))
                .map_err(|e| CodegenError::internal(format!("failed to alloca free variable: {e}")))?;
            emitter
                .builder
                .build_store(alloca, loaded)
                .map_err(|e| CodegenError::internal(format!("failed to store free variable: {e}")))?;
            emitter.named_values.insert(f, VarSlot { ptr: alloca, ty: *field_ty });
        }
    }

    // Step 9: every locally bound id gets an alloca with no initial
    // store (its first write is the `Let` that introduces it).
    for &b in &scope.bound {
        if emitter.named_values.contains_key(&b) {
            continue;
        }
        let ty = type_of_def(emitter.ir, b)?.clone();
        let llvm_ty = types::lower(emitter.context, &ty, scope.body.node)?;
        let alloca = emitter
            .builder
            .build_alloca(llvm_ty, &format!("local{}", b.0))
            .map_err(|e| CodegenError::internal(format!("failed to alloca local: {e}")))?;
        emitter.named_values.insert(b, VarSlot { ptr: alloca, ty: llvm_ty });
    }

    // Step 10/11: emit the body and return it. A `Void`-typed body has
    // nothing to hand back to LLVM — the function's own return type was
    // built as `void` in step 5, so returning the placeholder value
    // `expr::emit` produces for it would be invalid IR.
    let body_value = expr::emit(emitter, &scope.body)?;
    if matches!(ret_type, Type::Void) {
        emitter
            .builder
            .build_return(None)
            .map_err(|e| CodegenError::internal(format!("failed to build void return: {e}")))?;
    } else {
        emitter
            .builder
            .build_return(Some(&body_value))
            .map_err(|e| CodegenError::internal(format!("failed to build return: {e}")))?;
    }

    Ok(())
}
