//! Type lowering: source [`Type`](crate::ir::Type) to LLVM types, and the
//! shared closure-struct/function-type shapes the rest of codegen builds
//! on.
//!
//! Grounded on `Codegen::get_llvm_type` (teacher's `codegen/mod.rs`),
//! generalized from Lak's four scalar source types to this backend's
//! `{Int, Float, Fun, Code}` lowering, where `Fun` and `Code` both lower
//! to the same packed closure struct (§4.1).

use inkwell::AddressSpace;
use inkwell::context::Context;
use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType, StructType};

use crate::ir::{NodeId, Type};

use super::error::CodegenError;

/// Lowers a source type to its LLVM representation.
///
/// Fails with `UnsupportedType` for anything outside `{Int, Float, Fun,
/// Code}` — `Any`, `Void`, `Parameterized`, and `Instance` are not
/// lowerable by this backend.
pub(super) fn lower<'ctx>(
    context: &'ctx Context,
    ty: &Type,
    node: NodeId,
) -> Result<BasicTypeEnum<'ctx>, CodegenError> {
    match ty {
        Type::Int => Ok(context.i32_type().into()),
        Type::Float => Ok(context.f64_type().into()),
        Type::Fun { .. } | Type::Code { .. } => Ok(closure_struct_type(context).into()),
        other => Err(CodegenError::unsupported_type(
            format!("type '{other}' has no LLVM lowering"),
            node,
        )),
    }
}

/// The packed two-field closure representation shared by `Fun` and
/// `Code` values: `{ fn_ptr, i8* env }`. Identical for both since LLVM's
/// opaque pointers carry no pointee-type information at the type level;
/// the distinction between a Proc closure and a Prog closure only shows
/// up in the `FunctionType` used to perform the indirect call (see
/// [`fn_type_for`]).
pub(super) fn closure_struct_type<'ctx>(context: &'ctx Context) -> StructType<'ctx> {
    let ptr = context.ptr_type(AddressSpace::default());
    context.struct_type(&[ptr.into(), ptr.into()], true)
}

/// Builds the LLVM function type `(lower(params)…, i8*) -> lower(ret)`
/// used both to declare a Proc/Prog's own LLVM function (§4.3) and to
/// perform an indirect call through an unpacked closure (§4.5).
pub(super) fn fn_type_for<'ctx>(
    context: &'ctx Context,
    params: &[Type],
    ret: &Type,
    node: NodeId,
) -> Result<FunctionType<'ctx>, CodegenError> {
    let mut llvm_params: Vec<BasicMetadataTypeEnum<'ctx>> = Vec::with_capacity(params.len() + 1);
    for p in params {
        llvm_params.push(lower(context, p, node)?.into());
    }
    llvm_params.push(context.ptr_type(AddressSpace::default()).into());

    let fn_type = match ret {
        Type::Void => context.void_type().fn_type(&llvm_params, false),
        other => lower(context, other, node)?.fn_type(&llvm_params, false),
    };
    Ok(fn_type)
}
