//! The runtime prelude emitter (§4.2 / §6.2): declares the fixed set of
//! extern WebGL-runtime functions the linker supplies, then emits a
//! `_wrapper` companion for each one that appends a trailing `i8*`
//! environment parameter so every callable in the module shares one
//! calling convention.
//!
//! Grounded on the teacher's `declare_lak_println*` / `generate_println*`
//! declare-then-wrap pattern (`codegen/builtins.rs`), generalized from
//! Lak's single println family to the fixed 10-function table below.

use inkwell::AddressSpace;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::values::BasicMetadataValueEnum;

use super::error::CodegenError;

/// A scalar extern parameter/return kind. The runtime ABI (§6.2) only
/// ever needs `i32`, `void`, and opaque pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ExternKind {
    I32,
    Ptr,
    Void,
}

pub(super) struct ExternSig {
    pub name: &'static str,
    pub params: &'static [ExternKind],
    pub ret: ExternKind,
}

/// The fixed runtime ABI table (§6.2).
pub(super) const RUNTIME_EXTERNS: &[ExternSig] = &[
    ExternSig { name: "mesh_indices", params: &[ExternKind::Ptr], ret: ExternKind::I32 },
    ExternSig { name: "mesh_positions", params: &[ExternKind::Ptr], ret: ExternKind::I32 },
    ExternSig { name: "mesh_normals", params: &[ExternKind::Ptr], ret: ExternKind::I32 },
    ExternSig {
        name: "get_shader",
        params: &[ExternKind::Ptr, ExternKind::Ptr],
        ret: ExternKind::I32,
    },
    ExternSig {
        name: "draw_mesh",
        params: &[ExternKind::I32, ExternKind::I32],
        ret: ExternKind::Void,
    },
    ExternSig { name: "print_mesh", params: &[ExternKind::Ptr], ret: ExternKind::Void },
    ExternSig {
        name: "gl_buffer",
        params: &[ExternKind::I32, ExternKind::Ptr, ExternKind::Ptr],
        ret: ExternKind::I32,
    },
    ExternSig { name: "detect_error", params: &[], ret: ExternKind::Void },
    ExternSig {
        name: "load_obj",
        params: &[ExternKind::Ptr, ExternKind::Ptr],
        ret: ExternKind::Ptr,
    },
    ExternSig { name: "create_window", params: &[], ret: ExternKind::Ptr },
];

fn basic_metadata_type<'ctx>(
    context: &'ctx Context,
    kind: ExternKind,
) -> inkwell::types::BasicMetadataTypeEnum<'ctx> {
    match kind {
        ExternKind::I32 => context.i32_type().into(),
        ExternKind::Ptr => context.ptr_type(AddressSpace::default()).into(),
        ExternKind::Void => unreachable!("void is never a parameter kind"),
    }
}

/// Declares `sig` as a bare extern, then emits `<name>_wrapper` which
/// forwards the real arguments and appends/ignores a trailing `i8*` env.
fn declare_one<'ctx>(context: &'ctx Context, module: &Module<'ctx>, sig: &ExternSig) -> Result<(), CodegenError> {
    let param_types: Vec<_> = sig.params.iter().map(|k| basic_metadata_type(context, *k)).collect();

    let real_fn_type = match sig.ret {
        ExternKind::Void => context.void_type().fn_type(&param_types, false),
        ExternKind::I32 => context.i32_type().fn_type(&param_types, false),
        ExternKind::Ptr => context.ptr_type(AddressSpace::default()).fn_type(&param_types, false),
    };
    let real_fn = module.add_function(sig.name, real_fn_type, Some(Linkage::External));

    let mut wrapper_param_types = param_types.clone();
    wrapper_param_types.push(context.ptr_type(AddressSpace::default()).into());
    let wrapper_fn_type = match sig.ret {
        ExternKind::Void => context.void_type().fn_type(&wrapper_param_types, false),
        ExternKind::I32 => context.i32_type().fn_type(&wrapper_param_types, false),
        ExternKind::Ptr => context.ptr_type(AddressSpace::default()).fn_type(&wrapper_param_types, false),
    };
    let wrapper_name = format!("{}_wrapper", sig.name);
    let wrapper_fn = module.add_function(&wrapper_name, wrapper_fn_type, None);

    let builder = context.create_builder();
    let entry = context.append_basic_block(wrapper_fn, "entry");
    builder.position_at_end(entry);

    let forwarded: Vec<BasicMetadataValueEnum> = (0..sig.params.len())
        .map(|i| {
            let p = wrapper_fn.get_nth_param(i as u32).expect("wrapper param count matches signature");
            p.into()
        })
        .collect();

    let call = builder
        .build_call(real_fn, &forwarded, "")
        .map_err(|e| CodegenError::internal(format!("failed to build extern wrapper call: {e}")))?;

    match sig.ret {
        ExternKind::Void => {
            builder
                .build_return(None)
                .map_err(|e| CodegenError::internal(format!("failed to build wrapper return: {e}")))?;
        }
        _ => {
            let ret_val = call
                .try_as_basic_value()
                .left()
                .ok_or_else(|| CodegenError::internal("extern call unexpectedly yielded no value"))?;
            builder
                .build_return(Some(&ret_val))
                .map_err(|e| CodegenError::internal(format!("failed to build wrapper return: {e}")))?;
        }
    }

    Ok(())
}

/// Emits the full runtime prelude: every extern in [`RUNTIME_EXTERNS`]
/// plus its wrapper. Idempotent only in the sense that the caller is
/// expected to invoke this exactly once per module (§4.4 Root).
pub(super) fn emit<'ctx>(context: &'ctx Context, module: &Module<'ctx>) -> Result<(), CodegenError> {
    for sig in RUNTIME_EXTERNS {
        declare_one(context, module, sig)?;
    }
    Ok(())
}
