//! LLVM code generation backend.
//!
//! This module lowers a [`crate::ir::CompilerIR`] — the typed, lifted
//! intermediate representation handed off by the (external) parser and
//! type checker — to an LLVM [`Module`]. It implements the closure
//! conversion ABI that makes staged quotes (`Prog`), ordinary functions
//! (`Proc`), and extern runtime functions call-compatible, manages
//! builder/variable-scope state across nested scopes, and resolves
//! per-call specializations from an optional [`Variant`](crate::ir::Variant)
//! overlay.
//!
//! # Overview
//!
//! The code generator uses [Inkwell](https://github.com/TheDan64/inkwell),
//! a safe Rust wrapper around the LLVM C API. Given a `CompilerIR`, it:
//!
//! - Emits the runtime prelude (§6.2): declarations for the WebGL
//!   runtime functions plus `_wrapper` companions adapting them to the
//!   uniform calling convention.
//! - Recursively emits every Proc/Prog reachable from `main`, in
//!   child-before-parent order so quote/fun references always resolve.
//! - Lowers expressions with a syntax-directed visitor, building values
//!   through the shared builder and tracking per-scope variable storage.
//!
//! # Module structure
//!
//! - [`error`] - [`CodegenError`] / [`CodegenErrorKind`], the full §7 taxonomy
//! - [`guard`] - the RAII scoped acquisition primitive (§5)
//! - [`types`] - type lowering (§4.1) and the closure/function-type shapes
//! - [`prelude`] - the runtime prelude emitter (§4.2)
//! - [`scope`] - the scope compiler (§4.3)
//! - [`expr`] - the expression compiler (§4.4)
//! - [`closure`] - the closure ABI pack/unpack routines (§4.5)
//! - [`variant`] - the specialization resolver (§4.6)
//! - [`driver`] - target init and top-level compilation entry point (§4.7)
//! - `tests` - unit tests (test-only)
//!
//! # See Also
//!
//! * [`crate::ir`] - the input IR types consumed by this module
//! * [Inkwell documentation](https://thedan64.github.io/inkwell/)
//! * [LLVM Language Reference](https://llvm.org/docs/LangRef.html)

mod closure;
pub mod driver;
mod error;
mod expr;
mod guard;
mod prelude;
mod scope;
mod types;
mod variant;

#[cfg(test)]
mod tests;

pub use driver::{Driver, TargetConfig};
pub use error::{CodegenError, CodegenErrorKind, ErrorSite};

use std::collections::HashMap;

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::BasicTypeEnum;
use inkwell::values::PointerValue;
use tracing::trace;

use crate::ir::{CompilerIR, DefId, Variant};

/// A variable's storage: the alloca holding its current value, and the
/// LLVM type that alloca was allocated with (needed to load it back
/// out, and to know the field type when packing it into an environment
/// struct). Mirrors the teacher's `VarBinding`, generalized from a
/// fixed four-type enum to any lowerable [`crate::ir::Type`].
#[derive(Clone, Copy)]
struct VarSlot<'ctx> {
    ptr: PointerValue<'ctx>,
    ty: BasicTypeEnum<'ctx>,
}

/// The mutable emitter state threaded through every codegen operation
/// (§3 "LLVM Emitter state").
///
/// `'ctx` ties this struct to the LLVM [`Context`] outliving it; `'ir`
/// ties it to the borrowed [`CompilerIR`] it reads from without ever
/// mutating.
pub struct Emitter<'ctx, 'ir> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    /// Definition id to current-scope alloca, restored by
    /// [`guard::ScopeGuard`] on every scope exit.
    named_values: HashMap<DefId, VarSlot<'ctx>>,
    /// The active specialization overlay, if any. At most one at a time.
    variant: Option<&'ir Variant>,
    ir: &'ir CompilerIR,
}

impl<'ctx, 'ir> Emitter<'ctx, 'ir> {
    fn new(context: &'ctx Context, module_name: &str, ir: &'ir CompilerIR, variant: Option<&'ir Variant>) -> Self {
        let module = context.create_module(module_name);
        let builder = context.create_builder();
        Emitter {
            context,
            module,
            builder,
            named_values: HashMap::new(),
            variant,
            ir,
        }
    }

    /// Emits the runtime prelude and the `main` Proc, transitively
    /// emitting every Proc/Prog reachable from it. Consumes the emitter
    /// and returns the finished module.
    fn compile(mut self) -> Result<Module<'ctx>, CodegenError> {
        trace!("emitting runtime prelude");
        prelude::emit(self.context, &self.module)?;
        scope::emit_main(&mut self)?;
        Ok(self.module)
    }
}
