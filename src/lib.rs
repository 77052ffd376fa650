//! A closure-converting LLVM code generation backend.
//!
//! This crate lowers an already-parsed, already-type-checked
//! intermediate representation ([`ir::CompilerIR`]) to LLVM IR via
//! [Inkwell](https://github.com/TheDan64/inkwell). It does not parse,
//! type-check, link, or write object files — those stages live in an
//! external driver/CLI that hands this crate a `CompilerIR` and reads
//! an [`inkwell::module::Module`] back.
//!
//! # Modules
//!
//! - [`ir`] - the input IR types: [`ir::CompilerIR`], [`ir::Expr`],
//!   [`ir::Proc`], [`ir::Prog`], [`ir::Type`]
//! - [`codegen`] - the LLVM code generation backend: [`codegen::Driver`]
//!   is the top-level entry point
//!
//! # Example
//!
//! ```no_run
//! use braid_codegen::codegen::{Driver, TargetConfig};
//! use braid_codegen::ir::CompilerIR;
//! use inkwell::context::Context;
//!
//! fn compile(ir: &CompilerIR) -> Result<(), Box<dyn std::error::Error>> {
//!     let context = Context::create();
//!     let driver = Driver::new(&context, "braidprogram");
//!     let target = TargetConfig::host()?;
//!     let _module = driver.compile(ir, None, &target)?;
//!     Ok(())
//! }
//! ```

pub mod codegen;
pub mod ir;
