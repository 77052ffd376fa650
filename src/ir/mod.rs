//! The typed, lifted intermediate representation consumed by [`crate::codegen`].
//!
//! This is the boundary between the (external) parser/type-checker and this
//! backend: a [`CompilerIR`] value is assumed well-typed and fully resolved
//! (every use site already knows which definition it refers to via
//! [`CompilerIR::defuse`]). The backend never re-derives types or bindings;
//! it only lowers what is already here.
//!
//! # Module structure
//!
//! - [`ids`] - the [`NodeId`], [`ScopeId`], and [`DefId`] newtypes
//! - [`types`] - the source [`Type`] lattice this backend understands
//! - [`expr`] - expression nodes ([`Expr`] / [`ExprKind`])
//! - [`scope`] - [`Proc`], [`Prog`], and the specialization [`Variant`]
//! - [`program`] - [`CompilerIR`], the root input value

mod expr;
mod ids;
mod program;
mod scope;
mod types;

#[cfg(test)]
mod tests;

pub use expr::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use ids::{DefId, NodeId, ScopeId};
pub use program::CompilerIR;
pub use scope::{Proc, Prog, Scope, Variant};
pub use types::Type;
