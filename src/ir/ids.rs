//! Stable integer identifiers used throughout the IR.
//!
//! These replace source spans entirely: the backend never reports
//! source-level diagnostics, so every node, scope, and definition is
//! addressed only by a plain non-negative integer.

/// Identifies an AST node. Keys [`crate::ir::CompilerIR::type_table`] and
/// the use-site side of [`crate::ir::CompilerIR::defuse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Identifies a [`crate::ir::Proc`] or [`crate::ir::Prog`].
///
/// `main`'s scope id is represented out-of-band (it is always named
/// `main`, never `proc<id>`); ordinary Procs and Progs use this id to
/// derive their emitted symbol name (`proc<id>` / `prog<id>`, see
/// `crate::codegen` §6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

/// Identifies a definition site (a function parameter, a `let`-bound
/// name, or an extern). The definition side of
/// [`crate::ir::CompilerIR::defuse`] and the key type of
/// `named_values` in the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

impl std::fmt::Display for DefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "def#{}", self.0)
    }
}
