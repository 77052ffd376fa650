//! `Proc`, `Prog`, and the specialization overlay `Variant`.
use std::collections::BTreeSet;

use super::expr::Expr;
use super::ids::{DefId, ScopeId};

/// Fields shared by a `Proc` and a `Prog`.
///
/// Kept as a separate struct (rather than duplicated fields on `Proc`
/// and `Prog`) since the scope compiler's recursive child-emission and
/// free-variable handling treats both uniformly; only the leading
/// parameter list and persist ownership differ between the two.
#[derive(Debug, Clone)]
pub struct Scope {
    /// `None` for the module entry Proc (`main`).
    pub id: Option<ScopeId>,
    pub body: Expr,
    /// Ids captured from an enclosing scope, in field order for the
    /// environment struct.
    pub free: Vec<DefId>,
    /// Ids of local variables introduced directly inside this scope
    /// (allocated, but not initialized, on scope entry).
    pub bound: BTreeSet<DefId>,
    /// Cross-stage persisted values. Must be empty in this backend
    /// (`NotImplemented` otherwise); see SPEC_FULL.md open question.
    pub persist: Vec<DefId>,
    /// Child scopes that must be emitted before this scope's body.
    pub children: Vec<ScopeId>,
}

/// An ordinary function.
#[derive(Debug, Clone)]
pub struct Proc {
    pub scope: Scope,
    /// Ordered value parameters, in LLVM parameter order (before the
    /// trailing environment pointer).
    pub params: Vec<DefId>,
}

/// A quoted block of code — a staged program fragment, compiled as a
/// zero-argument closure.
#[derive(Debug, Clone)]
pub struct Prog {
    pub scope: Scope,
    /// Persisted values this quote owns; placed before `scope.free` in
    /// the environment struct's field order.
    pub owned_persist: Vec<DefId>,
}

/// An optional overlay of specialized Proc/Prog definitions, keyed by
/// scope id. At most one variant is ever active
/// (`crate::codegen::Emitter::variant`).
#[derive(Debug, Clone, Default)]
pub struct Variant {
    pub procs: std::collections::BTreeMap<ScopeId, Proc>,
    pub progs: std::collections::BTreeMap<ScopeId, Prog>,
}
