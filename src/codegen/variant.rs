//! The specialization resolver (§4.6): a pure lookup that prefers the
//! active [`Variant`]'s definition for a scope id over the base IR's,
//! never mutating either. No teacher analogue exists (Lak has no
//! specialization concept); this follows the distilled spec's own
//! description directly.

use crate::ir::{CompilerIR, Proc, Prog, ScopeId, Variant};

/// What a scope id resolves to: a Proc, a Prog, or neither (`UnknownScope`
/// at the call site).
pub(super) enum Resolved<'ir> {
    Proc(&'ir Proc),
    Prog(&'ir Prog),
    None,
}

/// Resolves `id` against the active variant first, falling back to the
/// base IR. Consulted only when emitting a scope's body — quote/fun
/// symbol name resolution never goes through the variant overlay (§4.6).
pub(super) fn resolve<'ir>(ir: &'ir CompilerIR, variant: Option<&'ir Variant>, id: ScopeId) -> Resolved<'ir> {
    if let Some(v) = variant {
        if let Some(p) = v.procs.get(&id) {
            return Resolved::Proc(p);
        }
        if let Some(p) = v.progs.get(&id) {
            return Resolved::Prog(p);
        }
    }
    if let Some(p) = ir.procs.get(&id) {
        return Resolved::Proc(p);
    }
    if let Some(p) = ir.progs.get(&id) {
        return Resolved::Prog(p);
    }
    Resolved::None
}
