//! The root input value this backend consumes.
use std::collections::BTreeMap;

use super::ids::{DefId, NodeId, ScopeId};
use super::scope::{Proc, Prog};
use super::types::Type;

/// The typed, lifted IR handed to the codegen driver.
///
/// `CompilerIR` is a read-only input contract: the backend never
/// mutates it, only consults it while walking from `main` outward. The
/// caller (parser/type-checker, out of scope for this crate) guarantees
/// the invariants listed in `crate::codegen` (every referenced node id
/// present in `type_table`, every referenced scope id present in
/// `procs`/`progs` or the active variant, `main` has no id, and scope
/// children form a DAG).
#[derive(Debug, Clone)]
pub struct CompilerIR {
    pub procs: BTreeMap<ScopeId, Proc>,
    pub progs: BTreeMap<ScopeId, Prog>,
    pub main: Proc,
    /// Maps an AST node id to its inferred type.
    pub type_table: BTreeMap<NodeId, Type>,
    /// Maps a use-site definition id to its defining site.
    ///
    /// Both sides are [`DefId`]: a use (`Lookup`/`Assign`) names the
    /// `DefId` it refers to directly, and this map resolves that id back
    /// to the original definition so the emitter can tell whether it
    /// names an extern (via `externs`) or an ordinary local/captured
    /// variable (via `named_values`).
    pub defuse: BTreeMap<DefId, DefId>,
    /// Definitions that are actually extern runtime symbols, mapped to
    /// their C symbol name (see `crate::codegen::prelude`).
    pub externs: BTreeMap<DefId, String>,
}

impl CompilerIR {
    /// True if `def` (after resolving through `defuse`) names an extern.
    pub fn is_extern(&self, def: DefId) -> bool {
        let resolved = self.defuse.get(&def).copied().unwrap_or(def);
        self.externs.contains_key(&resolved)
    }

    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.type_table.get(&node)
    }

    /// The type of a definition site (a parameter or captured/bound
    /// variable). Parameters and bindings are themselves AST nodes, so
    /// a [`DefId`] and the [`NodeId`] of its binding occupy the same
    /// integer id space; this looks the binding's type up in
    /// `type_table` via that shared numbering.
    pub fn type_of_def(&self, def: DefId) -> Option<&Type> {
        self.type_table.get(&NodeId(def.0))
    }
}
