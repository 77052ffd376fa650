//! Expression nodes of the lifted IR.
use super::ids::{DefId, NodeId, ScopeId};

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

/// A binary operator. Only the operators the expression compiler
/// implements are listed as named variants; anything else the frontend
/// might produce is represented as `Other` and fails with
/// `UnknownBinaryOp` at codegen time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Mul,
    Other,
}

/// An expression node, with its stable [`NodeId`].
///
/// `node` keys [`crate::ir::CompilerIR::type_table`] for this expression.
#[derive(Debug, Clone)]
pub struct Expr {
    pub node: NodeId,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(node: NodeId, kind: ExprKind) -> Self {
        Expr { node, kind }
    }
}

/// The kind of an expression node.
///
/// Every variant the expression compiler (`crate::codegen::expr`)
/// implements corresponds 1:1 to a match arm; variants it does not
/// implement still exist here so that the match stays exhaustive and
/// each one fails explicitly (`UnsupportedNode` or `NotImplemented`)
/// rather than the compiler silently skipping a node kind it has never
/// heard of.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Root of a compiled unit: emits the runtime prelude once, then its child.
    Root(Box<Expr>),

    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),

    /// `lhs; rhs` — `lhs` is emitted only if not provably side-effect-free.
    Sequence(Box<Expr>, Box<Expr>),

    /// `let x = value`
    Let { def: DefId, value: Box<Expr> },

    /// `x := value`
    Assign { def: DefId, value: Box<Expr> },

    /// A variable reference.
    Lookup(DefId),

    Unary { op: UnaryOp, operand: Box<Expr> },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },

    /// `<e>` — a quoted expression; refers to the already-registered
    /// [`ScopeId`] of the corresponding `Prog`.
    Quote(ScopeId),

    /// A function value, either a lambda literal or a named function
    /// reference; refers to the already-registered [`ScopeId`] of the
    /// corresponding `Proc`.
    Fun(ScopeId),

    /// `f(a1, .., an)` — `callee` is any expression yielding a closure value.
    Call { callee: Box<Expr>, args: Vec<Expr> },

    /// `!e` — runs a `Code` value with zero user arguments.
    Run(Box<Expr>),

    /// A direct call to an extern runtime function (`crate::codegen::prelude`),
    /// the one supported path for consuming an extern value (see
    /// `ExprKind::Lookup`/`ExprKind::Assign`, which reject externs).
    ExternCall { def: DefId, args: Vec<Expr> },

    /// Reading or writing a persisted cross-stage value. Recognized, not
    /// implemented: always fails with `NotImplemented` (see SPEC_FULL.md
    /// open question on persist layout ordering).
    Persist(DefId),

    /// A stage-escape expression. Recognized, not implemented.
    Escape(Box<Expr>),

    /// Recognized, not implemented.
    If { cond: Box<Expr>, then_branch: Box<Expr>, else_branch: Box<Expr> },

    /// Recognized, not implemented.
    While { cond: Box<Expr>, body: Box<Expr> },

    /// Recognized, not implemented.
    MacroCall { name: String, args: Vec<Expr> },

    /// Recognized, not implemented.
    Alloc { ty: super::types::Type },

    /// Recognized, not implemented.
    Tuple(Vec<Expr>),

    /// Recognized, not implemented.
    TupleIndex { tuple: Box<Expr>, index: u32 },

    /// Recognized, not implemented.
    TypeAlias { name: String, body: Box<Expr> },
}
