//! Code generation error types.
//!
//! This module defines [`CodegenError`] and [`CodegenErrorKind`], covering
//! the fatal-abort taxonomy this backend uses: the input IR is assumed
//! well-typed, so every error here signals either a caller bug (a
//! malformed `CompilerIR`) or an unimplemented feature, never a
//! recoverable user-facing diagnostic.

use crate::ir::{DefId, NodeId, ScopeId};

/// The kind of error that aborted code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenErrorKind {
    /// A type outside `{Int, Float, Fun, Code}` reached type lowering.
    UnsupportedType,
    /// An AST node kind the backend does not dispatch on at all.
    UnsupportedNode,
    /// A recognized but unimplemented feature (persists, control flow,
    /// extern lookup/assign, tuples, allocation, type aliases).
    NotImplemented,
    /// A use site had no alloca recorded in `named_values`.
    UnknownVariable,
    /// A scope id was absent from both the active variant and the base IR.
    UnknownScope,
    /// A unary or binary operator was applied to a non-numeric operand.
    IncompatibleOperand,
    /// A unary operator symbol outside the supported set (`-`).
    UnknownUnaryOp,
    /// A binary operator symbol outside the supported set (`+`, `*`).
    UnknownBinaryOp,
    /// An LLVM builder API call itself failed (out-of-memory, malformed
    /// IR construction) rather than the IR being unsupported.
    Internal,
}

impl std::fmt::Display for CodegenErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CodegenErrorKind::UnsupportedType => "unsupported type",
            CodegenErrorKind::UnsupportedNode => "unsupported node",
            CodegenErrorKind::NotImplemented => "not implemented",
            CodegenErrorKind::UnknownVariable => "unknown variable",
            CodegenErrorKind::UnknownScope => "unknown scope",
            CodegenErrorKind::IncompatibleOperand => "incompatible operand",
            CodegenErrorKind::UnknownUnaryOp => "unknown unary operator",
            CodegenErrorKind::UnknownBinaryOp => "unknown binary operator",
            CodegenErrorKind::Internal => "internal error",
        };
        write!(f, "{s}")
    }
}

/// The offending site of a [`CodegenError`], when one is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSite {
    Node(NodeId),
    Scope(ScopeId),
    Def(DefId),
    None,
}

/// An error that aborted code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenError {
    pub kind: CodegenErrorKind,
    pub message: String,
    pub site: ErrorSite,
}

impl CodegenError {
    pub fn new(kind: CodegenErrorKind, message: impl Into<String>, site: ErrorSite) -> Self {
        CodegenError {
            kind,
            message: message.into(),
            site,
        }
    }

    pub fn unsupported_type(message: impl Into<String>, node: NodeId) -> Self {
        Self::new(CodegenErrorKind::UnsupportedType, message, ErrorSite::Node(node))
    }

    pub fn unsupported_node(node: NodeId) -> Self {
        Self::new(
            CodegenErrorKind::UnsupportedNode,
            "encountered an AST node kind this backend does not dispatch on",
            ErrorSite::Node(node),
        )
    }

    pub fn not_implemented(feature: &str, node: NodeId) -> Self {
        Self::new(
            CodegenErrorKind::NotImplemented,
            format!("'{feature}' is not implemented"),
            ErrorSite::Node(node),
        )
    }

    pub fn unknown_variable(def: DefId, node: NodeId) -> Self {
        Self::new(
            CodegenErrorKind::UnknownVariable,
            format!("no alloca recorded for {def}"),
            ErrorSite::Node(node),
        )
    }

    pub fn unknown_scope(scope: ScopeId) -> Self {
        Self::new(
            CodegenErrorKind::UnknownScope,
            format!("{scope} is absent from both the active variant and the base IR"),
            ErrorSite::Scope(scope),
        )
    }

    pub fn incompatible_operand(message: impl Into<String>, node: NodeId) -> Self {
        Self::new(CodegenErrorKind::IncompatibleOperand, message, ErrorSite::Node(node))
    }

    pub fn unknown_unary_op(node: NodeId) -> Self {
        Self::new(
            CodegenErrorKind::UnknownUnaryOp,
            "unary operator is outside the supported set",
            ErrorSite::Node(node),
        )
    }

    pub fn unknown_binary_op(node: NodeId) -> Self {
        Self::new(
            CodegenErrorKind::UnknownBinaryOp,
            "binary operator is outside the supported set",
            ErrorSite::Node(node),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CodegenErrorKind::Internal, message, ErrorSite::None)
    }
}

impl std::fmt::Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.site {
            ErrorSite::Node(n) => write!(f, "{}: {} (at {n})", self.kind, self.message),
            ErrorSite::Scope(s) => write!(f, "{}: {} (at {s})", self.kind, self.message),
            ErrorSite::Def(d) => write!(f, "{}: {} (at {d})", self.kind, self.message),
            ErrorSite::None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for CodegenError {}
