//! Source types as seen by the backend.
//!
//! This is deliberately a small subset of the full source type lattice:
//! the parser/type-checker's output can mention polymorphic and
//! user-defined types, but only the four variants below are ever lowered
//! to LLVM by this backend (see `crate::codegen::types::lower`). Anything
//! else reaches the backend only as an input the caller is not supposed
//! to produce for a node actually emitted; if it does, lowering fails
//! with `UnsupportedType`.
use std::fmt;

/// A source-level type, as recorded in [`crate::ir::CompilerIR::type_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// 32-bit signed integer.
    Int,
    /// IEEE 754 double-precision float.
    Float,
    /// An ordinary function type.
    Fun {
        params: Vec<Type>,
        ret: Box<Type>,
    },
    /// The type of a quoted expression (a staged program fragment).
    Code { inner: Box<Type> },
    /// The dynamic/untyped top type. Not lowerable.
    Any,
    /// The unit/no-value type. Not lowerable.
    Void,
    /// An unapplied type parameter, e.g. `'a`. Not lowerable.
    Parameterized(String),
    /// A type constructor applied to an argument, e.g. `List<Int>`. Not lowerable.
    Instance { cons: String, arg: Box<Type> },
}

impl Type {
    /// True for the types this backend knows how to lower to LLVM.
    pub fn is_lowerable(&self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::Fun { .. } | Type::Code { .. })
    }

    /// True for `Fun` and `Code`, the two closure-represented types.
    pub fn is_closure(&self) -> bool {
        matches!(self, Type::Fun { .. } | Type::Code { .. })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::Fun { params, ret } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {ret}")
            }
            Type::Code { inner } => write!(f, "Code<{inner}>"),
            Type::Any => write!(f, "Any"),
            Type::Void => write!(f, "Void"),
            Type::Parameterized(name) => write!(f, "'{name}"),
            Type::Instance { cons, arg } => write!(f, "{cons}<{arg}>"),
        }
    }
}
