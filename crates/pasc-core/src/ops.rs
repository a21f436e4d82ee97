//! Operator definitions shared by the syntax tree, the type checker and the
//! instruction stream.

use std::fmt;

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `not x`
    Not,
    /// `~x`
    BitNot,
    /// `+x`
    Identity,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic operators
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `mod`
    Mod,

    // Comparison operators
    /// `=`
    Equal,
    /// `<>`
    NotEqual,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `>`
    Greater,

    // Logical operators
    /// `and`
    And,
    /// `or`
    Or,

    // Bitwise operators
    /// `band`
    BitAnd,
    /// `bor`
    BitOr,
    /// `bxor`
    BitXor,
}

/// The family an operator belongs to, which decides how it is type checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpClass {
    /// Operands are promoted to a common numeric type, which is also the result.
    Arithmetic,
    /// Operands are promoted to a common numeric type; the result is `bool`.
    Comparison,
    /// Operands must be boolean; the result is `bool`.
    Logical,
    /// Operands must be integers; the result is `int`.
    Bitwise,
}

impl BinaryOp {
    /// Classify this operator.
    pub fn class(self) -> OpClass {
        use BinaryOp::*;
        match self {
            Add | Sub | Mul | Div | Mod => OpClass::Arithmetic,
            Equal | NotEqual | LessEqual | GreaterEqual | Less | Greater => OpClass::Comparison,
            And | Or => OpClass::Logical,
            BitAnd | BitOr | BitXor => OpClass::Bitwise,
        }
    }

    /// Source spelling of the operator.
    pub fn as_str(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "mod",
            Equal => "=",
            NotEqual => "<>",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Less => "<",
            Greater => ">",
            And => "and",
            Or => "or",
            BitAnd => "band",
            BitOr => "bor",
            BitXor => "bxor",
        }
    }
}

impl UnaryOp {
    /// Source spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not",
            UnaryOp::BitNot => "~",
            UnaryOp::Identity => "+",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
