//! Symbolic addressing expressions.
//!
//! A [`Location`] describes how to compute an address or a value on the
//! abstract stack machine. Locations are built bottom-up and never mutated
//! afterwards; the instruction generator clones subtrees freely.
//!
//! ```text
//! local #2 of a program with display index 3 (word = 8):
//!
//! Offset(
//!     Indirect(Offset(Symbol("__display"), Immediate(24))),
//!     Immediate(-16),
//! )
//! ```

use ordered_float::OrderedFloat;

use crate::types::{TargetLayout, Type};

/// Name of the synthetic symbol holding the display table.
pub const DISPLAY_SYMBOL: &str = "__display";

/// A machine register of the abstract target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    FramePointer,
    StackPointer,
}

/// Identifier of a compiler temporary, unique within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TempId(pub u32);

/// A constant operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Int(i64),
    Real(OrderedFloat<f64>),
    Char(u8),
    Bool(bool),
}

/// An address or value computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// Absolute memory cell.
    Memory(u64),
    /// Compiler temporary.
    Temporary(TempId),
    /// The cell whose address is stored at `addr`.
    Indirect(Box<Location>),
    /// `addr` displaced by `amount` bytes.
    Offset {
        addr: Box<Location>,
        amount: Box<Location>,
    },
    /// `value * multiplier`, used for scaled indices.
    Stride {
        value: Box<Location>,
        multiplier: Box<Location>,
    },
    /// A machine register.
    Register(Register),
    /// Address of a named symbol or label.
    Symbol(String),
    /// Storage size of a type, folded once the layout is known.
    SizeOf(Type),
    /// A literal constant.
    Immediate(Constant),
}

impl Location {
    pub fn frame_pointer() -> Self {
        Location::Register(Register::FramePointer)
    }

    pub fn stack_pointer() -> Self {
        Location::Register(Register::StackPointer)
    }

    pub fn int(value: i64) -> Self {
        Location::Immediate(Constant::Int(value))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Location::Symbol(name.into())
    }

    pub fn indirect(addr: Location) -> Self {
        Location::Indirect(Box::new(addr))
    }

    pub fn offset(addr: Location, amount: Location) -> Self {
        Location::Offset {
            addr: Box::new(addr),
            amount: Box::new(amount),
        }
    }

    pub fn stride(value: Location, multiplier: Location) -> Self {
        Location::Stride {
            value: Box::new(value),
            multiplier: Box::new(multiplier),
        }
    }

    /// Slot `index` of the display table.
    pub fn display_entry(index: u32, layout: &TargetLayout) -> Self {
        Location::offset(
            Location::symbol(DISPLAY_SYMBOL),
            Location::int(i64::from(index) * layout.word() as i64),
        )
    }

    /// Fold the location to an integer when it is built only from constants
    /// and the result fits in an `i64`.
    pub fn const_value(&self, layout: &TargetLayout) -> Option<i64> {
        match self {
            Location::Immediate(Constant::Int(v)) => Some(*v),
            Location::Immediate(Constant::Char(c)) => Some(i64::from(*c)),
            Location::Immediate(Constant::Bool(b)) => Some(i64::from(*b)),
            Location::SizeOf(ty) => i64::try_from(layout.checked_size_of(ty)?).ok(),
            Location::Offset { addr, amount } => {
                addr.const_value(layout)?.checked_add(amount.const_value(layout)?)
            }
            Location::Stride { value, multiplier } => {
                value.const_value(layout)?.checked_mul(multiplier.const_value(layout)?)
            }
            _ => None,
        }
    }
}
