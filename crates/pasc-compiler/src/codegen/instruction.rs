//! Instructions of the abstract stack machine.

use pasc_core::{BinaryOp, Location, UnaryOp};

use super::labels::Label;

/// One instruction. Operands are [`Location`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `dst := src`
    Set { dst: Location, src: Location },
    /// `dst := address of src`
    LoadAddress { dst: Location, src: Location },
    /// `dst := left op right`
    BinOp {
        dst: Location,
        op: BinaryOp,
        left: Location,
        right: Location,
    },
    /// `dst := op operand`
    UnOp {
        dst: Location,
        op: UnaryOp,
        operand: Location,
    },
    Push(Location),
    Pop(Location),
    /// Push the return address and transfer to `label`.
    Call(Label),
    /// Leave the current routine, handing `value` back to the caller.
    Return(Option<Location>),
    Jump(Label),
    /// Transfer to `label` when `test` is true.
    JumpIfTrue { label: Label, test: Location },
    /// Jump target.
    Label(Label),
}
