//! Scratch blocks.
//!
//! A [`Block`] collects instructions while one construct is lowered. Its
//! instructions become part of the final stream only when the block is
//! appended to its parent; a labelled block (a program entry or a loop head)
//! starts with its label.

use super::instruction::Instruction;
use super::labels::Label;

#[derive(Debug, Default)]
pub struct Block {
    instructions: Vec<Instruction>,
}

impl Block {
    /// An unlabelled block, used for the whole unit.
    pub fn root() -> Self {
        Self::default()
    }

    /// A block entered through `label`: a program entry or a loop head.
    pub fn labeled(label: Label) -> Self {
        Self {
            instructions: vec![Instruction::Label(label)],
        }
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Move a finished child block's instructions to the end of this block.
    pub fn append(&mut self, child: Block) {
        self.instructions.extend(child.instructions);
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }
}
