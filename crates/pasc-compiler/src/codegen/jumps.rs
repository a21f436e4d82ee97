//! Loop tracking for break/continue.

use super::labels::Label;

/// Stack of enclosing loops, innermost last.
#[derive(Debug, Default)]
pub struct LoopStack {
    loops: Vec<LoopLabels>,
}

#[derive(Debug)]
struct LoopLabels {
    /// Target of `continue`: the step of the loop, or its head.
    continue_label: Label,
    /// Target of `break`: just past the loop.
    break_label: Label,
}

impl LoopStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_loop(&mut self, continue_label: Label, break_label: Label) {
        self.loops.push(LoopLabels {
            continue_label,
            break_label,
        });
    }

    pub fn exit_loop(&mut self) {
        self.loops.pop();
    }

    pub fn break_label(&self) -> Option<&Label> {
        self.loops.last().map(|ctx| &ctx.break_label)
    }

    pub fn continue_label(&self) -> Option<&Label> {
        self.loops.last().map(|ctx| &ctx.continue_label)
    }
}
