//! Statement lowering.
//!
//! Every loop has the same skeleton; only the test and the step differ:
//!
//! ```text
//!     <setup>
//! top:
//!     t := <exit test>
//!     jump-if-true end, t
//!     <body>
//! next:                       ; continue target
//!     <step>
//!     jump top
//! end:                        ; break target
//! ```

use pasc_ast::{Expr, ForEachStmt, ForStmt, RangeStmt, Stmt, WhileStmt};
use pasc_core::{BinaryOp, Location, UnaryOp};

use super::{Block, Instruction, InstructionGenerator, Label};

impl<'a, 'ast> InstructionGenerator<'a, 'ast> {
    pub(super) fn lower_stmt(&mut self, block: &mut Block, stmt: &Stmt<'ast>) {
        match stmt {
            Stmt::Expr(stmt) => {
                self.lower_expr(block, stmt.expr);
            }
            Stmt::While(stmt) => self.lower_while(block, stmt),
            Stmt::If(stmt) => {
                let else_label = self.labels.fresh();
                self.jump_unless(block, stmt.cond, &else_label);
                self.lower_stmt(block, stmt.then_branch);
                match stmt.else_branch {
                    Some(else_branch) => {
                        let end = self.labels.fresh();
                        block.emit(Instruction::Jump(end.clone()));
                        block.emit(Instruction::Label(else_label));
                        self.lower_stmt(block, else_branch);
                        block.emit(Instruction::Label(end));
                    }
                    None => block.emit(Instruction::Label(else_label)),
                }
            }
            Stmt::For(stmt) => self.lower_for(block, stmt),
            Stmt::ForEach(stmt) => self.lower_for_each(block, stmt),
            Stmt::Range(stmt) => self.lower_range(block, stmt),
            Stmt::Compound(compound) => {
                for stmt in compound.stmts {
                    self.lower_stmt(block, stmt);
                }
            }
            Stmt::Break(_) => {
                let Some(label) = self.loops.break_label() else {
                    panic!("structural bug: break outside of a loop after type checking");
                };
                block.emit(Instruction::Jump(label.clone()));
            }
            Stmt::Continue(_) => {
                let Some(label) = self.loops.continue_label() else {
                    panic!("structural bug: continue outside of a loop after type checking");
                };
                block.emit(Instruction::Jump(label.clone()));
            }
        }
    }

    fn lower_while(&mut self, block: &mut Block, stmt: &WhileStmt<'ast>) {
        let top = self.labels.fresh();
        let end = self.labels.fresh();

        let mut body = Block::labeled(top.clone());
        self.jump_unless(&mut body, stmt.cond, &end);
        self.lower_loop_body(&mut body, stmt.body, &top, &end);
        body.emit(Instruction::Jump(top));

        block.append(body);
        block.emit(Instruction::Label(end));
    }

    fn lower_for(&mut self, block: &mut Block, stmt: &ForStmt<'ast>) {
        if let Some(init) = stmt.init {
            self.lower_stmt(block, init);
        }
        let top = self.labels.fresh();
        let next = self.labels.fresh();
        let end = self.labels.fresh();

        let mut body = Block::labeled(top.clone());
        self.jump_unless(&mut body, stmt.cond, &end);
        self.lower_loop_body(&mut body, stmt.body, &next, &end);
        body.emit(Instruction::Label(next));
        if let Some(post) = stmt.post {
            self.lower_stmt(&mut body, post);
        }
        body.emit(Instruction::Jump(top));

        block.append(body);
        block.emit(Instruction::Label(end));
    }

    /// Walk the index range of a bounded array: `lower_bound <= var < upper_bound`.
    fn lower_for_each(&mut self, block: &mut Block, stmt: &ForEachStmt<'ast>) {
        let bounds = self
            .type_of(stmt.iterable)
            .as_array()
            .and_then(|arr| Some((arr.lower_bound, arr.upper_bound()?)));
        let Some((lower, upper)) = bounds else {
            panic!("structural bug: for-each over a value without static bounds");
        };
        // Evaluated for its effects only; the bounds come from the type.
        self.lower_expr(block, stmt.iterable);

        let index = self.temp();
        block.emit(Instruction::Set {
            dst: index.clone(),
            src: Location::int(lower),
        });
        let var = self.location_of(stmt.var.name);
        self.lower_counted_loop(
            block,
            LoopCounter {
                current: index,
                exit_op: BinaryOp::GreaterEqual,
                limit: Location::int(upper),
                step: Location::int(1),
                var,
            },
            stmt.body,
        );
    }

    /// `var := lower; while var <= upper; var += step`, bounds evaluated once.
    fn lower_range(&mut self, block: &mut Block, stmt: &RangeStmt<'ast>) {
        let current = self.lower_into_temp(block, stmt.lower);
        let limit = self.lower_into_temp(block, stmt.upper);
        let step = self.lower_into_temp(block, stmt.step);

        let var = self.location_of(stmt.var.name);
        self.lower_counted_loop(
            block,
            LoopCounter {
                current,
                exit_op: BinaryOp::Greater,
                limit,
                step,
                var,
            },
            stmt.body,
        );
    }

    fn lower_counted_loop(
        &mut self,
        block: &mut Block,
        counter: LoopCounter,
        stmt: &Stmt<'ast>,
    ) {
        let top = self.labels.fresh();
        let next = self.labels.fresh();
        let end = self.labels.fresh();

        let mut body = Block::labeled(top.clone());
        let done = self.temp();
        body.emit(Instruction::BinOp {
            dst: done.clone(),
            op: counter.exit_op,
            left: counter.current.clone(),
            right: counter.limit,
        });
        body.emit(Instruction::JumpIfTrue {
            label: end.clone(),
            test: done,
        });
        body.emit(Instruction::Set {
            dst: counter.var,
            src: counter.current.clone(),
        });
        self.lower_loop_body(&mut body, stmt, &next, &end);
        body.emit(Instruction::Label(next));
        body.emit(Instruction::BinOp {
            dst: counter.current.clone(),
            op: BinaryOp::Add,
            left: counter.current,
            right: counter.step,
        });
        body.emit(Instruction::Jump(top));

        block.append(body);
        block.emit(Instruction::Label(end));
    }

    fn lower_loop_body(
        &mut self,
        block: &mut Block,
        body: &Stmt<'ast>,
        next: &Label,
        end: &Label,
    ) {
        self.loops.enter_loop(next.clone(), end.clone());
        self.lower_stmt(block, body);
        self.loops.exit_loop();
    }

    /// Evaluate `expr` once into a fresh temporary.
    fn lower_into_temp(&mut self, block: &mut Block, expr: &Expr<'ast>) -> Location {
        let value = self.lower_value(block, expr);
        let temp = self.temp();
        block.emit(Instruction::Set {
            dst: temp.clone(),
            src: value,
        });
        temp
    }

    /// Evaluate `cond` and jump to `target` when it is false.
    fn jump_unless(&mut self, block: &mut Block, cond: &Expr<'ast>, target: &Label) {
        let value = self.lower_value(block, cond);
        let negated = self.temp();
        block.emit(Instruction::UnOp {
            dst: negated.clone(),
            op: UnaryOp::Not,
            operand: value,
        });
        block.emit(Instruction::JumpIfTrue {
            label: target.clone(),
            test: negated,
        });
    }
}

/// Induction state of a for-each or range loop.
struct LoopCounter {
    current: Location,
    exit_op: BinaryOp,
    limit: Location,
    step: Location,
    /// Storage of the induction variable, refreshed from `current` each iteration.
    var: Location,
}
