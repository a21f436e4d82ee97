//! Instruction Generator Pass - lower programs into one instruction stream.
//!
//! Programs are lowered depth-first in pre-order. Each program block is
//! entered through the label named after the program's path and has the
//! shape:
//!
//! ```text
//! main.sub:                      ; entry label
//!     push   FP                  ; prologue
//!     set    FP, SP
//!     push   display[i]
//!     set    display[i], SP
//!     binop  SP, SP - frame_size
//!     ...                        ; initializers, then the body
//! __Ln__:                        ; exit label
//!     set    display[i], [FP-w]  ; epilogue
//!     set    SP, FP
//!     pop    FP
//!     return result?
//! ```
//!
//! ## Modules
//!
//! - [`instruction`]: the instruction set
//! - [`labels`]: label interning
//! - [`block`]: scratch blocks flattened into the final stream
//! - `stmt` / `expr`: statement and expression lowering

pub mod block;
mod expr;
pub mod instruction;
mod jumps;
pub mod labels;
mod stmt;

use pasc_ast::{Decl, Expr};
use pasc_core::{BinaryOp, Location, TargetLayout, TempId, Type};
use tracing::{debug, trace};

use crate::passes::TypeckResults;
use crate::program::{ProgramId, ProgramTree};
use crate::scope::{ScopeId, Symbol};

pub use block::Block;
pub use instruction::Instruction;
use jumps::LoopStack;
pub use labels::{Label, LabelRegistry};

/// Output of the instruction generator pass.
#[derive(Debug, Default)]
pub struct GeneratorOutput {
    /// The whole unit, programs concatenated in pre-order.
    pub instructions: Vec<Instruction>,
    /// Every label referenced by `instructions`.
    pub labels: LabelRegistry,
    /// Number of temporaries allocated.
    pub temporaries: u32,
}

/// Pass 4: instruction generation.
pub struct InstructionGenerator<'a, 'ast> {
    tree: &'a ProgramTree<'ast>,
    typeck: &'a TypeckResults,
    layout: TargetLayout,
    labels: LabelRegistry,
    loops: LoopStack,
    next_temp: u32,
    /// Scope of the program being lowered.
    scope: ScopeId,
    /// Exit label of the program being lowered.
    exit: Option<Label>,
    /// Result temporary of the function being lowered.
    result: Option<Location>,
}

impl<'a, 'ast> InstructionGenerator<'a, 'ast> {
    pub fn new(
        tree: &'a ProgramTree<'ast>,
        typeck: &'a TypeckResults,
        layout: TargetLayout,
    ) -> Self {
        Self {
            tree,
            typeck,
            layout,
            labels: LabelRegistry::new(),
            loops: LoopStack::new(),
            next_temp: 0,
            scope: tree.program(tree.root()).scope(),
            exit: None,
            result: None,
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self) -> GeneratorOutput {
        debug!(programs = self.tree.len(), "instruction generator started");
        let mut root = Block::root();
        for id in self.tree.preorder() {
            let block = self.lower_program(id);
            root.append(block);
        }

        let instructions = root.into_instructions();
        debug!(
            instructions = instructions.len(),
            labels = self.labels.len(),
            temporaries = self.next_temp,
            "instruction generator finished"
        );
        GeneratorOutput {
            instructions,
            labels: self.labels,
            temporaries: self.next_temp,
        }
    }

    fn lower_program(&mut self, id: ProgramId) -> Block {
        let tree = self.tree;
        let program = tree.program(id);
        let Some(display_index) = program.display_index() else {
            panic!("structural bug: program '{}' has no display slot", program.path());
        };
        trace!(program = program.path(), display_index, "lowering program");

        let entry = self.labels.named(program.path());
        let mut block = Block::labeled(entry);
        let exit = self.labels.fresh();
        self.scope = program.scope();
        self.exit = Some(exit.clone());
        self.result = program.ret().map(|_| self.temp());

        let sp = Location::stack_pointer();
        let fp = Location::frame_pointer();
        let display = Location::display_entry(display_index, &self.layout);

        block.emit(Instruction::Push(fp.clone()));
        block.emit(Instruction::Set {
            dst: fp.clone(),
            src: sp.clone(),
        });
        block.emit(Instruction::Push(display.clone()));
        block.emit(Instruction::Set {
            dst: display.clone(),
            src: sp.clone(),
        });
        if program.frame_size() > 0 {
            block.emit(Instruction::BinOp {
                dst: sp.clone(),
                op: BinaryOp::Sub,
                left: sp.clone(),
                right: Location::int(program.frame_size() as i64),
            });
        }

        for decl in program.decl().decls {
            if let Decl::Var(var) = decl
                && let Some(init) = var.init
            {
                let value = self.lower_value(&mut block, init);
                block.emit(Instruction::Set {
                    dst: self.location_of(var.name.name),
                    src: value,
                });
            }
        }

        self.lower_stmt(&mut block, program.decl().body);

        let word = self.layout.word() as i64;
        let saved_display = Location::offset(fp.clone(), Location::int(-word));
        block.emit(Instruction::Label(exit));
        block.emit(Instruction::Set {
            dst: display,
            src: saved_display,
        });
        block.emit(Instruction::Set {
            dst: sp,
            src: fp.clone(),
        });
        block.emit(Instruction::Pop(fp));
        block.emit(Instruction::Return(self.result.take()));

        self.exit = None;
        block
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn temp(&mut self) -> Location {
        let id = TempId(self.next_temp);
        self.next_temp += 1;
        Location::Temporary(id)
    }

    fn symbol(&self, name: &str) -> &'a Symbol<'ast> {
        match self.tree.lookup(self.scope, name) {
            Some((_, symbol)) => symbol,
            None => panic!("structural bug: '{name}' unresolved after type checking"),
        }
    }

    fn location_of(&self, name: &str) -> Location {
        match self.symbol(name).location() {
            Some(location) => location.clone(),
            None => panic!("structural bug: '{name}' has no location"),
        }
    }

    fn type_of(&self, expr: &Expr<'_>) -> &'a Type {
        match self.typeck.type_of(expr.id) {
            Some(ty) => ty,
            None => panic!("structural bug: expression at {} was not typed", expr.span),
        }
    }

    fn exit_label(&self) -> Label {
        match &self.exit {
            Some(label) => label.clone(),
            None => panic!("structural bug: no program is being lowered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompiledObject, Compiler};
    use bumpalo::Bump;
    use pasc_ast::{AstBuilder, ProcDecl, TypeExpr};
    use pasc_core::UnaryOp;

    fn compile<'ast>(root: &'ast ProcDecl<'ast>) -> CompiledObject<'ast> {
        Compiler::default().compile(root).expect("program compiles")
    }

    fn label(object: &CompiledObject<'_>, name: &str) -> Label {
        object.labels.get(name).cloned().expect("label exists")
    }

    fn temp(n: u32) -> Location {
        Location::Temporary(TempId(n))
    }

    fn display(index: u32) -> Location {
        Location::display_entry(index, &TargetLayout::default())
    }

    fn local(index: u32, depth: i64) -> Location {
        Location::offset(Location::indirect(display(index)), Location::int(-depth))
    }

    fn prologue(entry: Label, index: u32, frame_size: i64) -> Vec<Instruction> {
        let (fp, sp) = (Location::frame_pointer(), Location::stack_pointer());
        let mut code = vec![
            Instruction::Label(entry),
            Instruction::Push(fp.clone()),
            Instruction::Set {
                dst: fp,
                src: sp.clone(),
            },
            Instruction::Push(display(index)),
            Instruction::Set {
                dst: display(index),
                src: sp.clone(),
            },
        ];
        if frame_size > 0 {
            code.push(Instruction::BinOp {
                dst: sp.clone(),
                op: BinaryOp::Sub,
                left: sp,
                right: Location::int(frame_size),
            });
        }
        code
    }

    fn epilogue(exit: Label, index: u32, result: Option<Location>) -> Vec<Instruction> {
        let (fp, sp) = (Location::frame_pointer(), Location::stack_pointer());
        vec![
            Instruction::Label(exit),
            Instruction::Set {
                dst: display(index),
                src: Location::offset(fp.clone(), Location::int(-8)),
            },
            Instruction::Set {
                dst: sp,
                src: fp.clone(),
            },
            Instruction::Pop(fp),
            Instruction::Return(result),
        ]
    }

    #[test]
    fn empty_program_is_prologue_and_epilogue() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let main = b.proc_decl(
            "main",
            &[],
            &[b.var("x", TypeExpr::Int, None)],
            None,
            b.block(&[]),
        );

        let object = compile(main);
        let mut expected = prologue(label(&object, "main"), 0, 8);
        expected.extend(epilogue(label(&object, "__L0__"), 0, None));
        assert_eq!(object.instructions, expected);
    }

    #[test]
    fn initializer_is_stored_after_prologue() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let main = b.proc_decl(
            "main",
            &[],
            &[
                b.var("a", TypeExpr::Int, None),
                b.var("b", TypeExpr::Char, Some(b.char(b'z'))),
            ],
            None,
            b.block(&[]),
        );

        let object = compile(main);
        assert_eq!(
            object.instructions[6],
            Instruction::Set {
                dst: local(0, 9),
                src: Location::Immediate(pasc_core::Constant::Char(b'z')),
            }
        );
    }

    #[test]
    fn while_loop_jumps_back_to_its_head() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let cond = b.binary(BinaryOp::Less, b.name("i"), b.int(3));
        let step = b.assign("i", b.binary(BinaryOp::Add, b.name("i"), b.int(1)));
        let main = b.proc_decl(
            "main",
            &[],
            &[b.var("i", TypeExpr::Int, None)],
            None,
            b.block(&[b.while_loop(cond, b.expr_stmt(step))]),
        );

        let object = compile(main);
        let top = label(&object, "__L1__");
        let end = label(&object, "__L2__");
        let i = local(0, 8);
        assert_eq!(
            object.instructions[6..14],
            [
                Instruction::Label(top.clone()),
                Instruction::BinOp {
                    dst: temp(0),
                    op: BinaryOp::Less,
                    left: i.clone(),
                    right: Location::int(3),
                },
                Instruction::UnOp {
                    dst: temp(1),
                    op: UnaryOp::Not,
                    operand: temp(0),
                },
                Instruction::JumpIfTrue {
                    label: end.clone(),
                    test: temp(1),
                },
                Instruction::BinOp {
                    dst: temp(2),
                    op: BinaryOp::Add,
                    left: i.clone(),
                    right: Location::int(1),
                },
                Instruction::Set {
                    dst: i,
                    src: temp(2),
                },
                Instruction::Jump(top),
                Instruction::Label(end),
            ]
        );
    }

    #[test]
    fn if_else_jumps_over_the_else_branch() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let stmt = b.if_then(
            b.name("flag"),
            b.expr_stmt(b.assign("n", b.int(1))),
            Some(b.expr_stmt(b.assign("n", b.int(2)))),
        );
        let main = b.proc_decl(
            "main",
            &[b.param("flag", TypeExpr::Bool)],
            &[b.var("n", TypeExpr::Int, None)],
            None,
            b.block(&[stmt]),
        );

        let object = compile(main);
        let else_label = label(&object, "__L1__");
        let end = label(&object, "__L2__");
        let flag = Location::offset(Location::frame_pointer(), Location::int(16));
        let n = local(0, 8);
        assert_eq!(
            object.instructions[6..13],
            [
                Instruction::UnOp {
                    dst: temp(0),
                    op: UnaryOp::Not,
                    operand: flag,
                },
                Instruction::JumpIfTrue {
                    label: else_label.clone(),
                    test: temp(0),
                },
                Instruction::Set {
                    dst: n.clone(),
                    src: Location::int(1),
                },
                Instruction::Jump(end.clone()),
                Instruction::Label(else_label),
                Instruction::Set {
                    dst: n,
                    src: Location::int(2),
                },
                Instruction::Label(end),
            ]
        );
    }

    #[test]
    fn break_and_continue_target_the_innermost_loop() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = b.block(&[
            b.if_then(
                b.binary(BinaryOp::Equal, b.name("i"), b.int(1)),
                b.continue_stmt(),
                None,
            ),
            b.break_stmt(),
        ]);
        let stmt = b.for_loop(
            Some(b.expr_stmt(b.assign("i", b.int(0)))),
            b.binary(BinaryOp::Less, b.name("i"), b.int(3)),
            Some(b.expr_stmt(b.assign("i", b.binary(BinaryOp::Add, b.name("i"), b.int(1))))),
            body,
        );
        let main = b.proc_decl(
            "main",
            &[],
            &[b.var("i", TypeExpr::Int, None)],
            None,
            b.block(&[stmt]),
        );

        let object = compile(main);
        let top = label(&object, "__L1__");
        let next = label(&object, "__L2__");
        let end = label(&object, "__L3__");
        let code = &object.instructions;
        let position = |wanted: &Instruction| code.iter().position(|i| i == wanted);

        let continue_at = position(&Instruction::Jump(next.clone())).expect("continue jump");
        let break_at = position(&Instruction::Jump(end.clone())).expect("break jump");
        let next_at = position(&Instruction::Label(next)).expect("step label");
        let back_at = position(&Instruction::Jump(top)).expect("back edge");
        let end_at = position(&Instruction::Label(end)).expect("end label");
        assert!(continue_at < break_at);
        assert!(break_at < next_at);
        assert!(next_at < back_at);
        assert_eq!(end_at, back_at + 1);
    }

    #[test]
    fn function_result_and_call_sequence() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let sq = b.proc_decl(
            "sq",
            &[b.param("n", TypeExpr::Int)],
            &[],
            Some(TypeExpr::Int),
            b.expr_stmt(b.assign("sq", b.binary(BinaryOp::Mul, b.name("n"), b.name("n")))),
        );
        let main = b.proc_decl(
            "main",
            &[],
            &[b.var("x", TypeExpr::Int, None), Decl::Proc(sq)],
            None,
            b.expr_stmt(b.assign("x", b.call("sq", &[b.int(3)]))),
        );

        let object = compile(main);
        let sp = Location::stack_pointer();
        let entry = label(&object, "main.sq");

        let mut expected = prologue(label(&object, "main"), 0, 8);
        expected.extend([
            Instruction::Set {
                dst: temp(0),
                src: Location::int(3),
            },
            Instruction::Push(temp(0)),
            Instruction::Call(entry.clone()),
            Instruction::Pop(temp(1)),
            Instruction::BinOp {
                dst: sp.clone(),
                op: BinaryOp::Add,
                left: sp,
                right: Location::int(8),
            },
            Instruction::Set {
                dst: local(0, 8),
                src: temp(1),
            },
        ]);
        expected.extend(epilogue(label(&object, "__L0__"), 0, None));

        let n = Location::offset(Location::frame_pointer(), Location::int(16));
        let exit = label(&object, "__L1__");
        expected.extend(prologue(entry, 1, 0));
        expected.extend([
            Instruction::BinOp {
                dst: temp(3),
                op: BinaryOp::Mul,
                left: n.clone(),
                right: n,
            },
            Instruction::Set {
                dst: temp(2),
                src: temp(3),
            },
            Instruction::Jump(exit.clone()),
        ]);
        expected.extend(epilogue(exit, 1, Some(temp(2))));

        assert_eq!(object.instructions, expected);
        assert_eq!(object.temporaries, 4);
    }

    #[test]
    fn arguments_are_pushed_last_to_first() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let pair = b.proc_decl(
            "pair",
            &[b.param("a", TypeExpr::Int), b.param("c", TypeExpr::Char)],
            &[],
            None,
            b.block(&[]),
        );
        let main = b.proc_decl(
            "main",
            &[],
            &[Decl::Proc(pair)],
            None,
            b.expr_stmt(b.call("pair", &[b.int(1), b.char(b'c')])),
        );

        let object = compile(main);
        let sp = Location::stack_pointer();
        assert_eq!(
            object.instructions[5..10],
            [
                Instruction::Set {
                    dst: temp(0),
                    src: Location::int(1),
                },
                Instruction::Set {
                    dst: temp(1),
                    src: Location::Immediate(pasc_core::Constant::Char(b'c')),
                },
                Instruction::Push(temp(1)),
                Instruction::Push(temp(0)),
                Instruction::Call(label(&object, "main.pair")),
            ]
        );
        assert_eq!(
            object.instructions[10],
            Instruction::BinOp {
                dst: sp.clone(),
                op: BinaryOp::Add,
                left: sp,
                right: Location::int(9),
            }
        );
    }

    #[test]
    fn indexing_subtracts_the_lower_bound() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let arr = b.array_type(TypeExpr::Int, 1, 3);
        let store = b.set_index(b.name("a"), b.int(2), b.int(7));
        let load = b.assign("x", b.index(b.name("a"), b.name("i")));
        let main = b.proc_decl(
            "main",
            &[],
            &[
                b.var("a", arr, None),
                b.var("i", TypeExpr::Int, None),
                b.var("x", TypeExpr::Int, None),
            ],
            None,
            b.block(&[b.expr_stmt(store), b.expr_stmt(load)]),
        );

        let object = compile(main);
        let a = local(0, 24);
        let element = |index: Location| {
            Location::offset(a.clone(), Location::stride(index, Location::SizeOf(Type::Int)))
        };
        assert_eq!(
            object.instructions[6..9],
            [
                Instruction::Set {
                    dst: element(Location::int(1)),
                    src: Location::int(7),
                },
                Instruction::BinOp {
                    dst: temp(0),
                    op: BinaryOp::Sub,
                    left: local(0, 32),
                    right: Location::int(1),
                },
                Instruction::Set {
                    dst: local(0, 40),
                    src: element(temp(0)),
                },
            ]
        );
    }

    #[test]
    fn char_constant_index_is_folded() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let store = b.set_index(b.name("a"), b.char(b'b'), b.int(7));
        let main = b.proc_decl(
            "main",
            &[],
            &[b.var("a", b.array_type(TypeExpr::Int, 97, 4), None)],
            None,
            b.expr_stmt(store),
        );

        let object = compile(main);
        let element = Location::offset(
            local(0, 32),
            Location::stride(Location::int(1), Location::SizeOf(Type::Int)),
        );
        assert_eq!(
            object.instructions[6],
            Instruction::Set {
                dst: element,
                src: Location::int(7),
            }
        );
        assert_eq!(object.temporaries, 0);
    }

    #[test]
    fn bounded_array_is_passed_to_open_parameter_by_address() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let first = b.proc_decl(
            "first",
            &[b.param("xs", b.open_array_type(TypeExpr::Int))],
            &[],
            Some(TypeExpr::Int),
            b.expr_stmt(b.assign("first", b.index(b.name("xs"), b.int(0)))),
        );
        let main = b.proc_decl(
            "main",
            &[],
            &[
                b.var("a", b.array_type(TypeExpr::Int, 0, 4), None),
                Decl::Proc(first),
            ],
            None,
            b.expr_stmt(b.call("first", &[b.name("a")])),
        );

        let object = compile(main);
        assert_eq!(
            object.instructions[6],
            Instruction::LoadAddress {
                dst: temp(0),
                src: local(0, 32),
            }
        );
        let xs = Location::offset(Location::frame_pointer(), Location::int(16));
        let read = Instruction::Set {
            dst: temp(2),
            src: Location::offset(
                Location::indirect(xs),
                Location::stride(Location::int(0), Location::SizeOf(Type::Int)),
            ),
        };
        assert!(object.instructions.contains(&read));
    }

    #[test]
    fn range_loop_refreshes_induction_variable() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let main = b.proc_decl(
            "main",
            &[],
            &[],
            None,
            b.range("k", b.int(1), b.int(10), b.int(2), b.block(&[])),
        );

        let object = compile(main);
        let k = local(0, 8);
        let top = label(&object, "__L1__");
        let end = label(&object, "__L3__");
        assert_eq!(
            object.instructions[9..17],
            [
                Instruction::Label(top.clone()),
                Instruction::BinOp {
                    dst: temp(3),
                    op: BinaryOp::Greater,
                    left: temp(0),
                    right: temp(1),
                },
                Instruction::JumpIfTrue {
                    label: end.clone(),
                    test: temp(3),
                },
                Instruction::Set {
                    dst: k,
                    src: temp(0),
                },
                Instruction::Label(label(&object, "__L2__")),
                Instruction::BinOp {
                    dst: temp(0),
                    op: BinaryOp::Add,
                    left: temp(0),
                    right: temp(2),
                },
                Instruction::Jump(top),
                Instruction::Label(end),
            ]
        );
    }
}
