// tests/test_harness.rs
//! Test harness infrastructure for pasc integration tests
//!
//! This module provides builders for the reference programs used across the
//! integration tests and helpers for inspecting a compiled object.

#![allow(dead_code)]

use pasc::prelude::*;

/// Install a test-friendly subscriber once; `RUST_LOG` overrides the filter.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Compile with the default configuration, panicking with the error text on failure.
pub fn compile_ok<'ast>(root: &'ast ProcDecl<'ast>) -> CompiledObject<'ast> {
    init_logging();
    match pasc::compile(root, CompilerConfig::default()) {
        Ok(object) => object,
        Err(err) => panic!("Expected successful compilation, got: {err}"),
    }
}

/// Compile with `config`, expecting a fatal error.
pub fn compile_err<'ast>(root: &'ast ProcDecl<'ast>, config: CompilerConfig) -> CompilationError {
    init_logging();
    match pasc::compile(root, config) {
        Ok(object) => panic!(
            "Expected compilation to fail, got {} instructions",
            object.instructions.len()
        ),
        Err(err) => err,
    }
}

/// Resolved type of `name` bound directly in the program at `path`.
pub fn symbol_type<'o>(object: &'o CompiledObject<'_>, path: &str, name: &str) -> &'o Type {
    let program = object
        .program(path)
        .unwrap_or_else(|| panic!("no program at '{path}'"));
    object
        .tree
        .scope(program.scope())
        .get(name)
        .map(Symbol::ty)
        .unwrap_or_else(|| panic!("'{name}' is not bound in '{path}'"))
}

// ============================================================================
// Reference programs
// ============================================================================

/// `main(x: int)` with `y: int := x + 1` and body `y := x + 1`.
pub fn scenario_a<'ast>(b: &AstBuilder<'ast>) -> &'ast ProcDecl<'ast> {
    let init = b.binary(BinaryOp::Add, b.name("x"), b.int(1));
    let body = b.assign("y", b.binary(BinaryOp::Add, b.name("x"), b.int(1)));
    b.proc_decl(
        "main",
        &[b.param("x", TypeExpr::Int)],
        &[b.var("y", TypeExpr::Int, Some(init))],
        None,
        b.expr_stmt(body),
    )
}

/// A real stored into an int local.
pub fn scenario_b<'ast>(b: &AstBuilder<'ast>) -> &'ast ProcDecl<'ast> {
    b.proc_decl(
        "main",
        &[],
        &[b.var("y", TypeExpr::Int, None)],
        None,
        b.expr_stmt(b.at(3, 5).assign("y", b.real(2.5))),
    )
}

/// Nested function `f(n: int): int` whose body is `f := n < 1`.
pub fn scenario_c<'ast>(b: &AstBuilder<'ast>) -> (&'ast ProcDecl<'ast>, &'ast Expr<'ast>) {
    let ret = b.assign("f", b.binary(BinaryOp::Less, b.name("n"), b.int(1)));
    let f = b.proc_decl(
        "f",
        &[b.param("n", TypeExpr::Int)],
        &[],
        Some(TypeExpr::Int),
        b.expr_stmt(ret),
    );
    let main = b.proc_decl(
        "main",
        &[],
        &[Decl::Proc(f)],
        None,
        b.expr_stmt(b.call("f", &[b.int(4)])),
    );
    (main, ret)
}

/// `a: array[0..9] of int` indexed by `index`.
pub fn scenario_d<'ast>(
    b: &AstBuilder<'ast>,
    index: &'ast Expr<'ast>,
) -> (&'ast ProcDecl<'ast>, &'ast Expr<'ast>) {
    let access = b.index(b.name("a"), index);
    let main = b.proc_decl(
        "main",
        &[],
        &[
            b.var("a", b.array_type(TypeExpr::Int, 0, 10), None),
            b.var("i", TypeExpr::Int, None),
        ],
        None,
        b.expr_stmt(access),
    );
    (main, access)
}

/// A for-each over `a: array[0..9] of int` and a `range(1.0, 5.0, 1.0)`,
/// neither induction variable declared.
pub fn scenario_e<'ast>(b: &AstBuilder<'ast>) -> &'ast ProcDecl<'ast> {
    let each = b.for_each(
        "i",
        b.name("a"),
        b.expr_stmt(b.set_index(b.name("a"), b.name("i"), b.int(0))),
    );
    let range = b.range(
        "r",
        b.real(1.0),
        b.real(5.0),
        b.real(1.0),
        b.expr_stmt(b.assign(
            "total",
            b.binary(BinaryOp::Add, b.name("total"), b.name("r")),
        )),
    );
    b.proc_decl(
        "main",
        &[],
        &[
            b.var("a", b.array_type(TypeExpr::Int, 0, 10), None),
            b.var("total", TypeExpr::Real, None),
        ],
        None,
        b.block(&[each, range]),
    )
}

/// `depth` levels of procedures, each declaring `width` siblings and an int
/// local that its body increments in a while loop.
pub fn nested_program<'ast>(
    b: &AstBuilder<'ast>,
    depth: usize,
    width: usize,
) -> &'ast ProcDecl<'ast> {
    fn level<'ast>(
        b: &AstBuilder<'ast>,
        name: &str,
        depth: usize,
        width: usize,
    ) -> &'ast ProcDecl<'ast> {
        let mut decls = vec![b.var("n", TypeExpr::Int, None)];
        if depth > 0 {
            for k in 0..width {
                decls.push(Decl::Proc(level(b, &format!("{name}_{k}"), depth - 1, width)));
            }
        }
        let cond = b.binary(BinaryOp::Less, b.name("n"), b.int(10));
        let step = b.assign("n", b.binary(BinaryOp::Add, b.name("n"), b.int(1)));
        b.proc_decl(name, &[], &decls, None, b.while_loop(cond, b.expr_stmt(step)))
    }
    level(b, "main", depth, width)
}

// ============================================================================
// Instruction inspection
// ============================================================================

/// Instruction counts by kind.
#[derive(Debug, Default)]
pub struct InstructionCounter {
    pub labels: usize,
    pub jumps: usize,
    pub conditional_jumps: usize,
    pub calls: usize,
    pub returns: usize,
    pub pushes: usize,
    pub pops: usize,
}

impl InstructionCounter {
    pub fn count(instructions: &[Instruction]) -> Self {
        let mut counter = Self::default();
        for instruction in instructions {
            match instruction {
                Instruction::Label(_) => counter.labels += 1,
                Instruction::Jump(_) => counter.jumps += 1,
                Instruction::JumpIfTrue { .. } => counter.conditional_jumps += 1,
                Instruction::Call(_) => counter.calls += 1,
                Instruction::Return(_) => counter.returns += 1,
                Instruction::Push(_) => counter.pushes += 1,
                Instruction::Pop(_) => counter.pops += 1,
                _ => {}
            }
        }
        counter
    }
}

/// Instructions of the program entered at `entry`, up to and including its `Return`.
pub fn program_code<'o>(object: &'o CompiledObject<'_>, entry: &str) -> &'o [Instruction] {
    let start = object
        .instructions
        .iter()
        .position(|i| matches!(i, Instruction::Label(label) if label.name() == entry))
        .unwrap_or_else(|| panic!("no entry label '{entry}'"));
    let len = object.instructions[start..]
        .iter()
        .position(|i| matches!(i, Instruction::Return(_)))
        .expect("program ends with a return");
    &object.instructions[start..=start + len]
}
