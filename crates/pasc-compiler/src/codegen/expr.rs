//! Expression lowering.
//!
//! Every expression lowers to the [`Location`] holding its value. Operators
//! and calls compute into fresh temporaries; names and indexing produce the
//! address of existing storage, so they can be stored to as well as read.

use pasc_ast::{CallExpr, Expr, ExprKind, Literal};
use pasc_core::{BinaryOp, Constant, Location, Type};

use super::{Block, Instruction, InstructionGenerator};
use crate::passes::ExprRewrite;
use crate::scope::Symbol;

impl<'a, 'ast> InstructionGenerator<'a, 'ast> {
    /// Lower an expression; `None` for a procedure call.
    pub(super) fn lower_expr(&mut self, block: &mut Block, expr: &Expr<'ast>) -> Option<Location> {
        match &expr.kind {
            ExprKind::Literal(lit) => {
                let ty = self.type_of(expr);
                Some(self.lower_literal(block, lit, ty))
            }
            ExprKind::Name(ident) => Some(self.location_of(ident.name)),
            ExprKind::Assign(assign) => {
                let value = self.lower_value(block, assign.value);
                if let Some(ExprRewrite::Return { .. }) = self.typeck.rewrite(expr.id) {
                    let Some(result) = self.result.clone() else {
                        panic!("structural bug: return rewrite outside of a function");
                    };
                    block.emit(Instruction::Set {
                        dst: result.clone(),
                        src: value,
                    });
                    block.emit(Instruction::Jump(self.exit_label()));
                    return Some(result);
                }
                let target = self.location_of(assign.target.name);
                block.emit(Instruction::Set {
                    dst: target.clone(),
                    src: value,
                });
                Some(target)
            }
            ExprKind::Index(index) => Some(self.element_address(block, index.object, index.index)),
            ExprKind::SetIndex(set) => {
                let slot = self.element_address(block, set.object, set.index);
                let value = self.lower_value(block, set.value);
                block.emit(Instruction::Set {
                    dst: slot.clone(),
                    src: value,
                });
                Some(slot)
            }
            ExprKind::Call(call) => self.lower_call(block, call),
            ExprKind::Unary(unary) => {
                let operand = self.lower_value(block, unary.operand);
                let dst = self.temp();
                block.emit(Instruction::UnOp {
                    dst: dst.clone(),
                    op: unary.op,
                    operand,
                });
                Some(dst)
            }
            ExprKind::Binary(binary) => {
                let left = self.lower_value(block, binary.left);
                let right = self.lower_value(block, binary.right);
                let dst = self.temp();
                block.emit(Instruction::BinOp {
                    dst: dst.clone(),
                    op: binary.op,
                    left,
                    right,
                });
                Some(dst)
            }
        }
    }

    /// Lower an expression that the checker accepted as producing a value.
    pub(super) fn lower_value(&mut self, block: &mut Block, expr: &Expr<'ast>) -> Location {
        match self.lower_expr(block, expr) {
            Some(location) => location,
            None => panic!("structural bug: procedure call at {} used as a value", expr.span),
        }
    }

    fn lower_literal(&mut self, block: &mut Block, lit: &Literal<'ast>, ty: &Type) -> Location {
        match lit {
            Literal::Int(v) => Location::int(*v),
            Literal::Real(v) => Location::Immediate(Constant::Real((*v).into())),
            Literal::Char(c) => Location::Immediate(Constant::Char(*c)),
            Literal::Bool(b) => Location::Immediate(Constant::Bool(*b)),
            Literal::Array(arr) => {
                let Some(array) = ty.as_array() else {
                    panic!("structural bug: array literal typed as {ty}");
                };
                let elem = array.base.as_ref();
                let dst = self.temp();
                for (k, item) in arr.items.iter().enumerate() {
                    let value = self.lower_literal(block, item, elem);
                    let slot = Location::offset(
                        dst.clone(),
                        Location::stride(Location::int(k as i64), Location::SizeOf(elem.clone())),
                    );
                    block.emit(Instruction::Set {
                        dst: slot,
                        src: value,
                    });
                }
                dst
            }
        }
    }

    /// `Offset(base, Stride(index - lower, SizeOf(elem)))`.
    ///
    /// An open array holds the address of its elements, so its base is read
    /// through one indirection.
    fn element_address(
        &mut self,
        block: &mut Block,
        object: &Expr<'ast>,
        index: &Expr<'ast>,
    ) -> Location {
        let Some(array) = self.type_of(object).as_array() else {
            panic!("structural bug: indexing a non-array at {}", object.span);
        };
        let base = self.lower_value(block, object);
        let base = match array.size {
            Some(_) => base,
            None => Location::indirect(base),
        };

        let index = self.lower_value(block, index);
        let lower = array.lower_bound;
        let relative = if lower == 0 {
            index
        } else if let Some(c) = index
            .const_value(&self.layout)
            .and_then(|c| c.checked_sub(lower))
        {
            Location::int(c)
        } else {
            let dst = self.temp();
            block.emit(Instruction::BinOp {
                dst: dst.clone(),
                op: BinaryOp::Sub,
                left: index,
                right: Location::int(lower),
            });
            dst
        };

        Location::offset(
            base,
            Location::stride(relative, Location::SizeOf(array.base.as_ref().clone())),
        )
    }

    fn lower_call(&mut self, block: &mut Block, call: &CallExpr<'ast>) -> Option<Location> {
        let tree = self.tree;
        let Some(callee) = call.callee.as_name() else {
            panic!("structural bug: indirect call at {} after type checking", call.callee.span);
        };
        let Symbol::Prog(prog) = self.symbol(callee.name) else {
            panic!("structural bug: call to data symbol '{}'", callee.name);
        };
        let target = tree.program(prog.program);
        let Some(func) = target.ty().as_func() else {
            panic!("structural bug: routine '{}' without a signature", target.path());
        };

        let mut args = Vec::with_capacity(call.args.len());
        for (arg, param) in call.args.iter().zip(&func.params) {
            let value = self.lower_value(block, arg);
            let by_address = param.as_array().is_some_and(|p| p.size.is_none())
                && self
                    .type_of(arg)
                    .as_array()
                    .is_some_and(|a| a.size.is_some());
            let dst = self.temp();
            block.emit(if by_address {
                Instruction::LoadAddress {
                    dst: dst.clone(),
                    src: value,
                }
            } else {
                Instruction::Set {
                    dst: dst.clone(),
                    src: value,
                }
            });
            args.push(dst);
        }

        for arg in args.into_iter().rev() {
            block.emit(Instruction::Push(arg));
        }
        block.emit(Instruction::Call(self.labels.named(target.path())));

        let result = func.ret().map(|_| {
            let dst = self.temp();
            block.emit(Instruction::Pop(dst.clone()));
            dst
        });
        if target.args_size() > 0 {
            let sp = Location::stack_pointer();
            block.emit(Instruction::BinOp {
                dst: sp.clone(),
                op: BinaryOp::Add,
                left: sp,
                right: Location::int(target.args_size() as i64),
            });
        }
        result
    }
}
