//! `visit_binop`/`visit_unaryop` — arithmetic, comparison, boolean and
//! indexing operators lowered straight to the matching LLVM instruction.
//!
//! The type matrix itself already ran in the analyser; everything here
//! assumes the operand types are legal for `op` and only has to pick the
//! right instruction. A few pairs the analyser's matrix accepts structurally
//! (two equal-typed `str`/`list:T`/struct operands under a comparison
//! operator, or `list:T + list:T`) have no real lowering in this backend —
//! those stay as defensive `RuntimeError`s, never actually reachable because
//! `semantic.rs` rejects `list + list` outright and only `int`/`float`/`bool`
//! actually reach a comparison here in practice.

use crate::ast::{BinOpKind, Node, UnaryOpKind};
use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::ir::{IrType, Value};
use crate::types::Type;

use super::IrGen;

fn numeric_widen(lt: &Type, rt: &Type) -> Option<Type> {
    match (lt, rt) {
        (Type::Int, Type::Int) => Some(Type::Int),
        (Type::Float, Type::Float) => Some(Type::Float),
        (Type::Int, Type::Float) | (Type::Float, Type::Int) => Some(Type::Float),
        _ => None,
    }
}

impl<'a> IrGen<'a> {
    /// Promote an `int` operand to `double` if its partner is a `float`,
    /// leaving a same-typed pair untouched. Returns the two values as they
    /// should be fed to the eventual float or int instruction, plus the
    /// result type.
    fn widen_numeric(&mut self, lv: Value, lt: &Type, rv: Value, rt: &Type) -> (Value, Value, Type) {
        match (lt, rt) {
            (Type::Float, Type::Int) => (lv, self.current.emit_sitofp(&rv), Type::Float),
            (Type::Int, Type::Float) => (self.current.emit_sitofp(&lv), rv, Type::Float),
            (Type::Float, Type::Float) => (lv, rv, Type::Float),
            _ => (lv, rv, Type::Int),
        }
    }

    fn str_concat(&mut self, lv: Value, rv: Value) -> Value {
        let len_l = self.current.emit_call(&IrType::I32, "strlen", &[(IrType::Ptr, lv.clone())]);
        let len_r = self.current.emit_call(&IrType::I32, "strlen", &[(IrType::Ptr, rv.clone())]);
        let total = self.current.emit_int_binop("add", &len_l, &len_r);
        let one_more = self.current.emit_int_binop("add", &total, &Value::int(1));
        let buf = self.current.emit_call(&IrType::Ptr, "malloc", &[(IrType::I32, one_more)]);
        self.current.emit_call(&IrType::Ptr, "strcpy", &[(IrType::Ptr, buf.clone()), (IrType::Ptr, lv)]);
        // `strcat`-by-hand: copy the right operand onto the end of the left
        // one via a second `strcpy` into the tail, found by re-running
        // `strlen` on the freshly copied prefix.
        let copied_len = self.current.emit_call(&IrType::I32, "strlen", &[(IrType::Ptr, buf.clone())]);
        let tail = self
            .current
            .emit_gep(&IrType::I8, &buf, &[(IrType::I32, copied_len)]);
        self.current.emit_call(&IrType::Ptr, "strcpy", &[(IrType::Ptr, tail), (IrType::Ptr, rv)]);
        buf
    }

    fn runtime_error(&self, msg: impl Into<String>, node: &Node) -> Diagnostic {
        self.err(ErrorKind::RuntimeError, msg, node)
    }

    pub(super) fn visit_binop(
        &mut self,
        left: &Node,
        op: BinOpKind,
        right: &Node,
        node: &Node,
    ) -> Result<(Value, Type), Diagnostic> {
        let (lv, lt) = self.expect_value(left)?;
        let (rv, rt) = self.expect_value(right)?;

        match op {
            BinOpKind::Add => {
                if lt == Type::Str && rt == Type::Str {
                    return Ok((self.str_concat(lv, rv), Type::Str));
                }
                if matches!(lt, Type::List(_)) && matches!(rt, Type::List(_)) {
                    return Err(self.runtime_error("list + list is not implemented yet", node));
                }
                let (lv, rv, ty) = self.widen_numeric(lv, &lt, rv, &rt);
                let value = if ty == Type::Float {
                    self.current.emit_float_binop("fadd", &lv, &rv)
                } else {
                    self.current.emit_int_binop("add", &lv, &rv)
                };
                Ok((value, ty))
            }
            BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Mod => {
                let (lv, rv, ty) = self.widen_numeric(lv, &lt, rv, &rt);
                let (int_op, float_op) = match op {
                    BinOpKind::Sub => ("sub", "fsub"),
                    BinOpKind::Mul => ("mul", "fmul"),
                    BinOpKind::Div => ("sdiv", "fdiv"),
                    BinOpKind::Mod => ("srem", "frem"),
                    _ => unreachable!(),
                };
                let value = if ty == Type::Float {
                    self.current.emit_float_binop(float_op, &lv, &rv)
                } else {
                    self.current.emit_int_binop(int_op, &lv, &rv)
                };
                Ok((value, ty))
            }
            BinOpKind::Pow => {
                if lt == Type::Int && rt == Type::Int {
                    return Err(self.runtime_error("'^' on two ints is not supported", node));
                }
                let (lv, rv, _) = self.widen_numeric(lv, &lt, rv, &rt);
                let value = self.current.emit_call(
                    &IrType::Double,
                    "llvm.pow.f64",
                    &[(IrType::Double, lv), (IrType::Double, rv)],
                );
                Ok((value, Type::Float))
            }
            BinOpKind::Eq | BinOpKind::NotEq | BinOpKind::Lt | BinOpKind::Gt | BinOpKind::Le | BinOpKind::Ge => {
                self.visit_comparison(op, lv, &lt, rv, &rt, node)
            }
            BinOpKind::And | BinOpKind::Or | BinOpKind::Xor => {
                let bit_op = match op {
                    BinOpKind::And => "and",
                    BinOpKind::Or => "or",
                    BinOpKind::Xor => "xor",
                    _ => unreachable!(),
                };
                let value = match lt {
                    Type::Bool => self.current.emit_bool_binop(bit_op, &lv, &rv),
                    Type::Int => self.current.emit_int_binop(bit_op, &lv, &rv),
                    _ => return Err(self.runtime_error(format!("'{:?}' not supported on {}", op, lt), node)),
                };
                Ok((value, lt))
            }
            BinOpKind::Get => match &lt {
                Type::Str => {
                    let elem = self.current.emit_gep(&IrType::I8, &lv, &[(IrType::I32, rv)]);
                    let byte = self.current.emit_load(&elem, &IrType::I8);
                    Ok((byte, Type::Byte))
                }
                Type::List(inner) => {
                    let elem_ty = crate::ir::types::lower(inner);
                    let elem = self.current.emit_gep(&elem_ty, &lv, &[(IrType::I32, rv)]);
                    let loaded = self.current.emit_load(&elem, &elem_ty);
                    Ok((loaded, (**inner).clone()))
                }
                _ => Err(self.runtime_error("cannot index this value", node)),
            },
        }
    }

    fn visit_comparison(
        &mut self,
        op: BinOpKind,
        lv: Value,
        lt: &Type,
        rv: Value,
        rt: &Type,
        node: &Node,
    ) -> Result<(Value, Type), Diagnostic> {
        if lt != rt {
            return Err(self.err(ErrorKind::TypeError, format!("cannot compare {} and {}", lt, rt), node));
        }
        let value = match lt {
            Type::Int | Type::Byte => {
                let pred = match op {
                    BinOpKind::Eq => "eq",
                    BinOpKind::NotEq => "ne",
                    BinOpKind::Lt => "slt",
                    BinOpKind::Gt => "sgt",
                    BinOpKind::Le => "sle",
                    BinOpKind::Ge => "sge",
                    _ => unreachable!(),
                };
                self.current.emit_icmp(pred, &lv, &rv)
            }
            Type::Float => {
                let pred = match op {
                    BinOpKind::Eq => "oeq",
                    BinOpKind::NotEq => "one",
                    BinOpKind::Lt => "olt",
                    BinOpKind::Gt => "ogt",
                    BinOpKind::Le => "ole",
                    BinOpKind::Ge => "oge",
                    _ => unreachable!(),
                };
                self.current.emit_fcmp(pred, &lv, &rv)
            }
            Type::Bool if matches!(op, BinOpKind::Eq | BinOpKind::NotEq) => {
                let pred = if op == BinOpKind::Eq { "eq" } else { "ne" };
                self.current.emit_icmp(pred, &lv, &rv)
            }
            _ => return Err(self.runtime_error(format!("cannot compare two {} values", lt), node)),
        };
        Ok((value, Type::Bool))
    }

    pub(super) fn visit_unaryop(&mut self, op: UnaryOpKind, operand: &Node, node: &Node) -> Result<(Value, Type), Diagnostic> {
        let (v, ty) = self.expect_value(operand)?;
        match op {
            UnaryOpKind::Not => match ty {
                Type::Bool => Ok((self.current.emit_not_bool(&v), Type::Bool)),
                Type::Int => Ok((self.current.emit_not_int(&v), Type::Int)),
                _ => Err(self.err(ErrorKind::TypeError, format!("cannot use '!' on {}", ty), node)),
            },
            UnaryOpKind::Minus => match ty {
                Type::Int => Ok((self.current.emit_neg_int(&v), Type::Int)),
                Type::Float => Ok((self.current.emit_neg_float(&v), Type::Float)),
                _ => Err(self.err(ErrorKind::TypeError, format!("unary '-' requires a numeric type, got {}", ty), node)),
            },
            UnaryOpKind::Plus => {
                if ty.is_numeric() {
                    Ok((v, ty))
                } else {
                    Err(self.err(ErrorKind::TypeError, format!("unary '+' requires a numeric type, got {}", ty), node))
                }
            }
        }
    }
}
