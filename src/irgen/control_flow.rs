//! `IF`/`WHILE`/`FOR`/`BREAK`/`CONTINUE` block wiring.
//!
//! No phi nodes: every loop/branch-local binding already lives behind an
//! `alloca`, so merging control flow is just jumping to a shared label and
//! reading the slot again — `breaks`/`continues` only need to remember block
//! labels, not live values.

use crate::ast::Node;
use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::ir;
use crate::types::Type;

use super::IrGen;

impl<'a> IrGen<'a> {
    pub(super) fn visit_if(&mut self, condition: &Node, then_branch: &Node, else_branch: Option<&Node>) -> Result<(), Diagnostic> {
        let (cond_v, cond_ty) = self.expect_value(condition)?;
        if cond_ty != Type::Bool {
            return Err(self.err(ErrorKind::TypeError, format!("expected bool, got {}", cond_ty), condition));
        }
        let then_label = self.current.fresh_label("if.then");
        let end_label = self.current.fresh_label("if.end");
        let else_label = if else_branch.is_some() {
            self.current.fresh_label("if.else")
        } else {
            end_label.clone()
        };
        self.current.emit_cbr(&cond_v, &then_label, &else_label);

        self.current.open_block(&then_label);
        self.with_child_scope("if", |a| a.visit(then_branch).map(|_| ()))?;
        if !self.current.terminated {
            self.current.emit_br(&end_label);
        }

        if let Some(else_branch) = else_branch {
            self.current.open_block(&else_label);
            self.with_child_scope("else", |a| a.visit(else_branch).map(|_| ()))?;
            if !self.current.terminated {
                self.current.emit_br(&end_label);
            }
        }

        self.current.open_block(&end_label);
        Ok(())
    }

    pub(super) fn visit_while(&mut self, condition: &Node, body: &Node) -> Result<(), Diagnostic> {
        let cond_label = self.current.fresh_label("while.cond");
        let body_label = self.current.fresh_label("while.body");
        let end_label = self.current.fresh_label("while.end");

        self.current.emit_br(&cond_label);
        self.current.open_block(&cond_label);
        let (cond_v, cond_ty) = self.expect_value(condition)?;
        if cond_ty != Type::Bool {
            return Err(self.err(ErrorKind::TypeError, format!("expected bool, got {}", cond_ty), condition));
        }
        self.current.emit_cbr(&cond_v, &body_label, &end_label);

        self.current.open_block(&body_label);
        self.breaks.push(end_label.clone());
        self.continues.push(cond_label.clone());
        let result = self.with_child_scope("while", |a| a.visit(body).map(|_| ()));
        self.breaks.pop();
        self.continues.pop();
        result?;
        if !self.current.terminated {
            self.current.emit_br(&cond_label);
        }

        self.current.open_block(&end_label);
        Ok(())
    }

    pub(super) fn visit_for(
        &mut self,
        var_name: &str,
        from: &Node,
        to: &Node,
        step: Option<&Node>,
        body: &Node,
    ) -> Result<(), Diagnostic> {
        let (from_v, from_ty) = self.expect_value(from)?;
        let (to_v, to_ty) = self.expect_value(to)?;
        let (step_v, step_ty) = match step {
            Some(s) => self.expect_value(s)?,
            None => (crate::ir::Value::int(1), Type::Int),
        };
        if !from_ty.is_numeric() || from_ty != to_ty || from_ty != step_ty {
            return Err(self.err(
                ErrorKind::TypeError,
                format!(
                    "for-loop bounds must share one numeric type, got {}, {}, {}",
                    from_ty, to_ty, step_ty
                ),
                from,
            ));
        }

        let ir_ty = ir::types::lower(&from_ty);
        let slot = self.current.alloca(var_name, &ir_ty);
        self.current.emit_store(&from_v, &slot, &ir_ty);

        let cond_label = self.current.fresh_label("for.cond");
        let body_label = self.current.fresh_label("for.body");
        let inc_label = self.current.fresh_label("for.inc");
        let exit_label = self.current.fresh_label("for.exit");

        self.current.emit_br(&cond_label);
        self.current.open_block(&cond_label);
        let current = self.current.emit_load(&slot, &ir_ty);
        let cond_v = if from_ty == Type::Float {
            self.current.emit_fcmp("olt", &current, &to_v)
        } else {
            self.current.emit_icmp("slt", &current, &to_v)
        };
        self.current.emit_cbr(&cond_v, &body_label, &exit_label);

        self.current.open_block(&body_label);
        self.breaks.push(exit_label.clone());
        self.continues.push(inc_label.clone());
        let result = self.with_child_scope("for", |a| {
            a.env.define(var_name.to_string(), (slot.clone(), from_ty.clone()));
            a.visit(body).map(|_| ())
        });
        self.breaks.pop();
        self.continues.pop();
        result?;
        if !self.current.terminated {
            self.current.emit_br(&inc_label);
        }

        self.current.open_block(&inc_label);
        let current = self.current.emit_load(&slot, &ir_ty);
        let next = if from_ty == Type::Float {
            self.current.emit_float_binop("fadd", &current, &step_v)
        } else {
            self.current.emit_int_binop("add", &current, &step_v)
        };
        self.current.emit_store(&next, &slot, &ir_ty);
        self.current.emit_br(&cond_label);

        self.current.open_block(&exit_label);
        Ok(())
    }

    /// `loop_depth` already guards this in `semantic.rs`; this stays a
    /// defensive backstop for a `break` outside any `breaks` frame.
    pub(super) fn visit_break(&mut self, node: &Node) -> Result<(), Diagnostic> {
        match self.breaks.last().cloned() {
            Some(label) => {
                self.current.emit_br(&label);
                Ok(())
            }
            None => Err(self.err(ErrorKind::InvalidSyntax, "'break' outside of a loop", node)),
        }
    }

    pub(super) fn visit_continue(&mut self, node: &Node) -> Result<(), Diagnostic> {
        match self.continues.last().cloned() {
            Some(label) => {
                self.current.emit_br(&label);
                Ok(())
            }
            None => Err(self.err(ErrorKind::InvalidSyntax, "'continue' outside of a loop", node)),
        }
    }
}
