//! Function definitions, calls, `print`, struct construction, and `return`.
//!
//! `Point(3, 4)` and a regular function call share one parse shape (the
//! parser never distinguishes them — see `parser.rs`'s `parse_identifier_atom`),
//! so `visit_fun_call` re-derives which one it is the same way the analyser
//! does: a name that names a struct constructs one, otherwise it dispatches
//! through the flat function table.

use crate::ast::{Node, Param, TypeName};
use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::ir::{self, FunctionBuilder, IrType, Value};
use crate::types::{StructMetadata, Type};

use super::IrGen;

impl<'a> IrGen<'a> {
    pub(super) fn visit_fun_call(&mut self, name: &str, args: &[Node], node: &Node) -> Result<(Value, Type), Diagnostic> {
        if name == "print" {
            return self.visit_print(args, node);
        }
        if let Some(meta) = self.structs.get(name).cloned() {
            return self.visit_struct_construct(&meta, args);
        }

        let sig = self
            .funcs
            .get(name)
            .cloned()
            .ok_or_else(|| self.err(ErrorKind::NoSuchVar, format!("function '{}' is not defined", name), node))?;
        let mut call_args = Vec::with_capacity(args.len());
        for arg in args {
            let (v, ty) = self.expect_value(arg)?;
            call_args.push((ir::types::lower(&ty), v));
        }
        if sig.return_type == Type::Null {
            self.current.emit_call_void(name, &call_args);
            Ok((Value::int(0), Type::Null))
        } else {
            let ret_ty = ir::types::lower(&sig.return_type);
            let value = self.current.emit_call(&ret_ty, name, &call_args);
            Ok((value, sig.return_type))
        }
    }

    fn print_format_spec(&self, ty: &Type, node: &Node) -> Result<&'static str, Diagnostic> {
        match ty {
            Type::Int | Type::Bool => Ok("%d"),
            Type::Float => Ok("%f"),
            Type::Byte => Ok("%c"),
            Type::Str => Ok("%s"),
            other => Err(self.err(ErrorKind::RuntimeError, format!("'print' does not support {}", other), node)),
        }
    }

    fn visit_print(&mut self, args: &[Node], node: &Node) -> Result<(Value, Type), Diagnostic> {
        let mut format = String::new();
        let mut call_args = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let (v, ty) = self.expect_value(arg)?;
            let spec = self.print_format_spec(&ty, arg)?;
            if i > 0 {
                format.push(' ');
            }
            format.push_str(spec);
            // `printf`'s varargs promote any narrower-than-`int` integer.
            let (arg_ty, arg_v) = if ty == Type::Bool {
                let zext = self.current.fresh_temp();
                self.current.emit(format!("{} = zext i1 {} to i32", zext, v));
                (IrType::I32, zext)
            } else {
                (ir::types::lower(&ty), v)
            };
            call_args.push((arg_ty, arg_v));
        }
        format.push('\n');
        let (global, len) = self.module.get_string_global(&format);
        let fmt_ptr = ir::decay_string_global(&mut self.current, &global, len);
        let mut full_args = Vec::with_capacity(call_args.len() + 1);
        full_args.push((IrType::Ptr, fmt_ptr));
        full_args.extend(call_args);
        self.current.emit_call_variadic(&IrType::I32, &[IrType::Ptr], "printf", &full_args);
        let _ = node;
        Ok((Value::int(0), Type::Null))
    }

    fn visit_struct_construct(&mut self, meta: &StructMetadata, args: &[Node]) -> Result<(Value, Type), Diagnostic> {
        let struct_ty = IrType::Struct(meta.name.clone());
        let instance = self.current.alloca(&meta.name.to_lowercase(), &struct_ty);
        let field_names: Vec<&str> = meta.field_names().collect();
        for (i, (arg, fname)) in args.iter().zip(field_names.iter()).enumerate() {
            let (v, _) = self.expect_value(arg)?;
            let info = meta.field(fname).expect("field_names yields known fields");
            let field_ty = ir::types::lower(&info.ty);
            let slot = self.current.emit_gep(
                &struct_ty,
                &instance,
                &[(IrType::I32, Value::int(0)), (IrType::I32, Value::int(i as i32))],
            );
            self.current.emit_store(&v, &slot, &field_ty);
        }
        Ok((instance, Type::Struct(meta.name.clone())))
    }

    /// Swap in a fresh `FunctionBuilder` for the callee, lower its body, and
    /// swap the caller's builder back once it's finished — mirroring the
    /// `prev_builder = self.builder; ...; self.builder = prev_builder` shape
    /// the reference builder uses around nested function lowering.
    pub(super) fn visit_fun_def(
        &mut self,
        name: &str,
        params: &[Param],
        _return_type: &Option<TypeName>,
        body: &Node,
        node: &Node,
    ) -> Result<(), Diagnostic> {
        let sig = self
            .funcs
            .get(name)
            .cloned()
            .expect("prepass already registered every FunDef's signature");
        let ir_params: Vec<(String, IrType)> = params
            .iter()
            .zip(sig.params.iter())
            .map(|(p, ty)| (p.name.clone(), ir::types::lower(ty)))
            .collect();
        let ret_ty = ir::types::lower(&sig.return_type);
        let prev_builder = std::mem::replace(&mut self.current, FunctionBuilder::new(name.to_string(), ir_params.clone(), ret_ty));

        let body_result = self.with_child_scope("fun", |gen| {
            for (i, p) in params.iter().enumerate() {
                let ty = sig.params[i].clone();
                let ir_ty = &ir_params[i].1;
                let slot = gen.current.alloca(&p.name, ir_ty);
                gen.current.emit_store(&Value::new(format!("%{}", p.name)), &slot, ir_ty);
                gen.env.define(p.name.clone(), (slot, ty));
            }
            gen.visit(body).map(|_| ())
        });

        let term_result = body_result.and_then(|()| {
            if self.current.terminated {
                Ok(())
            } else if sig.return_type == Type::Null {
                self.current.emit_ret(None);
                Ok(())
            } else {
                Err(self.err(
                    ErrorKind::InvalidSyntax,
                    format!("function '{}' does not return on all paths", name),
                    node,
                ))
            }
        });

        let finished = std::mem::replace(&mut self.current, prev_builder);
        term_result?;
        self.module.add_function(finished)
    }

    pub(super) fn visit_return(&mut self, value: Option<&Node>, _node: &Node) -> Result<(), Diagnostic> {
        match value {
            Some(v) => {
                let (val, ty) = self.expect_value(v)?;
                let ir_ty = ir::types::lower(&ty);
                self.current.emit_ret(Some((&ir_ty, &val)));
            }
            None => self.current.emit_ret(None),
        }
        Ok(())
    }
}
