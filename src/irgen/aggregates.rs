//! Value construction and storage: string/list literals, struct bodies,
//! `[i]`/`.field` assignment targets, and plain variable bindings.
//!
//! Every binding — a scalar, or the opaque pointer a `str`/`list:T`/struct
//! value already carries — gets one entry-block `alloca` at `lower(ty)` and
//! is read back with a plain `load`. Lists and structs build their own
//! backing storage separately (`visit_list`'s `[N x T]` array, a struct's
//! own `alloca_type`), so the variable slot only ever has to hold the
//! pointer to that storage, never duplicate it.

use crate::ast::{Field, Node, TypeName};
use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::ir::{self, IrType, Value};
use crate::types::Type;

use super::IrGen;

impl<'a> IrGen<'a> {
    /// `\n` is preserved as the original builder materializes it: a literal
    /// newline byte followed by an extra NUL, inside the byte array, not a
    /// single `\n`.
    fn quirk_newlines(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            out.push(c);
            if c == '\n' {
                out.push('\0');
            }
        }
        out
    }

    pub(super) fn visit_string(&mut self, s: &str) -> Result<(Value, Type), Diagnostic> {
        let quirked = Self::quirk_newlines(s);
        let (global, len) = self.module.get_string_global(&quirked);
        let ptr = ir::decay_string_global(&mut self.current, &global, len);
        Ok((ptr, Type::Str))
    }

    pub(super) fn visit_list(&mut self, items: &[Node], node: &Node) -> Result<(Value, Type), Diagnostic> {
        let mut values = Vec::with_capacity(items.len());
        let mut elem_ty: Option<Type> = None;
        for item in items {
            let (v, ty) = self.expect_value(item)?;
            match &elem_ty {
                Some(expected) if *expected != ty => {
                    return Err(self.err(ErrorKind::TypeError, format!("expected {}, got {}", expected, ty), item));
                }
                Some(_) => {}
                None => elem_ty = Some(ty),
            }
            values.push(v);
        }
        let inner = elem_ty.unwrap_or(Type::Int);
        let ir_elem = ir::types::lower(&inner);
        let array_ty = IrType::Array(Box::new(ir_elem.clone()), values.len());
        let array_ptr = self.current.alloca("list", &array_ty);
        for (i, v) in values.into_iter().enumerate() {
            let slot = self.current.emit_gep(
                &array_ty,
                &array_ptr,
                &[(IrType::I32, Value::int(0)), (IrType::I32, Value::int(i as i32))],
            );
            self.current.emit_store(&v, &slot, &ir_elem);
        }
        let decayed = self.current.emit_gep(
            &array_ty,
            &array_ptr,
            &[(IrType::I32, Value::int(0)), (IrType::I32, Value::int(0))],
        );
        let _ = node;
        Ok((decayed, Type::List(Box::new(inner))))
    }

    pub(super) fn visit_var_assign(
        &mut self,
        name: &str,
        type_name: &Option<TypeName>,
        value: &Node,
        _node: &Node,
    ) -> Result<(), Diagnostic> {
        let (v, ty) = self.expect_value(value)?;
        match type_name {
            Some(_) => {
                let ir_ty = ir::types::lower(&ty);
                let slot = self.current.alloca(name, &ir_ty);
                self.current.emit_store(&v, &slot, &ir_ty);
                self.env.define(name.to_string(), (slot, ty));
            }
            None => match self.env.lookup(name).cloned() {
                Some((slot, existing_ty)) => {
                    let ir_ty = ir::types::lower(&existing_ty);
                    self.current.emit_store(&v, &slot, &ir_ty);
                }
                None => {
                    let ir_ty = ir::types::lower(&ty);
                    let slot = self.current.alloca(name, &ir_ty);
                    self.current.emit_store(&v, &slot, &ir_ty);
                    self.env.define(name.to_string(), (slot, ty));
                }
            },
        }
        Ok(())
    }

    /// Methods share the flat function namespace and are lowered exactly
    /// like top-level `FunDef`s; the struct's own type was already declared
    /// from the analyser's table when the module was built.
    pub(super) fn visit_struct_def(&mut self, _name: &str, _fields: &[Field], methods: &[Node], _node: &Node) -> Result<(), Diagnostic> {
        for method in methods {
            self.visit(method)?;
        }
        Ok(())
    }

    pub(super) fn visit_struct_assign(&mut self, target: &Node, field: &str, value: &Node, node: &Node) -> Result<(), Diagnostic> {
        let (obj_ptr, obj_ty) = self.expect_value(target)?;
        let struct_name = match &obj_ty {
            Type::Struct(name) => name.clone(),
            other => return Err(self.err(ErrorKind::TypeError, format!("{} is not a struct", other), target)),
        };
        let meta = self
            .structs
            .get(&struct_name)
            .cloned()
            .ok_or_else(|| self.err(ErrorKind::IndexError, format!("unknown struct '{}'", struct_name), node))?;
        let info = meta
            .field(field)
            .cloned()
            .ok_or_else(|| self.err(ErrorKind::IndexError, format!("{} has no field '{}'", struct_name, field), node))?;
        let (v, _) = self.expect_value(value)?;
        let field_ty = ir::types::lower(&info.ty);
        let slot = self.current.emit_gep(
            &IrType::Struct(struct_name),
            &obj_ptr,
            &[(IrType::I32, Value::int(0)), (IrType::I32, Value::int(info.index as i32))],
        );
        self.current.emit_store(&v, &slot, &field_ty);
        Ok(())
    }

    pub(super) fn visit_struct_read(&mut self, target: &Node, field: &str, node: &Node) -> Result<(Value, Type), Diagnostic> {
        let (obj_ptr, obj_ty) = self.expect_value(target)?;
        let struct_name = match &obj_ty {
            Type::Struct(name) => name.clone(),
            other => return Err(self.err(ErrorKind::TypeError, format!("{} is not a struct", other), target)),
        };
        let meta = self
            .structs
            .get(&struct_name)
            .cloned()
            .ok_or_else(|| self.err(ErrorKind::IndexError, format!("unknown struct '{}'", struct_name), node))?;
        let info = meta
            .field(field)
            .cloned()
            .ok_or_else(|| self.err(ErrorKind::IndexError, format!("{} has no field '{}'", struct_name, field), node))?;
        let field_ty = ir::types::lower(&info.ty);
        let slot = self.current.emit_gep(
            &IrType::Struct(struct_name),
            &obj_ptr,
            &[(IrType::I32, Value::int(0)), (IrType::I32, Value::int(info.index as i32))],
        );
        let loaded = self.current.emit_load(&slot, &field_ty);
        Ok((loaded, info.ty))
    }

    pub(super) fn visit_list_assign(&mut self, list: &Node, index: &Node, value: &Node, node: &Node) -> Result<(), Diagnostic> {
        let (list_ptr, list_ty) = self.expect_value(list)?;
        let inner = match &list_ty {
            Type::List(inner) => (**inner).clone(),
            other => return Err(self.err(ErrorKind::TypeError, format!("{} is not a list", other), list)),
        };
        let (idx_v, idx_ty) = self.expect_value(index)?;
        if idx_ty != Type::Int {
            return Err(self.err(ErrorKind::TypeError, format!("cannot index with {}", idx_ty), index));
        }
        let (v, value_ty) = self.expect_value(value)?;
        if value_ty != inner {
            return Err(self.err(ErrorKind::TypeError, format!("expected {}, got {}", inner, value_ty), node));
        }
        let elem_ty = ir::types::lower(&inner);
        let slot = self.current.emit_gep(&elem_ty, &list_ptr, &[(IrType::I32, idx_v)]);
        self.current.emit_store(&v, &slot, &elem_ty);
        Ok(())
    }
}
