//! Name resolution and type checking over the parsed AST.
//!
//! Two passes over the top level: `prepass` registers every struct and
//! function signature (supporting forward reference and recursion, and
//! catching `DuplicateName` before any body is checked), then `check` walks
//! the tree proper, threading a typed `Environment` through nested scopes.

use std::collections::{HashMap, HashSet};

use crate::ast::{BinOpKind, Field, Node, NodeKind, NumberLit, Param, TypeName, UnaryOpKind};
use crate::diagnostic::{Context, Diagnostic, ErrorKind, Stage};
use crate::env::Environment;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::types::{FunctionSig, StructMetadata, Type};

/// Reads the text of an imported module by name. The core only needs
/// `name → text`; path resolution (extensions, include directories) is the
/// loader's business.
pub trait SourceLoader {
    fn load(&self, name: &str) -> Result<String, Diagnostic>;
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub funcs: HashMap<String, FunctionSig>,
    pub structs: HashMap<String, StructMetadata>,
}

pub struct Analyser<'a> {
    context: Context,
    env: Environment<Type>,
    funcs: HashMap<String, FunctionSig>,
    structs: HashMap<String, StructMetadata>,
    current_return_type: Type,
    loop_depth: u32,
    imported: HashSet<String>,
    loader: &'a dyn SourceLoader,
}

impl<'a> Analyser<'a> {
    pub fn new(context: Context, loader: &'a dyn SourceLoader) -> Analyser<'a> {
        let mut env = Environment::new("root");
        env.define("true", Type::Bool);
        env.define("false", Type::Bool);
        Analyser {
            context,
            env,
            funcs: HashMap::new(),
            structs: HashMap::new(),
            current_return_type: Type::Null,
            loop_depth: 0,
            imported: HashSet::new(),
            loader,
        }
    }

    pub fn analyse(mut self, root: &Node) -> Result<AnalysisResult, Diagnostic> {
        self.prepass(root)?;
        self.check(root)?;
        Ok(AnalysisResult {
            funcs: self.funcs,
            structs: self.structs,
        })
    }

    fn err(&self, kind: ErrorKind, details: impl Into<String>, node: &Node) -> Diagnostic {
        Diagnostic::new(
            kind,
            details,
            Some(node.position),
            self.context.clone(),
            Stage::SemanticAnalysis,
        )
    }

    fn resolve_type(&self, name: &TypeName, node: &Node) -> Result<Type, Diagnostic> {
        Type::resolve(name, &self.structs)
            .ok_or_else(|| self.err(ErrorKind::TypeError, format!("unknown type '{:?}'", name), node))
    }

    fn resolve_return(&self, rt: &Option<TypeName>, node: &Node) -> Result<Type, Diagnostic> {
        match rt {
            Some(t) => self.resolve_type(t, node),
            None => Ok(Type::Null),
        }
    }

    fn resolve_params(&self, params: &[Param], node: &Node) -> Result<Vec<Type>, Diagnostic> {
        params.iter().map(|p| self.resolve_type(&p.type_name, node)).collect()
    }

    // ---- pass 1: declarations ----------------------------------------

    fn prepass(&mut self, node: &Node) -> Result<(), Diagnostic> {
        match &node.kind {
            NodeKind::Statements(stmts) => {
                for s in stmts {
                    self.prepass(s)?;
                }
                Ok(())
            }
            NodeKind::FunDef {
                name,
                params,
                return_type,
                ..
            } => self.declare_fun(name, params, return_type, node),
            NodeKind::StructDef {
                name,
                fields,
                methods,
            } => self.declare_struct(name, fields, methods, node),
            _ => Ok(()),
        }
    }

    fn declare_fun(
        &mut self,
        name: &str,
        params: &[Param],
        return_type: &Option<TypeName>,
        node: &Node,
    ) -> Result<(), Diagnostic> {
        if self.funcs.contains_key(name) {
            return Err(self.err(
                ErrorKind::DuplicateName,
                format!("function '{}' is already defined", name),
                node,
            ));
        }
        let param_types = self.resolve_params(params, node)?;
        let ret = self.resolve_return(return_type, node)?;
        self.funcs.insert(name.to_string(), FunctionSig::new(param_types, ret));
        Ok(())
    }

    fn declare_struct(
        &mut self,
        name: &str,
        fields: &[Field],
        methods: &[Node],
        node: &Node,
    ) -> Result<(), Diagnostic> {
        if self.structs.contains_key(name) {
            return Err(self.err(
                ErrorKind::DuplicateName,
                format!("struct '{}' is already defined", name),
                node,
            ));
        }
        let mut meta = StructMetadata::new(name);
        for field in fields {
            let ty = self.resolve_type(&field.type_name, node)?;
            meta.push_field(field.name.clone(), ty);
        }
        self.structs.insert(name.to_string(), meta);
        for method in methods {
            if let NodeKind::FunDef {
                name: mname,
                params,
                return_type,
                ..
            } = &method.kind
            {
                self.declare_fun(mname, params, return_type, method)?;
            }
        }
        Ok(())
    }

    // ---- pass 2: checking ---------------------------------------------

    /// `Some(ty)` for expression-shaped nodes, `None` for statement-shaped
    /// ones (control flow, declarations, `pass`, ...).
    fn check(&mut self, node: &Node) -> Result<Option<Type>, Diagnostic> {
        match &node.kind {
            NodeKind::Number(NumberLit::Int(_)) => Ok(Some(Type::Int)),
            NodeKind::Number(NumberLit::Float(_)) => Ok(Some(Type::Float)),
            NodeKind::String(_) => Ok(Some(Type::Str)),
            NodeKind::List(items) => self.check_list(items, node).map(Some),
            NodeKind::BinOp { left, op, right } => self.check_binop(left, *op, right, node).map(Some),
            NodeKind::UnaryOp { op, operand } => self.check_unary(*op, operand, node).map(Some),
            NodeKind::VarAccess { name } => self.check_var_access(name, node).map(Some),
            NodeKind::VarAssign {
                name,
                type_name,
                value,
            } => self.check_var_assign(name, type_name, value, node).map(|()| None),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => self
                .check_if(condition, then_branch, else_branch.as_deref())
                .map(|()| None),
            NodeKind::While { condition, body } => self.check_while(condition, body).map(|()| None),
            NodeKind::For {
                var_name,
                from,
                to,
                step,
                body,
            } => self
                .check_for(var_name, from, to, step.as_deref(), body)
                .map(|()| None),
            NodeKind::FunCall { name, args } => self.check_fun_call(name, args, node).map(Some),
            NodeKind::FunDef {
                params,
                return_type,
                body,
                ..
            } => self.check_fun_def(params, return_type, body, node).map(|()| None),
            NodeKind::Statements(stmts) => {
                for s in stmts {
                    self.check(s)?;
                }
                Ok(None)
            }
            NodeKind::ListAssign { list, index, value } => {
                self.check_list_assign(list, index, value, node).map(|()| None)
            }
            NodeKind::StructDef { methods, .. } => {
                for m in methods {
                    self.check(m)?;
                }
                Ok(None)
            }
            NodeKind::StructAssign { target, field, value } => {
                self.check_struct_assign(target, field, value, node).map(|()| None)
            }
            NodeKind::StructRead { target, field } => {
                self.check_struct_read(target, field, node).map(Some)
            }
            NodeKind::Import { name } => self.check_import(name, node).map(|()| None),
            NodeKind::Pass => Ok(None),
            NodeKind::Return(value) => self.check_return(value.as_deref(), node).map(|()| None),
            NodeKind::Break => self.check_loop_jump("break", node).map(|()| None),
            NodeKind::Continue => self.check_loop_jump("continue", node).map(|()| None),
        }
    }

    fn expect_expr(&mut self, node: &Node) -> Result<Type, Diagnostic> {
        self.check(node)?
            .ok_or_else(|| self.err(ErrorKind::TypeError, "expected an expression, got a statement", node))
    }

    fn check_list(&mut self, items: &[Node], node: &Node) -> Result<Type, Diagnostic> {
        if items.is_empty() {
            return Ok(Type::List(Box::new(Type::Int)));
        }
        let elem_type = self.expect_expr(&items[0])?;
        for item in &items[1..] {
            let ty = self.expect_expr(item)?;
            if ty != elem_type {
                return Err(self.err(
                    ErrorKind::TypeError,
                    format!("expected {}, got {}", elem_type, ty),
                    item,
                ));
            }
        }
        Ok(Type::List(Box::new(elem_type)))
    }

    fn check_binop(
        &mut self,
        left: &Node,
        op: BinOpKind,
        right: &Node,
        node: &Node,
    ) -> Result<Type, Diagnostic> {
        let lt = self.expect_expr(left)?;
        let rt = self.expect_expr(right)?;

        let mismatch = |analyser: &Self| {
            analyser.err(
                ErrorKind::TypeError,
                format!("no operator {:?} for {} and {}", op, lt, rt),
                node,
            )
        };

        match op {
            BinOpKind::Add => {
                if let Some(ty) = numeric_widen(&lt, &rt) {
                    return Ok(ty);
                }
                if lt == Type::Str && rt == Type::Str {
                    return Ok(Type::Str);
                }
                Err(mismatch(self))
            }
            BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Mod => {
                numeric_widen(&lt, &rt).ok_or_else(|| mismatch(self))
            }
            BinOpKind::Pow => {
                if lt == Type::Int && rt == Type::Int {
                    return Err(self.err(
                        ErrorKind::TypeError,
                        "'^' on two ints is not supported; use float operands",
                        node,
                    ));
                }
                numeric_widen(&lt, &rt).ok_or_else(|| mismatch(self))
            }
            BinOpKind::Eq | BinOpKind::NotEq | BinOpKind::Lt | BinOpKind::Gt | BinOpKind::Le | BinOpKind::Ge => {
                if lt != rt {
                    return Err(self.err(
                        ErrorKind::TypeError,
                        format!("cannot compare {} and {}", lt, rt),
                        node,
                    ));
                }
                Ok(Type::Bool)
            }
            BinOpKind::And | BinOpKind::Or | BinOpKind::Xor => {
                if lt != rt || !matches!(lt, Type::Bool | Type::Int) {
                    return Err(self.err(
                        ErrorKind::TypeError,
                        format!("cannot operate on {} and {}", lt, rt),
                        node,
                    ));
                }
                Ok(lt)
            }
            BinOpKind::Get => {
                if rt != Type::Int {
                    return Err(self.err(ErrorKind::TypeError, "cannot index with a non-int value", node));
                }
                match &lt {
                    Type::Str => Ok(Type::Byte),
                    Type::List(inner) => Ok((**inner).clone()),
                    _ => Err(self.err(ErrorKind::TypeError, "cannot index a non-list, non-str value", node)),
                }
            }
        }
    }

    fn check_unary(&mut self, op: UnaryOpKind, operand: &Node, node: &Node) -> Result<Type, Diagnostic> {
        let ty = self.expect_expr(operand)?;
        match op {
            UnaryOpKind::Not => {
                if matches!(ty, Type::Bool | Type::Int) {
                    Ok(ty)
                } else {
                    Err(self.err(ErrorKind::TypeError, format!("cannot use '!' on {}", ty), node))
                }
            }
            UnaryOpKind::Plus | UnaryOpKind::Minus => {
                if ty.is_numeric() {
                    Ok(ty)
                } else {
                    Err(self.err(ErrorKind::TypeError, format!("unary +/- requires a numeric type, got {}", ty), node))
                }
            }
        }
    }

    fn check_var_access(&self, name: &str, node: &Node) -> Result<Type, Diagnostic> {
        self.env
            .lookup(name)
            .cloned()
            .ok_or_else(|| self.err(ErrorKind::NoSuchVar, format!("'{}' is not defined", name), node))
    }

    fn check_var_assign(
        &mut self,
        name: &str,
        type_name: &Option<TypeName>,
        value: &Node,
        node: &Node,
    ) -> Result<(), Diagnostic> {
        let value_type = self.expect_expr(value)?;
        match type_name {
            Some(t) => {
                let declared = self.resolve_type(t, node)?;
                if declared != value_type {
                    return Err(self.err(
                        ErrorKind::TypeError,
                        format!("expected {}, got {}", declared, value_type),
                        node,
                    ));
                }
                self.env.define(name, declared);
            }
            None => match self.env.lookup(name) {
                None => {
                    self.env.define(name, value_type);
                }
                Some(existing) if *existing != value_type => {
                    return Err(self.err(
                        ErrorKind::TypeError,
                        format!("expected {}, got {}", existing, value_type),
                        node,
                    ))
                }
                Some(_) => {}
            },
        }
        Ok(())
    }

    fn check_if(
        &mut self,
        condition: &Node,
        then_branch: &Node,
        else_branch: Option<&Node>,
    ) -> Result<(), Diagnostic> {
        let cond_type = self.expect_expr(condition)?;
        if cond_type != Type::Bool {
            return Err(self.err(ErrorKind::TypeError, format!("expected bool, got {}", cond_type), condition));
        }
        self.with_child_scope("if", |a| a.check(then_branch).map(|_| ()))?;
        if let Some(else_branch) = else_branch {
            self.with_child_scope("else", |a| a.check(else_branch).map(|_| ()))?;
        }
        Ok(())
    }

    fn check_while(&mut self, condition: &Node, body: &Node) -> Result<(), Diagnostic> {
        let cond_type = self.expect_expr(condition)?;
        if cond_type != Type::Bool {
            return Err(self.err(ErrorKind::TypeError, format!("expected bool, got {}", cond_type), condition));
        }
        self.loop_depth += 1;
        let result = self.with_child_scope("while", |a| a.check(body).map(|_| ()));
        self.loop_depth -= 1;
        result
    }

    fn check_for(
        &mut self,
        var_name: &str,
        from: &Node,
        to: &Node,
        step: Option<&Node>,
        body: &Node,
    ) -> Result<(), Diagnostic> {
        let from_type = self.expect_expr(from)?;
        let to_type = self.expect_expr(to)?;
        let step_type = match step {
            Some(s) => self.expect_expr(s)?,
            None => Type::Int,
        };
        if !from_type.is_numeric() || from_type != to_type || from_type != step_type {
            return Err(self.err(
                ErrorKind::TypeError,
                format!(
                    "for-loop bounds must share one numeric type, got {}, {}, {}",
                    from_type, to_type, step_type
                ),
                from,
            ));
        }
        self.loop_depth += 1;
        let result = self.with_child_scope("for", |a| {
            a.env.define(var_name, from_type.clone());
            a.check(body).map(|_| ())
        });
        self.loop_depth -= 1;
        result
    }

    fn check_fun_call(&mut self, name: &str, args: &[Node], node: &Node) -> Result<Type, Diagnostic> {
        if name == "print" {
            if args.is_empty() {
                return Err(self.err(ErrorKind::InvalidSyntax, "'print' requires at least one argument", node));
            }
            for a in args {
                self.expect_expr(a)?;
            }
            return Ok(Type::Null);
        }

        if let Some(meta) = self.structs.get(name).cloned() {
            return self.check_struct_construct(&meta, args, node);
        }

        let sig = self
            .funcs
            .get(name)
            .cloned()
            .ok_or_else(|| self.err(ErrorKind::NoSuchVar, format!("function '{}' is not defined", name), node))?;
        if sig.params.len() != args.len() {
            return Err(self.err(
                ErrorKind::TypeError,
                format!(
                    "function '{}' expected {} arguments, got {}",
                    name,
                    sig.params.len(),
                    args.len()
                ),
                node,
            ));
        }
        for (i, (arg, expected)) in args.iter().zip(sig.params.iter()).enumerate() {
            let actual = self.expect_expr(arg)?;
            if actual != *expected {
                return Err(self.err(
                    ErrorKind::TypeError,
                    format!("function '{}' expected {} for argument {}, got {}", name, expected, i, actual),
                    arg,
                ));
            }
        }
        Ok(sig.return_type)
    }

    /// `Point(3, 4)` parses as an ordinary `FunCall` (the parser has no
    /// distinct construction syntax); a call whose name is a declared struct
    /// builds one, positionally, in field-declaration order.
    fn check_struct_construct(&mut self, meta: &StructMetadata, args: &[Node], node: &Node) -> Result<Type, Diagnostic> {
        let field_names: Vec<&str> = meta.field_names().collect();
        if field_names.len() != args.len() {
            return Err(self.err(
                ErrorKind::TypeError,
                format!(
                    "struct '{}' expected {} arguments, got {}",
                    meta.name,
                    field_names.len(),
                    args.len()
                ),
                node,
            ));
        }
        for (arg, fname) in args.iter().zip(field_names.iter()) {
            let actual = self.expect_expr(arg)?;
            let expected = meta.field(fname).expect("field_names yields known fields").ty.clone();
            if actual != expected {
                return Err(self.err(
                    ErrorKind::TypeError,
                    format!("struct '{}' field '{}' expected {}, got {}", meta.name, fname, expected, actual),
                    arg,
                ));
            }
        }
        Ok(Type::Struct(meta.name.clone()))
    }

    fn check_fun_def(
        &mut self,
        params: &[Param],
        return_type: &Option<TypeName>,
        body: &Node,
        node: &Node,
    ) -> Result<(), Diagnostic> {
        let param_types = self.resolve_params(params, node)?;
        let ret = self.resolve_return(return_type, node)?;
        let saved_return = std::mem::replace(&mut self.current_return_type, ret);
        let result = self.with_child_scope("fun", |a| {
            for (p, ty) in params.iter().zip(param_types.iter()) {
                a.env.define(p.name.clone(), ty.clone());
            }
            a.check(body).map(|_| ())
        });
        self.current_return_type = saved_return;
        result
    }

    fn check_list_assign(&mut self, list: &Node, index: &Node, value: &Node, node: &Node) -> Result<(), Diagnostic> {
        let list_type = self.expect_expr(list)?;
        let elem = match &list_type {
            Type::List(inner) => (**inner).clone(),
            _ => return Err(self.err(ErrorKind::TypeError, "cannot index a non-list value", list)),
        };
        let index_type = self.expect_expr(index)?;
        if index_type != Type::Int {
            return Err(self.err(ErrorKind::TypeError, format!("cannot index with {}", index_type), index));
        }
        let value_type = self.expect_expr(value)?;
        if value_type != elem {
            return Err(self.err(ErrorKind::TypeError, format!("expected {}, got {}", elem, value_type), node));
        }
        Ok(())
    }

    fn check_struct_assign(&mut self, target: &Node, field: &str, value: &Node, node: &Node) -> Result<(), Diagnostic> {
        let obj_type = self.expect_expr(target)?;
        let struct_name = match &obj_type {
            Type::Struct(name) => name.clone(),
            other => return Err(self.err(ErrorKind::TypeError, format!("{} is not a struct", other), target)),
        };
        let field_type = self
            .structs
            .get(&struct_name)
            .and_then(|m| m.field(field))
            .map(|f| f.ty.clone())
            .ok_or_else(|| {
                self.err(
                    ErrorKind::NoSuchVar,
                    format!("{} has no field '{}'", struct_name, field),
                    node,
                )
            })?;
        let value_type = self.expect_expr(value)?;
        if value_type != field_type {
            return Err(self.err(
                ErrorKind::TypeError,
                format!("expected {} for field '{}', got {}", field_type, field, value_type),
                node,
            ));
        }
        Ok(())
    }

    fn check_struct_read(&mut self, target: &Node, field: &str, node: &Node) -> Result<Type, Diagnostic> {
        let obj_type = self.expect_expr(target)?;
        let struct_name = match &obj_type {
            Type::Struct(name) => name.clone(),
            other => return Err(self.err(ErrorKind::TypeError, format!("{} is not a struct", other), target)),
        };
        self.structs
            .get(&struct_name)
            .and_then(|m| m.field(field))
            .map(|f| f.ty.clone())
            .ok_or_else(|| {
                self.err(
                    ErrorKind::NoSuchVar,
                    format!("{} has no field '{}'", struct_name, field),
                    node,
                )
            })
    }

    fn check_import(&mut self, name: &str, node: &Node) -> Result<(), Diagnostic> {
        if !self.imported.insert(name.to_string()) {
            return Ok(());
        }
        let text = self.loader.load(name)?;
        let saved_context = self.context.clone();
        self.context = self.context.push(format!("<import:{}>", name), self.context.file().clone());

        let tokens = Lexer::new(&text, self.context.clone()).tokenize();
        let result = tokens.and_then(|tokens| Parser::new(tokens, self.context.clone()).parse());
        let ast = match result {
            Ok(ast) => ast,
            Err(e) => {
                self.context = saved_context;
                return Err(e);
            }
        };

        self.prepass(&ast)?;
        self.check(&ast)?;
        self.context = saved_context;
        Ok(())
    }

    fn check_return(&mut self, value: Option<&Node>, node: &Node) -> Result<(), Diagnostic> {
        let ret_type = match value {
            Some(v) => self.expect_expr(v)?,
            None => Type::Null,
        };
        if ret_type != self.current_return_type {
            return Err(self.err(
                ErrorKind::TypeError,
                format!("expected {} as return type, got {}", self.current_return_type, ret_type),
                node,
            ));
        }
        Ok(())
    }

    fn check_loop_jump(&self, what: &str, node: &Node) -> Result<(), Diagnostic> {
        if self.loop_depth == 0 {
            return Err(self.err(
                ErrorKind::InvalidSyntax,
                format!("'{}' outside of a loop", what),
                node,
            ));
        }
        Ok(())
    }

    fn with_child_scope<R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Self) -> Result<R, Diagnostic>,
    ) -> Result<R, Diagnostic> {
        let taken = std::mem::replace(&mut self.env, Environment::new("tmp"));
        self.env = taken.child(name);
        let result = f(self);
        let child = std::mem::replace(&mut self.env, Environment::new("tmp"));
        self.env = child.close();
        result
    }
}

fn numeric_widen(l: &Type, r: &Type) -> Option<Type> {
    match (l, r) {
        (Type::Int, Type::Int) => Some(Type::Int),
        (Type::Float, Type::Float) => Some(Type::Float),
        (Type::Int, Type::Float) | (Type::Float, Type::Int) => Some(Type::Float),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    struct NoImports;
    impl SourceLoader for NoImports {
        fn load(&self, name: &str) -> Result<String, Diagnostic> {
            Err(Diagnostic::new(
                ErrorKind::IoError,
                format!("no loader configured for '{}'", name),
                None,
                Context::root("test.ember"),
                Stage::SemanticAnalysis,
            ))
        }
    }

    fn analyse(src: &str) -> Result<AnalysisResult, Diagnostic> {
        let ctx = Context::root("test.ember");
        let tokens = Lexer::new(src, ctx.clone()).tokenize().unwrap();
        let ast = Parser::new(tokens, ctx.clone()).parse().unwrap();
        let loader = NoImports;
        Analyser::new(ctx, &loader).analyse(&ast)
    }

    #[test]
    fn widening_add_produces_float() {
        assert!(analyse("x: float <- 1 + 2.5").is_ok());
    }

    #[test]
    fn undeclared_variable_is_no_such_var() {
        let err = analyse("return q").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoSuchVar);
    }

    #[test]
    fn type_mismatch_on_declare() {
        let err = analyse("x: int <- 'abc'").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn scope_isolation_after_if() {
        let err = analyse("if true { y: int <- 1 }\nreturn y").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoSuchVar);
    }

    #[test]
    fn shadowing_inner_scope() {
        assert!(analyse("x: int <- 1\nif true { x: float <- 1.5 }").is_ok());
    }

    #[test]
    fn break_outside_loop_is_invalid_syntax() {
        let err = analyse("break").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSyntax);
    }

    #[test]
    fn break_inside_while_is_fine() {
        assert!(analyse("while true { break }").is_ok());
    }

    #[test]
    fn for_loop_requires_matching_numeric_types() {
        let err = analyse("for i <- 1 .. 5.0 { pass }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn duplicate_function_name_is_rejected() {
        let err = analyse("fun f() { pass }\nfun f() { pass }").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
    }

    #[test]
    fn recursive_function_call_resolves() {
        assert!(analyse("fun f(n: int) -> int { return f(n) }").is_ok());
    }

    #[test]
    fn struct_method_sees_self_typed_as_the_struct() {
        assert!(analyse("class P {\nx: int\nfun getX() -> int { return self.x }\n}").is_ok());
    }

    #[test]
    fn struct_constructor_call_checks_field_types_positionally() {
        assert!(analyse("class P {\nx: int\ny: int\n}\np: P <- P(3, 4)").is_ok());
        let err = analyse("class P {\nx: int\ny: int\n}\np: P <- P(3)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        let err = analyse("class P {\nx: int\ny: int\n}\np: P <- P(3, 4.0)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn list_plus_list_is_rejected() {
        let err = analyse("x: list<int> <- [1]\ny: list<int> <- [2]\nreturn x + y").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn int_pow_int_is_rejected() {
        let err = analyse("return 2 ^ 3").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }

    #[test]
    fn float_pow_is_accepted() {
        assert!(analyse("return 2.0 ^ 3.0").is_ok());
    }

    #[test]
    fn get_on_list_returns_element_type() {
        assert!(analyse("xs: list<int> <- [10, 20, 30]\nreturn xs[1]").is_ok());
    }

    /// Table-driven sweep of `check_binop`'s matrix: every accepted
    /// `(op, left, right)` triple must type-check to the stated result type,
    /// and a handful of pairs outside the matrix must each raise `TypeError`.
    #[test]
    fn operator_matrix_accepted_pairs_produce_the_stated_result_type() {
        let accepted = [
            ("+", "1", "2", "int"),
            ("+", "1.5", "2.5", "float"),
            ("+", "1", "2.5", "float"),
            ("+", "1.5", "2", "float"),
            ("+", "'a'", "'b'", "str"),
            ("-", "5", "2", "int"),
            ("-", "5.0", "2.0", "float"),
            ("-", "5", "2.0", "float"),
            ("*", "5", "2", "int"),
            ("*", "5.0", "2.0", "float"),
            ("/", "5", "2", "int"),
            ("/", "5.0", "2.0", "float"),
            ("%", "5", "2", "int"),
            ("%", "5.0", "2.0", "float"),
            ("^", "2.0", "3.0", "float"),
            ("^", "2", "3.0", "float"),
            ("^", "2.0", "3", "float"),
            ("=", "1", "2", "bool"),
            ("=", "'a'", "'b'", "bool"),
            ("=", "true", "false", "bool"),
            ("<>", "1", "2", "bool"),
            ("<", "1", "2", "bool"),
            (">", "1", "2", "bool"),
            ("<=", "1", "2", "bool"),
            (">=", "1", "2", "bool"),
            ("&", "true", "false", "bool"),
            ("&", "1", "0", "int"),
            ("|", "true", "false", "bool"),
            ("|", "1", "0", "int"),
            ("~", "true", "false", "bool"),
            ("~", "1", "0", "int"),
        ];
        for (op, left, right, result_ty) in accepted {
            let src = format!("x: {} <- {} {} {}", result_ty, left, op, right);
            assert!(
                analyse(&src).is_ok(),
                "expected `{}` {} `{}` to type-check as {}, src: {}",
                left,
                op,
                right,
                result_ty,
                src
            );
        }
    }

    #[test]
    fn operator_matrix_rejected_pairs_raise_type_error() {
        let rejected = [
            ("+", "1", "'a'"),
            ("+", "true", "false"),
            ("-", "'a'", "'b'"),
            ("*", "true", "false"),
            ("^", "2", "3"),
            ("=", "1", "'a'"),
            ("=", "1", "true"),
            ("<", "'a'", "1"),
            ("&", "1", "true"),
            ("&", "'a'", "'b'"),
            ("|", "'a'", "'b'"),
        ];
        for (op, left, right) in rejected {
            let src = format!("return {} {} {}", left, op, right);
            let err = analyse(&src).unwrap_err();
            assert_eq!(
                err.kind,
                ErrorKind::TypeError,
                "expected `{}` {} `{}` to be rejected, src: {}",
                left,
                op,
                right,
                src
            );
        }
    }

    #[test]
    fn get_operator_matrix() {
        assert!(analyse("xs: list<int> <- [1, 2]\nreturn xs[0]").is_ok());
        assert!(analyse("s: byte <- 'ab'[0]").is_ok());
        let err = analyse("xs: list<int> <- [1]\nreturn xs['a']").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
        let err = analyse("return true[0]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeError);
    }
}
