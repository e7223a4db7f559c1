//! AST → SSA IR lowering.
//!
//! One `IrGen` lowers one entry file (and, inline, every file it
//! transitively imports) into a single `ir::Module`. Top-level code is
//! wrapped in a synthetic `load_<file>` function that returns 0; nested
//! `FunDef`s become their own module-level functions, lowered by swapping
//! in a fresh `FunctionBuilder` and swapping the enclosing one back in once
//! the nested body is done — the same "park the current builder, lower the
//! callee, restore it" shape the reference builder uses around its own
//! `self.builder` field.

mod aggregates;
mod calls;
mod control_flow;
mod imports;
mod operators;

use std::collections::{HashMap, HashSet};

use crate::ast::{Node, NodeKind, NumberLit};
use crate::diagnostic::{Context, Diagnostic, ErrorKind, Stage};
use crate::env::Environment;
use crate::ir::{self, FunctionBuilder, IrType, Module, Value};
use crate::semantic::{AnalysisResult, SourceLoader};
use crate::types::{FunctionSig, StructMetadata, Type};

pub struct IrGen<'a> {
    context: Context,
    module: Module,
    env: Environment<(Value, Type)>,
    funcs: HashMap<String, FunctionSig>,
    structs: HashMap<String, StructMetadata>,
    current: FunctionBuilder,
    breaks: Vec<String>,
    continues: Vec<String>,
    imported: HashSet<String>,
    loader: &'a dyn SourceLoader,
}

/// Sanitized file stem used to name a file's synthetic `load_<file>` entry
/// function; exposed so the driver can call it when emitting a `main` stub
/// around the entry file's module.
pub fn file_symbol(context: &Context) -> String {
    context
        .file()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module")
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

pub fn build(context: Context, root: &Node, analysis: &AnalysisResult, loader: &dyn SourceLoader) -> Result<Module, Diagnostic> {
    let mut gen = IrGen::new(context, analysis, loader);
    gen.run(root)?;
    Ok(gen.module)
}

impl<'a> IrGen<'a> {
    fn new(context: Context, analysis: &AnalysisResult, loader: &'a dyn SourceLoader) -> IrGen<'a> {
        let mut module = Module::new(context.clone());
        module.declare_extern(
            "printf",
            "declare i32 @printf(ptr, ...)",
        );
        module.declare_extern("strlen", "declare i32 @strlen(ptr)");
        module.declare_extern("malloc", "declare ptr @malloc(i32)");
        module.declare_extern("strcpy", "declare ptr @strcpy(ptr, ptr)");
        module.declare_extern("llvm.pow.f64", "declare double @llvm.pow.f64(double, double)");

        for (name, meta) in &analysis.structs {
            let _ = module.declare_struct(name, ir::types::struct_fields(meta));
        }

        let mut env = Environment::new("root");
        env.define("true", (Value::bool(true), Type::Bool));
        env.define("false", (Value::bool(false), Type::Bool));

        let entry_name = format!("load_{}", file_symbol(&context));
        IrGen {
            context,
            module,
            env,
            funcs: analysis.funcs.clone(),
            structs: analysis.structs.clone(),
            current: FunctionBuilder::new(entry_name, Vec::new(), IrType::I32),
            breaks: Vec::new(),
            continues: Vec::new(),
            imported: HashSet::new(),
            loader,
        }
    }

    fn run(&mut self, root: &Node) -> Result<(), Diagnostic> {
        self.visit(root)?;
        if !self.current.terminated {
            self.current.emit_ret(Some((&IrType::I32, &Value::int(0))));
        }
        let finished = std::mem::replace(&mut self.current, FunctionBuilder::new("_unused", Vec::new(), IrType::Void));
        self.module.add_function(finished)
    }

    fn err(&self, kind: ErrorKind, details: impl Into<String>, node: &Node) -> Diagnostic {
        Diagnostic::new(kind, details, Some(node.position), self.context.clone(), Stage::IrBuilding)
    }

    fn with_child_scope<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> Result<R, Diagnostic>) -> Result<R, Diagnostic> {
        let taken = std::mem::replace(&mut self.env, Environment::new("tmp"));
        self.env = taken.child(name);
        let result = f(self);
        let child = std::mem::replace(&mut self.env, Environment::new("tmp"));
        self.env = child.close();
        result
    }

    /// `Some((value, ty))` for expression-shaped nodes, `None` for
    /// statement-shaped ones.
    fn visit(&mut self, node: &Node) -> Result<Option<(Value, Type)>, Diagnostic> {
        match &node.kind {
            NodeKind::Number(NumberLit::Int(n)) => Ok(Some((Value::int(*n), Type::Int))),
            NodeKind::Number(NumberLit::Float(n)) => Ok(Some((Value::float(*n), Type::Float))),
            NodeKind::String(s) => self.visit_string(s).map(Some),
            NodeKind::List(items) => self.visit_list(items, node).map(Some),
            NodeKind::BinOp { left, op, right } => self.visit_binop(left, *op, right, node).map(Some),
            NodeKind::UnaryOp { op, operand } => self.visit_unaryop(*op, operand, node).map(Some),
            NodeKind::VarAccess { name } => self.visit_var_access(name, node).map(Some),
            NodeKind::VarAssign { name, type_name, value } => {
                self.visit_var_assign(name, type_name, value, node).map(|()| None)
            }
            NodeKind::If { condition, then_branch, else_branch } => {
                self.visit_if(condition, then_branch, else_branch.as_deref()).map(|()| None)
            }
            NodeKind::While { condition, body } => self.visit_while(condition, body).map(|()| None),
            NodeKind::For { var_name, from, to, step, body } => {
                self.visit_for(var_name, from, to, step.as_deref(), body).map(|()| None)
            }
            NodeKind::FunCall { name, args } => self.visit_fun_call(name, args, node).map(Some),
            NodeKind::FunDef { name, params, return_type, body } => {
                self.visit_fun_def(name, params, return_type, body, node).map(|()| None)
            }
            NodeKind::Statements(stmts) => {
                for s in stmts {
                    self.visit(s)?;
                }
                Ok(None)
            }
            NodeKind::ListAssign { list, index, value } => self.visit_list_assign(list, index, value, node).map(|()| None),
            NodeKind::StructDef { name, fields, methods } => {
                self.visit_struct_def(name, fields, methods, node).map(|()| None)
            }
            NodeKind::StructAssign { target, field, value } => {
                self.visit_struct_assign(target, field, value, node).map(|()| None)
            }
            NodeKind::StructRead { target, field } => self.visit_struct_read(target, field, node).map(Some),
            NodeKind::Import { name } => self.visit_import(name, node).map(|()| None),
            NodeKind::Pass => {
                let dst = self.current.fresh_temp();
                self.current.emit(format!("{} = add i32 0, 0", dst));
                Ok(None)
            }
            NodeKind::Return(value) => self.visit_return(value.as_deref(), node).map(|()| None),
            NodeKind::Break => self.visit_break(node).map(|()| None),
            NodeKind::Continue => self.visit_continue(node).map(|()| None),
        }
    }

    fn expect_value(&mut self, node: &Node) -> Result<(Value, Type), Diagnostic> {
        self.visit(node)?
            .ok_or_else(|| self.err(ErrorKind::TypeError, "expected an expression, got a statement", node))
    }

    fn lookup(&self, name: &str, node: &Node) -> Result<(Value, Type), Diagnostic> {
        self.env
            .lookup(name)
            .cloned()
            .ok_or_else(|| self.err(ErrorKind::NoSuchVar, format!("'{}' is not defined", name), node))
    }

    fn visit_var_access(&mut self, name: &str, node: &Node) -> Result<(Value, Type), Diagnostic> {
        let (ptr, ty) = self.lookup(name, node)?;
        // `true`/`false` are bound directly as values, not alloca slots.
        if name == "true" || name == "false" {
            return Ok((ptr, ty));
        }
        let ir_ty = ir::types::lower(&ty);
        let loaded = self.current.emit_load(&ptr, &ir_ty);
        Ok((loaded, ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::semantic::Analyser;

    struct NoImports;
    impl SourceLoader for NoImports {
        fn load(&self, name: &str) -> Result<String, Diagnostic> {
            Err(Diagnostic::new(
                ErrorKind::IoError,
                format!("no loader configured for '{}'", name),
                None,
                Context::root("test.ember"),
                Stage::IrBuilding,
            ))
        }
    }

    fn build_ir(src: &str) -> Result<Module, Diagnostic> {
        let ctx = Context::root("test.ember");
        let tokens = Lexer::new(src, ctx.clone()).tokenize().unwrap();
        let ast = Parser::new(tokens, ctx.clone()).parse().unwrap();
        let loader = NoImports;
        let analysis = Analyser::new(ctx.clone(), &loader).analyse(&ast).unwrap();
        build(ctx, &ast, &analysis, &loader)
    }

    #[test]
    fn missing_return_in_non_null_function_is_invalid_syntax() {
        let err = build_ir("fun f() -> int {\npass\n}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidSyntax);
    }

    #[test]
    fn unconditional_return_on_every_path_is_accepted() {
        assert!(build_ir("fun f(n: int) -> int {\nif n > 0 { return 1 } else { return 0 }\n}").is_ok());
    }

    #[test]
    fn void_function_without_a_return_is_accepted() {
        assert!(build_ir("fun f() {\npass\n}").is_ok());
    }

    #[test]
    fn if_lowering_emits_then_else_and_merge_blocks() {
        let module = build_ir("x: int <- 1\nif x > 0 { pass } else { pass }").unwrap();
        let text = module.render();
        assert!(text.contains("if.then"));
        assert!(text.contains("if.else"));
        assert!(text.contains("if.end"));
    }

    #[test]
    fn for_loop_lowering_emits_cond_body_inc_exit_blocks() {
        let module = build_ir("s: int <- 0\nfor i <- 1 .. 5 {\ns <- s + i\n}").unwrap();
        let text = module.render();
        assert!(text.contains("for.cond"));
        assert!(text.contains("for.body"));
        assert!(text.contains("for.inc"));
        assert!(text.contains("for.exit"));
    }

    #[test]
    fn hello_world_declares_printf_and_the_entry_function() {
        let module = build_ir("print('hello')").unwrap();
        let text = module.render();
        assert!(text.contains("@printf"));
        assert!(text.contains(&format!("@load_{}", file_symbol(&Context::root("test.ember")))));
    }
}
