//! `-d tokens` / `-d ast` dump serialization.
//!
//! Token dumps reuse `Token`'s own `Display`; AST dumps build a
//! `serde_json::Value` tree by hand (one object per node, a `type`
//! discriminator plus its typed children) rather than deriving `Serialize`
//! on `Node` itself, the same way the teacher's own at-exit report builds
//! its JSON out of `serde_json::Value`/`Map` rather than a derive.

use serde_json::{json, Value};

use crate::ast::{Field, Node, NodeKind, NumberLit, Param, TypeName};
use crate::token::Token;

pub fn dump_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn dump_ast(root: &Node) -> String {
    serde_json::to_string_pretty(&node_to_json(root)).unwrap_or_else(|_| "{}".to_string())
}

fn type_name_to_json(t: &TypeName) -> Value {
    match t {
        TypeName::Named(name) => json!({ "type": "Named", "name": name }),
        TypeName::List(inner) => json!({ "type": "List", "inner": type_name_to_json(inner) }),
    }
}

fn param_to_json(p: &Param) -> Value {
    json!({ "name": p.name, "type_name": type_name_to_json(&p.type_name) })
}

fn field_to_json(f: &Field) -> Value {
    json!({ "name": f.name, "type_name": type_name_to_json(&f.type_name) })
}

pub fn node_to_json(node: &Node) -> Value {
    match &node.kind {
        NodeKind::Number(NumberLit::Int(n)) => json!({ "type": "Number", "kind": "Int", "value": n }),
        NodeKind::Number(NumberLit::Float(n)) => json!({ "type": "Number", "kind": "Float", "value": n }),
        NodeKind::String(s) => json!({ "type": "String", "value": s }),
        NodeKind::List(items) => json!({ "type": "List", "items": items.iter().map(node_to_json).collect::<Vec<_>>() }),

        NodeKind::BinOp { left, op, right } => json!({
            "type": "BinOp",
            "op": format!("{:?}", op),
            "left": node_to_json(left),
            "right": node_to_json(right),
        }),
        NodeKind::UnaryOp { op, operand } => json!({
            "type": "UnaryOp",
            "op": format!("{:?}", op),
            "operand": node_to_json(operand),
        }),

        NodeKind::VarAccess { name } => json!({ "type": "VarAccess", "name": name }),
        NodeKind::VarAssign { name, type_name, value } => json!({
            "type": "VarAssign",
            "name": name,
            "type_name": type_name.as_ref().map(type_name_to_json),
            "value": node_to_json(value),
        }),

        NodeKind::If { condition, then_branch, else_branch } => json!({
            "type": "If",
            "condition": node_to_json(condition),
            "then_branch": node_to_json(then_branch),
            "else_branch": else_branch.as_ref().map(|n| node_to_json(n)),
        }),
        NodeKind::While { condition, body } => json!({
            "type": "While",
            "condition": node_to_json(condition),
            "body": node_to_json(body),
        }),
        NodeKind::For { var_name, from, to, step, body } => json!({
            "type": "For",
            "var_name": var_name,
            "from": node_to_json(from),
            "to": node_to_json(to),
            "step": step.as_ref().map(|n| node_to_json(n)),
            "body": node_to_json(body),
        }),

        NodeKind::FunCall { name, args } => json!({
            "type": "FunCall",
            "name": name,
            "args": args.iter().map(node_to_json).collect::<Vec<_>>(),
        }),
        NodeKind::FunDef { name, params, return_type, body } => json!({
            "type": "FunDef",
            "name": name,
            "params": params.iter().map(param_to_json).collect::<Vec<_>>(),
            "return_type": return_type.as_ref().map(type_name_to_json),
            "body": node_to_json(body),
        }),

        NodeKind::Statements(stmts) => json!({
            "type": "Statements",
            "stmts": stmts.iter().map(node_to_json).collect::<Vec<_>>(),
        }),

        NodeKind::ListAssign { list, index, value } => json!({
            "type": "ListAssign",
            "list": node_to_json(list),
            "index": node_to_json(index),
            "value": node_to_json(value),
        }),

        NodeKind::StructDef { name, fields, methods } => json!({
            "type": "StructDef",
            "name": name,
            "fields": fields.iter().map(field_to_json).collect::<Vec<_>>(),
            "methods": methods.iter().map(node_to_json).collect::<Vec<_>>(),
        }),
        NodeKind::StructAssign { target, field, value } => json!({
            "type": "StructAssign",
            "target": node_to_json(target),
            "field": field,
            "value": node_to_json(value),
        }),
        NodeKind::StructRead { target, field } => json!({
            "type": "StructRead",
            "target": node_to_json(target),
            "field": field,
        }),

        NodeKind::Import { name } => json!({ "type": "Import", "name": name }),

        NodeKind::Pass => json!({ "type": "Pass" }),
        NodeKind::Return(value) => json!({ "type": "Return", "value": value.as_ref().map(|n| node_to_json(n)) }),
        NodeKind::Break => json!({ "type": "Break" }),
        NodeKind::Continue => json!({ "type": "Continue" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Context;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    #[test]
    fn dump_tokens_space_joins_kind_value_pairs() {
        let ctx = Context::root("t.ember");
        let tokens = Lexer::new("x <- 1", ctx).tokenize().unwrap();
        let dumped = dump_tokens(&tokens);
        assert!(dumped.contains("Identifier: x"));
        assert!(dumped.contains("Int: 1"));
    }

    #[test]
    fn dump_ast_emits_a_type_discriminator_per_node() {
        let ctx = Context::root("t.ember");
        let tokens = Lexer::new("x <- 1", ctx.clone()).tokenize().unwrap();
        let ast = Parser::new(tokens, ctx).parse().unwrap();
        let dumped = dump_ast(&ast);
        let value: Value = serde_json::from_str(&dumped).unwrap();
        assert_eq!(value["type"], "Statements");
        assert_eq!(value["stmts"][0]["type"], "VarAssign");
    }

    /// Lex → parse → dump is a pure function of the input text: running it
    /// twice on the same source must produce byte-identical JSON.
    #[test]
    fn dump_ast_is_deterministic_for_a_fixed_input() {
        let src = "fun add(a: int, b: int) -> int {\nreturn a + b\n}\nx: int <- add(1, 2)\nif x > 2 {\nprint('big')\n} else {\nprint('small')\n}\n";
        let dump_once = || {
            let ctx = Context::root("t.ember");
            let tokens = Lexer::new(src, ctx.clone()).tokenize().unwrap();
            let ast = Parser::new(tokens, ctx).parse().unwrap();
            dump_ast(&ast)
        };
        assert_eq!(dump_once(), dump_once());
    }
}
