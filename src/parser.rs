//! Tokens → AST.
//!
//! Hand-rolled recursive descent with explicit precedence climbing, one
//! token of lookahead. No error-recovery: the first malformed construct
//! aborts parsing with a `Diagnostic`.

use crate::ast::{BinOpKind, Field, Node, NodeKind, NumberLit, Param, TypeName, UnaryOpKind};
use crate::diagnostic::{Context, Diagnostic, ErrorKind, Stage};
use crate::token::{Keyword, Token, TokenKind, TokenValue};

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    context: Context,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, context: Context) -> Parser {
        Parser {
            tokens,
            index: 0,
            context,
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.index + 1)
            .unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    fn ignore_newlines(&mut self) {
        while self.current().kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn err(&self, details: impl Into<String>) -> Diagnostic {
        Diagnostic::new(
            ErrorKind::InvalidSyntax,
            details,
            Some(self.current().position),
            self.context.clone(),
            Stage::Parsing,
        )
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, Diagnostic> {
        if self.current().kind != kind {
            return Err(self.err(format!("expected {}, got {}", what, self.current())));
        }
        let tok = self.current().clone();
        self.advance();
        Ok(tok)
    }

    fn is_keyword(&self, kw: Keyword) -> bool {
        self.current().kind == TokenKind::Keyword && self.current().keyword() == Some(kw)
    }

    /// Entry point: parse the whole token stream into one `Statements` node.
    pub fn parse(mut self) -> Result<Node, Diagnostic> {
        if self.current().kind == TokenKind::Eof {
            let pos = self.current().position;
            return Ok(Node::new(NodeKind::Return(None), pos));
        }
        let result = self.statement()?;
        self.ignore_newlines();
        if self.current().kind != TokenKind::Eof {
            return Err(self.err(format!("expected expression, got {}", self.current())));
        }
        Ok(result)
    }

    fn statement(&mut self) -> Result<Node, Diagnostic> {
        self.ignore_newlines();
        let start = self.current().position;
        let mut statements = vec![self.expression()?];

        while self.current().kind == TokenKind::Newline {
            self.ignore_newlines();
            if self.current().kind == TokenKind::RCurly || self.current().kind == TokenKind::Eof {
                if self.current().kind == TokenKind::RCurly {
                    self.advance();
                }
                break;
            }
            statements.push(self.expression()?);
        }
        Ok(Node::new(NodeKind::Statements(statements), start))
    }

    /// The `{ statements }` or `: expr` form used after `IF`/`WHILE`/`FOR`/`FUN`.
    fn body_expr(&mut self) -> Result<Node, Diagnostic> {
        match self.current().kind {
            TokenKind::LCurly => {
                self.advance();
                self.statement()
            }
            TokenKind::Colon => {
                self.advance();
                self.expression()
            }
            _ => Err(self.err(format!("expected '{{' or ':', got {}", self.current()))),
        }
    }

    fn expression(&mut self) -> Result<Node, Diagnostic> {
        self.ignore_newlines();
        let tok = self.current().clone();

        if tok.kind == TokenKind::Keyword {
            return match tok.keyword().unwrap() {
                Keyword::While => self.parse_while(),
                Keyword::For => self.parse_for(),
                Keyword::Fun => self.parse_fun_def(),
                Keyword::Class => self.parse_class_def(),
                Keyword::Pass => {
                    self.advance();
                    Ok(Node::new(NodeKind::Pass, tok.position))
                }
                Keyword::Return => self.parse_return(),
                Keyword::Break => {
                    self.advance();
                    Ok(Node::new(NodeKind::Break, tok.position))
                }
                Keyword::Continue => {
                    self.advance();
                    Ok(Node::new(NodeKind::Continue, tok.position))
                }
                Keyword::Import => self.parse_import(),
                Keyword::If | Keyword::Else | Keyword::Step => {
                    Err(self.err(format!("unexpected keyword, got {}", tok)))
                }
            };
        }

        if tok.kind == TokenKind::Identifier
            && matches!(self.peek().kind, TokenKind::Colon | TokenKind::Assign)
        {
            return self.parse_var_assign();
        }

        self.op_expr()
    }

    fn parse_while(&mut self) -> Result<Node, Diagnostic> {
        let pos = self.current().position;
        self.advance();
        let condition = Box::new(self.op_expr()?);
        let body = Box::new(self.body_expr()?);
        Ok(Node::new(NodeKind::While { condition, body }, pos))
    }

    fn parse_for(&mut self) -> Result<Node, Diagnostic> {
        let pos = self.current().position;
        self.advance();
        let ident = self.expect(TokenKind::Identifier, "identifier")?;
        let var_name = ident.text().unwrap().to_string();
        self.expect(TokenKind::Assign, "'<-'")?;
        let from = Box::new(self.factor()?);
        self.expect(TokenKind::Range, "'..'")?;
        let to = Box::new(self.arithm_expr()?);
        let step = if self.is_keyword(Keyword::Step) {
            self.advance();
            Some(Box::new(self.factor()?))
        } else {
            None
        };
        let body = Box::new(self.body_expr()?);
        Ok(Node::new(
            NodeKind::For {
                var_name,
                from,
                to,
                step,
                body,
            },
            pos,
        ))
    }

    fn parse_type_name(&mut self) -> Result<TypeName, Diagnostic> {
        if self.current().kind != TokenKind::TypeWord && self.current().kind != TokenKind::Identifier
        {
            return Err(self.err(format!("expected type, got {}", self.current())));
        }
        let tok = self.current().clone();
        self.advance();
        let word = if tok.kind == TokenKind::TypeWord {
            tok.text().unwrap().to_lowercase()
        } else {
            tok.text().unwrap().to_string()
        };
        if word == "list" {
            self.expect(TokenKind::Less, "'<' after 'list'")?;
            let inner = self.parse_type_name()?;
            self.expect(TokenKind::Greater, "'>' closing 'list<...>'")?;
            Ok(TypeName::List(Box::new(inner)))
        } else {
            Ok(TypeName::Named(word))
        }
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, Diagnostic> {
        let mut params = Vec::new();
        if self.current().kind != TokenKind::Identifier {
            return Ok(params);
        }
        loop {
            let name_tok = self.expect(TokenKind::Identifier, "parameter name")?;
            self.expect(TokenKind::Colon, "':' after parameter name")?;
            let type_name = self.parse_type_name()?;
            params.push(Param {
                name: name_tok.text().unwrap().to_string(),
                type_name,
            });
            if self.current().kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            break;
        }
        Ok(params)
    }

    fn parse_fun_def(&mut self) -> Result<Node, Diagnostic> {
        let pos = self.current().position;
        self.advance();
        let ident = self.expect(TokenKind::Identifier, "function name")?;
        let name = ident.text().unwrap().to_string();
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen, "')'")?;

        let return_type = if self.current().kind == TokenKind::Arrow {
            self.advance();
            Some(self.parse_type_name()?)
        } else {
            None
        };

        let sig: Vec<String> = params
            .iter()
            .map(|p| format!("{:?}", p.type_name))
            .collect();
        let saved_context = self.context.clone();
        self.context = self
            .context
            .push(format!("{}({})", name, sig.join(",")), self.context.file().clone());

        let body = self.body_expr();
        self.context = saved_context;
        let body = Box::new(body?);

        Ok(Node::new(
            NodeKind::FunDef {
                name,
                params,
                return_type,
                body,
            },
            pos,
        ))
    }

    fn parse_class_def(&mut self) -> Result<Node, Diagnostic> {
        let pos = self.current().position;
        self.advance();
        let ident = self.expect(TokenKind::Identifier, "class name")?;
        let class_name = ident.text().unwrap().to_string();
        self.expect(TokenKind::LCurly, "'{'")?;
        self.ignore_newlines();

        let mut fields = Vec::new();
        let mut methods = Vec::new();

        while self.current().kind != TokenKind::RCurly {
            if self.current().kind == TokenKind::Eof {
                return Err(self.err("expected '}', got end of file"));
            }
            if self.is_keyword(Keyword::Fun) {
                let method = self.parse_fun_def()?;
                let method = match method.kind {
                    NodeKind::FunDef {
                        name,
                        mut params,
                        return_type,
                        body,
                    } => {
                        params.insert(
                            0,
                            Param {
                                name: "self".to_string(),
                                type_name: TypeName::Named(class_name.clone()),
                            },
                        );
                        Node::new(
                            NodeKind::FunDef {
                                name,
                                params,
                                return_type,
                                body,
                            },
                            method.position,
                        )
                    }
                    other => Node::new(other, method.position),
                };
                methods.push(method);
                self.ignore_newlines();
            } else if self.current().kind == TokenKind::Identifier {
                let field_tok = self.current().clone();
                self.advance();
                self.expect(TokenKind::Colon, "':' after field name")?;
                let type_name = self.parse_type_name()?;
                fields.push(Field {
                    name: field_tok.text().unwrap().to_string(),
                    type_name,
                });
                if self.current().kind != TokenKind::Newline {
                    return Err(self.err(format!("expected ';' or newline, got {}", self.current())));
                }
                self.ignore_newlines();
            } else {
                return Err(self.err(format!(
                    "expected field or function definition, got {}",
                    self.current()
                )));
            }
        }
        self.advance();
        Ok(Node::new(
            NodeKind::StructDef {
                name: class_name,
                fields,
                methods,
            },
            pos,
        ))
    }

    fn parse_return(&mut self) -> Result<Node, Diagnostic> {
        let pos = self.current().position;
        self.advance();
        if self.current().kind == TokenKind::Newline || self.current().kind == TokenKind::Eof {
            return Ok(Node::new(NodeKind::Return(None), pos));
        }
        let value = self.op_expr()?;
        Ok(Node::new(NodeKind::Return(Some(Box::new(value))), pos))
    }

    fn parse_import(&mut self) -> Result<Node, Diagnostic> {
        self.advance();
        let ident = self.expect(TokenKind::Identifier, "module name")?;
        Ok(Node::new(
            NodeKind::Import {
                name: ident.text().unwrap().to_string(),
            },
            ident.position,
        ))
    }

    /// `ident [: type] <- value`, entered only when the lookahead already
    /// confirmed the shape.
    fn parse_var_assign(&mut self) -> Result<Node, Diagnostic> {
        let ident = self.current().clone();
        let name = ident.text().unwrap().to_string();
        self.advance(); // to ':' or '<-'
        let type_name = if self.current().kind == TokenKind::Colon {
            self.advance();
            let ty = self.parse_type_name()?;
            self.expect(TokenKind::Assign, "'<-'")?;
            Some(ty)
        } else {
            self.expect(TokenKind::Assign, "'<-'")?;
            None
        };
        let value = Box::new(self.expression()?);
        Ok(Node::new(
            NodeKind::VarAssign {
                name,
                type_name,
                value,
            },
            ident.position,
        ))
    }

    /// Left-associative binary chain shared by the four numeric/comparison
    /// precedence levels.
    fn bin_op_chain(
        &mut self,
        kinds_ops: &[(TokenKind, BinOpKind)],
        mut next: impl FnMut(&mut Self) -> Result<Node, Diagnostic>,
    ) -> Result<Node, Diagnostic> {
        let mut left = next(self)?;
        loop {
            let matched = kinds_ops.iter().find(|(k, _)| *k == self.current().kind);
            let Some((_, op)) = matched else { break };
            let op = *op;
            let pos = self.current().position;
            self.advance();
            let right = next(self)?;
            left = Node::new(
                NodeKind::BinOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                pos,
            );
        }
        Ok(left)
    }

    fn op_expr(&mut self) -> Result<Node, Diagnostic> {
        self.bin_op_chain(
            &[
                (TokenKind::And, BinOpKind::And),
                (TokenKind::Or, BinOpKind::Or),
                (TokenKind::Xor, BinOpKind::Xor),
            ],
            Self::comp_expr,
        )
    }

    fn comp_expr(&mut self) -> Result<Node, Diagnostic> {
        if self.current().kind == TokenKind::Not {
            let pos = self.current().position;
            self.advance();
            let operand = Box::new(self.comp_expr()?);
            return Ok(Node::new(
                NodeKind::UnaryOp {
                    op: UnaryOpKind::Not,
                    operand,
                },
                pos,
            ));
        }
        self.bin_op_chain(
            &[
                (TokenKind::Equals, BinOpKind::Eq),
                (TokenKind::NotEquals, BinOpKind::NotEq),
                (TokenKind::Less, BinOpKind::Lt),
                (TokenKind::Greater, BinOpKind::Gt),
                (TokenKind::LessEqual, BinOpKind::Le),
                (TokenKind::GreaterEqual, BinOpKind::Ge),
            ],
            Self::arithm_expr,
        )
    }

    fn arithm_expr(&mut self) -> Result<Node, Diagnostic> {
        self.bin_op_chain(
            &[
                (TokenKind::Plus, BinOpKind::Add),
                (TokenKind::Minus, BinOpKind::Sub),
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> Result<Node, Diagnostic> {
        self.bin_op_chain(
            &[
                (TokenKind::Mul, BinOpKind::Mul),
                (TokenKind::Div, BinOpKind::Div),
                (TokenKind::Mod, BinOpKind::Mod),
            ],
            Self::factor,
        )
    }

    fn factor(&mut self) -> Result<Node, Diagnostic> {
        if matches!(self.current().kind, TokenKind::Plus | TokenKind::Minus) {
            let op = if self.current().kind == TokenKind::Plus {
                UnaryOpKind::Plus
            } else {
                UnaryOpKind::Minus
            };
            let pos = self.current().position;
            self.advance();
            let operand = Box::new(self.power()?);
            return Ok(Node::new(NodeKind::UnaryOp { op, operand }, pos));
        }
        self.power()
    }

    /// `atom` optionally followed by `[index]` (a `GET`, or `ListAssign` if
    /// immediately followed by `<-`), then right-associative `^`.
    fn power(&mut self) -> Result<Node, Diagnostic> {
        let mut left = self.atom()?;

        if self.current().kind == TokenKind::LSquare {
            let pos = self.current().position;
            self.advance();
            let index = self.arithm_expr()?;
            self.expect(TokenKind::RSquare, "']' closing index")?;
            if self.current().kind == TokenKind::Assign {
                self.advance();
                let value = Box::new(self.atom()?);
                return Ok(Node::new(
                    NodeKind::ListAssign {
                        list: Box::new(left),
                        index: Box::new(index),
                        value,
                    },
                    pos,
                ));
            }
            left = Node::new(
                NodeKind::BinOp {
                    left: Box::new(left),
                    op: BinOpKind::Get,
                    right: Box::new(index),
                },
                pos,
            );
        }

        if self.current().kind == TokenKind::Pow {
            let pos = self.current().position;
            self.advance();
            let right = Box::new(self.power()?);
            left = Node::new(
                NodeKind::BinOp {
                    left: Box::new(left),
                    op: BinOpKind::Pow,
                    right,
                },
                pos,
            );
        }
        Ok(left)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Node>, Diagnostic> {
        let mut args = Vec::new();
        if self.current().kind == TokenKind::RParen {
            self.advance();
            return Ok(args);
        }
        args.push(self.op_expr()?);
        while self.current().kind == TokenKind::Comma {
            self.advance();
            args.push(self.op_expr()?);
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    fn atom(&mut self) -> Result<Node, Diagnostic> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::Int => {
                self.advance();
                let n = match tok.value {
                    Some(TokenValue::Int(n)) => n,
                    _ => unreachable!(),
                };
                Ok(Node::new(NodeKind::Number(NumberLit::Int(n)), tok.position))
            }
            TokenKind::Float => {
                self.advance();
                let n = match tok.value {
                    Some(TokenValue::Float(n)) => n,
                    _ => unreachable!(),
                };
                Ok(Node::new(
                    NodeKind::Number(NumberLit::Float(n)),
                    tok.position,
                ))
            }
            TokenKind::Str => {
                self.advance();
                let s = tok.text().unwrap().to_string();
                Ok(Node::new(NodeKind::String(s), tok.position))
            }
            TokenKind::Identifier => self.parse_identifier_atom(tok),
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LSquare => {
                self.advance();
                let mut items = Vec::new();
                if self.current().kind != TokenKind::RSquare {
                    items.push(self.atom()?);
                    while self.current().kind == TokenKind::Comma {
                        self.advance();
                        items.push(self.atom()?);
                    }
                }
                self.expect(TokenKind::RSquare, "']' or ',' in list literal")?;
                Ok(Node::new(NodeKind::List(items), tok.position))
            }
            TokenKind::Keyword if tok.keyword() == Some(Keyword::If) => self.parse_if(),
            _ => Err(self.err(format!(
                "expected identifier, literal or 'if', got {}",
                tok
            ))),
        }
    }

    fn parse_if(&mut self) -> Result<Node, Diagnostic> {
        let pos = self.current().position;
        self.advance();
        let condition = Box::new(self.op_expr()?);
        let then_branch = Box::new(self.body_expr()?);

        if self.current().kind == TokenKind::Newline && self.peek().keyword() == Some(Keyword::Else)
        {
            self.advance();
        }
        let else_branch = if self.is_keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.body_expr()?))
        } else {
            None
        };

        Ok(Node::new(
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            },
            pos,
        ))
    }

    /// An identifier atom: a bare variable, a call `name(...)`, or a
    /// `.field` access, which itself may continue as a method call
    /// (`name.field(...)`, receiver prepended as the first argument) or a
    /// field assignment (`name.field <- value`).
    fn parse_identifier_atom(&mut self, tok: Token) -> Result<Node, Diagnostic> {
        let name = tok.text().unwrap().to_string();
        self.advance();

        if self.current().kind == TokenKind::LParen {
            self.advance();
            let args = self.parse_call_args()?;
            return Ok(Node::new(NodeKind::FunCall { name, args }, tok.position));
        }

        if self.current().kind == TokenKind::Dot {
            self.advance();
            let field_tok = self.expect(TokenKind::Identifier, "field name after '.'")?;
            let field = field_tok.text().unwrap().to_string();
            let receiver = Node::new(NodeKind::VarAccess { name }, tok.position);

            if self.current().kind == TokenKind::Assign {
                self.advance();
                let value = Box::new(self.atom()?);
                return Ok(Node::new(
                    NodeKind::StructAssign {
                        target: Box::new(receiver),
                        field,
                        value,
                    },
                    tok.position,
                ));
            }
            if self.current().kind == TokenKind::LParen {
                self.advance();
                let mut args = vec![receiver];
                args.extend(self.parse_call_args()?);
                return Ok(Node::new(
                    NodeKind::FunCall { name: field, args },
                    field_tok.position,
                ));
            }
            return Ok(Node::new(
                NodeKind::StructRead {
                    target: Box::new(receiver),
                    field,
                },
                tok.position,
            ));
        }

        Ok(Node::new(NodeKind::VarAccess { name }, tok.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Node {
        let tokens = Lexer::new(src, Context::root("test.ember"))
            .tokenize()
            .expect("lex should succeed");
        Parser::new(tokens, Context::root("test.ember"))
            .parse()
            .expect("parse should succeed")
    }

    #[test]
    fn arithmetic_precedence() {
        let node = parse("1 + 2 * 3");
        match node.kind {
            NodeKind::Statements(stmts) => match &stmts[0].kind {
                NodeKind::BinOp { op, right, .. } => {
                    assert_eq!(*op, BinOpKind::Add);
                    assert!(matches!(right.kind, NodeKind::BinOp { op: BinOpKind::Mul, .. }));
                }
                other => panic!("expected BinOp, got {:?}", other),
            },
            other => panic!("expected Statements, got {:?}", other),
        }
    }

    #[test]
    fn power_is_right_associative() {
        let node = parse("2 ^ 3 ^ 2");
        let stmt = match node.kind {
            NodeKind::Statements(s) => s,
            _ => panic!(),
        };
        match &stmt[0].kind {
            NodeKind::BinOp { right, .. } => {
                assert!(matches!(right.kind, NodeKind::BinOp { .. }));
            }
            other => panic!("expected BinOp, got {:?}", other),
        }
    }

    #[test]
    fn index_becomes_get_binop() {
        let node = parse("xs[1]");
        let stmt = match node.kind {
            NodeKind::Statements(s) => s,
            _ => panic!(),
        };
        assert!(matches!(
            &stmt[0].kind,
            NodeKind::BinOp {
                op: BinOpKind::Get,
                ..
            }
        ));
    }

    #[test]
    fn index_assign_becomes_list_assign() {
        let node = parse("xs[1] <- 9");
        let stmt = match node.kind {
            NodeKind::Statements(s) => s,
            _ => panic!(),
        };
        assert!(matches!(&stmt[0].kind, NodeKind::ListAssign { .. }));
    }

    #[test]
    fn var_assign_with_type_annotation() {
        let node = parse("x: int <- 5");
        let stmt = match node.kind {
            NodeKind::Statements(s) => s,
            _ => panic!(),
        };
        match &stmt[0].kind {
            NodeKind::VarAssign { name, type_name, .. } => {
                assert_eq!(name, "x");
                assert_eq!(type_name, &Some(TypeName::Named("int".to_string())));
            }
            other => panic!("expected VarAssign, got {:?}", other),
        }
    }

    #[test]
    fn nested_list_type_annotation() {
        let node = parse("x: list<list<int>> <- [[1]]");
        let stmt = match node.kind {
            NodeKind::Statements(s) => s,
            _ => panic!(),
        };
        match &stmt[0].kind {
            NodeKind::VarAssign { type_name, .. } => {
                assert_eq!(
                    type_name,
                    &Some(TypeName::List(Box::new(TypeName::List(Box::new(
                        TypeName::Named("int".to_string())
                    )))))
                );
            }
            other => panic!("expected VarAssign, got {:?}", other),
        }
    }

    #[test]
    fn for_loop_with_step() {
        let node = parse("for i <- 1 .. 5 step 2 { pass }");
        let stmt = match node.kind {
            NodeKind::Statements(s) => s,
            _ => panic!(),
        };
        assert!(matches!(&stmt[0].kind, NodeKind::For { step: Some(_), .. }));
    }

    #[test]
    fn if_else_on_own_line() {
        let node = parse("if true { pass }\nelse { pass }");
        let stmt = match node.kind {
            NodeKind::Statements(s) => s,
            _ => panic!(),
        };
        match &stmt[0].kind {
            NodeKind::Statements(inner) => {
                assert!(matches!(&inner[0].kind, NodeKind::If { else_branch: Some(_), .. }))
            }
            NodeKind::If { else_branch, .. } => assert!(else_branch.is_some()),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn method_call_prepends_receiver() {
        let node = parse("p.dist(q)");
        let stmt = match node.kind {
            NodeKind::Statements(s) => s,
            _ => panic!(),
        };
        match &stmt[0].kind {
            NodeKind::FunCall { name, args } => {
                assert_eq!(name, "dist");
                assert_eq!(args.len(), 2);
                assert!(matches!(&args[0].kind, NodeKind::VarAccess { name } if name == "p"));
            }
            other => panic!("expected FunCall, got {:?}", other),
        }
    }

    #[test]
    fn struct_def_gives_methods_implicit_self() {
        let node = parse("class P { x: int\nfun get() -> int { return x } }");
        let stmt = match node.kind {
            NodeKind::Statements(s) => s,
            _ => panic!(),
        };
        match &stmt[0].kind {
            NodeKind::StructDef { methods, .. } => match &methods[0].kind {
                NodeKind::FunDef { params, .. } => {
                    assert_eq!(params[0].name, "self");
                    assert_eq!(params[0].type_name, TypeName::Named("P".to_string()));
                }
                other => panic!("expected FunDef, got {:?}", other),
            },
            other => panic!("expected StructDef, got {:?}", other),
        }
    }

    #[test]
    fn break_continue_outside_loop_still_parse() {
        // The parser accepts them anywhere; rejecting break/continue outside
        // a loop is the analyser's job (spec.md invariant 7).
        let node = parse("break\ncontinue");
        let stmt = match node.kind {
            NodeKind::Statements(s) => s,
            _ => panic!(),
        };
        assert!(matches!(stmt[0].kind, NodeKind::Break));
        assert!(matches!(stmt[1].kind, NodeKind::Continue));
    }
}
