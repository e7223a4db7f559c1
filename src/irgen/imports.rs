//! `IMPORT name` — read, lex, parse and lower `name`'s source into this same
//! module, once per name.

use crate::ast::Node;
use crate::diagnostic::Diagnostic;
use crate::lexer::Lexer;
use crate::parser::Parser;

use super::IrGen;

impl<'a> IrGen<'a> {
    pub(super) fn visit_import(&mut self, name: &str, _node: &Node) -> Result<(), Diagnostic> {
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

        let visit_result = self.visit(&ast).map(|_| ());
        self.context = saved_context;
        visit_result
    }
}
