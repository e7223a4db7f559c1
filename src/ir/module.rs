//! The whole-program IR buffer: struct type definitions, deduplicated
//! string globals, extern/intrinsic declarations, and one rendered block
//! of text per function, concatenated on `render`.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use crate::diagnostic::{Context, Diagnostic, ErrorKind, Stage};

use super::function::FunctionBuilder;
use super::types::IrType;
use super::value::Value;

pub struct Module {
    context: Context,
    struct_defs: Vec<(String, Vec<IrType>)>,
    string_globals: String,
    string_constants: HashMap<String, String>,
    string_counter: usize,
    externs: String,
    declared_externs: HashSet<String>,
    functions: String,
    defined_symbols: HashSet<String>,
}

impl Module {
    pub fn new(context: Context) -> Module {
        Module {
            context,
            struct_defs: Vec::new(),
            string_globals: String::new(),
            string_constants: HashMap::new(),
            string_counter: 0,
            externs: String::new(),
            declared_externs: HashSet::new(),
            functions: String::new(),
            defined_symbols: HashSet::new(),
        }
    }

    fn err(&self, details: impl Into<String>) -> Diagnostic {
        Diagnostic::new(ErrorKind::DuplicateName, details, None, self.context.clone(), Stage::IrBuilding)
    }

    pub fn declare_struct(&mut self, name: &str, fields: Vec<IrType>) -> Result<(), Diagnostic> {
        if !self.defined_symbols.insert(format!("%{}", name)) {
            return Err(self.err(format!("struct '{}' is already defined", name)));
        }
        self.struct_defs.push((name.to_string(), fields));
        Ok(())
    }

    /// Declare an external function once; a repeat declaration (the `print`
    /// builtin referenced from several call sites, `strlen`/`malloc`/
    /// `strcpy` pulled in by more than one string op) is silently a no-op.
    pub fn declare_extern(&mut self, name: &str, signature: &str) {
        if self.declared_externs.insert(name.to_string()) {
            self.externs.push_str(signature);
            self.externs.push('\n');
        }
    }

    fn escape_llvm_string(s: &str) -> String {
        let mut out = String::new();
        for byte in s.as_bytes() {
            match *byte {
                0x20..=0x21 | 0x23..=0x5B | 0x5D..=0x7E => out.push(*byte as char),
                b'\\' => out.push_str("\\5C"),
                b'"' => out.push_str("\\22"),
                _ => {
                    let _ = write!(&mut out, "\\{:02X}", byte);
                }
            }
        }
        out
    }

    /// Get or create a NUL-terminated global string constant, returning its
    /// global name (`@.str.N`) — callers GEP this down to an `i8` pointer.
    pub fn get_string_global(&mut self, s: &str) -> (String, usize) {
        if let Some(name) = self.string_constants.get(s) {
            let len = s.as_bytes().len() + 1;
            return (name.clone(), len);
        }
        let name = format!("@.str.{}", self.string_counter);
        self.string_counter += 1;
        let len = s.as_bytes().len() + 1;
        let escaped = Self::escape_llvm_string(s);
        let _ = writeln!(
            &mut self.string_globals,
            "{} = private unnamed_addr constant [{} x i8] c\"{}\\00\"",
            name, len, escaped
        );
        self.string_constants.insert(s.to_string(), name.clone());
        (name, len)
    }

    pub fn add_function(&mut self, f: FunctionBuilder) -> Result<(), Diagnostic> {
        if !self.defined_symbols.insert(format!("@{}", f.name())) {
            return Err(self.err(format!("function '{}' is already defined", f.name())));
        }
        self.functions.push_str(&f.render());
        self.functions.push('\n');
        Ok(())
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, fields) in &self.struct_defs {
            let fields_text = fields.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ");
            let _ = writeln!(&mut out, "%{} = type {{ {} }}", name, fields_text);
        }
        if !self.struct_defs.is_empty() {
            out.push('\n');
        }
        if !self.string_globals.is_empty() {
            out.push_str(&self.string_globals);
            out.push('\n');
        }
        if !self.externs.is_empty() {
            out.push_str(&self.externs);
            out.push('\n');
        }
        out.push_str(&self.functions);
        out
    }
}

/// GEP a NUL-terminated `[N x i8]` global down to its first byte, the `ptr`
/// representation every `str` value uses once constructed.
pub fn decay_string_global(f: &mut FunctionBuilder, global: &str, len: usize) -> Value {
    f.emit_gep(
        &IrType::Array(Box::new(IrType::I8), len),
        &Value::new(global),
        &[(IrType::I32, Value::int(0)), (IrType::I32, Value::int(0))],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_globals_deduplicate() {
        let mut m = Module::new(Context::root("t.ember"));
        let (a, _) = m.get_string_global("hi");
        let (b, _) = m.get_string_global("hi");
        assert_eq!(a, b);
    }

    #[test]
    fn duplicate_function_name_is_rejected() {
        let mut m = Module::new(Context::root("t.ember"));
        m.add_function(FunctionBuilder::new("f", vec![], IrType::Void)).unwrap();
        let err = m.add_function(FunctionBuilder::new("f", vec![], IrType::Void)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
    }

    #[test]
    fn render_includes_struct_and_string_sections() {
        let mut m = Module::new(Context::root("t.ember"));
        m.declare_struct("Point", vec![IrType::I32, IrType::I32]).unwrap();
        m.get_string_global("hi");
        let text = m.render();
        assert!(text.contains("%Point = type"));
        assert!(text.contains("@.str.0"));
    }
}
