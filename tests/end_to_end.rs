//! End-to-end tests running the full `tokenize -> parse -> analyse ->
//! build_ir` pipeline over the literal source snippets, asserting on the
//! emitted IR text or the diagnostic kind since this build has no
//! target-machine backend to actually execute the result against.

use emberc::{compile_file, CompilerConfig, ErrorKind};

fn compile(src: &str) -> Result<emberc::CompileOutputs, emberc::Diagnostic> {
    let mut file = tempfile::Builder::new().suffix(".ember").tempfile().unwrap();
    use std::io::Write;
    write!(file, "{}", src).unwrap();
    compile_file(file.path(), &CompilerConfig::default())
}

#[test]
fn hello_world() {
    let outputs = compile("print('Hi\\n')").unwrap();
    let ir = outputs.ir_text();
    assert!(ir.contains("@printf"));
    assert!(ir.contains(&format!("@load_{}", outputs.entry_symbol)));
}

#[test]
fn arithmetic_with_widening() {
    let outputs = compile("x: float <- 1 + 2.5\nreturn x").unwrap();
    let ir = outputs.ir_text();
    // the `1 + 2.5` add widens to float; the emitted instruction operates on doubles
    assert!(ir.contains("fadd"));
}

#[test]
fn for_sum() {
    let outputs = compile("s: int <- 0\nfor i <- 1 .. 5 {\ns <- s + i\n}\nreturn s").unwrap();
    let ir = outputs.ir_text();
    assert!(ir.contains("for.cond"));
    assert!(ir.contains("for.body"));
    assert!(ir.contains("for.inc"));
    assert!(ir.contains("for.exit"));
}

#[test]
fn list_index() {
    let outputs = compile("xs: list<int> <- [10, 20, 30]\nreturn xs[1]").unwrap();
    let ir = outputs.ir_text();
    assert!(ir.contains("getelementptr"));
}

#[test]
fn struct_field() {
    let outputs = compile("class P {\nx: int\ny: int\n}\np <- P(3, 4)\nreturn p.x + p.y").unwrap();
    let ir = outputs.ir_text();
    assert!(ir.contains("%P"));
    assert!(ir.contains("getelementptr"));
}

#[test]
fn undeclared_variable() {
    let err = compile("return q").unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoSuchVar);
}

#[test]
fn type_mismatch_on_assign() {
    let err = compile("x: int <- 'abc'").unwrap_err();
    assert_eq!(err.kind, ErrorKind::TypeError);
}
