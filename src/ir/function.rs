//! Per-function emission state: the entry-block alloca buffer, the body
//! buffer, and the fresh-name counters feeding both.
//!
//! Allocas are never interleaved with the instructions that use them —
//! every `alloca` call appends to a buffer that is spliced in right after
//! `entry:`, however deep into a nested block the call that requested it
//! was made. This is the same "hoist every local to the entry block"
//! discipline the original builder's own `Allocator` enforces, just with a
//! plain string buffer standing in for its block/instruction bookkeeping.

use std::fmt;

use super::types::IrType;
use super::value::Value;

pub struct FunctionBuilder {
    pub(super) name: String,
    pub(super) params: Vec<(String, IrType)>,
    pub(super) ret_ty: IrType,
    pub(super) entry_allocas: String,
    pub(super) body: String,
    temp_counter: usize,
    block_counter: usize,
    pub(super) terminated: bool,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>, params: Vec<(String, IrType)>, ret_ty: IrType) -> FunctionBuilder {
        FunctionBuilder {
            name: name.into(),
            params,
            ret_ty,
            entry_allocas: String::new(),
            body: String::new(),
            temp_counter: 0,
            block_counter: 0,
            terminated: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A fresh SSA register name, guaranteed not to collide with any
    /// source identifier (those never contain `.`).
    pub fn fresh_temp(&mut self) -> Value {
        let n = self.temp_counter;
        self.temp_counter += 1;
        Value::new(format!("%.t{}", n))
    }

    /// A fresh block label, not yet emitted.
    pub fn fresh_label(&mut self, hint: &str) -> String {
        let n = self.block_counter;
        self.block_counter += 1;
        format!("{}.{}", hint, n)
    }

    /// Reserve an entry-block slot for `hint` and return a pointer to it.
    /// The returned name is unique even if `hint` repeats (shadowing, loop
    /// bodies visited more than once while building).
    pub fn alloca(&mut self, hint: &str, ty: &IrType) -> Value {
        let n = self.temp_counter;
        self.temp_counter += 1;
        let slot = format!("{}.{}", hint, n);
        self.entry_allocas.push_str(&format!("  %{} = alloca {}\n", slot, ty));
        Value::new(format!("%{}", slot))
    }

    pub fn emit(&mut self, line: impl fmt::Display) {
        self.body.push_str(&format!("  {}\n", line));
    }

    /// Close the current block with a jump, if it isn't already closed, and
    /// open `name` as the new current block.
    pub fn open_block(&mut self, name: &str) {
        if !self.terminated {
            self.emit(format!("br label %{}", name));
        }
        self.body.push_str(&format!("{}:\n", name));
        self.terminated = false;
    }

    pub fn render(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|(name, ty)| format!("{} %{}", ty, name))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "define {} @{}({}) {{\nentry:\n{}{}}}\n",
            self.ret_ty, self.name, params, self.entry_allocas, self.body
        )
    }
}
