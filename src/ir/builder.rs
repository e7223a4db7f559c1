//! Instruction-emission helpers layered onto `FunctionBuilder`.
//!
//! Each method appends one or two lines of textual IR to the current
//! block and returns the `Value` holding the result, mirroring the
//! `self.builder.<op>(...)` calls of the reference builder, just against a
//! string buffer instead of an in-memory IR graph.

use super::function::FunctionBuilder;
use super::types::IrType;
use super::value::Value;

impl FunctionBuilder {
    pub fn emit_load(&mut self, ptr: &Value, ty: &IrType) -> Value {
        let dst = self.fresh_temp();
        self.emit(format!("{} = load {}, ptr {}", dst, ty, ptr));
        dst
    }

    pub fn emit_store(&mut self, value: &Value, ptr: &Value, ty: &IrType) {
        self.emit(format!("store {} {}, ptr {}", ty, value, ptr));
    }

    /// `getelementptr inbounds <base_ty>, ptr <ptr>, <idx_ty idx>...`
    pub fn emit_gep(&mut self, base_ty: &IrType, ptr: &Value, indices: &[(IrType, Value)]) -> Value {
        let dst = self.fresh_temp();
        let idx = indices
            .iter()
            .map(|(ty, v)| format!("{} {}", ty, v))
            .collect::<Vec<_>>()
            .join(", ");
        self.emit(format!("{} = getelementptr inbounds {}, ptr {}, {}", dst, base_ty, ptr, idx));
        dst
    }

    pub fn emit_int_binop(&mut self, op: &str, l: &Value, r: &Value) -> Value {
        let dst = self.fresh_temp();
        self.emit(format!("{} = {} i32 {}, {}", dst, op, l, r));
        dst
    }

    pub fn emit_float_binop(&mut self, op: &str, l: &Value, r: &Value) -> Value {
        let dst = self.fresh_temp();
        self.emit(format!("{} = {} double {}, {}", dst, op, l, r));
        dst
    }

    pub fn emit_icmp(&mut self, pred: &str, l: &Value, r: &Value) -> Value {
        let dst = self.fresh_temp();
        self.emit(format!("{} = icmp {} i32 {}, {}", dst, pred, l, r));
        dst
    }

    pub fn emit_fcmp(&mut self, pred: &str, l: &Value, r: &Value) -> Value {
        let dst = self.fresh_temp();
        self.emit(format!("{} = fcmp {} double {}, {}", dst, pred, l, r));
        dst
    }

    pub fn emit_bool_binop(&mut self, op: &str, l: &Value, r: &Value) -> Value {
        let dst = self.fresh_temp();
        self.emit(format!("{} = {} i1 {}, {}", dst, op, l, r));
        dst
    }

    pub fn emit_sitofp(&mut self, value: &Value) -> Value {
        let dst = self.fresh_temp();
        self.emit(format!("{} = sitofp i32 {} to double", dst, value));
        dst
    }

    pub fn emit_neg_int(&mut self, value: &Value) -> Value {
        let dst = self.fresh_temp();
        self.emit(format!("{} = sub i32 0, {}", dst, value));
        dst
    }

    pub fn emit_neg_float(&mut self, value: &Value) -> Value {
        let dst = self.fresh_temp();
        self.emit(format!("{} = fneg double {}", dst, value));
        dst
    }

    pub fn emit_not_bool(&mut self, value: &Value) -> Value {
        let dst = self.fresh_temp();
        self.emit(format!("{} = xor i1 {}, 1", dst, value));
        dst
    }

    pub fn emit_not_int(&mut self, value: &Value) -> Value {
        let dst = self.fresh_temp();
        self.emit(format!("{} = xor i32 {}, -1", dst, value));
        dst
    }

    pub fn emit_call(&mut self, ret_ty: &IrType, name: &str, args: &[(IrType, Value)]) -> Value {
        let dst = self.fresh_temp();
        let args_text = args
            .iter()
            .map(|(ty, v)| format!("{} {}", ty, v))
            .collect::<Vec<_>>()
            .join(", ");
        self.emit(format!("{} = call {} @{}({})", dst, ret_ty, name, args_text));
        dst
    }

    pub fn emit_call_void(&mut self, name: &str, args: &[(IrType, Value)]) {
        let args_text = args
            .iter()
            .map(|(ty, v)| format!("{} {}", ty, v))
            .collect::<Vec<_>>()
            .join(", ");
        self.emit(format!("call void @{}({})", name, args_text));
    }

    pub fn emit_call_variadic(&mut self, ret_ty: &IrType, fixed: &[IrType], name: &str, args: &[(IrType, Value)]) -> Value {
        let dst = self.fresh_temp();
        let fixed_sig = fixed.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ");
        let args_text = args
            .iter()
            .map(|(ty, v)| format!("{} {}", ty, v))
            .collect::<Vec<_>>()
            .join(", ");
        self.emit(format!(
            "{} = call {} ({}, ...) @{}({})",
            dst, ret_ty, fixed_sig, name, args_text
        ));
        dst
    }

    pub fn emit_ret(&mut self, value: Option<(&IrType, &Value)>) {
        match value {
            Some((ty, v)) => self.emit(format!("ret {} {}", ty, v)),
            None => self.emit("ret void".to_string()),
        }
        self.terminated = true;
    }

    pub fn emit_br(&mut self, label: &str) {
        self.emit(format!("br label %{}", label));
        self.terminated = true;
    }

    pub fn emit_cbr(&mut self, cond: &Value, then_label: &str, else_label: &str) {
        self.emit(format!("br i1 {}, label %{}, label %{}", cond, then_label, else_label));
        self.terminated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_and_store_round_trip() {
        let mut f = FunctionBuilder::new("f", vec![], IrType::Void);
        let ptr = f.alloca("x", &IrType::I32);
        f.emit_store(&Value::int(3), &ptr, &IrType::I32);
        let loaded = f.emit_load(&ptr, &IrType::I32);
        assert!(f.body.contains("load i32"));
        assert_ne!(loaded.as_str(), ptr.as_str());
    }

    #[test]
    fn ret_marks_block_terminated() {
        let mut f = FunctionBuilder::new("f", vec![], IrType::I32);
        assert!(!f.terminated);
        f.emit_ret(Some((&IrType::I32, &Value::int(0))));
        assert!(f.terminated);
    }

    #[test]
    fn open_block_auto_closes_previous_block() {
        let mut f = FunctionBuilder::new("f", vec![], IrType::Void);
        f.open_block("next");
        assert!(f.body.contains("br label %next"));
        assert!(f.body.contains("next:"));
    }
}
