//! A reference to an already-computed IR value: an SSA register, a global,
//! or a literal — whatever text is legal wherever LLVM IR expects an
//! operand.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value(String);

impl Value {
    pub fn new(repr: impl Into<String>) -> Value {
        Value(repr.into())
    }

    pub fn int(n: i32) -> Value {
        Value(n.to_string())
    }

    pub fn float(n: f64) -> Value {
        let text = format!("{:?}", n);
        if text.contains('.') || text.contains('e') || text.contains("inf") || text.contains("nan") {
            Value(text)
        } else {
            Value(format!("{}.0", text))
        }
    }

    pub fn bool(b: bool) -> Value {
        Value(if b { "1".to_string() } else { "0".to_string() })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_literal_always_has_a_decimal_point() {
        assert_eq!(Value::float(3.0).as_str(), "3.0");
        assert_eq!(Value::float(2.5).as_str(), "2.5");
    }

    #[test]
    fn bool_renders_as_i1_literal() {
        assert_eq!(Value::bool(true).as_str(), "1");
        assert_eq!(Value::bool(false).as_str(), "0");
    }
}
