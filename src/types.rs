//! The static type system: a closed, `Hash`-able `Type` enum plus the
//! metadata tables (`StructMetadata`, `FunctionSig`) the analyser and IR
//! builder both need — the analyser to check field/argument types, the IR
//! builder to compute `getelementptr` indices and generate call signatures.

use std::collections::HashMap;
use std::fmt;

use crate::ast::TypeName;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
    Bool,
    Byte,
    Str,
    Null,
    List(Box<Type>),
    Struct(String),
}

impl Type {
    /// Resolve a parsed `TypeName` against the struct table, so a bare
    /// identifier like `Point` in `x: Point <- ...` is recognized as a
    /// struct type rather than an undeclared primitive.
    pub fn resolve(name: &TypeName, structs: &HashMap<String, StructMetadata>) -> Option<Type> {
        match name {
            TypeName::List(inner) => Some(Type::List(Box::new(Type::resolve(inner, structs)?))),
            TypeName::Named(word) => match word.as_str() {
                "int" => Some(Type::Int),
                "float" => Some(Type::Float),
                "bool" => Some(Type::Bool),
                "byte" => Some(Type::Byte),
                "str" => Some(Type::Str),
                "null" => Some(Type::Null),
                other if structs.contains_key(other) => Some(Type::Struct(other.to_string())),
                _ => None,
            },
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// The element type of a `list<T>`, if `self` is one.
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::List(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
            Type::Byte => write!(f, "byte"),
            Type::Str => write!(f, "str"),
            Type::Null => write!(f, "null"),
            Type::List(inner) => write!(f, "list:{}", inner),
            Type::Struct(name) => write!(f, "{}", name),
        }
    }
}

/// A single field's slot in a struct: its declaration order (the GEP index)
/// and its resolved type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub index: u32,
    pub ty: Type,
}

/// Field layout for one struct, built once during the analyser's first
/// declaration pass and shared, read-only, with the IR builder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructMetadata {
    pub name: String,
    fields: Vec<(String, FieldInfo)>,
}

impl StructMetadata {
    pub fn new(name: impl Into<String>) -> StructMetadata {
        StructMetadata {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn push_field(&mut self, name: impl Into<String>, ty: Type) {
        let index = self.fields.len() as u32;
        self.fields.push((name.into(), FieldInfo { index, ty }));
    }

    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, i)| i)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A function's parameter/return types, keyed by name in the function table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSig {
    pub params: Vec<Type>,
    pub return_type: Type,
}

impl FunctionSig {
    pub fn new(params: Vec<Type>, return_type: Type) -> FunctionSig {
        FunctionSig {
            params,
            return_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_primitive() {
        let structs = HashMap::new();
        assert_eq!(
            Type::resolve(&TypeName::Named("int".to_string()), &structs),
            Some(Type::Int)
        );
    }

    #[test]
    fn resolve_nested_list() {
        let structs = HashMap::new();
        let name = TypeName::List(Box::new(TypeName::Named("float".to_string())));
        assert_eq!(
            Type::resolve(&name, &structs),
            Some(Type::List(Box::new(Type::Float)))
        );
    }

    #[test]
    fn resolve_unknown_struct_name_fails() {
        let structs = HashMap::new();
        assert_eq!(
            Type::resolve(&TypeName::Named("Point".to_string()), &structs),
            None
        );
    }

    #[test]
    fn struct_metadata_tracks_field_order() {
        let mut meta = StructMetadata::new("Point");
        meta.push_field("x", Type::Int);
        meta.push_field("y", Type::Int);
        assert_eq!(meta.field("y").unwrap().index, 1);
        assert_eq!(meta.field("x").unwrap().ty, Type::Int);
        assert!(meta.field("z").is_none());
    }

    #[test]
    fn display_round_trips_list_syntax() {
        let ty = Type::List(Box::new(Type::List(Box::new(Type::Int))));
        assert_eq!(format!("{}", ty), "list:list:int");
    }
}
