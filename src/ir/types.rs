//! Mapping from the semantic `Type` onto textual LLVM IR type syntax.
//!
//! Every value-carrying pointer (`str`, `list:T`, a struct) lowers to the
//! single opaque `ptr` — the "shape" a pointer refers to lives in the
//! accompanying `Type`, not in the IR type, so there is no typed-pointer
//! bitcast dance to thread through every GEP.

use std::collections::HashMap;
use std::fmt;

use crate::types::{StructMetadata, Type};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrType {
    I1,
    I8,
    I32,
    Double,
    Void,
    Ptr,
    /// Only used for the entry-block `alloca` that backs a value; never
    /// appears as an operand type elsewhere once a pointer has decayed.
    Array(Box<IrType>, usize),
    /// Identified struct type, referenced by name (`%Point`).
    Struct(String),
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::I1 => write!(f, "i1"),
            IrType::I8 => write!(f, "i8"),
            IrType::I32 => write!(f, "i32"),
            IrType::Double => write!(f, "double"),
            IrType::Void => write!(f, "void"),
            IrType::Ptr => write!(f, "ptr"),
            IrType::Array(elem, len) => write!(f, "[{} x {}]", len, elem),
            IrType::Struct(name) => write!(f, "%{}", name),
        }
    }
}

/// The type used where `ty` flows through as a value (a call argument, a
/// return value, a loaded register).
pub fn lower(ty: &Type) -> IrType {
    match ty {
        Type::Int => IrType::I32,
        Type::Float => IrType::Double,
        Type::Bool => IrType::I1,
        Type::Byte => IrType::I8,
        Type::Str | Type::List(_) | Type::Struct(_) => IrType::Ptr,
        Type::Null => IrType::Void,
    }
}

/// The type an `alloca` backing a `ty`-typed binding should request. Scalars
/// allocate themselves; structs allocate their identified type; a `list:T`
/// literal of `len` elements allocates `[len x lower(T)]` (the one spot the
/// element count matters, before the pointer decays to its first element).
pub fn alloca_type(ty: &Type, list_len: Option<usize>) -> IrType {
    match ty {
        Type::Struct(name) => IrType::Struct(name.clone()),
        Type::List(inner) => IrType::Array(Box::new(lower(inner)), list_len.unwrap_or(0)),
        other => lower(other),
    }
}

/// Build the ordered `%Name = type { ... }` field list for a struct.
pub fn struct_fields(meta: &StructMetadata) -> Vec<IrType> {
    let mut fields: Vec<(u32, IrType)> = meta
        .field_names()
        .map(|name| {
            let info = meta.field(name).expect("field_names yields known fields");
            (info.index, lower(&info.ty))
        })
        .collect();
    fields.sort_by_key(|(idx, _)| *idx);
    fields.into_iter().map(|(_, ty)| ty).collect()
}

pub fn all_struct_fields(structs: &HashMap<String, StructMetadata>) -> HashMap<String, Vec<IrType>> {
    structs.iter().map(|(name, meta)| (name.clone(), struct_fields(meta))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_lower_directly() {
        assert_eq!(lower(&Type::Int), IrType::I32);
        assert_eq!(lower(&Type::Bool), IrType::I1);
    }

    #[test]
    fn pointer_shaped_types_are_opaque_ptr() {
        assert_eq!(lower(&Type::Str), IrType::Ptr);
        assert_eq!(lower(&Type::List(Box::new(Type::Int))), IrType::Ptr);
        assert_eq!(lower(&Type::Struct("Point".to_string())), IrType::Ptr);
    }

    #[test]
    fn list_alloca_type_carries_length() {
        let ty = alloca_type(&Type::List(Box::new(Type::Int)), Some(3));
        assert_eq!(ty, IrType::Array(Box::new(IrType::I32), 3));
    }

    #[test]
    fn struct_fields_are_index_ordered() {
        let mut meta = StructMetadata::new("Point");
        meta.push_field("y", Type::Int);
        meta.push_field("x", Type::Float);
        // declared y-then-x, but indices were assigned in that same order
        let fields = struct_fields(&meta);
        assert_eq!(fields, vec![IrType::I32, IrType::Double]);
    }
}
