//! A small, self-contained textual-LLVM-IR builder: just enough of the
//! `ir.Module`/`ir.IRBuilder` surface the reference implementation leans on
//! (fresh names, an entry-block allocator, one buffer per function) to
//! stand in for an actual LLVM binding.

pub mod builder;
pub mod function;
pub mod module;
pub mod types;
pub mod value;

pub use function::FunctionBuilder;
pub use module::{decay_string_global, Module};
pub use types::IrType;
pub use value::Value;
