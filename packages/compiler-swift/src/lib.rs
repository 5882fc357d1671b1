mod compiler;
mod context;
pub mod naming;
pub mod variants;

pub use compiler::{compile_declaration, compile_registry};
pub use context::{CompileOptions, CompilerContext};
pub use naming::{initial_lowercased, MemberNames, MethodNames, NameEngine};
pub use variants::{VariantEntry, VariantExpansion};

#[cfg(test)]
mod tests;
