pub mod ast;
pub mod availability;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod parser;
pub mod type_parser;


pub use ast::{Availability, Declaration, ElementType, Method, Part, Property, Version};
pub use availability::{Annotated, AvailabilityResolver};
pub use config::GeneratorConfig;
pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use error::{ParseError, ParseResult, TypeError, TypeResult};
pub use parser::{parse, ParsedUnit, Parser};
pub use type_parser::{ParsedType, TypeParser};
