pub mod element;
pub mod registry;

pub use element::*;
pub use registry::*;
