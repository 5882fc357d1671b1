pub mod generate;
pub mod init;

pub use generate::{generate, generate_framework, run, write_framework, FrameworkReport, GenerateArgs, UnitFailure};
pub use init::{init, InitArgs};
