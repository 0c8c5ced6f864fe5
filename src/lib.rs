pub mod codegen;
pub mod driver;
