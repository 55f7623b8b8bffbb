pub mod codegen;
pub mod fuel;
pub mod network;
pub mod program;
pub mod vm;
