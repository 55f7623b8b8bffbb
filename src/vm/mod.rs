pub mod data;
pub mod error;
pub mod interpreter;
pub mod memory;

pub use data::{Instruction, Mode, Opcode, Status};
pub use error::Error;
pub use interpreter::Interpreter;
pub use memory::{Limits, Memory};
