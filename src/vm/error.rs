use thiserror::Error;

use super::data::Status;

/// Conditions that stop an interpreter for good.
///
/// Waiting for input is not one of them; see [`Status::AwaitingInput`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
	#[error("unknown addressing mode {mode} in instruction at {address}")]
	UnknownAddressingMode { address: usize, mode: i64 },

	#[error("invalid opcode {opcode} at {address}")]
	InvalidOpcode { address: usize, opcode: i64 },

	#[error("negative address {address}")]
	NegativeAddress { address: i64 },

	#[error("address {operand} + relative base {base} overflows")]
	AddressOverflow { operand: i64, base: i64 },

	#[error("address {address} exceeds the memory limit of {limit} cells")]
	MemoryLimit { address: usize, limit: usize },

	#[error("interpreter is not running ({status} at {position})")]
	NotRunning { status: Status, position: usize },
}
