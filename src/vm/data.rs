use std::fmt::{Display, Formatter, Result as FmtResult};

use super::error::Error;

/// How an operand is turned into a value or an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
	#[default]
	Position,
	Immediate,
	Relative,
}

impl TryFrom<i64> for Mode {
	type Error = i64;

	fn try_from(value: i64) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Self::Position),
			1 => Ok(Self::Immediate),
			2 => Ok(Self::Relative),
			_ => Err(value),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
	Add,
	Mul,
	Input,
	Output,
	JumpIfTrue,
	JumpIfFalse,
	LessThan,
	Equals,
	AdjustBase,
	Halt,
}

impl Opcode {
	#[must_use]
	pub const fn arity(self) -> usize {
		match self {
			Self::Add | Self::Mul | Self::LessThan | Self::Equals => 3,
			Self::JumpIfTrue | Self::JumpIfFalse => 2,
			Self::Input | Self::Output | Self::AdjustBase => 1,
			Self::Halt => 0,
		}
	}

	#[must_use]
	pub const fn mnemonic(self) -> &'static str {
		match self {
			Self::Add => "ADD",
			Self::Mul => "MUL",
			Self::Input => "IN",
			Self::Output => "OUT",
			Self::JumpIfTrue => "JIT",
			Self::JumpIfFalse => "JIF",
			Self::LessThan => "LT",
			Self::Equals => "EQ",
			Self::AdjustBase => "RBASE",
			Self::Halt => "HALT",
		}
	}
}

impl TryFrom<i64> for Opcode {
	type Error = i64;

	fn try_from(value: i64) -> Result<Self, Self::Error> {
		let opcode = match value {
			1 => Self::Add,
			2 => Self::Mul,
			3 => Self::Input,
			4 => Self::Output,
			5 => Self::JumpIfTrue,
			6 => Self::JumpIfFalse,
			7 => Self::LessThan,
			8 => Self::Equals,
			9 => Self::AdjustBase,
			99 => Self::Halt,
			_ => return Err(value),
		};

		Ok(opcode)
	}
}

impl Display for Opcode {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(self.mnemonic())
	}
}

/// A decoded instruction cell. Operand values live in the cells after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
	opcode: Opcode,
	modes: [Mode; 3],
}

impl Instruction {
	/// # Errors
	///
	/// Returns `Error::InvalidOpcode` if the two low digits name no opcode.
	/// Returns `Error::UnknownAddressingMode` if an operand's mode digit is not 0, 1 or 2.
	pub fn decode(cell: i64, address: usize) -> Result<Self, Error> {
		let opcode = Opcode::try_from(cell % 100)
			.map_err(|opcode| Error::InvalidOpcode { address, opcode })?;

		let mut modes = [Mode::Position; 3];
		let mut digits = cell / 100;

		for mode in modes.iter_mut().take(opcode.arity()) {
			*mode = Mode::try_from(digits % 10)
				.map_err(|mode| Error::UnknownAddressingMode { address, mode })?;

			digits /= 10;
		}

		Ok(Self { opcode, modes })
	}

	#[must_use]
	pub const fn opcode(&self) -> Opcode {
		self.opcode
	}

	/// Mode of operand `index`, `Mode::Position` past the arity.
	#[must_use]
	pub const fn mode(&self, index: usize) -> Mode {
		self.modes[index]
	}

	#[must_use]
	pub fn modes(&self) -> &[Mode] {
		&self.modes[..self.opcode.arity()]
	}

	/// Cells occupied by the instruction and its operands.
	#[must_use]
	pub const fn width(&self) -> usize {
		self.opcode.arity() + 1
	}
}

/// Execution state as observed by whoever drives the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
	#[default]
	Running,
	AwaitingInput,
	Terminated,
	/// A step failed; the interpreter cannot continue.
	Faulted,
}

impl Display for Status {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self {
			Self::Running => write!(f, "running"),
			Self::AwaitingInput => write!(f, "awaiting input"),
			Self::Terminated => write!(f, "terminated"),
			Self::Faulted => write!(f, "faulted"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_modes_least_significant_first() {
		let instruction = Instruction::decode(1002, 0).unwrap();

		assert_eq!(instruction.opcode(), Opcode::Mul);
		assert_eq!(
			instruction.modes(),
			[Mode::Position, Mode::Immediate, Mode::Position]
		);
	}

	#[test]
	fn missing_mode_digits_default_to_position() {
		let instruction = Instruction::decode(4, 0).unwrap();

		assert_eq!(instruction.opcode(), Opcode::Output);
		assert_eq!(instruction.modes(), [Mode::Position]);
		assert_eq!(instruction.width(), 2);
	}

	#[test]
	fn relative_modes_decode() {
		let instruction = Instruction::decode(21107, 0).unwrap();

		assert_eq!(instruction.opcode(), Opcode::LessThan);
		assert_eq!(
			instruction.modes(),
			[Mode::Immediate, Mode::Immediate, Mode::Relative]
		);
	}

	#[test]
	fn halt_ignores_leading_digits() {
		let instruction = Instruction::decode(399, 0).unwrap();

		assert_eq!(instruction.opcode(), Opcode::Halt);
		assert!(instruction.modes().is_empty());
	}

	#[test]
	fn rejects_unknown_mode() {
		let error = Instruction::decode(301, 7).unwrap_err();

		assert!(matches!(
			error,
			Error::UnknownAddressingMode {
				address: 7,
				mode: 3
			}
		));
	}

	#[test]
	fn rejects_unknown_opcode() {
		assert!(matches!(
			Instruction::decode(42, 3),
			Err(Error::InvalidOpcode {
				address: 3,
				opcode: 42
			})
		));

		assert!(matches!(
			Instruction::decode(-1, 0),
			Err(Error::InvalidOpcode { opcode: -1, .. })
		));
	}
}
