use std::ops::Deref;

use arbitrary::{Arbitrary, Result, Unstructured};

#[derive(Arbitrary, Clone, Copy)]
enum Op {
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
	Data,
}

impl Op {
	const fn code(self) -> i64 {
		match self {
			Self::Add => 1,
			Self::Mul => 2,
			Self::Input => 3,
			Self::Output => 4,
			Self::JumpIfTrue => 5,
			Self::JumpIfFalse => 6,
			Self::LessThan => 7,
			Self::Equals => 8,
			Self::AdjustBase => 9,
			Self::Halt => 99,
			Self::Data => 0,
		}
	}

	const fn arity(self) -> usize {
		match self {
			Self::Add | Self::Mul | Self::LessThan | Self::Equals => 3,
			Self::JumpIfTrue | Self::JumpIfFalse => 2,
			Self::Input | Self::Output | Self::AdjustBase => 1,
			Self::Halt | Self::Data => 0,
		}
	}
}

fn add_instruction(u: &mut Unstructured, cells: &mut Vec<i64>) -> Result<()> {
	let op = Op::arbitrary(u)?;

	if let Op::Data = op {
		cells.push(u.arbitrary()?);

		return Ok(());
	}

	let mut modes = 0;
	let mut scale = 100;

	for _ in 0..op.arity() {
		modes += scale * u.int_in_range(0..=2)?;
		scale *= 10;
	}

	cells.push(modes + op.code());

	for _ in 0..op.arity() {
		cells.push(u.int_in_range(-16..=256)?);
	}

	Ok(())
}

/// Mostly well formed instruction streams along with queued input.
#[derive(Debug)]
pub struct StructuredProgram {
	cells: Vec<i64>,
	inputs: Vec<i64>,
}

impl StructuredProgram {
	#[must_use]
	pub fn inputs(&self) -> &[i64] {
		&self.inputs
	}
}

impl Arbitrary<'_> for StructuredProgram {
	fn arbitrary(u: &mut Unstructured) -> Result<Self> {
		let inputs = u.arbitrary()?;
		let mut cells = Vec::new();

		while !u.is_empty() {
			add_instruction(u, &mut cells)?;
		}

		Ok(Self { cells, inputs })
	}
}

impl Deref for StructuredProgram {
	type Target = [i64];

	fn deref(&self) -> &Self::Target {
		&self.cells
	}
}
