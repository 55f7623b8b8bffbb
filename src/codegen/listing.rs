use std::{
	fmt::{self, Display, Formatter},
	io::{Result, Write},
};

use crate::vm::{Instruction, Mode};

struct Operand {
	mode: Mode,
	value: i64,
}

impl Display for Operand {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let value = self.value;

		match self.mode {
			Mode::Immediate => write!(f, "#{value}"),
			Mode::Position => write!(f, "[{value}]"),
			Mode::Relative if value < 0 => write!(f, "[rb-{}]", value.unsigned_abs()),
			Mode::Relative => write!(f, "[rb+{value}]"),
		}
	}
}

fn write_insn(
	w: &mut dyn Write,
	address: usize,
	instruction: &Instruction,
	operands: &[i64],
) -> Result<()> {
	write!(w, "{address:>6}: {}", instruction.opcode())?;

	let modes = instruction.modes().iter().copied();

	for (index, (mode, value)) in modes.zip(operands.iter().copied()).enumerate() {
		let separator = if index == 0 { " " } else { ", " };

		write!(w, "{separator}{}", Operand { mode, value })?;
	}

	writeln!(w)
}

/// Writes a linear disassembly of `image`. Cells that do not decode, or whose
/// operands run past the end, are written as `data`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write(writer: &mut dyn Write, image: &[i64]) -> Result<()> {
	let mut address = 0;

	while let Some(&cell) = image.get(address) {
		match Instruction::decode(cell, address) {
			Ok(instruction) if address + instruction.width() <= image.len() => {
				let operands = &image[address + 1..address + instruction.width()];

				write_insn(writer, address, &instruction, operands)?;

				address += instruction.width();
			}
			_ => {
				writeln!(writer, "{address:>6}: data {cell}")?;

				address += 1;
			}
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn listing(image: &[i64]) -> String {
		let mut buffer = Vec::new();

		write(&mut buffer, image).unwrap();

		String::from_utf8(buffer).unwrap()
	}

	#[test]
	fn renders_every_mode() {
		let text = listing(&[1002, 4, 3, 4, 109, -1, 204, 1, 2201, -2, 3, 0, 99]);

		assert_eq!(
			text,
			concat!(
				"     0: MUL [4], #3, [4]\n",
				"     4: RBASE #-1\n",
				"     6: OUT [rb+1]\n",
				"     8: ADD [rb-2], [rb+3], [0]\n",
				"    12: HALT\n",
			)
		);
	}

	#[test]
	fn undecodable_cells_are_data() {
		let text = listing(&[33, 1, 7]);

		assert_eq!(text, "     0: data 33\n     1: data 1\n     2: data 7\n");
	}

	#[test]
	fn truncated_instruction_is_data() {
		let text = listing(&[99, 1101, 1]);

		assert_eq!(text, "     0: HALT\n     1: data 1101\n     2: data 1\n");
	}
}
