use std::collections::VecDeque;

use tracing::{debug, trace};

use super::{
	data::{Instruction, Mode, Opcode, Status},
	error::Error,
	memory::{Limits, Memory},
};

/// A single machine. It never drives itself; callers repeat
/// [`Interpreter::step`] while [`Interpreter::has_more_instructions`] holds.
#[derive(Debug, Clone)]
pub struct Interpreter {
	memory: Memory,
	position: usize,
	relative_base: i64,
	status: Status,

	input: VecDeque<i64>,
	output: VecDeque<i64>,
	steps: u64,
}

impl Interpreter {
	#[must_use]
	pub fn new(image: Vec<i64>) -> Self {
		Self::with_limits(image, Limits::default())
	}

	#[must_use]
	pub fn with_limits(image: Vec<i64>, limits: Limits) -> Self {
		Self {
			memory: Memory::new(image, limits),
			position: 0,
			relative_base: 0,
			status: Status::Running,
			input: VecDeque::new(),
			output: VecDeque::new(),
			steps: 0,
		}
	}

	#[must_use]
	pub fn has_more_instructions(&self) -> bool {
		self.status == Status::Running && self.position < self.memory.len()
	}

	#[must_use]
	pub const fn status(&self) -> Status {
		self.status
	}

	#[must_use]
	pub const fn position(&self) -> usize {
		self.position
	}

	#[must_use]
	pub const fn relative_base(&self) -> i64 {
		self.relative_base
	}

	#[must_use]
	pub fn memory(&self) -> &[i64] {
		self.memory.as_slice()
	}

	/// Number of instructions executed so far.
	#[must_use]
	pub const fn steps(&self) -> u64 {
		self.steps
	}

	pub fn add_input(&mut self, value: i64) {
		self.input.push_back(value);

		if self.status == Status::AwaitingInput {
			debug!(position = self.position, "resumed");

			self.status = Status::Running;
		}
	}

	pub fn add_inputs<I>(&mut self, values: I)
	where
		I: IntoIterator<Item = i64>,
	{
		values.into_iter().for_each(|value| self.add_input(value));
	}

	#[must_use]
	pub const fn output(&self) -> &VecDeque<i64> {
		&self.output
	}

	pub fn pop_output(&mut self) -> Option<i64> {
		self.output.pop_front()
	}

	pub fn take_output(&mut self) -> Vec<i64> {
		self.output.drain(..).collect()
	}

	fn resolve(&self, operand: i64, mode: Mode) -> Result<usize, Error> {
		let address = match mode {
			Mode::Position | Mode::Immediate => operand,
			Mode::Relative => {
				operand
					.checked_add(self.relative_base)
					.ok_or(Error::AddressOverflow {
						operand,
						base: self.relative_base,
					})?
			}
		};

		usize::try_from(address).map_err(|_| Error::NegativeAddress { address })
	}

	fn read(&mut self, operand: i64, mode: Mode) -> Result<i64, Error> {
		if mode == Mode::Immediate {
			return Ok(operand);
		}

		let address = self.resolve(operand, mode)?;

		self.memory.read(address)
	}

	// Immediate mode is written through like position mode.
	fn write(&mut self, operand: i64, mode: Mode, value: i64) -> Result<(), Error> {
		let address = self.resolve(operand, mode)?;

		self.memory.write(address, value)
	}

	fn fetch_operands(&mut self, instruction: &Instruction) -> Result<[i64; 3], Error> {
		let mut operands = [0; 3];
		let arity = instruction.opcode().arity();

		for (index, operand) in operands.iter_mut().enumerate().take(arity) {
			*operand = self.memory.read(self.position + 1 + index)?;
		}

		Ok(operands)
	}

	fn binary<F>(&mut self, instruction: &Instruction, operands: [i64; 3], op: F) -> Result<(), Error>
	where
		F: FnOnce(i64, i64) -> i64,
	{
		let [a, b, c] = operands;
		let lhs = self.read(a, instruction.mode(0))?;
		let rhs = self.read(b, instruction.mode(1))?;

		self.write(c, instruction.mode(2), op(lhs, rhs))
	}

	fn branch(
		&mut self,
		instruction: &Instruction,
		operands: [i64; 3],
		taken: fn(i64) -> bool,
	) -> Result<Option<i64>, Error> {
		let [a, b, _] = operands;

		if taken(self.read(a, instruction.mode(0))?) {
			self.read(b, instruction.mode(1)).map(Some)
		} else {
			Ok(None)
		}
	}

	/// Executes the instruction at the current position.
	///
	/// An input instruction with nothing queued leaves the position alone
	/// and switches the status to [`Status::AwaitingInput`].
	///
	/// # Errors
	///
	/// Returns `Error::NotRunning` if `has_more_instructions` is false.
	/// Returns any decoding or addressing error, after which the status is [`Status::Faulted`].
	pub fn step(&mut self) -> Result<(), Error> {
		if !self.has_more_instructions() {
			return Err(Error::NotRunning {
				status: self.status,
				position: self.position,
			});
		}

		self.execute().inspect_err(|error| {
			debug!(position = self.position, %error, "faulted");

			self.status = Status::Faulted;
		})
	}

	fn execute(&mut self) -> Result<(), Error> {
		let address = self.position;
		let instruction = Instruction::decode(self.memory.read(address)?, address)?;
		let operands = self.fetch_operands(&instruction)?;

		trace!(address, opcode = %instruction.opcode(), ?operands, "step");

		let jump = match instruction.opcode() {
			Opcode::Add => self.binary(&instruction, operands, i64::wrapping_add).map(|()| None)?,
			Opcode::Mul => self.binary(&instruction, operands, i64::wrapping_mul).map(|()| None)?,
			Opcode::LessThan => self
				.binary(&instruction, operands, |lhs, rhs| i64::from(lhs < rhs))
				.map(|()| None)?,
			Opcode::Equals => self
				.binary(&instruction, operands, |lhs, rhs| i64::from(lhs == rhs))
				.map(|()| None)?,
			Opcode::Input => {
				let Some(&value) = self.input.front() else {
					debug!(address, "awaiting input");

					self.status = Status::AwaitingInput;

					return Ok(());
				};

				self.write(operands[0], instruction.mode(0), value)?;
				self.input.pop_front();

				None
			}
			Opcode::Output => {
				let value = self.read(operands[0], instruction.mode(0))?;

				self.output.push_back(value);

				None
			}
			Opcode::JumpIfTrue => self.branch(&instruction, operands, |value| value != 0)?,
			Opcode::JumpIfFalse => self.branch(&instruction, operands, |value| value == 0)?,
			Opcode::AdjustBase => {
				let offset = self.read(operands[0], instruction.mode(0))?;

				self.relative_base = self.relative_base.wrapping_add(offset);

				None
			}
			Opcode::Halt => {
				debug!(address, steps = self.steps + 1, "terminated");

				self.status = Status::Terminated;
				self.steps += 1;

				return Ok(());
			}
		};

		self.position = match jump {
			Some(target) => {
				usize::try_from(target).map_err(|_| Error::NegativeAddress { address: target })?
			}
			None => address + instruction.width(),
		};

		self.steps += 1;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn run(image: Vec<i64>, inputs: &[i64]) -> Interpreter {
		let mut interpreter = Interpreter::new(image);

		interpreter.add_inputs(inputs.iter().copied());

		while interpreter.has_more_instructions() {
			interpreter.step().unwrap();
		}

		interpreter
	}

	#[test]
	fn add_in_position_mode() {
		let interpreter = run(vec![1, 0, 0, 0, 99], &[]);

		assert_eq!(interpreter.memory(), [2, 0, 0, 0, 99]);
		assert_eq!(interpreter.status(), Status::Terminated);
		assert_eq!(interpreter.steps(), 2);
	}

	#[test]
	fn arithmetic_composes() {
		let interpreter = run(vec![1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50], &[]);

		assert_eq!(interpreter.memory()[0], 3500);

		let interpreter = run(vec![1, 1, 1, 4, 99, 5, 6, 0, 99], &[]);

		assert_eq!(interpreter.memory(), [30, 1, 1, 4, 2, 5, 6, 0, 99]);
	}

	#[test]
	fn input_stalls_then_resumes() {
		let mut interpreter = Interpreter::new(vec![3, 5, 4, 5, 99, 0]);

		interpreter.step().unwrap();

		assert_eq!(interpreter.status(), Status::AwaitingInput);
		assert_eq!(interpreter.position(), 0);
		assert!(!interpreter.has_more_instructions());
		assert_eq!(interpreter.steps(), 0);

		interpreter.add_input(13);

		assert_eq!(interpreter.status(), Status::Running);

		interpreter.step().unwrap();

		assert_eq!(interpreter.position(), 2);
		assert_eq!(interpreter.memory()[5], 13);

		interpreter.step().unwrap();
		interpreter.step().unwrap();

		assert_eq!(interpreter.take_output(), [13]);
		assert_eq!(interpreter.status(), Status::Terminated);
	}

	#[test]
	fn input_consumes_one_value_per_step() {
		let mut interpreter = Interpreter::new(vec![3, 0, 99]);

		interpreter.add_inputs([7, 8]);
		interpreter.step().unwrap();

		assert_eq!(interpreter.memory()[0], 7);
		assert_eq!(interpreter.position(), 2);
	}

	#[test]
	fn predicate_is_pure() {
		let interpreter = Interpreter::new(vec![3, 0, 99]);

		for _ in 0..4 {
			assert!(interpreter.has_more_instructions());
		}

		assert_eq!(interpreter.position(), 0);
		assert_eq!(interpreter.memory(), [3, 0, 99]);
	}

	#[test]
	fn relative_write_then_read() {
		let interpreter = run(vec![109, 20, 21101, 7, 0, -5, 204, -5, 99], &[]);

		assert_eq!(interpreter.output().iter().copied().collect::<Vec<_>>(), [7]);
		assert_eq!(interpreter.memory().len(), 16);
		assert_eq!(interpreter.memory()[15], 7);
		assert_eq!(interpreter.relative_base(), 20);
	}

	#[test]
	fn relative_with_negative_base() {
		let interpreter = run(vec![109, -3, 21101, 42, 0, 20, 204, 20, 99], &[]);

		assert_eq!(interpreter.output().front(), Some(&42));
		assert_eq!(interpreter.memory()[17], 42);
	}

	#[test]
	fn write_past_end_grows_memory() {
		let interpreter = run(vec![1101, 2, 3, 10, 99], &[]);

		assert_eq!(interpreter.memory(), [1101, 2, 3, 10, 99, 0, 0, 0, 0, 0, 5]);
	}

	#[test]
	fn comparisons_and_jumps() {
		// Outputs 1 if the input equals 8, else 0.
		let program = vec![3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8];

		assert_eq!(run(program.clone(), &[8]).take_output(), [1]);
		assert_eq!(run(program, &[5]).take_output(), [0]);

		// Outputs 0 if the input is 0, else 1.
		let program = vec![3, 12, 6, 12, 15, 1, 13, 14, 13, 4, 13, 99, -1, 0, 1, 9];

		assert_eq!(run(program.clone(), &[0]).take_output(), [0]);
		assert_eq!(run(program, &[3]).take_output(), [1]);
	}

	#[test]
	fn jump_if_true_takes_negative_conditions() {
		let interpreter = run(vec![1105, -1, 4, 99, 104, 1, 99], &[]);

		assert_eq!(interpreter.output().front(), Some(&1));
	}

	#[test]
	fn immediate_write_acts_as_position() {
		let interpreter = run(vec![11101, 4, 5, 0, 99], &[]);

		assert_eq!(interpreter.memory()[0], 9);
	}

	#[test]
	fn invalid_opcode_is_fatal() {
		let mut interpreter = Interpreter::new(vec![1101, 1, 1, 5, 42, 0]);

		interpreter.step().unwrap();

		assert_eq!(
			interpreter.step(),
			Err(Error::InvalidOpcode {
				address: 4,
				opcode: 42
			})
		);
	}

	#[test]
	fn fault_stops_the_interpreter() {
		let mut interpreter = Interpreter::new(vec![42, 0, 99]);

		assert!(interpreter.step().is_err());
		assert_eq!(interpreter.status(), Status::Faulted);
		assert!(!interpreter.has_more_instructions());
		assert_eq!(
			interpreter.step(),
			Err(Error::NotRunning {
				status: Status::Faulted,
				position: 0
			})
		);
	}

	#[test]
	fn unknown_mode_is_fatal() {
		let mut interpreter = Interpreter::new(vec![304, 0, 99]);

		assert_eq!(
			interpreter.step(),
			Err(Error::UnknownAddressingMode { address: 0, mode: 3 })
		);
	}

	#[test]
	fn negative_address_is_fatal() {
		let mut interpreter = Interpreter::new(vec![4, -1, 99]);

		assert_eq!(
			interpreter.step(),
			Err(Error::NegativeAddress { address: -1 })
		);

		let mut interpreter = Interpreter::new(vec![1105, 1, -4, 99]);

		assert_eq!(
			interpreter.step(),
			Err(Error::NegativeAddress { address: -4 })
		);
	}

	#[test]
	fn memory_limit_is_fatal() {
		let limits = Limits { memory_cells: 8 };
		let mut interpreter = Interpreter::with_limits(vec![1101, 1, 1, 100, 99], limits);

		assert_eq!(
			interpreter.step(),
			Err(Error::MemoryLimit {
				address: 100,
				limit: 8
			})
		);
	}

	#[test]
	fn stepping_after_halt_is_rejected() {
		let mut interpreter = run(vec![99], &[]);

		assert!(!interpreter.has_more_instructions());
		assert_eq!(
			interpreter.step(),
			Err(Error::NotRunning {
				status: Status::Terminated,
				position: 0
			})
		);
	}

	#[test]
	fn jump_out_of_memory_stops_without_halt() {
		let interpreter = run(vec![1105, 1, 50], &[]);

		assert_eq!(interpreter.status(), Status::Running);
		assert_eq!(interpreter.position(), 50);
		assert!(!interpreter.has_more_instructions());
	}

	#[test]
	fn large_values() {
		let interpreter = run(vec![1102, 34_915_192, 34_915_192, 7, 4, 7, 99, 0], &[]);

		assert_eq!(interpreter.output().front(), Some(&1_219_070_632_396_864));

		let interpreter = run(vec![104, 1_125_899_906_842_624, 99], &[]);

		assert_eq!(interpreter.output().front(), Some(&1_125_899_906_842_624));
	}
}
