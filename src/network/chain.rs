use thiserror::Error;
use tracing::debug;

use crate::vm::{self, Interpreter, Limits, Status};

/// Where the last interpreter's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
	#[default]
	Serial,
	Feedback,
}

#[derive(Debug, Error)]
pub enum ChainError {
	#[error("chain has no interpreters")]
	Empty,

	#[error("every running interpreter is waiting for input")]
	Deadlock,

	#[error("the last interpreter emitted no signal")]
	NoSignal,

	#[error("interpreter {index} failed")]
	Interpreter {
		index: usize,
		#[source]
		source: vm::Error,
	},
}

/// Interpreters sharing one program, each fed by the previous one's output.
#[derive(Debug)]
pub struct Chain {
	stages: Vec<Interpreter>,
	topology: Topology,
	last_signal: Option<i64>,
}

impl Chain {
	/// Every stage receives its phase as first input; the first stage then receives `0`.
	#[must_use]
	pub fn new(image: &[i64], phases: &[i64], topology: Topology, limits: Limits) -> Self {
		let mut stages: Vec<_> = phases
			.iter()
			.map(|&phase| {
				let mut stage = Interpreter::with_limits(image.to_vec(), limits);

				stage.add_input(phase);

				stage
			})
			.collect();

		if let Some(first) = stages.first_mut() {
			first.add_input(0);
		}

		Self {
			stages,
			topology,
			last_signal: None,
		}
	}

	#[must_use]
	pub fn stages(&self) -> &[Interpreter] {
		&self.stages
	}

	fn drive(stage: &mut Interpreter, index: usize) -> Result<bool, ChainError> {
		let start = stage.steps();

		while stage.has_more_instructions() {
			stage
				.step()
				.map_err(|source| ChainError::Interpreter { index, source })?;
		}

		Ok(stage.steps() != start)
	}

	fn forward(&mut self, index: usize) -> bool {
		let values = self.stages[index].take_output();

		if values.is_empty() {
			return false;
		}

		let next = index + 1;

		if next < self.stages.len() {
			self.stages[next].add_inputs(values);
		} else {
			self.last_signal = values.last().copied();

			if self.topology == Topology::Feedback {
				self.stages[0].add_inputs(values);
			}
		}

		true
	}

	/// Drives the stages round robin until none can make progress and
	/// returns the last value emitted by the final stage.
	///
	/// # Errors
	///
	/// Returns `ChainError::Deadlock` if progress stops while a stage still waits for input.
	/// Returns `ChainError::NoSignal` if the final stage never emitted a value.
	/// Returns `ChainError::Interpreter` if a stage fails to step.
	pub fn run(&mut self) -> Result<i64, ChainError> {
		if self.stages.is_empty() {
			return Err(ChainError::Empty);
		}

		let mut round = 0_u64;

		loop {
			let mut progress = false;

			round += 1;

			for index in 0..self.stages.len() {
				progress |= Self::drive(&mut self.stages[index], index)?;
				progress |= self.forward(index);
			}

			debug!(round, progress, signal = ?self.last_signal, "chain round");

			if !progress {
				break;
			}
		}

		let stalled = self
			.stages
			.iter()
			.any(|stage| stage.status() == Status::AwaitingInput);

		if stalled {
			return Err(ChainError::Deadlock);
		}

		self.last_signal.ok_or(ChainError::NoSignal)
	}
}

fn permutations(items: &[i64]) -> Vec<Vec<i64>> {
	if items.len() <= 1 {
		return vec![items.to_vec()];
	}

	let mut result = Vec::new();

	for (index, &head) in items.iter().enumerate() {
		let mut rest = items.to_vec();

		rest.remove(index);

		for mut tail in permutations(&rest) {
			tail.insert(0, head);
			result.push(tail);
		}
	}

	result
}

/// Tries every ordering of `phases` and returns the one yielding the largest signal.
///
/// # Errors
///
/// Returns the first `ChainError` any ordering produces.
pub fn best_phases(
	image: &[i64],
	phases: &[i64],
	topology: Topology,
	limits: Limits,
) -> Result<(Vec<i64>, i64), ChainError> {
	let mut best: Option<(Vec<i64>, i64)> = None;

	for order in permutations(phases) {
		let signal = Chain::new(image, &order, topology, limits).run()?;

		if best.as_ref().map_or(true, |&(_, highest)| signal > highest) {
			best = Some((order, signal));
		}
	}

	best.ok_or(ChainError::Empty)
}
