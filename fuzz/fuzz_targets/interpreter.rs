#![no_main]

use intcode::vm::{Interpreter, Limits};
use intcode_fuzz::structured_program::StructuredProgram;
use libfuzzer_sys::fuzz_target;

static MAX_STEPS: u64 = 10_000;

fuzz_target!(|program: StructuredProgram| {
	let limits = Limits { memory_cells: 1 << 12 };
	let mut interpreter = Interpreter::with_limits(program.to_vec(), limits);

	interpreter.add_inputs(program.inputs().iter().copied());

	while interpreter.has_more_instructions() && interpreter.steps() < MAX_STEPS {
		if interpreter.step().is_err() {
			break;
		}
	}
});
