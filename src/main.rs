use std::{
	fs::File,
	io::{BufWriter, Write},
	process::ExitCode,
	str::FromStr,
};

use argh::FromArgs;
use intcode::{
	codegen, fuel,
	network::chain::{self, Chain, ChainError, Topology},
	program::parser::{self, ParseError},
	vm::{self, Interpreter, Limits, Status},
};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// An interpreter for comma separated intcode programs.
#[derive(FromArgs)]
struct Arguments {
	/// log interpreter state changes
	#[argh(switch)]
	verbose: bool,

	/// log every executed instruction
	#[argh(switch)]
	trace: bool,

	#[argh(subcommand)]
	command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
	Run(RunArguments),
	Chain(ChainArguments),
	Disassemble(DisassembleArguments),
	Fuel(FuelArguments),
}

/// Run a program until it halts and print its output, one value per line.
#[derive(FromArgs)]
#[argh(subcommand, name = "run")]
struct RunArguments {
	/// the program listing to run
	/// if not specified, stdin is used
	#[argh(option, short = 'i')]
	input: Option<String>,

	/// the output file to write to
	/// if not specified, stdout is used
	#[argh(option, short = 'o')]
	output: Option<String>,

	/// a value to queue as program input, may be repeated
	#[argh(option, short = 'v')]
	value: Vec<i64>,

	/// give up after this many instructions
	#[argh(option)]
	max_steps: Option<u64>,

	/// the number of cells memory may grow to
	#[argh(option, default = "Limits::default().memory_cells")]
	memory_cells: usize,

	/// whether the final memory image should be printed after the output
	#[argh(switch)]
	dump: bool,
}

/// Run one copy of a program per phase, each feeding the next.
#[derive(FromArgs)]
#[argh(subcommand, name = "chain")]
struct ChainArguments {
	/// the program listing to run
	/// if not specified, stdin is used
	#[argh(option, short = 'i')]
	input: Option<String>,

	/// the output file to write to
	/// if not specified, stdout is used
	#[argh(option, short = 'o')]
	output: Option<String>,

	/// comma separated phase settings, one per interpreter
	#[argh(option, short = 'p')]
	phases: Phases,

	/// whether the last interpreter feeds the first
	#[argh(switch)]
	feedback: bool,

	/// whether every ordering of the phases should be tried
	#[argh(switch)]
	search: bool,

	/// the number of cells memory may grow to, per interpreter
	#[argh(option, default = "Limits::default().memory_cells")]
	memory_cells: usize,
}

/// Write a disassembly of a program listing.
#[derive(FromArgs)]
#[argh(subcommand, name = "disassemble")]
struct DisassembleArguments {
	/// the program listing to disassemble
	/// if not specified, stdin is used
	#[argh(option, short = 'i')]
	input: Option<String>,

	/// the output file to write to
	/// if not specified, stdout is used
	#[argh(option, short = 'o')]
	output: Option<String>,
}

/// Sum the fuel needed for a list of module masses, one per line.
#[derive(FromArgs)]
#[argh(subcommand, name = "fuel")]
struct FuelArguments {
	/// the mass list to read
	/// if not specified, stdin is used
	#[argh(option, short = 'i')]
	input: Option<String>,

	/// the output file to write to
	/// if not specified, stdout is used
	#[argh(option, short = 'o')]
	output: Option<String>,

	/// whether the fuel itself needs fuel
	#[argh(switch)]
	recursive: bool,
}

struct Phases(Vec<i64>);

impl FromStr for Phases {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parser::parse(s).map(Self)
	}
}

#[derive(Debug, Error)]
enum RunError {
	#[error("i/o failed")]
	Io(#[from] std::io::Error),

	#[error("malformed program")]
	Parse(#[from] ParseError),

	#[error("malformed mass list")]
	Mass(#[from] fuel::MassError),

	#[error("fuel total failed")]
	Fuel(#[from] fuel::Overflow),

	#[error("execution failed")]
	Execution(#[from] vm::Error),

	#[error("chain failed")]
	Chain(#[from] ChainError),

	#[error("no halt after {0} instructions")]
	StepLimit(u64),
}

fn load_input(name: Option<&str>) -> std::io::Result<String> {
	if let Some(name) = name {
		std::fs::read_to_string(name)
	} else {
		let stdin = std::io::stdin().lock();

		std::io::read_to_string(stdin)
	}
}

fn load_output(name: Option<&str>) -> std::io::Result<Box<dyn Write>> {
	if let Some(name) = name {
		let file = File::create(name)?;

		Ok(Box::new(BufWriter::new(file)))
	} else {
		Ok(Box::new(std::io::stdout().lock()))
	}
}

fn join(values: &[i64]) -> String {
	let list: Vec<_> = values.iter().map(i64::to_string).collect();

	list.join(",")
}

fn run_program(arguments: &RunArguments) -> Result<(), RunError> {
	let image = parser::parse(&load_input(arguments.input.as_deref())?)?;
	let limits = Limits {
		memory_cells: arguments.memory_cells,
	};

	let mut interpreter = Interpreter::with_limits(image, limits);

	interpreter.add_inputs(arguments.value.iter().copied());

	while interpreter.has_more_instructions() {
		if let Some(max) = arguments.max_steps.filter(|&max| interpreter.steps() >= max) {
			return Err(RunError::StepLimit(max));
		}

		interpreter.step()?;
	}

	info!(
		steps = interpreter.steps(),
		status = %interpreter.status(),
		memory = interpreter.memory().len(),
		"program stopped"
	);

	if interpreter.status() == Status::AwaitingInput {
		warn!("program is still waiting for input");
	}

	let output = &mut load_output(arguments.output.as_deref())?;

	for value in interpreter.take_output() {
		writeln!(output, "{value}")?;
	}

	if arguments.dump {
		writeln!(output, "{}", join(interpreter.memory()))?;
	}

	output.flush()?;

	Ok(())
}

fn run_chain(arguments: &ChainArguments) -> Result<(), RunError> {
	let image = parser::parse(&load_input(arguments.input.as_deref())?)?;
	let limits = Limits {
		memory_cells: arguments.memory_cells,
	};

	let topology = if arguments.feedback {
		Topology::Feedback
	} else {
		Topology::Serial
	};

	let phases = &arguments.phases.0;
	let output = &mut load_output(arguments.output.as_deref())?;

	if arguments.search {
		let (order, signal) = chain::best_phases(&image, phases, topology, limits)?;

		info!(phases = %join(&order), signal, "best ordering found");

		writeln!(output, "{} {signal}", join(&order))?;
	} else {
		let signal = Chain::new(&image, phases, topology, limits).run()?;

		writeln!(output, "{signal}")?;
	}

	output.flush()?;

	Ok(())
}

fn run_disassemble(arguments: &DisassembleArguments) -> Result<(), RunError> {
	let image = parser::parse(&load_input(arguments.input.as_deref())?)?;
	let output = &mut load_output(arguments.output.as_deref())?;

	codegen::listing::write(output, &image)?;

	output.flush()?;

	Ok(())
}

fn run_fuel(arguments: &FuelArguments) -> Result<(), RunError> {
	let masses = fuel::parse(&load_input(arguments.input.as_deref())?)?;
	let output = &mut load_output(arguments.output.as_deref())?;

	let total = fuel::total(masses, arguments.recursive)?;

	writeln!(output, "{total}")?;

	output.flush()?;

	Ok(())
}

fn init_logging(arguments: &Arguments) {
	let default = if arguments.trace {
		"trace"
	} else if arguments.verbose {
		"debug"
	} else {
		"warn"
	};

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.init();
}

fn report(error: &dyn std::error::Error) {
	let mut message = error.to_string();
	let mut source = error.source();

	while let Some(cause) = source {
		message.push_str(": ");
		message.push_str(&cause.to_string());

		source = cause.source();
	}

	error!("{message}");
}

fn main() -> ExitCode {
	let arguments = argh::from_env::<Arguments>();

	init_logging(&arguments);

	let result = match &arguments.command {
		Command::Run(command) => run_program(command),
		Command::Chain(command) => run_chain(command),
		Command::Disassemble(command) => run_disassemble(command),
		Command::Fuel(command) => run_fuel(command),
	};

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(error) => {
			report(&error);

			ExitCode::FAILURE
		}
	}
}
