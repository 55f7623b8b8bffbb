use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("line {line}: invalid mass")]
pub struct MassError {
	line: usize,
	#[source]
	source: ParseIntError,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("total fuel does not fit in 64 bits")]
pub struct Overflow;

/// Reads one mass per line, skipping blank lines.
///
/// # Errors
///
/// Returns `MassError` for the first line that is not an integer.
pub fn parse(text: &str) -> Result<Vec<i64>, MassError> {
	text.lines()
		.enumerate()
		.filter(|(_, line)| !line.trim().is_empty())
		.map(|(index, line)| {
			line.trim().parse().map_err(|source| MassError {
				line: index + 1,
				source,
			})
		})
		.collect()
}

/// Fuel for a module of `mass`. With `recursive`, the fuel's own mass is
/// fuelled as well until the increment goes negative.
#[must_use]
pub fn required(mass: i64, recursive: bool) -> i64 {
	let fuel = mass / 3 - 2;

	if !recursive {
		return fuel;
	}

	let mut total = 0;
	let mut increment = fuel;

	while increment >= 0 {
		total += increment;
		increment = increment / 3 - 2;
	}

	total
}

/// # Errors
///
/// Returns `Overflow` if the sum leaves the `i64` range.
pub fn total<I>(masses: I, recursive: bool) -> Result<i64, Overflow>
where
	I: IntoIterator<Item = i64>,
{
	masses
		.into_iter()
		.map(|mass| required(mass, recursive))
		.try_fold(0_i64, |sum, fuel| sum.checked_add(fuel).ok_or(Overflow))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn direct_fuel() {
		assert_eq!(required(12, false), 2);
		assert_eq!(required(14, false), 2);
		assert_eq!(required(1969, false), 654);
		assert_eq!(required(100_756, false), 33583);
	}

	#[test]
	fn small_masses_go_negative_without_recursion() {
		assert_eq!(required(3, false), -1);
		assert_eq!(required(3, true), 0);
	}

	#[test]
	fn recursive_fuel() {
		assert_eq!(required(14, true), 2);
		assert_eq!(required(1969, true), 966);
		assert_eq!(required(100_756, true), 50346);
	}

	#[test]
	fn totals() {
		assert_eq!(total([12, 14, 1969], false), Ok(658));
		assert_eq!(total([14, 1969, 100_756], true), Ok(51314));
	}

	#[test]
	fn oversized_total_is_an_error() {
		let masses = parse(&"9223372036854775807\n".repeat(4)).unwrap();

		assert_eq!(total(masses.iter().copied(), false), Err(Overflow));
		assert_eq!(total(masses, true), Err(Overflow));
		assert_eq!(required(i64::MAX, true), 4_611_686_018_427_387_770);
	}

	#[test]
	fn parses_lines() {
		assert_eq!(parse("12\n\n 14\n").unwrap(), [12, 14]);
		assert_eq!(parse("1\nabc\n").unwrap_err().line, 2);
	}
}
