use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
	#[error("program is empty")]
	Empty,

	#[error("cell {index}: `{token}` is not an integer")]
	InvalidInteger {
		index: usize,
		token: String,
		#[source]
		source: ParseIntError,
	},
}

/// Reads a comma separated listing into a memory image, in address order.
///
/// # Errors
///
/// Returns `ParseError::Empty` if the listing holds nothing but whitespace.
/// Returns `ParseError::InvalidInteger` for the first token that is not a signed 64 bit integer.
pub fn parse(listing: &str) -> Result<Vec<i64>, ParseError> {
	let listing = listing.trim();

	if listing.is_empty() {
		return Err(ParseError::Empty);
	}

	listing
		.split(',')
		.enumerate()
		.map(|(index, token)| {
			let token = token.trim();

			token.parse().map_err(|source| ParseError::InvalidInteger {
				index,
				token: token.to_owned(),
				source,
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_signed_cells() {
		let image = parse("109,1,204,-1,99").unwrap();

		assert_eq!(image, [109, 1, 204, -1, 99]);
	}

	#[test]
	fn ignores_surrounding_whitespace() {
		let image = parse("  1,0,0,0,99\n").unwrap();

		assert_eq!(image, [1, 0, 0, 0, 99]);
	}

	#[test]
	fn rejects_empty_listing() {
		assert!(matches!(parse(" \n"), Err(ParseError::Empty)));
	}

	#[test]
	fn reports_bad_token_position() {
		let error = parse("1,2,x3,4").unwrap_err();

		assert!(matches!(
			error,
			ParseError::InvalidInteger { index: 2, ref token, .. } if token == "x3"
		));
	}

	#[test]
	fn rejects_trailing_comma() {
		assert!(matches!(
			parse("1,2,"),
			Err(ParseError::InvalidInteger { index: 2, .. })
		));
	}

	#[test]
	fn rejects_out_of_range() {
		assert!(parse("99999999999999999999").is_err());
	}
}
