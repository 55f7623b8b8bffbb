use std::{fmt::Write, ops::Deref};

use arbitrary::{Arbitrary, Result, Unstructured};

/// Shape of one comma separated cell.
#[derive(Arbitrary)]
enum Cell {
	Number { negative: bool, digits: u8 },
	Empty,
	Sign,
	Padded(i64),
	Junk(char),
}

fn add_digits(u: &mut Unstructured, count: u8, buffer: &mut String) -> Result<()> {
	// 1 to 20 digits, so some cells overflow an i64.
	for _ in 0..=count % 20 {
		let digit: u8 = u.int_in_range(0..=9)?;

		buffer.push(char::from(b'0' + digit));
	}

	Ok(())
}

fn add_cell(u: &mut Unstructured, buffer: &mut String) -> Result<()> {
	match Cell::arbitrary(u)? {
		Cell::Number { negative, digits } => {
			if negative {
				buffer.push('-');
			}

			add_digits(u, digits, buffer)?;
		}
		Cell::Empty => {}
		Cell::Sign => buffer.push('-'),
		Cell::Padded(value) => {
			let _ = write!(buffer, " {value} ");
		}
		Cell::Junk(c) => buffer.push(c),
	}

	Ok(())
}

/// Program listings that are comma separated and mostly well formed.
#[derive(Debug)]
pub struct ListingString {
	content: String,
}

impl Arbitrary<'_> for ListingString {
	fn arbitrary(u: &mut Unstructured) -> Result<Self> {
		let len = u.arbitrary_len::<Cell>()?;
		let mut content = String::new();

		for index in 0..len {
			if index != 0 {
				content.push(',');
			}

			add_cell(u, &mut content)?;
		}

		if u.arbitrary()? {
			content.push('\n');
		}

		Ok(Self { content })
	}
}

impl Deref for ListingString {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.content
	}
}
