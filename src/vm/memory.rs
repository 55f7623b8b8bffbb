use tracing::debug;

use super::error::Error;

/// Upper bounds an interpreter enforces on itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
	/// Largest number of cells memory may grow to.
	pub memory_cells: usize,
}

impl Default for Limits {
	fn default() -> Self {
		Self {
			memory_cells: 1 << 24,
		}
	}
}

/// Linear memory that grows to the right, zero filled, and never shrinks.
#[derive(Debug, Clone)]
pub struct Memory {
	cells: Vec<i64>,
	limit: usize,
}

impl Memory {
	#[must_use]
	pub fn new(image: Vec<i64>, limits: Limits) -> Self {
		Self {
			cells: image,
			limit: limits.memory_cells,
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.cells.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.cells.is_empty()
	}

	#[must_use]
	pub fn as_slice(&self) -> &[i64] {
		&self.cells
	}

	fn reserve(&mut self, address: usize) -> Result<(), Error> {
		if address < self.cells.len() {
			return Ok(());
		}

		if address >= self.limit {
			return Err(Error::MemoryLimit {
				address,
				limit: self.limit,
			});
		}

		debug!(from = self.cells.len(), to = address + 1, "memory grown");

		self.cells.resize(address + 1, 0);

		Ok(())
	}

	/// # Errors
	///
	/// Returns `Error::MemoryLimit` if reaching `address` would grow past the limit.
	pub fn read(&mut self, address: usize) -> Result<i64, Error> {
		self.reserve(address)?;

		Ok(self.cells[address])
	}

	/// # Errors
	///
	/// Returns `Error::MemoryLimit` if reaching `address` would grow past the limit.
	pub fn write(&mut self, address: usize, value: i64) -> Result<(), Error> {
		self.reserve(address)?;

		self.cells[address] = value;

		Ok(())
	}
}
