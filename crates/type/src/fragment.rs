// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use serde::{Deserialize, Serialize};

/// A slice of statement text together with its position.
///
/// Line and column are 1-based; `offset` is the byte offset of the first
/// character within the statement, which lets consumers slice the original
/// source verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
	text: String,
	line: u32,
	column: u32,
	offset: usize,
}

impl Fragment {
	pub fn new(text: impl Into<String>, line: u32, column: u32, offset: usize) -> Self {
		Self {
			text: text.into(),
			line,
			column,
			offset,
		}
	}

	/// A fragment with no source position, for errors that are not tied
	/// to a location in the statement text.
	pub fn none() -> Self {
		Self::default()
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn line(&self) -> u32 {
		self.line
	}

	pub fn column(&self) -> u32 {
		self.column
	}

	pub fn offset(&self) -> usize {
		self.offset
	}

	pub fn is_positioned(&self) -> bool {
		self.line > 0
	}
}

impl std::fmt::Display for Fragment {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fragment_accessors() {
		let fragment = Fragment::new("PRIMARY", 3, 7, 42);
		assert_eq!(fragment.text(), "PRIMARY");
		assert_eq!(fragment.line(), 3);
		assert_eq!(fragment.column(), 7);
		assert_eq!(fragment.offset(), 42);
		assert!(fragment.is_positioned());
	}

	#[test]
	fn test_fragment_none() {
		let fragment = Fragment::none();
		assert_eq!(fragment.text(), "");
		assert!(!fragment.is_positioned());
	}
}
