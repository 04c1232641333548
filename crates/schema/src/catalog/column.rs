// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_ddl::ast::{ColumnLength, ColumnOption, ColumnType, OPTION_ALLOW_COMMIT_TIMESTAMP, OptionValue};
use keystone_type::Result;

use super::{NodeId, NodeMap};

/// A column node, owned by exactly one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
	pub name: String,
	pub ty: ColumnType,
	pub max_length: Option<ColumnLength>,
	pub not_null: bool,
	/// Options in submitted order, duplicates preserved. Readers resolve
	/// last-wins.
	pub options: Vec<ColumnOption>,
	/// Verbatim expression text for generated and default columns.
	pub expression: Option<String>,
	pub is_stored_generated: bool,
	pub has_default: bool,
	/// Owning table.
	pub table: NodeId,
	/// For index data-table columns, the user column this one mirrors.
	pub source_column: Option<NodeId>,
}

impl Column {
	pub fn new(name: impl Into<String>, ty: ColumnType, table: NodeId) -> Self {
		Self {
			name: name.into(),
			ty,
			max_length: None,
			not_null: false,
			options: Vec::new(),
			expression: None,
			is_stored_generated: false,
			has_default: false,
			table,
			source_column: None,
		}
	}

	/// The effective allow_commit_timestamp setting, last write wins.
	pub fn allow_commit_timestamp(&self) -> Option<bool> {
		self.options
			.iter()
			.rev()
			.find(|option| option.name == OPTION_ALLOW_COMMIT_TIMESTAMP)
			.and_then(|option| match option.value {
				OptionValue::Bool(value) => Some(value),
				_ => None,
			})
	}

	/// Apply a SET OPTIONS list: each submitted key replaces earlier
	/// settings of the same key.
	pub fn set_options(&mut self, options: Vec<ColumnOption>) {
		for option in options {
			self.options.retain(|existing| existing.name != option.name);
			self.options.push(option);
		}
	}

	pub(crate) fn deep_clone(&mut self, map: &NodeMap) -> Result<()> {
		self.table = map.image(self.table)?;
		self.source_column = map.image_opt(self.source_column)?;
		Ok(())
	}
}
