// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::Result;

use super::{NodeId, NodeMap, TableKeyPart};

/// An index node. Back-references the indexed user table and owns a
/// backing data table holding clones of the key and stored columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
	pub name: String,
	/// The indexed user table.
	pub table: NodeId,
	pub null_filtered: bool,
	pub unique: bool,
	/// Key parts; columns belong to the indexed table.
	pub key_parts: Vec<TableKeyPart>,
	/// Stored (covering) columns of the indexed table.
	pub stored_columns: Vec<NodeId>,
	/// Interleave parent table, if the index is interleaved.
	pub parent: Option<NodeId>,
	/// Managed indexes back foreign keys and are created and dropped by
	/// the engine, never by the user.
	pub managed: bool,
	/// Owned backing data table.
	pub data_table: Option<NodeId>,
}

impl Index {
	pub(crate) fn deep_clone(&mut self, map: &NodeMap) -> Result<()> {
		self.table = map.image(self.table)?;
		for part in &mut self.key_parts {
			part.column = map.image(part.column)?;
		}
		self.stored_columns = map.image_vec(&self.stored_columns)?;
		self.parent = map.image_opt(self.parent)?;
		self.data_table = map.image_opt(self.data_table)?;
		Ok(())
	}
}
