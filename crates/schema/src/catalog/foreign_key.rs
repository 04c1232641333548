// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::Result;

use super::{NodeId, NodeMap};

/// A foreign-key relationship between two tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
	/// User-supplied constraint name; authoritative when present.
	pub constraint_name: Option<String>,
	/// Engine-assigned name for unnamed foreign keys. Assigned once at
	/// creation and stable across clones.
	pub generated_name: String,
	/// The table the foreign key is defined on.
	pub referencing_table: NodeId,
	pub referencing_columns: Vec<NodeId>,
	/// Managed backing index on the referencing side; None when the
	/// referencing table's primary key serves.
	pub referencing_index: Option<NodeId>,
	pub referenced_table: NodeId,
	pub referenced_columns: Vec<NodeId>,
	/// Managed backing index on the referenced side; None when the
	/// referenced table's primary key serves.
	pub referenced_index: Option<NodeId>,
}

impl ForeignKey {
	pub fn name(&self) -> &str {
		self.constraint_name.as_deref().unwrap_or(&self.generated_name)
	}

	pub(crate) fn deep_clone(&mut self, map: &NodeMap) -> Result<()> {
		self.referencing_table = map.image(self.referencing_table)?;
		self.referencing_columns = map.image_vec(&self.referencing_columns)?;
		self.referencing_index = map.image_opt(self.referencing_index)?;
		self.referenced_table = map.image(self.referenced_table)?;
		self.referenced_columns = map.image_vec(&self.referenced_columns)?;
		self.referenced_index = map.image_opt(self.referenced_index)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_constraint_name_is_authoritative() {
		let mut foreign_key = ForeignKey {
			constraint_name: None,
			generated_name: "FK_Albums_Users_1".to_string(),
			referencing_table: NodeId(0),
			referencing_columns: vec![],
			referencing_index: None,
			referenced_table: NodeId(1),
			referenced_columns: vec![],
			referenced_index: None,
		};
		assert_eq!(foreign_key.name(), "FK_Albums_Users_1");
		foreign_key.constraint_name = Some("FK_USER".to_string());
		assert_eq!(foreign_key.name(), "FK_USER");
	}
}
