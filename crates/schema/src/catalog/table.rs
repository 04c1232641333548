// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_ddl::ast::{OnDeleteAction, SortOrder};
use keystone_type::Result;

use super::{NodeId, NodeMap, SchemaGraph};

/// One primary-key or index-key part, pointing at a column node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableKeyPart {
	pub column: NodeId,
	pub order: SortOrder,
}

/// A table node. Owns its columns, constraints and row-deletion policy;
/// carries back-references to the indexes over it and, for index backing
/// tables, to the owning index.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
	pub name: String,
	pub columns: Vec<NodeId>,
	pub primary_key: Vec<TableKeyPart>,
	pub parent: Option<NodeId>,
	pub on_delete: OnDeleteAction,
	pub children: Vec<NodeId>,
	/// Indexes whose indexed table is this one. Managed backing indexes
	/// are owned through this edge as well.
	pub indexes: Vec<NodeId>,
	pub foreign_keys: Vec<NodeId>,
	pub check_constraints: Vec<NodeId>,
	pub row_deletion_policy: Option<NodeId>,
	/// Set when this table is the backing data table of an index.
	pub owner_index: Option<NodeId>,
}

impl Table {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			columns: Vec::new(),
			primary_key: Vec::new(),
			parent: None,
			on_delete: OnDeleteAction::NoAction,
			children: Vec::new(),
			indexes: Vec::new(),
			foreign_keys: Vec::new(),
			check_constraints: Vec::new(),
			row_deletion_policy: None,
			owner_index: None,
		}
	}

	pub fn is_index_data_table(&self) -> bool {
		self.owner_index.is_some()
	}

	pub fn find_column(&self, graph: &SchemaGraph, name: &str) -> Option<NodeId> {
		self.columns
			.iter()
			.copied()
			.find(|id| graph.column(*id).map(|column| column.name == name).unwrap_or(false))
	}

	pub fn is_key_column(&self, id: NodeId) -> bool {
		self.primary_key.iter().any(|part| part.column == id)
	}

	pub(crate) fn deep_clone(&mut self, map: &NodeMap) -> Result<()> {
		self.columns = map.image_vec(&self.columns)?;
		for part in &mut self.primary_key {
			part.column = map.image(part.column)?;
		}
		self.parent = map.image_opt(self.parent)?;
		self.children = map.image_vec(&self.children)?;
		self.indexes = map.image_vec(&self.indexes)?;
		self.foreign_keys = map.image_vec(&self.foreign_keys)?;
		self.check_constraints = map.image_vec(&self.check_constraints)?;
		self.row_deletion_policy = map.image_opt(self.row_deletion_policy)?;
		self.owner_index = map.image_opt(self.owner_index)?;
		Ok(())
	}
}
