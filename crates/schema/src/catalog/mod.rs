// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

pub mod check;
pub mod column;
pub mod foreign_key;
pub mod index;
pub mod row_deletion_policy;
pub mod table;

use std::{collections::HashMap, sync::Arc};

use keystone_type::{Result, diagnostic::schema as diag, error};
use serde::{Deserialize, Serialize};

pub use check::CheckConstraint;
pub use column::Column;
pub use foreign_key::ForeignKey;
pub use index::Index;
pub use row_deletion_policy::RowDeletionPolicy;
pub use table::{Table, TableKeyPart};

/// Handle of a node in the schema graph arena. Edges between nodes are
/// handles, never references, so a whole graph can be cloned and rewritten
/// with a map lookup per edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Name descriptor of a schema node, used for diagnostics and namespace
/// checks. Global names (tables, indexes, foreign keys) share one
/// namespace; local names are scoped to their owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaNameInfo {
	pub name: String,
	pub kind: &'static str,
	pub global: bool,
}

/// A node of the schema graph. The variants share the capability set
/// {display_name, name_info, deep_clone, validate, validate_update};
/// dispatch is a match over the tag.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
	Table(Table),
	Column(Column),
	Index(Index),
	ForeignKey(ForeignKey),
	CheckConstraint(CheckConstraint),
	RowDeletionPolicy(RowDeletionPolicy),
}

impl SchemaNode {
	pub fn display_name(&self, graph: &SchemaGraph) -> String {
		match self {
			SchemaNode::Table(table) => table.name.clone(),
			SchemaNode::Column(column) => column.name.clone(),
			SchemaNode::Index(index) => index.name.clone(),
			SchemaNode::ForeignKey(foreign_key) => foreign_key.name().to_string(),
			SchemaNode::CheckConstraint(check) => check.name().to_string(),
			SchemaNode::RowDeletionPolicy(policy) => graph
				.table(policy.table)
				.map(|table| format!("RowDeletionPolicy({})", table.name))
				.unwrap_or_else(|_| "RowDeletionPolicy".to_string()),
		}
	}

	pub fn name_info(&self, graph: &SchemaGraph) -> SchemaNameInfo {
		let (kind, global) = match self {
			SchemaNode::Table(_) => ("Table", true),
			SchemaNode::Column(_) => ("Column", false),
			SchemaNode::Index(_) => ("Index", true),
			SchemaNode::ForeignKey(_) => ("Foreign Key", true),
			SchemaNode::CheckConstraint(_) => ("Check Constraint", false),
			SchemaNode::RowDeletionPolicy(_) => ("Row Deletion Policy", false),
		};
		SchemaNameInfo {
			name: self.display_name(graph),
			kind,
			global,
		}
	}

	/// Create-mode validation delegate.
	pub fn validate(&self, graph: &SchemaGraph, ctx: &mut crate::validator::SchemaValidationContext) {
		crate::validator::validate_node(self, graph, ctx);
	}

	/// Update-mode validation delegate: candidate node against its
	/// image in the previously committed schema.
	pub fn validate_update(
		&self,
		original: &SchemaNode,
		graph: &SchemaGraph,
		ctx: &mut crate::validator::SchemaValidationContext,
	) {
		if let (SchemaNode::Column(column), SchemaNode::Column(original)) = (self, original) {
			crate::validator::validate_column_update(column, original, graph, ctx);
		}
	}

	/// The deep-clone hook of the transcription protocol: rewrite every
	/// edge through the old-to-new map. A missing image is a structural
	/// error, not a user error.
	pub fn deep_clone(&mut self, map: &NodeMap) -> Result<()> {
		match self {
			SchemaNode::Table(table) => table.deep_clone(map),
			SchemaNode::Column(column) => column.deep_clone(map),
			SchemaNode::Index(index) => index.deep_clone(map),
			SchemaNode::ForeignKey(foreign_key) => foreign_key.deep_clone(map),
			SchemaNode::CheckConstraint(check) => check.deep_clone(map),
			SchemaNode::RowDeletionPolicy(policy) => policy.deep_clone(map),
		}
	}
}

/// Old-handle to new-handle map consulted while rewriting a transcribed
/// graph.
#[derive(Debug, Default)]
pub struct NodeMap {
	images: HashMap<NodeId, NodeId>,
}

impl NodeMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, old: NodeId, new: NodeId) {
		self.images.insert(old, new);
	}

	pub fn image(&self, old: NodeId) -> Result<NodeId> {
		self.images
			.get(&old)
			.copied()
			.ok_or_else(|| error!(diag::structural_error(format!("node {} has no image in the candidate graph", old))))
	}

	pub fn image_opt(&self, old: Option<NodeId>) -> Result<Option<NodeId>> {
		match old {
			Some(id) => Ok(Some(self.image(id)?)),
			None => Ok(None),
		}
	}

	pub fn image_vec(&self, old: &[NodeId]) -> Result<Vec<NodeId>> {
		old.iter().map(|id| self.image(*id)).collect()
	}
}

/// Arena of schema nodes. Slots vacated by dropped nodes stay vacant
/// until the next transcription compacts the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaGraph {
	slots: Vec<Option<SchemaNode>>,
	/// Counter backing generated foreign-key constraint names. Assigned
	/// once at creation; carried across transcriptions so names stay
	/// stable over the life of the database.
	pub(crate) foreign_key_names: u32,
	/// Counter backing managed index names.
	pub(crate) managed_index_names: u32,
}

impl SchemaGraph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn alloc(&mut self, node: SchemaNode) -> NodeId {
		let id = NodeId(self.slots.len() as u32);
		self.slots.push(Some(node));
		id
	}

	pub fn remove(&mut self, id: NodeId) -> Option<SchemaNode> {
		self.slots.get_mut(id.0 as usize).and_then(|slot| slot.take())
	}

	pub fn get(&self, id: NodeId) -> Option<&SchemaNode> {
		self.slots.get(id.0 as usize).and_then(|slot| slot.as_ref())
	}

	pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SchemaNode> {
		self.slots.get_mut(id.0 as usize).and_then(|slot| slot.as_mut())
	}

	/// Live node ids in arena order.
	pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.slots
			.iter()
			.enumerate()
			.filter_map(|(index, slot)| slot.as_ref().map(|_| NodeId(index as u32)))
	}

	pub fn live_count(&self) -> usize {
		self.slots.iter().filter(|slot| slot.is_some()).count()
	}

	fn wrong_kind(id: NodeId, wanted: &str) -> keystone_type::Error {
		error!(diag::structural_error(format!("node {} is not a {}", id, wanted)))
	}

	pub fn table(&self, id: NodeId) -> Result<&Table> {
		match self.get(id) {
			Some(SchemaNode::Table(table)) => Ok(table),
			_ => Err(Self::wrong_kind(id, "table")),
		}
	}

	pub fn table_mut(&mut self, id: NodeId) -> Result<&mut Table> {
		match self.get_mut(id) {
			Some(SchemaNode::Table(table)) => Ok(table),
			_ => Err(Self::wrong_kind(id, "table")),
		}
	}

	pub fn column(&self, id: NodeId) -> Result<&Column> {
		match self.get(id) {
			Some(SchemaNode::Column(column)) => Ok(column),
			_ => Err(Self::wrong_kind(id, "column")),
		}
	}

	pub fn column_mut(&mut self, id: NodeId) -> Result<&mut Column> {
		match self.get_mut(id) {
			Some(SchemaNode::Column(column)) => Ok(column),
			_ => Err(Self::wrong_kind(id, "column")),
		}
	}

	pub fn index(&self, id: NodeId) -> Result<&Index> {
		match self.get(id) {
			Some(SchemaNode::Index(index)) => Ok(index),
			_ => Err(Self::wrong_kind(id, "index")),
		}
	}

	pub fn index_mut(&mut self, id: NodeId) -> Result<&mut Index> {
		match self.get_mut(id) {
			Some(SchemaNode::Index(index)) => Ok(index),
			_ => Err(Self::wrong_kind(id, "index")),
		}
	}

	pub fn foreign_key(&self, id: NodeId) -> Result<&ForeignKey> {
		match self.get(id) {
			Some(SchemaNode::ForeignKey(foreign_key)) => Ok(foreign_key),
			_ => Err(Self::wrong_kind(id, "foreign key")),
		}
	}

	pub fn check_constraint(&self, id: NodeId) -> Result<&CheckConstraint> {
		match self.get(id) {
			Some(SchemaNode::CheckConstraint(check)) => Ok(check),
			_ => Err(Self::wrong_kind(id, "check constraint")),
		}
	}

	pub fn row_deletion_policy(&self, id: NodeId) -> Result<&RowDeletionPolicy> {
		match self.get(id) {
			Some(SchemaNode::RowDeletionPolicy(policy)) => Ok(policy),
			_ => Err(Self::wrong_kind(id, "row deletion policy")),
		}
	}
}

/// A committed schema. Immutable once built; every change produces a
/// fresh graph through the editor, and the previous generation is
/// discarded wholesale when superseded.
#[derive(Debug, Clone, Default)]
pub struct Schema {
	graph: Arc<SchemaGraph>,
	tables: Vec<NodeId>,
	indexes: Vec<NodeId>,
}

impl Schema {
	pub fn empty() -> Self {
		Self::default()
	}

	pub(crate) fn from_parts(graph: SchemaGraph, tables: Vec<NodeId>, indexes: Vec<NodeId>) -> Self {
		Self {
			graph: Arc::new(graph),
			tables,
			indexes,
		}
	}

	pub fn graph(&self) -> &SchemaGraph {
		&self.graph
	}

	/// User tables in creation order. Index backing tables are not
	/// listed here.
	pub fn tables(&self) -> &[NodeId] {
		&self.tables
	}

	/// Indexes in creation order, managed ones included.
	pub fn indexes(&self) -> &[NodeId] {
		&self.indexes
	}

	pub fn find_table(&self, name: &str) -> Option<NodeId> {
		self.tables
			.iter()
			.copied()
			.find(|id| self.graph.table(*id).map(|table| table.name == name).unwrap_or(false))
	}

	pub fn find_index(&self, name: &str) -> Option<NodeId> {
		self.indexes
			.iter()
			.copied()
			.find(|id| self.graph.index(*id).map(|index| index.name == name).unwrap_or(false))
	}
}

#[cfg(test)]
mod tests {
	use keystone_ddl::ast::{ColumnType, ScalarType};

	use super::*;

	#[test]
	fn test_arena_alloc_and_remove() {
		let mut graph = SchemaGraph::new();
		let table = graph.alloc(SchemaNode::Table(Table::new("T")));
		let column = graph.alloc(SchemaNode::Column(Column::new("C", ColumnType::Scalar(ScalarType::Int64), table)));
		assert_eq!(graph.live_count(), 2);
		assert_eq!(graph.table(table).unwrap().name, "T");
		assert_eq!(graph.column(column).unwrap().name, "C");

		graph.remove(column);
		assert_eq!(graph.live_count(), 1);
		assert!(graph.get(column).is_none());
		// Ids are not reused within a graph generation
		let next = graph.alloc(SchemaNode::Table(Table::new("U")));
		assert_ne!(next, column);
	}

	#[test]
	fn test_typed_accessor_rejects_wrong_kind() {
		let mut graph = SchemaGraph::new();
		let table = graph.alloc(SchemaNode::Table(Table::new("T")));
		let err = graph.column(table).unwrap_err();
		assert_eq!(err.status(), keystone_type::StatusCode::Internal);
	}

	#[test]
	fn test_node_map_missing_image_is_structural() {
		let map = NodeMap::new();
		let err = map.image(NodeId(7)).unwrap_err();
		assert_eq!(err.status(), keystone_type::StatusCode::Internal);
	}

	#[test]
	fn test_name_info() {
		let mut graph = SchemaGraph::new();
		let table_id = graph.alloc(SchemaNode::Table(Table::new("Users")));
		let info = graph.get(table_id).unwrap().name_info(&graph);
		assert_eq!(info.name, "Users");
		assert_eq!(info.kind, "Table");
		assert!(info.global);
	}
}
