// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

mod apply;

use keystone_type::{Result, diagnostic::schema as diag, error};
use tracing::instrument;

use crate::catalog::{NodeId, NodeMap, Schema, SchemaGraph};

/// Builds a candidate schema graph from the committed one.
///
/// Construction runs the first two phases of the editing protocol:
/// every live node is shallow-cloned into a fresh arena (edges still
/// pointing into the old graph), then each clone's deep-clone hook
/// rewrites its edges through the old-to-new map. Statement application
/// afterwards mutates only the candidate; the committed schema is never
/// touched.
pub struct SchemaGraphEditor {
	pub(crate) graph: SchemaGraph,
	pub(crate) tables: Vec<NodeId>,
	pub(crate) indexes: Vec<NodeId>,
}

impl SchemaGraphEditor {
	#[instrument(name = "schema::editor::new", level = "trace", skip(current))]
	pub fn new(current: &Schema) -> Result<Self> {
		let mut graph = SchemaGraph::new();
		graph.foreign_key_names = current.graph().foreign_key_names;
		graph.managed_index_names = current.graph().managed_index_names;

		// Transcribe. Vacated slots of the old arena are compacted
		// away here, which is what makes the map non-trivial.
		let mut map = NodeMap::new();
		for old_id in current.graph().ids() {
			let node = current
				.graph()
				.get(old_id)
				.cloned()
				.ok_or_else(|| error!(diag::structural_error(format!("live node {} disappeared", old_id))))?;
			let new_id = graph.alloc(node);
			map.insert(old_id, new_id);
		}

		// Rewrite. Each node maps its own edges; a dangling edge
		// surfaces as a structural error instead of a bad handle.
		let ids: Vec<NodeId> = graph.ids().collect();
		for id in ids {
			if let Some(node) = graph.get_mut(id) {
				node.deep_clone(&map)?;
			}
		}

		let tables = map.image_vec(current.tables())?;
		let indexes = map.image_vec(current.indexes())?;

		Ok(Self {
			graph,
			tables,
			indexes,
		})
	}

	/// Seal the candidate. The caller validates before committing.
	pub fn into_schema(self) -> Schema {
		Schema::from_parts(self.graph, self.tables, self.indexes)
	}

	pub(crate) fn find_table(&self, name: &str) -> Option<NodeId> {
		self.tables
			.iter()
			.copied()
			.find(|id| self.graph.table(*id).map(|table| table.name == name).unwrap_or(false))
	}

	pub(crate) fn find_index(&self, name: &str) -> Option<NodeId> {
		self.indexes
			.iter()
			.copied()
			.find(|id| self.graph.index(*id).map(|index| index.name == name).unwrap_or(false))
	}

	pub(crate) fn resolve_table(&self, name: &str) -> Result<NodeId> {
		self.find_table(name).ok_or_else(|| error!(diag::table_not_found(name)))
	}

	/// Tables and indexes share the global name namespace.
	pub(crate) fn check_global_name_free(&self, name: &str) -> Result<()> {
		if self.find_table(name).is_some() || self.find_index(name).is_some() {
			return Err(error!(diag::table_already_exists(name)));
		}
		Ok(())
	}
}
