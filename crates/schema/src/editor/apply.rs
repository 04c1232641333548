// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_ddl::ast::{
	AlterTable, AlterTableAction, ColumnDef, CreateIndex, CreateTable, DdlStatement, ForeignKeyDef, KeyPart,
	RowDeletionPolicy as RowDeletionPolicyDef, SortOrder, TableConstraint,
};
use keystone_type::{Result, diagnostic::schema as diag, error};
use tracing::instrument;

use super::SchemaGraphEditor;
use crate::catalog::{
	CheckConstraint, Column, ForeignKey, Index, NodeId, RowDeletionPolicy, SchemaNode, Table, TableKeyPart,
};

impl SchemaGraphEditor {
	/// Apply one schema-change description to the candidate graph.
	#[instrument(name = "schema::editor::apply", level = "debug", skip(self, statement))]
	pub fn apply(&mut self, statement: &DdlStatement) -> Result<()> {
		match statement {
			DdlStatement::CreateTable(create) => self.create_table(create),
			DdlStatement::CreateIndex(create) => self.create_index(create),
			DdlStatement::AlterTable(alter) => self.alter_table(alter),
			DdlStatement::DropTable(drop) => self.drop_table(&drop.name),
			DdlStatement::DropIndex(drop) => self.drop_index(&drop.name),
			// ANALYZE is accepted and has no effect on the graph.
			DdlStatement::Analyze => Ok(()),
			DdlStatement::CreateDatabase(_) => Err(error!(diag::structural_error(
				"CREATE DATABASE reached the schema editor",
			))),
		}
	}

	fn create_table(&mut self, create: &CreateTable) -> Result<()> {
		self.check_global_name_free(&create.name)?;

		let table_id = self.graph.alloc(SchemaNode::Table(Table::new(&create.name)));
		self.tables.push(table_id);

		for def in &create.columns {
			let column_id = self.column_from_def(table_id, def)?;
			self.graph.table_mut(table_id)?.columns.push(column_id);
		}

		let key_parts = self.resolve_key_parts(table_id, create.primary_key())?;
		self.graph.table_mut(table_id)?.primary_key = key_parts;

		for constraint in &create.constraints {
			match constraint {
				TableConstraint::PrimaryKey {
					..
				} => {}
				TableConstraint::Interleave {
					parent,
					on_delete,
					..
				} => {
					let parent_id = self.find_table(parent).ok_or_else(|| {
						error!(diag::interleave_parent_not_found(&create.name, parent))
					})?;
					let table = self.graph.table_mut(table_id)?;
					table.parent = Some(parent_id);
					table.on_delete = *on_delete;
					self.graph.table_mut(parent_id)?.children.push(table_id);
				}
				TableConstraint::ForeignKey(def) => {
					self.add_foreign_key(table_id, def)?;
				}
				TableConstraint::Check(def) => {
					self.add_check_constraint(table_id, def.constraint_name.clone(), &def.sql_text)?;
				}
			}
		}

		if let Some(policy) = &create.row_deletion_policy {
			self.attach_row_deletion_policy(table_id, policy)?;
		}

		Ok(())
	}

	fn create_index(&mut self, create: &CreateIndex) -> Result<()> {
		self.check_global_name_free(&create.name)?;
		let table_id = self.resolve_table(&create.table)?;

		let mut key_parts = Vec::with_capacity(create.key_parts.len());
		for part in &create.key_parts {
			let column = self
				.graph
				.table(table_id)?
				.find_column(&self.graph, &part.column)
				.ok_or_else(|| error!(diag::index_key_column_not_in_table(&create.name, &part.column)))?;
			key_parts.push(TableKeyPart {
				column,
				order: part.order,
			});
		}

		let mut stored_columns = Vec::with_capacity(create.stored_columns.len());
		for name in &create.stored_columns {
			let column = self
				.graph
				.table(table_id)?
				.find_column(&self.graph, name)
				.ok_or_else(|| error!(diag::column_not_found(&create.table, name)))?;
			stored_columns.push(column);
		}

		let parent = match &create.interleave_parent {
			Some(parent) => Some(self.resolve_table(parent)?),
			None => None,
		};

		self.materialize_index(
			&create.name,
			table_id,
			key_parts,
			stored_columns,
			parent,
			create.unique,
			create.null_filtered,
			false,
		)?;
		Ok(())
	}

	/// Allocate an index node together with its backing data table. The
	/// data table owns clones of the key columns, the indexed table's
	/// remaining primary-key columns and the stored columns, keyed by
	/// the index key followed by the table key.
	#[allow(clippy::too_many_arguments)]
	fn materialize_index(
		&mut self,
		name: &str,
		table_id: NodeId,
		key_parts: Vec<TableKeyPart>,
		stored_columns: Vec<NodeId>,
		parent: Option<NodeId>,
		unique: bool,
		null_filtered: bool,
		managed: bool,
	) -> Result<NodeId> {
		let table_key = self.graph.table(table_id)?.primary_key.clone();

		let data_table_id = self.graph.alloc(SchemaNode::Table(Table::new(name)));

		// Source columns in data-table order: index keys, then the
		// table key remainder, then stored columns.
		let mut source_columns: Vec<TableKeyPart> = key_parts.clone();
		for part in &table_key {
			if !source_columns.iter().any(|existing| existing.column == part.column) {
				source_columns.push(*part);
			}
		}
		let key_len = source_columns.len();
		for column in &stored_columns {
			if !source_columns.iter().any(|existing| existing.column == *column) {
				source_columns.push(TableKeyPart {
					column: *column,
					order: SortOrder::Asc,
				});
			}
		}

		let mut data_key_parts = Vec::with_capacity(key_len);
		for (position, part) in source_columns.iter().enumerate() {
			let mut column = self.graph.column(part.column)?.clone();
			column.table = data_table_id;
			column.source_column = Some(part.column);
			let data_column = self.graph.alloc(SchemaNode::Column(column));
			self.graph.table_mut(data_table_id)?.columns.push(data_column);
			if position < key_len {
				data_key_parts.push(TableKeyPart {
					column: data_column,
					order: part.order,
				});
			}
		}
		self.graph.table_mut(data_table_id)?.primary_key = data_key_parts;

		let index_id = self.graph.alloc(SchemaNode::Index(Index {
			name: name.to_string(),
			table: table_id,
			null_filtered,
			unique,
			key_parts,
			stored_columns,
			parent,
			managed,
			data_table: Some(data_table_id),
		}));
		self.graph.table_mut(data_table_id)?.owner_index = Some(index_id);
		self.graph.table_mut(table_id)?.indexes.push(index_id);
		self.indexes.push(index_id);
		Ok(index_id)
	}

	fn alter_table(&mut self, alter: &AlterTable) -> Result<()> {
		let table_id = self.resolve_table(&alter.table)?;

		match &alter.action {
			AlterTableAction::AddColumn(def) => {
				if self.graph.table(table_id)?.find_column(&self.graph, &def.name).is_some() {
					return Err(error!(diag::duplicate_column(&alter.table, &def.name)));
				}
				let column_id = self.column_from_def(table_id, def)?;
				self.graph.table_mut(table_id)?.columns.push(column_id);
				Ok(())
			}
			AlterTableAction::DropColumn(name) => self.drop_column(table_id, name),
			AlterTableAction::AlterColumn(def) => self.alter_column(table_id, def),
			AlterTableAction::SetColumnOptions {
				column,
				options,
			} => {
				let column_id = self.resolve_column(table_id, column)?;
				self.graph.column_mut(column_id)?.set_options(options.clone());
				Ok(())
			}
			AlterTableAction::SetColumnDefault {
				column,
				expression,
			} => {
				let column_id = self.resolve_column(table_id, column)?;
				let column = self.graph.column_mut(column_id)?;
				column.expression = Some(expression.clone());
				column.has_default = true;
				Ok(())
			}
			AlterTableAction::DropColumnDefault {
				column,
			} => {
				let column_id = self.resolve_column(table_id, column)?;
				let column = self.graph.column_mut(column_id)?;
				if column.has_default {
					column.expression = None;
					column.has_default = false;
				}
				Ok(())
			}
			AlterTableAction::AddConstraint(constraint) => match constraint {
				TableConstraint::ForeignKey(def) => {
					self.add_foreign_key(table_id, def)?;
					Ok(())
				}
				TableConstraint::Check(def) => {
					self.add_check_constraint(table_id, def.constraint_name.clone(), &def.sql_text)?;
					Ok(())
				}
				_ => Err(error!(diag::structural_error("unsupported ADD constraint shape"))),
			},
			AlterTableAction::DropConstraint(name) => self.drop_constraint(table_id, name),
			AlterTableAction::AlterInterleaveOnDelete(action) => {
				let table = self.graph.table_mut(table_id)?;
				if table.parent.is_none() {
					return Err(error!(diag::table_not_interleaved(&alter.table)));
				}
				table.on_delete = *action;
				Ok(())
			}
			AlterTableAction::AddRowDeletionPolicy(policy) => {
				if self.graph.table(table_id)?.row_deletion_policy.is_some() {
					return Err(error!(diag::row_deletion_policy_exists(&alter.table)));
				}
				self.attach_row_deletion_policy(table_id, policy)?;
				Ok(())
			}
			AlterTableAction::ReplaceRowDeletionPolicy(policy) => {
				let existing = self
					.graph
					.table(table_id)?
					.row_deletion_policy
					.ok_or_else(|| error!(diag::row_deletion_policy_missing(&alter.table)))?;
				self.graph.remove(existing);
				self.graph.table_mut(table_id)?.row_deletion_policy = None;
				self.attach_row_deletion_policy(table_id, policy)?;
				Ok(())
			}
			AlterTableAction::DropRowDeletionPolicy => {
				let existing = self
					.graph
					.table(table_id)?
					.row_deletion_policy
					.ok_or_else(|| error!(diag::row_deletion_policy_missing(&alter.table)))?;
				self.graph.remove(existing);
				self.graph.table_mut(table_id)?.row_deletion_policy = None;
				Ok(())
			}
		}
	}

	fn drop_table(&mut self, name: &str) -> Result<()> {
		let table_id = self.resolve_table(name)?;
		let table = self.graph.table(table_id)?.clone();

		if !table.children.is_empty() {
			return Err(error!(diag::table_has_children(name)));
		}
		let has_user_indexes = table
			.indexes
			.iter()
			.any(|id| self.graph.index(*id).map(|index| !index.managed).unwrap_or(false));
		if has_user_indexes {
			return Err(error!(diag::table_has_children(name)));
		}

		// Foreign keys of other tables that point here block the drop.
		for id in self.graph.ids().collect::<Vec<_>>() {
			if let Some(SchemaNode::ForeignKey(foreign_key)) = self.graph.get(id) {
				if foreign_key.referenced_table == table_id && foreign_key.referencing_table != table_id {
					return Err(error!(diag::table_referenced_by_foreign_key(
						name,
						foreign_key.name(),
					)));
				}
			}
		}

		for foreign_key in table.foreign_keys.clone() {
			self.drop_foreign_key(foreign_key)?;
		}
		for check in table.check_constraints {
			self.graph.remove(check);
		}
		if let Some(policy) = table.row_deletion_policy {
			self.graph.remove(policy);
		}
		for column in table.columns {
			self.graph.remove(column);
		}
		if let Some(parent) = table.parent {
			self.graph.table_mut(parent)?.children.retain(|child| *child != table_id);
		}
		self.graph.remove(table_id);
		self.tables.retain(|id| *id != table_id);
		Ok(())
	}

	fn drop_index(&mut self, name: &str) -> Result<()> {
		let index_id = self
			.find_index(name)
			.filter(|id| self.graph.index(*id).map(|index| !index.managed).unwrap_or(false))
			.ok_or_else(|| error!(diag::index_not_found(name)))?;
		self.remove_index_node(index_id)
	}

	fn drop_column(&mut self, table_id: NodeId, name: &str) -> Result<()> {
		let table = self.graph.table(table_id)?.clone();
		let column_id = table
			.find_column(&self.graph, name)
			.ok_or_else(|| error!(diag::column_not_found(&table.name, name)))?;

		if table.is_key_column(column_id) {
			return Err(error!(diag::drop_key_column(&table.name, name)));
		}
		for index_id in &table.indexes {
			let index = self.graph.index(*index_id)?;
			let used = index.key_parts.iter().any(|part| part.column == column_id)
				|| index.stored_columns.contains(&column_id);
			if used {
				return Err(error!(diag::column_in_use(&table.name, name, &index.name)));
			}
		}
		for foreign_key_id in &table.foreign_keys {
			let foreign_key = self.graph.foreign_key(*foreign_key_id)?;
			if foreign_key.referencing_columns.contains(&column_id)
				|| foreign_key.referenced_columns.contains(&column_id)
			{
				return Err(error!(diag::column_in_use(&table.name, name, foreign_key.name())));
			}
		}
		// Foreign keys of other tables may reference this column.
		for id in self.graph.ids().collect::<Vec<_>>() {
			if let Some(SchemaNode::ForeignKey(foreign_key)) = self.graph.get(id) {
				if foreign_key.referenced_columns.contains(&column_id) {
					return Err(error!(diag::column_in_use(&table.name, name, foreign_key.name())));
				}
			}
		}
		if let Some(policy_id) = table.row_deletion_policy {
			if self.graph.row_deletion_policy(policy_id)?.column == column_id {
				return Err(error!(diag::column_in_use(&table.name, name, "the row deletion policy")));
			}
		}

		self.graph.remove(column_id);
		self.graph.table_mut(table_id)?.columns.retain(|id| *id != column_id);
		Ok(())
	}

	fn alter_column(&mut self, table_id: NodeId, def: &ColumnDef) -> Result<()> {
		let column_id = self.resolve_column(table_id, &def.name)?;
		let ty = def
			.ty
			.ok_or_else(|| error!(diag::structural_error("ALTER COLUMN definition without a type")))?;

		let column = self.graph.column_mut(column_id)?;
		column.ty = ty;
		column.max_length = def.max_length;
		column.not_null = def.not_null;
		column.expression = def.expression.clone();
		column.is_stored_generated = def.is_stored_generated;
		column.has_default = def.has_default;
		if !def.options.is_empty() {
			column.set_options(def.options.clone());
		}

		// Index data tables hold clones of the column; keep them in step.
		let template = self.graph.column(column_id)?.clone();
		for id in self.graph.ids().collect::<Vec<_>>() {
			if let Some(SchemaNode::Column(clone)) = self.graph.get_mut(id) {
				if clone.source_column == Some(column_id) {
					clone.ty = template.ty;
					clone.max_length = template.max_length;
					clone.not_null = template.not_null;
					clone.expression = template.expression.clone();
					clone.is_stored_generated = template.is_stored_generated;
					clone.has_default = template.has_default;
				}
			}
		}
		Ok(())
	}

	fn drop_constraint(&mut self, table_id: NodeId, name: &str) -> Result<()> {
		let table = self.graph.table(table_id)?.clone();

		for foreign_key_id in &table.foreign_keys {
			if self.graph.foreign_key(*foreign_key_id)?.name() == name {
				self.drop_foreign_key(*foreign_key_id)?;
				return Ok(());
			}
		}
		for check_id in &table.check_constraints {
			if self.graph.check_constraint(*check_id)?.name() == name {
				self.graph.remove(*check_id);
				self.graph.table_mut(table_id)?.check_constraints.retain(|id| id != check_id);
				return Ok(());
			}
		}
		Err(error!(diag::constraint_not_found(&table.name, name)))
	}

	fn column_from_def(&mut self, table_id: NodeId, def: &ColumnDef) -> Result<NodeId> {
		let ty = def
			.ty
			.ok_or_else(|| error!(diag::structural_error("column definition without a type")))?;
		let mut column = Column::new(&def.name, ty, table_id);
		column.max_length = def.max_length;
		column.not_null = def.not_null;
		column.options = def.options.clone();
		column.expression = def.expression.clone();
		column.is_stored_generated = def.is_stored_generated;
		column.has_default = def.has_default;
		Ok(self.graph.alloc(SchemaNode::Column(column)))
	}

	fn resolve_column(&self, table_id: NodeId, name: &str) -> Result<NodeId> {
		let table = self.graph.table(table_id)?;
		table.find_column(&self.graph, name)
			.ok_or_else(|| error!(diag::column_not_found(&table.name, name)))
	}

	fn resolve_key_parts(&self, table_id: NodeId, key_parts: &[KeyPart]) -> Result<Vec<TableKeyPart>> {
		let table = self.graph.table(table_id)?;
		key_parts
			.iter()
			.map(|part| {
				let column = table
					.find_column(&self.graph, &part.column)
					.ok_or_else(|| error!(diag::column_not_found(&table.name, &part.column)))?;
				Ok(TableKeyPart {
					column,
					order: part.order,
				})
			})
			.collect()
	}

	fn add_check_constraint(
		&mut self,
		table_id: NodeId,
		constraint_name: Option<String>,
		expression: &str,
	) -> Result<NodeId> {
		if let Some(name) = &constraint_name {
			self.check_constraint_name_free(table_id, name)?;
		}
		let generated_name = match &constraint_name {
			Some(_) => String::new(),
			None => {
				let table_name = self.graph.table(table_id)?.name.clone();
				let n = self.graph.foreign_key_names;
				self.graph.foreign_key_names += 1;
				format!("CK_{}_{}", table_name, n)
			}
		};
		let check_id = self.graph.alloc(SchemaNode::CheckConstraint(CheckConstraint {
			constraint_name,
			generated_name,
			expression: expression.to_string(),
			table: table_id,
		}));
		self.graph.table_mut(table_id)?.check_constraints.push(check_id);
		Ok(check_id)
	}

	/// Create a foreign key on `table_id`. Endpoint column tuples that
	/// the endpoint's primary key cannot serve get a managed backing
	/// index, owned by the endpoint table and referenced by the foreign
	/// key through a non-owning edge.
	fn add_foreign_key(&mut self, table_id: NodeId, def: &ForeignKeyDef) -> Result<NodeId> {
		if let Some(name) = &def.constraint_name {
			self.check_constraint_name_free(table_id, name)?;
		}

		let referencing_columns = self.resolve_column_list(table_id, &def.referencing_columns)?;
		let referenced_table = self.resolve_table(&def.referenced_table)?;
		let referenced_columns = self.resolve_column_list(referenced_table, &def.referenced_columns)?;

		let generated_name = match &def.constraint_name {
			Some(_) => String::new(),
			None => {
				let referencing_name = self.graph.table(table_id)?.name.clone();
				let n = self.graph.foreign_key_names;
				self.graph.foreign_key_names += 1;
				format!("FK_{}_{}_{}", referencing_name, def.referenced_table, n)
			}
		};

		// The referencing side needs any primary-key prefix; the
		// referenced side must be served uniquely, so only the exact
		// primary key qualifies.
		let referencing_index = if self.is_key_prefix(table_id, &referencing_columns)? {
			None
		} else {
			Some(self.create_managed_index(table_id, &referencing_columns, false)?)
		};
		let referenced_index = if self.is_exact_key(referenced_table, &referenced_columns)? {
			None
		} else {
			Some(self.create_managed_index(referenced_table, &referenced_columns, true)?)
		};

		let foreign_key_id = self.graph.alloc(SchemaNode::ForeignKey(ForeignKey {
			constraint_name: def.constraint_name.clone(),
			generated_name,
			referencing_table: table_id,
			referencing_columns,
			referencing_index,
			referenced_table,
			referenced_columns,
			referenced_index,
		}));
		self.graph.table_mut(table_id)?.foreign_keys.push(foreign_key_id);
		Ok(foreign_key_id)
	}

	fn drop_foreign_key(&mut self, foreign_key_id: NodeId) -> Result<()> {
		let foreign_key = self.graph.foreign_key(foreign_key_id)?.clone();
		for index in [foreign_key.referencing_index, foreign_key.referenced_index].into_iter().flatten() {
			if self.graph.index(index)?.managed {
				self.remove_index_node(index)?;
			}
		}
		self.graph
			.table_mut(foreign_key.referencing_table)?
			.foreign_keys
			.retain(|id| *id != foreign_key_id);
		self.graph.remove(foreign_key_id);
		Ok(())
	}

	fn remove_index_node(&mut self, index_id: NodeId) -> Result<()> {
		let index = self.graph.index(index_id)?.clone();
		if let Some(data_table_id) = index.data_table {
			let data_table = self.graph.table(data_table_id)?.clone();
			for column in data_table.columns {
				self.graph.remove(column);
			}
			self.graph.remove(data_table_id);
		}
		self.graph.table_mut(index.table)?.indexes.retain(|id| *id != index_id);
		self.graph.remove(index_id);
		self.indexes.retain(|id| *id != index_id);
		Ok(())
	}

	fn create_managed_index(&mut self, table_id: NodeId, columns: &[NodeId], unique: bool) -> Result<NodeId> {
		let table_name = self.graph.table(table_id)?.name.clone();
		let mut parts = Vec::with_capacity(columns.len());
		let mut column_names = Vec::with_capacity(columns.len());
		for column in columns {
			column_names.push(self.graph.column(*column)?.name.clone());
			parts.push(TableKeyPart {
				column: *column,
				order: SortOrder::Asc,
			});
		}
		let n = self.graph.managed_index_names;
		self.graph.managed_index_names += 1;
		let name = format!(
			"IDX_{}_{}_{}_{}",
			table_name,
			column_names.join("_"),
			if unique {
				"U"
			} else {
				"N"
			},
			n,
		);
		self.materialize_index(&name, table_id, parts, Vec::new(), None, unique, true, true)
	}

	fn resolve_column_list(&self, table_id: NodeId, names: &[String]) -> Result<Vec<NodeId>> {
		let table = self.graph.table(table_id)?;
		names.iter()
			.map(|name| {
				table.find_column(&self.graph, name)
					.ok_or_else(|| error!(diag::column_not_found(&table.name, name)))
			})
			.collect()
	}

	fn check_constraint_name_free(&self, table_id: NodeId, name: &str) -> Result<()> {
		let table = self.graph.table(table_id)?;
		for foreign_key in &table.foreign_keys {
			if self.graph.foreign_key(*foreign_key)?.name() == name {
				return Err(error!(diag::duplicate_constraint(&table.name, name)));
			}
		}
		for check in &table.check_constraints {
			if self.graph.check_constraint(*check)?.name() == name {
				return Err(error!(diag::duplicate_constraint(&table.name, name)));
			}
		}
		Ok(())
	}

	/// Whether `columns` is a prefix of the table's primary key.
	fn is_key_prefix(&self, table_id: NodeId, columns: &[NodeId]) -> Result<bool> {
		let table = self.graph.table(table_id)?;
		if columns.is_empty() || columns.len() > table.primary_key.len() {
			return Ok(false);
		}
		Ok(columns.iter().zip(&table.primary_key).all(|(column, part)| *column == part.column))
	}

	/// Whether `columns` is exactly the table's primary key.
	fn is_exact_key(&self, table_id: NodeId, columns: &[NodeId]) -> Result<bool> {
		let table = self.graph.table(table_id)?;
		Ok(!columns.is_empty()
			&& columns.len() == table.primary_key.len()
			&& columns.iter().zip(&table.primary_key).all(|(column, part)| *column == part.column))
	}

	fn attach_row_deletion_policy(&mut self, table_id: NodeId, policy: &RowDeletionPolicyDef) -> Result<NodeId> {
		let table = self.graph.table(table_id)?;
		let column = table
			.find_column(&self.graph, &policy.column)
			.ok_or_else(|| error!(diag::row_deletion_policy_column(&table.name, &policy.column)))?;
		let policy_id = self.graph.alloc(SchemaNode::RowDeletionPolicy(RowDeletionPolicy {
			table: table_id,
			column,
			older_than_days: policy.older_than_days,
		}));
		self.graph.table_mut(table_id)?.row_deletion_policy = Some(policy_id);
		Ok(policy_id)
	}
}
