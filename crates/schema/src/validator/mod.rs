// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_ddl::ast::ColumnType;
use keystone_type::{Diagnostic, Error, Result, diagnostic::schema as diag, error};
use tracing::instrument;

use crate::catalog::{
	CheckConstraint, Column, ForeignKey, Index, RowDeletionPolicy, Schema, SchemaGraph, SchemaNode, Table,
};

/// Collects validation diagnostics for one candidate schema.
///
/// Validation does not stop at the first failure; diagnostics accumulate
/// up to a limit and the first one determines the returned status.
pub struct SchemaValidationContext {
	errors: Vec<Error>,
	limit: usize,
}

pub const DEFAULT_ERROR_LIMIT: usize = 20;

impl Default for SchemaValidationContext {
	fn default() -> Self {
		Self::new(DEFAULT_ERROR_LIMIT)
	}
}

impl SchemaValidationContext {
	pub fn new(limit: usize) -> Self {
		Self {
			errors: Vec::new(),
			limit,
		}
	}

	pub fn report(&mut self, diagnostic: Diagnostic) {
		if self.errors.len() < self.limit {
			self.errors.push(error!(diagnostic));
		}
	}

	pub fn is_full(&self) -> bool {
		self.errors.len() >= self.limit
	}

	pub fn diagnostics(&self) -> &[Error] {
		&self.errors
	}

	pub fn into_result(mut self) -> Result<()> {
		if self.errors.is_empty() {
			Ok(())
		} else {
			Err(self.errors.remove(0))
		}
	}
}

/// Validate a candidate schema. In update mode the original schema is
/// supplied and compatibility rules apply on top of the create checks.
/// On failure the candidate is dead; the committed schema is unchanged.
#[instrument(name = "schema::validate", level = "debug", skip_all, fields(nodes = candidate.graph().live_count()))]
pub fn validate_schema(candidate: &Schema, original: Option<&Schema>) -> Result<()> {
	let mut ctx = SchemaValidationContext::default();
	let graph = candidate.graph();

	for id in graph.ids() {
		if ctx.is_full() {
			break;
		}
		if let Some(node) = graph.get(id) {
			node.validate(graph, &mut ctx);
		}
	}

	if let Some(original) = original {
		validate_update(candidate, original, &mut ctx);
	}

	ctx.into_result()
}

pub(crate) fn validate_node(node: &SchemaNode, graph: &SchemaGraph, ctx: &mut SchemaValidationContext) {
	match node {
		SchemaNode::Table(table) => validate_table(table, graph, ctx),
		SchemaNode::Column(column) => validate_column(column, graph, ctx),
		SchemaNode::Index(index) => validate_index(index, graph, ctx),
		SchemaNode::ForeignKey(foreign_key) => validate_foreign_key(foreign_key, graph, ctx),
		SchemaNode::CheckConstraint(check) => validate_check(check, graph, ctx),
		SchemaNode::RowDeletionPolicy(policy) => validate_policy(policy, graph, ctx),
	}
}

fn is_valid_name(name: &str) -> bool {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) if first.is_ascii_alphabetic() => {}
		_ => return false,
	}
	name.len() <= 128 && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn validate_table(table: &Table, graph: &SchemaGraph, ctx: &mut SchemaValidationContext) {
	if !is_valid_name(&table.name) {
		ctx.report(diag::invalid_schema_name("Table", &table.name));
	}

	// Duplicate column names within the table
	for (position, id) in table.columns.iter().enumerate() {
		let Ok(column) = graph.column(*id) else {
			continue;
		};
		let duplicated = table.columns[..position]
			.iter()
			.any(|earlier| graph.column(*earlier).map(|other| other.name == column.name).unwrap_or(false));
		if duplicated {
			ctx.report(diag::duplicate_column(&table.name, &column.name));
		}
	}

	// Primary key columns exist, are not arrays, and are NOT NULL.
	// Index backing tables are exempt from the nullability rule: an
	// index key over a nullable column is legal.
	for part in &table.primary_key {
		if !table.columns.contains(&part.column) {
			ctx.report(diag::structural_error(format!(
				"primary key of table {} references a foreign column",
				table.name
			)));
			continue;
		}
		let Ok(column) = graph.column(part.column) else {
			continue;
		};
		if column.ty.is_array() {
			ctx.report(diag::key_column_invalid_type(&table.name, &column.name));
		}
		if !column.not_null && !table.is_index_data_table() {
			ctx.report(diag::key_column_not_null(&table.name, &column.name));
		}
	}

	if table.is_index_data_table() {
		// Backing tables inherit the remaining invariants from the
		// index that owns them.
		return;
	}

	if let Some(parent_id) = table.parent {
		match graph.table(parent_id) {
			Ok(parent) => validate_interleave_prefix(table, parent, graph, ctx),
			Err(_) => ctx.report(diag::interleave_parent_not_found(&table.name, "<dropped>")),
		}

		// Parent chains must form a rooted forest
		let mut hops = 0usize;
		let mut cursor = Some(parent_id);
		while let Some(id) = cursor {
			if hops > graph.live_count() {
				ctx.report(diag::interleave_cycle(&table.name));
				break;
			}
			hops += 1;
			cursor = graph.table(id).ok().and_then(|ancestor| ancestor.parent);
		}
	}
}

/// A child's primary key must start with its parent's primary key,
/// column for column, order included.
fn validate_interleave_prefix(child: &Table, parent: &Table, graph: &SchemaGraph, ctx: &mut SchemaValidationContext) {
	if child.primary_key.len() < parent.primary_key.len() {
		ctx.report(diag::interleave_key_mismatch(&child.name, &parent.name));
		return;
	}
	for (child_part, parent_part) in child.primary_key.iter().zip(&parent.primary_key) {
		let child_column = graph.column(child_part.column).map(|column| column.name.clone());
		let parent_column = graph.column(parent_part.column).map(|column| column.name.clone());
		let matches = match (child_column, parent_column) {
			(Ok(child_name), Ok(parent_name)) => {
				child_name == parent_name && child_part.order == parent_part.order
			}
			_ => false,
		};
		if !matches {
			ctx.report(diag::interleave_key_mismatch(&child.name, &parent.name));
			return;
		}
	}
}

fn validate_column(column: &Column, graph: &SchemaGraph, ctx: &mut SchemaValidationContext) {
	let table_name = graph.table(column.table).map(|table| table.name.clone()).unwrap_or_default();

	if !is_valid_name(&column.name) {
		ctx.report(diag::invalid_schema_name("Column", &column.name));
	}

	match column.max_length {
		Some(_) if !column.ty.element().takes_length() => {
			ctx.report(diag::length_not_allowed(&table_name, &column.name));
		}
		Some(keystone_ddl::ast::ColumnLength::Bounded(length)) if length <= 0 => {
			ctx.report(diag::invalid_length(&table_name, &column.name, length));
		}
		_ => {}
	}

	if column.allow_commit_timestamp() == Some(true) && column.ty != ColumnType::Scalar(keystone_ddl::ast::ScalarType::Timestamp)
	{
		ctx.report(diag::allow_commit_timestamp_not_timestamp(&table_name, &column.name));
	}
}

fn validate_index(index: &Index, graph: &SchemaGraph, ctx: &mut SchemaValidationContext) {
	if !is_valid_name(&index.name) {
		ctx.report(diag::invalid_schema_name("Index", &index.name));
	}

	let Ok(table) = graph.table(index.table) else {
		ctx.report(diag::structural_error(format!("index {} lost its table", index.name)));
		return;
	};

	for part in &index.key_parts {
		if !table.columns.contains(&part.column) {
			let name = graph.column(part.column).map(|column| column.name.clone()).unwrap_or_default();
			ctx.report(diag::index_key_column_not_in_table(&index.name, &name));
		}
	}
	for stored in &index.stored_columns {
		if !table.columns.contains(stored) {
			let name = graph.column(*stored).map(|column| column.name.clone()).unwrap_or_default();
			ctx.report(diag::index_key_column_not_in_table(&index.name, &name));
		}
	}

	if let Some(parent_id) = index.parent {
		let Ok(parent) = graph.table(parent_id) else {
			ctx.report(diag::interleave_parent_not_found(&index.name, "<dropped>"));
			return;
		};
		if index.key_parts.len() < parent.primary_key.len() {
			ctx.report(diag::interleave_key_mismatch(&index.name, &parent.name));
			return;
		}
		for (index_part, parent_part) in index.key_parts.iter().zip(&parent.primary_key) {
			let index_column = graph.column(index_part.column).map(|column| column.name.clone());
			let parent_column = graph.column(parent_part.column).map(|column| column.name.clone());
			if index_column.ok() != parent_column.ok() {
				ctx.report(diag::interleave_key_mismatch(&index.name, &parent.name));
				return;
			}
		}
	}
}

fn validate_foreign_key(foreign_key: &ForeignKey, graph: &SchemaGraph, ctx: &mut SchemaValidationContext) {
	let name = foreign_key.name();
	if !is_valid_name(name) {
		ctx.report(diag::invalid_schema_name("Foreign Key", name));
	}

	if foreign_key.referencing_columns.is_empty()
		|| foreign_key.referencing_columns.len() != foreign_key.referenced_columns.len()
	{
		ctx.report(diag::foreign_key_arity_mismatch(name));
		return;
	}

	for (referencing, referenced) in foreign_key.referencing_columns.iter().zip(&foreign_key.referenced_columns) {
		let (Ok(referencing), Ok(referenced)) = (graph.column(*referencing), graph.column(*referenced)) else {
			ctx.report(diag::structural_error(format!("foreign key {} lost a column", name)));
			continue;
		};
		if referencing.ty != referenced.ty || referencing.ty.is_array() {
			ctx.report(diag::foreign_key_type_mismatch(name, &referencing.name, &referenced.name));
		}
	}
}

fn validate_check(check: &CheckConstraint, _graph: &SchemaGraph, ctx: &mut SchemaValidationContext) {
	if let Some(name) = &check.constraint_name {
		if !is_valid_name(name) {
			ctx.report(diag::invalid_schema_name("Check Constraint", name));
		}
	}
}

fn validate_policy(policy: &RowDeletionPolicy, graph: &SchemaGraph, ctx: &mut SchemaValidationContext) {
	let table_name = graph.table(policy.table).map(|table| table.name.clone()).unwrap_or_default();
	let Ok(column) = graph.column(policy.column) else {
		ctx.report(diag::structural_error(format!("row deletion policy of {} lost its column", table_name)));
		return;
	};
	if column.ty != ColumnType::Scalar(keystone_ddl::ast::ScalarType::Timestamp) {
		ctx.report(diag::row_deletion_policy_column(&table_name, &column.name));
	}
}

/// Update-mode pass: nodes surviving from the original schema are
/// matched by name and checked for compatible evolution.
fn validate_update(candidate: &Schema, original: &Schema, ctx: &mut SchemaValidationContext) {
	for table_id in candidate.tables() {
		if ctx.is_full() {
			return;
		}
		let Ok(table) = candidate.graph().table(*table_id) else {
			continue;
		};
		let Some(original_table_id) = original.find_table(&table.name) else {
			continue;
		};
		let Ok(original_table) = original.graph().table(original_table_id) else {
			continue;
		};

		for column_id in &table.columns {
			let Ok(column) = candidate.graph().column(*column_id) else {
				continue;
			};
			let Some(original_column_id) = original_table.find_column(original.graph(), &column.name) else {
				continue;
			};
			let Ok(original_column) = original.graph().column(original_column_id) else {
				continue;
			};
			let node = SchemaNode::Column(column.clone());
			node.validate_update(&SchemaNode::Column(original_column.clone()), candidate.graph(), ctx);
		}
	}
}

/// Column compatibility rules between schema generations.
pub(crate) fn validate_column_update(
	column: &Column,
	original: &Column,
	graph: &SchemaGraph,
	ctx: &mut SchemaValidationContext,
) {
	let Ok(table) = graph.table(column.table) else {
		return;
	};
	let table_name = &table.name;
	let in_key = table
		.primary_key
		.iter()
		.any(|part| graph.column(part.column).map(|key| key.name == column.name).unwrap_or(false));

	if in_key {
		if column.ty != original.ty {
			ctx.report(diag::key_column_type_change(table_name, &column.name));
		}
		if original.not_null && !column.not_null {
			ctx.report(diag::key_column_null_relaxed(table_name, &column.name));
		}
	}

	if original.is_stored_generated
		&& column.is_stored_generated
		&& original.expression != column.expression
	{
		ctx.report(diag::generated_column_redefined(table_name, &column.name));
	}
}

#[cfg(test)]
mod tests {
	use keystone_ddl::{FeatureFlags, parse_statement};
	use keystone_type::StatusCode;

	use super::*;
	use crate::editor::SchemaGraphEditor;

	fn build(statements: &[&str]) -> Result<Schema> {
		let flags = FeatureFlags::default();
		let mut schema = Schema::empty();
		for statement in statements {
			let parsed = parse_statement(statement, &flags)?;
			let mut editor = SchemaGraphEditor::new(&schema)?;
			editor.apply(&parsed)?;
			let candidate = editor.into_schema();
			validate_schema(&candidate, Some(&schema))?;
			schema = candidate;
		}
		Ok(schema)
	}

	#[test]
	fn test_valid_schema_passes() {
		build(&[
			"CREATE TABLE Users (UserId INT64 NOT NULL, Name STRING(MAX)) PRIMARY KEY (UserId)",
			"CREATE TABLE Albums (UserId INT64 NOT NULL, AlbumId INT64 NOT NULL) PRIMARY KEY (UserId, AlbumId), INTERLEAVE IN PARENT Users ON DELETE CASCADE",
			"CREATE INDEX AlbumsByAlbumId ON Albums(AlbumId)",
		])
		.unwrap();
	}

	#[test]
	fn test_nullable_key_column_is_rejected() {
		let err = build(&["CREATE TABLE T (K INT64) PRIMARY KEY (K)"]).unwrap_err();
		assert_eq!(err.status(), StatusCode::FailedPrecondition);
		assert!(err.message.contains("must be NOT NULL"), "{}", err.message);
	}

	#[test]
	fn test_array_key_column_is_rejected() {
		let err = build(&["CREATE TABLE T (K ARRAY<INT64> NOT NULL) PRIMARY KEY (K)"]).unwrap_err();
		assert!(err.message.contains("cannot be an array"), "{}", err.message);
	}

	#[test]
	fn test_interleave_key_prefix_mismatch() {
		let err = build(&[
			"CREATE TABLE Users (UserId INT64 NOT NULL) PRIMARY KEY (UserId)",
			"CREATE TABLE Albums (AlbumId INT64 NOT NULL) PRIMARY KEY (AlbumId), INTERLEAVE IN PARENT Users",
		])
		.unwrap_err();
		assert!(err.message.contains("share a prefix"), "{}", err.message);
	}

	#[test]
	fn test_foreign_key_arity_mismatch() {
		let err = build(&[
			"CREATE TABLE U (X INT64 NOT NULL, Y INT64 NOT NULL) PRIMARY KEY (X, Y)",
			"CREATE TABLE T (A INT64 NOT NULL, B INT64, FOREIGN KEY (B) REFERENCES U (X, Y)) PRIMARY KEY (A)",
		])
		.unwrap_err();
		assert!(err.message.contains("equal, non-zero number"), "{}", err.message);
	}

	#[test]
	fn test_foreign_key_type_mismatch() {
		let err = build(&[
			"CREATE TABLE U (X INT64 NOT NULL) PRIMARY KEY (X)",
			"CREATE TABLE T (A INT64 NOT NULL, B STRING(MAX), FOREIGN KEY (B) REFERENCES U (X)) PRIMARY KEY (A)",
		])
		.unwrap_err();
		assert!(err.message.contains("column types do not match"), "{}", err.message);
	}

	#[test]
	fn test_row_deletion_policy_requires_timestamp() {
		let err = build(&[
			"CREATE TABLE T (K INT64 NOT NULL, CreatedAt DATE) PRIMARY KEY (K), ROW DELETION POLICY (OLDER_THAN(CreatedAt, INTERVAL 7 DAY))",
		])
		.unwrap_err();
		assert!(err.message.contains("TIMESTAMP"), "{}", err.message);
	}

	#[test]
	fn test_allow_commit_timestamp_on_non_timestamp() {
		let err = build(&[
			"CREATE TABLE T (K INT64 NOT NULL OPTIONS (allow_commit_timestamp = true)) PRIMARY KEY (K)",
		])
		.unwrap_err();
		assert!(err.message.contains("allow_commit_timestamp"), "{}", err.message);
	}

	#[test]
	fn test_key_column_type_change_is_rejected() {
		let err = build(&[
			"CREATE TABLE T (K INT64 NOT NULL, V INT64) PRIMARY KEY (K)",
			"ALTER TABLE T ALTER COLUMN K STRING(MAX) NOT NULL",
		])
		.unwrap_err();
		assert!(err.message.contains("Cannot change the type of primary key column"), "{}", err.message);
	}

	#[test]
	fn test_key_column_not_null_cannot_relax() {
		let err = build(&[
			"CREATE TABLE T (K INT64 NOT NULL, V INT64) PRIMARY KEY (K)",
			"ALTER TABLE T ALTER COLUMN K INT64",
		])
		.unwrap_err();
		assert_eq!(err.status(), StatusCode::FailedPrecondition);
	}

	#[test]
	fn test_non_key_column_type_change_is_allowed() {
		build(&[
			"CREATE TABLE T (K INT64 NOT NULL, V INT64) PRIMARY KEY (K)",
			"ALTER TABLE T ALTER COLUMN V STRING(MAX)",
		])
		.unwrap();
	}

	#[test]
	fn test_context_collects_multiple_errors() {
		// Two nullable key columns: validation keeps going past the
		// first diagnostic, the first one wins.
		let flags = FeatureFlags::default();
		let parsed = parse_statement("CREATE TABLE T (A INT64, B INT64) PRIMARY KEY (A, B)", &flags).unwrap();
		let mut editor = SchemaGraphEditor::new(&Schema::empty()).unwrap();
		editor.apply(&parsed).unwrap();
		let candidate = editor.into_schema();

		let mut ctx = SchemaValidationContext::default();
		let graph = candidate.graph();
		for id in graph.ids() {
			if let Some(node) = graph.get(id) {
				node.validate(graph, &mut ctx);
			}
		}
		assert_eq!(ctx.diagnostics().len(), 2);
		let err = ctx.into_result().unwrap_err();
		assert!(err.message.contains("column A"), "{}", err.message);
	}

	#[test]
	fn test_error_limit_caps_collection() {
		let mut ctx = SchemaValidationContext::new(2);
		for _ in 0..5 {
			ctx.report(diag::table_not_found("T"));
		}
		assert_eq!(ctx.diagnostics().len(), 2);
		assert!(ctx.is_full());
	}
}
