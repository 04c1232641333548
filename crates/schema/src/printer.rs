// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use std::fmt::Write;

use keystone_ddl::ast::{ColumnLength, ColumnType, OnDeleteAction, OptionValue, SortOrder};
use keystone_type::Result;

use crate::catalog::{Column, Schema, SchemaGraph, TableKeyPart};

/// Print the committed schema as canonical DDL. Reparsing the output
/// reproduces the schema up to generated constraint names; managed
/// backing indexes are engine-owned and never printed. Foreign keys are
/// emitted as trailing ALTER statements so any creation order between
/// referencing and referenced tables replays cleanly.
pub fn print_ddl_statements(schema: &Schema) -> Result<Vec<String>> {
	let graph = schema.graph();
	let mut statements = Vec::new();

	for table_id in schema.tables() {
		let table = graph.table(*table_id)?;
		if table.is_index_data_table() {
			continue;
		}

		let mut out = String::new();
		let _ = write!(&mut out, "CREATE TABLE {} (", table.name);
		let mut items = Vec::new();
		for column_id in &table.columns {
			items.push(print_column(graph.column(*column_id)?));
		}
		for check_id in &table.check_constraints {
			let check = graph.check_constraint(*check_id)?;
			match &check.constraint_name {
				Some(name) => items.push(format!("CONSTRAINT {} CHECK({})", name, check.expression)),
				None => items.push(format!("CHECK({})", check.expression)),
			}
		}
		if items.is_empty() {
			out.push_str(")");
		} else {
			let _ = write!(&mut out, "\n  {}\n)", items.join(",\n  "));
		}

		let _ = write!(&mut out, " PRIMARY KEY ({})", print_key_parts(graph, &table.primary_key)?);

		if let Some(parent_id) = table.parent {
			let parent = graph.table(parent_id)?;
			let _ = write!(&mut out, ", INTERLEAVE IN PARENT {}", parent.name);
			match table.on_delete {
				OnDeleteAction::Cascade => out.push_str(" ON DELETE CASCADE"),
				OnDeleteAction::NoAction => out.push_str(" ON DELETE NO ACTION"),
			}
		}

		if let Some(policy_id) = table.row_deletion_policy {
			let policy = graph.row_deletion_policy(policy_id)?;
			let column = graph.column(policy.column)?;
			let _ = write!(
				&mut out,
				", ROW DELETION POLICY (OLDER_THAN({}, INTERVAL {} DAY))",
				column.name, policy.older_than_days
			);
		}

		statements.push(out);
	}

	for index_id in schema.indexes() {
		let index = graph.index(*index_id)?;
		if index.managed {
			continue;
		}
		let table = graph.table(index.table)?;

		let mut out = String::new();
		out.push_str("CREATE ");
		if index.unique {
			out.push_str("UNIQUE ");
		}
		if index.null_filtered {
			out.push_str("NULL_FILTERED ");
		}
		let _ = write!(&mut out, "INDEX {} ON {}({})", index.name, table.name, print_key_parts(graph, &index.key_parts)?);

		if !index.stored_columns.is_empty() {
			let mut names = Vec::with_capacity(index.stored_columns.len());
			for column_id in &index.stored_columns {
				names.push(graph.column(*column_id)?.name.clone());
			}
			let _ = write!(&mut out, " STORING ({})", names.join(", "));
		}

		if let Some(parent_id) = index.parent {
			let _ = write!(&mut out, ", INTERLEAVE IN {}", graph.table(parent_id)?.name);
		}

		statements.push(out);
	}

	for table_id in schema.tables() {
		let table = graph.table(*table_id)?;
		for foreign_key_id in &table.foreign_keys {
			let foreign_key = graph.foreign_key(*foreign_key_id)?;
			let referenced = graph.table(foreign_key.referenced_table)?;

			let mut referencing_names = Vec::new();
			for column in &foreign_key.referencing_columns {
				referencing_names.push(graph.column(*column)?.name.clone());
			}
			let mut referenced_names = Vec::new();
			for column in &foreign_key.referenced_columns {
				referenced_names.push(graph.column(*column)?.name.clone());
			}

			let mut out = format!("ALTER TABLE {} ADD ", table.name);
			if let Some(name) = &foreign_key.constraint_name {
				let _ = write!(&mut out, "CONSTRAINT {} ", name);
			}
			let _ = write!(
				&mut out,
				"FOREIGN KEY ({}) REFERENCES {} ({})",
				referencing_names.join(", "),
				referenced.name,
				referenced_names.join(", ")
			);
			statements.push(out);
		}
	}

	Ok(statements)
}

fn print_column(column: &Column) -> String {
	let mut out = format!("{} {}", column.name, print_type(column));
	if column.not_null {
		out.push_str(" NOT NULL");
	}
	if let Some(expression) = &column.expression {
		if column.has_default {
			let _ = write!(&mut out, " DEFAULT {}", expression);
		} else {
			let _ = write!(&mut out, " AS {} STORED", expression);
		}
	}
	if !column.options.is_empty() {
		let options: Vec<String> = column
			.options
			.iter()
			.map(|option| {
				let value = match &option.value {
					OptionValue::Bool(true) => "true".to_string(),
					OptionValue::Bool(false) => "false".to_string(),
					OptionValue::Null => "null".to_string(),
					OptionValue::Text(text) => format!("'{}'", text),
				};
				format!("{} = {}", option.name, value)
			})
			.collect();
		let _ = write!(&mut out, " OPTIONS ({})", options.join(", "));
	}
	out
}

fn print_type(column: &Column) -> String {
	let element = |scalar: keystone_ddl::ast::ScalarType| -> String {
		if scalar.takes_length() {
			match column.max_length {
				Some(ColumnLength::Bounded(length)) => format!("{}({})", scalar.as_str(), length),
				_ => format!("{}(MAX)", scalar.as_str()),
			}
		} else {
			scalar.as_str().to_string()
		}
	};
	match column.ty {
		ColumnType::Scalar(scalar) => element(scalar),
		ColumnType::Array(scalar) => format!("ARRAY<{}>", element(scalar)),
	}
}

fn print_key_parts(graph: &SchemaGraph, key_parts: &[TableKeyPart]) -> Result<String> {
	let mut parts = Vec::with_capacity(key_parts.len());
	for part in key_parts {
		let column = graph.column(part.column)?;
		match part.order {
			SortOrder::Asc => parts.push(column.name.clone()),
			SortOrder::Desc => parts.push(format!("{} DESC", column.name)),
		}
	}
	Ok(parts.join(", "))
}

#[cfg(test)]
mod tests {
	use keystone_ddl::{FeatureFlags, parse_statement};

	use super::*;
	use crate::editor::SchemaGraphEditor;

	fn build(statements: &[&str]) -> Schema {
		let flags = FeatureFlags::default();
		let mut schema = Schema::empty();
		for statement in statements {
			let parsed = parse_statement(statement, &flags).unwrap();
			let mut editor = SchemaGraphEditor::new(&schema).unwrap();
			editor.apply(&parsed).unwrap();
			schema = editor.into_schema();
		}
		schema
	}

	#[test]
	fn test_print_create_table() {
		let schema = build(&["CREATE TABLE Users (UserId INT64 NOT NULL, Name STRING(MAX)) PRIMARY KEY (UserId)"]);
		let statements = print_ddl_statements(&schema).unwrap();
		assert_eq!(statements.len(), 1);
		assert_eq!(
			statements[0],
			"CREATE TABLE Users (\n  UserId INT64 NOT NULL,\n  Name STRING(MAX)\n) PRIMARY KEY (UserId)"
		);
	}

	#[test]
	fn test_print_interleave_policy_and_index() {
		let schema = build(&[
			"CREATE TABLE Users (UserId INT64 NOT NULL, CreatedAt TIMESTAMP) PRIMARY KEY (UserId), ROW DELETION POLICY (OLDER_THAN(CreatedAt, INTERVAL 7 DAY))",
			"CREATE TABLE Albums (UserId INT64 NOT NULL, AlbumId INT64 NOT NULL, Name STRING(1024)) PRIMARY KEY (UserId, AlbumId DESC), INTERLEAVE IN PARENT Users ON DELETE CASCADE",
			"CREATE UNIQUE NULL_FILTERED INDEX AlbumsByName ON Albums(Name) STORING (AlbumId), INTERLEAVE IN Users",
		]);
		let statements = print_ddl_statements(&schema).unwrap();
		assert_eq!(statements.len(), 3);
		assert!(statements[0].ends_with("ROW DELETION POLICY (OLDER_THAN(CreatedAt, INTERVAL 7 DAY))"));
		assert!(statements[1].contains("PRIMARY KEY (UserId, AlbumId DESC), INTERLEAVE IN PARENT Users ON DELETE CASCADE"));
		assert_eq!(
			statements[2],
			"CREATE UNIQUE NULL_FILTERED INDEX AlbumsByName ON Albums(Name) STORING (AlbumId), INTERLEAVE IN Users"
		);
	}

	#[test]
	fn test_print_generated_default_and_options() {
		let schema = build(&[
			"CREATE TABLE T (K INT64 NOT NULL, G INT64 AS (K + 1) STORED, D INT64 DEFAULT (10), Ts TIMESTAMP OPTIONS (allow_commit_timestamp = true)) PRIMARY KEY (K)",
		]);
		let statements = print_ddl_statements(&schema).unwrap();
		assert!(statements[0].contains("G INT64 AS (K + 1) STORED"));
		assert!(statements[0].contains("D INT64 DEFAULT (10)"));
		assert!(statements[0].contains("Ts TIMESTAMP OPTIONS (allow_commit_timestamp = true)"));
	}

	#[test]
	fn test_managed_indexes_are_not_printed() {
		let schema = build(&[
			"CREATE TABLE Users (UserId INT64 NOT NULL, Name STRING(MAX)) PRIMARY KEY (UserId)",
			"CREATE TABLE Orders (OrderId INT64 NOT NULL, UserName STRING(MAX), FOREIGN KEY (UserName) REFERENCES Users (Name)) PRIMARY KEY (OrderId)",
		]);
		let statements = print_ddl_statements(&schema).unwrap();
		assert!(statements.iter().all(|statement| !statement.contains("IDX_")), "{:?}", statements);
		// The foreign key itself prints as a trailing ALTER
		assert!(statements.last().unwrap().starts_with("ALTER TABLE Orders ADD FOREIGN KEY (UserName)"));
	}

	#[test]
	fn test_print_reparse_round_trip() {
		let source = &[
			"CREATE TABLE Users (UserId INT64 NOT NULL, Name STRING(MAX), CreatedAt TIMESTAMP OPTIONS (allow_commit_timestamp = true)) PRIMARY KEY (UserId), ROW DELETION POLICY (OLDER_THAN(CreatedAt, INTERVAL 30 DAY))",
			"CREATE TABLE Albums (UserId INT64 NOT NULL, AlbumId INT64 NOT NULL, Title STRING(1024), CONSTRAINT TitleNotEmpty CHECK(Title != '')) PRIMARY KEY (UserId, AlbumId), INTERLEAVE IN PARENT Users ON DELETE CASCADE",
			"CREATE INDEX AlbumsByTitle ON Albums(Title DESC) STORING (AlbumId)",
			"ALTER TABLE Albums ADD CONSTRAINT FK_AlbumUser FOREIGN KEY (UserId) REFERENCES Users (UserId)",
		];
		let schema = build(source);
		let printed = print_ddl_statements(&schema).unwrap();

		let replayed_statements: Vec<&str> = printed.iter().map(String::as_str).collect();
		let replayed = build(&replayed_statements);
		let reprinted = print_ddl_statements(&replayed).unwrap();
		assert_eq!(printed, reprinted);
	}
}
