// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use crate::error::diagnostic::{Diagnostic, StatusCode};

fn failed(code: &str, message: String) -> Diagnostic {
	Diagnostic::new(code, StatusCode::FailedPrecondition, message)
}

pub fn table_not_found(name: &str) -> Diagnostic {
	failed("SCHEMA_001", format!("Table not found: {}", name))
}

pub fn table_already_exists(name: &str) -> Diagnostic {
	failed("SCHEMA_002", format!("Duplicate name in schema: {}", name))
}

pub fn index_not_found(name: &str) -> Diagnostic {
	failed("SCHEMA_003", format!("Index not found: {}", name))
}

pub fn column_not_found(table: &str, column: &str) -> Diagnostic {
	failed("SCHEMA_004", format!("Column not found in table {}: {}", table, column))
}

pub fn duplicate_column(table: &str, column: &str) -> Diagnostic {
	failed("SCHEMA_005", format!("Duplicate column name {} in table {}", column, table))
}

pub fn constraint_not_found(table: &str, name: &str) -> Diagnostic {
	failed("SCHEMA_006", format!("{} is not a constraint in {}", name, table))
}

pub fn duplicate_constraint(table: &str, name: &str) -> Diagnostic {
	failed("SCHEMA_007", format!("Duplicate constraint name {} in table {}", name, table))
}

pub fn invalid_schema_name(kind: &str, name: &str) -> Diagnostic {
	failed("SCHEMA_008", format!("{} name not valid: {}", kind, name))
}

pub fn key_column_invalid_type(table: &str, column: &str) -> Diagnostic {
	failed("SCHEMA_027", format!("Primary key column {} of table {} cannot be an array", column, table))
}

pub fn key_column_not_null(table: &str, column: &str) -> Diagnostic {
	failed("SCHEMA_009", format!("Primary key column {} of table {} must be NOT NULL", column, table))
}

pub fn index_key_column_not_in_table(index: &str, column: &str) -> Diagnostic {
	failed("SCHEMA_010", format!("Index {} references a column {} that is not part of the indexed table", index, column))
}

pub fn interleave_parent_not_found(table: &str, parent: &str) -> Diagnostic {
	failed("SCHEMA_011", format!("Parent table {} of table {} does not exist", parent, table))
}

pub fn interleave_cycle(table: &str) -> Diagnostic {
	failed("SCHEMA_012", format!("Interleaving of table {} forms a cycle", table))
}

pub fn interleave_key_mismatch(table: &str, parent: &str) -> Diagnostic {
	failed(
		"SCHEMA_013",
		format!("Primary key of table {} must share a prefix with the primary key of its parent {}", table, parent),
	)
}

pub fn foreign_key_arity_mismatch(name: &str) -> Diagnostic {
	failed(
		"SCHEMA_014",
		format!("Foreign key {} must reference an equal, non-zero number of referencing and referenced columns", name),
	)
}

pub fn foreign_key_type_mismatch(name: &str, referencing: &str, referenced: &str) -> Diagnostic {
	failed(
		"SCHEMA_015",
		format!("Foreign key {} column types do not match: {} references {}", name, referencing, referenced),
	)
}

pub fn row_deletion_policy_column(table: &str, column: &str) -> Diagnostic {
	failed(
		"SCHEMA_016",
		format!("Row deletion policy of table {} requires {} to be an existing TIMESTAMP column", table, column),
	)
}

pub fn row_deletion_policy_missing(table: &str) -> Diagnostic {
	failed("SCHEMA_017", format!("Table {} does not have a row deletion policy", table))
}

pub fn row_deletion_policy_exists(table: &str) -> Diagnostic {
	failed("SCHEMA_018", format!("Table {} already has a row deletion policy", table))
}

pub fn table_not_interleaved(table: &str) -> Diagnostic {
	failed("SCHEMA_019", format!("Table {} is not interleaved in a parent", table))
}

pub fn length_not_allowed(table: &str, column: &str) -> Diagnostic {
	failed("SCHEMA_020", format!("Column {} of table {} cannot declare a length for its type", column, table))
}

pub fn invalid_length(table: &str, column: &str, length: i64) -> Diagnostic {
	failed("SCHEMA_021", format!("Column {} of table {} declares an invalid length {}", column, table, length))
}

pub fn table_has_children(table: &str) -> Diagnostic {
	failed("SCHEMA_022", format!("Table {} still has interleaved children or indexes", table))
}

pub fn drop_key_column(table: &str, column: &str) -> Diagnostic {
	failed("SCHEMA_023", format!("Cannot drop key column {} of table {}", column, table))
}

pub fn column_in_use(table: &str, column: &str, user: &str) -> Diagnostic {
	failed("SCHEMA_024", format!("Cannot drop column {} of table {}: in use by {}", column, table, user))
}

pub fn table_referenced_by_foreign_key(table: &str, foreign_key: &str) -> Diagnostic {
	failed("SCHEMA_025", format!("Cannot drop table {}: referenced by foreign key {}", table, foreign_key))
}

pub fn allow_commit_timestamp_not_timestamp(table: &str, column: &str) -> Diagnostic {
	failed(
		"SCHEMA_026",
		format!("Column {} of table {} sets allow_commit_timestamp but is not a TIMESTAMP", column, table),
	)
}

// Update-mode compatibility checks.

pub fn key_column_type_change(table: &str, column: &str) -> Diagnostic {
	failed("SCHEMA_030", format!("Cannot change the type of primary key column {} of table {}", column, table))
}

pub fn key_column_null_relaxed(table: &str, column: &str) -> Diagnostic {
	failed("SCHEMA_031", format!("Cannot relax NOT NULL on primary key column {} of table {}", column, table))
}

pub fn generated_column_redefined(table: &str, column: &str) -> Diagnostic {
	failed("SCHEMA_032", format!("Cannot change the expression of generated column {} of table {}", column, table))
}

/// A candidate graph edge pointed at a node with no image in the new
/// graph. This is a bug in the editor, not a user error.
pub fn structural_error(detail: impl Into<String>) -> Diagnostic {
	Diagnostic::new("SCHEMA_099", StatusCode::Internal, format!("Schema graph corruption: {}", detail.into()))
}
