// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use serde::{Deserialize, Serialize};

/// One parsed DDL statement, the schema-change description handed to the
/// schema graph editor. Field names and enumerators track the published
/// administrative schema of the emulated service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DdlStatement {
	CreateDatabase(CreateDatabase),
	CreateTable(CreateTable),
	CreateIndex(CreateIndex),
	AlterTable(AlterTable),
	DropTable(DropTable),
	DropIndex(DropIndex),
	Analyze,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDatabase {
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
	pub name: String,
	pub columns: Vec<ColumnDef>,
	pub constraints: Vec<TableConstraint>,
	pub row_deletion_policy: Option<RowDeletionPolicy>,
}

impl CreateTable {
	pub fn primary_key(&self) -> &[KeyPart] {
		self.constraints
			.iter()
			.find_map(|constraint| match constraint {
				TableConstraint::PrimaryKey {
					key_parts,
				} => Some(key_parts.as_slice()),
				_ => None,
			})
			.unwrap_or(&[])
	}

	pub fn interleave(&self) -> Option<(&str, OnDeleteAction)> {
		self.constraints.iter().find_map(|constraint| match constraint {
			TableConstraint::Interleave {
				parent,
				on_delete,
				..
			} => Some((parent.as_str(), *on_delete)),
			_ => None,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndex {
	pub name: String,
	pub table: String,
	pub null_filtered: bool,
	pub unique: bool,
	pub key_parts: Vec<KeyPart>,
	pub stored_columns: Vec<String>,
	pub interleave_parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTable {
	pub table: String,
	pub action: AlterTableAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlterTableAction {
	AddColumn(ColumnDef),
	DropColumn(String),
	AlterColumn(ColumnDef),
	SetColumnOptions {
		column: String,
		options: Vec<ColumnOption>,
	},
	SetColumnDefault {
		column: String,
		expression: String,
	},
	DropColumnDefault {
		column: String,
	},
	AddConstraint(TableConstraint),
	DropConstraint(String),
	AlterInterleaveOnDelete(OnDeleteAction),
	AddRowDeletionPolicy(RowDeletionPolicy),
	ReplaceRowDeletionPolicy(RowDeletionPolicy),
	DropRowDeletionPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropIndex {
	pub name: String,
}

/// Scalar column types of the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
	Bool,
	Int64,
	Float64,
	String,
	Bytes,
	Timestamp,
	Date,
	Numeric,
	Json,
}

impl ScalarType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ScalarType::Bool => "BOOL",
			ScalarType::Int64 => "INT64",
			ScalarType::Float64 => "FLOAT64",
			ScalarType::String => "STRING",
			ScalarType::Bytes => "BYTES",
			ScalarType::Timestamp => "TIMESTAMP",
			ScalarType::Date => "DATE",
			ScalarType::Numeric => "NUMERIC",
			ScalarType::Json => "JSON",
		}
	}

	/// Only STRING and BYTES declare a length.
	pub fn takes_length(&self) -> bool {
		matches!(self, ScalarType::String | ScalarType::Bytes)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
	Scalar(ScalarType),
	Array(ScalarType),
}

impl ColumnType {
	pub fn element(&self) -> ScalarType {
		match self {
			ColumnType::Scalar(scalar) | ColumnType::Array(scalar) => *scalar,
		}
	}

	pub fn is_array(&self) -> bool {
		matches!(self, ColumnType::Array(_))
	}
}

impl std::fmt::Display for ColumnType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ColumnType::Scalar(scalar) => f.write_str(scalar.as_str()),
			ColumnType::Array(scalar) => write!(f, "ARRAY<{}>", scalar.as_str()),
		}
	}
}

/// Declared length of a STRING or BYTES column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnLength {
	Max,
	Bounded(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
	pub name: String,
	/// Absent only for the SET DEFAULT / DROP DEFAULT alter shapes,
	/// which do not restate the type.
	pub ty: Option<ColumnType>,
	pub max_length: Option<ColumnLength>,
	pub not_null: bool,
	pub options: Vec<ColumnOption>,
	/// Verbatim source text of the generated or default expression.
	pub expression: Option<String>,
	pub is_stored_generated: bool,
	pub has_default: bool,
}

impl ColumnDef {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			ty: None,
			max_length: None,
			not_null: false,
			options: Vec::new(),
			expression: None,
			is_stored_generated: false,
			has_default: false,
		}
	}
}

/// The recognized option keys. Unknown keys are rejected at parse time.
pub const OPTION_ALLOW_COMMIT_TIMESTAMP: &str = "allow_commit_timestamp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOption {
	pub name: String,
	pub value: OptionValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptionValue {
	Bool(bool),
	Null,
	Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableConstraint {
	PrimaryKey {
		key_parts: Vec<KeyPart>,
	},
	Interleave {
		parent: String,
		interleave_type: InterleaveType,
		on_delete: OnDeleteAction,
	},
	ForeignKey(ForeignKeyDef),
	Check(CheckDef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterleaveType {
	InParent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDef {
	pub constraint_name: Option<String>,
	pub referencing_columns: Vec<String>,
	pub referenced_table: String,
	pub referenced_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckDef {
	pub constraint_name: Option<String>,
	/// Verbatim source text between the CHECK parentheses.
	pub sql_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPart {
	pub column: String,
	pub order: SortOrder,
}

impl KeyPart {
	pub fn asc(column: impl Into<String>) -> Self {
		Self {
			column: column.into(),
			order: SortOrder::Asc,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
	#[default]
	Asc,
	Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OnDeleteAction {
	#[default]
	NoAction,
	Cascade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDeletionPolicy {
	pub column: String,
	pub older_than_days: i64,
}
