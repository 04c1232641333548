// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_ddl::{FeatureFlags, ast::DdlStatement, parse_statement};
use keystone_type::{Error, Result, diagnostic::ddl, error};
use tracing::{debug, instrument};

use crate::{catalog::Schema, editor::SchemaGraphEditor, validator::validate_schema};

/// Outcome of applying a statement stream to a schema.
///
/// Statements apply strictly in submitted order; the candidate after
/// statement k is the input to statement k+1. On the first failure the
/// preceding statements stay committed and the failing statement's error
/// is carried here, for the caller to attach to its operation record.
#[derive(Debug)]
pub struct SchemaChangeOutcome {
	/// The committed schema after the successful prefix.
	pub schema: Schema,
	pub statements_applied: usize,
	pub error: Option<Error>,
}

/// Applies DDL statement streams against committed schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaUpdater {
	flags: FeatureFlags,
}

impl SchemaUpdater {
	pub fn new(flags: FeatureFlags) -> Self {
		Self {
			flags,
		}
	}

	#[instrument(name = "schema::updater::apply", level = "debug", skip(self, current, statements), fields(count = statements.len()))]
	pub fn apply(&self, current: &Schema, statements: &[String]) -> SchemaChangeOutcome {
		let mut schema = current.clone();
		for (position, statement) in statements.iter().enumerate() {
			match self.apply_one(&schema, statement) {
				Ok(next) => schema = next,
				Err(err) => {
					debug!(position, "schema change rejected: {}", err.message);
					return SchemaChangeOutcome {
						schema,
						statements_applied: position,
						error: Some(err),
					};
				}
			}
		}
		SchemaChangeOutcome {
			schema,
			statements_applied: statements.len(),
			error: None,
		}
	}

	fn apply_one(&self, current: &Schema, statement: &str) -> Result<Schema> {
		let parsed = parse_statement(statement, &self.flags)?;
		if matches!(parsed, DdlStatement::CreateDatabase(_)) {
			return Err(error!(ddl::statement_not_supported(
				"CREATE DATABASE can only appear in a create-database request",
			)));
		}

		let mut editor = SchemaGraphEditor::new(current)?;
		editor.apply(&parsed)?;
		let candidate = editor.into_schema();
		validate_schema(&candidate, Some(current))?;
		Ok(candidate)
	}
}

#[cfg(test)]
mod tests {
	use keystone_type::StatusCode;

	use super::*;

	fn updater() -> SchemaUpdater {
		SchemaUpdater::new(FeatureFlags::default())
	}

	fn statements(sources: &[&str]) -> Vec<String> {
		sources.iter().map(|source| source.to_string()).collect()
	}

	#[test]
	fn test_apply_all_statements() {
		let outcome = updater().apply(
			&Schema::empty(),
			&statements(&[
				"CREATE TABLE Users (UserId INT64 NOT NULL) PRIMARY KEY (UserId)",
				"ALTER TABLE Users ADD COLUMN Name STRING(MAX)",
				"CREATE INDEX UsersByName ON Users(Name)",
				"ANALYZE",
			]),
		);
		assert!(outcome.error.is_none());
		assert_eq!(outcome.statements_applied, 4);
		assert!(outcome.schema.find_table("Users").is_some());
		assert!(outcome.schema.find_index("UsersByName").is_some());
	}

	#[test]
	fn test_each_statement_sees_the_previous_candidate() {
		let outcome = updater().apply(
			&Schema::empty(),
			&statements(&[
				"CREATE TABLE T (K INT64 NOT NULL) PRIMARY KEY (K)",
				"ALTER TABLE T ADD COLUMN V INT64",
				"ALTER TABLE T DROP COLUMN V",
			]),
		);
		assert_eq!(outcome.statements_applied, 3);
		let table = outcome.schema.graph().table(outcome.schema.find_table("T").unwrap()).unwrap();
		assert_eq!(table.columns.len(), 1);
	}

	#[test]
	fn test_partial_failure_commits_prefix() {
		let outcome = updater().apply(
			&Schema::empty(),
			&statements(&[
				"CREATE TABLE A (Id INT64 NOT NULL) PRIMARY KEY (Id)",
				"CREATE TABLE B (Id INT64 NOT NULL) PRIMARY KEY (Id)",
				"CREATE TABLE A (Id INT64 NOT NULL) PRIMARY KEY (Id)",
				"CREATE TABLE C (Id INT64 NOT NULL) PRIMARY KEY (Id)",
			]),
		);
		assert_eq!(outcome.statements_applied, 2);
		let err = outcome.error.unwrap();
		assert_eq!(err.status(), StatusCode::FailedPrecondition);
		// A and B are committed, C is not reached
		assert!(outcome.schema.find_table("A").is_some());
		assert!(outcome.schema.find_table("B").is_some());
		assert!(outcome.schema.find_table("C").is_none());
	}

	#[test]
	fn test_parse_failure_reports_invalid_argument() {
		let outcome = updater().apply(&Schema::empty(), &statements(&["CREATE TABLE Users ("]));
		assert_eq!(outcome.statements_applied, 0);
		assert_eq!(outcome.error.unwrap().status(), StatusCode::InvalidArgument);
	}

	#[test]
	fn test_feature_flags_are_honored() {
		let mut flags = FeatureFlags::default();
		flags.enable_stored_generated_columns = false;
		let outcome = SchemaUpdater::new(flags).apply(
			&Schema::empty(),
			&statements(&["CREATE TABLE T (K INT64 NOT NULL, G INT64 AS (K) STORED) PRIMARY KEY (K)"]),
		);
		assert_eq!(outcome.error.unwrap().status(), StatusCode::Unimplemented);
	}

	#[test]
	fn test_create_database_is_rejected_in_updates() {
		let outcome = updater().apply(&Schema::empty(), &statements(&["CREATE DATABASE mydb"]));
		let err = outcome.error.unwrap();
		assert_eq!(err.status(), StatusCode::InvalidArgument);
		assert!(err.message.starts_with("Error parsing DDL statement"), "{}", err.message);
	}

	#[test]
	fn test_failure_never_mutates_the_live_schema() {
		let base = updater()
			.apply(&Schema::empty(), &statements(&["CREATE TABLE T (K INT64 NOT NULL) PRIMARY KEY (K)"]))
			.schema;
		let before = base.graph().live_count();

		let outcome = updater().apply(&base, &statements(&["ALTER TABLE T ADD COLUMN K INT64"]));
		assert!(outcome.error.is_some());
		assert_eq!(base.graph().live_count(), before);
		assert_eq!(outcome.schema.graph().live_count(), before);
	}
}
