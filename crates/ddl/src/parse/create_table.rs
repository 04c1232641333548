// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::{Result, diagnostic::ddl, error};

use crate::{
	ast::{
		CheckDef, ColumnDef, ColumnLength, ColumnOption, ColumnType, CreateTable, ForeignKeyDef, InterleaveType,
		KeyPart, OPTION_ALLOW_COMMIT_TIMESTAMP, OnDeleteAction, OptionValue, RowDeletionPolicy, ScalarType,
		SortOrder, TableConstraint,
	},
	parse::Parser,
	tokenize::{Keyword, Literal, LiteralValue, Punct, TokenKind},
};

impl<'a> Parser<'a> {
	/// `CREATE TABLE` body, after the two leading keywords.
	pub(crate) fn parse_create_table(&mut self) -> Result<CreateTable> {
		let name = self.identifier("a table name")?;

		let mut columns = Vec::new();
		let mut constraints = Vec::new();

		self.consume_punct(Punct::OpenParen)?;
		loop {
			// Checking for the closing paren first tolerates a
			// trailing comma in the list.
			if self.current().is_punct(Punct::CloseParen) {
				break;
			}
			match self.current().kind {
				TokenKind::Keyword(Keyword::Constraint)
				| TokenKind::Keyword(Keyword::Foreign)
				| TokenKind::Keyword(Keyword::Check)
					if !self.at_contextual_keyword_column() =>
				{
					constraints.push(self.parse_table_constraint()?);
				}
				_ => columns.push(self.parse_column_def()?),
			}
			if self.current().is_punct(Punct::CloseParen) {
				break;
			}
			self.consume_punct(Punct::Comma)?;
		}
		self.consume_punct(Punct::CloseParen)?;

		self.consume_keyword(Keyword::Primary)?;
		self.consume_keyword(Keyword::Key)?;
		constraints.push(TableConstraint::PrimaryKey {
			key_parts: self.parse_key_parts()?,
		});

		let mut row_deletion_policy = None;
		while self.consume_if_punct(Punct::Comma).is_some() {
			if self.consume_if_keyword(Keyword::Interleave).is_some() {
				self.consume_keyword(Keyword::In)?;
				self.consume_keyword(Keyword::Parent)?;
				let parent = self.identifier("a parent table name")?;
				let on_delete = self.parse_on_delete_clause()?;
				constraints.push(TableConstraint::Interleave {
					parent,
					interleave_type: InterleaveType::InParent,
					on_delete,
				});
			} else if self.current().is_keyword(Keyword::Row) {
				row_deletion_policy = Some(self.parse_row_deletion_policy()?);
			} else {
				return Err(self.expected("'INTERLEAVE' or 'ROW'"));
			}
		}

		Ok(CreateTable {
			name,
			columns,
			constraints,
			row_deletion_policy,
		})
	}

	/// `FOREIGN` and `CHECK` head table constraints, but being
	/// contextual keywords they can also name a column
	/// (`CHECK INT64 NOT NULL`). A constraint head is only taken as one
	/// when the token after it continues a constraint.
	fn at_contextual_keyword_column(&self) -> bool {
		let next = &self.peek_token(1).kind;
		match self.current().kind {
			TokenKind::Keyword(Keyword::Check) => !matches!(next, TokenKind::Punct(Punct::OpenParen)),
			TokenKind::Keyword(Keyword::Foreign) => !matches!(next, TokenKind::Keyword(Keyword::Key)),
			_ => false,
		}
	}

	/// `[CONSTRAINT <name>] (FOREIGN KEY … | CHECK (…))`, shared with
	/// `ALTER TABLE … ADD`.
	pub(crate) fn parse_table_constraint(&mut self) -> Result<TableConstraint> {
		let constraint_name = if self.consume_if_keyword(Keyword::Constraint).is_some() {
			Some(self.identifier("a constraint name")?)
		} else {
			None
		};

		if self.consume_if_keyword(Keyword::Foreign).is_some() {
			self.consume_keyword(Keyword::Key)?;
			let referencing_columns = self.parse_column_name_list()?;
			self.consume_keyword(Keyword::References)?;
			let referenced_table = self.identifier("a table name")?;
			let referenced_columns = self.parse_column_name_list()?;
			return Ok(TableConstraint::ForeignKey(ForeignKeyDef {
				constraint_name,
				referencing_columns,
				referenced_table,
				referenced_columns,
			}));
		}

		if self.consume_if_keyword(Keyword::Check).is_some() {
			let sql_text = self.capture_expression(false)?;
			if !self.flags.enable_check_constraint {
				return Err(error!(ddl::check_constraint_disabled()));
			}
			return Ok(TableConstraint::Check(CheckDef {
				constraint_name,
				sql_text,
			}));
		}

		Err(self.expected("'FOREIGN' or 'CHECK'"))
	}

	/// One column definition:
	/// `<name> <type> [NOT NULL] [AS (expr) STORED | DEFAULT (expr)]
	/// [OPTIONS (…)]`.
	pub(crate) fn parse_column_def(&mut self) -> Result<ColumnDef> {
		let name = self.identifier("a column name")?;
		let mut def = ColumnDef::new(name);

		self.parse_column_type(&mut def)?;
		self.parse_not_null(&mut def)?;
		self.parse_generated_or_default(&mut def)?;
		if self.current().is_keyword(Keyword::Options) {
			def.options = self.parse_options_list()?;
		}

		self.check_column_gates(&def)?;
		Ok(def)
	}

	pub(crate) fn parse_not_null(&mut self, def: &mut ColumnDef) -> Result<()> {
		if self.consume_if_keyword(Keyword::Not).is_some() {
			self.consume_keyword(Keyword::Null)?;
			def.not_null = true;
		}
		Ok(())
	}

	pub(crate) fn parse_column_type(&mut self, def: &mut ColumnDef) -> Result<()> {
		if self.is_eof() {
			return Err(self.expected("a column type"));
		}

		let scalar = |parser: &mut Self, def: &mut ColumnDef, scalar: ScalarType| -> Result<ScalarType> {
			parser.advance();
			if scalar.takes_length() {
				parser.consume_punct(Punct::OpenParen)?;
				def.max_length = Some(parser.parse_column_length()?);
				parser.consume_punct(Punct::CloseParen)?;
			}
			Ok(scalar)
		};

		match self.current().kind {
			TokenKind::Keyword(Keyword::Array) => {
				self.advance();
				self.consume_punct(Punct::LeftAngle)?;
				let element = match self.scalar_type_keyword() {
					Some(element) => scalar(self, def, element)?,
					None => {
						return Err(error!(ddl::while_parsing(
							self.current().fragment.clone(),
							"column_type",
						)));
					}
				};
				self.consume_punct(Punct::RightAngle)?;
				def.ty = Some(ColumnType::Array(element));
				Ok(())
			}
			_ => match self.scalar_type_keyword() {
				Some(element) => {
					let element = scalar(self, def, element)?;
					def.ty = Some(ColumnType::Scalar(element));
					Ok(())
				}
				None => Err(error!(ddl::while_parsing(self.current().fragment.clone(), "column_type"))),
			},
		}
	}

	fn scalar_type_keyword(&self) -> Option<ScalarType> {
		match self.current().kind {
			TokenKind::Keyword(Keyword::Bool) => Some(ScalarType::Bool),
			TokenKind::Keyword(Keyword::Int64) => Some(ScalarType::Int64),
			TokenKind::Keyword(Keyword::Float64) => Some(ScalarType::Float64),
			TokenKind::Keyword(Keyword::String) => Some(ScalarType::String),
			TokenKind::Keyword(Keyword::Bytes) => Some(ScalarType::Bytes),
			TokenKind::Keyword(Keyword::Timestamp) => Some(ScalarType::Timestamp),
			TokenKind::Keyword(Keyword::Date) => Some(ScalarType::Date),
			TokenKind::Keyword(Keyword::Numeric) => Some(ScalarType::Numeric),
			TokenKind::Keyword(Keyword::Json) => Some(ScalarType::Json),
			_ => None,
		}
	}

	/// `MAX` or an integer literal, decimal or hex.
	fn parse_column_length(&mut self) -> Result<ColumnLength> {
		if self.consume_if_keyword(Keyword::Max).is_some() {
			return Ok(ColumnLength::Max);
		}
		if self.current().kind == TokenKind::Literal(Literal::Integer) {
			let token = self.advance();
			let text = token.fragment.text();
			let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
				i64::from_str_radix(hex, 16)
			} else {
				text.parse::<i64>()
			};
			return match parsed {
				Ok(length) => Ok(ColumnLength::Bounded(length)),
				Err(_) => Err(error!(ddl::syntax_error(
					token.fragment.clone(),
					format!("Invalid column length: {}", text),
				))),
			};
		}
		Err(self.expected("'MAX' or an integer"))
	}

	/// `[AS (expr) STORED | DEFAULT (expr)]`. The expression body is the
	/// verbatim source between the outer parens, parens included. The
	/// two forms are mutually exclusive; combining them is a syntax
	/// error regardless of feature gates.
	pub(crate) fn parse_generated_or_default(&mut self, def: &mut ColumnDef) -> Result<()> {
		if self.consume_if_keyword(Keyword::As).is_some() {
			def.expression = Some(self.capture_expression(true)?);
			if self.consume_if_keyword(Keyword::Stored).is_some() {
				def.is_stored_generated = true;
			}
		} else if self.consume_if_keyword(Keyword::Default).is_some() {
			def.expression = Some(self.capture_expression(true)?);
			def.has_default = true;
		}

		if def.expression.is_some()
			&& matches!(self.current().kind, TokenKind::Keyword(Keyword::As) | TokenKind::Keyword(Keyword::Default))
		{
			return Err(self.expected("the end of the column definition"));
		}
		Ok(())
	}

	/// Feature gates are checked only after the column parsed, so a
	/// malformed gated column still reads as a syntax error.
	pub(crate) fn check_column_gates(&self, def: &ColumnDef) -> Result<()> {
		if def.expression.is_some() && !def.has_default {
			if !self.flags.enable_stored_generated_columns {
				return Err(error!(ddl::generated_columns_disabled()));
			}
			if !def.is_stored_generated {
				return Err(error!(ddl::non_stored_generated_column(&def.name)));
			}
		}
		if def.has_default && !self.flags.enable_column_default_values {
			return Err(error!(ddl::column_default_values_disabled()));
		}
		Ok(())
	}

	/// `OPTIONS ( key = value [, key = value]* )` with a fixed key set
	/// and no trailing comma. Duplicate keys are preserved in order.
	pub(crate) fn parse_options_list(&mut self) -> Result<Vec<ColumnOption>> {
		self.consume_keyword(Keyword::Options)?;
		self.consume_punct(Punct::OpenParen)?;

		let mut options = Vec::new();
		loop {
			let name_token = self.current().clone();
			if !name_token.is_identifier_like() {
				return Err(error!(ddl::while_parsing(name_token.fragment.clone(), "option_key_val")));
			}
			let name = name_token.fragment.text().to_string();
			if name != OPTION_ALLOW_COMMIT_TIMESTAMP {
				return Err(error!(ddl::unknown_option(name_token.fragment.clone())));
			}
			self.advance();
			self.consume_punct(Punct::Equal)?;

			let value_token = self.advance();
			let value = match (&value_token.kind, &value_token.value) {
				(TokenKind::Keyword(Keyword::True), _) => OptionValue::Bool(true),
				(TokenKind::Keyword(Keyword::False), _) => OptionValue::Bool(false),
				(TokenKind::Keyword(Keyword::Null), _) => OptionValue::Null,
				(TokenKind::Literal(Literal::Text), Some(LiteralValue::Text(text))) => {
					OptionValue::Text(text.clone())
				}
				_ => {
					return Err(error!(ddl::while_parsing(
						value_token.fragment.clone(),
						"option_key_val",
					)));
				}
			};
			options.push(ColumnOption {
				name,
				value,
			});

			if self.consume_if_punct(Punct::Comma).is_some() {
				// A trailing comma inside OPTIONS is not tolerated.
				if self.current().is_punct(Punct::CloseParen) {
					return Err(error!(ddl::while_parsing(
						self.current().fragment.clone(),
						"option_key_val",
					)));
				}
				continue;
			}
			break;
		}
		self.consume_punct(Punct::CloseParen)?;
		Ok(options)
	}

	/// `( [name [ASC|DESC] [, name [ASC|DESC]]*] )`
	pub(crate) fn parse_key_parts(&mut self) -> Result<Vec<KeyPart>> {
		self.consume_punct(Punct::OpenParen)?;
		let mut key_parts = Vec::new();
		loop {
			if self.current().is_punct(Punct::CloseParen) {
				break;
			}
			let column = self.identifier("a key column name")?;
			let order = if self.consume_if_keyword(Keyword::Asc).is_some() {
				SortOrder::Asc
			} else if self.consume_if_keyword(Keyword::Desc).is_some() {
				SortOrder::Desc
			} else {
				SortOrder::Asc
			};
			key_parts.push(KeyPart {
				column,
				order,
			});
			if self.consume_if_punct(Punct::Comma).is_none() {
				break;
			}
		}
		self.consume_punct(Punct::CloseParen)?;
		Ok(key_parts)
	}

	pub(crate) fn parse_column_name_list(&mut self) -> Result<Vec<String>> {
		self.consume_punct(Punct::OpenParen)?;
		let mut columns = Vec::new();
		loop {
			if self.current().is_punct(Punct::CloseParen) {
				break;
			}
			columns.push(self.identifier("a column name")?);
			if self.consume_if_punct(Punct::Comma).is_none() {
				break;
			}
		}
		self.consume_punct(Punct::CloseParen)?;
		Ok(columns)
	}

	pub(crate) fn parse_on_delete_clause(&mut self) -> Result<OnDeleteAction> {
		if self.consume_if_keyword(Keyword::On).is_none() {
			return Ok(OnDeleteAction::NoAction);
		}
		self.consume_keyword(Keyword::Delete)?;
		self.parse_on_delete_action()
	}

	pub(crate) fn parse_on_delete_action(&mut self) -> Result<OnDeleteAction> {
		if self.consume_if_keyword(Keyword::Cascade).is_some() {
			return Ok(OnDeleteAction::Cascade);
		}
		if self.consume_if_keyword(Keyword::No).is_some() {
			self.consume_keyword(Keyword::Action)?;
			return Ok(OnDeleteAction::NoAction);
		}
		Err(self.expected("'CASCADE' or 'NO'"))
	}

	/// `ROW DELETION POLICY ( OLDER_THAN ( column, INTERVAL n DAY ) )`.
	/// The predicate name is case-insensitive; anything other than
	/// OLDER_THAN is rejected with a verbatim message.
	pub(crate) fn parse_row_deletion_policy(&mut self) -> Result<RowDeletionPolicy> {
		self.consume_keyword(Keyword::Row)?;
		self.consume_keyword(Keyword::Deletion)?;
		self.consume_keyword(Keyword::Policy)?;
		self.consume_punct(Punct::OpenParen)?;

		let predicate = self.current().clone();
		if !predicate.is_identifier_like() {
			return Err(self.expected("'OLDER_THAN'"));
		}
		if !predicate.fragment.text().eq_ignore_ascii_case("OLDER_THAN") {
			return Err(error!(ddl::only_older_than(predicate.fragment.clone())));
		}
		self.advance();

		self.consume_punct(Punct::OpenParen)?;
		let column = self.identifier("a column name")?;
		self.consume_punct(Punct::Comma)?;
		self.consume_keyword(Keyword::Interval)?;

		let days_token = self.current().clone();
		if days_token.kind != TokenKind::Literal(Literal::Integer) {
			return Err(self.expected("an integer"));
		}
		self.advance();
		let older_than_days = days_token.fragment.text().parse::<i64>().map_err(|_| {
			error!(ddl::syntax_error(
				days_token.fragment.clone(),
				format!("Invalid interval: {}", days_token.fragment.text()),
			))
		})?;

		self.consume_keyword(Keyword::Day)?;
		self.consume_punct(Punct::CloseParen)?;
		self.consume_punct(Punct::CloseParen)?;

		Ok(RowDeletionPolicy {
			column,
			older_than_days,
		})
	}
}

#[cfg(test)]
mod tests {
	use keystone_type::StatusCode;

	use crate::{
		FeatureFlags,
		ast::*,
		parse::parse_statement,
	};

	fn parse(source: &str) -> keystone_type::Result<DdlStatement> {
		parse_statement(source, &FeatureFlags::default())
	}

	fn parse_table(source: &str) -> CreateTable {
		match parse(source).unwrap() {
			DdlStatement::CreateTable(create) => create,
			other => panic!("expected CreateTable, got {:?}", other),
		}
	}

	#[test]
	fn test_create_table_with_no_columns() {
		let create = parse_table("CREATE TABLE Users () PRIMARY KEY ()");
		assert_eq!(create.name, "Users");
		assert!(create.columns.is_empty());
		assert!(create.primary_key().is_empty());
	}

	#[test]
	fn test_create_table_without_name() {
		let err = parse("CREATE TABLE () PRIMARY KEY ()").unwrap_err();
		assert_eq!(err.status(), StatusCode::InvalidArgument);
	}

	#[test]
	fn test_create_table_without_primary_key() {
		let err = parse("CREATE TABLE Users (\n  UserId INT64 NOT NULL,\n  Name STRING(MAX)\n)").unwrap_err();
		assert!(err.message.contains("Expecting 'PRIMARY' but found 'EOF'"), "{}", err.message);
	}

	#[test]
	fn test_create_table_with_columns() {
		let create = parse_table("CREATE TABLE Users (UserId INT64 NOT NULL, Name STRING(MAX)) PRIMARY KEY (UserId)");
		assert_eq!(create.columns.len(), 2);
		assert_eq!(create.columns[0].name, "UserId");
		assert_eq!(create.columns[0].ty, Some(ColumnType::Scalar(ScalarType::Int64)));
		assert!(create.columns[0].not_null);
		assert_eq!(create.columns[1].name, "Name");
		assert_eq!(create.columns[1].max_length, Some(ColumnLength::Max));
		assert!(!create.columns[1].not_null);
		assert_eq!(create.primary_key(), &[KeyPart::asc("UserId")]);
	}

	#[test]
	fn test_trailing_comma_in_column_list() {
		let create = parse_table("CREATE TABLE Users (UserId INT64 NOT NULL,) PRIMARY KEY (UserId)");
		assert_eq!(create.columns.len(), 1);
	}

	#[test]
	fn test_two_part_primary_key() {
		let create = parse_table(
			"CREATE TABLE Users (UserId INT64 NOT NULL, Name STRING(MAX) NOT NULL) PRIMARY KEY (UserId, Name)",
		);
		assert_eq!(create.primary_key().len(), 2);
	}

	#[test]
	fn test_interleave_with_cascade() {
		let create = parse_table(
			"CREATE TABLE Albums () PRIMARY KEY (), INTERLEAVE IN PARENT Users ON DELETE CASCADE",
		);
		assert_eq!(create.interleave(), Some(("Users", OnDeleteAction::Cascade)));
	}

	#[test]
	fn test_interleave_defaults_to_no_action() {
		let create = parse_table("CREATE TABLE Albums () PRIMARY KEY (), INTERLEAVE IN PARENT Users");
		assert_eq!(create.interleave(), Some(("Users", OnDeleteAction::NoAction)));
	}

	#[test]
	fn test_interleave_explicit_no_action() {
		let create = parse_table(
			"CREATE TABLE Albums () PRIMARY KEY (), INTERLEAVE IN PARENT Users ON DELETE NO ACTION",
		);
		assert_eq!(create.interleave(), Some(("Users", OnDeleteAction::NoAction)));
	}

	#[test]
	fn test_array_columns() {
		let create = parse_table(
			"CREATE TABLE Users (UserId INT64 NOT NULL, Names ARRAY<STRING(20)>, Flags ARRAY<BOOL> NOT NULL) PRIMARY KEY (UserId)",
		);
		assert_eq!(create.columns[1].ty, Some(ColumnType::Array(ScalarType::String)));
		assert_eq!(create.columns[1].max_length, Some(ColumnLength::Bounded(20)));
		assert_eq!(create.columns[2].ty, Some(ColumnType::Array(ScalarType::Bool)));
		assert!(create.columns[2].not_null);
	}

	#[test]
	fn test_all_scalar_types() {
		let create = parse_table(
			"CREATE TABLE T (A BOOL, B INT64, C FLOAT64, D STRING(1), E BYTES(MAX), F TIMESTAMP, G DATE, H NUMERIC, I JSON) PRIMARY KEY ()",
		);
		let kinds: Vec<_> = create.columns.iter().map(|column| column.ty.unwrap().element()).collect();
		assert_eq!(
			kinds,
			vec![
				ScalarType::Bool,
				ScalarType::Int64,
				ScalarType::Float64,
				ScalarType::String,
				ScalarType::Bytes,
				ScalarType::Timestamp,
				ScalarType::Date,
				ScalarType::Numeric,
				ScalarType::Json,
			]
		);
	}

	#[test]
	fn test_hex_column_length() {
		let create = parse_table("CREATE TABLE Sizes (HexLength STRING(0x42)) PRIMARY KEY ()");
		assert_eq!(create.columns[0].max_length, Some(ColumnLength::Bounded(66)));
	}

	#[test]
	fn test_string_without_length() {
		let err = parse("CREATE TABLE Sizes (Name STRING NOT NULL) PRIMARY KEY (Name)").unwrap_err();
		assert_eq!(err.status(), StatusCode::InvalidArgument);
		assert!(err.message.contains("Expecting '('"), "{}", err.message);
	}

	#[test]
	fn test_length_on_non_string_type() {
		let err = parse("CREATE TABLE Sizes (Age INT64(4)) PRIMARY KEY ()").unwrap_err();
		assert_eq!(err.status(), StatusCode::InvalidArgument);
	}

	#[test]
	fn test_unknown_type() {
		let err = parse("CREATE TABLE T (A WIDGET) PRIMARY KEY ()").unwrap_err();
		assert!(err.message.contains("Encountered 'WIDGET' while parsing: column_type"), "{}", err.message);
	}

	#[test]
	fn test_quoted_identifiers() {
		let create = parse_table("CREATE TABLE `T` (`C` INT64 NOT NULL) PRIMARY KEY (`C`)");
		assert_eq!(create.name, "T");
		assert_eq!(create.columns[0].name, "C");
		assert_eq!(create.primary_key()[0].column, "C");
	}

	#[test]
	fn test_mixed_case_statement() {
		let create = parse_table("cREaTE TABLE Users (UserId iNT64 NOT NULL, Name stRIng(maX)) PRIMARY KEY (UserId)");
		assert_eq!(create.columns[0].ty, Some(ColumnType::Scalar(ScalarType::Int64)));
		assert_eq!(create.columns[1].max_length, Some(ColumnLength::Max));
	}

	#[test]
	fn test_foreign_keys() {
		let create = parse_table(
			"CREATE TABLE T (A INT64, B STRING(MAX), FOREIGN KEY (B) REFERENCES U (Y), CONSTRAINT FK_UXY FOREIGN KEY (B, A) REFERENCES U (X, Y),) PRIMARY KEY (A)",
		);
		assert_eq!(create.constraints.len(), 3);
		let TableConstraint::ForeignKey(unnamed) = &create.constraints[0] else {
			panic!("expected foreign key");
		};
		assert_eq!(unnamed.constraint_name, None);
		assert_eq!(unnamed.referencing_columns, vec!["B"]);
		assert_eq!(unnamed.referenced_table, "U");
		assert_eq!(unnamed.referenced_columns, vec!["Y"]);
		let TableConstraint::ForeignKey(named) = &create.constraints[1] else {
			panic!("expected foreign key");
		};
		assert_eq!(named.constraint_name.as_deref(), Some("FK_UXY"));
		assert_eq!(named.referencing_columns, vec!["B", "A"]);
	}

	#[test]
	fn test_check_constraints() {
		let create = parse_table(
			"CREATE TABLE T (Id INT64, Value INT64, CHECK(Value > 0), CONSTRAINT value_gt_zero CHECK(Value > 0), CHECK(Value > 1),) PRIMARY KEY(Id)",
		);
		let checks: Vec<_> = create
			.constraints
			.iter()
			.filter_map(|constraint| match constraint {
				TableConstraint::Check(check) => Some(check),
				_ => None,
			})
			.collect();
		assert_eq!(checks.len(), 3);
		assert_eq!(checks[0].sql_text, "Value > 0");
		assert_eq!(checks[0].constraint_name, None);
		assert_eq!(checks[1].constraint_name.as_deref(), Some("value_gt_zero"));
		assert_eq!(checks[2].sql_text, "Value > 1");
	}

	#[test]
	fn test_check_constraint_gate() {
		let mut flags = FeatureFlags::default();
		flags.enable_check_constraint = false;
		let err = parse_statement("CREATE TABLE T (Id INT64, CHECK(Id > 0)) PRIMARY KEY(Id)", &flags).unwrap_err();
		assert_eq!(err.status(), StatusCode::Unimplemented);
		assert_eq!(err.message, "Check Constraint is not implemented.");
	}

	#[test]
	fn test_generated_column() {
		let create = parse_table("CREATE TABLE T (K INT64 NOT NULL, G INT64 AS (K + 1) STORED) PRIMARY KEY(K)");
		assert_eq!(create.columns[1].expression.as_deref(), Some("(K + 1)"));
		assert!(create.columns[1].is_stored_generated);
		assert!(!create.columns[1].has_default);
	}

	#[test]
	fn test_generated_column_gate() {
		let mut flags = FeatureFlags::default();
		flags.enable_stored_generated_columns = false;
		let err = parse_statement(
			"CREATE TABLE T (K INT64 NOT NULL, G INT64 AS (K + 1) STORED) PRIMARY KEY(K)",
			&flags,
		)
		.unwrap_err();
		assert_eq!(err.status(), StatusCode::Unimplemented);
		assert_eq!(err.message, "Generated columns are not enabled.");
	}

	#[test]
	fn test_generated_column_without_stored() {
		let err = parse("CREATE TABLE T (K INT64, G INT64 AS (K + 1)) PRIMARY KEY(K)").unwrap_err();
		assert_eq!(err.status(), StatusCode::Unimplemented);
		assert_eq!(err.message, "Generated column `G` without the STORED attribute is not supported.");
	}

	#[test]
	fn test_default_column() {
		let create = parse_table("CREATE TABLE T (K INT64 NOT NULL DEFAULT (1), D INT64 DEFAULT (10)) PRIMARY KEY (K)");
		assert_eq!(create.columns[0].expression.as_deref(), Some("(1)"));
		assert!(create.columns[0].has_default);
		assert!(create.columns[0].not_null);
		assert_eq!(create.columns[1].expression.as_deref(), Some("(10)"));
	}

	#[test]
	fn test_default_column_gate() {
		let mut flags = FeatureFlags::default();
		flags.enable_column_default_values = false;
		let err = parse_statement("CREATE TABLE T (K INT64 NOT NULL DEFAULT (1)) PRIMARY KEY (K)", &flags)
			.unwrap_err();
		assert_eq!(err.status(), StatusCode::Unimplemented);
		assert_eq!(err.message, "Column DEFAULT values are not enabled.");
	}

	#[test]
	fn test_default_combined_with_generated_is_a_syntax_error() {
		for source in [
			"CREATE TABLE T (G INT64 DEFAULT (1) AS (1) STORED) PRIMARY KEY ()",
			"CREATE TABLE T (G INT64 AS (1) STORED DEFAULT (1)) PRIMARY KEY ()",
		] {
			let err = parse_statement(source, &FeatureFlags::none()).unwrap_err();
			assert_eq!(err.status(), StatusCode::InvalidArgument, "{}", source);
			assert!(err.message.contains("Syntax error"), "{}", err.message);
		}
	}

	#[test]
	fn test_options_bool() {
		let create = parse_table(
			"CREATE TABLE Users (UpdateTs TIMESTAMP OPTIONS (allow_commit_timestamp= true)) PRIMARY KEY ()",
		);
		assert_eq!(
			create.columns[0].options,
			vec![ColumnOption {
				name: "allow_commit_timestamp".to_string(),
				value: OptionValue::Bool(true),
			}]
		);
	}

	#[test]
	fn test_options_null() {
		let create = parse_table(
			"CREATE TABLE Users (UpdateTs TIMESTAMP OPTIONS (allow_commit_timestamp= null)) PRIMARY KEY ()",
		);
		assert_eq!(create.columns[0].options[0].value, OptionValue::Null);
	}

	#[test]
	fn test_options_duplicate_keys_preserved() {
		let create = parse_table(
			"CREATE TABLE Users (UpdateTs TIMESTAMP OPTIONS (allow_commit_timestamp= true, allow_commit_timestamp= false)) PRIMARY KEY ()",
		);
		assert_eq!(create.columns[0].options.len(), 2);
		assert_eq!(create.columns[0].options[0].value, OptionValue::Bool(true));
		assert_eq!(create.columns[0].options[1].value, OptionValue::Bool(false));
	}

	#[test]
	fn test_options_unknown_key() {
		let err = parse("CREATE TABLE Users (UpdateTs TIMESTAMP OPTIONS (bogus_option= true)) PRIMARY KEY ()")
			.unwrap_err();
		assert_eq!(err.status(), StatusCode::InvalidArgument);
		let err = parse("CREATE TABLE Users (UpdateTs TIMESTAMP OPTIONS (bogus_option= null)) PRIMARY KEY ()")
			.unwrap_err();
		assert_eq!(err.status(), StatusCode::InvalidArgument);
	}

	#[test]
	fn test_options_invalid_value() {
		let err = parse("CREATE TABLE Users (UpdateTs TIMESTAMP OPTIONS (allow_commit_timestamp= bogus)) PRIMARY KEY ()")
			.unwrap_err();
		assert!(err.message.contains("Encountered 'bogus' while parsing: option_key_val"), "{}", err.message);
	}

	#[test]
	fn test_options_trailing_comma_rejected() {
		let err = parse("CREATE TABLE Users (UpdateTs TIMESTAMP OPTIONS (allow_commit_timestamp= true,)) PRIMARY KEY ()")
			.unwrap_err();
		assert_eq!(err.status(), StatusCode::InvalidArgument);
	}

	#[test]
	fn test_row_deletion_policy() {
		let create = parse_table(
			"CREATE TABLE T (Key INT64, CreatedAt TIMESTAMP,) PRIMARY KEY (Key), ROW DELETION POLICY (OLDER_THAN(CreatedAt, INTERVAL 7 DAY))",
		);
		assert_eq!(
			create.row_deletion_policy,
			Some(RowDeletionPolicy {
				column: "CreatedAt".to_string(),
				older_than_days: 7,
			})
		);
	}

	#[test]
	fn test_row_deletion_policy_case_insensitive_predicate() {
		let create = parse_table(
			"CREATE TABLE T (Key INT64, CreatedAt TIMESTAMP) PRIMARY KEY (Key), ROW DELETION POLICY (Older_thaN(CreatedAt, INTERVAL 7 DAY))",
		);
		assert_eq!(create.row_deletion_policy.unwrap().older_than_days, 7);
	}

	#[test]
	fn test_row_deletion_policy_wrong_predicate() {
		let err = parse(
			"CREATE TABLE T (K INT64, CreatedAt TIMESTAMP) PRIMARY KEY (K), ROW DELETION POLICY (YOUNGER_THAN(CreatedAt, INTERVAL 7 DAY))",
		)
		.unwrap_err();
		assert_eq!(err.status(), StatusCode::InvalidArgument);
		assert_eq!(err.message, "Only OLDER_THAN is supported.");
	}

	#[test]
	fn test_row_deletion_policy_after_interleave() {
		let create = parse_table(
			"CREATE TABLE T (K INT64, CreatedAt TIMESTAMP) PRIMARY KEY (K), INTERLEAVE IN PARENT U, ROW DELETION POLICY (OLDER_THAN(CreatedAt, INTERVAL 30 DAY))",
		);
		assert!(create.interleave().is_some());
		assert_eq!(create.row_deletion_policy.unwrap().older_than_days, 30);
	}

	#[test]
	fn test_desc_key_part() {
		let create = parse_table("CREATE TABLE T (A INT64, B INT64) PRIMARY KEY (A, B DESC)");
		assert_eq!(create.primary_key()[0].order, SortOrder::Asc);
		assert_eq!(create.primary_key()[1].order, SortOrder::Desc);
	}

	#[test]
	fn test_columns_named_like_contextual_keywords() {
		let create = parse_table("CREATE TABLE T (KEY INT64, DAY STRING(MAX), CHECK BOOL) PRIMARY KEY (KEY)");
		assert_eq!(create.columns[0].name, "KEY");
		assert_eq!(create.columns[1].name, "DAY");
		assert_eq!(create.columns[2].name, "CHECK");
	}

	#[test]
	fn test_reserved_word_as_constraint_name() {
		let err = parse("CREATE TABLE T (Id INT64, CONSTRAINT ALL CHECK(Id > 0)) PRIMARY KEY(Id)").unwrap_err();
		assert_eq!(err.status(), StatusCode::InvalidArgument);
	}
}
