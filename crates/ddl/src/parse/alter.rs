// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::{Result, diagnostic::ddl, error};

use crate::{
	ast::{AlterTable, AlterTableAction, ColumnDef, DdlStatement},
	parse::Parser,
	tokenize::{Keyword, TokenKind},
};

impl<'a> Parser<'a> {
	pub(crate) fn parse_alter(&mut self) -> Result<DdlStatement> {
		self.consume_keyword(Keyword::Alter)?;
		self.consume_keyword(Keyword::Table)?;
		let table = self.identifier("a table name")?;

		let action = match self.current().kind {
			TokenKind::Keyword(Keyword::Add) => {
				self.advance();
				self.parse_add_action()?
			}
			TokenKind::Keyword(Keyword::Drop) => {
				self.advance();
				self.parse_drop_action()?
			}
			TokenKind::Keyword(Keyword::Alter) => {
				self.advance();
				self.parse_alter_column_action()?
			}
			TokenKind::Keyword(Keyword::Set) => {
				self.advance();
				self.consume_keyword(Keyword::On)?;
				self.consume_keyword(Keyword::Delete)?;
				AlterTableAction::AlterInterleaveOnDelete(self.parse_on_delete_action()?)
			}
			TokenKind::Keyword(Keyword::Replace) => {
				self.advance();
				AlterTableAction::ReplaceRowDeletionPolicy(self.parse_row_deletion_policy()?)
			}
			_ => return Err(self.expected("'ADD', 'DROP', 'ALTER', 'SET' or 'REPLACE'")),
		};

		Ok(DdlStatement::AlterTable(AlterTable {
			table,
			action,
		}))
	}

	fn parse_add_action(&mut self) -> Result<AlterTableAction> {
		match self.current().kind {
			TokenKind::Keyword(Keyword::Column) => {
				self.advance();
				Ok(AlterTableAction::AddColumn(self.parse_column_def()?))
			}
			TokenKind::Keyword(Keyword::Constraint)
			| TokenKind::Keyword(Keyword::Foreign)
			| TokenKind::Keyword(Keyword::Check) => {
				Ok(AlterTableAction::AddConstraint(self.parse_table_constraint()?))
			}
			TokenKind::Keyword(Keyword::Row) => {
				Ok(AlterTableAction::AddRowDeletionPolicy(self.parse_row_deletion_policy()?))
			}
			_ => Err(self.expected("'COLUMN', 'CONSTRAINT', 'FOREIGN', 'CHECK' or 'ROW'")),
		}
	}

	fn parse_drop_action(&mut self) -> Result<AlterTableAction> {
		match self.current().kind {
			TokenKind::Keyword(Keyword::Column) => {
				self.advance();
				Ok(AlterTableAction::DropColumn(self.identifier("a column name")?))
			}
			TokenKind::Keyword(Keyword::Constraint) => {
				self.advance();
				Ok(AlterTableAction::DropConstraint(self.identifier("a constraint name")?))
			}
			TokenKind::Keyword(Keyword::Row) => {
				self.advance();
				self.consume_keyword(Keyword::Deletion)?;
				self.consume_keyword(Keyword::Policy)?;
				// A parenthesized policy body after DROP is the one
				// alter shape that must not carry one; the caller's
				// EOF check reports it.
				Ok(AlterTableAction::DropRowDeletionPolicy)
			}
			_ => Err(self.expected("'COLUMN', 'CONSTRAINT' or 'ROW'")),
		}
	}

	/// `ALTER COLUMN <name>` followed by either a full column
	/// redefinition or one of the SET / DROP DEFAULT and SET OPTIONS
	/// shapes that restate nothing else.
	fn parse_alter_column_action(&mut self) -> Result<AlterTableAction> {
		if self.current().is_keyword(Keyword::Constraint) {
			return Err(error!(ddl::statement_not_supported("ALTER CONSTRAINT is not supported")));
		}
		self.consume_keyword(Keyword::Column)?;
		let column = self.identifier("a column name")?;

		match self.current().kind {
			TokenKind::Keyword(Keyword::Set) => {
				self.advance();
				match self.current().kind {
					TokenKind::Keyword(Keyword::Options) => {
						let options = self.parse_options_list()?;
						Ok(AlterTableAction::SetColumnOptions {
							column,
							options,
						})
					}
					TokenKind::Keyword(Keyword::Default) => {
						self.advance();
						let expression = self.capture_expression(true)?;
						if !self.flags.enable_column_default_values {
							return Err(error!(ddl::column_default_values_disabled()));
						}
						Ok(AlterTableAction::SetColumnDefault {
							column,
							expression,
						})
					}
					_ => Err(self.expected("'OPTIONS' or 'DEFAULT'")),
				}
			}
			TokenKind::Keyword(Keyword::Drop) => {
				self.advance();
				self.consume_keyword(Keyword::Default)?;
				Ok(AlterTableAction::DropColumnDefault {
					column,
				})
			}
			_ => {
				let mut def = ColumnDef::new(column);
				self.parse_column_type(&mut def)?;
				self.parse_not_null(&mut def)?;
				self.parse_generated_or_default(&mut def)?;
				if self.current().is_keyword(Keyword::Options) {
					def.options = self.parse_options_list()?;
				}
				self.check_column_gates(&def)?;
				Ok(AlterTableAction::AlterColumn(def))
			}
		}
	}
}
