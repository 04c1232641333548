// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::Result;

use crate::{
	ast::{CreateDatabase, DdlStatement},
	parse::Parser,
	tokenize::{Keyword, TokenKind},
};

impl<'a> Parser<'a> {
	pub(crate) fn parse_create(&mut self) -> Result<DdlStatement> {
		self.consume_keyword(Keyword::Create)?;

		match self.current().kind {
			TokenKind::Keyword(Keyword::Database) => {
				self.advance();
				let name = self.identifier("a database name")?;
				Ok(DdlStatement::CreateDatabase(CreateDatabase {
					name,
				}))
			}
			TokenKind::Keyword(Keyword::Table) => {
				self.advance();
				Ok(DdlStatement::CreateTable(self.parse_create_table()?))
			}
			TokenKind::Keyword(Keyword::Unique)
			| TokenKind::Keyword(Keyword::NullFiltered)
			| TokenKind::Keyword(Keyword::Index) => Ok(DdlStatement::CreateIndex(self.parse_create_index()?)),
			_ => Err(self.expected("'DATABASE', 'TABLE' or 'INDEX'")),
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::{FeatureFlags, ast::DdlStatement, parse::parse_statement};

	#[test]
	fn test_create_database_statement() {
		let statement = parse_statement("CREATE DATABASE mydb", &FeatureFlags::default()).unwrap();
		let DdlStatement::CreateDatabase(create) = statement else {
			panic!("expected CreateDatabase");
		};
		assert_eq!(create.name, "mydb");
	}

	#[test]
	fn test_create_requires_a_known_object() {
		let err = parse_statement("CREATE VIEW V", &FeatureFlags::default()).unwrap_err();
		assert!(err.message.contains("Expecting 'DATABASE', 'TABLE' or 'INDEX'"), "{}", err.message);
	}
}
