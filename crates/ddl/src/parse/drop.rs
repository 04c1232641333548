// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::Result;

use crate::{
	ast::{DdlStatement, DropIndex, DropTable},
	parse::Parser,
	tokenize::{Keyword, TokenKind},
};

impl<'a> Parser<'a> {
	pub(crate) fn parse_drop(&mut self) -> Result<DdlStatement> {
		self.consume_keyword(Keyword::Drop)?;

		match self.current().kind {
			TokenKind::Keyword(Keyword::Table) => {
				self.advance();
				Ok(DdlStatement::DropTable(DropTable {
					name: self.identifier("a table name")?,
				}))
			}
			TokenKind::Keyword(Keyword::Index) => {
				self.advance();
				Ok(DdlStatement::DropIndex(DropIndex {
					name: self.identifier("an index name")?,
				}))
			}
			_ => Err(self.expected("'TABLE' or 'INDEX'")),
		}
	}
}
