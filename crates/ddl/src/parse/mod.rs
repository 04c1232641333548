// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

pub mod alter;
pub mod create;
pub mod create_index;
pub mod create_table;
pub mod drop;

use keystone_type::{Result, diagnostic::ddl, error};
use tracing::instrument;

use crate::{
	FeatureFlags,
	ast::DdlStatement,
	tokenize::{Keyword, Punct, Token, TokenKind, tokenize},
};

/// Parse a single DDL statement into its schema-change description.
#[instrument(name = "ddl::parse", level = "trace", skip(source, flags))]
pub fn parse_statement(source: &str, flags: &FeatureFlags) -> Result<DdlStatement> {
	let tokens = tokenize(source)?;
	let mut parser = Parser::new(source, tokens, flags);
	let statement = parser.parse_statement()?;
	parser.expect_eof()?;
	Ok(statement)
}

/// Extract the database name from a `CREATE DATABASE` statement. Used by
/// the create-database admin path, which has no schema side to it.
#[instrument(name = "ddl::parse_create_database", level = "trace", skip(source))]
pub fn parse_create_database(source: &str) -> Result<String> {
	let tokens = tokenize(source)?;
	let flags = FeatureFlags::default();
	let mut parser = Parser::new(source, tokens, &flags);
	parser.consume_keyword(Keyword::Create)?;
	parser.consume_keyword(Keyword::Database)?;
	let name = parser.identifier("a database name")?;
	parser.expect_eof()?;
	Ok(name)
}

pub(crate) struct Parser<'a> {
	source: &'a str,
	tokens: Vec<Token>,
	position: usize,
	pub(crate) flags: &'a FeatureFlags,
}

impl<'a> Parser<'a> {
	pub(crate) fn new(source: &'a str, tokens: Vec<Token>, flags: &'a FeatureFlags) -> Self {
		debug_assert!(matches!(tokens.last().map(|token| token.kind), Some(TokenKind::Eof)));
		Self {
			source,
			tokens,
			position: 0,
			flags,
		}
	}

	pub(crate) fn parse_statement(&mut self) -> Result<DdlStatement> {
		let current = self.current();
		match current.kind {
			TokenKind::Keyword(Keyword::Create) => self.parse_create(),
			TokenKind::Keyword(Keyword::Alter) => self.parse_alter(),
			TokenKind::Keyword(Keyword::Drop) => self.parse_drop(),
			TokenKind::Keyword(Keyword::Analyze) => {
				self.advance();
				Ok(DdlStatement::Analyze)
			}
			_ => Err(self.expected("'CREATE', 'ALTER', 'DROP' or 'ANALYZE'")),
		}
	}

	// Token plumbing. The stream always ends with an Eof sentinel, so
	// `current` is total and `advance` saturates there.

	pub(crate) fn current(&self) -> &Token {
		&self.tokens[self.position]
	}

	/// Look ahead n tokens, saturating at the Eof sentinel.
	pub(crate) fn peek_token(&self, n: usize) -> &Token {
		&self.tokens[(self.position + n).min(self.tokens.len() - 1)]
	}

	pub(crate) fn advance(&mut self) -> Token {
		let token = self.tokens[self.position].clone();
		if self.position + 1 < self.tokens.len() {
			self.position += 1;
		}
		token
	}

	pub(crate) fn is_eof(&self) -> bool {
		self.current().is_eof()
	}

	pub(crate) fn expect_eof(&mut self) -> Result<()> {
		if self.is_eof() {
			Ok(())
		} else {
			Err(self.expected("'EOF'"))
		}
	}

	/// `Expecting X but found Y` at the current token.
	pub(crate) fn expected(&self, what: &str) -> keystone_type::Error {
		let current = self.current();
		error!(ddl::expecting(current.fragment.clone(), what, current.display_text()))
	}

	pub(crate) fn consume_keyword(&mut self, keyword: Keyword) -> Result<Token> {
		if self.current().is_keyword(keyword) {
			Ok(self.advance())
		} else {
			Err(self.expected(&format!("'{}'", keyword.as_str())))
		}
	}

	pub(crate) fn consume_if_keyword(&mut self, keyword: Keyword) -> Option<Token> {
		if self.current().is_keyword(keyword) {
			Some(self.advance())
		} else {
			None
		}
	}

	pub(crate) fn consume_punct(&mut self, punct: Punct) -> Result<Token> {
		if self.current().is_punct(punct) {
			Ok(self.advance())
		} else {
			Err(self.expected(&format!("'{}'", punct.as_str())))
		}
	}

	pub(crate) fn consume_if_punct(&mut self, punct: Punct) -> Option<Token> {
		if self.current().is_punct(punct) {
			Some(self.advance())
		} else {
			None
		}
	}

	/// Consume a name position. Unquoted non-keywords, quoted
	/// identifiers and contextual (non-reserved) keywords all qualify;
	/// reserved words and anything else do not.
	pub(crate) fn identifier(&mut self, what: &str) -> Result<String> {
		if self.current().is_identifier_like() {
			let token = self.advance();
			Ok(token.fragment.text().to_string())
		} else {
			Err(self.expected(what))
		}
	}

	/// Capture the verbatim source text of a parenthesized expression by
	/// walking the token stream with a depth counter. Parentheses inside
	/// string literals are already absorbed into their tokens, so only
	/// structural parens count. `include_parens` keeps the outer pair
	/// (generated columns and defaults) or drops it (check constraints).
	pub(crate) fn capture_expression(&mut self, include_parens: bool) -> Result<String> {
		let open = self.consume_punct(Punct::OpenParen)?;

		let mut depth = 1usize;
		let close = loop {
			let current = self.current();
			match current.kind {
				TokenKind::Eof => return Err(self.expected("')'")),
				TokenKind::Punct(Punct::OpenParen) => depth += 1,
				TokenKind::Punct(Punct::CloseParen) => {
					depth -= 1;
					if depth == 0 {
						break self.advance();
					}
				}
				_ => {}
			}
			self.advance();
		};

		let text = if include_parens {
			&self.source[open.fragment.offset()..close.fragment.offset() + 1]
		} else {
			&self.source[open.fragment.offset() + 1..close.fragment.offset()]
		};
		Ok(text.to_string())
	}
}
