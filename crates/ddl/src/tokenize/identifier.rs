// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::{Result, diagnostic::ddl, error};

use super::{
	cursor::Cursor,
	token::{Token, TokenKind},
};

pub fn is_identifier_start(ch: char) -> bool {
	ch.is_ascii_alphabetic() || ch == '_'
}

pub fn is_identifier_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || ch == '_'
}

/// Scan an unquoted identifier.
pub fn scan_identifier(cursor: &mut Cursor) -> Option<Token> {
	if !cursor.peek().map_or(false, is_identifier_start) {
		return None;
	}

	let mark = cursor.mark();
	cursor.consume_while(is_identifier_char);
	Some(Token::new(TokenKind::Identifier, cursor.fragment_from(mark)))
}

/// Scan a backtick-quoted identifier. The quoted form admits hyphens,
/// spaces and reserved words; the backticks are stripped from the token
/// value but kept in the raw fragment.
pub fn scan_quoted_identifier(cursor: &mut Cursor) -> Result<Token> {
	let mark = cursor.mark();
	cursor.consume(); // opening backtick

	let content_start = cursor.pos();
	while let Some(ch) = cursor.peek() {
		if ch == '`' {
			let content_end = cursor.pos();
			cursor.consume(); // closing backtick
			let fragment = cursor.fragment_between(mark, content_start, content_end);
			return Ok(Token::new(TokenKind::QuotedIdentifier, fragment));
		}
		if !ch.is_ascii() {
			return Err(error!(ddl::unexpected_character(cursor.fragment_from(mark), ch)));
		}
		cursor.consume();
	}

	Err(error!(ddl::unclosed_quoted_identifier(cursor.fragment_from(mark))))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tokenize::tokenize;

	#[test]
	fn test_identifier() {
		let tokens = tokenize("UserId").unwrap();
		assert_eq!(tokens.len(), 2);
		assert_eq!(tokens[0].kind, TokenKind::Identifier);
		assert_eq!(tokens[0].fragment.text(), "UserId");
	}

	#[test]
	fn test_identifier_case_preserved() {
		let tokens = tokenize("MyTable my_table").unwrap();
		assert_eq!(tokens[0].fragment.text(), "MyTable");
		assert_eq!(tokens[1].fragment.text(), "my_table");
	}

	#[test]
	fn test_quoted_identifier() {
		let tokens = tokenize("`mytestdb-1`").unwrap();
		assert_eq!(tokens[0].kind, TokenKind::QuotedIdentifier);
		assert_eq!(tokens[0].fragment.text(), "mytestdb-1");
	}

	#[test]
	fn test_quoted_identifier_reserved_word() {
		let tokens = tokenize("`TABLE`").unwrap();
		assert_eq!(tokens[0].kind, TokenKind::QuotedIdentifier);
		assert_eq!(tokens[0].fragment.text(), "TABLE");
	}

	#[test]
	fn test_quoted_identifier_with_spaces() {
		let tokens = tokenize("`my table`").unwrap();
		assert_eq!(tokens[0].fragment.text(), "my table");
	}

	#[test]
	fn test_quoted_identifier_unterminated() {
		let result = tokenize("`unclosed");
		assert!(result.is_err());
	}
}
