// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::Fragment;

use super::{keyword::Keyword, punct::Punct};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Literal {
	Integer,
	Float,
	Text,
	Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
	/// Unquoted word that is not a keyword.
	Identifier,
	/// Backtick-quoted identifier. Never satisfies a keyword position.
	QuotedIdentifier,
	Keyword(Keyword),
	Literal(Literal),
	Punct(Punct),
	/// Synthetic end-of-input token carrying the final source position.
	Eof,
}

/// Decoded payload of a string or bytes literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
	Text(String),
	Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub kind: TokenKind,
	/// Raw source text of the token, with position.
	pub fragment: Fragment,
	/// Decoded value for string and bytes literals.
	pub value: Option<LiteralValue>,
}

impl Token {
	pub fn new(kind: TokenKind, fragment: Fragment) -> Self {
		Self {
			kind,
			fragment,
			value: None,
		}
	}

	/// The token text as the user wrote it, or `EOF` at end of input.
	/// This is the form used in `Expecting X but found Y` messages.
	pub fn display_text(&self) -> &str {
		match self.kind {
			TokenKind::Eof => "EOF",
			_ => self.fragment.text(),
		}
	}

	/// Decoded text for string literals, raw text otherwise.
	pub fn value(&self) -> &str {
		match &self.value {
			Some(LiteralValue::Text(text)) => text,
			_ => self.fragment.text(),
		}
	}

	pub fn is_keyword(&self, keyword: Keyword) -> bool {
		self.kind == TokenKind::Keyword(keyword)
	}

	pub fn is_punct(&self, punct: Punct) -> bool {
		self.kind == TokenKind::Punct(punct)
	}

	pub fn is_eof(&self) -> bool {
		self.kind == TokenKind::Eof
	}

	/// True when the token can serve as a user identifier: an unquoted
	/// non-keyword word, a quoted identifier, or a non-reserved keyword
	/// used contextually (`COLUMN`, `KEY`, `DAY`, ...).
	pub fn is_identifier_like(&self) -> bool {
		match self.kind {
			TokenKind::Identifier | TokenKind::QuotedIdentifier => true,
			TokenKind::Keyword(keyword) => !keyword.is_reserved(),
			_ => false,
		}
	}
}
