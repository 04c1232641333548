// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

pub mod cursor;
pub mod identifier;
pub mod keyword;
pub mod literal;
pub mod punct;
pub mod token;

use keystone_type::{Result, diagnostic::ddl, error};
use tracing::instrument;

use cursor::Cursor;
use identifier::{scan_identifier, scan_quoted_identifier};
use keyword::scan_keyword;
use literal::{at_string_literal, scan_number, scan_string};
use punct::scan_punct;

pub use keyword::Keyword;
pub use punct::Punct;
pub use token::{Literal, LiteralValue, Token, TokenKind};

/// Tokenize one DDL statement. The returned stream always ends with a
/// synthetic `Eof` token carrying the end-of-input position so the parser
/// can report `Expecting X but found 'EOF'` with a line and column.
#[instrument(name = "ddl::tokenize", level = "trace", skip(input))]
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
	let mut cursor = Cursor::new(input);
	let mut tokens = Vec::with_capacity((input.len() / 6).clamp(8, 2048));

	loop {
		cursor.skip_whitespace();
		if cursor.is_eof() {
			break;
		}

		// Character-based dispatch, the first matching scanner wins.
		let token = match cursor.peek() {
			Some(ch) => match ch {
				'`' => Some(scan_quoted_identifier(&mut cursor)?),

				'\'' | '"' => Some(scan_string(&mut cursor)?),

				'0'..='9' => scan_number(&mut cursor),

				// A dot starts a literal only when a digit follows
				'.' => {
					if cursor.peek_ahead(1).map_or(false, |next| next.is_ascii_digit()) {
						scan_number(&mut cursor)
					} else {
						scan_punct(&mut cursor)
					}
				}

				// Smart quotes are the common paste accident;
				// rejected like every other non-ASCII character.
				'\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' => {
					return Err(error!(ddl::unexpected_character(cursor.fragment_here(), ch)));
				}

				'a'..='z' | 'A'..='Z' | '_' => {
					if at_string_literal(&cursor) {
						Some(scan_string(&mut cursor)?)
					} else {
						scan_keyword(&mut cursor).or_else(|| scan_identifier(&mut cursor))
					}
				}

				_ if !ch.is_ascii() => {
					return Err(error!(ddl::unexpected_character(cursor.fragment_here(), ch)));
				}

				_ => scan_punct(&mut cursor),
			},
			None => None,
		};

		match token {
			Some(token) => tokens.push(token),
			None => {
				let ch = cursor.peek().unwrap_or('\0');
				return Err(error!(ddl::unexpected_character(cursor.fragment_here(), ch)));
			}
		}
	}

	tokens.push(Token::new(TokenKind::Eof, cursor.fragment_here()));
	Ok(tokens)
}
