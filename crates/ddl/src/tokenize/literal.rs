// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::{Result, diagnostic::ddl, error};

use super::{
	cursor::Cursor,
	token::{Literal, LiteralValue, Token, TokenKind},
};

/// Scan an integer or floating literal. Decimal, `0x` hex, optional
/// fraction and exponent. Leading zeros are legal and preserved.
pub fn scan_number(cursor: &mut Cursor) -> Option<Token> {
	let first = cursor.peek()?;
	let starts_with_dot = first == '.';
	if !first.is_ascii_digit() && !(starts_with_dot && cursor.peek_ahead(1).map_or(false, |ch| ch.is_ascii_digit())) {
		return None;
	}

	let mark = cursor.mark();

	// Hex integers have no fraction or exponent.
	if first == '0'
		&& matches!(cursor.peek_ahead(1), Some('x') | Some('X'))
		&& cursor.peek_ahead(2).map_or(false, |ch| ch.is_ascii_hexdigit())
	{
		cursor.consume();
		cursor.consume();
		cursor.consume_while(|ch| ch.is_ascii_hexdigit());
		return Some(Token::new(TokenKind::Literal(Literal::Integer), cursor.fragment_from(mark)));
	}

	let mut is_float = false;

	cursor.consume_while(|ch| ch.is_ascii_digit());
	// A dot not followed by a digit ends the number unless the literal
	// began with one.
	if cursor.peek() == Some('.') && (starts_with_dot || cursor.peek_ahead(1).map_or(false, |ch| ch.is_ascii_digit())) {
		is_float = true;
		cursor.consume();
		cursor.consume_while(|ch| ch.is_ascii_digit());
	}
	if matches!(cursor.peek(), Some('e') | Some('E')) {
		let exponent_digits = match cursor.peek_ahead(1) {
			Some('+') | Some('-') => cursor.peek_ahead(2).map_or(false, |ch| ch.is_ascii_digit()),
			Some(ch) => ch.is_ascii_digit(),
			None => false,
		};
		if exponent_digits {
			is_float = true;
			cursor.consume();
			if matches!(cursor.peek(), Some('+') | Some('-')) {
				cursor.consume();
			}
			cursor.consume_while(|ch| ch.is_ascii_digit());
		}
	}

	let literal = if is_float {
		Literal::Float
	} else {
		Literal::Integer
	};
	Some(Token::new(TokenKind::Literal(literal), cursor.fragment_from(mark)))
}

/// Whether the cursor sits at a string or bytes literal, including the
/// optional `r` / `b` / `rb` / `br` prefix.
pub fn at_string_literal(cursor: &Cursor) -> bool {
	prefix_shape(cursor).is_some()
}

fn is_quote(ch: char) -> bool {
	ch == '\'' || ch == '"'
}

fn is_prefix_char(ch: char) -> bool {
	matches!(ch, 'r' | 'R' | 'b' | 'B')
}

/// Returns (prefix_len, raw, bytes) when a string literal starts here.
fn prefix_shape(cursor: &Cursor) -> Option<(usize, bool, bool)> {
	let first = cursor.peek()?;
	if is_quote(first) {
		return Some((0, false, false));
	}
	if !is_prefix_char(first) {
		return None;
	}
	match cursor.peek_ahead(1) {
		Some(second) if is_quote(second) => {
			let raw = matches!(first, 'r' | 'R');
			Some((1, raw, !raw))
		}
		Some(second)
			if is_prefix_char(second)
				&& first.to_ascii_lowercase() != second.to_ascii_lowercase()
				&& cursor.peek_ahead(2).map_or(false, is_quote) =>
		{
			Some((2, true, true))
		}
		_ => None,
	}
}

/// Scan a string or bytes literal. The fragment keeps the raw source
/// (prefix and quotes included); the token value carries the decoded
/// content, with escapes left intact under the `r` prefix.
pub fn scan_string(cursor: &mut Cursor) -> Result<Token> {
	let Some((prefix_len, raw, bytes)) = prefix_shape(cursor) else {
		return Err(error!(ddl::unexpected_character(cursor.fragment_here(), cursor.peek().unwrap_or('\0'))));
	};

	let mark = cursor.mark();
	for _ in 0..prefix_len {
		cursor.consume();
	}

	let quote = match cursor.peek() {
		Some(ch) => ch,
		None => return Err(error!(ddl::unclosed_string(cursor.fragment_from(mark)))),
	};
	let triple_delim = match quote {
		'\'' => "'''",
		_ => "\"\"\"",
	};
	let triple = cursor.peek_str(3) == triple_delim;
	if triple {
		cursor.consume_str(triple_delim);
	} else {
		cursor.consume();
	}

	let mut buf: Vec<u8> = Vec::new();
	loop {
		if triple && cursor.peek_str(3) == triple_delim {
			cursor.consume_str(triple_delim);
			break;
		}
		let Some(ch) = cursor.peek() else {
			return Err(if triple {
				error!(ddl::unclosed_triple_quote(cursor.fragment_from(mark)))
			} else {
				error!(ddl::unclosed_string(cursor.fragment_from(mark)))
			});
		};
		if !triple {
			if ch == quote {
				cursor.consume();
				break;
			}
			if ch == '\n' {
				return Err(error!(ddl::unclosed_string(cursor.fragment_from(mark))));
			}
		}
		if ch == '\\' {
			scan_escape(cursor, mark, raw, bytes, &mut buf)?;
			continue;
		}
		cursor.consume();
		let mut utf8 = [0u8; 4];
		buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
	}

	let fragment = cursor.fragment_from(mark);
	let (kind, value) = if bytes {
		(Literal::Bytes, LiteralValue::Bytes(buf))
	} else {
		match String::from_utf8(buf) {
			Ok(text) => (Literal::Text, LiteralValue::Text(text)),
			Err(_) => return Err(error!(ddl::invalid_utf8_string(fragment))),
		}
	};

	let mut token = Token::new(TokenKind::Literal(kind), fragment);
	token.value = Some(value);
	Ok(token)
}

fn scan_escape(
	cursor: &mut Cursor,
	literal_mark: super::cursor::Mark,
	raw: bool,
	bytes: bool,
	buf: &mut Vec<u8>,
) -> Result<()> {
	let escape_mark = cursor.mark();
	cursor.consume(); // backslash

	let Some(ch) = cursor.consume() else {
		return Err(error!(ddl::unclosed_string(cursor.fragment_from(literal_mark))));
	};

	// Under the raw prefix escapes are preserved verbatim; the pair is
	// still consumed as a unit so an escaped quote cannot terminate.
	if raw {
		buf.push(b'\\');
		let mut utf8 = [0u8; 4];
		buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
		return Ok(());
	}

	match ch {
		'n' => buf.push(b'\n'),
		'r' => buf.push(b'\r'),
		't' => buf.push(b'\t'),
		'a' => buf.push(0x07),
		'b' => buf.push(0x08),
		'v' => buf.push(0x0B),
		'f' => buf.push(0x0C),
		'\\' => buf.push(b'\\'),
		'\'' => buf.push(b'\''),
		'"' => buf.push(b'"'),
		'?' => buf.push(b'?'),
		'0'..='7' => {
			let mut value = ch as u32 - '0' as u32;
			for _ in 0..2 {
				match cursor.peek() {
					Some(digit @ '0'..='7') => {
						cursor.consume();
						value = value * 8 + (digit as u32 - '0' as u32);
					}
					_ => break,
				}
			}
			if value > 0xFF {
				return Err(illegal_escape_here(cursor, escape_mark));
			}
			buf.push(value as u8);
		}
		'x' | 'X' => {
			let mut value = 0u32;
			for _ in 0..2 {
				match cursor.peek() {
					Some(digit) if digit.is_ascii_hexdigit() => {
						cursor.consume();
						value = value * 16 + digit.to_digit(16).unwrap_or(0);
					}
					_ => return Err(illegal_escape_here(cursor, escape_mark)),
				}
			}
			buf.push(value as u8);
		}
		'u' | 'U' => {
			if bytes {
				return Err(error!(ddl::unicode_escape_in_bytes(cursor.fragment_from(escape_mark))));
			}
			let digits = if ch == 'u' {
				4
			} else {
				8
			};
			let mut value = 0u32;
			for _ in 0..digits {
				match cursor.peek() {
					Some(digit) if digit.is_ascii_hexdigit() => {
						cursor.consume();
						value = value * 16 + digit.to_digit(16).unwrap_or(0);
					}
					_ => return Err(illegal_escape_here(cursor, escape_mark)),
				}
			}
			match char::from_u32(value) {
				Some(decoded) => {
					let mut utf8 = [0u8; 4];
					buf.extend_from_slice(decoded.encode_utf8(&mut utf8).as_bytes());
				}
				None => return Err(illegal_escape_here(cursor, escape_mark)),
			}
		}
		other => {
			return Err(error!(ddl::illegal_escape(cursor.fragment_from(escape_mark), &format!("\\{}", other))));
		}
	}
	Ok(())
}

fn illegal_escape_here(cursor: &Cursor, escape_mark: super::cursor::Mark) -> keystone_type::Error {
	let fragment = cursor.fragment_from(escape_mark);
	let sequence = fragment.text().to_string();
	error!(ddl::illegal_escape(fragment, &sequence))
}
