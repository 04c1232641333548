// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use crate::{
	error::diagnostic::{Diagnostic, StatusCode},
	fragment::Fragment,
};

/// General syntax error anchored at a source position. The message is
/// always of the shape `Syntax error on line L, column C: <detail>` so
/// clients can rely on the position being present.
pub fn syntax_error(fragment: Fragment, detail: impl Into<String>) -> Diagnostic {
	let detail = detail.into();
	Diagnostic::new(
		"DDL_001",
		StatusCode::InvalidArgument,
		format!("Syntax error on line {}, column {}: {}", fragment.line(), fragment.column(), detail),
	)
	.with_fragment(fragment)
}

/// `Expecting X but found Y`, the workhorse of the parser. `found` is the
/// raw token text, or `EOF` at end of input.
pub fn expecting(fragment: Fragment, expected: &str, found: &str) -> Diagnostic {
	let detail = format!("Expecting {} but found '{}'", expected, found);
	syntax_error(fragment, detail).with_label(format!("expected {}", expected))
}

/// A reserved word or other unusable token occurred where the named
/// grammar rule needed something else.
pub fn while_parsing(fragment: Fragment, rule: &str) -> Diagnostic {
	let detail = format!("Encountered '{}' while parsing: {}", fragment.text(), rule);
	syntax_error(fragment, detail)
}

pub fn unclosed_triple_quote(fragment: Fragment) -> Diagnostic {
	syntax_error(fragment, "Encountered an unclosed triple quoted string")
}

pub fn unclosed_string(fragment: Fragment) -> Diagnostic {
	syntax_error(fragment, "Encountered an unclosed string literal")
}

pub fn unclosed_quoted_identifier(fragment: Fragment) -> Diagnostic {
	syntax_error(fragment, "Encountered an unclosed quoted identifier")
}

pub fn illegal_escape(fragment: Fragment, sequence: &str) -> Diagnostic {
	syntax_error(fragment, format!("Illegal escape sequence: {}", sequence))
}

pub fn unicode_escape_in_bytes(fragment: Fragment) -> Diagnostic {
	syntax_error(fragment, "Illegal escape sequence: Unicode escape sequence")
}

pub fn invalid_utf8_string(fragment: Fragment) -> Diagnostic {
	syntax_error(fragment, "Encountered Structurally invalid UTF8 string")
}

pub fn unexpected_character(fragment: Fragment, ch: char) -> Diagnostic {
	syntax_error(fragment, format!("Unexpected character '{}'", ch.escape_default()))
		.with_help("Only ASCII characters are allowed outside string literals".to_string())
}

/// Row deletion policies accept exactly one predicate function. The
/// message is matched verbatim by clients, so it carries no position
/// prefix.
pub fn only_older_than(fragment: Fragment) -> Diagnostic {
	Diagnostic::new("DDL_002", StatusCode::InvalidArgument, "Only OLDER_THAN is supported.").with_fragment(fragment)
}

pub fn unknown_option(fragment: Fragment) -> Diagnostic {
	let name = fragment.text().to_string();
	Diagnostic::new("DDL_003", StatusCode::InvalidArgument, format!("Option '{}' is not recognized.", name))
		.with_fragment(fragment)
		.with_help("The only recognized column option is allow_commit_timestamp")
}

pub fn statement_not_supported(detail: impl Into<String>) -> Diagnostic {
	Diagnostic::new(
		"DDL_004",
		StatusCode::InvalidArgument,
		format!("Error parsing DDL statement: {}", detail.into()),
	)
}

// Feature-gated constructs are reported as unimplemented rather than as
// syntax errors; the statement parsed, the feature is just switched off.

pub fn generated_columns_disabled() -> Diagnostic {
	Diagnostic::new("DDL_010", StatusCode::Unimplemented, "Generated columns are not enabled.")
}

pub fn non_stored_generated_column(column: &str) -> Diagnostic {
	Diagnostic::new(
		"DDL_011",
		StatusCode::Unimplemented,
		format!("Generated column `{}` without the STORED attribute is not supported.", column),
	)
}

pub fn column_default_values_disabled() -> Diagnostic {
	Diagnostic::new("DDL_012", StatusCode::Unimplemented, "Column DEFAULT values are not enabled.")
}

pub fn check_constraint_disabled() -> Diagnostic {
	Diagnostic::new("DDL_013", StatusCode::Unimplemented, "Check Constraint is not implemented.")
}
