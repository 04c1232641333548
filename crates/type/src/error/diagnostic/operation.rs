// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use crate::error::diagnostic::{Diagnostic, StatusCode};

pub fn invalid_operation_id(id: &str) -> Diagnostic {
	Diagnostic::new("OP_001", StatusCode::InvalidArgument, format!("Invalid operation id: {}", id))
		.with_help("Operation ids must match [A-Za-z_][A-Za-z0-9_]* and must not use the reserved _auto prefix")
}

pub fn operation_not_found(uri: &str) -> Diagnostic {
	Diagnostic::new("OP_002", StatusCode::NotFound, format!("Operation not found: {}", uri))
}

pub fn operation_already_exists(uri: &str) -> Diagnostic {
	Diagnostic::new("OP_003", StatusCode::AlreadyExists, format!("Operation already exists: {}", uri))
}

pub fn invalid_database_uri(uri: &str) -> Diagnostic {
	Diagnostic::new("OP_004", StatusCode::InvalidArgument, format!("Invalid database uri: {}", uri))
		.with_help("Expected projects/<project>/instances/<instance>/databases/<database>")
}

pub fn invalid_operation_uri(uri: &str) -> Diagnostic {
	Diagnostic::new("OP_005", StatusCode::InvalidArgument, format!("Invalid operation uri: {}", uri))
		.with_help("Expected <resource>/operations/<operation>")
}

pub fn invalid_database_id(id: &str) -> Diagnostic {
	Diagnostic::new("OP_006", StatusCode::InvalidArgument, format!("Invalid database id: {}", id))
		.with_help("Database ids are 2-30 characters of [a-z0-9_-], start with a letter and do not end with a hyphen")
}

pub fn database_not_found(uri: &str) -> Diagnostic {
	Diagnostic::new("OP_007", StatusCode::NotFound, format!("Database not found: {}", uri))
}

pub fn database_already_exists(uri: &str) -> Diagnostic {
	Diagnostic::new("OP_008", StatusCode::AlreadyExists, format!("Database already exists: {}", uri))
}

pub fn missing_create_statement() -> Diagnostic {
	Diagnostic::new("OP_009", StatusCode::InvalidArgument, "Missing create_statement in the request.")
}
