// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use serde::{Deserialize, Serialize};

use crate::fragment::Fragment;

pub mod ddl;
pub mod operation;
pub mod render;
pub mod schema;

/// Status classification mirroring the administrative wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
	/// Lexical, grammatical or structural rejection of the request.
	InvalidArgument,
	/// A feature-gated construct was used while its gate is disabled.
	Unimplemented,
	/// The resource being created is already registered.
	AlreadyExists,
	/// The resource being looked up does not exist.
	NotFound,
	/// A candidate schema failed semantic validation.
	FailedPrecondition,
	/// An internal invariant was broken.
	Internal,
}

impl StatusCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			StatusCode::InvalidArgument => "INVALID_ARGUMENT",
			StatusCode::Unimplemented => "UNIMPLEMENTED",
			StatusCode::AlreadyExists => "ALREADY_EXISTS",
			StatusCode::NotFound => "NOT_FOUND",
			StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
			StatusCode::Internal => "INTERNAL",
		}
	}
}

/// A single diagnostic produced by the lexer, parser, schema validator or
/// the admin surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	/// Stable machine-readable code, e.g. `DDL_001`.
	pub code: String,
	pub status: StatusCode,
	/// The user-visible message.
	pub message: String,
	/// Statement text the diagnostic points at, if positioned.
	pub fragment: Fragment,
	/// Short annotation for the fragment.
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
}

impl Diagnostic {
	pub fn new(code: &str, status: StatusCode, message: impl Into<String>) -> Self {
		Self {
			code: code.to_string(),
			status,
			message: message.into(),
			fragment: Fragment::none(),
			label: None,
			help: None,
			notes: Vec::new(),
		}
	}

	pub fn with_fragment(mut self, fragment: Fragment) -> Self {
		self.fragment = fragment;
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_help(mut self, help: impl Into<String>) -> Self {
		self.help = Some(help.into());
		self
	}
}
