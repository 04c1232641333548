// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use chrono::{DateTime, Utc};
use keystone_type::Error;

/// Metadata carried by a long-running operation record, shaped after the
/// administrative wire contract.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationMetadata {
	CreateDatabase {
		database_uri: String,
	},
	UpdateDatabaseDdl {
		database_uri: String,
		/// All submitted statements, successful or not.
		statements: Vec<String>,
		/// One shared commit timestamp per successful statement.
		commit_timestamps: Vec<DateTime<Utc>>,
	},
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationResponse {
	Database {
		database_uri: String,
	},
	Empty,
}

/// A completed long-running operation.
///
/// Administrative work completes synchronously upstream, so every
/// registered operation is terminal: it carries either a success payload
/// or the error of the failing statement.
#[derive(Debug, Clone)]
pub struct Operation {
	pub uri: String,
	pub metadata: OperationMetadata,
	pub result: Result<OperationResponse, Error>,
}

impl Operation {
	pub fn done(&self) -> bool {
		true
	}

	pub fn succeeded(&self) -> bool {
		self.result.is_ok()
	}
}
