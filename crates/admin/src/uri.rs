// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::{Result, diagnostic::operation as diag, error};

/// Reserved prefix of system-generated operation ids.
pub const AUTO_OPERATION_PREFIX: &str = "_auto";

pub fn make_instance_uri(project_id: &str, instance_id: &str) -> String {
	format!("projects/{}/instances/{}", project_id, instance_id)
}

pub fn make_database_uri(instance_uri: &str, database_id: &str) -> String {
	format!("{}/databases/{}", instance_uri, database_id)
}

pub fn make_operation_uri(resource_uri: &str, operation_id: &str) -> String {
	format!("{}/operations/{}", resource_uri, operation_id)
}

/// Split `projects/<p>/instances/<i>/databases/<d>` into its ids.
pub fn parse_database_uri(uri: &str) -> Result<(&str, &str, &str)> {
	let parts: Vec<&str> = uri.split('/').collect();
	match parts.as_slice() {
		["projects", project, "instances", instance, "databases", database]
			if !project.is_empty() && !instance.is_empty() && !database.is_empty() =>
		{
			Ok((project, instance, database))
		}
		_ => Err(error!(diag::invalid_database_uri(uri))),
	}
}

/// Split `<resource>/operations/<operation>`.
pub fn parse_operation_uri(uri: &str) -> Result<(&str, &str)> {
	match uri.rsplit_once("/operations/") {
		Some((resource, operation)) if !resource.is_empty() && !operation.is_empty() && !operation.contains('/') => {
			Ok((resource, operation))
		}
		_ => Err(error!(diag::invalid_operation_uri(uri))),
	}
}

/// Database ids are 2-30 characters of `[a-z0-9_-]`, start with a
/// lowercase letter and do not end with a hyphen.
pub fn validate_database_id(id: &str) -> Result<()> {
	let valid = id.len() >= 2
		&& id.len() <= 30
		&& id.chars().next().map_or(false, |ch| ch.is_ascii_lowercase())
		&& !id.ends_with('-')
		&& id.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-');
	if valid {
		Ok(())
	} else {
		Err(error!(diag::invalid_database_id(id)))
	}
}

/// User-supplied operation ids follow the unquoted-identifier grammar;
/// the `_auto` prefix is reserved for system-generated ids.
pub fn validate_operation_id(id: &str) -> Result<()> {
	let mut chars = id.chars();
	let valid = match chars.next() {
		Some(first) if first.is_ascii_alphabetic() || first == '_' => {
			chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
		}
		_ => false,
	};
	if !valid || id.starts_with(AUTO_OPERATION_PREFIX) {
		return Err(error!(diag::invalid_operation_id(id)));
	}
	Ok(())
}
