// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use std::{collections::BTreeMap, sync::Arc};

use keystone_type::{Result, diagnostic::operation as diag, error};
use parking_lot::Mutex;
use tracing::instrument;

use crate::{
	operation::Operation,
	uri::{AUTO_OPERATION_PREFIX, make_operation_uri, validate_operation_id},
};

/// How the operation id is chosen at registration.
///
/// The auto sentinel is a dedicated value rather than an empty string,
/// so an explicitly empty user id stays distinguishable (and invalid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationId<'a> {
	/// Generate a fresh `_auto<N>` id from the registry counter.
	Auto,
	/// Use the caller's id, validated against the identifier grammar.
	User(&'a str),
}

#[derive(Default)]
struct RegistryState {
	/// Counter for system-assigned operation ids; strictly increasing
	/// within a process.
	next_auto_id: u64,
	/// Operation URI to record. The ordered map makes listing
	/// lexicographic by construction.
	operations: BTreeMap<String, Arc<Operation>>,
}

/// Registry of completed long-running operations, shared across request
/// threads. The mutex covers only map and counter access; no I/O
/// happens under it.
#[derive(Default)]
pub struct OperationRegistry {
	state: Mutex<RegistryState>,
}

impl OperationRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a completed operation under `resource_uri`. With a user
	/// id the computed URI must be free; registering it twice is an
	/// AlreadyExists error.
	#[instrument(name = "admin::operations::create", level = "debug", skip(self, operation))]
	pub fn create(
		&self,
		resource_uri: &str,
		id: OperationId<'_>,
		operation: impl FnOnce(String) -> Operation,
	) -> Result<Arc<Operation>> {
		let mut state = self.state.lock();

		let operation_id = match id {
			OperationId::Auto => {
				let id = format!("{}{}", AUTO_OPERATION_PREFIX, state.next_auto_id);
				state.next_auto_id += 1;
				id
			}
			OperationId::User(id) => {
				validate_operation_id(id)?;
				id.to_string()
			}
		};

		let uri = make_operation_uri(resource_uri, &operation_id);
		if state.operations.contains_key(&uri) {
			return Err(error!(diag::operation_already_exists(&uri)));
		}

		let record = Arc::new(operation(uri.clone()));
		state.operations.insert(uri, record.clone());
		Ok(record)
	}

	#[instrument(name = "admin::operations::get", level = "trace", skip(self))]
	pub fn get(&self, operation_uri: &str) -> Result<Arc<Operation>> {
		self.state
			.lock()
			.operations
			.get(operation_uri)
			.cloned()
			.ok_or_else(|| error!(diag::operation_not_found(operation_uri)))
	}

	/// Delete is idempotent: removing an absent operation succeeds.
	#[instrument(name = "admin::operations::delete", level = "debug", skip(self))]
	pub fn delete(&self, operation_uri: &str) {
		self.state.lock().operations.remove(operation_uri);
	}

	/// All operations under the parent resource, in lexicographic URI
	/// order.
	#[instrument(name = "admin::operations::list", level = "trace", skip(self))]
	pub fn list(&self, resource_uri: &str) -> Vec<Arc<Operation>> {
		let prefix = format!("{}/operations/", resource_uri);
		self.state
			.lock()
			.operations
			.range(prefix.clone()..)
			.take_while(|(uri, _)| uri.starts_with(&prefix))
			.map(|(_, operation)| operation.clone())
			.collect()
	}

	/// Cancellation is accepted and has no effect: every registered
	/// operation is already terminal.
	pub fn cancel(&self, _operation_uri: &str) {}
}

#[cfg(test)]
mod tests {
	use keystone_type::StatusCode;

	use super::*;
	use crate::operation::{OperationMetadata, OperationResponse};

	fn record(uri: String) -> Operation {
		Operation {
			uri,
			metadata: OperationMetadata::CreateDatabase {
				database_uri: "projects/p/instances/i/databases/db".to_string(),
			},
			result: Ok(OperationResponse::Empty),
		}
	}

	const RESOURCE: &str = "projects/p/instances/i/databases/db";

	#[test]
	fn test_auto_ids_are_sequential() {
		let registry = OperationRegistry::new();
		let first = registry.create(RESOURCE, OperationId::Auto, record).unwrap();
		let second = registry.create(RESOURCE, OperationId::Auto, record).unwrap();
		assert!(first.uri.ends_with("/operations/_auto0"));
		assert!(second.uri.ends_with("/operations/_auto1"));
	}

	#[test]
	fn test_user_id_then_duplicate() {
		let registry = OperationRegistry::new();
		registry.create(RESOURCE, OperationId::Auto, record).unwrap();
		registry.create(RESOURCE, OperationId::Auto, record).unwrap();
		let third = registry.create(RESOURCE, OperationId::User("foo"), record).unwrap();
		assert!(third.uri.ends_with("/operations/foo"));

		let err = registry.create(RESOURCE, OperationId::User("foo"), record).unwrap_err();
		assert_eq!(err.status(), StatusCode::AlreadyExists);
	}

	#[test]
	fn test_malformed_user_id() {
		let registry = OperationRegistry::new();
		let err = registry.create(RESOURCE, OperationId::User("not valid!"), record).unwrap_err();
		assert_eq!(err.status(), StatusCode::InvalidArgument);
		let err = registry.create(RESOURCE, OperationId::User("_auto3"), record).unwrap_err();
		assert_eq!(err.status(), StatusCode::InvalidArgument);
	}

	#[test]
	fn test_get_and_not_found() {
		let registry = OperationRegistry::new();
		let created = registry.create(RESOURCE, OperationId::User("foo"), record).unwrap();
		let fetched = registry.get(&created.uri).unwrap();
		assert_eq!(fetched.uri, created.uri);

		let err = registry.get("projects/p/instances/i/databases/db/operations/missing").unwrap_err();
		assert_eq!(err.status(), StatusCode::NotFound);
	}

	#[test]
	fn test_delete_is_idempotent() {
		let registry = OperationRegistry::new();
		let created = registry.create(RESOURCE, OperationId::User("foo"), record).unwrap();
		registry.delete(&created.uri);
		registry.delete(&created.uri);
		assert_eq!(registry.get(&created.uri).unwrap_err().status(), StatusCode::NotFound);
	}

	#[test]
	fn test_list_is_lexicographic_and_scoped() {
		let registry = OperationRegistry::new();
		registry.create(RESOURCE, OperationId::User("zeta"), record).unwrap();
		registry.create(RESOURCE, OperationId::User("alpha"), record).unwrap();
		registry.create(RESOURCE, OperationId::Auto, record).unwrap();
		registry.create("projects/p/instances/i/databases/other", OperationId::User("beta"), record).unwrap();

		let listed = registry.list(RESOURCE);
		let ids: Vec<&str> = listed.iter().map(|operation| operation.uri.rsplit('/').next().unwrap_or("")).collect();
		assert_eq!(ids, vec!["_auto0", "alpha", "zeta"]);
	}

	#[test]
	fn test_listing_does_not_leak_sibling_prefixes() {
		let registry = OperationRegistry::new();
		registry.create("projects/p/instances/i/databases/db", OperationId::User("a"), record).unwrap();
		registry.create("projects/p/instances/i/databases/db2", OperationId::User("b"), record).unwrap();
		let listed = registry.list("projects/p/instances/i/databases/db");
		assert_eq!(listed.len(), 1);
	}

	#[test]
	fn test_cancel_is_a_no_op() {
		let registry = OperationRegistry::new();
		let created = registry.create(RESOURCE, OperationId::User("foo"), record).unwrap();
		registry.cancel(&created.uri);
		assert!(registry.get(&created.uri).is_ok());
	}
}
