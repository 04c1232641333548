// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use keystone_ddl::{FeatureFlags, parse_create_database};
use keystone_schema::{Schema, SchemaUpdater};
use keystone_type::{Result, diagnostic::operation as diag, error};
use parking_lot::Mutex;
use tracing::instrument;

use crate::{
	operation::{Operation, OperationMetadata, OperationResponse},
	registry::{OperationId, OperationRegistry},
	uri::{make_database_uri, parse_database_uri, validate_database_id},
};

/// One emulated database: a URI and its committed schema.
///
/// Schema updates on the same database serialize on the schema mutex;
/// readers clone the current committed schema and never block updates.
#[derive(Debug)]
pub struct Database {
	uri: String,
	create_time: DateTime<Utc>,
	schema: Mutex<Schema>,
	updater: SchemaUpdater,
}

/// What one update request did to the database.
pub struct UpdateOutcome {
	pub statements_applied: usize,
	pub commit_timestamp: DateTime<Utc>,
	pub error: Option<keystone_type::Error>,
}

impl Database {
	fn new(uri: String, schema: Schema, updater: SchemaUpdater) -> Self {
		Self {
			uri,
			create_time: Utc::now(),
			schema: Mutex::new(schema),
			updater,
		}
	}

	pub fn uri(&self) -> &str {
		&self.uri
	}

	pub fn create_time(&self) -> DateTime<Utc> {
		self.create_time
	}

	/// The current committed schema.
	pub fn schema(&self) -> Schema {
		self.schema.lock().clone()
	}

	pub fn ddl_statements(&self) -> Result<Vec<String>> {
		keystone_schema::print_ddl_statements(&self.schema())
	}

	/// Apply a statement stream. All successful statements commit at one
	/// shared timestamp; on failure the successful prefix stays
	/// committed and the error is reported in the outcome.
	pub fn update_schema(&self, statements: &[String]) -> UpdateOutcome {
		let mut current = self.schema.lock();
		let outcome = self.updater.apply(&current, statements);
		*current = outcome.schema;
		UpdateOutcome {
			statements_applied: outcome.statements_applied,
			commit_timestamp: Utc::now(),
			error: outcome.error,
		}
	}
}

/// Registry of databases under the emulated service, keyed by URI.
pub struct DatabaseRegistry {
	flags: FeatureFlags,
	databases: Mutex<BTreeMap<String, Arc<Database>>>,
}

impl DatabaseRegistry {
	pub fn new(flags: FeatureFlags) -> Self {
		Self {
			flags,
			databases: Mutex::new(BTreeMap::new()),
		}
	}

	/// Create a database from its `CREATE DATABASE` statement, applying
	/// the extra statements to an empty schema. Nothing is registered
	/// when any statement fails. Creation completes synchronously but is
	/// still recorded as a terminal operation so clients polling the
	/// long-running-operations surface see it.
	#[instrument(name = "admin::databases::create", level = "debug", skip_all, fields(instance = instance_uri))]
	pub fn create_database(
		&self,
		operations: &OperationRegistry,
		instance_uri: &str,
		create_statement: &str,
		extra_statements: &[String],
	) -> Result<(Arc<Database>, Arc<Operation>)> {
		if create_statement.is_empty() {
			return Err(error!(diag::missing_create_statement()));
		}
		let database_id = parse_create_database(create_statement)?;
		validate_database_id(&database_id)?;
		let uri = make_database_uri(instance_uri, &database_id);

		let updater = SchemaUpdater::new(self.flags);
		let outcome = updater.apply(&Schema::empty(), extra_statements);
		if let Some(err) = outcome.error {
			return Err(err);
		}

		let database = {
			let mut databases = self.databases.lock();
			if databases.contains_key(&uri) {
				return Err(error!(diag::database_already_exists(&uri)));
			}
			let database = Arc::new(Database::new(uri.clone(), outcome.schema, updater));
			databases.insert(uri.clone(), database.clone());
			database
		};

		let metadata = OperationMetadata::CreateDatabase {
			database_uri: uri.clone(),
		};
		let result = Ok(OperationResponse::Database {
			database_uri: uri.clone(),
		});
		let operation = operations.create(&uri, OperationId::Auto, move |operation_uri| Operation {
			uri: operation_uri,
			metadata,
			result,
		})?;
		Ok((database, operation))
	}

	#[instrument(name = "admin::databases::get", level = "trace", skip(self))]
	pub fn get_database(&self, database_uri: &str) -> Result<Arc<Database>> {
		parse_database_uri(database_uri)?;
		self.databases
			.lock()
			.get(database_uri)
			.cloned()
			.ok_or_else(|| error!(diag::database_not_found(database_uri)))
	}

	/// Databases under an instance, in lexicographic URI order.
	#[instrument(name = "admin::databases::list", level = "trace", skip(self))]
	pub fn list_databases(&self, instance_uri: &str) -> Vec<Arc<Database>> {
		let prefix = format!("{}/databases/", instance_uri);
		self.databases
			.lock()
			.range(prefix.clone()..)
			.take_while(|(uri, _)| uri.starts_with(&prefix))
			.map(|(_, database)| database.clone())
			.collect()
	}

	/// Dropping an absent database succeeds.
	#[instrument(name = "admin::databases::drop", level = "debug", skip(self))]
	pub fn drop_database(&self, database_uri: &str) -> Result<()> {
		parse_database_uri(database_uri)?;
		self.databases.lock().remove(database_uri);
		Ok(())
	}

	/// The UpdateDatabaseDdl flow: check for request replay, apply the
	/// statements, and register a terminal operation carrying the
	/// statement list, one shared commit timestamp per successful
	/// statement, and the first failure if any.
	#[instrument(name = "admin::databases::update_ddl", level = "debug", skip(self, operations, statements), fields(count = statements.len()))]
	pub fn update_database_ddl(
		&self,
		operations: &OperationRegistry,
		database_uri: &str,
		statements: &[String],
		operation_id: Option<&str>,
	) -> Result<Arc<Operation>> {
		parse_database_uri(database_uri)?;

		// Request replay check: a user-supplied operation id that is
		// already registered means this request was already executed.
		if let Some(id) = operation_id {
			crate::uri::validate_operation_id(id)?;
			let uri = crate::uri::make_operation_uri(database_uri, id);
			if operations.get(&uri).is_ok() {
				return Err(error!(diag::operation_already_exists(&uri)));
			}
		}

		let database = self.get_database(database_uri)?;
		let outcome = database.update_schema(statements);

		let metadata = OperationMetadata::UpdateDatabaseDdl {
			database_uri: database_uri.to_string(),
			statements: statements.to_vec(),
			commit_timestamps: vec![outcome.commit_timestamp; outcome.statements_applied],
		};
		let result = match outcome.error {
			None => Ok(OperationResponse::Empty),
			Some(err) => Err(err),
		};

		let id = match operation_id {
			Some(id) => OperationId::User(id),
			None => OperationId::Auto,
		};
		operations.create(database_uri, id, move |uri| Operation {
			uri,
			metadata,
			result,
		})
	}
}
