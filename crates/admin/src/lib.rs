// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

pub mod database;
pub mod operation;
pub mod registry;
pub mod uri;

pub use database::{Database, DatabaseRegistry, UpdateOutcome};
pub use keystone_ddl::parse_create_database;
pub use operation::{Operation, OperationMetadata, OperationResponse};
pub use registry::{OperationId, OperationRegistry};

pub type Result<T> = keystone_type::Result<T>;
