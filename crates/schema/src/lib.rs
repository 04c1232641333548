// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

pub mod catalog;
pub mod editor;
pub mod printer;
pub mod updater;
pub mod validator;

pub use catalog::{NodeId, Schema, SchemaGraph, SchemaNode};
pub use editor::SchemaGraphEditor;
pub use printer::print_ddl_statements;
pub use updater::{SchemaChangeOutcome, SchemaUpdater};
pub use validator::{SchemaValidationContext, validate_schema};

pub type Result<T> = keystone_type::Result<T>;
