// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::Result;

use super::{NodeId, NodeMap};

/// A check constraint on one table. The expression is carried as the
/// verbatim source text between the CHECK parentheses.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConstraint {
	pub constraint_name: Option<String>,
	pub generated_name: String,
	pub expression: String,
	pub table: NodeId,
}

impl CheckConstraint {
	pub fn name(&self) -> &str {
		self.constraint_name.as_deref().unwrap_or(&self.generated_name)
	}

	pub(crate) fn deep_clone(&mut self, map: &NodeMap) -> Result<()> {
		self.table = map.image(self.table)?;
		Ok(())
	}
}
