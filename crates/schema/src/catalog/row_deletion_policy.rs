// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::Result;

use super::{NodeId, NodeMap};

/// A table's row-deletion policy: rows whose timestamp column is older
/// than the day count are logically deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDeletionPolicy {
	pub table: NodeId,
	pub column: NodeId,
	pub older_than_days: i64,
}

impl RowDeletionPolicy {
	pub(crate) fn deep_clone(&mut self, map: &NodeMap) -> Result<()> {
		self.table = map.image(self.table)?;
		self.column = map.image(self.column)?;
		Ok(())
	}
}
