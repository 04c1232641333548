// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use keystone_type::Result;

use crate::{
	ast::CreateIndex,
	parse::Parser,
	tokenize::{Keyword, Punct},
};

impl<'a> Parser<'a> {
	/// `CREATE [UNIQUE] [NULL_FILTERED] INDEX <name> ON <table> (...)
	/// [STORING (...)] [, INTERLEAVE IN <parent>]`, after `CREATE`.
	pub(crate) fn parse_create_index(&mut self) -> Result<CreateIndex> {
		let unique = self.consume_if_keyword(Keyword::Unique).is_some();
		let null_filtered = self.consume_if_keyword(Keyword::NullFiltered).is_some();
		self.consume_keyword(Keyword::Index)?;

		let name = self.identifier("an index name")?;
		self.consume_keyword(Keyword::On)?;
		let table = self.identifier("a table name")?;
		let key_parts = self.parse_key_parts()?;

		let stored_columns = if self.consume_if_keyword(Keyword::Storing).is_some() {
			self.parse_column_name_list()?
		} else {
			Vec::new()
		};

		let interleave_parent = if self.consume_if_punct(Punct::Comma).is_some() {
			self.consume_keyword(Keyword::Interleave)?;
			self.consume_keyword(Keyword::In)?;
			Some(self.identifier("a parent table name")?)
		} else {
			None
		};

		Ok(CreateIndex {
			name,
			table,
			null_filtered,
			unique,
			key_parts,
			stored_columns,
			interleave_parent,
		})
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		FeatureFlags,
		ast::{DdlStatement, SortOrder},
		parse::parse_statement,
	};

	fn parse_index(source: &str) -> crate::ast::CreateIndex {
		match parse_statement(source, &FeatureFlags::default()).unwrap() {
			DdlStatement::CreateIndex(create) => create,
			other => panic!("expected CreateIndex, got {:?}", other),
		}
	}

	#[test]
	fn test_create_index_basic() {
		let index = parse_index("CREATE INDEX UsersByUserId ON Users(UserId)");
		assert_eq!(index.name, "UsersByUserId");
		assert_eq!(index.table, "Users");
		assert!(!index.unique);
		assert!(!index.null_filtered);
		assert_eq!(index.key_parts.len(), 1);
		assert_eq!(index.key_parts[0].column, "UserId");
		assert_eq!(index.key_parts[0].order, SortOrder::Asc);
	}

	#[test]
	fn test_create_null_filtered_index() {
		let index = parse_index("CREATE NULL_FILTERED INDEX UsersByUserId ON Users(UserId)");
		assert!(index.null_filtered);
	}

	#[test]
	fn test_create_unique_index() {
		let index = parse_index("CREATE UNIQUE INDEX UsersByUserId ON Users(UserId)");
		assert!(index.unique);
	}

	#[test]
	fn test_create_index_desc_and_default_asc() {
		let index = parse_index("CREATE NULL_FILTERED INDEX LocalAlbumsByName ON Albums(UserId ASC, Name DESC)");
		assert_eq!(index.key_parts[0].order, SortOrder::Asc);
		assert_eq!(index.key_parts[1].order, SortOrder::Desc);
	}

	#[test]
	fn test_create_index_storing() {
		let index = parse_index("CREATE NULL_FILTERED INDEX GlobalAlbumsByName ON Albums(Name) STORING (Description)");
		assert_eq!(index.stored_columns, vec!["Description"]);
	}

	#[test]
	fn test_create_index_interleaved() {
		let index = parse_index("CREATE NULL_FILTERED INDEX LocalAlbumsByName ON Albums(UserId, Name DESC), INTERLEAVE IN Users");
		assert_eq!(index.interleave_parent.as_deref(), Some("Users"));
	}

	#[test]
	fn test_create_index_storing_and_interleave() {
		let index = parse_index("CREATE INDEX I ON Albums(Name) STORING (Description), INTERLEAVE IN Users");
		assert_eq!(index.stored_columns, vec!["Description"]);
		assert_eq!(index.interleave_parent.as_deref(), Some("Users"));
	}

	#[test]
	fn test_unique_must_precede_null_filtered() {
		let err = parse_statement("CREATE NULL_FILTERED UNIQUE INDEX I ON T(A)", &FeatureFlags::default())
			.unwrap_err();
		assert!(err.message.contains("Expecting 'INDEX' but found 'UNIQUE'"), "{}", err.message);
	}
}
