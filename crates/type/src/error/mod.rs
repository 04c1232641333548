// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use std::{
	fmt::{Display, Formatter},
	ops::{Deref, DerefMut},
};

pub mod diagnostic;

use diagnostic::{Diagnostic, StatusCode, render::DefaultRenderer};

/// The error type carried through every fallible Keystone operation.
///
/// An error is a diagnostic; the newtype exists so `?` works against
/// `crate::Result` while keeping the diagnostic fields reachable.
#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Diagnostic);

impl Deref for Error {
	type Target = Diagnostic;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Error {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Error {
	pub fn diagnostic(self) -> Diagnostic {
		self.0
	}

	pub fn status(&self) -> StatusCode {
		self.0.status
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(DefaultRenderer::render_string(&self.0).as_str())
	}
}

impl std::error::Error for Error {}

/// Wrap a diagnostic into an [`Error`].
#[macro_export]
macro_rules! error {
	($diagnostic:expr) => {
		$crate::error::Error($diagnostic)
	};
}
