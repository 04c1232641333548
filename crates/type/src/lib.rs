// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

pub mod error;
pub mod fragment;

pub use error::{
	Error, diagnostic,
	diagnostic::{Diagnostic, StatusCode},
};
pub use fragment::Fragment;

pub type Result<T> = std::result::Result<T, Error>;
