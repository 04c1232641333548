// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 Keystone

use std::fmt::Write;

use crate::error::diagnostic::Diagnostic;

pub struct DefaultRenderer;

impl DefaultRenderer {
	pub fn render_string(d: &Diagnostic) -> String {
		let mut output = String::new();

		let _ = writeln!(&mut output, "error[{}]: {}", d.code, d.message);

		if d.fragment.is_positioned() {
			let _ = writeln!(
				&mut output,
				" --> line {}, column {}: `{}`",
				d.fragment.line(),
				d.fragment.column(),
				d.fragment.text()
			);
		}

		if let Some(label) = &d.label {
			let _ = writeln!(&mut output, "  = {}", label);
		}

		if let Some(help) = &d.help {
			let _ = writeln!(&mut output, "help: {}", help);
		}

		for note in &d.notes {
			let _ = writeln!(&mut output, "note: {}", note);
		}

		output
	}
}
