// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! URL-safe slug derivation.

/// Convert a title into a URL-safe slug: lowercase, quotes removed, runs of
/// non-alphanumeric characters collapsed to a single `_`, no leading or
/// trailing separator.
pub fn slugify(input: &str) -> String {
	let mut slug = String::with_capacity(input.len());
	let mut pending_separator = false;

	for c in input.trim().to_lowercase().chars() {
		if c == '\'' || c == '"' {
			continue;
		}
		if c.is_ascii_alphanumeric() {
			if pending_separator && !slug.is_empty() {
				slug.push('_');
			}
			pending_separator = false;
			slug.push(c);
		} else {
			pending_separator = true;
		}
	}

	slug
}
