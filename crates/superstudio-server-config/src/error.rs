// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use superstudio_server_smtp::SmtpError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// A required environment variable is absent.
	#[error("missing required configuration: {0}")]
	Missing(&'static str),

	/// An environment variable holds an unparseable value.
	#[error("invalid configuration value for {name}: {message}")]
	Invalid {
		name: &'static str,
		message: String,
	},

	/// Cross-field validation failed.
	#[error("configuration validation failed: {0}")]
	Validation(String),

	/// The SMTP section failed to load.
	#[error("SMTP configuration error: {0}")]
	Smtp(#[from] SmtpError),
}
