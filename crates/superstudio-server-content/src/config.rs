// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Content store connection configuration.

use superstudio_common_secret::SecretString;

/// Default content store API version.
pub const DEFAULT_API_VERSION: &str = "2024-01-01";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration for the content store client.
///
/// The write token authorizes mutations and asset uploads; read queries on
/// a public dataset work without it. The token is process-wide, read-only
/// after startup, and never exposed to clients.
#[derive(Debug, Clone)]
pub struct ContentConfig {
	/// Project identifier (subdomain of the store's API host).
	pub project_id: String,
	/// Dataset name, e.g. "production".
	pub dataset: String,
	/// Dated API version string.
	pub api_version: String,
	/// Write token. `None` makes every mutation fail with `NotConfigured`.
	pub token: Option<SecretString>,
	/// Route read queries through the CDN edge.
	pub use_cdn: bool,
	/// Per-request timeout in seconds.
	pub timeout_secs: u64,
}

impl ContentConfig {
	/// Create a configuration with default API version, CDN reads, and timeout.
	pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
		Self {
			project_id: project_id.into(),
			dataset: dataset.into(),
			api_version: DEFAULT_API_VERSION.to_string(),
			token: None,
			use_cdn: true,
			timeout_secs: DEFAULT_TIMEOUT_SECS,
		}
	}

	/// Set the write token.
	pub fn with_token(mut self, token: Option<SecretString>) -> Self {
		self.token = token;
		self
	}

	/// Set the API version.
	pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
		self.api_version = version.into();
		self
	}

	/// Enable or disable CDN reads.
	pub fn with_cdn(mut self, use_cdn: bool) -> Self {
		self.use_cdn = use_cdn;
		self
	}

	/// Base URL for the live (write-capable) API host.
	pub fn api_base(&self) -> String {
		format!(
			"https://{}.api.sanity.io/v{}",
			self.project_id, self.api_version
		)
	}

	/// Base URL for read queries: the CDN edge when enabled, else the live host.
	pub fn query_base(&self) -> String {
		if self.use_cdn {
			format!(
				"https://{}.apicdn.sanity.io/v{}",
				self.project_id, self.api_version
			)
		} else {
			self.api_base()
		}
	}
}
