// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections, one per concern.

use superstudio_common_secret::SecretString;
use superstudio_server_content::ContentConfig;

use crate::error::ConfigError;

/// HTTP listener and public URL configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
	/// Bind host.
	pub host: String,
	/// Bind port.
	pub port: u16,
	/// Public base URL used to build magic-link callback URLs.
	pub base_url: String,
}

impl HttpConfig {
	pub(crate) fn from_env() -> Result<Self, ConfigError> {
		let host = env_or("SUPERSTUDIO_SERVER_HOST", "127.0.0.1");
		let port = parse_env("SUPERSTUDIO_SERVER_PORT", 3000u16)?;
		let base_url = std::env::var("SUPERSTUDIO_SERVER_BASE_URL")
			.unwrap_or_else(|_| format!("http://localhost:{port}"));
		Ok(Self {
			host,
			port,
			base_url: base_url.trim_end_matches('/').to_string(),
		})
	}
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_string(),
			port: 3000,
			base_url: "http://localhost:3000".to_string(),
		}
	}
}

/// Token signing and environment configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Signing secret for magic-link and session tokens. Required; the
	/// server refuses to start without it.
	pub secret: SecretString,
	/// Magic-link token lifetime in minutes.
	pub magic_link_ttl_minutes: i64,
	/// Session token lifetime in hours.
	pub session_ttl_hours: i64,
	/// Deployment environment name (`development`, `production`, ...).
	pub environment: String,
}

impl AuthConfig {
	pub(crate) fn from_env() -> Result<Self, ConfigError> {
		let secret = std::env::var("SUPERSTUDIO_SERVER_AUTH_SECRET")
			.ok()
			.filter(|s| !s.is_empty())
			.map(SecretString::new)
			.ok_or(ConfigError::Missing("SUPERSTUDIO_SERVER_AUTH_SECRET"))?;

		Ok(Self {
			secret,
			magic_link_ttl_minutes: parse_env("SUPERSTUDIO_SERVER_MAGIC_LINK_TTL_MINUTES", 15i64)?,
			session_ttl_hours: parse_env("SUPERSTUDIO_SERVER_SESSION_TTL_HOURS", 2i64)?,
			environment: env_or("SUPERSTUDIO_SERVER_ENV", "development"),
		})
	}

	/// Whether this deployment is production. Controls whether the raw
	/// login URL is echoed back from the request-magic-link endpoint.
	pub fn is_production(&self) -> bool {
		self.environment.eq_ignore_ascii_case("production")
	}
}

/// Build the content store configuration from the environment.
pub(crate) fn content_from_env() -> Result<ContentConfig, ConfigError> {
	let project_id = std::env::var("SUPERSTUDIO_SERVER_CONTENT_PROJECT_ID")
		.ok()
		.filter(|s| !s.is_empty())
		.ok_or(ConfigError::Missing("SUPERSTUDIO_SERVER_CONTENT_PROJECT_ID"))?;
	let dataset = env_or("SUPERSTUDIO_SERVER_CONTENT_DATASET", "production");

	let token = std::env::var("SUPERSTUDIO_SERVER_CONTENT_TOKEN")
		.ok()
		.filter(|s| !s.is_empty())
		.map(SecretString::new);

	let use_cdn = match std::env::var("SUPERSTUDIO_SERVER_CONTENT_USE_CDN") {
		Ok(v) => !(v == "0" || v.eq_ignore_ascii_case("false")),
		Err(_) => true,
	};

	let mut config = ContentConfig::new(project_id, dataset)
		.with_token(token)
		.with_cdn(use_cdn);
	if let Ok(version) = std::env::var("SUPERSTUDIO_SERVER_CONTENT_API_VERSION") {
		if !version.is_empty() {
			config = config.with_api_version(version);
		}
	}
	Ok(config)
}

/// Upload limits.
#[derive(Debug, Clone)]
pub struct UploadConfig {
	/// Ceiling on uploaded image size in bytes.
	pub max_upload_bytes: usize,
}

impl UploadConfig {
	pub(crate) fn from_env() -> Result<Self, ConfigError> {
		Ok(Self {
			max_upload_bytes: parse_env("SUPERSTUDIO_SERVER_MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
		})
	}
}

impl Default for UploadConfig {
	fn default() -> Self {
		Self {
			max_upload_bytes: 10 * 1024 * 1024,
		}
	}
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
	/// Default tracing filter when `RUST_LOG` is unset.
	pub level: String,
}

impl LoggingConfig {
	pub(crate) fn from_env() -> Self {
		Self {
			level: env_or("SUPERSTUDIO_SERVER_LOG", "info"),
		}
	}
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
		}
	}
}

fn env_or(name: &str, default: &str) -> String {
	std::env::var(name)
		.ok()
		.filter(|s| !s.is_empty())
		.unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	match std::env::var(name) {
		Ok(raw) if !raw.is_empty() => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
			name,
			message: e.to_string(),
		}),
		_ => Ok(default),
	}
}
