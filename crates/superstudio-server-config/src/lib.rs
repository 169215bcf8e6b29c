// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for the Superstudio server.
//!
//! Configuration comes from `SUPERSTUDIO_SERVER_*` environment variables
//! with built-in defaults, resolved once at startup into an immutable
//! [`ServerConfig`] that is passed by reference into each component; no
//! component reads the environment on its own after startup.
//!
//! # Usage
//!
//! ```ignore
//! let config = superstudio_server_config::load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod sections;

pub use error::ConfigError;
pub use sections::{AuthConfig, HttpConfig, LoggingConfig, UploadConfig};

use superstudio_server_content::ContentConfig;
use superstudio_server_smtp::SmtpConfig;
use tracing::info;

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub auth: AuthConfig,
	pub content: ContentConfig,
	pub smtp: Option<SmtpConfig>,
	pub upload: UploadConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from the environment.
///
/// Fails when a required value is missing (the token-signing secret, the
/// content project id) or any value is unparseable. Misconfiguration is
/// fatal at startup, not at first use.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let http = HttpConfig::from_env()?;
	let auth = AuthConfig::from_env()?;
	let content = sections::content_from_env()?;
	let smtp = SmtpConfig::from_env()?;
	let upload = UploadConfig::from_env()?;
	let logging = LoggingConfig::from_env();

	validate(&auth, &content)?;

	info!(
		host = %http.host,
		port = http.port,
		base_url = %http.base_url,
		environment = %auth.environment,
		content_project = %content.project_id,
		content_dataset = %content.dataset,
		content_writes_enabled = content.token.is_some(),
		smtp_configured = smtp.is_some(),
		"server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		auth,
		content,
		smtp,
		upload,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate(auth: &AuthConfig, content: &ContentConfig) -> Result<(), ConfigError> {
	if auth.magic_link_ttl_minutes <= 0 || auth.session_ttl_hours <= 0 {
		return Err(ConfigError::Validation(
			"token TTLs must be positive".to_string(),
		));
	}
	if auth.is_production() && content.token.is_none() {
		return Err(ConfigError::Validation(
			"SUPERSTUDIO_SERVER_CONTENT_TOKEN is required in production; \
			 submissions cannot be written without it"
				.to_string(),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;
	use superstudio_common_secret::SecretString;

	static ENV_MUTEX: Mutex<()> = Mutex::new(());

	const VARS: &[&str] = &[
		"SUPERSTUDIO_SERVER_HOST",
		"SUPERSTUDIO_SERVER_PORT",
		"SUPERSTUDIO_SERVER_BASE_URL",
		"SUPERSTUDIO_SERVER_AUTH_SECRET",
		"SUPERSTUDIO_SERVER_MAGIC_LINK_TTL_MINUTES",
		"SUPERSTUDIO_SERVER_SESSION_TTL_HOURS",
		"SUPERSTUDIO_SERVER_ENV",
		"SUPERSTUDIO_SERVER_CONTENT_PROJECT_ID",
		"SUPERSTUDIO_SERVER_CONTENT_DATASET",
		"SUPERSTUDIO_SERVER_CONTENT_API_VERSION",
		"SUPERSTUDIO_SERVER_CONTENT_TOKEN",
		"SUPERSTUDIO_SERVER_CONTENT_USE_CDN",
		"SUPERSTUDIO_SERVER_MAX_UPLOAD_BYTES",
		"SUPERSTUDIO_SERVER_LOG",
		"SUPERSTUDIO_SERVER_SMTP_HOST",
		"SUPERSTUDIO_SERVER_SMTP_FROM",
	];

	fn clear_env() {
		for key in VARS {
			std::env::remove_var(key);
		}
	}

	fn set_minimal_env() {
		std::env::set_var("SUPERSTUDIO_SERVER_AUTH_SECRET", "test-secret");
		std::env::set_var("SUPERSTUDIO_SERVER_CONTENT_PROJECT_ID", "0c912k6j");
	}

	#[test]
	fn loads_with_defaults() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		clear_env();
		set_minimal_env();

		let config = load_config().unwrap();
		assert_eq!(config.http.port, 3000);
		assert_eq!(config.http.base_url, "http://localhost:3000");
		assert_eq!(config.auth.magic_link_ttl_minutes, 15);
		assert_eq!(config.auth.session_ttl_hours, 2);
		assert!(!config.auth.is_production());
		assert_eq!(config.content.dataset, "production");
		assert!(config.content.use_cdn);
		assert!(config.smtp.is_none());
		assert_eq!(config.upload.max_upload_bytes, 10 * 1024 * 1024);
		assert_eq!(config.socket_addr(), "127.0.0.1:3000");

		clear_env();
	}

	#[test]
	fn missing_secret_is_fatal() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		clear_env();
		std::env::set_var("SUPERSTUDIO_SERVER_CONTENT_PROJECT_ID", "0c912k6j");

		assert!(matches!(
			load_config(),
			Err(ConfigError::Missing("SUPERSTUDIO_SERVER_AUTH_SECRET"))
		));

		clear_env();
	}

	#[test]
	fn missing_project_id_is_fatal() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		clear_env();
		std::env::set_var("SUPERSTUDIO_SERVER_AUTH_SECRET", "test-secret");

		assert!(matches!(
			load_config(),
			Err(ConfigError::Missing("SUPERSTUDIO_SERVER_CONTENT_PROJECT_ID"))
		));

		clear_env();
	}

	#[test]
	fn production_requires_write_token() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		clear_env();
		set_minimal_env();
		std::env::set_var("SUPERSTUDIO_SERVER_ENV", "production");

		assert!(matches!(load_config(), Err(ConfigError::Validation(_))));

		std::env::set_var("SUPERSTUDIO_SERVER_CONTENT_TOKEN", "sk-write");
		let config = load_config().unwrap();
		assert!(config.auth.is_production());

		clear_env();
	}

	#[test]
	fn base_url_trailing_slash_is_trimmed() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		clear_env();
		set_minimal_env();
		std::env::set_var("SUPERSTUDIO_SERVER_BASE_URL", "https://superstudio.example/");

		let config = load_config().unwrap();
		assert_eq!(config.http.base_url, "https://superstudio.example");

		clear_env();
	}

	#[test]
	fn invalid_port_is_rejected() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		clear_env();
		set_minimal_env();
		std::env::set_var("SUPERSTUDIO_SERVER_PORT", "not-a-port");

		assert!(matches!(load_config(), Err(ConfigError::Invalid { .. })));

		clear_env();
	}

	#[test]
	fn nonpositive_ttls_are_rejected() {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
		clear_env();
		set_minimal_env();
		std::env::set_var("SUPERSTUDIO_SERVER_MAGIC_LINK_TTL_MINUTES", "0");

		assert!(matches!(load_config(), Err(ConfigError::Validation(_))));

		clear_env();
	}

	#[test]
	fn validate_accepts_dev_without_write_token() {
		let auth = AuthConfig {
			secret: SecretString::new("s".to_string()),
			magic_link_ttl_minutes: 15,
			session_ttl_hours: 2,
			environment: "development".to_string(),
		};
		let content = ContentConfig::new("p", "d");
		assert!(validate(&auth, &content).is_ok());
	}
}
