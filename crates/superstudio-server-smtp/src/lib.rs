// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SMTP email client for Superstudio.
//!
//! Async SMTP delivery via [`lettre`] with multipart (HTML + plain text)
//! bodies, three TLS modes, optional authentication, and a bounded
//! connection timeout so a slow mail server can never stall the magic-link
//! request path. Passwords ride in [`SecretString`] and are never logged.
//!
//! SMTP is optional for this service: [`SmtpConfig::from_env`] returns
//! `Ok(None)` when no host is configured or delivery is explicitly
//! disabled, and the email layer falls back to logging login links.

use std::time::Duration;

use lettre::{
	message::{header::ContentType, Mailbox, MultiPart, SinglePart},
	transport::smtp::authentication::Credentials,
	AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use superstudio_common_secret::SecretString;

/// Upper bound on one SMTP conversation, connection included.
const SMTP_TIMEOUT_SECS: u64 = 10;

/// Errors that can occur during SMTP operations.
#[derive(Debug, thiserror::Error)]
pub enum SmtpError {
	/// Failed to connect to the SMTP server.
	#[error("connection failed: {0}")]
	Connection(String),

	/// Failed to send an email message.
	#[error("send failed: {0}")]
	Send(String),

	/// Invalid configuration (missing required fields, invalid values).
	#[error("invalid configuration: {0}")]
	Config(String),

	/// Invalid email address format.
	#[error("invalid email address: {0}")]
	Address(String),
}

/// TLS mode for SMTP connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
	/// No TLS (plain text connection).
	None,
	/// STARTTLS upgrade after connecting.
	#[default]
	StartTls,
	/// Direct TLS connection.
	Tls,
}

impl TlsMode {
	/// Parse a TLS mode from an environment variable value.
	///
	/// - "tls" or "true" -> Tls
	/// - "starttls" -> StartTls
	/// - "none" or "false" -> None
	pub fn from_env_value(value: &str) -> Result<Self, SmtpError> {
		match value.to_lowercase().as_str() {
			"true" | "tls" => Ok(TlsMode::Tls),
			"starttls" => Ok(TlsMode::StartTls),
			"false" | "none" => Ok(TlsMode::None),
			_ => Err(SmtpError::Config(format!(
				"Invalid SUPERSTUDIO_SERVER_SMTP_TLS value: '{value}'. Expected: tls, starttls, none"
			))),
		}
	}
}

/// Configuration for the SMTP client.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
	/// SMTP server hostname.
	pub host: String,
	/// SMTP server port. Common values: 25 (plain), 465 (TLS), 587 (STARTTLS).
	pub port: u16,
	/// Optional username for SMTP authentication.
	pub username: Option<String>,
	/// Optional password for SMTP authentication.
	pub password: Option<SecretString>,
	/// From address for outgoing emails.
	pub from_address: String,
	/// Display name for the sender.
	pub from_name: String,
	/// TLS mode for the connection.
	pub tls_mode: TlsMode,
}

impl SmtpConfig {
	/// Load SMTP configuration from environment variables.
	///
	/// Returns `Ok(None)` when SMTP is not configured
	/// (`SUPERSTUDIO_SERVER_SMTP_HOST` unset or empty) or explicitly
	/// disabled (`SUPERSTUDIO_SERVER_SMTP_DISABLED=1`). Returns `Err` when
	/// a host is set but the configuration is incomplete or invalid.
	///
	/// Environment variables:
	/// - `SUPERSTUDIO_SERVER_SMTP_DISABLED` - "1"/"true" disables delivery entirely
	/// - `SUPERSTUDIO_SERVER_SMTP_HOST` - SMTP server hostname
	/// - `SUPERSTUDIO_SERVER_SMTP_PORT` - SMTP server port (default: 587)
	/// - `SUPERSTUDIO_SERVER_SMTP_USERNAME` - username (optional)
	/// - `SUPERSTUDIO_SERVER_SMTP_PASSWORD` - password (optional)
	/// - `SUPERSTUDIO_SERVER_SMTP_FROM` - from address (required with host)
	/// - `SUPERSTUDIO_SERVER_SMTP_FROM_NAME` - sender display name (default: "Superstudio")
	/// - `SUPERSTUDIO_SERVER_SMTP_TLS` - tls, starttls, none (default: starttls)
	pub fn from_env() -> Result<Option<Self>, SmtpError> {
		let disabled = std::env::var("SUPERSTUDIO_SERVER_SMTP_DISABLED")
			.map(|v| v == "1" || v.to_lowercase() == "true")
			.unwrap_or(false);
		if disabled {
			return Ok(None);
		}

		let host = match std::env::var("SUPERSTUDIO_SERVER_SMTP_HOST") {
			Ok(h) if !h.is_empty() => h,
			_ => return Ok(None),
		};

		let port = match std::env::var("SUPERSTUDIO_SERVER_SMTP_PORT") {
			Ok(p) => p
				.parse::<u16>()
				.map_err(|e| SmtpError::Config(format!("Invalid SUPERSTUDIO_SERVER_SMTP_PORT: {e}")))?,
			Err(_) => 587,
		};

		let from_address = std::env::var("SUPERSTUDIO_SERVER_SMTP_FROM").map_err(|_| {
			SmtpError::Config(
				"SUPERSTUDIO_SERVER_SMTP_FROM is required when SUPERSTUDIO_SERVER_SMTP_HOST is set"
					.to_string(),
			)
		})?;
		if from_address.is_empty() {
			return Err(SmtpError::Config(
				"SUPERSTUDIO_SERVER_SMTP_FROM cannot be empty".to_string(),
			));
		}

		let username = std::env::var("SUPERSTUDIO_SERVER_SMTP_USERNAME")
			.ok()
			.filter(|s| !s.is_empty());
		let password = std::env::var("SUPERSTUDIO_SERVER_SMTP_PASSWORD")
			.ok()
			.filter(|s| !s.is_empty())
			.map(SecretString::new);

		let from_name =
			std::env::var("SUPERSTUDIO_SERVER_SMTP_FROM_NAME").unwrap_or_else(|_| "Superstudio".into());

		let tls_mode = match std::env::var("SUPERSTUDIO_SERVER_SMTP_TLS") {
			Ok(v) => TlsMode::from_env_value(&v)?,
			Err(_) => TlsMode::StartTls,
		};

		Ok(Some(Self {
			host,
			port,
			username,
			password,
			from_address,
			from_name,
			tls_mode,
		}))
	}

	/// Check if authentication credentials are configured.
	pub fn has_auth(&self) -> bool {
		self.username.is_some() && self.password.is_some()
	}
}

/// Async SMTP client for sending login-link emails.
///
/// The connection is made lazily on the first send; [`lettre`] pools it
/// afterwards.
pub struct SmtpClient {
	transport: AsyncSmtpTransport<Tokio1Executor>,
	from_mailbox: Mailbox,
}

impl SmtpClient {
	/// Create a new SMTP client from the given configuration.
	#[tracing::instrument(
        name = "smtp_client_new",
        skip(config),
        fields(host = %config.host, port = %config.port, tls = ?config.tls_mode)
    )]
	pub fn new(config: SmtpConfig) -> Result<Self, SmtpError> {
		let from_mailbox: Mailbox = format!("{} <{}>", config.from_name, config.from_address)
			.parse()
			.map_err(|e| SmtpError::Address(format!("{e}")))?;

		let builder = match config.tls_mode {
			TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
				.map_err(|e| SmtpError::Connection(format!("{e}")))?,
			TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
				.map_err(|e| SmtpError::Connection(format!("{e}")))?,
			TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
		};

		let mut builder = builder
			.port(config.port)
			.timeout(Some(Duration::from_secs(SMTP_TIMEOUT_SECS)));

		if let (Some(username), Some(password)) = (config.username, config.password) {
			builder = builder.credentials(Credentials::new(username, password.into_inner()));
		}

		let transport = builder.build();

		tracing::debug!("SMTP client initialized");

		Ok(Self {
			transport,
			from_mailbox,
		})
	}

	/// Check if the SMTP server is reachable and responding.
	#[tracing::instrument(name = "smtp_check_health", skip(self))]
	pub async fn check_health(&self) -> Result<(), SmtpError> {
		self.transport
			.test_connection()
			.await
			.map_err(|e| SmtpError::Connection(format!("{e}")))?;
		tracing::debug!("SMTP server is healthy");
		Ok(())
	}

	/// Send a multipart email (HTML and plain text) to a recipient.
	///
	/// The recipient's email client chooses which version to display.
	#[tracing::instrument(
        name = "smtp_send_email",
        skip(self, body_html, body_text),
        fields(to = %to, subject = %subject)
    )]
	pub async fn send_email(
		&self,
		to: &str,
		subject: &str,
		body_html: &str,
		body_text: &str,
	) -> Result<(), SmtpError> {
		let to_mailbox: Mailbox = to.parse().map_err(|e| SmtpError::Address(format!("{e}")))?;

		let message = Message::builder()
			.from(self.from_mailbox.clone())
			.to(to_mailbox)
			.subject(subject)
			.multipart(
				MultiPart::alternative()
					.singlepart(
						SinglePart::builder()
							.header(ContentType::TEXT_PLAIN)
							.body(body_text.to_string()),
					)
					.singlepart(
						SinglePart::builder()
							.header(ContentType::TEXT_HTML)
							.body(body_html.to_string()),
					),
			)
			.map_err(|e| SmtpError::Send(format!("failed to build message: {e}")))?;

		self.transport
			.send(message)
			.await
			.map_err(|e| SmtpError::Send(format!("{e}")))?;

		tracing::info!("email sent");

		Ok(())
	}
}

/// Validate an email address format using [`lettre`]'s [`Mailbox`] parser.
///
/// Validates the format only, not whether the address exists.
pub fn is_valid_email(email: &str) -> bool {
	email.parse::<Mailbox>().is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;

	static ENV_MUTEX: Mutex<()> = Mutex::new(());

	fn clear_smtp_env() {
		for key in [
			"SUPERSTUDIO_SERVER_SMTP_DISABLED",
			"SUPERSTUDIO_SERVER_SMTP_HOST",
			"SUPERSTUDIO_SERVER_SMTP_PORT",
			"SUPERSTUDIO_SERVER_SMTP_USERNAME",
			"SUPERSTUDIO_SERVER_SMTP_PASSWORD",
			"SUPERSTUDIO_SERVER_SMTP_FROM",
			"SUPERSTUDIO_SERVER_SMTP_FROM_NAME",
			"SUPERSTUDIO_SERVER_SMTP_TLS",
		] {
			std::env::remove_var(key);
		}
	}

	mod tls_mode {
		use super::*;

		#[test]
		fn parses_tls() {
			assert_eq!(TlsMode::from_env_value("tls").unwrap(), TlsMode::Tls);
			assert_eq!(TlsMode::from_env_value("TRUE").unwrap(), TlsMode::Tls);
		}

		#[test]
		fn parses_starttls() {
			assert_eq!(TlsMode::from_env_value("starttls").unwrap(), TlsMode::StartTls);
		}

		#[test]
		fn parses_none() {
			assert_eq!(TlsMode::from_env_value("none").unwrap(), TlsMode::None);
			assert_eq!(TlsMode::from_env_value("false").unwrap(), TlsMode::None);
		}

		#[test]
		fn rejects_invalid_value() {
			assert!(TlsMode::from_env_value("quantum").is_err());
		}

		#[test]
		fn default_is_starttls() {
			assert_eq!(TlsMode::default(), TlsMode::StartTls);
		}
	}

	mod smtp_config {
		use super::*;

		#[test]
		fn returns_none_when_host_not_set() {
			let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
			clear_smtp_env();
			assert!(SmtpConfig::from_env().unwrap().is_none());
		}

		#[test]
		fn returns_none_when_disabled() {
			let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
			clear_smtp_env();
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_HOST", "smtp.example.com");
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_FROM", "noreply@example.com");
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_DISABLED", "1");
			assert!(SmtpConfig::from_env().unwrap().is_none());
			clear_smtp_env();
		}

		#[test]
		fn requires_from_address_when_host_set() {
			let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
			clear_smtp_env();
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_HOST", "smtp.example.com");
			assert!(SmtpConfig::from_env().is_err());
			clear_smtp_env();
		}

		#[test]
		fn parses_minimal_config() {
			let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
			clear_smtp_env();
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_HOST", "smtp.example.com");
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_FROM", "noreply@example.com");

			let config = SmtpConfig::from_env().unwrap().unwrap();
			assert_eq!(config.host, "smtp.example.com");
			assert_eq!(config.port, 587);
			assert_eq!(config.from_address, "noreply@example.com");
			assert_eq!(config.from_name, "Superstudio");
			assert_eq!(config.tls_mode, TlsMode::StartTls);
			assert!(!config.has_auth());

			clear_smtp_env();
		}

		#[test]
		fn parses_full_config() {
			let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
			clear_smtp_env();
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_HOST", "smtp.example.com");
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_PORT", "465");
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_USERNAME", "mailer");
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_PASSWORD", "secret123");
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_FROM", "noreply@example.com");
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_TLS", "tls");

			let config = SmtpConfig::from_env().unwrap().unwrap();
			assert_eq!(config.port, 465);
			assert_eq!(config.tls_mode, TlsMode::Tls);
			assert!(config.has_auth());

			clear_smtp_env();
		}

		#[test]
		fn rejects_invalid_port() {
			let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
			clear_smtp_env();
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_HOST", "smtp.example.com");
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_PORT", "not_a_port");
			std::env::set_var("SUPERSTUDIO_SERVER_SMTP_FROM", "noreply@example.com");
			assert!(SmtpConfig::from_env().is_err());
			clear_smtp_env();
		}

		#[test]
		fn config_debug_does_not_leak_password() {
			let config = SmtpConfig {
				host: "smtp.example.com".to_string(),
				port: 587,
				username: Some("mailer".to_string()),
				password: Some(SecretString::new("super-secret-password".to_string())),
				from_address: "noreply@example.com".to_string(),
				from_name: "Superstudio".to_string(),
				tls_mode: TlsMode::StartTls,
			};
			let debug = format!("{config:?}");
			assert!(!debug.contains("super-secret-password"));
			assert!(debug.contains("[REDACTED]"));
		}
	}

	mod email_validation {
		use super::*;

		#[test]
		fn valid_addresses() {
			assert!(is_valid_email("student@example.com"));
			assert!(is_valid_email("Student Name <student@example.edu>"));
			assert!(is_valid_email("student+studio@mail.example.com"));
		}

		#[test]
		fn invalid_addresses() {
			assert!(!is_valid_email(""));
			assert!(!is_valid_email("studentexample.com"));
			assert!(!is_valid_email("student@"));
			assert!(!is_valid_email("@example.com"));
		}
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;

		proptest! {
			#[test]
			fn valid_emails_are_accepted(
				local in "[a-zA-Z][a-zA-Z0-9]{0,30}",
				domain in "[a-zA-Z][a-zA-Z0-9]{0,20}",
				tld in "(com|org|edu|io)"
			) {
				let email = format!("{local}@{domain}.{tld}");
				prop_assert!(is_valid_email(&email));
			}

			#[test]
			fn no_at_symbol_is_invalid(s in "[a-zA-Z0-9._%+-]{1,50}") {
				prop_assume!(!s.contains('@'));
				prop_assert!(!is_valid_email(&s));
			}
		}
	}
}
