// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login-link email dispatch for Superstudio.
//!
//! Renders the magic-link email and hands it to the SMTP client. Delivery
//! is best-effort by contract: when no transport is configured, or the
//! transport fails or times out, the link is logged for operator visibility
//! and the caller still gets success. A submitter must always receive the
//! "a link was generated" response regardless of mail-server health.

use std::sync::Arc;

use superstudio_server_smtp::SmtpClient;

/// The magic-link login email, pre-render.
#[derive(Debug, Clone)]
pub struct LoginLinkEmail {
	/// Recipient address.
	pub email: String,
	/// The full callback URL embedding the magic token.
	pub login_url: String,
	/// Minutes until the link expires, shown in the body.
	pub expires_minutes: i64,
}

impl LoginLinkEmail {
	/// Render to (subject, text body, html body).
	pub fn render(&self) -> (String, String, String) {
		let subject = "Sign in to Superstudio".to_string();
		let text = format!(
			"Open this link to edit your studio submission:\n\n{}\n\n\
			 The link expires in {} minutes. If you did not request it, you can ignore this email.",
			self.login_url, self.expires_minutes
		);
		let html = format!(
			"<p>Open this link to edit your studio submission:</p>\
			 <p><a href=\"{url}\">{url}</a></p>\
			 <p>The link expires in {mins} minutes. If you did not request it, you can ignore this email.</p>",
			url = self.login_url,
			mins = self.expires_minutes
		);
		(subject, text, html)
	}
}

/// Email dispatch with a console-logging fallback.
///
/// Holds the SMTP client when one is configured. `None` is a valid,
/// first-class state used in development and in deployments that read the
/// login link from the request-magic-link response instead.
#[derive(Clone)]
pub struct EmailService {
	client: Option<Arc<SmtpClient>>,
}

impl EmailService {
	pub fn new(client: Option<Arc<SmtpClient>>) -> Self {
		Self { client }
	}

	/// Whether a transport is configured.
	pub fn is_configured(&self) -> bool {
		self.client.is_some()
	}

	/// Send a magic-link login email.
	///
	/// Never fails: transport errors are logged together with the link so
	/// an operator can relay it manually, and the flow continues.
	pub async fn send_login_link(&self, message: &LoginLinkEmail) {
		let Some(client) = &self.client else {
			tracing::info!(
				email = %message.email,
				login_url = %message.login_url,
				"SMTP not configured; magic link logged instead of emailed"
			);
			return;
		};

		let (subject, text, html) = message.render();
		if let Err(e) = client.send_email(&message.email, &subject, &html, &text).await {
			tracing::error!(
				error = %e,
				email = %message.email,
				login_url = %message.login_url,
				"failed to deliver magic link email; link logged instead"
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn message() -> LoginLinkEmail {
		LoginLinkEmail {
			email: "student@example.com".to_string(),
			login_url: "https://superstudio.example/submit?token=abc123".to_string(),
			expires_minutes: 15,
		}
	}

	mod render {
		use super::*;

		#[test]
		fn subject_names_the_service() {
			let (subject, _, _) = message().render();
			assert_eq!(subject, "Sign in to Superstudio");
		}

		#[test]
		fn bodies_contain_link_and_expiry() {
			let (_, text, html) = message().render();
			assert!(text.contains("https://superstudio.example/submit?token=abc123"));
			assert!(text.contains("15 minutes"));
			assert!(html.contains("href=\"https://superstudio.example/submit?token=abc123\""));
			assert!(html.contains("15 minutes"));
		}
	}

	mod dispatch {
		use super::*;

		#[tokio::test]
		async fn unconfigured_service_does_not_fail() {
			let service = EmailService::new(None);
			assert!(!service.is_configured());
			// Falls back to logging; must not panic or error.
			service.send_login_link(&message()).await;
		}
	}
}
