// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Magic link passwordless authentication for Superstudio.
//!
//! Students authenticate by email possession alone: the server mints a
//! short-lived signed token, mails it as a link, and exchanges it for a
//! longer-lived session token on verification. Both token kinds share one
//! signing secret and differ only in their `kind` claim and TTL.
//!
//! # The Flow
//!
//! ```text
//! ┌─────────┐                              ┌─────────┐
//! │ Browser │                              │ Server  │
//! └────┬────┘                              └────┬────┘
//!      │  POST /api/auth/request-magic-link    │
//!      │───────────────────────────────────────>│ ensure submission,
//!      │                                        │ mint magic token,
//!      │  {message, submissionId}               │ email the link
//!      │<───────────────────────────────────────│
//!      │                                        │
//!      │  POST /api/auth/verify-magic-link      │
//!      │───────────────────────────────────────>│ verify magic token,
//!      │                                        │ mint session token
//!      │  {sessionToken, submission, email}     │
//!      │<───────────────────────────────────────│
//!      │                                        │
//!      │  Authorization: Bearer <sessionToken>  │
//!      │───────────────────────────────────────>│ verify session token,
//!      │                                        │ scope to submission id
//! ```
//!
//! # Token format
//!
//! `base64url(claims JSON) . hex(HMAC-SHA256(payload))`. No server-side
//! token store exists; possession of an unexpired, correctly-signed token
//! of the right kind is the entire credential.
//!
//! # Security Properties
//!
//! - Verification failures collapse to a single [`MagicLinkError::InvalidToken`]
//!   so callers cannot distinguish expired, tampered, and wrong-kind tokens
//! - The submission identifier inside the claims is the only identifier the
//!   server will act on; clients never supply one
//! - Signatures are checked with a constant-time comparison via [`hmac::Mac`]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use superstudio_common_secret::SecretString;

type HmacSha256 = Hmac<Sha256>;

/// Default magic link token lifetime in minutes.
pub const MAGIC_TOKEN_TTL_MINUTES: i64 = 15;

/// Default session token lifetime in hours.
pub const SESSION_TOKEN_TTL_HOURS: i64 = 2;

/// Document id prefix for submission documents in the content store.
pub const SUBMISSION_ID_PREFIX: &str = "studentSubmission-";

/// Errors from token issuance and verification.
#[derive(Debug, thiserror::Error)]
pub enum MagicLinkError {
	/// The token failed verification. Deliberately cause-free: expired,
	/// tampered, malformed, and wrong-kind tokens all land here so the
	/// HTTP layer answers with one uniform 401.
	#[error("invalid or expired token")]
	InvalidToken,

	/// Claims could not be serialized. Indicates a bug, not bad input.
	#[error("failed to encode token claims: {0}")]
	Encoding(#[from] serde_json::Error),
}

/// The two token kinds minted by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
	/// Short-lived token embedded in the emailed login link.
	Magic,
	/// Longer-lived bearer credential issued after link verification.
	Session,
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenKind::Magic => write!(f, "magic"),
			TokenKind::Session => write!(f, "session"),
		}
	}
}

/// Claims carried inside every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// Normalized submitter email.
	pub email: String,
	/// Deterministic submission document id derived from the email.
	pub submission_id: String,
	/// Token kind discriminator.
	pub kind: TokenKind,
	/// Issued-at, unix seconds.
	pub iat: i64,
	/// Expiry, unix seconds.
	pub exp: i64,
}

impl TokenClaims {
	/// Whether the token has expired as of `now`.
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		now.timestamp() >= self.exp
	}
}

/// Normalize an email for use as an identity key: trim and lower-case.
pub fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

/// Derive the deterministic submission document id for an email.
///
/// The id is `studentSubmission-` followed by the first 32 hex characters of
/// the SHA-256 of the normalized email. Identical normalized emails always
/// map to the same id; this is the sole mechanism preventing duplicate
/// documents per submitter.
pub fn submission_id_for_email(email: &str) -> String {
	let digest = Sha256::digest(normalize_email(email).as_bytes());
	let hash = hex::encode(digest);
	format!("{SUBMISSION_ID_PREFIX}{}", &hash[..32])
}

/// Issues and verifies signed tokens with a process-wide secret.
///
/// Constructed once at startup from configuration and shared by reference;
/// the secret is immutable for the life of the process.
#[derive(Clone)]
pub struct TokenCodec {
	secret: std::sync::Arc<SecretString>,
	magic_ttl: Duration,
	session_ttl: Duration,
}

impl TokenCodec {
	/// Create a codec with the default TTLs (15 minutes / 2 hours).
	pub fn new(secret: SecretString) -> Self {
		Self::with_ttls(
			secret,
			Duration::minutes(MAGIC_TOKEN_TTL_MINUTES),
			Duration::hours(SESSION_TOKEN_TTL_HOURS),
		)
	}

	/// Create a codec with explicit TTLs.
	pub fn with_ttls(secret: SecretString, magic_ttl: Duration, session_ttl: Duration) -> Self {
		Self {
			secret: std::sync::Arc::new(secret),
			magic_ttl,
			session_ttl,
		}
	}

	/// The configured TTL for a token kind.
	pub fn ttl(&self, kind: TokenKind) -> Duration {
		match kind {
			TokenKind::Magic => self.magic_ttl,
			TokenKind::Session => self.session_ttl,
		}
	}

	/// Issue a signed token of the given kind for an email.
	///
	/// The submission id is derived from the email, never caller-supplied.
	pub fn issue(&self, kind: TokenKind, email: &str) -> Result<String, MagicLinkError> {
		let email = normalize_email(email);
		let now = Utc::now();
		let claims = TokenClaims {
			submission_id: submission_id_for_email(&email),
			email,
			kind,
			iat: now.timestamp(),
			exp: (now + self.ttl(kind)).timestamp(),
		};
		self.issue_claims(&claims)
	}

	fn issue_claims(&self, claims: &TokenClaims) -> Result<String, MagicLinkError> {
		let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
		let signature = sign(self.secret.expose().as_bytes(), payload.as_bytes());
		Ok(format!("{payload}.{signature}"))
	}

	/// Verify a token and check it is of the expected kind.
	///
	/// Signature, expiry, and kind are all checked; every failure returns
	/// the same [`MagicLinkError::InvalidToken`]. The specific cause is
	/// logged at debug level only.
	pub fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, MagicLinkError> {
		let (payload, signature) = token.split_once('.').ok_or_else(|| {
			tracing::debug!("token rejected: missing signature separator");
			MagicLinkError::InvalidToken
		})?;

		if !verify_signature(self.secret.expose().as_bytes(), payload.as_bytes(), signature) {
			tracing::debug!("token rejected: signature mismatch");
			return Err(MagicLinkError::InvalidToken);
		}

		let decoded = URL_SAFE_NO_PAD.decode(payload).map_err(|_| {
			tracing::debug!("token rejected: payload is not base64url");
			MagicLinkError::InvalidToken
		})?;
		let claims: TokenClaims = serde_json::from_slice(&decoded).map_err(|_| {
			tracing::debug!("token rejected: claims are not valid JSON");
			MagicLinkError::InvalidToken
		})?;

		if claims.is_expired_at(Utc::now()) {
			tracing::debug!(kind = %claims.kind, "token rejected: expired");
			return Err(MagicLinkError::InvalidToken);
		}

		if claims.kind != expected {
			tracing::debug!(kind = %claims.kind, expected = %expected, "token rejected: kind mismatch");
			return Err(MagicLinkError::InvalidToken);
		}

		Ok(claims)
	}
}

impl fmt::Debug for TokenCodec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TokenCodec")
			.field("magic_ttl", &self.magic_ttl)
			.field("session_ttl", &self.session_ttl)
			.finish_non_exhaustive()
	}
}

fn sign(secret: &[u8], payload: &[u8]) -> String {
	let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
	mac.update(payload);
	hex::encode(mac.finalize().into_bytes())
}

fn verify_signature(secret: &[u8], payload: &[u8], signature: &str) -> bool {
	let expected = match hex::decode(signature) {
		Ok(bytes) => bytes,
		Err(_) => return false,
	};
	let mut mac = match HmacSha256::new_from_slice(secret) {
		Ok(m) => m,
		Err(_) => return false,
	};
	mac.update(payload);
	mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn codec() -> TokenCodec {
		TokenCodec::new(SecretString::new("test-signing-secret".to_string()))
	}

	mod email_identity {
		use super::*;

		#[test]
		fn normalize_trims_and_lowercases() {
			assert_eq!(normalize_email("  Student@Example.COM  "), "student@example.com");
		}

		#[test]
		fn same_email_variants_share_an_id() {
			let a = submission_id_for_email("student@example.com");
			let b = submission_id_for_email("  STUDENT@example.com ");
			assert_eq!(a, b);
		}

		#[test]
		fn distinct_emails_get_distinct_ids() {
			let a = submission_id_for_email("a@example.com");
			let b = submission_id_for_email("b@example.com");
			assert_ne!(a, b);
		}

		#[test]
		fn id_has_document_prefix() {
			let id = submission_id_for_email("student@example.com");
			assert!(id.starts_with(SUBMISSION_ID_PREFIX));
			assert_eq!(id.len(), SUBMISSION_ID_PREFIX.len() + 32);
		}
	}

	mod issue_and_verify {
		use super::*;

		#[test]
		fn roundtrip_magic_token() {
			let codec = codec();
			let token = codec.issue(TokenKind::Magic, "Student@Example.com").unwrap();
			let claims = codec.verify(&token, TokenKind::Magic).unwrap();
			assert_eq!(claims.email, "student@example.com");
			assert_eq!(claims.submission_id, submission_id_for_email("student@example.com"));
			assert_eq!(claims.kind, TokenKind::Magic);
		}

		#[test]
		fn roundtrip_session_token() {
			let codec = codec();
			let token = codec.issue(TokenKind::Session, "student@example.com").unwrap();
			let claims = codec.verify(&token, TokenKind::Session).unwrap();
			assert_eq!(claims.kind, TokenKind::Session);
		}

		#[test]
		fn magic_token_fails_session_verification() {
			let codec = codec();
			let token = codec.issue(TokenKind::Magic, "student@example.com").unwrap();
			assert!(codec.verify(&token, TokenKind::Session).is_err());
		}

		#[test]
		fn session_token_fails_magic_verification() {
			let codec = codec();
			let token = codec.issue(TokenKind::Session, "student@example.com").unwrap();
			assert!(codec.verify(&token, TokenKind::Magic).is_err());
		}

		#[test]
		fn expired_token_fails_even_with_valid_signature() {
			let codec = TokenCodec::with_ttls(
				SecretString::new("test-signing-secret".to_string()),
				Duration::minutes(-1),
				Duration::minutes(-1),
			);
			let token = codec.issue(TokenKind::Magic, "student@example.com").unwrap();
			assert!(codec.verify(&token, TokenKind::Magic).is_err());
		}

		#[test]
		fn token_signed_with_different_secret_fails() {
			let token = codec().issue(TokenKind::Session, "student@example.com").unwrap();
			let other = TokenCodec::new(SecretString::new("other-secret".to_string()));
			assert!(other.verify(&token, TokenKind::Session).is_err());
		}

		#[test]
		fn tampered_payload_fails() {
			let codec = codec();
			let token = codec.issue(TokenKind::Session, "student@example.com").unwrap();
			let (payload, signature) = token.split_once('.').unwrap();
			let forged = URL_SAFE_NO_PAD.encode(
				URL_SAFE_NO_PAD
					.decode(payload)
					.unwrap()
					.iter()
					.map(|b| b ^ 1)
					.collect::<Vec<_>>(),
			);
			assert!(codec.verify(&format!("{forged}.{signature}"), TokenKind::Session).is_err());
		}

		#[test]
		fn garbage_tokens_fail() {
			let codec = codec();
			assert!(codec.verify("", TokenKind::Session).is_err());
			assert!(codec.verify("no-separator", TokenKind::Session).is_err());
			assert!(codec.verify("a.b", TokenKind::Session).is_err());
		}

		#[test]
		fn debug_does_not_leak_secret() {
			let debug = format!("{:?}", codec());
			assert!(!debug.contains("test-signing-secret"));
		}
	}
}

#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn prop_roundtrip_any_email(
			local in "[a-z][a-z0-9]{0,20}",
			domain in "[a-z][a-z0-9]{0,15}"
		) {
			let email = format!("{local}@{domain}.edu");
			let codec = TokenCodec::new(SecretString::new("prop-secret".to_string()));
			let token = codec.issue(TokenKind::Magic, &email).unwrap();
			let claims = codec.verify(&token, TokenKind::Magic).unwrap();
			prop_assert_eq!(claims.email, email);
		}

		#[test]
		fn prop_submission_id_is_stable_under_case_and_whitespace(
			local in "[a-z][a-z0-9]{0,20}",
			domain in "[a-z][a-z0-9]{0,15}"
		) {
			let email = format!("{local}@{domain}.edu");
			let shouty = format!("  {}  ", email.to_uppercase());
			prop_assert_eq!(submission_id_for_email(&email), submission_id_for_email(&shouty));
		}

		#[test]
		fn prop_wrong_secret_never_verifies(
			secret1 in "[a-zA-Z0-9]{8,32}",
			secret2 in "[a-zA-Z0-9]{8,32}"
		) {
			if secret1 != secret2 {
				let codec1 = TokenCodec::new(SecretString::new(secret1));
				let codec2 = TokenCodec::new(SecretString::new(secret2));
				let token = codec1.issue(TokenKind::Session, "student@example.com").unwrap();
				prop_assert!(codec2.verify(&token, TokenKind::Session).is_err());
			}
		}
	}
}
