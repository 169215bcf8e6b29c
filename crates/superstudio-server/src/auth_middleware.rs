// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session authentication for protected routes.
//!
//! There is no server-side session store: the bearer token is the entire
//! credential. [`RequireSubmitter`] verifies it as a session token and
//! hands the handler the identity baked into the claims. The submission id
//! always comes from the verified token, never from request input, so a
//! caller can only ever read or mutate their own document.

use axum::{extract::FromRequestParts, http::request::Parts};
use http::header::AUTHORIZATION;
use http::HeaderMap;

use superstudio_server_auth_magiclink::TokenKind;
use superstudio_submissions_core::SubmissionId;

use crate::{api::AppState, error::ServerError};

/// The authenticated submitter, as carried by a verified session token.
#[derive(Debug, Clone)]
pub struct SubmitterIdentity {
	pub email: String,
	pub submission_id: SubmissionId,
}

/// Extractor that rejects the request with 401 unless it carries a valid
/// session token.
#[derive(Debug, Clone)]
pub struct RequireSubmitter(pub SubmitterIdentity);

impl FromRequestParts<AppState> for RequireSubmitter {
	type Rejection = ServerError;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let token = extract_bearer_token(&parts.headers).ok_or(ServerError::Unauthorized)?;
		if token.is_empty() {
			return Err(ServerError::Unauthorized);
		}

		let claims = state
			.codec
			.verify(&token, TokenKind::Session)
			.map_err(|_| ServerError::Unauthorized)?;

		Ok(RequireSubmitter(SubmitterIdentity {
			email: claims.email,
			submission_id: SubmissionId::new(claims.submission_id),
		}))
	}
}

/// Extract a bearer token from the Authorization header.
///
/// Expects `Authorization: Bearer <token>`; anything else is `None`. The
/// returned value is a credential; never log it.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	headers
		.get(AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
		.map(|token| token.to_string())
}
