// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Magic link authentication HTTP handlers.
//!
//! Request a link, then exchange it for a session token. The request
//! endpoint answers with the same success shape for any valid email,
//! whether or not a document already existed and whether or not delivery
//! worked, so it leaks nothing about known addresses. Verification
//! failures are a single uniform 401.

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use superstudio_server_auth_magiclink::TokenKind;
use superstudio_server_email::LoginLinkEmail;
use superstudio_server_smtp::is_valid_email;
use superstudio_submissions_core::SubmissionId;

use crate::{api::AppState, error::ServerError, present::present_submission};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MagicLinkRequest {
	#[serde(default)]
	pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MagicLinkResponse {
	pub message: String,
	#[schema(value_type = String)]
	pub submission_id: SubmissionId,
	/// The raw login link, echoed back outside production so local setups
	/// work without email delivery.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub login_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyMagicLinkRequest {
	#[serde(default)]
	pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyMagicLinkResponse {
	pub session_token: String,
	#[schema(value_type = Object)]
	pub submission: serde_json::Value,
	pub email: String,
	#[schema(value_type = String)]
	pub submission_id: SubmissionId,
}

#[utoipa::path(
    post,
    path = "/api/auth/request-magic-link",
    request_body = MagicLinkRequest,
    responses(
        (status = 200, description = "Link generated", body = MagicLinkResponse),
        (status = 400, description = "Email missing or malformed", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
/// POST /api/auth/request-magic-link - Issue a login link for an email.
///
/// Ensures the submission document exists, mints a magic token, and hands
/// the link to the mailer. Delivery failure never fails the request.
pub async fn request_magic_link(
	State(state): State<AppState>,
	body: Result<Json<MagicLinkRequest>, JsonRejection>,
) -> Result<Json<MagicLinkResponse>, ServerError> {
	let Json(body) = body.map_err(|e| ServerError::Validation(e.body_text()))?;

	let email = body.email.unwrap_or_default();
	let email = email.trim();
	if email.is_empty() || !is_valid_email(email) {
		return Err(ServerError::Validation(
			"A valid email address is required".to_string(),
		));
	}

	let submission_id = state.repo.ensure(email).await?;
	let token = state.codec.issue(TokenKind::Magic, email)?;
	let login_url = format!("{}/submit?token={}", state.base_url, token);

	let expires_minutes = state.codec.ttl(TokenKind::Magic).num_minutes();
	state
		.email
		.send_login_link(&LoginLinkEmail {
			email: email.to_string(),
			login_url: login_url.clone(),
			expires_minutes,
		})
		.await;

	tracing::info!(submission_id = %submission_id, "magic link generated");

	Ok(Json(MagicLinkResponse {
		message: format!("A sign-in link has been generated. It expires in {expires_minutes} minutes."),
		submission_id,
		login_url: (!state.production).then_some(login_url),
	}))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-magic-link",
    request_body = VerifyMagicLinkRequest,
    responses(
        (status = 200, description = "Session issued", body = VerifyMagicLinkResponse),
        (status = 401, description = "Invalid or expired token", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
/// POST /api/auth/verify-magic-link - Exchange a magic token for a session.
///
/// Verifies the magic token, re-ensures the submission document, and
/// returns a session token alongside the current submission with derived
/// image URLs.
pub async fn verify_magic_link(
	State(state): State<AppState>,
	body: Result<Json<VerifyMagicLinkRequest>, JsonRejection>,
) -> Result<Json<VerifyMagicLinkResponse>, ServerError> {
	let Json(body) = body.map_err(|_| ServerError::Unauthorized)?;
	let token = body.token.unwrap_or_default();
	if token.is_empty() {
		return Err(ServerError::Unauthorized);
	}

	let claims = state
		.codec
		.verify(&token, TokenKind::Magic)
		.map_err(|_| ServerError::Unauthorized)?;

	// The document should exist from the request step, but the link can
	// outlive a store wipe.
	let submission_id = state.repo.ensure(&claims.email).await?;
	let submission = state
		.repo
		.get(&submission_id)
		.await?
		.ok_or_else(|| ServerError::Upstream(format!("{submission_id} missing after ensure")))?;

	let session_token = state.codec.issue(TokenKind::Session, &claims.email)?;

	tracing::info!(submission_id = %submission_id, "magic link verified, session issued");

	Ok(Json(VerifyMagicLinkResponse {
		session_token,
		submission: present_submission(&submission, &state.images),
		email: claims.email,
		submission_id,
	}))
}
