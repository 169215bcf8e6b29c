// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error taxonomy and its single HTTP mapping.
//!
//! Four classes cover every handler failure:
//!
//! - [`ServerError::Validation`] - malformed client input, 400
//! - [`ServerError::Unauthorized`] - missing/expired/wrong-kind token, 401
//! - [`ServerError::NotConfigured`] - write credential absent, 500
//! - [`ServerError::Upstream`] - store/email/storage call failed, 500
//!
//! Token failures never tell the client which sub-case occurred, and 500s
//! carry a generic message; the detail goes to the log, not the response.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use superstudio_server_auth_magiclink::MagicLinkError;
use superstudio_server_content::ContentError;
use superstudio_server_submissions::SubmissionsError;

/// Error body returned to clients: a stable code and a human message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Malformed client input.
	#[error("validation error: {0}")]
	Validation(String),

	/// Missing, malformed, expired, or wrong-kind credential.
	#[error("unauthorized")]
	Unauthorized,

	/// An operation needs configuration this deployment does not have.
	#[error("not configured: {0}")]
	NotConfigured(String),

	/// An upstream collaborator (store, asset storage) failed.
	#[error("upstream failure: {0}")]
	Upstream(String),
}

impl From<MagicLinkError> for ServerError {
	fn from(e: MagicLinkError) -> Self {
		match e {
			MagicLinkError::InvalidToken => ServerError::Unauthorized,
			MagicLinkError::Encoding(e) => ServerError::Upstream(e.to_string()),
		}
	}
}

impl From<ContentError> for ServerError {
	fn from(e: ContentError) -> Self {
		match e {
			ContentError::NotConfigured(message) => ServerError::NotConfigured(message),
			other => ServerError::Upstream(other.to_string()),
		}
	}
}

impl From<SubmissionsError> for ServerError {
	fn from(e: SubmissionsError) -> Self {
		match e {
			SubmissionsError::Validation(message) => ServerError::Validation(message),
			SubmissionsError::Content(content) => content.into(),
			SubmissionsError::InvalidDocument(message) => ServerError::Upstream(message),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, error, message) = match &self {
			ServerError::Validation(message) => {
				(StatusCode::BAD_REQUEST, "validation_error", message.clone())
			}
			ServerError::Unauthorized => (
				StatusCode::UNAUTHORIZED,
				"unauthorized",
				"Invalid or expired token".to_string(),
			),
			ServerError::NotConfigured(detail) => {
				tracing::error!(detail = %detail, "operation unavailable: missing configuration");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					"not_configured",
					"The server is not configured for this operation".to_string(),
				)
			}
			ServerError::Upstream(detail) => {
				tracing::error!(detail = %detail, "upstream call failed");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					"internal_error",
					"Something went wrong. Please try again.".to_string(),
				)
			}
		};

		(
			status,
			Json(ErrorResponse {
				error: error.to_string(),
				message,
			}),
		)
			.into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unauthorized_has_one_generic_message() {
		// Expired, tampered, and wrong-kind tokens all reach handlers as
		// MagicLinkError::InvalidToken; the mapping must not re-introduce
		// cause detail.
		let err: ServerError = MagicLinkError::InvalidToken.into();
		assert!(matches!(err, ServerError::Unauthorized));
	}

	#[test]
	fn missing_write_token_maps_to_not_configured() {
		let err: ServerError = ContentError::NotConfigured("no token".to_string()).into();
		assert!(matches!(err, ServerError::NotConfigured(_)));
	}

	#[test]
	fn store_api_errors_map_to_upstream() {
		let err: ServerError = ContentError::Api {
			status: 502,
			message: "bad gateway".to_string(),
		}
		.into();
		assert!(matches!(err, ServerError::Upstream(_)));
	}

	#[test]
	fn validation_errors_pass_through() {
		let err: ServerError = SubmissionsError::Validation("allTags must be a list".to_string()).into();
		assert!(matches!(err, ServerError::Validation(_)));
	}
}
