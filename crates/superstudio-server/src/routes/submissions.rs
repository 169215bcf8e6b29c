// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Submission editing HTTP handlers.
//!
//! All three handlers are scoped to the submission id carried by the
//! verified session token; no client-supplied identifier is ever accepted,
//! so a submitter can only touch their own document.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;

use superstudio_submissions_core::UpdateSubmissionRequest;

use crate::{
	api::AppState,
	auth_middleware::RequireSubmitter,
	error::ServerError,
	present::present_submission,
};

/// Response for a successful image upload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
	pub asset_id: String,
	/// The image object ready to drop into a submission field.
	#[schema(value_type = Object)]
	pub image: Value,
	pub url: String,
}

#[utoipa::path(
    get,
    path = "/api/submissions/me",
    responses(
        (status = 200, description = "The caller's submission"),
        (status = 401, description = "Missing or invalid session token", body = crate::error::ErrorResponse)
    ),
    tag = "submissions",
    security(("bearer_session" = []))
)]
/// GET /api/submissions/me - Fetch the caller's submission.
pub async fn get_own_submission(
	State(state): State<AppState>,
	RequireSubmitter(identity): RequireSubmitter,
) -> Result<Json<Value>, ServerError> {
	let submission = match state.repo.get(&identity.submission_id).await? {
		Some(submission) => submission,
		None => {
			// The document can lag the token after a store wipe; recreate it
			// from the verified identity rather than failing the session.
			state.repo.ensure(&identity.email).await?;
			state
				.repo
				.get(&identity.submission_id)
				.await?
				.ok_or_else(|| {
					ServerError::Upstream(format!("{} missing after ensure", identity.submission_id))
				})?
		}
	};

	Ok(Json(present_submission(&submission, &state.images)))
}

#[utoipa::path(
    put,
    path = "/api/submissions/me",
    responses(
        (status = 200, description = "The updated submission"),
        (status = 400, description = "A supplied field has the wrong shape", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid session token", body = crate::error::ErrorResponse)
    ),
    tag = "submissions",
    security(("bearer_session" = []))
)]
/// PUT /api/submissions/me - Partially update the caller's submission.
///
/// Absent fields are untouched, explicit nulls clear, values are
/// normalized and set; the media list is capped at ten items.
pub async fn update_own_submission(
	State(state): State<AppState>,
	RequireSubmitter(identity): RequireSubmitter,
	body: Result<Json<UpdateSubmissionRequest>, JsonRejection>,
) -> Result<Json<Value>, ServerError> {
	let Json(request) = body.map_err(|e| ServerError::Validation(e.body_text()))?;

	let updated = state.repo.patch(&identity.submission_id, &request).await?;

	tracing::info!(submission_id = %identity.submission_id, "submission updated");

	Ok(Json(present_submission(&updated, &state.images)))
}

#[utoipa::path(
    post,
    path = "/api/submissions/upload-image",
    responses(
        (status = 200, description = "Uploaded asset", body = UploadImageResponse),
        (status = 400, description = "Missing file field or not an image", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid session token", body = crate::error::ErrorResponse)
    ),
    tag = "submissions",
    security(("bearer_session" = []))
)]
/// POST /api/submissions/upload-image - Upload an image asset.
///
/// Accepts a multipart body with a `file` field, uploads it to the asset
/// store, and returns both the raw URL and the reference object the client
/// writes back into its submission.
pub async fn upload_image(
	State(state): State<AppState>,
	RequireSubmitter(identity): RequireSubmitter,
	mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, ServerError> {
	while let Some(field) = multipart
		.next_field()
		.await
		.map_err(|e| ServerError::Validation(format!("invalid multipart body: {e}")))?
	{
		if field.name() != Some("file") {
			continue;
		}

		let content_type = field
			.content_type()
			.unwrap_or("application/octet-stream")
			.to_string();
		if !content_type.starts_with("image/") {
			return Err(ServerError::Validation(format!(
				"expected an image upload, got {content_type}"
			)));
		}

		let data = field
			.bytes()
			.await
			.map_err(|e| ServerError::Validation(format!("failed to read upload: {e}")))?;
		if data.is_empty() {
			return Err(ServerError::Validation("uploaded file is empty".to_string()));
		}
		if data.len() > state.max_upload_bytes {
			return Err(ServerError::Validation(format!(
				"uploaded file exceeds the {} byte limit",
				state.max_upload_bytes
			)));
		}

		let asset = state.store.upload_image(data.to_vec(), &content_type).await?;

		tracing::info!(
			submission_id = %identity.submission_id,
			asset_id = %asset.id,
			size = data.len(),
			"image uploaded"
		);

		let image = json!({
			"_type": "image",
			"asset": { "_type": "reference", "_ref": asset.id }
		});
		return Ok(Json(UploadImageResponse {
			asset_id: asset.id,
			image,
			url: asset.url,
		}));
	}

	Err(ServerError::Validation(
		"multipart field 'file' is required".to_string(),
	))
}
