// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Repository layer for submission documents.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

use superstudio_server_auth_magiclink::{normalize_email, submission_id_for_email};
use superstudio_server_content::ContentStore;
use superstudio_submissions_core::{
	Submission, SubmissionId, SubmissionPatch, UpdateSubmissionRequest, MAX_MEDIA_ITEMS,
	SUBMISSION_DOC_TYPE,
};

use crate::error::{Result, SubmissionsError};

/// Submission operations over the content store.
///
/// Every caller passes an id taken from a verified token; nothing here
/// accepts a client-supplied identifier.
#[derive(Clone)]
pub struct SubmissionRepository {
	store: Arc<dyn ContentStore>,
}

impl SubmissionRepository {
	pub fn new(store: Arc<dyn ContentStore>) -> Self {
		Self { store }
	}

	/// Create the submission document for an email if it does not exist and
	/// return its id. Idempotent: the id is a deterministic hash of the
	/// normalized email and the store's create-if-absent mutation is atomic,
	/// so concurrent calls converge to one document.
	#[instrument(level = "debug", skip(self, email))]
	pub async fn ensure(&self, email: &str) -> Result<SubmissionId> {
		let email = normalize_email(email);
		let id = submission_id_for_email(&email);

		self.store
			.create_if_not_exists(json!({
				"_id": id,
				"_type": SUBMISSION_DOC_TYPE,
				"submittedBy": email,
			}))
			.await?;

		Ok(SubmissionId::new(id))
	}

	/// Fetch a submission. A missing document is `None`, not an error.
	#[instrument(level = "debug", skip(self))]
	pub async fn get(&self, id: &SubmissionId) -> Result<Option<Submission>> {
		let Some(doc) = self.store.get_document(id.as_str()).await? else {
			return Ok(None);
		};
		let submission = decode_submission(doc)?;
		Ok(Some(submission))
	}

	/// Apply a partial update and return the updated submission.
	///
	/// Fields absent from the request are untouched; explicit nulls clear;
	/// values are normalized and set. The media list is truncated to
	/// [`MAX_MEDIA_ITEMS`] before persisting: overflow is dropped, not
	/// rejected, so a save never fails on an over-long gallery.
	#[instrument(level = "debug", skip(self, request))]
	pub async fn patch(
		&self,
		id: &SubmissionId,
		request: &UpdateSubmissionRequest,
	) -> Result<Submission> {
		let mut patch = SubmissionPatch::from_request(request);
		enforce_media_ceiling(&mut patch);

		if patch.is_empty() {
			// Nothing to change; serve the current document.
			return self
				.get(id)
				.await?
				.ok_or_else(|| SubmissionsError::InvalidDocument(format!("{id} does not exist")));
		}

		let updated = self
			.store
			.patch(id.as_str(), Value::Object(patch.set), &patch.unset)
			.await?;
		decode_submission(updated)
	}
}

fn decode_submission(doc: Value) -> Result<Submission> {
	serde_json::from_value(doc).map_err(|e| SubmissionsError::InvalidDocument(e.to_string()))
}

fn enforce_media_ceiling(patch: &mut SubmissionPatch) {
	if let Some(Value::Array(items)) = patch.set.get_mut("media") {
		if items.len() > MAX_MEDIA_ITEMS {
			tracing::warn!(
				submitted = items.len(),
				kept = MAX_MEDIA_ITEMS,
				"media list over ceiling; truncating"
			);
			items.truncate(MAX_MEDIA_ITEMS);
		}
	}
}
