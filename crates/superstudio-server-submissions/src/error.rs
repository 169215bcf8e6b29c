// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use superstudio_server_content::ContentError;

#[derive(Debug, thiserror::Error)]
pub enum SubmissionsError {
	/// The update payload contained a field of the wrong shape.
	#[error("invalid submission payload: {0}")]
	Validation(String),

	/// The content store call failed.
	#[error(transparent)]
	Content(#[from] ContentError),

	/// The store returned a document we could not decode.
	#[error("invalid submission document: {0}")]
	InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, SubmissionsError>;
