// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the content store client.

use thiserror::Error;

/// Errors that can occur when talking to the content store.
#[derive(Debug, Error)]
pub enum ContentError {
	/// Network-level error during HTTP communication (includes timeouts).
	#[error("network error: {0}")]
	Network(#[from] reqwest::Error),

	/// The store returned a non-success status.
	#[error("content store error: {status} - {message}")]
	Api { status: u16, message: String },

	/// The store answered with a body we could not interpret.
	#[error("invalid response from content store: {0}")]
	InvalidResponse(String),

	/// A write was attempted without a configured write token.
	#[error("content store is not configured for writes: {0}")]
	NotConfigured(String),
}

pub type Result<T> = std::result::Result<T, ContentError>;
