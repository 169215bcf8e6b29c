// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Submission document types and payload normalization for Superstudio.
//!
//! A submission is the per-submitter editable document behind the showcase:
//! title, poster image, tags, students, studio reference, rich-text
//! description, and a media list. This crate owns the document shape, the
//! tagged media union decoded once at the boundary, and the normalizers
//! that reshape client payloads before anything reaches the store.

pub mod media;
pub mod slug;
pub mod submission;
pub mod update;

pub use media::{
	normalize_description, normalize_media, normalize_poster_image, MediaItem, MAX_MEDIA_ITEMS,
};
pub use slug::slugify;
pub use submission::{AssetReference, PosterImage, Slug, Submission, SubmissionId, SUBMISSION_DOC_TYPE};
pub use update::{SubmissionPatch, UpdateSubmissionRequest};
