// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial update requests and the patches built from them.
//!
//! Field semantics are tri-state: a field absent from the request is left
//! untouched, an explicit `null` clears it (for the nullable fields), and a
//! value sets it. Typed deserialization rejects wrong-shaped fields (e.g.
//! `allTags` that is not a sequence) before any of this runs.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use utoipa::ToSchema;

use crate::media::{normalize_description, normalize_media, normalize_poster_image};
use crate::slug::slugify;
use crate::submission::Slug;

/// Distinguish `field: null` from an absent field.
///
/// With `#[serde(default)]`, an absent field stays `None`; this wrapper
/// turns a present field (null included) into `Some(..)`.
fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
	T: Deserialize<'de>,
	D: Deserializer<'de>,
{
	Deserialize::deserialize(deserializer).map(Some)
}

/// Body of `PUT /api/submissions/me`.
///
/// Every field is optional; loosely-structured fields (`poster_image`,
/// `description`, `media` entries, `home_studio`) arrive as raw JSON and go
/// through the normalizers, which omit malformed values instead of
/// erroring.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateSubmissionRequest {
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default, deserialize_with = "explicit_null")]
	pub slug: Option<Option<String>>,
	#[serde(rename = "allTags", default)]
	pub all_tags: Option<Vec<String>>,
	#[serde(rename = "allStudents", default)]
	pub all_students: Option<Vec<String>>,
	#[serde(default, deserialize_with = "explicit_null")]
	pub home_studio: Option<Option<Value>>,
	#[serde(default, deserialize_with = "explicit_null")]
	pub poster_image: Option<Option<Value>>,
	#[serde(default)]
	pub description: Option<Value>,
	#[serde(default)]
	pub media: Option<Vec<Value>>,
}

/// A normalized partial update ready for the store: attributes to set and
/// paths to unset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmissionPatch {
	pub set: Map<String, Value>,
	pub unset: Vec<String>,
}

impl SubmissionPatch {
	/// Normalize an update request into a patch.
	///
	/// Setting a title without an explicit slug derives the slug from it.
	pub fn from_request(request: &UpdateSubmissionRequest) -> Self {
		let mut patch = SubmissionPatch::default();

		if let Some(title) = &request.title {
			patch.set("title", json!(title));
			if request.slug.is_none() {
				let derived = slugify(title);
				if !derived.is_empty() {
					patch.set("slug", json!(Slug::new(derived)));
				}
			}
		}

		match &request.slug {
			Some(Some(slug)) => {
				let cleaned = slugify(slug);
				if !cleaned.is_empty() {
					patch.set("slug", json!(Slug::new(cleaned)));
				}
			}
			Some(None) => patch.unset("slug"),
			None => {}
		}

		if let Some(tags) = &request.all_tags {
			patch.set("allTags", json!(tags));
		}

		if let Some(students) = &request.all_students {
			patch.set("allStudents", json!(students));
		}

		match &request.home_studio {
			Some(Some(value)) => {
				if let Some(reference) = normalize_studio_reference(value) {
					patch.set("home_studio", reference);
				}
			}
			Some(None) => patch.unset("home_studio"),
			None => {}
		}

		match &request.poster_image {
			Some(Some(value)) => {
				if let Some(poster) = normalize_poster_image(value) {
					patch.set("poster_image", json!(poster));
				}
			}
			Some(None) => patch.unset("poster_image"),
			None => {}
		}

		if let Some(value) = &request.description {
			if let Some(blocks) = normalize_description(value) {
				patch.set("description", Value::Array(blocks));
			}
		}

		if let Some(values) = &request.media {
			patch.set("media", json!(normalize_media(values)));
		}

		patch
	}

	pub fn is_empty(&self) -> bool {
		self.set.is_empty() && self.unset.is_empty()
	}

	fn set(&mut self, field: &str, value: Value) {
		self.set.insert(field.to_string(), value);
	}

	fn unset(&mut self, field: &str) {
		self.unset.push(field.to_string());
	}
}

/// Accept a studio reference as either a reference object or a bare
/// document id, reshaped to the canonical reference form.
fn normalize_studio_reference(value: &Value) -> Option<Value> {
	let id = match value {
		Value::String(id) => id.as_str(),
		Value::Object(obj) => obj.get("_ref")?.as_str()?,
		_ => return None,
	};
	if id.is_empty() {
		return None;
	}
	Some(json!({ "_type": "reference", "_ref": id }))
}
