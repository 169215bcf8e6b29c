// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The submission document as stored and as served.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::media::MediaItem;

/// Document type of submissions in the content store.
pub const SUBMISSION_DOC_TYPE: &str = "studentSubmission";

/// Identifier of a submission document.
///
/// Always derived from the submitter's normalized email by the auth layer;
/// never parsed out of client input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for SubmissionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<String> for SubmissionId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// A reference to another document or asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
	#[serde(rename = "_type", default = "reference_type")]
	pub ref_type: String,
	#[serde(rename = "_ref")]
	pub asset_ref: String,
}

impl AssetReference {
	pub fn new(asset_ref: impl Into<String>) -> Self {
		Self {
			ref_type: reference_type(),
			asset_ref: asset_ref.into(),
		}
	}
}

fn reference_type() -> String {
	"reference".to_string()
}

/// The submission's poster image: asset reference plus alt text.
///
/// Only the reference and alt text are persisted; display URLs are derived
/// at read time and stripped from anything a client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosterImage {
	#[serde(rename = "_type", default = "image_type")]
	pub image_type: String,
	pub asset: AssetReference,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub alt: Option<String>,
}

impl PosterImage {
	pub fn new(asset_ref: impl Into<String>, alt: Option<String>) -> Self {
		Self {
			image_type: image_type(),
			asset: AssetReference::new(asset_ref),
			alt,
		}
	}
}

fn image_type() -> String {
	"image".to_string()
}

/// URL slug, derived from the title unless set explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
	#[serde(rename = "_type", default = "slug_type")]
	pub slug_type: String,
	pub current: String,
}

impl Slug {
	pub fn new(current: impl Into<String>) -> Self {
		Self {
			slug_type: slug_type(),
			current: current.into(),
		}
	}
}

fn slug_type() -> String {
	"slug".to_string()
}

/// One submission document, keyed by submitter email.
///
/// `description` stays as raw block nodes: the editor owns that structure
/// and deep validation of block contents is deliberately not done here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
	#[serde(rename = "_id")]
	pub id: SubmissionId,
	#[serde(rename = "_type", default = "submission_doc_type")]
	pub doc_type: String,
	#[serde(rename = "submittedBy")]
	pub submitted_by: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub slug: Option<Slug>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub poster_image: Option<PosterImage>,
	#[serde(rename = "allTags", default, skip_serializing_if = "Option::is_none")]
	pub all_tags: Option<Vec<String>>,
	#[serde(rename = "allStudents", default, skip_serializing_if = "Option::is_none")]
	pub all_students: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub home_studio: Option<AssetReference>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<Vec<Value>>,
	#[serde(default, deserialize_with = "deserialize_media", skip_serializing_if = "Vec::is_empty")]
	pub media: Vec<MediaItem>,
}

fn submission_doc_type() -> String {
	SUBMISSION_DOC_TYPE.to_string()
}

/// Decode the media list, dropping anything that is not a known variant.
/// A non-list (or missing) value decodes as empty rather than failing the
/// whole document.
fn deserialize_media<'de, D>(deserializer: D) -> Result<Vec<MediaItem>, D::Error>
where
	D: Deserializer<'de>,
{
	let value: Option<Value> = Option::deserialize(deserializer)?;
	Ok(match value {
		Some(Value::Array(items)) => items.iter().filter_map(MediaItem::from_value).collect(),
		_ => Vec::new(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn deserializes_full_document() {
		let doc = json!({
			"_id": "studentSubmission-abc",
			"_type": "studentSubmission",
			"submittedBy": "student@example.com",
			"title": "Collective Housing Atlas",
			"slug": { "_type": "slug", "current": "collective_housing_atlas" },
			"poster_image": {
				"_type": "image",
				"asset": { "_type": "reference", "_ref": "image-abc-800x600-jpg" },
				"alt": "atlas cover"
			},
			"allTags": ["Cooperative housing"],
			"allStudents": ["R. Alvarez"],
			"home_studio": { "_type": "reference", "_ref": "studio-1" },
			"description": [{ "_type": "block", "children": [] }],
			"media": [
				{ "_type": "image", "asset": { "_type": "reference", "_ref": "image-m1-800x600-jpg" } },
				{ "_type": "video", "video_url": "https://video.example/a" },
				{ "junk": true }
			]
		});

		let submission: Submission = serde_json::from_value(doc).unwrap();
		assert_eq!(submission.id.as_str(), "studentSubmission-abc");
		assert_eq!(submission.submitted_by, "student@example.com");
		assert_eq!(submission.all_tags.as_deref(), Some(&["Cooperative housing".to_string()][..]));
		// The junk entry is dropped during decode.
		assert_eq!(submission.media.len(), 2);
	}

	#[test]
	fn deserializes_minimal_document() {
		let doc = json!({
			"_id": "studentSubmission-abc",
			"_type": "studentSubmission",
			"submittedBy": "student@example.com"
		});
		let submission: Submission = serde_json::from_value(doc).unwrap();
		assert!(submission.title.is_none());
		assert!(submission.media.is_empty());
	}

	#[test]
	fn non_list_media_decodes_as_empty() {
		let doc = json!({
			"_id": "studentSubmission-abc",
			"_type": "studentSubmission",
			"submittedBy": "student@example.com",
			"media": "corrupted"
		});
		let submission: Submission = serde_json::from_value(doc).unwrap();
		assert!(submission.media.is_empty());
	}

	#[test]
	fn serializes_with_store_field_names() {
		let submission = Submission {
			id: SubmissionId::new("studentSubmission-abc"),
			doc_type: SUBMISSION_DOC_TYPE.to_string(),
			submitted_by: "student@example.com".to_string(),
			title: Some("Atlas".to_string()),
			slug: Some(Slug::new("atlas")),
			poster_image: None,
			all_tags: Some(vec!["Pedagogy".to_string()]),
			all_students: None,
			home_studio: None,
			description: None,
			media: Vec::new(),
		};

		let value = serde_json::to_value(&submission).unwrap();
		assert_eq!(value["_id"], "studentSubmission-abc");
		assert_eq!(value["submittedBy"], "student@example.com");
		assert_eq!(value["allTags"][0], "Pedagogy");
		assert_eq!(value["slug"]["current"], "atlas");
		assert!(value.get("poster_image").is_none());
	}
}
