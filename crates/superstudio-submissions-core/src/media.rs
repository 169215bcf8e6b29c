// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Media payload normalization.
//!
//! Clients send back whatever state they hold, including derived URL
//! fields and half-formed entries from interrupted edits. Everything is
//! reshaped to its canonical persisted form here; entries that match no
//! known variant are dropped rather than rejected, so one garbled item
//! never blocks a save.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::submission::{AssetReference, PosterImage};

/// Ceiling on media items per submission. Enforced by truncation at the
/// repository layer before persisting.
pub const MAX_MEDIA_ITEMS: usize = 10;

/// One entry in a submission's media list.
///
/// An explicit tagged union: the `_type` discriminator matches the store
/// schema, and decoding happens once at the boundary via
/// [`MediaItem::from_value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "lowercase")]
pub enum MediaItem {
	Image {
		asset: AssetReference,
		#[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
		key: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		alt: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		caption: Option<String>,
	},
	Video {
		video_url: String,
		#[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
		key: Option<String>,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		caption: Option<String>,
	},
}

impl MediaItem {
	/// Decode one candidate media entry.
	///
	/// Accepts store-shaped entries (`_type` of `image`/`video`) and
	/// untagged entries recognizable by their payload (`asset._ref` or
	/// `video_url`), which older client state still sends. Anything else is
	/// `None`. Derived fields (display URLs) are dropped by reconstruction.
	pub fn from_value(value: &Value) -> Option<Self> {
		let obj = value.as_object()?;
		let key = string_field(obj, "_key");
		let caption = string_field(obj, "caption");
		let asset_ref = obj
			.get("asset")
			.and_then(|asset| asset.get("_ref"))
			.and_then(Value::as_str);
		let video_url = obj.get("video_url").and_then(Value::as_str);

		match obj.get("_type").and_then(Value::as_str) {
			Some("image") => asset_ref.map(|r| MediaItem::Image {
				asset: AssetReference::new(r),
				key,
				alt: string_field(obj, "alt"),
				caption,
			}),
			Some("video") => video_url.map(|url| MediaItem::Video {
				video_url: url.to_string(),
				key,
				caption,
			}),
			Some(_) => None,
			None => {
				if let Some(url) = video_url {
					Some(MediaItem::Video {
						video_url: url.to_string(),
						key,
						caption,
					})
				} else {
					asset_ref.map(|r| MediaItem::Image {
						asset: AssetReference::new(r),
						key,
						alt: string_field(obj, "alt"),
						caption,
					})
				}
			}
		}
	}
}

fn string_field(obj: &serde_json::Map<String, Value>, name: &str) -> Option<String> {
	obj.get(name).and_then(Value::as_str).map(str::to_string)
}

/// Reshape a client-supplied media list to its canonical persisted form,
/// dropping unrecognized entries.
pub fn normalize_media(values: &[Value]) -> Vec<MediaItem> {
	values.iter().filter_map(MediaItem::from_value).collect()
}

/// Reshape a client-supplied poster image to asset reference plus alt text.
///
/// Returns `None` for malformed input; callers omit the field from the
/// patch rather than erroring, to tolerate partial client state.
pub fn normalize_poster_image(value: &Value) -> Option<PosterImage> {
	let obj = value.as_object()?;
	let asset_ref = obj
		.get("asset")?
		.get("_ref")?
		.as_str()?;
	Some(PosterImage::new(asset_ref, string_field(obj, "alt")))
}

/// Accept a description only when it is a sequence of block nodes.
///
/// Individual block contents pass through unvalidated; the editor owns
/// their structure.
pub fn normalize_description(value: &Value) -> Option<Vec<Value>> {
	value.as_array().cloned()
}
