// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Display URL builder for image asset references.
//!
//! The store persists image *references* of the form
//! `image-{assetId}-{width}x{height}-{format}`; frontends need CDN URLs.
//! URLs are derived at read time and never persisted.

use serde_json::Value;
use std::fmt;

/// Crop/fit strategy for derived image URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFit {
	/// Crop to exactly the requested dimensions.
	#[default]
	Crop,
	/// Scale to fit within the requested dimensions.
	Max,
}

impl fmt::Display for ImageFit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ImageFit::Crop => write!(f, "crop"),
			ImageFit::Max => write!(f, "max"),
		}
	}
}

/// Target dimensions and fit for a derived URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageUrlOptions {
	pub width: u32,
	pub height: u32,
	pub fit: ImageFit,
}

impl ImageUrlOptions {
	pub fn new(width: u32, height: u32) -> Self {
		Self {
			width,
			height,
			fit: ImageFit::Crop,
		}
	}
}

/// Builds CDN display URLs from image asset references.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
	project_id: String,
	dataset: String,
}

impl ImageUrlBuilder {
	pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
		Self {
			project_id: project_id.into(),
			dataset: dataset.into(),
		}
	}

	/// Build a URL from a raw asset reference string.
	///
	/// Returns `None` when the reference does not match the
	/// `image-{id}-{WxH}-{format}` shape.
	pub fn url_for_ref(&self, asset_ref: &str, options: ImageUrlOptions) -> Option<String> {
		let (asset_id, dimensions, format) = parse_image_ref(asset_ref)?;
		Some(format!(
			"https://cdn.sanity.io/images/{}/{}/{}-{}.{}?w={}&h={}&fit={}",
			self.project_id,
			self.dataset,
			asset_id,
			dimensions,
			format,
			options.width,
			options.height,
			options.fit
		))
	}

	/// Build a URL from an image object (`{asset: {_ref}}`) as stored in a
	/// document. Returns `None` for anything that isn't such an object.
	pub fn url_for_image(&self, image: &Value, options: ImageUrlOptions) -> Option<String> {
		let asset_ref = image.get("asset")?.get("_ref")?.as_str()?;
		self.url_for_ref(asset_ref, options)
	}
}

/// Split `image-{id}-{WxH}-{format}` into its parts.
fn parse_image_ref(asset_ref: &str) -> Option<(&str, &str, &str)> {
	let rest = asset_ref.strip_prefix("image-")?;
	let (rest, format) = rest.rsplit_once('-')?;
	let (asset_id, dimensions) = rest.rsplit_once('-')?;

	if asset_id.is_empty() || format.is_empty() {
		return None;
	}

	// Dimensions must look like {width}x{height}.
	let (w, h) = dimensions.split_once('x')?;
	if w.is_empty() || h.is_empty() || !w.bytes().all(|b| b.is_ascii_digit()) || !h.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}

	Some((asset_id, dimensions, format))
}
