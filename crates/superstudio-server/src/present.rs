// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Response presentation: attach derived display URLs to documents.
//!
//! The store persists asset references; every read that returns image data
//! augments them with resolved URLs. The derived fields
//! (`poster_image_url`, per-item `url`) are never persisted.

use serde_json::Value;

use superstudio_server_content::{ImageUrlBuilder, ImageUrlOptions};
use superstudio_submissions_core::Submission;

/// Poster images render at list size.
pub const POSTER_IMAGE_SIZE: ImageUrlOptions = ImageUrlOptions {
	width: 400,
	height: 300,
	fit: superstudio_server_content::ImageFit::Crop,
};

/// Gallery media renders at detail size.
pub const MEDIA_IMAGE_SIZE: ImageUrlOptions = ImageUrlOptions {
	width: 800,
	height: 600,
	fit: superstudio_server_content::ImageFit::Crop,
};

/// Studio posters render at thumbnail size.
pub const STUDIO_POSTER_SIZE: ImageUrlOptions = ImageUrlOptions {
	width: 200,
	height: 150,
	fit: superstudio_server_content::ImageFit::Crop,
};

/// Serialize a submission with derived image URLs attached.
pub fn present_submission(submission: &Submission, images: &ImageUrlBuilder) -> Value {
	let mut value = serde_json::to_value(submission).unwrap_or(Value::Null);
	attach_image_urls(&mut value, images);
	value
}

/// Attach derived URLs to any document with the showcase image fields.
pub fn attach_image_urls(doc: &mut Value, images: &ImageUrlBuilder) {
	let poster_url = doc
		.get("poster_image")
		.and_then(|poster| images.url_for_image(poster, POSTER_IMAGE_SIZE));
	if let Some(url) = poster_url {
		doc["poster_image_url"] = Value::String(url);
	}

	if let Some(Value::Array(media)) = doc.get_mut("media") {
		for item in media.iter_mut() {
			let url = images.url_for_image(item, MEDIA_IMAGE_SIZE);
			if let (Some(url), Some(obj)) = (url, item.as_object_mut()) {
				obj.insert("url".to_string(), Value::String(url));
			}
		}
	}
}

/// Attach derived URLs to a project document, including its studio's
/// thumbnail poster.
pub fn present_project(mut project: Value, images: &ImageUrlBuilder) -> Value {
	attach_image_urls(&mut project, images);

	let studio_poster_url = project
		.get("home_studio")
		.and_then(|studio| studio.get("poster_image"))
		.and_then(|poster| images.url_for_image(poster, STUDIO_POSTER_SIZE));
	if let Some(url) = studio_poster_url {
		project["home_studio"]["poster_image_url"] = Value::String(url);
	}

	project
}

/// Attach the thumbnail poster URL to a studio document.
pub fn present_studio(mut studio: Value, images: &ImageUrlBuilder) -> Value {
	let poster_url = studio
		.get("poster_image")
		.and_then(|poster| images.url_for_image(poster, STUDIO_POSTER_SIZE));
	if let Some(url) = poster_url {
		studio["poster_image_url"] = Value::String(url);
	}
	studio
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn images() -> ImageUrlBuilder {
		ImageUrlBuilder::new("0c912k6j", "production")
	}

	#[test]
	fn attaches_poster_and_media_urls() {
		let mut doc = json!({
			"poster_image": { "asset": { "_ref": "image-p-400x300-jpg" } },
			"media": [
				{ "_type": "image", "asset": { "_ref": "image-m-800x600-jpg" } },
				{ "_type": "video", "video_url": "https://video.example/a" }
			]
		});
		attach_image_urls(&mut doc, &images());

		assert!(doc["poster_image_url"].as_str().unwrap().contains("w=400&h=300"));
		assert!(doc["media"][0]["url"].as_str().unwrap().contains("w=800&h=600"));
		// Videos carry no asset and get no derived URL.
		assert!(doc["media"][1].get("url").is_none());
	}

	#[test]
	fn documents_without_images_are_untouched() {
		let mut doc = json!({ "title": "no images" });
		attach_image_urls(&mut doc, &images());
		assert!(doc.get("poster_image_url").is_none());
	}

	#[test]
	fn project_studio_poster_gets_thumbnail_url() {
		let project = json!({
			"title": "Atlas",
			"home_studio": {
				"title": "Housing Studio",
				"poster_image": { "asset": { "_ref": "image-s-600x400-jpg" } }
			}
		});
		let presented = present_project(project, &images());
		assert!(presented["home_studio"]["poster_image_url"]
			.as_str()
			.unwrap()
			.contains("w=200&h=150"));
	}
}
