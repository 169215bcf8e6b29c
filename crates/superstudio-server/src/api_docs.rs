// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
	info(
		title = "Superstudio API",
		description = "Magic-link submission editing and the public showcase API"
	),
	paths(
		crate::routes::health::health_check,
		crate::routes::auth::request_magic_link,
		crate::routes::auth::verify_magic_link,
		crate::routes::submissions::get_own_submission,
		crate::routes::submissions::update_own_submission,
		crate::routes::submissions::upload_image,
		crate::routes::projects::get_projects,
		crate::routes::projects::get_filters,
		crate::routes::projects::get_studios,
	),
	components(schemas(
		crate::error::ErrorResponse,
		crate::routes::health::HealthResponse,
		crate::routes::auth::MagicLinkRequest,
		crate::routes::auth::MagicLinkResponse,
		crate::routes::auth::VerifyMagicLinkRequest,
		crate::routes::auth::VerifyMagicLinkResponse,
		crate::routes::submissions::UploadImageResponse,
	)),
	tags(
		(name = "auth", description = "Magic link authentication"),
		(name = "submissions", description = "Authenticated submission editing"),
		(name = "showcase", description = "Public showcase data"),
		(name = "health", description = "Liveness")
	)
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn openapi_document_includes_all_routes() {
		let doc = ApiDoc::openapi();
		let paths = &doc.paths.paths;
		for path in [
			"/api/health",
			"/api/auth/request-magic-link",
			"/api/auth/verify-magic-link",
			"/api/submissions/me",
			"/api/submissions/upload-image",
			"/api/projects",
			"/api/filters",
			"/api/studios",
		] {
			assert!(paths.contains_key(path), "missing path: {path}");
		}
	}
}
