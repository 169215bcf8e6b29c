// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Duration;
use std::sync::Arc;
use utoipa::OpenApi;

use superstudio_server_auth_magiclink::TokenCodec;
use superstudio_server_config::ServerConfig;
use superstudio_server_content::{ContentStore, ImageUrlBuilder};
use superstudio_server_email::EmailService;
use superstudio_server_smtp::SmtpClient;
use superstudio_server_submissions::SubmissionRepository;

use crate::api_docs::ApiDoc;
use crate::routes;

/// Application state shared across handlers.
///
/// Everything here is immutable after startup; per-request scope is always
/// re-derived from the verified token and the store is the sole source of
/// truth between requests.
#[derive(Clone)]
pub struct AppState {
	pub store: Arc<dyn ContentStore>,
	pub repo: SubmissionRepository,
	pub codec: TokenCodec,
	pub email: EmailService,
	pub images: ImageUrlBuilder,
	pub base_url: String,
	pub production: bool,
	pub max_upload_bytes: usize,
}

/// Create the application state from resolved configuration.
///
/// The content store and SMTP client are injected so tests can substitute
/// an in-memory store and no transport.
pub fn create_app_state(
	config: &ServerConfig,
	store: Arc<dyn ContentStore>,
	smtp_client: Option<Arc<SmtpClient>>,
) -> AppState {
	let codec = TokenCodec::with_ttls(
		config.auth.secret.clone(),
		Duration::minutes(config.auth.magic_link_ttl_minutes),
		Duration::hours(config.auth.session_ttl_hours),
	);

	AppState {
		repo: SubmissionRepository::new(store.clone()),
		store,
		codec,
		email: EmailService::new(smtp_client),
		images: ImageUrlBuilder::new(&config.content.project_id, &config.content.dataset),
		base_url: config.http.base_url.clone(),
		production: config.auth.is_production(),
		max_upload_bytes: config.upload.max_upload_bytes,
	}
}

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
	let max_upload_bytes = state.max_upload_bytes;

	Router::new()
		// Health
		.route("/api/health", get(routes::health::health_check))
		// Auth (public)
		.route(
			"/api/auth/request-magic-link",
			post(routes::auth::request_magic_link),
		)
		.route(
			"/api/auth/verify-magic-link",
			post(routes::auth::verify_magic_link),
		)
		// Submission editing (session token required)
		.route("/api/submissions/me", get(routes::submissions::get_own_submission))
		.route("/api/submissions/me", put(routes::submissions::update_own_submission))
		.route(
			"/api/submissions/upload-image",
			post(routes::submissions::upload_image),
		)
		// Public showcase (read-only)
		.route("/api/projects", get(routes::projects::get_projects))
		.route("/api/filters", get(routes::projects::get_filters))
		.route("/api/studios", get(routes::projects::get_studios))
		// OpenAPI document
		.route("/api-docs/openapi.json", get(openapi_json))
		// Uploads need room beyond the default body ceiling.
		.layer(DefaultBodyLimit::max(max_upload_bytes + 64 * 1024))
		.with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
	Json(ApiDoc::openapi())
}
