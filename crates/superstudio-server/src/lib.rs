// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Superstudio showcase and submission server.
//!
//! This crate provides the HTTP server for the student showcase: public
//! read endpoints over the content store and the magic-link flow for
//! editing one's own submission.

pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod error;
pub mod present;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use auth_middleware::{RequireSubmitter, SubmitterIdentity};
pub use error::{ErrorResponse, ServerError};
pub use superstudio_server_config::ServerConfig;
