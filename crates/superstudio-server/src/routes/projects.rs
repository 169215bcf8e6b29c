// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Public showcase HTTP handlers: projects, filters, studios.
//!
//! Read-only views over the content store for the showcase frontend.
//! Results are reshaped on the way out: derived image URLs attached, and
//! the filter endpoint compiles a deduplicated tag list from whatever mix
//! of string and object tags the project documents carry.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use superstudio_submissions_core::slugify;

use crate::{
	api::AppState,
	error::ServerError,
	present::{present_project, present_studio},
};

/// All published projects with their studio, institution, and demand joins.
const PROJECTS_QUERY: &str = r#"*[_type == "project"] {
	_id,
	title,
	slug,
	poster_image,
	allTags,
	description,
	media,
	allStudents,
	home_studio-> {
		_id,
		title,
		slug,
		poster_image,
		studio_url,
		institution-> { _id, title, slug, school_url },
		demands[]-> { _id, title, slug },
		instructors,
		term,
		level,
		description
	}
}"#;

const PROJECT_TAGS_QUERY: &str = r#"*[_type == "project"] { allTags }"#;

const INSTITUTIONS_QUERY: &str = r#"*[_type == "school"] { _id, title, slug, school_url }"#;

const DEMANDS_QUERY: &str = r#"*[_type == "demand"] { _id, title, slug }"#;

const STUDIOS_QUERY: &str = r#"*[_type == "studio"] {
	_id,
	title,
	slug,
	poster_image,
	studio_url,
	institution-> { _id, title, slug, school_url },
	instructors,
	term,
	level
}"#;

#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "All projects with derived image URLs"),
        (status = 500, description = "Content store unavailable", body = crate::error::ErrorResponse)
    ),
    tag = "showcase"
)]
/// GET /api/projects - List all projects for the showcase.
pub async fn get_projects(State(state): State<AppState>) -> Result<Json<Value>, ServerError> {
	let result = state.store.query(PROJECTS_QUERY).await?;
	let projects = result
		.as_array()
		.cloned()
		.unwrap_or_default()
		.into_iter()
		.map(|project| present_project(project, &state.images))
		.collect();
	Ok(Json(Value::Array(projects)))
}

#[utoipa::path(
    get,
    path = "/api/filters",
    responses(
        (status = 200, description = "Unique tags, institutions, and demands"),
        (status = 500, description = "Content store unavailable", body = crate::error::ErrorResponse)
    ),
    tag = "showcase"
)]
/// GET /api/filters - Compile the filter lists for the showcase.
///
/// Tags are deduplicated by value across all projects and returned sorted,
/// each as a `{value, slug, label, _id}` object regardless of how the
/// source document stored it.
pub async fn get_filters(State(state): State<AppState>) -> Result<Json<Value>, ServerError> {
	let projects = state.store.query(PROJECT_TAGS_QUERY).await?;
	let institutions = state.store.query(INSTITUTIONS_QUERY).await?;
	let demands = state.store.query(DEMANDS_QUERY).await?;

	let tags = compile_unique_tags(projects.as_array().map(Vec::as_slice).unwrap_or_default());

	Ok(Json(json!({
		"tags": tags,
		"institutions": institutions,
		"demands": demands,
	})))
}

#[utoipa::path(
    get,
    path = "/api/studios",
    responses(
        (status = 200, description = "All studios"),
        (status = 500, description = "Content store unavailable", body = crate::error::ErrorResponse)
    ),
    tag = "showcase"
)]
/// GET /api/studios - List studios for the submission form.
pub async fn get_studios(State(state): State<AppState>) -> Result<Json<Value>, ServerError> {
	let result = state.store.query(STUDIOS_QUERY).await?;
	let studios = result
		.as_array()
		.cloned()
		.unwrap_or_default()
		.into_iter()
		.map(|studio| present_studio(studio, &state.images))
		.collect();
	Ok(Json(Value::Array(studios)))
}

/// Compile a deduplicated, value-sorted tag list from project documents.
///
/// Tags appear in two shapes in historical documents: bare strings and
/// `{value, slug?, label?, _id?}` objects. Both are folded to the full
/// object form; missing slugs, labels, and ids are derived from the value.
fn compile_unique_tags(projects: &[Value]) -> Vec<Value> {
	let mut tags: BTreeMap<String, Value> = BTreeMap::new();

	for project in projects {
		let Some(all_tags) = project.get("allTags").and_then(Value::as_array) else {
			continue;
		};
		for tag in all_tags {
			let Some((value, entry)) = canonical_tag(tag) else {
				continue;
			};
			tags.entry(value).or_insert(entry);
		}
	}

	tags.into_values().collect()
}

fn canonical_tag(tag: &Value) -> Option<(String, Value)> {
	match tag {
		Value::String(value) if !value.is_empty() => {
			let slug = slugify(value);
			let entry = json!({
				"value": value,
				"slug": slug,
				"label": value,
				"_id": format!("tag-{slug}"),
			});
			Some((value.clone(), entry))
		}
		Value::Object(obj) => {
			let value = obj.get("value")?.as_str().filter(|v| !v.is_empty())?;
			let slug = obj
				.get("slug")
				.and_then(Value::as_str)
				.map(str::to_string)
				.unwrap_or_else(|| slugify(value));
			let label = obj
				.get("label")
				.and_then(Value::as_str)
				.unwrap_or(value);
			let id = obj
				.get("_id")
				.and_then(Value::as_str)
				.map(str::to_string)
				.unwrap_or_else(|| format!("tag-{}", slugify(value)));
			let entry = json!({
				"value": value,
				"slug": slug,
				"label": label,
				"_id": id,
			});
			Some((value.to_string(), entry))
		}
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deduplicates_tags_across_projects() {
		let projects = vec![
			json!({ "allTags": ["Housing policy", "Pedagogy"] }),
			json!({ "allTags": ["Pedagogy", { "value": "Housing policy", "label": "Policy" }] }),
		];
		let tags = compile_unique_tags(&projects);

		assert_eq!(tags.len(), 2);
		// Sorted by value; first occurrence wins.
		assert_eq!(tags[0]["value"], "Housing policy");
		assert_eq!(tags[0]["label"], "Housing policy");
		assert_eq!(tags[1]["value"], "Pedagogy");
	}

	#[test]
	fn string_tags_get_derived_fields() {
		let tags = compile_unique_tags(&[json!({ "allTags": ["Community land trusts"] })]);
		assert_eq!(tags[0]["slug"], "community_land_trusts");
		assert_eq!(tags[0]["_id"], "tag-community_land_trusts");
	}

	#[test]
	fn object_tags_keep_their_fields() {
		let tags = compile_unique_tags(&[json!({
			"allTags": [{ "value": "Decolonization", "slug": "decol", "label": "Decolonisation", "_id": "tag-1" }]
		})]);
		assert_eq!(tags[0]["slug"], "decol");
		assert_eq!(tags[0]["label"], "Decolonisation");
		assert_eq!(tags[0]["_id"], "tag-1");
	}

	#[test]
	fn malformed_tags_are_skipped() {
		let tags = compile_unique_tags(&[json!({
			"allTags": ["", 42, { "label": "no value" }, null, "Indigeneity"]
		})]);
		assert_eq!(tags.len(), 1);
		assert_eq!(tags[0]["value"], "Indigeneity");
	}

	#[test]
	fn projects_without_tags_are_skipped() {
		let tags = compile_unique_tags(&[json!({ "title": "untagged" }), json!({ "allTags": "oops" })]);
		assert!(tags.is_empty());
	}
}
