// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The [`ContentStore`] trait and its HTTP implementation.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::ContentConfig;
use crate::error::{ContentError, Result};

/// An uploaded image asset: its document id and servable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
	pub id: String,
	pub url: String,
}

/// Operations the server needs from the document store.
///
/// Mutations (`create_if_not_exists`, `patch`, `upload_image`) require the
/// write token and fail with [`ContentError::NotConfigured`] without one.
/// Reads work against public datasets unauthenticated.
#[async_trait]
pub trait ContentStore: Send + Sync {
	/// Run a GROQ query and return its `result` value.
	async fn query(&self, groq: &str) -> Result<Value>;

	/// Fetch a single document by id. Missing documents are `None`, not errors.
	async fn get_document(&self, id: &str) -> Result<Option<Value>>;

	/// Create a document if no document with its `_id` exists. Atomic at the
	/// store; concurrent calls for the same id converge to one document.
	async fn create_if_not_exists(&self, doc: Value) -> Result<()>;

	/// Apply a partial update: set the given attributes, unset the given
	/// paths, and return the updated document.
	async fn patch(&self, id: &str, set: Value, unset: &[String]) -> Result<Value>;

	/// Upload an image asset; returns its id and servable URL.
	async fn upload_image(&self, bytes: Vec<u8>, content_type: &str) -> Result<UploadedAsset>;
}

/// HTTP client for the hosted content store API.
pub struct SanityContentStore {
	http: reqwest::Client,
	config: ContentConfig,
}

impl SanityContentStore {
	/// Build a client with a bounded request timeout.
	pub fn new(config: ContentConfig) -> Result<Self> {
		let http = reqwest::Client::builder()
			.timeout(Duration::from_secs(config.timeout_secs))
			.build()?;
		Ok(Self { http, config })
	}

	fn write_token(&self) -> Result<&str> {
		self.config
			.token
			.as_ref()
			.map(|t| t.expose().as_str())
			.ok_or_else(|| {
				ContentError::NotConfigured("write token is not set; mutations are disabled".to_string())
			})
	}

	async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}
		let message = response
			.text()
			.await
			.unwrap_or_else(|_| "<unreadable body>".to_string());
		Err(ContentError::Api {
			status: status.as_u16(),
			message,
		})
	}

	async fn mutate(&self, mutations: Value, return_documents: bool) -> Result<Value> {
		let token = self.write_token()?;
		let url = format!(
			"{}/data/mutate/{}",
			self.config.api_base(),
			self.config.dataset
		);

		let response = self
			.http
			.post(&url)
			.query(&[("returnDocuments", if return_documents { "true" } else { "false" })])
			.bearer_auth(token)
			.json(&json!({ "mutations": mutations }))
			.send()
			.await?;

		let response = Self::check_status(response).await?;
		Ok(response.json().await?)
	}
}

#[async_trait]
impl ContentStore for SanityContentStore {
	#[tracing::instrument(level = "debug", skip(self, groq))]
	async fn query(&self, groq: &str) -> Result<Value> {
		let url = format!(
			"{}/data/query/{}",
			self.config.query_base(),
			self.config.dataset
		);

		let response = self.http.get(&url).query(&[("query", groq)]).send().await?;
		let response = Self::check_status(response).await?;
		let body: Value = response.json().await?;

		body.get("result")
			.cloned()
			.ok_or_else(|| ContentError::InvalidResponse("query response missing 'result'".to_string()))
	}

	#[tracing::instrument(level = "debug", skip(self))]
	async fn get_document(&self, id: &str) -> Result<Option<Value>> {
		let url = format!(
			"{}/data/doc/{}/{}",
			self.config.api_base(),
			self.config.dataset,
			id
		);

		let response = self.http.get(&url).send().await?;
		if response.status() == reqwest::StatusCode::NOT_FOUND {
			return Ok(None);
		}
		let response = Self::check_status(response).await?;
		let body: Value = response.json().await?;

		let documents = body
			.get("documents")
			.and_then(Value::as_array)
			.ok_or_else(|| {
				ContentError::InvalidResponse("doc response missing 'documents'".to_string())
			})?;
		Ok(documents.first().cloned())
	}

	#[tracing::instrument(level = "debug", skip(self, doc))]
	async fn create_if_not_exists(&self, doc: Value) -> Result<()> {
		self.mutate(json!([{ "createIfNotExists": doc }]), false)
			.await?;
		Ok(())
	}

	#[tracing::instrument(level = "debug", skip(self, set, unset))]
	async fn patch(&self, id: &str, set: Value, unset: &[String]) -> Result<Value> {
		let mut patch = serde_json::Map::new();
		patch.insert("id".to_string(), Value::String(id.to_string()));
		if set.as_object().is_some_and(|m| !m.is_empty()) {
			patch.insert("set".to_string(), set);
		}
		if !unset.is_empty() {
			patch.insert("unset".to_string(), json!(unset));
		}

		let body = self.mutate(json!([{ "patch": Value::Object(patch) }]), true).await?;

		body.get("results")
			.and_then(Value::as_array)
			.and_then(|results| results.first())
			.and_then(|r| r.get("document"))
			.cloned()
			.ok_or_else(|| {
				ContentError::InvalidResponse("mutate response missing updated document".to_string())
			})
	}

	#[tracing::instrument(level = "debug", skip(self, bytes), fields(size = bytes.len()))]
	async fn upload_image(&self, bytes: Vec<u8>, content_type: &str) -> Result<UploadedAsset> {
		let token = self.write_token()?;
		let url = format!(
			"{}/assets/images/{}",
			self.config.api_base(),
			self.config.dataset
		);

		let response = self
			.http
			.post(&url)
			.bearer_auth(token)
			.header(reqwest::header::CONTENT_TYPE, content_type)
			.body(bytes)
			.send()
			.await?;

		let response = Self::check_status(response).await?;
		let body: Value = response.json().await?;

		let document = body
			.get("document")
			.ok_or_else(|| ContentError::InvalidResponse("upload response missing 'document'".to_string()))?;
		let id = document
			.get("_id")
			.and_then(Value::as_str)
			.ok_or_else(|| ContentError::InvalidResponse("uploaded asset missing '_id'".to_string()))?;
		let asset_url = document
			.get("url")
			.and_then(Value::as_str)
			.ok_or_else(|| ContentError::InvalidResponse("uploaded asset missing 'url'".to_string()))?;

		Ok(UploadedAsset {
			id: id.to_string(),
			url: asset_url.to_string(),
		})
	}
}
