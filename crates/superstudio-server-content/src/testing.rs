// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory [`ContentStore`] for tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{ContentError, Result};
use crate::store::{ContentStore, UploadedAsset};

/// In-memory document store with just enough GROQ support for the
/// server's queries: `*[_type == "<type>"]` filters return every document
/// of that type, projections are ignored (documents come back whole).
#[derive(Default)]
pub struct MemoryContentStore {
	docs: Mutex<HashMap<String, Value>>,
}

impl MemoryContentStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Seed the store with documents (each must carry `_id`).
	pub fn with_documents(docs: Vec<Value>) -> Self {
		let store = Self::new();
		for doc in docs {
			store.insert(doc);
		}
		store
	}

	/// Insert or replace a document.
	pub fn insert(&self, doc: Value) {
		let id = doc
			.get("_id")
			.and_then(Value::as_str)
			.expect("document must have _id")
			.to_string();
		self.docs.lock().unwrap().insert(id, doc);
	}

	/// Fetch a document for assertions.
	pub fn document(&self, id: &str) -> Option<Value> {
		self.docs.lock().unwrap().get(id).cloned()
	}

	/// Number of stored documents.
	pub fn len(&self) -> usize {
		self.docs.lock().unwrap().len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.lock().unwrap().is_empty()
	}
}

/// Pull the document type out of a `*[_type == "<type>"]` filter.
fn query_type_filter(groq: &str) -> Option<String> {
	let start = groq.find("_type == \"")? + "_type == \"".len();
	let rest = &groq[start..];
	let end = rest.find('"')?;
	Some(rest[..end].to_string())
}

#[async_trait]
impl ContentStore for MemoryContentStore {
	async fn query(&self, groq: &str) -> Result<Value> {
		let doc_type = query_type_filter(groq).ok_or_else(|| {
			ContentError::InvalidResponse(format!("unsupported test query: {groq}"))
		})?;

		let docs = self.docs.lock().unwrap();
		let mut matches: Vec<Value> = docs
			.values()
			.filter(|doc| doc.get("_type").and_then(Value::as_str) == Some(doc_type.as_str()))
			.cloned()
			.collect();
		matches.sort_by_key(|doc| {
			doc.get("_id")
				.and_then(Value::as_str)
				.unwrap_or_default()
				.to_string()
		});
		Ok(Value::Array(matches))
	}

	async fn get_document(&self, id: &str) -> Result<Option<Value>> {
		Ok(self.docs.lock().unwrap().get(id).cloned())
	}

	async fn create_if_not_exists(&self, doc: Value) -> Result<()> {
		let id = doc
			.get("_id")
			.and_then(Value::as_str)
			.ok_or_else(|| ContentError::InvalidResponse("document missing _id".to_string()))?
			.to_string();
		self.docs.lock().unwrap().entry(id).or_insert(doc);
		Ok(())
	}

	async fn patch(&self, id: &str, set: Value, unset: &[String]) -> Result<Value> {
		let mut docs = self.docs.lock().unwrap();
		let doc = docs.get_mut(id).ok_or_else(|| ContentError::Api {
			status: 409,
			message: format!("document {id} does not exist"),
		})?;

		let target = doc
			.as_object_mut()
			.ok_or_else(|| ContentError::InvalidResponse("stored document is not an object".to_string()))?;
		if let Value::Object(set) = set {
			for (key, value) in set {
				target.insert(key, value);
			}
		}
		for key in unset {
			target.remove(key);
		}

		Ok(doc.clone())
	}

	async fn upload_image(&self, bytes: Vec<u8>, content_type: &str) -> Result<UploadedAsset> {
		let format = content_type.strip_prefix("image/").unwrap_or("png");
		let digest = hex::encode(Sha256::digest(&bytes));
		let id = format!("image-{}-1200x800-{format}", &digest[..24]);
		let url = format!("https://cdn.example/images/{}-1200x800.{format}", &digest[..24]);

		self.insert(json!({
			"_id": id,
			"_type": "sanity.imageAsset",
			"url": url,
		}));

		Ok(UploadedAsset { id, url })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn create_if_not_exists_is_idempotent() {
		let store = MemoryContentStore::new();
		store
			.create_if_not_exists(json!({ "_id": "a", "_type": "studentSubmission", "title": "first" }))
			.await
			.unwrap();
		store
			.create_if_not_exists(json!({ "_id": "a", "_type": "studentSubmission", "title": "second" }))
			.await
			.unwrap();

		let doc = store.document("a").unwrap();
		assert_eq!(doc["title"], "first");
		assert_eq!(store.len(), 1);
	}

	#[tokio::test]
	async fn patch_sets_and_unsets() {
		let store =
			MemoryContentStore::with_documents(vec![json!({ "_id": "a", "_type": "t", "x": 1, "y": 2 })]);
		let updated = store
			.patch("a", json!({ "x": 10 }), &["y".to_string()])
			.await
			.unwrap();
		assert_eq!(updated["x"], 10);
		assert!(updated.get("y").is_none());
	}

	#[tokio::test]
	async fn query_filters_by_type() {
		let store = MemoryContentStore::with_documents(vec![
			json!({ "_id": "p1", "_type": "project" }),
			json!({ "_id": "s1", "_type": "studio" }),
		]);
		let result = store.query(r#"*[_type == "project"] { _id }"#).await.unwrap();
		let items = result.as_array().unwrap();
		assert_eq!(items.len(), 1);
		assert_eq!(items[0]["_id"], "p1");
	}

	#[tokio::test]
	async fn upload_returns_stable_asset_for_same_bytes() {
		let store = MemoryContentStore::new();
		let a = store.upload_image(vec![1, 2, 3], "image/png").await.unwrap();
		let b = store.upload_image(vec![1, 2, 3], "image/png").await.unwrap();
		assert_eq!(a, b);
		assert!(a.id.starts_with("image-"));
	}
}
