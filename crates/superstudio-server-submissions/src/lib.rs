// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Submission repository for Superstudio.
//!
//! A keyed-by-email document abstraction over the content store: ensure a
//! submission exists, read it, and apply normalized partial updates. The
//! store is the sole source of truth: nothing is cached between requests,
//! and concurrent patches to one document resolve last-write-wins there.

pub mod error;
pub mod repository;

pub use error::{Result, SubmissionsError};
pub use repository::SubmissionRepository;
