//! Render collaborator seam
//!
//! This module provides a trait-based abstraction over the external
//! browser collaborator that produces rendered-page snapshots. The core
//! stays agnostic about how a snapshot is obtained, enabling:
//!
//! - offline analysis of stored snapshots
//! - mocking for tests
//! - per-request isolated render contexts owned by the caller
//!
//! The retrieval call is the only suspension point in an analysis request;
//! implementations must honor `RenderRequest::wait_ms` and fail with a
//! [`RenderError::Timeout`](crate::error::RenderError) rather than block
//! indefinitely. Implementations own their render context (the equivalent
//! of a browser tab) and must release it on every exit path; RAII `Drop`
//! is the expected mechanism.
//!
//! # Example
//!
//! ```rust,ignore
//! use pageseg::render::{FileSnapshotProvider, RenderRequest, SnapshotProvider};
//!
//! let provider = FileSnapshotProvider::new("page.snapshot.json");
//! let snapshot = provider.retrieve(&RenderRequest::new("http://example.com"))?;
//! ```

use crate::error::{RenderError, Result};
use crate::snapshot::RenderSnapshot;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use url::Url;

/// Default viewport width when a request does not specify one
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1920.0;

/// Default viewport height when a request does not specify one
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 1080.0;

/// The fixed identifier substituted for any caller-supplied user-agent
///
/// The upstream service replaced every supplied user-agent with this legacy
/// string instead of forwarding the caller's value. Preserved as observed;
/// see DESIGN.md.
pub const LEGACY_USER_AGENT: &str =
  "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:27.0) Gecko/20100101 Firefox/27.0";

/// A validated request for one rendered-page snapshot
///
/// Construction normalizes the fields the way the upstream service did:
/// the wait is clamped to zero and any supplied user-agent is replaced by
/// [`LEGACY_USER_AGENT`]. URL and dimension validation happen upstream of
/// the core; the request is assumed well-typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
  /// The page to render
  pub url: String,
  /// Viewport width in CSS pixels
  pub width: f32,
  /// Viewport height in CSS pixels
  pub height: f32,
  /// User-agent to render with, if any
  pub user_agent: Option<String>,
  /// Extra settle time after load, in milliseconds
  pub wait_ms: u64,
}

impl RenderRequest {
  /// Creates a request with the default viewport and no extra wait
  pub fn new(url: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      width: DEFAULT_VIEWPORT_WIDTH,
      height: DEFAULT_VIEWPORT_HEIGHT,
      user_agent: None,
      wait_ms: 0,
    }
  }

  /// Applies the upstream service's request normalization
  ///
  /// - non-positive dimensions fall back to the defaults
  /// - a negative wait clamps to zero (already unsigned here; callers with
  ///   signed input clamp before constructing)
  /// - a supplied user-agent is replaced wholesale by the legacy
  ///   identifier; an absent one stays absent
  pub fn normalized(mut self) -> Self {
    if self.width <= 0.0 {
      self.width = DEFAULT_VIEWPORT_WIDTH;
    }
    if self.height <= 0.0 {
      self.height = DEFAULT_VIEWPORT_HEIGHT;
    }
    if self.user_agent.is_some() {
      self.user_agent = Some(LEGACY_USER_AGENT.to_string());
    }
    self
  }
}

/// The external render collaborator
///
/// One call produces one snapshot for one request. Implementations run in
/// isolated contexts so one request's failure never affects another; the
/// core never retries; retry policy belongs behind this seam.
pub trait SnapshotProvider {
  /// Produces a rendered snapshot for the request, or the terminal
  /// [`RenderError`] for this analysis
  fn retrieve(&self, request: &RenderRequest) -> Result<RenderSnapshot>;
}

/// Snapshot provider backed by a stored snapshot JSON file
///
/// Used by the CLI tools and tests. When the request URL is itself a
/// `file://` URL, that path wins over the configured one, so a single
/// provider instance can serve several stored pages.
#[derive(Debug, Clone)]
pub struct FileSnapshotProvider {
  path: PathBuf,
}

impl FileSnapshotProvider {
  /// Creates a provider that reads the given snapshot file
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  fn resolve_path(&self, request: &RenderRequest) -> PathBuf {
    if let Ok(url) = Url::parse(&request.url) {
      if url.scheme() == "file" {
        if let Ok(path) = url.to_file_path() {
          return path;
        }
      }
    }
    self.path.clone()
  }
}

impl SnapshotProvider for FileSnapshotProvider {
  fn retrieve(&self, request: &RenderRequest) -> Result<RenderSnapshot> {
    let path = self.resolve_path(request);
    log::debug!("loading stored snapshot from {}", path.display());
    let bytes = fs::read(&path).map_err(|err| RenderError::Collaborator {
      message: format!("cannot read snapshot {}: {err}", path.display()),
    })?;
    let snapshot = serde_json::from_slice(&bytes).map_err(|err| RenderError::Snapshot {
      message: format!("invalid snapshot {}: {err}", path.display()),
    })?;
    Ok(snapshot)
  }
}

/// In-memory snapshot provider for tests and embedding
#[derive(Debug, Clone)]
pub struct StaticSnapshotProvider {
  snapshot: RenderSnapshot,
}

impl StaticSnapshotProvider {
  /// Creates a provider that returns a clone of the given snapshot
  pub fn new(snapshot: RenderSnapshot) -> Self {
    Self { snapshot }
  }
}

impl SnapshotProvider for StaticSnapshotProvider {
  fn retrieve(&self, _request: &RenderRequest) -> Result<RenderSnapshot> {
    Ok(self.snapshot.clone())
  }
}
