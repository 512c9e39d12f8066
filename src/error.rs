//! Error types for the segmentation pipeline
//!
//! The pipeline itself is total: segmentation, geometry resolution and role
//! classification are pure functions over well-formed input and never fail.
//! The only terminal failure class is the render-collaborator boundary:
//! an unreachable URL, a render timeout, or a malformed snapshot.
//!
//! Two conditions that look like failures are deliberately not errors:
//! - a structurally valid but empty/zero-area snapshot yields a trivial
//!   root-only block tree (a successful, degenerate result);
//! - low classification confidence surfaces as `Role::Unknown`.
//!
//! All errors use the `thiserror` crate.

use thiserror::Error;

/// Result type alias for pageseg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Error, Debug)]
pub enum Error {
  /// The render collaborator could not produce a snapshot
  #[error("render failed: {0}")]
  Render(#[from] RenderError),

  /// I/O failure while reading a stored snapshot
  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  /// Snapshot or output JSON could not be (de)serialized
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Failures at the render-collaborator boundary
///
/// These are the only errors that terminate an analysis request. Everything
/// downstream of a successfully retrieved snapshot is total.
#[derive(Error, Debug)]
pub enum RenderError {
  /// The URL could not be reached at all
  #[error("unreachable url: {url}")]
  Unreachable {
    /// The URL the collaborator was asked to render
    url: String,
  },

  /// The render did not complete within the caller-supplied wait
  #[error("render of {url} timed out after {waited_ms}ms")]
  Timeout {
    /// The URL the collaborator was asked to render
    url: String,
    /// How long the caller was willing to wait
    waited_ms: u64,
  },

  /// The collaborator reported a failure of its own
  #[error("render collaborator failure: {message}")]
  Collaborator {
    /// Collaborator-supplied description
    message: String,
  },

  /// A snapshot was produced but violates the input contract
  #[error("malformed snapshot: {message}")]
  Snapshot {
    /// What was wrong with the snapshot
    message: String,
  },
}
