//! Public analysis API
//!
//! [`PageAnalyzer`] orchestrates the complete pipeline:
//!
//! ```text
//! Render Snapshot → Segmenter → Geometry Resolver → Role Classifier → JSON
//! ```
//!
//! Each call builds a fresh block tree from one snapshot, transforms it in
//! the three mandatory ordered passes, and reports the per-stage timings
//! the upstream service exposed (rendering, segmentation, reasoning).
//!
//! The analyzer holds only read-only configuration, so one instance can be
//! shared by reference across concurrently running requests; every request
//! owns its tree and nothing else is shared.
//!
//! # Example
//!
//! ```rust,ignore
//! use pageseg::api::{AnalyzeRequest, PageAnalyzer};
//! use pageseg::render::FileSnapshotProvider;
//!
//! let analyzer = PageAnalyzer::new();
//! let provider = FileSnapshotProvider::new("page.snapshot.json");
//! let report = analyzer.analyze(&AnalyzeRequest::new("http://example.com"), &provider)?;
//! println!("{}", report.root.to_json_string()?);
//! ```

use crate::block::Block;
use crate::error::Result;
use crate::render::{RenderRequest, SnapshotProvider};
use crate::resolve::{resolve_locations, resolve_whitespace};
use crate::roles::{detect_roles, ClassifierConfig, PageContext};
use crate::segment::{segment, SegmenterConfig};
use crate::snapshot::RenderSnapshot;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// An analysis request as received from the (external) transport layer
///
/// URL and dimension validation happen before the core is reached; fields
/// here are assumed well-typed. Unset dimensions fall back to the default
/// viewport, a negative wait clamps to zero, and any supplied user-agent
/// is replaced by the fixed legacy identifier (observed upstream behavior,
/// preserved deliberately).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
  /// The page to analyze
  pub url: String,
  /// Viewport width; defaults when unset
  #[serde(default)]
  pub width: Option<f32>,
  /// Viewport height; defaults when unset
  #[serde(default)]
  pub height: Option<f32>,
  /// Retain ranked role candidates per block
  #[serde(default)]
  pub explain_roles: bool,
  /// User-agent to render with
  #[serde(default)]
  pub user_agent: Option<String>,
  /// Extra settle time after load, milliseconds; negatives clamp to zero
  #[serde(default)]
  pub wait: Option<i64>,
}

impl AnalyzeRequest {
  /// Creates a request with defaults for everything but the URL
  pub fn new(url: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      width: None,
      height: None,
      explain_roles: false,
      user_agent: None,
      wait: None,
    }
  }

  /// Builds the normalized render request this analysis will use
  pub fn to_render_request(&self) -> RenderRequest {
    RenderRequest {
      url: self.url.clone(),
      width: self.width.unwrap_or(crate::render::DEFAULT_VIEWPORT_WIDTH),
      height: self.height.unwrap_or(crate::render::DEFAULT_VIEWPORT_HEIGHT),
      user_agent: self.user_agent.clone(),
      wait_ms: self.wait.unwrap_or(0).max(0) as u64,
    }
    .normalized()
  }
}

/// The outcome of one successful analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
  /// Wall-clock time spent waiting on the render collaborator
  pub rendering_ms: u64,
  /// Time spent segmenting and resolving geometry
  pub segmentation_ms: u64,
  /// Time spent classifying roles
  pub reasoning_ms: u64,
  /// The classified block tree
  pub root: Block,
}

impl AnalysisReport {
  /// Serializes the service-style success envelope
  ///
  /// `{success, renderingTime, segmentationTime, reasoningTime, result}`,
  /// matching the upstream response body field for field.
  pub fn to_envelope(&self) -> serde_json::Value {
    serde_json::json!({
      "success": true,
      "renderingTime": self.rendering_ms,
      "segmentationTime": self.segmentation_ms,
      "reasoningTime": self.reasoning_ms,
      "result": self.root.to_json(),
    })
  }
}

/// Orchestrates segmentation, geometry resolution and role classification
///
/// Holds read-only configuration only; safe to share across threads by
/// reference. Construct once per process (or per configuration) and reuse.
#[derive(Debug, Clone, Default)]
pub struct PageAnalyzer {
  segmenter: SegmenterConfig,
  classifier: ClassifierConfig,
}

impl PageAnalyzer {
  /// Creates an analyzer with default tuning
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates an analyzer with explicit tuning
  pub fn with_config(segmenter: SegmenterConfig, classifier: ClassifierConfig) -> Self {
    Self {
      segmenter,
      classifier,
    }
  }

  /// Runs the full pipeline for one request
  ///
  /// The only fallible step is snapshot retrieval; everything downstream
  /// is total. A degenerate snapshot yields a successful report carrying a
  /// trivial root-only tree with role Unknown.
  pub fn analyze(
    &self,
    request: &AnalyzeRequest,
    provider: &dyn SnapshotProvider,
  ) -> Result<AnalysisReport> {
    let render_request = request.to_render_request();

    let render_started = Instant::now();
    let snapshot = provider.retrieve(&render_request)?;
    let rendering_ms = render_started.elapsed().as_millis() as u64;

    let report = self.analyze_snapshot(
      &snapshot,
      render_request.width,
      render_request.height,
      request.explain_roles,
    );
    log::debug!(
      "analyzed {}: {} blocks in {}ms",
      request.url,
      report.root.block_count(),
      report.segmentation_ms + report.reasoning_ms
    );
    Ok(AnalysisReport {
      rendering_ms,
      ..report
    })
  }

  /// Runs the pipeline over an already-retrieved snapshot
  ///
  /// The pure, synchronous, CPU-bound core: segment, resolve locations,
  /// resolve whitespace, classify. Total over well-formed snapshots.
  pub fn analyze_snapshot(
    &self,
    snapshot: &RenderSnapshot,
    viewport_width: f32,
    viewport_height: f32,
    explain_roles: bool,
  ) -> AnalysisReport {
    let segmentation_started = Instant::now();
    let tree = segment(snapshot, viewport_width, viewport_height, &self.segmenter);
    let tree = resolve_locations(tree);
    let tree = resolve_whitespace(tree);
    let segmentation_ms = segmentation_started.elapsed().as_millis() as u64;

    let reasoning_started = Instant::now();
    let ctx = PageContext::from_attributes(&snapshot.attributes);
    let tree = detect_roles(tree, &ctx, explain_roles, &self.classifier);
    let reasoning_ms = reasoning_started.elapsed().as_millis() as u64;

    AnalysisReport {
      rendering_ms: 0,
      segmentation_ms,
      reasoning_ms,
      root: tree,
    }
  }
}
