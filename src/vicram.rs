//! VICRAM visual-complexity estimation
//!
//! An independent pipeline that reduces a rendered page to one scalar
//! complexity score. It shares the render-collaborator seam with the
//! segmentation pipeline but never touches block-tree state; the two may
//! run concurrently for different requests.
//!
//! The estimator rasterizes nothing: it works from the page-absolute
//! bounding boxes of visible leaf nodes. The page surface is partitioned
//! quad-tree style; at every level the inhomogeneity of the partition (the
//! variance of content density across its four quadrants) is weighted
//! by the partition's share of the page area and added to the running
//! score. Recursion stops below a minimum partition size or at a maximum
//! depth.
//!
//! A uniformly covered (or empty) page scores near zero at every level; a
//! dense multi-column layout disagrees with itself at many scales and
//! scores strictly higher.

use crate::error::Result;
use crate::geometry::Rect;
use crate::render::{RenderRequest, SnapshotProvider};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A visual-complexity request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VicramRequest {
  /// The page to score
  pub url: String,
  /// Viewport width; defaults when unset
  #[serde(default)]
  pub width: Option<f32>,
  /// Viewport height; defaults when unset
  #[serde(default)]
  pub height: Option<f32>,
}

impl VicramRequest {
  /// Creates a request with the default viewport
  pub fn new(url: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      width: None,
      height: None,
    }
  }

  fn to_render_request(&self) -> RenderRequest {
    RenderRequest {
      url: self.url.clone(),
      width: self.width.unwrap_or(crate::render::DEFAULT_VIEWPORT_WIDTH),
      height: self.height.unwrap_or(crate::render::DEFAULT_VIEWPORT_HEIGHT),
      user_agent: None,
      wait_ms: 0,
    }
    .normalized()
  }
}

/// The scored outcome of one complexity request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VicramResult {
  /// The scored page
  pub url: String,
  /// Unix-epoch milliseconds when rendering started
  pub t0: u64,
  /// Unix-epoch milliseconds when rendering completed
  pub t1: u64,
  /// The visual-complexity score; non-negative
  pub score: f64,
}

/// Tuning constants for the estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VicramConfig {
  /// Partitions narrower or shorter than this stop recursing
  pub min_partition_px: f32,
  /// Hard recursion depth limit
  pub max_depth: usize,
}

impl Default for VicramConfig {
  fn default() -> Self {
    Self {
      min_partition_px: 64.0,
      max_depth: 6,
    }
  }
}

fn now_ms() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis() as u64)
    .unwrap_or(0)
}

/// Computes the visual-complexity score for one page
///
/// Obtains a rendered snapshot via the provider, then scores it. Render
/// failures (unreachable URL, timeout) propagate as the terminal error for
/// the request; no score is produced. The only side effects are the start
/// and completion timestamps recorded for latency reporting.
pub fn calculate_vicram(
  request: &VicramRequest,
  provider: &dyn SnapshotProvider,
  cfg: &VicramConfig,
) -> Result<VicramResult> {
  let render_request = request.to_render_request();
  let t0 = now_ms();
  let snapshot = provider.retrieve(&render_request)?;
  let t1 = now_ms();

  let page = snapshot.page_rect();
  let mut leaves = Vec::new();
  snapshot
    .root
    .collect_leaf_bounds(crate::geometry::Point::ZERO, &mut leaves);
  let score = complexity_score(page, &leaves, cfg);
  log::debug!(
    "vicram for {}: {} leaves, score {:.4}",
    request.url,
    leaves.len(),
    score
  );

  Ok(VicramResult {
    url: request.url.clone(),
    t0,
    t1,
    score,
  })
}

/// Scores rendered leaf coverage over a page surface
///
/// Exposed for calibration tooling and tests; [`calculate_vicram`] is the
/// entry point that also renders.
pub fn complexity_score(page: Rect, leaves: &[Rect], cfg: &VicramConfig) -> f64 {
  if page.is_empty() {
    return 0.0;
  }
  partition_score(page, leaves, 0, page.area() as f64, cfg)
}

fn partition_score(region: Rect, leaves: &[Rect], depth: usize, page_area: f64, cfg: &VicramConfig) -> f64 {
  if depth >= cfg.max_depth
    || region.width() < cfg.min_partition_px
    || region.height() < cfg.min_partition_px
  {
    return 0.0;
  }

  let quadrants = split_quadrants(region);
  let densities: Vec<f64> = quadrants.iter().map(|q| coverage_density(*q, leaves)).collect();
  let mean = densities.iter().sum::<f64>() / densities.len() as f64;
  let variance = densities
    .iter()
    .map(|d| (d - mean) * (d - mean))
    .sum::<f64>()
    / densities.len() as f64;

  let weight = region.area() as f64 / page_area;
  let mut score = variance * weight;
  for quadrant in quadrants {
    score += partition_score(quadrant, leaves, depth + 1, page_area, cfg);
  }
  score
}

fn split_quadrants(region: Rect) -> [Rect; 4] {
  let hw = region.width() / 2.0;
  let hh = region.height() / 2.0;
  let x = region.x();
  let y = region.y();
  [
    Rect::from_xywh(x, y, hw, hh),
    Rect::from_xywh(x + hw, y, hw, hh),
    Rect::from_xywh(x, y + hh, hw, hh),
    Rect::from_xywh(x + hw, y + hh, hw, hh),
  ]
}

/// Fraction of a quadrant covered by rendered leaf boxes
///
/// Overlapping leaves can overcount; the sum is clamped to the quadrant
/// area, which keeps densities in [0, 1] and the score bounded.
fn coverage_density(quadrant: Rect, leaves: &[Rect]) -> f64 {
  let area = quadrant.area() as f64;
  if area <= 0.0 {
    return 0.0;
  }
  let covered: f64 = leaves
    .iter()
    .filter_map(|leaf| quadrant.intersection(*leaf))
    .map(|overlap| overlap.area() as f64)
    .sum();
  (covered / area).min(1.0)
}
