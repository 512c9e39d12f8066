//! Vision-based recursive page decomposition
//!
//! Converts a render snapshot into a block tree by coherence-driven
//! splitting, in the spirit of classic visual-page-segmentation methods:
//!
//! 1. For each node, score the visual coherence of adjacent rendered
//!    children from separators: whitespace gaps, font-size and font-color
//!    changes, and edge misalignment.
//! 2. Heterogeneous children split the node into sibling blocks, one per
//!    maximal run of mutually coherent children; homogeneous children keep
//!    the subtree as one block and recurse.
//! 3. Recursion stops at DOM leaves, below the minimum block area, or at
//!    the depth limit, preventing over-segmentation into inline text runs.
//! 4. A merged run's block takes the nearest-common-ancestor xpath of its
//!    members and their union bounding box; a run of one produces one
//!    block per subtree.
//!
//! Nodes with zero width or height and nodes fully outside the rendered
//! surface are excluded. A childless (or fully-excluded) root yields one
//! leaf block covering the page, role unassigned.
//!
//! The segmenter is a total function: any well-formed snapshot produces a
//! proper tree whose root geometry equals the full page area. Block
//! geometry stays parent-relative here; run the geometry resolver before
//! any position-dependent step.

use crate::block::{Block, SourceStyle};
use crate::geometry::{Point, Rect};
use crate::snapshot::{RenderNode, RenderSnapshot};
use serde::{Deserialize, Serialize};

/// Font size assumed when a node carries no font hint
const FALLBACK_FONT_SIZE: f32 = 16.0;

/// Tuning constants for the segmenter
///
/// Defaults were chosen against hand-labeled desktop pages; all values are
/// serde-loadable so they can be recalibrated without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmenterConfig {
  /// Adjacent children below this coherence split their parent
  pub coherence_threshold: f32,
  /// Blocks smaller than this area (px²) stop recursing
  pub min_block_area: f32,
  /// Hard recursion depth limit
  pub max_depth: usize,
  /// Gap between siblings, as a fraction of the larger page extent,
  /// beyond which the gap counts as a hard separator
  pub gap_separator_ratio: f32,
}

impl Default for SegmenterConfig {
  fn default() -> Self {
    Self {
      coherence_threshold: 0.55,
      min_block_area: 2500.0,
      max_depth: 12,
      gap_separator_ratio: 0.02,
    }
  }
}

struct SegContext<'a> {
  cfg: &'a SegmenterConfig,
  /// Rendered surface; nodes fully outside are overflow-clipped
  clip: Rect,
  /// Normalization extent for gap separators
  extent: f32,
}

/// Segments a render snapshot into a block tree
///
/// `viewport_width`/`viewport_height` describe the requested viewport; the
/// rendered surface is the union of the page area and the viewport, so
/// below-the-fold content on a tall page is kept while overflow outside
/// both is excluded.
pub fn segment(
  snapshot: &RenderSnapshot,
  viewport_width: f32,
  viewport_height: f32,
  cfg: &SegmenterConfig,
) -> Block {
  let page = snapshot.page_rect();
  let mut root_block = block_for(&snapshot.root, page);

  if snapshot.is_degenerate() {
    log::debug!("degenerate snapshot; emitting root-only block tree");
    return root_block;
  }

  let viewport = Rect::from_xywh(0.0, 0.0, viewport_width.max(0.0), viewport_height.max(0.0));
  let clip = page.union(viewport);
  let ctx = SegContext {
    cfg,
    clip,
    extent: clip.width().max(clip.height()).max(1.0),
  };

  let origin = snapshot.root.bounds().origin;
  let rendered = rendered_children(&snapshot.root, origin, &ctx);
  if rendered.is_empty() {
    return root_block;
  }

  let local = Rect::from_xywh(0.0, 0.0, page.width(), page.height());
  let coherences = adjacent_coherences(&rendered, &ctx);
  let blocks = if coherences.iter().all(|&c| c >= cfg.coherence_threshold) {
    let mut out = Vec::new();
    for child in &rendered {
      out.extend(segment_node(child, origin, 1, &ctx));
    }
    out
  } else {
    run_blocks(&snapshot.root, &rendered, &coherences, origin, 0, &ctx)
  };
  // Child geometry is relative to the root node, which may itself sit
  // offset from the page origin; the root block always covers the page.
  for mut block in blocks {
    block.top_x += origin.x;
    block.top_y += origin.y;
    if clamp_into(&mut block, local) {
      root_block.children.push(block);
    }
  }

  log::debug!(
    "segmented {} nodes into {} blocks",
    snapshot.root.node_count(),
    root_block.block_count()
  );
  root_block
}

/// Builds the block(s) replacing `node` in its parent's child list
///
/// Returns geometry relative to the node's parent. A homogeneous node
/// yields exactly one block; a heterogeneous node is split into one block
/// per maximal coherent run. Excluded nodes yield nothing.
fn segment_node(
  node: &RenderNode,
  parent_origin: Point,
  depth: usize,
  ctx: &SegContext<'_>,
) -> Vec<Block> {
  if !node.has_area() {
    return Vec::new();
  }
  let rel = node.bounds();
  let abs = rel.translate(parent_origin);
  if !abs.intersects(ctx.clip) {
    return Vec::new();
  }

  if node.is_leaf() || abs.area() < ctx.cfg.min_block_area || depth >= ctx.cfg.max_depth {
    return vec![block_for(node, rel)];
  }

  let rendered = rendered_children(node, abs.origin, ctx);
  if rendered.is_empty() {
    return vec![block_for(node, rel)];
  }

  let coherences = adjacent_coherences(&rendered, ctx);
  if coherences.iter().all(|&c| c >= ctx.cfg.coherence_threshold) {
    let mut block = block_for(node, rel);
    let local = Rect::from_xywh(0.0, 0.0, rel.width(), rel.height());
    attach_children(&mut block, &rendered, abs.origin, depth, local, ctx);
    return vec![block];
  }

  run_blocks(node, &rendered, &coherences, abs.origin, depth, ctx)
    .into_iter()
    .map(|mut block| {
      block.top_x += rel.x();
      block.top_y += rel.y();
      block
    })
    .collect()
}

/// Filters a node's children down to those visually present on the page
fn rendered_children<'n>(
  node: &'n RenderNode,
  abs_origin: Point,
  ctx: &SegContext<'_>,
) -> Vec<&'n RenderNode> {
  node
    .children
    .iter()
    .filter(|child| child.has_area() && child.bounds().translate(abs_origin).intersects(ctx.clip))
    .collect()
}

/// Segments each rendered child and attaches the results to `block`
fn attach_children(
  block: &mut Block,
  rendered: &[&RenderNode],
  abs_origin: Point,
  depth: usize,
  local: Rect,
  ctx: &SegContext<'_>,
) {
  for child in rendered {
    for mut child_block in segment_node(child, abs_origin, depth + 1, ctx) {
      if clamp_into(&mut child_block, local) {
        block.children.push(child_block);
      }
    }
  }
}

/// Groups rendered children into maximal coherent runs and builds one
/// block per run, relative to `node`
fn run_blocks(
  node: &RenderNode,
  rendered: &[&RenderNode],
  coherences: &[f32],
  abs_origin: Point,
  depth: usize,
  ctx: &SegContext<'_>,
) -> Vec<Block> {
  let mut out = Vec::new();
  let mut run_start = 0;
  for i in 0..=coherences.len() {
    let boundary = i == coherences.len() || coherences[i] < ctx.cfg.coherence_threshold;
    if !boundary {
      continue;
    }
    let run = &rendered[run_start..=i];
    if run.len() == 1 {
      out.extend(segment_node(run[0], abs_origin, depth + 1, ctx));
    } else {
      out.push(merged_block(node, run, abs_origin, depth, ctx));
    }
    run_start = i + 1;
  }
  out
}

/// Builds a merged block for a coherent run of two or more siblings
///
/// The merged block takes the nearest-common-ancestor xpath of the run and
/// the union of the members' bounds; each member subtree is segmented
/// beneath it.
fn merged_block(
  node: &RenderNode,
  run: &[&RenderNode],
  abs_origin: Point,
  depth: usize,
  ctx: &SegContext<'_>,
) -> Block {
  let union = run
    .iter()
    .map(|member| member.bounds())
    .reduce(Rect::union)
    .unwrap_or(Rect::ZERO);
  let xpath = nearest_common_ancestor(run.iter().map(|member| member.xpath.as_str()))
    .unwrap_or_else(|| node.xpath.clone());

  let mut block = Block::new(xpath, union);
  block.style = SourceStyle {
    link_count: run.iter().map(|member| member.link_count()).sum(),
    node_count: run.iter().map(|member| member.node_count()).sum(),
    ..SourceStyle::default()
  };

  let local = Rect::from_xywh(0.0, 0.0, union.width(), union.height());
  for member in run {
    for mut member_block in segment_node(member, abs_origin, depth + 1, ctx) {
      member_block.top_x -= union.x();
      member_block.top_y -= union.y();
      if clamp_into(&mut member_block, local) {
        block.children.push(member_block);
      }
    }
  }
  block
}

/// Creates a block carrying the node's identity and style metadata
fn block_for(node: &RenderNode, bounds: Rect) -> Block {
  let mut block = Block::new(node.xpath.clone(), bounds);
  block.style = SourceStyle {
    tag_name: node.tag_name.clone(),
    class_name: node.class_name.clone(),
    id: node.id.clone(),
    font_size: node.font_size,
    font_color: node.font_color.clone(),
    link_count: node.link_count(),
    node_count: node.node_count(),
  };
  block
}

/// Coherence of each adjacent pair of rendered children, in input order
fn adjacent_coherences(rendered: &[&RenderNode], ctx: &SegContext<'_>) -> Vec<f32> {
  rendered
    .windows(2)
    .map(|pair| pair_coherence(pair[0], pair[1], ctx))
    .collect()
}

/// Visual coherence of two sibling nodes, in [0, 1]
///
/// Combines the separator signals the snapshot exposes: the whitespace gap
/// between the boxes, the font-size ratio, the font-color change, and edge
/// alignment (a proxy for border/background discontinuities, which present
/// as misaligned box edges).
fn pair_coherence(a: &RenderNode, b: &RenderNode, ctx: &SegContext<'_>) -> f32 {
  let ra = a.bounds();
  let rb = b.bounds();

  let v_gap = (rb.min_y() - ra.max_y()).max(ra.min_y() - rb.max_y()).max(0.0);
  let h_gap = (rb.min_x() - ra.max_x()).max(ra.min_x() - rb.max_x()).max(0.0);
  let gap = v_gap.max(h_gap);
  let gap_norm = gap / ctx.extent;
  let gap_score = if gap_norm >= ctx.cfg.gap_separator_ratio {
    0.0
  } else {
    1.0 - gap_norm / ctx.cfg.gap_separator_ratio
  };

  let fa = a.font_size.unwrap_or(FALLBACK_FONT_SIZE).max(1.0);
  let fb = b.font_size.unwrap_or(FALLBACK_FONT_SIZE).max(1.0);
  let font_score = fa.min(fb) / fa.max(fb);

  let color_score = match (&a.font_color, &b.font_color) {
    (Some(ca), Some(cb)) if ca == cb => 1.0,
    (Some(_), Some(_)) => 0.0,
    (None, None) => 1.0,
    _ => 0.7,
  };

  let aligned = (ra.min_x() - rb.min_x()).abs() <= 1.0 || (ra.min_y() - rb.min_y()).abs() <= 1.0;
  let align_score = if aligned { 1.0 } else { 0.0 };

  0.45 * gap_score + 0.25 * font_score + 0.15 * color_score + 0.15 * align_score
}

/// Clips `block` into its parent's local coordinate space
///
/// Returns false when nothing of the block remains inside the parent, in
/// which case the caller drops it. Keeps every descendant's bounding box
/// inside its parent's.
fn clamp_into(block: &mut Block, local: Rect) -> bool {
  let Some(clipped) = block.bounds().intersection(local) else {
    return false;
  };
  let dx = clipped.x() - block.top_x;
  let dy = clipped.y() - block.top_y;
  block.set_bounds(clipped);

  let inner = Rect::from_xywh(0.0, 0.0, clipped.width(), clipped.height());
  let mut kept = Vec::with_capacity(block.children.len());
  for mut child in std::mem::take(&mut block.children) {
    child.top_x -= dx;
    child.top_y -= dy;
    if clamp_into(&mut child, inner) {
      kept.push(child);
    }
  }
  block.children = kept;
  true
}

/// Nearest common ancestor of a set of xpath identifiers
///
/// Returns `None` when the paths share no prefix segments.
pub fn nearest_common_ancestor<'a>(mut paths: impl Iterator<Item = &'a str>) -> Option<String> {
  let first = paths.next()?;
  let mut prefix: Vec<&str> = first.split('/').collect();
  for path in paths {
    let segments: Vec<&str> = path.split('/').collect();
    let shared = prefix
      .iter()
      .zip(segments.iter())
      .take_while(|(a, b)| a == b)
      .count();
    prefix.truncate(shared);
    if prefix.is_empty() {
      return None;
    }
  }
  // An absolute xpath splits into a leading empty segment; a prefix of
  // just that segment means the paths only share the root.
  if prefix.iter().all(|segment| segment.is_empty()) {
    return None;
  }
  Some(prefix.join("/"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::snapshot::PageAttributes;

  fn node(xpath: &str, x: f32, y: f32, w: f32, h: f32) -> RenderNode {
    RenderNode {
      tag_name: "div".to_string(),
      class_name: String::new(),
      id: String::new(),
      xpath: xpath.to_string(),
      x,
      y,
      width: w,
      height: h,
      font_size: None,
      font_color: None,
      visible: true,
      children: Vec::new(),
    }
  }

  fn snapshot(root: RenderNode, width: f32, height: f32) -> RenderSnapshot {
    RenderSnapshot {
      attributes: PageAttributes {
        width,
        height,
        font_size: Some(16.0),
        font_color: Some("rgb(0, 0, 0)".to_string()),
      },
      root,
    }
  }

  #[test]
  fn nearest_common_ancestor_of_siblings_is_parent() {
    let paths = ["/html/body/div[1]", "/html/body/div[2]"];
    assert_eq!(
      nearest_common_ancestor(paths.into_iter()),
      Some("/html/body".to_string())
    );
  }

  #[test]
  fn nearest_common_ancestor_without_shared_prefix_is_none() {
    let paths = ["/html/body", "other/tree"];
    assert_eq!(nearest_common_ancestor(paths.into_iter()), None);
  }

  #[test]
  fn root_geometry_equals_page_area() {
    let mut root = node("/html/body", 0.0, 0.0, 1000.0, 2000.0);
    root.children.push(node("/html/body/div", 0.0, 0.0, 1000.0, 500.0));
    let tree = segment(&snapshot(root, 1000.0, 2000.0), 1000.0, 800.0, &SegmenterConfig::default());
    assert_eq!(tree.bounds(), Rect::from_xywh(0.0, 0.0, 1000.0, 2000.0));
  }

  #[test]
  fn zero_area_nodes_are_excluded() {
    let mut root = node("/html/body", 0.0, 0.0, 1000.0, 1000.0);
    root.children.push(node("/html/body/div[1]", 0.0, 0.0, 0.0, 300.0));
    root.children.push(node("/html/body/div[2]", 0.0, 0.0, 1000.0, 300.0));
    let mut hidden = node("/html/body/div[3]", 0.0, 400.0, 1000.0, 300.0);
    hidden.visible = false;
    root.children.push(hidden);
    let tree = segment(&snapshot(root, 1000.0, 1000.0), 1000.0, 1000.0, &SegmenterConfig::default());
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].xpath, "/html/body/div[2]");
  }

  #[test]
  fn nodes_outside_rendered_surface_are_excluded() {
    let mut root = node("/html/body", 0.0, 0.0, 1000.0, 1000.0);
    root.children.push(node("/html/body/div[1]", 0.0, 0.0, 1000.0, 400.0));
    // Overflowed far to the right of both page and viewport.
    root.children.push(node("/html/body/div[2]", 5000.0, 0.0, 400.0, 400.0));
    let tree = segment(&snapshot(root, 1000.0, 1000.0), 1000.0, 1000.0, &SegmenterConfig::default());
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].xpath, "/html/body/div[1]");
  }

  #[test]
  fn childless_root_yields_single_unassigned_leaf() {
    let root = node("/html/body", 0.0, 0.0, 800.0, 600.0);
    let tree = segment(&snapshot(root, 800.0, 600.0), 800.0, 600.0, &SegmenterConfig::default());
    assert!(tree.is_leaf());
    assert_eq!(tree.role, None);
    assert_eq!(tree.bounds(), Rect::from_xywh(0.0, 0.0, 800.0, 600.0));
  }

  #[test]
  fn degenerate_page_yields_root_only_tree() {
    let root = node("/html/body", 0.0, 0.0, 0.0, 0.0);
    let tree = segment(&snapshot(root, 0.0, 1080.0), 1920.0, 1080.0, &SegmenterConfig::default());
    assert!(tree.is_leaf());
    assert_eq!(tree.area(), 0.0);
  }

  #[test]
  fn offset_root_origin_is_accumulated_into_child_positions() {
    let mut root = node("/html/body", 50.0, 40.0, 900.0, 1100.0);
    root.children.push(node("/html/body/div[1]", 0.0, 0.0, 900.0, 500.0));
    // Extends past the bottom of the page once the root offset is applied.
    root.children.push(node("/html/body/div[2]", 0.0, 600.0, 900.0, 500.0));

    let tree = segment(&snapshot(root, 1000.0, 1000.0), 1000.0, 1000.0, &SegmenterConfig::default());
    assert_eq!(tree.bounds(), Rect::from_xywh(0.0, 0.0, 1000.0, 1000.0));
    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[0].bounds(), Rect::from_xywh(50.0, 40.0, 900.0, 500.0));
    assert_eq!(tree.children[1].bounds(), Rect::from_xywh(50.0, 640.0, 900.0, 360.0));
  }

  #[test]
  fn heterogeneous_children_split_into_coherent_runs() {
    // Two tight text rows, a large gap, then two rows in a larger font:
    // the container splits into two merged sibling blocks.
    let mut wrapper = node("/html/body/div", 0.0, 0.0, 900.0, 800.0);
    let mut a = node("/html/body/div/p[1]", 10.0, 0.0, 880.0, 20.0);
    let mut b = node("/html/body/div/p[2]", 10.0, 24.0, 880.0, 20.0);
    let mut c = node("/html/body/div/p[3]", 10.0, 500.0, 880.0, 40.0);
    let mut d = node("/html/body/div/p[4]", 10.0, 544.0, 880.0, 40.0);
    a.font_size = Some(14.0);
    b.font_size = Some(14.0);
    c.font_size = Some(32.0);
    d.font_size = Some(32.0);
    wrapper.children.extend([a, b, c, d]);
    let mut root = node("/html/body", 0.0, 0.0, 1000.0, 1000.0);
    root.children.push(wrapper);

    let tree = segment(&snapshot(root, 1000.0, 1000.0), 1000.0, 1000.0, &SegmenterConfig::default());
    // The wrapper was split: its runs surface as the root's children.
    assert_eq!(tree.children.len(), 2);
    let first = &tree.children[0];
    let second = &tree.children[1];
    assert_eq!(first.xpath, "/html/body/div");
    assert_eq!(second.xpath, "/html/body/div");
    assert_eq!(first.bounds(), Rect::from_xywh(10.0, 0.0, 880.0, 44.0));
    assert_eq!(second.bounds(), Rect::from_xywh(10.0, 500.0, 880.0, 84.0));
    assert_eq!(first.children.len(), 2);
    assert_eq!(second.children.len(), 2);
  }

  #[test]
  fn coherent_children_stay_under_one_block() {
    let mut wrapper = node("/html/body/div", 0.0, 100.0, 900.0, 200.0);
    wrapper
      .children
      .push(node("/html/body/div/p[1]", 0.0, 0.0, 900.0, 90.0));
    wrapper
      .children
      .push(node("/html/body/div/p[2]", 0.0, 95.0, 900.0, 90.0));
    let mut root = node("/html/body", 0.0, 0.0, 1000.0, 1000.0);
    root.children.push(wrapper);

    let tree = segment(&snapshot(root, 1000.0, 1000.0), 1000.0, 1000.0, &SegmenterConfig::default());
    assert_eq!(tree.children.len(), 1);
    let wrapper_block = &tree.children[0];
    assert_eq!(wrapper_block.xpath, "/html/body/div");
    assert_eq!(wrapper_block.children.len(), 2);
  }

  #[test]
  fn small_nodes_do_not_recurse() {
    let mut tiny = node("/html/body/span", 0.0, 0.0, 40.0, 40.0);
    tiny
      .children
      .push(node("/html/body/span/b", 0.0, 0.0, 20.0, 20.0));
    let mut root = node("/html/body", 0.0, 0.0, 1000.0, 1000.0);
    root.children.push(tiny);
    root.children.push(node("/html/body/div", 0.0, 60.0, 1000.0, 500.0));

    let tree = segment(&snapshot(root, 1000.0, 1000.0), 1000.0, 1000.0, &SegmenterConfig::default());
    let tiny_block = tree
      .children
      .iter()
      .find(|b| b.xpath == "/html/body/span")
      .expect("tiny block kept");
    // 40x40 is below the minimum block area, so the span stays a leaf.
    assert!(tiny_block.is_leaf());
  }
}
