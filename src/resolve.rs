//! Geometry resolution passes
//!
//! Two ordered, pure transformations that run between segmentation and
//! role classification:
//!
//! 1. [`resolve_locations`] converts parent-relative block geometry into
//!    page-absolute coordinates by accumulating ancestor offsets. Role
//!    scoring needs page-absolute position, so this must run first.
//! 2. [`resolve_whitespace`] computes each block's whitespace area
//!    bottom-up: own area minus the area covered by child bounding boxes,
//!    corrected for pairwise child overlap. Children contribute only their
//!    bounding-box area, never their internal whitespace, so nothing is
//!    double counted.
//!
//! Both passes take the tree by value and return it, making it impossible
//! to read position data before it is resolved when the passes are chained
//! in order. Both are total functions.

use crate::block::Block;
use crate::geometry::Point;

/// Resolves parent-relative geometry into page-absolute coordinates
///
/// The root is taken to be positioned at the page origin already; every
/// descendant's offset is accumulated from its ancestors.
pub fn resolve_locations(mut root: Block) -> Block {
  fn walk(block: &mut Block, origin: Point) {
    block.top_x += origin.x;
    block.top_y += origin.y;
    let own = Point::new(block.top_x, block.top_y);
    for child in &mut block.children {
      walk(child, own);
    }
  }
  walk(&mut root, Point::ZERO);
  root
}

/// Computes whitespace area for every block, bottom-up
///
/// `whitespace = area − (Σ child areas − Σ pairwise child overlaps)`,
/// clamped into `[0, area]` to absorb floating-point drift. Leaves carry
/// no rendered descendants, so their whitespace equals their whole area.
pub fn resolve_whitespace(mut root: Block) -> Block {
  fn walk(block: &mut Block) {
    for child in &mut block.children {
      walk(child);
    }
    let area = block.area();
    if block.is_leaf() {
      block.whitespace_area = area;
      return;
    }
    let mut covered = 0.0f32;
    for child in &block.children {
      covered += child.area();
    }
    for (i, a) in block.children.iter().enumerate() {
      for b in &block.children[i + 1..] {
        if let Some(overlap) = a.bounds().intersection(b.bounds()) {
          covered -= overlap.area();
        }
      }
    }
    block.whitespace_area = (area - covered).clamp(0.0, area);
  }
  walk(&mut root);
  root
}
