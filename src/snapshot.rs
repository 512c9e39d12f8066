//! Render snapshot input model
//!
//! The input contract from the render collaborator: a tree of rendered
//! nodes rooted at a node whose page attributes carry the page dimensions
//! and default font, with every descendant carrying at least geometry and
//! an xpath-like structural identifier.
//!
//! Geometry is parent-relative as delivered; the pipeline resolves it to
//! page-absolute coordinates after segmentation. The core assumes the
//! snapshot was produced by an already-validated request and performs no
//! URL or transport validation of its own.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

fn default_visible() -> bool {
  true
}

/// Page-level attributes reported by the renderer for the document root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAttributes {
  /// Full page width in CSS pixels
  #[serde(default)]
  pub width: f32,
  /// Full page height in CSS pixels
  #[serde(default)]
  pub height: f32,
  /// Default font size in CSS pixels, when the renderer reported one
  #[serde(default)]
  pub font_size: Option<f32>,
  /// Default font color, when the renderer reported one
  #[serde(default)]
  pub font_color: Option<String>,
}

/// One rendered node as delivered by the render collaborator
///
/// `x`/`y` are relative to the parent node's top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
  /// Lowercase tag name ("div", "nav", "a", ...)
  #[serde(default)]
  pub tag_name: String,
  /// The raw class attribute value (space-separated tokens)
  #[serde(default)]
  pub class_name: String,
  /// The id attribute value
  #[serde(default)]
  pub id: String,
  /// Structural identifier, e.g. "/html/body/div[2]"
  pub xpath: String,
  /// Horizontal offset from the parent node
  #[serde(default)]
  pub x: f32,
  /// Vertical offset from the parent node
  #[serde(default)]
  pub y: f32,
  /// Rendered width
  #[serde(default)]
  pub width: f32,
  /// Rendered height
  #[serde(default)]
  pub height: f32,
  /// Computed font size in CSS pixels
  #[serde(default)]
  pub font_size: Option<f32>,
  /// Computed font color
  #[serde(default)]
  pub font_color: Option<String>,
  /// Whether the node was visible at snapshot time
  #[serde(default = "default_visible")]
  pub visible: bool,
  /// Rendered children in document order
  #[serde(default)]
  pub children: Vec<RenderNode>,
}

impl RenderNode {
  /// Returns the node's bounds relative to its parent
  pub fn bounds(&self) -> Rect {
    Rect::from_xywh(self.x, self.y, self.width, self.height)
  }

  /// Returns true when the node occupies visible area
  ///
  /// Zero-width and zero-height nodes are not visually present and are
  /// excluded from segmentation.
  pub fn has_area(&self) -> bool {
    self.visible && self.width > 0.0 && self.height > 0.0
  }

  /// Returns true when the node has no rendered children
  pub fn is_leaf(&self) -> bool {
    self.children.is_empty()
  }

  /// Counts the nodes of this subtree, including self
  pub fn node_count(&self) -> usize {
    1 + self.children.iter().map(RenderNode::node_count).sum::<usize>()
  }

  /// Counts anchor (`a`) nodes in this subtree, including self
  ///
  /// Feeds the navigation classifier's link-density feature.
  pub fn link_count(&self) -> usize {
    let own = usize::from(self.tag_name.eq_ignore_ascii_case("a"));
    own + self.children.iter().map(RenderNode::link_count).sum::<usize>()
  }

  /// Collects the page-absolute bounds of visible leaf nodes into `out`
  ///
  /// `origin` is the page-absolute position of this node's parent. Used by
  /// the complexity estimator, which works from rendered leaf coverage.
  pub fn collect_leaf_bounds(&self, origin: crate::geometry::Point, out: &mut Vec<Rect>) {
    if !self.visible {
      return;
    }
    let abs = self.bounds().translate(origin);
    if self.is_leaf() {
      if self.has_area() {
        out.push(abs);
      }
      return;
    }
    for child in &self.children {
      child.collect_leaf_bounds(abs.origin, out);
    }
  }
}

/// A complete rendered-page snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSnapshot {
  /// Page-level attributes (dimensions, default font)
  #[serde(default)]
  pub attributes: PageAttributes,
  /// The rendered node tree, rooted at the document element
  pub root: RenderNode,
}

impl RenderSnapshot {
  /// Returns the full page area as a rectangle at the origin
  pub fn page_rect(&self) -> Rect {
    Rect::from_xywh(0.0, 0.0, self.attributes.width, self.attributes.height)
  }

  /// Returns true when the rendered page encloses no area
  ///
  /// Degenerate snapshots still segment successfully, yielding a trivial
  /// root-only block tree.
  pub fn is_degenerate(&self) -> bool {
    self.page_rect().is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::geometry::Point;

  fn leaf(xpath: &str, x: f32, y: f32, w: f32, h: f32) -> RenderNode {
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

  #[test]
  fn deserializes_with_defaults() {
    let json = r#"{
      "attributes": {"width": 800, "height": 600},
      "root": {
        "xpath": "/html/body",
        "width": 800,
        "height": 600,
        "children": [{"xpath": "/html/body/div", "tagName": "div"}]
      }
    }"#;
    let snapshot: RenderSnapshot = serde_json::from_str(json).expect("parse");
    assert_eq!(snapshot.attributes.width, 800.0);
    assert!(snapshot.root.visible);
    assert_eq!(snapshot.root.children.len(), 1);
    assert!(!snapshot.root.children[0].has_area());
  }

  #[test]
  fn counts_links_in_subtree() {
    let mut nav = leaf("/nav", 0.0, 0.0, 100.0, 20.0);
    let mut a = leaf("/nav/a", 0.0, 0.0, 40.0, 20.0);
    a.tag_name = "a".to_string();
    nav.children.push(a.clone());
    a.xpath = "/nav/a[2]".to_string();
    nav.children.push(a);
    assert_eq!(nav.link_count(), 2);
    assert_eq!(nav.node_count(), 3);
  }

  #[test]
  fn leaf_bounds_are_page_absolute() {
    let mut parent = leaf("/body", 10.0, 10.0, 200.0, 200.0);
    parent.children.push(leaf("/body/div", 5.0, 5.0, 50.0, 50.0));
    let mut out = Vec::new();
    parent.collect_leaf_bounds(Point::ZERO, &mut out);
    assert_eq!(out, vec![Rect::from_xywh(15.0, 15.0, 50.0, 50.0)]);
  }

  #[test]
  fn zero_area_page_is_degenerate() {
    let snapshot = RenderSnapshot {
      attributes: PageAttributes {
        width: 0.0,
        height: 1080.0,
        ..Default::default()
      },
      root: leaf("/html", 0.0, 0.0, 0.0, 0.0),
    };
    assert!(snapshot.is_degenerate());
  }
}
