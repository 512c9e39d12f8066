//! Block tree entity and wire format
//!
//! A `Block` is a visually-coherent segmented region of a rendered page.
//! The tree is built fresh per analysis request, transformed by three
//! strictly ordered passes (segment → resolve geometry → classify roles),
//! serialized, then dropped.
//!
//! # Ownership
//!
//! Each block owns its children; the single-parent and no-cycle invariants
//! hold by construction. Ancestor context needed during resolution is
//! passed down the recursion rather than stored as a back-reference.
//!
//! # Wire format
//!
//! Serialization is recursive camelCase JSON:
//! `{xpath, role, topX, topY, width, height, whitespaceArea,
//!   explanation?, children: [...]}`.
//! `role` is `null` until classified; `explanation` is present only when
//! explain mode was requested. Style metadata carried for classification is
//! not part of the wire format.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category assigned to a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
  /// Page-wide strip near the top edge
  Header,
  /// Page-wide strip near the bottom edge
  Footer,
  /// Link-dense row or column of small children
  Navigation,
  /// Narrow tall region in a side third of the page
  Sidebar,
  /// Large central text-dense region
  Article,
  /// Wrapping block whose children carry two or more major roles
  Container,
  /// Insufficient signal for any role
  Unknown,
}

impl Role {
  /// All roles a block can be scored against, in canonical order
  pub const CANDIDATES: [Role; 6] = [
    Role::Header,
    Role::Footer,
    Role::Navigation,
    Role::Sidebar,
    Role::Article,
    Role::Container,
  ];

  /// Returns true for roles that count toward container inference
  ///
  /// Container and Unknown never promote an ancestor to Container.
  pub fn is_major(self) -> bool {
    !matches!(self, Role::Container | Role::Unknown)
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Role::Header => "Header",
      Role::Footer => "Footer",
      Role::Navigation => "Navigation",
      Role::Sidebar => "Sidebar",
      Role::Article => "Article",
      Role::Container => "Container",
      Role::Unknown => "Unknown",
    };
    f.write_str(name)
  }
}

/// One ranked candidate from the classifier's explain mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleScore {
  /// The candidate role
  pub role: Role,
  /// The weighted score it received
  pub score: f32,
  /// The feature that contributed most to the score
  pub dominant_feature: String,
}

/// Style and identity metadata a block carries from its source nodes
///
/// Used by the role classifier only; never serialized. Blocks merged from
/// several sibling subtrees keep the defaults (a synthetic block has no
/// style of its own).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceStyle {
  /// Lowercase tag name of the source node
  pub tag_name: String,
  /// Class attribute of the source node
  pub class_name: String,
  /// Id attribute of the source node
  pub id: String,
  /// Computed font size of the source node
  pub font_size: Option<f32>,
  /// Computed font color of the source node
  pub font_color: Option<String>,
  /// Anchor nodes in the source subtree
  pub link_count: usize,
  /// Total nodes in the source subtree
  pub node_count: usize,
}

/// A visually-coherent segmented region of a rendered page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
  /// Structural identity; merged blocks take the nearest common ancestor
  pub xpath: String,
  /// Semantic role; `None` until classification has run
  pub role: Option<Role>,
  /// Left edge (parent-relative after segmentation, page-absolute after
  /// location resolution)
  pub top_x: f32,
  /// Top edge (same coordinate space as `top_x`)
  pub top_y: f32,
  /// Horizontal extent
  pub width: f32,
  /// Vertical extent
  pub height: f32,
  /// Area not covered by rendered descendant content; `0 ≤ w ≤ area`
  pub whitespace_area: f32,
  /// Ranked classification candidates, explain mode only
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub explanation: Option<Vec<RoleScore>>,
  /// Child blocks in document order
  pub children: Vec<Block>,
  /// Classifier-facing style metadata; not part of the wire format
  #[serde(skip)]
  pub style: SourceStyle,
}

impl Block {
  /// Creates an unclassified block with the given identity and bounds
  pub fn new(xpath: impl Into<String>, bounds: Rect) -> Self {
    Self {
      xpath: xpath.into(),
      role: None,
      top_x: bounds.x(),
      top_y: bounds.y(),
      width: bounds.width(),
      height: bounds.height(),
      whitespace_area: 0.0,
      explanation: None,
      children: Vec::new(),
      style: SourceStyle::default(),
    }
  }

  /// Returns the block's bounds in its current coordinate space
  pub fn bounds(&self) -> Rect {
    Rect::from_xywh(self.top_x, self.top_y, self.width, self.height)
  }

  /// Replaces the block's bounds
  pub fn set_bounds(&mut self, bounds: Rect) {
    self.top_x = bounds.x();
    self.top_y = bounds.y();
    self.width = bounds.width();
    self.height = bounds.height();
  }

  /// Returns the enclosed area
  pub fn area(&self) -> f32 {
    self.width * self.height
  }

  /// Returns true when the block has no children
  pub fn is_leaf(&self) -> bool {
    self.children.is_empty()
  }

  /// Counts the blocks of this subtree, including self
  pub fn block_count(&self) -> usize {
    1 + self.children.iter().map(Block::block_count).sum::<usize>()
  }

  /// Visits every block of the subtree in depth-first pre-order
  pub fn visit(&self, f: &mut impl FnMut(&Block)) {
    f(self);
    for child in &self.children {
      child.visit(f);
    }
  }

  /// Serializes the subtree to a JSON value in the wire format
  pub fn to_json(&self) -> serde_json::Value {
    // Blocks always serialize cleanly; the wire format has no fallible
    // representations.
    serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
  }

  /// Serializes the subtree to a compact JSON string
  pub fn to_json_string(&self) -> crate::error::Result<String> {
    Ok(serde_json::to_string(self)?)
  }

  /// Deserializes a block tree from wire-format JSON
  pub fn from_json_str(json: &str) -> crate::error::Result<Block> {
    Ok(serde_json::from_str(json)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_serializes_as_capitalized_string() {
    assert_eq!(
      serde_json::to_value(Role::Navigation).expect("serialize"),
      serde_json::Value::String("Navigation".to_string())
    );
  }

  #[test]
  fn unclassified_role_serializes_as_null() {
    let block = Block::new("/html/body", Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    let value = block.to_json();
    assert_eq!(value["role"], serde_json::Value::Null);
    assert_eq!(value["topX"], 0.0);
    assert_eq!(value["whitespaceArea"], 0.0);
    assert!(value.get("explanation").is_none());
  }

  #[test]
  fn explanation_serializes_when_present() {
    let mut block = Block::new("/html/body", Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    block.explanation = Some(vec![RoleScore {
      role: Role::Header,
      score: 0.9,
      dominant_feature: "topProximity".to_string(),
    }]);
    let value = block.to_json();
    assert_eq!(value["explanation"][0]["role"], "Header");
    assert_eq!(value["explanation"][0]["dominantFeature"], "topProximity");
  }

  #[test]
  fn container_and_unknown_are_not_major() {
    assert!(Role::Header.is_major());
    assert!(Role::Article.is_major());
    assert!(!Role::Container.is_major());
    assert!(!Role::Unknown.is_major());
  }
}
