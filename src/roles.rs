//! Semantic role classification
//!
//! Assigns every block one of the enumerated roles using a weighted-feature
//! scoring function. Classification is bottom-up so container inference can
//! read already-resolved child roles, and it is a pure function of resolved
//! geometry plus style features: re-classifying an unchanged tree
//! reproduces identical roles and scores, with no randomized tie-breaking.
//!
//! Per block the classifier builds an immutable [`BlockFeatures`] snapshot
//! (normalized position and extent, aspect ratio, font deviation from the
//! page defaults, text density, structural-vocabulary token hits, and
//! child shape), then scores each candidate role from positional priors
//! plus structural bonuses. Token matching is substring-based ("nav"
//! matches both `nav` and `navigation` class values).
//!
//! The highest score wins. Ties within a small tolerance resolve to the
//! candidate with lower positional variance; remaining ambiguity resolves
//! to Container when the block wraps two or more distinct major child
//! roles, else Unknown. Scores below the floor yield Unknown; low
//! confidence is a result, never an error.
//!
//! Classification must run on a location- and whitespace-resolved tree;
//! see [`crate::resolve`].

use crate::block::{Block, Role, RoleScore};
use crate::snapshot::PageAttributes;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Structural vocabulary, matched as substrings of class/id/tag
const NAV_TOKENS: [&str; 2] = ["nav", "menu"];
const HEADER_TOKENS: [&str; 4] = ["header", "banner", "masthead", "topbar"];
const FOOTER_TOKENS: [&str; 2] = ["footer", "bottom"];
const SIDEBAR_TOKENS: [&str; 2] = ["side", "aside"];
const CONTENT_TOKENS: [&str; 5] = ["content", "article", "main", "post", "text"];

/// Page-level context the classifier scores against
#[derive(Debug, Clone, Default)]
pub struct PageContext {
  /// Full page width in CSS pixels
  pub page_width: f32,
  /// Full page height in CSS pixels
  pub page_height: f32,
  /// Default font size, when the renderer reported one
  pub font_size: Option<f32>,
  /// Default font color, when the renderer reported one
  pub font_color: Option<String>,
}

impl PageContext {
  /// Builds the context from a snapshot's page attributes
  pub fn from_attributes(attributes: &PageAttributes) -> Self {
    Self {
      page_width: attributes.width,
      page_height: attributes.height,
      font_size: attributes.font_size,
      font_color: attributes.font_color.clone(),
    }
  }
}

/// Tuning constants for the classifier
///
/// Calibrated against the same hand-labeled desktop pages as the
/// segmenter's defaults; serde-loadable for recalibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifierConfig {
  /// Best scores below this floor yield Unknown
  pub score_floor: f32,
  /// Candidates within this distance of the best score count as tied
  pub tie_tolerance: f32,
  /// Fraction of page height counting as "near" the top/bottom edge
  pub edge_band: f32,
  /// Fraction of page width above which a block is "page-wide"
  pub full_width_ratio: f32,
  /// Fraction of page width below which a block can be a sidebar
  pub sidebar_max_width: f32,
  /// Bonus for a structural-vocabulary token hit
  pub token_weight: f32,
  /// Children below this fraction of page area count as "small"
  pub small_child_area: f32,
}

impl Default for ClassifierConfig {
  fn default() -> Self {
    Self {
      score_floor: 0.30,
      tie_tolerance: 0.02,
      edge_band: 0.18,
      full_width_ratio: 0.85,
      sidebar_max_width: 0.35,
      token_weight: 0.35,
      small_child_area: 0.02,
    }
  }
}

/// Structural-vocabulary hits for one block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenHits {
  /// "nav" / "menu"
  pub nav: bool,
  /// "header" / "banner" / "masthead" / "topbar"
  pub header: bool,
  /// "footer" / "bottom"
  pub footer: bool,
  /// "side" / "aside" (also matches "sidebar")
  pub sidebar: bool,
  /// "content" / "article" / "main" / "post" / "text"
  pub content: bool,
}

/// Immutable per-block feature snapshot the scorers read
///
/// All positional features are normalized against the page dimensions and
/// clamped into [0, 1]. A degenerate snapshot (zero page or block area)
/// produces a snapshot with `degenerate` set, which scores nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockFeatures {
  /// Top edge / page height
  pub rel_top: f32,
  /// Bottom edge / page height
  pub rel_bottom: f32,
  /// Horizontal center / page width
  pub rel_center_x: f32,
  /// Vertical center / page height
  pub rel_center_y: f32,
  /// Width / page width
  pub rel_width: f32,
  /// Height / page height
  pub rel_height: f32,
  /// Area / page area
  pub rel_area: f32,
  /// Height / width
  pub aspect: f32,
  /// Rendered-content share of the block's own area. A leaf is a content
  /// box and counts as fully covered; its whitespace bookkeeping (which
  /// equals its area) carries no emptiness signal.
  pub text_density: f32,
  /// |font size − page default| / page default
  pub font_size_dev: f32,
  /// 1.0 when the block's font color differs from the page default
  pub font_color_differs: f32,
  /// Structural vocabulary hits
  pub tokens: TokenHits,
  /// Direct children
  pub child_count: usize,
  /// Fraction of children below the small-child area cutoff
  pub small_child_fraction: f32,
  /// Anchor nodes / total nodes in the source subtree
  pub link_ratio: f32,
  /// Zero page or block area; no signal at all
  pub degenerate: bool,
}

impl BlockFeatures {
  /// Extracts the feature snapshot for one block
  pub fn extract(block: &Block, ctx: &PageContext, cfg: &ClassifierConfig) -> Self {
    let page_w = ctx.page_width;
    let page_h = ctx.page_height;
    let page_area = page_w * page_h;
    let area = block.area();
    if page_area <= 0.0 || area <= 0.0 {
      return Self::degenerate();
    }

    let clamp01 = |v: f32| v.clamp(0.0, 1.0);
    let center = block.bounds().center();

    let font_size_dev = match (block.style.font_size, ctx.font_size) {
      (Some(own), Some(default)) if default > 0.0 => (own - default).abs() / default,
      _ => 0.0,
    };
    let font_color_differs = match (&block.style.font_color, &ctx.font_color) {
      (Some(own), Some(default)) if own != default => 1.0,
      _ => 0.0,
    };

    let text_density = if block.is_leaf() {
      1.0
    } else {
      1.0 - clamp01(block.whitespace_area / area)
    };

    let haystack = format!(
      "{} {} {}",
      block.style.class_name, block.style.id, block.style.tag_name
    )
    .to_lowercase();
    let hit = |tokens: &[&str]| tokens.iter().any(|token| haystack.contains(token));
    let tokens = TokenHits {
      nav: hit(&NAV_TOKENS),
      header: hit(&HEADER_TOKENS),
      footer: hit(&FOOTER_TOKENS),
      sidebar: hit(&SIDEBAR_TOKENS),
      content: hit(&CONTENT_TOKENS),
    };

    let child_count = block.children.len();
    let small_children = block
      .children
      .iter()
      .filter(|child| child.area() / page_area < cfg.small_child_area)
      .count();
    let small_child_fraction = if child_count == 0 {
      0.0
    } else {
      small_children as f32 / child_count as f32
    };
    let link_ratio = if block.style.node_count == 0 {
      0.0
    } else {
      block.style.link_count as f32 / block.style.node_count as f32
    };

    Self {
      rel_top: clamp01(block.top_y / page_h),
      rel_bottom: clamp01((block.top_y + block.height) / page_h),
      rel_center_x: clamp01(center.x / page_w),
      rel_center_y: clamp01(center.y / page_h),
      rel_width: clamp01(block.width / page_w),
      rel_height: clamp01(block.height / page_h),
      rel_area: clamp01(area / page_area),
      aspect: block.height / block.width,
      text_density,
      font_size_dev,
      font_color_differs,
      tokens,
      child_count,
      small_child_fraction,
      link_ratio,
      degenerate: false,
    }
  }

  fn degenerate() -> Self {
    Self {
      rel_top: 0.0,
      rel_bottom: 0.0,
      rel_center_x: 0.0,
      rel_center_y: 0.0,
      rel_width: 0.0,
      rel_height: 0.0,
      rel_area: 0.0,
      aspect: 0.0,
      text_density: 0.0,
      font_size_dev: 0.0,
      font_color_differs: 0.0,
      tokens: TokenHits::default(),
      child_count: 0,
      small_child_fraction: 0.0,
      link_ratio: 0.0,
      degenerate: true,
    }
  }
}

/// One scored candidate with its tagged feature contributions
#[derive(Debug, Clone)]
struct Candidate {
  role: Role,
  score: f32,
  contributions: Vec<(&'static str, f32)>,
}

impl Candidate {
  fn dominant_feature(&self) -> &'static str {
    self
      .contributions
      .iter()
      .fold(None::<&(&'static str, f32)>, |best, c| match best {
        Some(b) if b.1 >= c.1 => best,
        _ => Some(c),
      })
      .map(|(name, _)| *name)
      .unwrap_or("none")
  }
}

/// Classifies every block of a resolved tree, bottom-up
///
/// Roles are assigned in place on the owned tree; the fully classified
/// tree is returned as a single unit of work. When `explain` is set, each
/// block retains its ranked candidate list; otherwise `explanation` stays
/// empty to minimize payload size.
pub fn detect_roles(mut root: Block, ctx: &PageContext, explain: bool, cfg: &ClassifierConfig) -> Block {
  fn walk(block: &mut Block, ctx: &PageContext, explain: bool, cfg: &ClassifierConfig) {
    for child in &mut block.children {
      walk(child, ctx, explain, cfg);
    }
    let child_roles: Vec<Role> = block.children.iter().filter_map(|child| child.role).collect();
    let features = BlockFeatures::extract(block, ctx, cfg);
    let candidates = score_candidates(&features, &child_roles, cfg);
    block.role = Some(choose(&candidates, &features, cfg));
    block.explanation = if explain {
      Some(explanation(&candidates))
    } else {
      None
    };
  }
  walk(&mut root, ctx, explain, cfg);
  log::debug!("classified {} blocks", root.block_count());
  root
}

/// Scores every candidate role for one feature snapshot
fn score_candidates(features: &BlockFeatures, child_roles: &[Role], cfg: &ClassifierConfig) -> Vec<Candidate> {
  if features.degenerate {
    return Role::CANDIDATES
      .iter()
      .map(|&role| Candidate {
        role,
        score: 0.0,
        contributions: Vec::new(),
      })
      .collect();
  }
  Role::CANDIDATES
    .iter()
    .map(|&role| {
      let contributions = match role {
        Role::Header => score_header(features, cfg),
        Role::Footer => score_footer(features, cfg),
        Role::Navigation => score_navigation(features, cfg),
        Role::Sidebar => score_sidebar(features, cfg),
        Role::Article => score_article(features),
        Role::Container => score_container(features, child_roles),
        Role::Unknown => Vec::new(),
      };
      let score = contributions.iter().map(|(_, v)| v).sum();
      Candidate {
        role,
        score,
        contributions,
      }
    })
    .collect()
}

fn clamp01(v: f32) -> f32 {
  v.clamp(0.0, 1.0)
}

/// Gate for edge-proximity priors: a header or footer is a strip, so the
/// prior fades out as a block approaches page height. A page-tall block
/// touches the top edge without being a header.
fn strip_gate(f: &BlockFeatures) -> f32 {
  1.0 - clamp01((f.rel_height - 0.3) / 0.4)
}

fn score_header(f: &BlockFeatures, cfg: &ClassifierConfig) -> Vec<(&'static str, f32)> {
  let mut c = vec![
    (
      "topProximity",
      0.45 * (1.0 - clamp01(f.rel_top / cfg.edge_band)) * strip_gate(f),
    ),
    (
      "fullWidth",
      0.25 * clamp01((f.rel_width - cfg.full_width_ratio) / (1.0 - cfg.full_width_ratio)),
    ),
    ("slimProfile", 0.10 * (1.0 - clamp01(f.rel_height / 0.3))),
    ("distinctFont", 0.05 * clamp01(f.font_size_dev)),
  ];
  if f.tokens.header {
    c.push(("headerToken", cfg.token_weight));
  }
  c
}

fn score_footer(f: &BlockFeatures, cfg: &ClassifierConfig) -> Vec<(&'static str, f32)> {
  let mut c = vec![
    (
      "bottomProximity",
      0.45 * (1.0 - clamp01((1.0 - f.rel_bottom) / cfg.edge_band)) * strip_gate(f),
    ),
    (
      "fullWidth",
      0.25 * clamp01((f.rel_width - cfg.full_width_ratio) / (1.0 - cfg.full_width_ratio)),
    ),
    ("slimProfile", 0.10 * (1.0 - clamp01(f.rel_height / 0.3))),
  ];
  if f.tokens.footer {
    c.push(("footerToken", cfg.token_weight));
  }
  c
}

fn score_navigation(f: &BlockFeatures, cfg: &ClassifierConfig) -> Vec<(&'static str, f32)> {
  let mut c = vec![
    ("linkDensity", 0.25 * clamp01(f.link_ratio / 0.5)),
    ("smallChildren", 0.15 * f.small_child_fraction),
    (
      "thinProfile",
      0.20 * (1.0 - clamp01(f.rel_width.min(f.rel_height) / 0.25)),
    ),
    ("distinctColor", 0.05 * f.font_color_differs),
  ];
  if f.tokens.nav {
    c.push(("navToken", cfg.token_weight + 0.05));
  }
  c
}

fn score_sidebar(f: &BlockFeatures, cfg: &ClassifierConfig) -> Vec<(&'static str, f32)> {
  let side_third = f.rel_center_x < 1.0 / 3.0 || f.rel_center_x > 2.0 / 3.0;
  let mut c = vec![
    (
      "narrowWidth",
      0.30 * (1.0 - clamp01(f.rel_width / cfg.sidebar_max_width)),
    ),
    ("tallAspect", 0.25 * clamp01(f.aspect / 3.0)),
    ("sidePosition", if side_third { 0.25 } else { 0.0 }),
  ];
  if f.tokens.sidebar {
    c.push(("sidebarToken", cfg.token_weight));
  }
  c
}

fn score_article(f: &BlockFeatures) -> Vec<(&'static str, f32)> {
  let horizontal = 1.0 - clamp01((f.rel_center_x - 0.5).abs() / 0.5);
  let vertical = 1.0 - clamp01((f.rel_center_y - 0.5).abs() / 0.5);
  let mut c = vec![
    ("largeArea", 0.30 * clamp01(f.rel_area / 0.35)),
    ("centralPosition", 0.15 * horizontal + 0.10 * vertical),
    ("textDensity", 0.30 * f.text_density),
  ];
  if f.tokens.content {
    c.push(("contentToken", 0.25));
  }
  c
}

fn score_container(f: &BlockFeatures, child_roles: &[Role]) -> Vec<(&'static str, f32)> {
  let distinct: FxHashSet<Role> = child_roles
    .iter()
    .copied()
    .filter(|role| role.is_major())
    .collect();
  if distinct.len() < 2 {
    return Vec::new();
  }
  vec![
    (
      "wrappedMajorRoles",
      0.5 + 0.05 * distinct.len().min(4) as f32,
    ),
    ("largeArea", 0.30 * clamp01(f.rel_area / 0.5)),
  ]
}

/// Squared distance of the block center from a role's positional anchor
///
/// The tie-break metric: a tied candidate whose anchor the block sits
/// closer to wins.
fn positional_variance(role: Role, f: &BlockFeatures) -> f32 {
  let (ax, ay) = match role {
    Role::Header => (0.5, 0.05),
    Role::Footer => (0.5, 0.95),
    Role::Navigation => (0.5, 0.10),
    Role::Sidebar => {
      let ax = if f.rel_center_x < 0.5 { 0.12 } else { 0.88 };
      (ax, 0.5)
    }
    Role::Article | Role::Container | Role::Unknown => (0.5, 0.5),
  };
  let dx = f.rel_center_x - ax;
  let dy = f.rel_center_y - ay;
  dx * dx + dy * dy
}

/// Picks the final role from the scored candidates
fn choose(candidates: &[Candidate], features: &BlockFeatures, cfg: &ClassifierConfig) -> Role {
  let best = candidates.iter().map(|c| c.score).fold(f32::MIN, f32::max);
  if features.degenerate || best < cfg.score_floor {
    return Role::Unknown;
  }

  let tied: Vec<&Candidate> = candidates
    .iter()
    .filter(|c| c.score >= best - cfg.tie_tolerance)
    .collect();
  if tied.len() == 1 {
    return tied[0].role;
  }

  let min_variance = tied
    .iter()
    .map(|c| positional_variance(c.role, features))
    .fold(f32::MAX, f32::min);
  let closest: Vec<&&Candidate> = tied
    .iter()
    .filter(|c| positional_variance(c.role, features) <= min_variance + 1e-6)
    .collect();
  if closest.len() == 1 {
    return closest[0].role;
  }

  // Still ambiguous: fall back to Container when the wrap rule held,
  // otherwise admit Unknown.
  let container_holds = candidates
    .iter()
    .any(|c| c.role == Role::Container && c.score > 0.0);
  if container_holds {
    Role::Container
  } else {
    Role::Unknown
  }
}

/// Builds the explain-mode candidate ranking, best first
fn explanation(candidates: &[Candidate]) -> Vec<RoleScore> {
  let mut ranked: Vec<&Candidate> = candidates.iter().collect();
  ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
  ranked
    .into_iter()
    .map(|c| RoleScore {
      role: c.role,
      score: c.score,
      dominant_feature: c.dominant_feature().to_string(),
    })
    .collect()
}
