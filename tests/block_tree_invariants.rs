use pageseg::snapshot::{PageAttributes, RenderNode, RenderSnapshot};
use pageseg::{Block, PageAnalyzer, Rect};

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

fn sample_snapshot() -> RenderSnapshot {
  let mut root = node("/html/body", 0.0, 0.0, 1920.0, 2400.0);

  let mut header = node("/html/body/header", 0.0, 0.0, 1920.0, 120.0);
  header.class_name = "site-header".to_string();
  header
    .children
    .push(node("/html/body/header/img", 20.0, 20.0, 200.0, 80.0));

  let mut main = node("/html/body/main", 0.0, 120.0, 1400.0, 2100.0);
  for i in 0..4 {
    main.children.push(node(
      &format!("/html/body/main/p[{i}]"),
      20.0,
      i as f32 * 520.0,
      1360.0,
      500.0,
    ));
  }

  let mut aside = node("/html/body/aside", 1400.0, 120.0, 520.0, 2100.0);
  aside.class_name = "sidebar".to_string();
  aside
    .children
    .push(node("/html/body/aside/div", 10.0, 10.0, 500.0, 900.0));

  let footer = {
    let mut f = node("/html/body/footer", 0.0, 2220.0, 1920.0, 180.0);
    f.id = "footer".to_string();
    f
  };

  root.children.extend([header, main, aside, footer]);
  RenderSnapshot {
    attributes: PageAttributes {
      width: 1920.0,
      height: 2400.0,
      font_size: Some(16.0),
      font_color: Some("rgb(0, 0, 0)".to_string()),
    },
    root,
  }
}

fn assert_contained(block: &Block) {
  let bounds = block.bounds();
  for child in &block.children {
    assert!(
      bounds.contains_rect(child.bounds()),
      "child {} at {} escapes parent {} at {}",
      child.xpath,
      child.bounds(),
      block.xpath,
      bounds
    );
    assert_contained(child);
  }
}

#[test]
fn root_geometry_equals_page_area() {
  let report = PageAnalyzer::new().analyze_snapshot(&sample_snapshot(), 1920.0, 1080.0, false);
  assert_eq!(report.root.bounds(), Rect::from_xywh(0.0, 0.0, 1920.0, 2400.0));
}

#[test]
fn every_descendant_is_contained_in_its_parent() {
  let report = PageAnalyzer::new().analyze_snapshot(&sample_snapshot(), 1920.0, 1080.0, false);
  assert_contained(&report.root);
}

#[test]
fn every_block_is_classified_exactly_once() {
  let report = PageAnalyzer::new().analyze_snapshot(&sample_snapshot(), 1920.0, 1080.0, false);
  report.root.visit(&mut |block| {
    assert!(block.role.is_some(), "unclassified block {}", block.xpath);
  });
}

#[test]
fn whitespace_is_bounded_by_area_everywhere() {
  let report = PageAnalyzer::new().analyze_snapshot(&sample_snapshot(), 1920.0, 1080.0, false);
  report.root.visit(&mut |block| {
    assert!(block.whitespace_area >= 0.0);
    assert!(
      block.whitespace_area <= block.area() + 0.01,
      "whitespace {} exceeds area {} for {}",
      block.whitespace_area,
      block.area(),
      block.xpath
    );
    if block.is_leaf() {
      assert_eq!(block.whitespace_area, block.area());
    }
  });
}

#[test]
fn below_the_fold_content_is_kept() {
  // The page is taller than the viewport; footer content below the fold
  // still belongs to the rendered surface.
  let report = PageAnalyzer::new().analyze_snapshot(&sample_snapshot(), 1920.0, 1080.0, false);
  let mut found_footer = false;
  report.root.visit(&mut |block| {
    if block.xpath == "/html/body/footer" {
      found_footer = true;
    }
  });
  assert!(found_footer);
}
