use pageseg::render::StaticSnapshotProvider;
use pageseg::snapshot::{PageAttributes, RenderNode, RenderSnapshot};
use pageseg::{AnalyzeRequest, PageAnalyzer, Role};

fn empty_root() -> RenderNode {
  RenderNode {
    tag_name: "body".to_string(),
    class_name: String::new(),
    id: String::new(),
    xpath: "/html/body".to_string(),
    x: 0.0,
    y: 0.0,
    width: 0.0,
    height: 0.0,
    font_size: None,
    font_color: None,
    visible: true,
    children: Vec::new(),
  }
}

fn zero_area_snapshot(width: f32, height: f32) -> RenderSnapshot {
  RenderSnapshot {
    attributes: PageAttributes {
      width,
      height,
      font_size: None,
      font_color: None,
    },
    root: empty_root(),
  }
}

#[test]
fn zero_width_page_yields_a_root_only_tree() {
  let report = PageAnalyzer::new().analyze_snapshot(&zero_area_snapshot(0.0, 900.0), 1920.0, 1080.0, false);
  assert!(report.root.children.is_empty());
  assert_eq!(report.root.area(), 0.0);
  assert_eq!(report.root.whitespace_area, 0.0);
  assert_eq!(report.root.role, Some(Role::Unknown));
}

#[test]
fn zero_height_page_yields_a_root_only_tree() {
  let report = PageAnalyzer::new().analyze_snapshot(&zero_area_snapshot(1200.0, 0.0), 1920.0, 1080.0, false);
  assert!(report.root.children.is_empty());
  assert_eq!(report.root.role, Some(Role::Unknown));
}

#[test]
fn degenerate_page_is_a_success_not_an_error() {
  let provider = StaticSnapshotProvider::new(zero_area_snapshot(0.0, 0.0));
  let request = AnalyzeRequest::new("http://blank.example/");
  let report = PageAnalyzer::new()
    .analyze(&request, &provider)
    .expect("degenerate pages produce a result, never a failure");
  let envelope = report.to_envelope();
  assert_eq!(envelope["success"], serde_json::Value::Bool(true));
  assert_eq!(envelope["result"]["xpath"], serde_json::json!("/html/body"));
}

#[test]
fn degenerate_page_explanations_carry_zero_scores() {
  // A zero-area surface offers no signal; every candidate scores zero and
  // the floor forces Unknown.
  let report = PageAnalyzer::new().analyze_snapshot(&zero_area_snapshot(0.0, 0.0), 1920.0, 1080.0, true);
  assert_eq!(report.root.role, Some(Role::Unknown));
  let ranked = report.root.explanation.as_ref().expect("ranking retained");
  assert!(!ranked.is_empty());
  assert!(ranked.iter().all(|candidate| candidate.score == 0.0));
}
