use criterion::black_box;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;
use pageseg::geometry::Point;
use pageseg::snapshot::{PageAttributes, RenderNode, RenderSnapshot};
use pageseg::vicram::{complexity_score, VicramConfig};
use pageseg::PageAnalyzer;

fn node(xpath: String, x: f32, y: f32, w: f32, h: f32, font_size: Option<f32>) -> RenderNode {
  RenderNode {
    tag_name: "div".to_string(),
    class_name: String::new(),
    id: String::new(),
    xpath,
    x,
    y,
    width: w,
    height: h,
    font_size,
    font_color: None,
    visible: true,
    children: Vec::new(),
  }
}

/// A synthetic article-like page: a header strip, `sections` stacked
/// regions of mixed font sizes, and a side column. Region contents
/// alternate font sizes so segmentation finds real run boundaries.
fn synthetic_snapshot(sections: usize, paragraphs: usize) -> RenderSnapshot {
  let width = 1920.0;
  let section_h = 80.0 + paragraphs as f32 * 60.0;
  let height = 160.0 + sections as f32 * section_h;

  let mut root = node("/html/body".to_string(), 0.0, 0.0, width, height, None);

  let mut header = node("/html/body/header".to_string(), 0.0, 0.0, width, 120.0, Some(24.0));
  header.class_name = "masthead".to_string();
  root.children.push(header);

  for s in 0..sections {
    let top = 160.0 + s as f32 * section_h;
    let mut section = node(
      format!("/html/body/main/section[{s}]"),
      0.0,
      top,
      width - 480.0,
      section_h - 40.0,
      None,
    );
    for p in 0..paragraphs {
      let font = if p % 3 == 0 { Some(28.0) } else { Some(16.0) };
      section.children.push(node(
        format!("/html/body/main/section[{s}]/p[{p}]"),
        20.0,
        p as f32 * 60.0,
        width - 520.0,
        52.0,
        font,
      ));
    }
    root.children.push(section);
  }

  let mut aside = node(
    "/html/body/aside".to_string(),
    width - 460.0,
    160.0,
    460.0,
    height - 200.0,
    None,
  );
  aside.class_name = "sidebar".to_string();
  root.children.push(aside);

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

fn bench_analyze(c: &mut Criterion) {
  let analyzer = PageAnalyzer::new();
  let mut group = c.benchmark_group("analyze_snapshot");
  for (label, sections, paragraphs) in [("small", 4, 6), ("medium", 16, 12), ("large", 64, 20)] {
    let snapshot = synthetic_snapshot(sections, paragraphs);
    group.bench_function(label, |b| {
      b.iter(|| {
        let report = analyzer.analyze_snapshot(black_box(&snapshot), 1920.0, 1080.0, false);
        black_box(report.root.block_count())
      })
    });
  }
  group.finish();
}

fn bench_complexity(c: &mut Criterion) {
  let snapshot = synthetic_snapshot(32, 16);
  let page = snapshot.page_rect();
  let mut leaves = Vec::new();
  snapshot.root.collect_leaf_bounds(Point::ZERO, &mut leaves);
  let cfg = VicramConfig::default();
  c.bench_function("complexity_score", |b| {
    b.iter(|| black_box(complexity_score(black_box(page), black_box(&leaves), &cfg)))
  });
}

criterion_group!(benches, bench_analyze, bench_complexity);
criterion_main!(benches);
