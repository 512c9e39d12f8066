//! Analyze a stored render snapshot into a classified block tree
//!
//! Reads a snapshot JSON file (the render collaborator's output), runs the
//! segmentation pipeline, and prints the service-style success envelope to
//! stdout.

use clap::Parser;
use pageseg::api::{AnalyzeRequest, PageAnalyzer};
use pageseg::render::FileSnapshotProvider;
use std::path::PathBuf;
use std::process;

/// Segment and classify a stored render snapshot
#[derive(Parser, Debug)]
#[command(name = "analyze_page", version, about)]
struct Args {
  /// Path to the snapshot JSON file
  snapshot: PathBuf,

  /// Viewport width in CSS pixels
  #[arg(long, default_value_t = 1920.0)]
  width: f32,

  /// Viewport height in CSS pixels
  #[arg(long, default_value_t = 1080.0)]
  height: f32,

  /// Retain ranked role candidates per block
  #[arg(long)]
  explain_roles: bool,

  /// Pretty-print the output JSON
  #[arg(long)]
  pretty: bool,
}

fn main() {
  env_logger::init();
  let args = Args::parse();

  let provider = FileSnapshotProvider::new(&args.snapshot);
  let request = AnalyzeRequest {
    width: Some(args.width),
    height: Some(args.height),
    explain_roles: args.explain_roles,
    ..AnalyzeRequest::new(format!("file://{}", args.snapshot.display()))
  };

  let report = match PageAnalyzer::new().analyze(&request, &provider) {
    Ok(report) => report,
    Err(err) => {
      eprintln!("analysis failed: {err}");
      process::exit(1);
    }
  };

  let envelope = report.to_envelope();
  let rendered = if args.pretty {
    serde_json::to_string_pretty(&envelope)
  } else {
    serde_json::to_string(&envelope)
  };
  match rendered {
    Ok(json) => println!("{json}"),
    Err(err) => {
      eprintln!("failed to serialize output: {err}");
      process::exit(1);
    }
  }
}
