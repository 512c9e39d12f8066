//! Score the visual complexity of a stored render snapshot
//!
//! Reads a snapshot JSON file, runs the VICRAM estimator, and prints the
//! service-style success envelope to stdout.

use clap::Parser;
use pageseg::render::FileSnapshotProvider;
use pageseg::vicram::{calculate_vicram, VicramConfig, VicramRequest};
use std::path::PathBuf;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

/// Compute the VICRAM visual-complexity score for a stored snapshot
#[derive(Parser, Debug)]
#[command(name = "page_complexity", version, about)]
struct Args {
  /// Path to the snapshot JSON file
  snapshot: PathBuf,

  /// Viewport width in CSS pixels
  #[arg(long, default_value_t = 1920.0)]
  width: f32,

  /// Viewport height in CSS pixels
  #[arg(long, default_value_t = 1080.0)]
  height: f32,

  /// Pretty-print the output JSON
  #[arg(long)]
  pretty: bool,
}

fn now_ms() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis() as u64)
    .unwrap_or(0)
}

fn main() {
  env_logger::init();
  let args = Args::parse();

  let provider = FileSnapshotProvider::new(&args.snapshot);
  let request = VicramRequest {
    width: Some(args.width),
    height: Some(args.height),
    ..VicramRequest::new(format!("file://{}", args.snapshot.display()))
  };

  let result = match calculate_vicram(&request, &provider, &VicramConfig::default()) {
    Ok(result) => result,
    Err(err) => {
      eprintln!("complexity calculation failed: {err}");
      process::exit(1);
    }
  };

  let finished = now_ms();
  let envelope = serde_json::json!({
    "success": true,
    "renderingTime": result.t1.saturating_sub(result.t0),
    "calculationTime": finished.saturating_sub(result.t1),
    "result": result,
  });
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
