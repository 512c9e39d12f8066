//! Vision-based page segmentation and visual-complexity scoring
//!
//! `pageseg` converts the rendered layout of a web page into a hierarchy
//! of semantically-labeled visual blocks (Header, Footer, Navigation,
//! Sidebar, Article, Container, Unknown) and, independently, computes the
//! VICRAM visual-complexity score for a page. It works from geometry and
//! style alone, without relying on semantic HTML landmarks, which makes it
//! useful for content extraction, accessibility and UX audits, and layout
//! research on pages without trustworthy markup.
//!
//! # Pipeline
//!
//! ```text
//! Render Snapshot → Segmenter → Geometry Resolver → Role Classifier → JSON
//! ```
//!
//! Rendering itself is an external collaborator behind the
//! [`render::SnapshotProvider`] seam; the core consumes an
//! already-rendered [`snapshot::RenderSnapshot`] and never fetches or
//! executes pages.

pub mod api;
pub mod block;
pub mod error;
pub mod geometry;
pub mod render;
pub mod resolve;
pub mod roles;
pub mod segment;
pub mod snapshot;
pub mod vicram;

pub use api::{AnalysisReport, AnalyzeRequest, PageAnalyzer};
pub use block::{Block, Role, RoleScore};
pub use error::{Error, RenderError, Result};
pub use geometry::{Point, Rect, Size};
pub use render::{RenderRequest, SnapshotProvider};
pub use snapshot::{RenderNode, RenderSnapshot};
pub use vicram::{calculate_vicram, VicramRequest, VicramResult};
