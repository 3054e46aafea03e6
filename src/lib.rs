//! Seihon - CBZ Normalization and Regrouping Library
//!
//! This crate normalizes comic-book archives (CBZ) for e-reader
//! compatibility: it renames contained page images to a zero-padded
//! sequential scheme, and regroups chapter archives into volume archives
//! according to a user-supplied JSON volume specification.
//!
//! # Getting Started
//!
//! Define your task by configuring a `SeihonConfig` via its builder, then
//! execute it with `rename_archives` or `regroup_volumes`.
//!
//! ```rust,no_run
//! use seihon::prelude::*;
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> seihon::error::Result<()> {
//!     // 1. Declare which chapters belong to which volume
//!     let spec = VolumeSpec::from_json_str(
//!         r#"{ "volumes": {
//!             "1": { "chapters": [1, 5], "cover": "covers/v1.jpg" },
//!             "2": { "chapters": [6, 10] }
//!         } }"#,
//!     )?;
//!
//!     // 2. Configure the run using the builder
//!     let config = SeihonConfig::builder()
//!         .metadata(SeriesMetadata::default_with_title("My Series".to_string()))
//!         .input_path(PathBuf::from("./chapters"))
//!         .output_path(PathBuf::from("./volumes"))
//!         .volume_spec(spec)
//!         .build()?;
//!
//!     // Optional: inspect the chapter-to-volume assignment first
//!     let plan = config.plan_volumes().await?;
//!     println!("{} volumes planned", plan.assignments.len());
//!
//!     // 3. Write the volume archives
//!     let report = config.regroup_volumes().await?;
//!     println!("{} pages written", report.total_pages);
//!
//!     Ok(())
//! }
//! ```
//!
//! For plain page renaming without regrouping, leave out the volume
//! specification and call `rename_archives` on a file or directory.

pub mod assembler;
pub mod collector;
pub mod error;
pub mod path_utils;
pub mod seihon;
pub mod sequencer;
pub mod types;

// Publicly expose the main `SeihonConfig` struct and its builder
pub use seihon::SeihonConfig;
pub use seihon::SeihonConfigBuilder;

// Re-export error and core types for direct access
pub use types::{
    ExecutionMode, RegroupReport, RenameReport, SeriesMetadata, VolumeAssignment, VolumeEntry,
    VolumePlan, VolumeSpec,
};

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types, allowing you to
/// import everything you need with a single `use seihon::prelude::*;` statement.
pub mod prelude {
    pub use super::{
        ExecutionMode, RegroupReport, RenameReport, SeihonConfig, SeihonConfigBuilder,
        SeriesMetadata, VolumeAssignment, VolumeEntry, VolumePlan, VolumeSpec, error, types,
    };
    pub use crate::collector::Collector;
    pub use std::path::{Path, PathBuf};
}
