//! Core data types, enums, and reports for the Seihon library.
//!
//! This module defines the fundamental data structures used throughout Seihon:
//! - The user-supplied volume specification (`VolumeSpec`, `VolumeEntry`)
//! - Comprehensive series metadata (`SeriesMetadata`)
//! - Reporting types (`VolumePlan`, `RenameReport`, `RegroupReport`)
//! - Enumerations for execution modes (`ExecutionMode`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Comprehensive metadata for a series, used when generating ComicInfo.xml.
/// This struct holds all information that can be embedded into the output archive(s).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesMetadata {
    pub title: String,
    pub series: Option<String>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub language: String, // e.g., "en", "ja"
    pub genre: Option<String>,
    pub web: Option<String>, // Website link
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_fields: HashMap<String, String>, // For arbitrary key-value pairs
}

impl SeriesMetadata {
    /// Creates a default `SeriesMetadata` instance with a specified title and default language "en".
    pub fn default_with_title(title: String) -> Self {
        Self {
            title,
            language: "en".to_string(),
            ..Default::default()
        }
    }
}

/// A single declared volume: an inclusive chapter range plus optional extras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeEntry {
    /// Inclusive chapter range `[start, end]`.
    pub chapters: (u32, u32),
    /// Optional cover image inserted as the first archive entry.
    #[serde(default)]
    pub cover: Option<PathBuf>,
    /// Optional per-volume title override for ComicInfo.xml.
    #[serde(default)]
    pub title: Option<String>,
}

/// User-declared mapping from volume number to chapter range, deserialized
/// from JSON:
///
/// ```json
/// { "volumes": { "1": { "chapters": [1, 5], "cover": "covers/v1.jpg" } } }
/// ```
///
/// The legacy key `tomes` is accepted as an alias of `volumes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpec {
    #[serde(alias = "tomes")]
    pub volumes: BTreeMap<u32, VolumeEntry>,
}

impl VolumeSpec {
    /// Parses a volume specification from a JSON string and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let spec: VolumeSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parses a volume specification from a reader (e.g., an open file) and validates it.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let spec: VolumeSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Checks structural invariants: at least one volume, every range ordered.
    pub fn validate(&self) -> Result<()> {
        if self.volumes.is_empty() {
            return Err(Error::InvalidSpec(
                "no volumes declared in specification".to_string(),
            ));
        }
        for (number, entry) in &self.volumes {
            let (start, end) = entry.chapters;
            if start > end {
                return Err(Error::InvalidSpec(format!(
                    "volume {number}: chapter range [{start}, {end}] is reversed"
                )));
            }
        }
        Ok(())
    }

    /// The highest declared volume number.
    pub fn max_volume(&self) -> Option<u32> {
        self.volumes.keys().next_back().copied()
    }

    /// Digit width used when zero-padding volume numbers in output filenames.
    pub fn volume_number_width(&self) -> usize {
        self.max_volume()
            .map(|max| max.to_string().len())
            .unwrap_or(1)
    }
}

/// Specifies the intended operation for a Seihon run.
/// Used by `SeihonConfig::preflight_check` to tailor validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExecutionMode {
    /// Rewrite image entries of archive(s) to the sequential naming scheme.
    Rename,
    /// Merge chapter archives into volume archives per the volume specification.
    Regroup,
}

/// How one declared volume maps onto the chapters actually present on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeAssignment {
    pub volume: u32,
    /// Chapter numbers found within the declared range, ascending.
    pub chapters: Vec<u32>,
    /// Chapter numbers declared but absent from the input directory.
    pub missing_chapters: Vec<u32>,
}

/// Outcome of the planning phase: chapter resolution and volume assignment
/// without writing any output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumePlan {
    pub assignments: Vec<VolumeAssignment>,
    /// Input archives whose filename matched no chapter pattern.
    pub unmatched_files: Vec<PathBuf>,
}

/// Report from a rename run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameReport {
    /// Output archives, in the order they were written.
    pub outputs: Vec<PathBuf>,
    pub total_pages: usize,
}

/// Report from a regroup run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegroupReport {
    /// Output volume archives, in ascending volume order.
    pub outputs: Vec<PathBuf>,
    pub total_pages: usize,
    /// Per-volume assignments, including any missing chapters.
    pub assignments: Vec<VolumeAssignment>,
}

/// Utility function: Determines file extension and MIME type from a file path.
///
/// # Supported formats
///
/// - JPEG/JPG: image/jpeg
/// - PNG: image/png
/// - WebP: image/webp
pub fn get_file_info(image_path: &PathBuf) -> Result<(&'static str, &'static str)> {
    let extension = image_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => Ok(("jpg", "image/jpeg")),
        Some("png") => Ok(("png", "image/png")),
        Some("webp") => Ok(("webp", "image/webp")),
        _ => Err(Error::Unsupported(format!(
            "Image format {:#?}",
            extension
        ))),
    }
}
