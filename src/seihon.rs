use log::{debug, info, warn};
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::assembler::{Assembler, ComicInfo, cbz::Cbz};
use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::path_utils::sanitize_filename;
use crate::sequencer::padding_width;
use crate::types::{
    ExecutionMode, RegroupReport, RenameReport, SeriesMetadata, VolumeAssignment, VolumePlan,
    VolumeSpec,
};

/// The main Seihon configuration, built declaratively using the builder pattern.
///
/// This struct encapsulates all settings needed to normalize CBZ archives,
/// including input and output paths, series metadata, naming options, and the
/// volume specification for regrouping. Once configured, it can execute the
/// supported operations:
///
/// - [`rename_archives`](SeihonConfig::rename_archives): Rewrite page names of archive(s) to the sequential scheme
/// - [`regroup_volumes`](SeihonConfig::regroup_volumes): Merge chapter archives into volume archives
/// - [`plan_volumes`](SeihonConfig::plan_volumes): Dry-run chapter resolution and volume assignment
///
/// ## Builder Pattern
///
/// Use [`SeihonConfig::builder()`](SeihonConfig::builder) to create a new configuration:
///
/// ```rust,no_run
/// # use seihon::prelude::*;
/// # use std::path::PathBuf;
/// let config = SeihonConfig::builder()
///     .metadata(SeriesMetadata::default_with_title("My Series".to_string()))
///     .input_path(PathBuf::from("./chapters"))
///     .output_path(PathBuf::from("./volumes"))
///     .build()
///     .expect("Invalid configuration");
/// ```
#[derive(Debug, Clone, derive_builder::Builder)]
#[builder(setter(into, strip_option), build_fn(validate = "Self::validate"))]
pub struct SeihonConfig {
    // --- Core Settings ---
    /// Series metadata embedded into generated ComicInfo.xml files.
    ///
    /// The `title` doubles as the series name in volume archive filenames.
    /// Use [`SeriesMetadata::default_with_title`] for quick setup.
    #[builder(default = "SeriesMetadata::default_with_title(\"Untitled Series\".to_string())")]
    pub metadata: SeriesMetadata,

    /// Input CBZ file (rename mode only) or directory containing CBZ archives.
    #[builder(default)]
    pub input_path: PathBuf,

    /// Output CBZ file (single-file rename) or directory for generated archives.
    #[builder(default)]
    pub output_path: PathBuf,

    /// Optional postfix appended to output filenames before the `.cbz`
    /// extension, e.g. `" (normalized)"`.
    #[builder(default)]
    pub postfix: String,

    /// Separator between the series title and the volume label.
    ///
    /// Examples:
    /// - `" - "` -> "My Series - Volume 1.cbz"
    /// - `" | "` -> "My Series | Volume 1.cbz"
    #[builder(default = "\" - \".to_string()")]
    pub volume_separator: String,

    /// Label used for volume numbering in output filenames ("Volume", "Tome", ...).
    #[builder(default = "\"Volume\".to_string()")]
    pub volume_label: String,

    /// The volume specification. Required for [`regroup_volumes`](SeihonConfig::regroup_volumes)
    /// and [`plan_volumes`](SeihonConfig::plan_volumes); parse it from JSON
    /// with [`VolumeSpec::from_json_str`] or [`VolumeSpec::from_reader`].
    #[builder(default)]
    pub volume_spec: Option<VolumeSpec>,

    /// Custom regex pattern for extracting chapter numbers from archive
    /// filenames, tried before the built-in patterns. The first capture group
    /// is the chapter number.
    ///
    /// Example: `r"(?i)episode (\d+)\.cbz$"` to match "Series episode 4.cbz"
    #[builder(default)]
    pub chapter_pattern_str: Option<String>,

    /// Whether regrouped volumes get a generated ComicInfo.xml entry.
    /// Rename mode never writes metadata.
    #[builder(default = "true")]
    pub write_comic_info: bool,

    /// Whether to create the output directory when it does not exist.
    /// If `false`, a missing output directory is an error.
    #[builder(default = "true")]
    pub create_output_directory: bool,
}

impl SeihonConfig {
    /// Creates a new builder for configuring `SeihonConfig`.
    pub fn builder() -> SeihonConfigBuilder {
        SeihonConfigBuilder::default()
    }

    /// Performs validation checks on the configuration for a specific execution mode.
    ///
    /// This method validates the configuration without opening any archive.
    /// All operation methods call it automatically, so manual invocation is
    /// optional but recommended for early error detection.
    ///
    /// # Arguments
    ///
    /// * `mode` - The intended execution mode:
    ///   - [`ExecutionMode::Rename`]: `input_path` may be a file or a directory
    ///   - [`ExecutionMode::Regroup`]: `input_path` must be a directory and a
    ///     volume specification must be present
    ///
    /// # Returns
    ///
    /// * `Ok(&self)` - Configuration is valid for the specified mode
    /// * `Err(Error)` - Configuration has validation errors
    pub fn preflight_check(&self, mode: ExecutionMode) -> Result<&Self> {
        if self.input_path.as_os_str().is_empty() {
            return Err(Error::Other("`input_path` is required".to_string()));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(Error::Other("`output_path` is required".to_string()));
        }
        if !self.input_path.exists() {
            return Err(Error::NotFound(format!(
                "Input path does not exist: {:?}",
                self.input_path
            )));
        }

        match mode {
            ExecutionMode::Rename => {}
            ExecutionMode::Regroup => {
                if !self.input_path.is_dir() {
                    return Err(Error::InvalidPath(
                        self.input_path.clone(),
                        "Regroup mode only works with directories, not single files".to_string(),
                    ));
                }
                match &self.volume_spec {
                    Some(spec) => spec.validate()?,
                    None => {
                        return Err(Error::InvalidSpec(
                            "a volume specification is required for regrouping".to_string(),
                        ));
                    }
                }
            }
        }

        Ok(self)
    }

    /// Resolves chapters and assigns them to declared volumes without writing
    /// any output.
    ///
    /// Unlike [`regroup_volumes`](SeihonConfig::regroup_volumes), unmatched
    /// archive filenames are reported instead of failing, so callers can
    /// inspect the plan first.
    ///
    /// # Returns
    ///
    /// * `Ok(VolumePlan)` - Per-volume chapter assignments, missing chapter
    ///   numbers, and unmatched input files
    /// * `Err(Error)` - Validation or I/O errors
    pub async fn plan_volumes(&self) -> Result<VolumePlan> {
        self.preflight_check(ExecutionMode::Regroup)?;
        let spec = self.require_spec()?;

        let pattern = self.chapter_pattern()?;
        let collector = Collector::new(&self.input_path, pattern.as_ref());

        let archives = collector.collect_archives().await?;
        let (chapters, unmatched_files) = collector.resolve_chapters(&archives);

        let assignments = spec
            .volumes
            .iter()
            .map(|(&volume, entry)| {
                let (start, end) = entry.chapters;
                let mut found = Vec::new();
                let mut missing = Vec::new();
                for chapter in start..=end {
                    if chapters.contains_key(&chapter) {
                        found.push(chapter);
                    } else {
                        missing.push(chapter);
                    }
                }
                VolumeAssignment {
                    volume,
                    chapters: found,
                    missing_chapters: missing,
                }
            })
            .collect();

        Ok(VolumePlan {
            assignments,
            unmatched_files,
        })
    }

    /// Renames page entries of CBZ archive(s) to the sequential zero-padded
    /// scheme.
    ///
    /// When `input_path` is a file, the result is written to `output_path`.
    /// When it is a directory, every CBZ archive in it is rewritten into the
    /// output directory as `{stem}{postfix}.cbz`.
    ///
    /// # Returns
    ///
    /// * `Ok(RenameReport)` - Output paths and total pages written
    /// * `Err(Error)` - Validation, archive, or I/O errors
    pub async fn rename_archives(&self) -> Result<RenameReport> {
        self.preflight_check(ExecutionMode::Rename)?;

        let pairs: Vec<(PathBuf, PathBuf)> = if self.input_path.is_file() {
            vec![(self.input_path.clone(), self.output_path.clone())]
        } else {
            self.ensure_output_directory().await?;

            let pattern = self.chapter_pattern()?;
            let collector = Collector::new(&self.input_path, pattern.as_ref());
            let archives = collector.collect_archives().await?;

            archives
                .into_iter()
                .map(|archive| {
                    let stem = archive
                        .file_stem()
                        .map(|s| s.to_string_lossy().to_string())
                        .unwrap_or_else(|| "archive".to_string());
                    let out_name =
                        sanitize_filename(&format!("{}{}.cbz", stem, self.postfix));
                    let output = self.output_path.join(out_name);
                    (archive, output)
                })
                .collect()
        };

        let mut report = RenameReport::default();

        for (archive, output) in pairs {
            info!("Renaming pages of {:?}", archive.file_name());
            let entries = Collector::image_entries(&archive).await?;
            let sources = vec![(archive, entries)];
            let pages = self.assemble_archive(&output, &sources, None, None).await?;

            info!("Archive written: {:?} ({} pages)", output, pages);
            report.total_pages += pages;
            report.outputs.push(output);
        }

        Ok(report)
    }

    /// Regroups chapter archives into volume archives per the volume
    /// specification.
    ///
    /// Chapters are merged in ascending chapter order; within a chapter,
    /// pages keep their in-archive reading order. A declared cover becomes
    /// the first entry of its volume. Missing chapters and missing cover
    /// files are logged as warnings; an archive filename that resolves to no
    /// chapter number is a hard error listing every offending file.
    ///
    /// # Returns
    ///
    /// * `Ok(RegroupReport)` - Output paths, per-volume assignments, total pages
    /// * `Err(Error)` - Validation, resolution, archive, or I/O errors
    pub async fn regroup_volumes(&self) -> Result<RegroupReport> {
        self.preflight_check(ExecutionMode::Regroup)?;
        let spec = self.require_spec()?;

        let pattern = self.chapter_pattern()?;
        let collector = Collector::new(&self.input_path, pattern.as_ref());

        let archives = collector.collect_archives().await?;
        let (chapters, unmatched) = collector.resolve_chapters(&archives);
        if !unmatched.is_empty() {
            return Err(Error::ChapterExtraction(unmatched));
        }

        self.ensure_output_directory().await?;

        let volume_width = spec.volume_number_width();
        let mut report = RegroupReport::default();

        for (&volume, entry) in &spec.volumes {
            let (start, end) = entry.chapters;
            info!("Creating {} {} ({} -> {})", self.volume_label, volume, start, end);

            let mut found: Vec<u32> = Vec::new();
            let mut missing: Vec<u32> = Vec::new();
            let mut volume_archives: Vec<PathBuf> = Vec::new();
            for chapter in start..=end {
                match chapters.get(&chapter) {
                    Some(path) => {
                        found.push(chapter);
                        volume_archives.push(path.clone());
                    }
                    None => missing.push(chapter),
                }
            }

            if !missing.is_empty() {
                warn!(
                    "Missing chapters for {} {}: {}",
                    self.volume_label,
                    volume,
                    missing
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            if volume_archives.is_empty() {
                return Err(Error::EmptyVolume(volume));
            }

            let cover = match &entry.cover {
                Some(path) if path.exists() => Some(path),
                Some(path) => {
                    warn!(
                        "Cover image not found for {} {}: {:?}",
                        self.volume_label, volume, path
                    );
                    None
                }
                None => None,
            };

            let entries = Collector::collect_entries(&volume_archives).await?;
            let sources: Vec<(PathBuf, Vec<String>)> =
                volume_archives.into_iter().zip(entries).collect();

            let out_name = sanitize_filename(&format!(
                "{}{}{} {:0width$}{}.cbz",
                self.metadata.title,
                self.volume_separator,
                self.volume_label,
                volume,
                self.postfix,
                width = volume_width,
            ));
            let output = self.output_path.join(out_name);

            let pages = self
                .assemble_archive(
                    &output,
                    &sources,
                    cover,
                    Some((volume, entry.title.as_deref())),
                )
                .await?;

            info!("{} {} created: {:?} ({} pages)", self.volume_label, volume, output, pages);
            report.total_pages += pages;
            report.outputs.push(output);
            report.assignments.push(VolumeAssignment {
                volume,
                chapters: found,
                missing_chapters: missing,
            });
        }

        Ok(report)
    }

    // --- Private helpers ---

    fn require_spec(&self) -> Result<&VolumeSpec> {
        self.volume_spec.as_ref().ok_or_else(|| {
            Error::InvalidSpec("a volume specification is required for regrouping".to_string())
        })
    }

    /// Compiles the custom chapter pattern, if configured. Validity was
    /// already checked at build time.
    fn chapter_pattern(&self) -> Result<Option<Regex>> {
        self.chapter_pattern_str
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(Error::Regex)
    }

    async fn ensure_output_directory(&self) -> Result<()> {
        if self.output_path.exists() {
            return Ok(());
        }
        if !self.create_output_directory {
            return Err(Error::NotFound(format!(
                "Output directory does not exist: {:?}",
                self.output_path
            )));
        }
        fs::create_dir_all(&self.output_path).await?;
        Ok(())
    }

    /// Writes one output archive: optional cover first, then every source
    /// archive's pages in order, renamed to the sequential scheme.
    ///
    /// Returns the total number of entries written (cover included).
    async fn assemble_archive(
        &self,
        output_path: &Path,
        sources: &[(PathBuf, Vec<String>)],
        cover: Option<&PathBuf>,
        volume: Option<(u32, Option<&str>)>,
    ) -> Result<usize> {
        let page_count: usize = sources.iter().map(|(_, entries)| entries.len()).sum();
        let total_entries = page_count + usize::from(cover.is_some());
        if total_entries == 0 {
            return Err(Error::EmptyArchive(output_path.to_path_buf()));
        }

        let mut assembler = Cbz::create(output_path, padding_width(total_entries))?;

        if let Some(cover_path) = cover {
            assembler.add_cover(cover_path).await?;
        }

        for (archive, entries) in sources {
            debug!("Appending {} pages from {:?}", entries.len(), archive.file_name());
            let pages = Collector::read_entry_bytes(archive, entries).await?;
            for (extension, bytes) in pages {
                assembler.add_page(&extension, bytes).await?;
            }
        }

        if self.write_comic_info {
            if let Some((number, title)) = volume {
                let info = ComicInfo::new(&self.metadata, Some(number), total_entries)
                    .with_title(title);
                assembler.set_metadata(&info).await?;
            }
        }

        let written = assembler.entries_written();
        assembler.save().await?;

        Ok(written)
    }
}

impl SeihonConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        // Validate the custom chapter pattern if provided
        if let Some(Some(s)) = &self.chapter_pattern_str {
            if Regex::new(s).is_err() {
                return Err(format!("Invalid chapter_pattern: {}", s));
            }
        }

        // Validate the volume specification if provided
        if let Some(Some(spec)) = &self.volume_spec {
            spec.validate().map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}
