//! Chapter archive collection and resolution module.
//!
//! This module scans a directory for CBZ archives, resolves each archive to a
//! chapter number via filename pattern matching, and lists the page images
//! contained in each archive.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::try_join_all;
use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use tokio::fs::{ReadDir, read_dir};
use tokio::spawn;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, spawn_blocking};

use crate::error::{Error, Result};
use crate::path_utils::{get_file_name_lossy, is_hidden_file};
use crate::sequencer::filter_and_sort_entries;

lazy_static! {
    /// Default chapter-number patterns, tried in order against the archive
    /// filename. The first capture group is the chapter number.
    pub static ref DEFAULT_CHAPTER_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i) - (\d+)\.cbz$").unwrap(),      // "Series - 19.cbz"
        Regex::new(r"(?i)chapitre (\d+)\.cbz$").unwrap(), // "Series chapitre 1.cbz"
        Regex::new(r"(?i)chapter (\d+)\.cbz$").unwrap(),  // "Series chapter 1.cbz"
        Regex::new(r"(?i)ch\.? ?(\d+)\.cbz$").unwrap(),   // "Series ch. 1.cbz" / "Series ch 1.cbz"
        Regex::new(r"(?i)[- ](\d+)\.cbz$").unwrap(),      // "Series-1.cbz" / "Series 1.cbz"
    ];
}

/// Limits the number of archives opened concurrently while listing entries
fn max_concurrent_archives() -> usize {
    num_cpus::get().min(8)
}

/// Manages discovery and resolution of chapter archives in a directory
#[derive(Debug)]
pub struct Collector<'a> {
    input_directory: &'a PathBuf,
    chapter_pattern: Option<&'a Regex>, // Custom pattern tried before the defaults
}

impl<'a> Collector<'a> {
    /// Creates a new Collector instance for the specified directory.
    ///
    /// # Arguments
    ///
    /// * `input_directory` - Path to the directory containing chapter archives
    /// * `chapter_pattern` - Optional custom regex for parsing chapter filenames
    pub fn new(input_directory: &'a PathBuf, chapter_pattern: Option<&'a Regex>) -> Self {
        Self {
            input_directory,
            chapter_pattern,
        }
    }

    /// Extracts a chapter number from an archive filename.
    ///
    /// The custom pattern (if configured) is tried first, then the default
    /// pattern list. Returns `None` when nothing matches.
    pub fn extract_chapter_number(&self, archive: &PathBuf) -> Option<u32> {
        let file_name = get_file_name_lossy(archive);

        if let Some(pattern) = self.chapter_pattern {
            if let Some(number) = Self::apply_pattern(pattern, &file_name) {
                return Some(number);
            }
        }

        Self::extract_with_defaults(&file_name)
    }

    /// Runs the default pattern list against a bare filename.
    pub fn extract_with_defaults(file_name: &str) -> Option<u32> {
        DEFAULT_CHAPTER_PATTERNS
            .iter()
            .find_map(|pattern| Self::apply_pattern(pattern, file_name))
    }

    fn apply_pattern(pattern: &Regex, file_name: &str) -> Option<u32> {
        pattern.captures(file_name).and_then(|cap| {
            cap.get(1)
                .or_else(|| cap.get(0))
                .and_then(|m| m.as_str().parse::<u32>().ok())
        })
    }

    /// Collects CBZ archives from the input directory (non-recursive).
    ///
    /// Hidden files and non-CBZ entries are skipped. The result is sorted by
    /// filename so runs are deterministic regardless of directory order.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<PathBuf>>` - Paths to the archives found
    pub async fn collect_archives(&self) -> Result<Vec<PathBuf>> {
        let mut archives: Vec<PathBuf> = Vec::new();

        let mut paths: ReadDir = read_dir(self.input_directory).await.map_err(Error::Io)?;

        while let Some(entry) = paths.next_entry().await.map_err(Error::Io)? {
            let path = entry.path();

            if is_hidden_file(&path) || !path.is_file() {
                continue;
            }

            let is_cbz = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("cbz"))
                .unwrap_or(false);
            if !is_cbz {
                continue;
            }

            archives.push(path);
        }

        if archives.is_empty() {
            return Err(Error::NotFound(format!(
                "No CBZ archives found in directory: {:?}",
                self.input_directory
            )));
        }

        archives.par_sort();
        Ok(archives)
    }

    /// Resolves archives to chapter numbers.
    ///
    /// # Returns
    ///
    /// A map of chapter number to archive path, plus the archives whose
    /// filename matched no pattern.
    pub fn resolve_chapters(
        &self,
        archives: &[PathBuf],
    ) -> (BTreeMap<u32, PathBuf>, Vec<PathBuf>) {
        let mut chapters: BTreeMap<u32, PathBuf> = BTreeMap::new();
        let mut unmatched: Vec<PathBuf> = Vec::new();

        for archive in archives {
            match self.extract_chapter_number(archive) {
                Some(number) => {
                    chapters.insert(number, archive.clone());
                }
                None => unmatched.push(archive.clone()),
            }
        }

        (chapters, unmatched)
    }

    /// Lists the page image entries of a single archive, in reading order.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<String>>` - Sorted entry names, or `EmptyArchive` if the
    ///   archive contains no recognized images
    pub async fn image_entries(archive: &PathBuf) -> Result<Vec<String>> {
        let path = archive.clone();
        let names: Vec<String> = spawn_blocking(move || -> Result<Vec<String>> {
            let file = File::open(&path)?;
            let zip = zip::ZipArchive::new(file)?;
            Ok(zip.file_names().map(|n| n.to_string()).collect())
        })
        .await??;

        let images = filter_and_sort_entries(names);
        if images.is_empty() {
            return Err(Error::EmptyArchive(archive.clone()));
        }
        Ok(images)
    }

    /// Reads the raw bytes of the given entries from an archive, in order.
    ///
    /// # Returns
    ///
    /// * `Result<Vec<(String, Vec<u8>)>>` - (lowercase extension, bytes) per entry
    pub async fn read_entry_bytes(
        archive: &PathBuf,
        entries: &[String],
    ) -> Result<Vec<(String, Vec<u8>)>> {
        let path = archive.clone();
        let names = entries.to_vec();

        spawn_blocking(move || -> Result<Vec<(String, Vec<u8>)>> {
            let file = File::open(&path)?;
            let mut zip = zip::ZipArchive::new(file)?;
            let mut pages = Vec::with_capacity(names.len());

            for name in &names {
                let extension = crate::sequencer::entry_extension(name)
                    .ok_or_else(|| Error::Unsupported(format!("Image format of '{}'", name)))?;
                let mut entry = zip.by_name(name)?;
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                std::io::Read::read_to_end(&mut entry, &mut bytes)?;
                pages.push((extension, bytes));
            }

            Ok(pages)
        })
        .await?
    }

    /// Lists page image entries for each archive, with bounded fan-out.
    ///
    /// Results are returned in input order.
    pub async fn collect_entries(archives: &[PathBuf]) -> Result<Vec<Vec<String>>> {
        let semaphore = Arc::new(Semaphore::new(max_concurrent_archives()));
        let mut handles: Vec<JoinHandle<Result<(usize, Vec<String>)>>> = Vec::new();

        for (index, archive) in archives.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);

            handles.push(spawn(async move {
                let _permit = semaphore.acquire().await?;
                let entries = Self::image_entries(&archive).await?;
                Ok((index, entries))
            }));
        }

        let results = try_join_all(handles)
            .await
            .map_err(|e| Error::Other(format!("Failed to join entry listing tasks: {}", e)))?;

        let mut entries_per_archive = vec![Vec::new(); results.len()];
        for res in results {
            let (index, entries) = res?;
            entries_per_archive[index] = entries;
        }

        Ok(entries_per_archive)
    }
}
