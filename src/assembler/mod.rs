//! Assembler module provides the trait and implementations for output archive writers.
//!
//! This module contains the common interface for archive assemblers and the
//! CBZ implementation. The trait keeps the pipeline independent of the
//! concrete output container.

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod cbz;
pub mod comicinfo;

pub use comicinfo::ComicInfo;

/// Common interface for all output archive assemblers.
///
/// An assembler receives an optional cover, then page images in final reading
/// order, and writes them out under the sequential zero-padded naming scheme.
#[async_trait]
pub trait Assembler {
    /// Creates a new assembler writing to `output_path`.
    ///
    /// # Parameters
    /// * `output_path` - Full path of the archive to create (parent directories are created)
    /// * `padding_width` - Digit width for zero-padded entry names
    ///
    /// # Returns
    /// * `Result<Self>` - A new assembler instance or an error if creation fails
    fn create(output_path: &Path, padding_width: usize) -> Result<Self>
    where
        Self: Sized;

    /// Adds a cover image as the first entry. Must be called before any page.
    ///
    /// # Parameters
    /// * `cover_path` - Path to the cover image file on disk
    async fn add_cover(&mut self, cover_path: &PathBuf) -> Result<&mut Self>
    where
        Self: Sized;

    /// Appends the next page under the sequential naming scheme.
    ///
    /// # Parameters
    /// * `extension` - Lowercase image extension of the page (e.g. "jpg")
    /// * `bytes` - Raw image bytes
    async fn add_page(&mut self, extension: &str, bytes: Vec<u8>) -> Result<&mut Self>
    where
        Self: Sized;

    /// Embeds ComicInfo.xml metadata into the archive.
    async fn set_metadata(&mut self, info: &ComicInfo<'_>) -> Result<&mut Self>
    where
        Self: Sized;

    /// Number of entries written so far (cover included).
    fn entries_written(&self) -> usize;

    /// Finalizes the archive and writes it to disk.
    async fn save(self) -> Result<()>;
}
