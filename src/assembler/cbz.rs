use crate::assembler::{Assembler, ComicInfo};
use crate::error::{Error, Result};
use crate::path_utils::{get_file_name_lossy, path_to_string_lossy};
use crate::sequencer::page_name;
use crate::types::get_file_info;
use async_trait::async_trait;
use memmap2::MmapOptions;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::task::spawn_blocking;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// An assembler for creating CBZ (Comic Book ZIP) archives.
///
/// Entries are written under the sequential zero-padded naming scheme: the
/// cover (when present) is entry 1 and pages continue from there.
///
/// Output is staged in a `.part` sibling file and renamed into place on
/// [`save`](Assembler::save), so the target path is only replaced once the
/// archive is complete. This makes in-place normalization (output path equal
/// to an input archive) safe.
pub struct Cbz {
    zip: Option<ZipWriter<File>>,
    options: SimpleFileOptions,
    final_path: PathBuf,
    staging_path: PathBuf,
    padding_width: usize,
    next_entry: usize, // 1-based index of the next entry to write
    has_cover: bool,
}

impl Cbz {
    fn writer(&mut self) -> Result<&mut ZipWriter<File>> {
        self.zip
            .as_mut()
            .ok_or_else(|| Error::Unsupported("Zip writer not available".to_string()))
    }
}

impl Drop for Cbz {
    fn drop(&mut self) {
        // An unsaved assembler leaves an incomplete staging file behind
        if self.zip.is_some() {
            let _ = std::fs::remove_file(&self.staging_path);
        }
    }
}

#[async_trait]
impl Assembler for Cbz {
    fn create(output_path: &Path, padding_width: usize) -> Result<Self> {
        let options: SimpleFileOptions = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o755);

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let staging_path = output_path
            .with_file_name(format!("{}.part", get_file_name_lossy(output_path)));
        let file = File::create(&staging_path)?;
        let zip = ZipWriter::new(file);

        Ok(Cbz {
            zip: Some(zip),
            options,
            final_path: output_path.to_path_buf(),
            staging_path,
            padding_width,
            next_entry: 1,
            has_cover: false,
        })
    }

    async fn add_cover(&mut self, cover_path: &PathBuf) -> Result<&mut Self> {
        if self.has_cover {
            return Err(Error::Unsupported("Cover already set".to_string()));
        }
        if self.next_entry > 1 {
            return Err(Error::Unsupported(
                "Cover must be added before any page".to_string(),
            ));
        }

        let (cover_extension, _) = get_file_info(cover_path)?;

        let file = fs::File::open(cover_path).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to open cover file '{}': {}",
                    path_to_string_lossy(cover_path),
                    e
                ),
            ))
        })?;
        let file_std = file.into_std().await;

        // Read-only memory map of the cover file
        let mmap = spawn_blocking(move || unsafe { MmapOptions::new().map(&file_std) })
            .await
            .map_err(Error::Join)??;

        let entry_name = page_name(self.next_entry, self.padding_width, cover_extension);
        let options = self.options;
        let zip = self.writer()?;
        zip.start_file(entry_name, options)?;
        zip.write_all(&mmap[..])?;

        self.next_entry += 1;
        self.has_cover = true;

        Ok(self)
    }

    async fn add_page(&mut self, extension: &str, bytes: Vec<u8>) -> Result<&mut Self> {
        let entry_name = page_name(self.next_entry, self.padding_width, extension);
        let options = self.options;
        let zip = self.writer()?;

        zip.start_file(entry_name, options)?;
        zip.write_all(&bytes)?;

        self.next_entry += 1;

        Ok(self)
    }

    async fn set_metadata(&mut self, info: &ComicInfo<'_>) -> Result<&mut Self> {
        let xml = info.to_xml();
        let options = self.options;
        let zip = self.writer()?;

        zip.start_file("ComicInfo.xml", options)?;
        zip.write_all(xml.as_bytes())?;

        Ok(self)
    }

    fn entries_written(&self) -> usize {
        self.next_entry - 1
    }

    async fn save(mut self) -> Result<()> {
        let zip = self
            .zip
            .take()
            .ok_or_else(|| Error::Unsupported("Zip writer not available".to_string()))?;

        let staging_path = self.staging_path.clone();
        let final_path = self.final_path.clone();

        spawn_blocking(move || -> Result<()> {
            zip.finish().map_err(Error::Zip)?;
            std::fs::rename(&staging_path, &final_path)?;
            Ok(())
        })
        .await
        .map_err(Error::Join)??;

        Ok(())
    }
}
