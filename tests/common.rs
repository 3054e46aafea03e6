//! Common test utilities and constants for the Seihon crate.
//!
//! Provides functions for setting up and tearing down test directories,
//! creating dummy CBZ fixtures, and shared test constants.

use image::{Rgb, RgbImage};
use rand::{Rng, distributions::Alphanumeric};
use seihon::error::{Error, Result};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use zip::write::SimpleFileOptions;

#[allow(dead_code)]
pub const TEST_TMP_DIR: &str = "tests/tmp";

/// Directory layout shared by every test: an isolated base directory with
/// `source` and `target` subdirectories.
pub struct TestDirs {
    pub base: PathBuf,
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
}

/// Helper function to create a clean test directory with source and target
/// subdirectories. Ensures the base directory is empty before a test runs.
#[allow(dead_code)]
pub async fn setup_test_dirs(sub_path: &str) -> TestDirs {
    let rand_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let unique_sub_path = format!("{}-{}", sub_path, rand_string);
    let base = PathBuf::from(TEST_TMP_DIR).join(unique_sub_path);
    if base.exists() {
        fs::remove_dir_all(&base).await.unwrap();
    }
    let source_dir = base.join("source");
    let target_dir = base.join("target");

    fs::create_dir_all(&source_dir).await.unwrap();
    fs::create_dir_all(&target_dir).await.unwrap();

    TestDirs {
        base,
        source_dir,
        target_dir,
    }
}

/// Encodes a small solid-color JPEG and returns its bytes.
#[allow(dead_code)]
pub fn dummy_jpeg_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(10, 10, Rgb([120, 80, 40]));
    let mut cursor = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, image::ImageFormat::Jpeg)
        .unwrap();
    cursor.into_inner()
}

/// Creates a minimal dummy JPEG image file at the given path.
#[allow(dead_code)]
pub async fn create_dummy_image(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let path_clone = path.to_path_buf();
    tokio::task::spawn_blocking(move || std::fs::write(path_clone, dummy_jpeg_bytes()))
        .await
        .map_err(|e| Error::Other(e.to_string()))??;
    Ok(())
}

/// Creates a CBZ archive at `path` containing one dummy JPEG per entry name.
///
/// Entry names are written in the given order, so tests control the stored
/// (unsorted) order explicitly.
#[allow(dead_code)]
pub async fn create_chapter_cbz(path: &Path, entry_names: &[&str]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let path_clone = path.to_path_buf();
    let names: Vec<String> = entry_names.iter().map(|n| n.to_string()).collect();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let file = std::fs::File::create(&path_clone)?;
        let mut writer = zip::ZipWriter::new(file);
        let bytes = dummy_jpeg_bytes();
        for name in &names {
            writer.start_file(name.as_str(), SimpleFileOptions::default())?;
            writer.write_all(&bytes)?;
        }
        writer.finish()?;
        Ok(())
    })
    .await
    .map_err(|e| Error::Other(e.to_string()))??;

    Ok(())
}

/// Returns the entry names of a ZIP archive in stored order.
#[allow(dead_code)]
pub fn zip_entry_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Reads the ComicInfo.xml from a CBZ file, if present.
#[allow(dead_code)]
pub fn read_comic_info(path: &Path) -> Option<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name("ComicInfo.xml").ok()?;
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    Some(content)
}

/// Checks that a CBZ archive exists and contains at least one entry.
#[allow(dead_code)]
pub fn assert_valid_cbz(path: &Path) {
    assert!(path.exists(), "Output CBZ does not exist: {:?}", path);
    assert!(path.is_file(), "Output CBZ path is not a file: {:?}", path);

    let file = std::fs::File::open(path).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    assert!(archive.len() > 0, "Output CBZ is empty: {:?}", path);
}
