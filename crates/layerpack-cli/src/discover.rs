//! Source image discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::input::InputError;

/// Extensions (without the dot, case-sensitive) of files picked up as sources.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "bmp", "tga", "gif", "hdr"];

/// Extension of formats that are unlikely to carry a usable alpha channel.
pub const ALPHA_UNRELIABLE_EXTENSION: &str = "jpg";

/// Supported images found in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageListing {
    /// Source paths in packing order.
    pub paths: Vec<PathBuf>,
    /// Whether any `.jpg` file was found.
    pub has_jpg: bool,
}

/// Whether `path` has one of the supported extensions.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// List the supported image files directly inside `dir`.
///
/// Subdirectories are not searched. Paths are stably sorted by their raw
/// bytes, which fixes the packing order independent of the filesystem.
pub fn list_images(dir: &Path) -> Result<ImageListing, InputError> {
    if !dir.is_dir() {
        return Err(InputError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut paths = Vec::new();
    let mut has_jpg = false;

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| InputError::Enumeration {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if path.extension().is_some_and(|ext| ext == ALPHA_UNRELIABLE_EXTENSION) {
            has_jpg = true;
        }
        if is_supported(&path) {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(InputError::NoSupportedImagesFound {
            path: dir.to_path_buf(),
        });
    }

    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    Ok(ImageListing { paths, has_jpg })
}
