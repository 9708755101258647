//! Zip archive handling
//!
//! Reading member names, extracting archives and packing a directory tree.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::PlacementError;

/// List member names in archive order
pub fn member_names(archive_path: &Path) -> Result<Vec<String>, PlacementError> {
    let archive = open(archive_path)?;
    Ok(archive.file_names().map(str::to_string).collect())
}

/// Extract every member of `archive_path` into `destination`
///
/// Members whose path would leave `destination` are skipped.
pub fn extract_zip(archive_path: &Path, destination: &Path) -> Result<(), PlacementError> {
    let extract_err = |error: String| PlacementError::Extract {
        path: archive_path.to_path_buf(),
        error,
    };

    let mut archive = open(archive_path)?;
    std::fs::create_dir_all(destination).map_err(|e| extract_err(e.to_string()))?;

    for i in 0..archive.len() {
        let mut member = archive.by_index(i).map_err(|e| extract_err(e.to_string()))?;
        let Some(relative) = member.enclosed_name() else {
            tracing::warn!("Skipping unsafe zip member `{}`", member.name());
            continue;
        };
        let outpath = destination.join(relative);

        if member.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| extract_err(e.to_string()))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| extract_err(e.to_string()))?;
        }
        let mut outfile = File::create(&outpath).map_err(|e| extract_err(e.to_string()))?;
        std::io::copy(&mut member, &mut outfile).map_err(|e| extract_err(e.to_string()))?;
    }

    tracing::info!(
        "Zip file `{}` extracted to `{}`",
        archive_path.display(),
        destination.display()
    );
    Ok(())
}

/// Pack the contents of `source_dir` into a new zip at `archive_path`
///
/// Member paths are relative to `source_dir`. Returns the number of files
/// written.
pub fn pack_dir(source_dir: &Path, archive_path: &Path) -> Result<usize, PlacementError> {
    let pack_err = |error: String| PlacementError::Pack {
        path: archive_path.to_path_buf(),
        error,
    };

    let file = File::create(archive_path).map_err(|e| pack_err(e.to_string()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    let mut packed = 0;

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| pack_err(e.to_string()))?;
        let Ok(relative) = entry.path().strip_prefix(source_dir) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            writer
                .add_directory(name, options)
                .map_err(|e| pack_err(e.to_string()))?;
        } else {
            writer
                .start_file(name, options)
                .map_err(|e| pack_err(e.to_string()))?;
            let mut buffer = Vec::new();
            File::open(entry.path())
                .and_then(|mut f| f.read_to_end(&mut buffer))
                .map_err(|e| pack_err(e.to_string()))?;
            writer.write_all(&buffer).map_err(|e| pack_err(e.to_string()))?;
            packed += 1;
        }
    }

    writer.finish().map_err(|e| pack_err(e.to_string()))?;
    Ok(packed)
}

fn open(archive_path: &Path) -> Result<ZipArchive<File>, PlacementError> {
    let extract_err = |error: String| PlacementError::Extract {
        path: archive_path.to_path_buf(),
        error,
    };
    let file = File::open(archive_path).map_err(|e| extract_err(e.to_string()))?;
    ZipArchive::new(file).map_err(|e| extract_err(e.to_string()))
}
