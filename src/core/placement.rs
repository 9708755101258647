//! Placement of downloaded artifacts onto the SD card tree
//!
//! Zip archives are unpacked according to their layout, plain files are
//! copied into the section's destination, and console-specific touch-ups run
//! once all sections are done.

use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::core::section::SectionId;
use crate::error::{FilesystemError, PlacementError};
use crate::infra::{archive, filesystem};

/// Folder names marking an archive whose payload is nested one level down
const NESTED_ROOT_MARKERS: [&str; 2] = ["sd/", "sdout/"];

/// Hekate payload as shipped in its release zip
const HEKATE_PAYLOAD_PATTERN: &str = r"hekate_ctcaer_(?:\d+\.\d+\.\d+)\.bin";

/// How a zip archive maps onto the SD tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZipLayout {
    /// All members at top level: extract into the section destination
    Flat,
    /// Content lives under a folder such as `SdOut/`: copy that folder's
    /// content to the SD root
    Nested { folder: String },
    /// Anything else is laid out relative to the SD root
    Root,
}

/// Decide the layout from member names in archive order
pub fn zip_layout(names: &[String]) -> ZipLayout {
    if names.iter().all(|name| !name.contains('/')) {
        return ZipLayout::Flat;
    }

    if let Some(first) = names.first() {
        // ASCII-only lowercasing keeps byte offsets valid for `first`
        let lower = first.to_ascii_lowercase();
        for marker in NESTED_ROOT_MARKERS {
            if let Some(pos) = lower.find(marker) {
                let folder = &first[..pos + marker.len()];
                if !is_enclosed(folder) {
                    tracing::warn!("Ignoring unsafe nested folder `{folder}`");
                    return ZipLayout::Root;
                }
                return ZipLayout::Nested {
                    folder: folder.to_string(),
                };
            }
        }
    }

    ZipLayout::Root
}

/// Whether `path` stays below whatever directory it is joined to
fn is_enclosed(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

/// Places artifacts below an SD root
#[derive(Debug, Clone)]
pub struct Placer {
    sd_root: PathBuf,
    temp_dir: PathBuf,
}

impl Placer {
    /// Create a placer writing below `sd_root`, using `temp_dir` for
    /// intermediate extraction
    pub fn new(sd_root: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            sd_root: sd_root.into(),
            temp_dir: temp_dir.into(),
        }
    }

    /// SD root
    pub fn sd_root(&self) -> &Path {
        &self.sd_root
    }

    /// Put `artifact` where `section` wants it
    ///
    /// The artifact itself is left in place so cached files survive.
    pub fn place(&self, artifact: &Path, section: SectionId) -> Result<(), PlacementError> {
        let save_path = section.save_path(&self.sd_root);

        if artifact.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip")) {
            return self.place_zip(artifact, &save_path);
        }

        let Some(name) = artifact.file_name() else {
            return Ok(());
        };
        let target = save_path.join(name);
        filesystem::copy_file(artifact, &target)?;
        tracing::info!("Copied `{}` to `{}`", artifact.display(), target.display());
        Ok(())
    }

    fn place_zip(&self, artifact: &Path, save_path: &Path) -> Result<(), PlacementError> {
        let names = archive::member_names(artifact)?;

        match zip_layout(&names) {
            ZipLayout::Flat => archive::extract_zip(artifact, save_path),
            ZipLayout::Nested { folder } => {
                archive::extract_zip(artifact, &self.temp_dir)?;
                let extracted = self.temp_dir.join(&folder);
                filesystem::copy_tree(&extracted, &self.sd_root)?;
                tracing::info!(
                    "`{}` moved to `{}`",
                    extracted.display(),
                    self.sd_root.display()
                );
                filesystem::remove_dir_all(&extracted)?;
                Ok(())
            }
            ZipLayout::Root => archive::extract_zip(artifact, &self.sd_root),
        }
    }

    /// Delete `entries` (relative to the SD root); missing entries are fine
    pub fn remove_from_root(&self, entries: &[String]) -> Result<(), FilesystemError> {
        for entry in entries {
            let relative = Path::new(entry);
            let escapes = relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                tracing::warn!("Ignoring remove entry outside the SD root: `{entry}`");
                continue;
            }

            let path = self.sd_root.join(relative);
            if path.is_dir() {
                filesystem::remove_dir_all(&path)?;
            } else if path.is_file() {
                filesystem::remove_file(&path)?;
            } else {
                continue;
            }
            tracing::info!("Removed `{}`", path.display());
        }
        Ok(())
    }

    /// Rename the hekate payload in the SD root to `payload.bin`
    ///
    /// Returns the new path if a payload was found.
    pub fn create_payload(&self) -> Result<Option<PathBuf>, FilesystemError> {
        let pattern = Regex::new(HEKATE_PAYLOAD_PATTERN).map_err(|e| FilesystemError::Read {
            path: self.sd_root.clone(),
            error: e.to_string(),
        })?;

        for path in self.list_dir(&self.sd_root)? {
            let is_payload = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| pattern.is_match(n));
            if is_payload && path.is_file() {
                let new_path = path.with_file_name("payload.bin");
                filesystem::move_file(&path, &new_path)?;
                tracing::info!("Renamed `{}` to `{}`", path.display(), new_path.display());
                return Ok(Some(new_path));
            }
        }
        Ok(None)
    }

    /// Move every `*.nro` directly under `switch/` into its own folder
    ///
    /// `switch/app.nro` becomes `switch/app/app.nro`. Returns the number of
    /// files moved.
    pub fn move_nro_apps_into_folders(&self) -> Result<usize, FilesystemError> {
        let apps_dir = SectionId::NroApp.save_path(&self.sd_root);
        if !apps_dir.is_dir() {
            return Ok(0);
        }

        let mut moved = 0;
        for path in self.list_dir(&apps_dir)? {
            let is_nro = path.extension().is_some_and(|ext| ext == "nro");
            let (Some(stem), Some(name)) = (path.file_stem(), path.file_name()) else {
                continue;
            };
            if !is_nro || !path.is_file() {
                continue;
            }
            let target = apps_dir.join(stem).join(name);
            filesystem::move_file(&path, &target)?;
            moved += 1;
        }
        Ok(moved)
    }

    /// Copy the static overlay at `config_dir` over the SD root
    ///
    /// Returns the number of files copied; a missing overlay copies nothing.
    pub fn copy_config_files(&self, config_dir: &Path) -> Result<usize, FilesystemError> {
        if !config_dir.is_dir() {
            return Ok(0);
        }
        let copied = filesystem::copy_tree(config_dir, &self.sd_root)?;
        tracing::info!(
            "Copied `{}` to `{}`",
            config_dir.display(),
            self.sd_root.display()
        );
        Ok(copied)
    }

    /// Zip the SD root into `archive_path`
    pub fn pack(&self, archive_path: &Path) -> Result<usize, PlacementError> {
        let count = archive::pack_dir(&self.sd_root, archive_path)?;
        tracing::info!(
            "The directory `{}` has been packed into `{}`",
            self.sd_root.display(),
            archive_path.display()
        );
        Ok(count)
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, FilesystemError> {
        let read_err = |e: std::io::Error| FilesystemError::Read {
            path: dir.to_path_buf(),
            error: e.to_string(),
        };
        let mut paths = std::fs::read_dir(dir)
            .map_err(read_err)?
            .map(|entry| entry.map(|e| e.path()).map_err(read_err))
            .collect::<Result<Vec<_>, _>>()?;
        paths.sort();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::archive::tests::write_zip;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        work: PathBuf,
        placer: Placer,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let work = temp.path().to_path_buf();
        let scratch = work.join("tmp");
        std::fs::create_dir_all(&scratch).unwrap();
        let placer = Placer::new(work.join("sd"), scratch);
        Fixture {
            _temp: temp,
            work,
            placer,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_zip_layout_flat() {
        assert_eq!(zip_layout(&names(&["a.ovl", "b.ovl"])), ZipLayout::Flat);
    }

    #[test]
    fn test_zip_layout_nested() {
        assert_eq!(
            zip_layout(&names(&["SdOut/", "SdOut/atmosphere/x"])),
            ZipLayout::Nested {
                folder: "SdOut/".to_string()
            }
        );
        assert_eq!(
            zip_layout(&names(&["release/SD/switch/a.nro"])),
            ZipLayout::Nested {
                folder: "release/SD/".to_string()
            }
        );
    }

    #[test]
    fn test_zip_layout_non_ascii_prefix() {
        assert_eq!(
            zip_layout(&names(&["ȺȺȺsd/", "ȺȺȺsd/x.bin"])),
            ZipLayout::Nested {
                folder: "ȺȺȺsd/".to_string()
            }
        );
    }

    #[test]
    fn test_zip_layout_escaping_folder_falls_back_to_root() {
        assert_eq!(
            zip_layout(&names(&["../../victim/sd/x.bin", "atmosphere/y.bin"])),
            ZipLayout::Root
        );
        assert_eq!(
            zip_layout(&names(&["/sd/x.bin", "atmosphere/y.bin"])),
            ZipLayout::Root
        );
    }

    #[test]
    fn test_place_escaping_zip_keeps_outside_dirs() {
        let f = fixture();
        let outside = f.work.join("victim/sd");
        std::fs::create_dir_all(&outside).unwrap();
        std::fs::write(outside.join("keep.txt"), "keep").unwrap();
        let artifact = f.work.join("evil.zip");
        write_zip(
            &artifact,
            &[("../victim/sd/x.bin", "x"), ("atmosphere/y.bin", "y")],
        );

        f.placer.place(&artifact, SectionId::Bootloader).unwrap();

        assert!(outside.join("keep.txt").exists());
        assert!(f.placer.sd_root().join("atmosphere/y.bin").exists());
    }

    #[test]
    fn test_zip_layout_root() {
        assert_eq!(
            zip_layout(&names(&["atmosphere/", "atmosphere/package3"])),
            ZipLayout::Root
        );
    }

    #[test]
    fn test_place_plain_file_copies_into_section() {
        let f = fixture();
        let artifact = f.work.join("cache/lockpick.bin");
        std::fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        std::fs::write(&artifact, "bin").unwrap();

        f.placer.place(&artifact, SectionId::Payload).unwrap();

        assert!(f
            .placer
            .sd_root()
            .join("bootloader/payloads/lockpick.bin")
            .exists());
        // The cached original is kept
        assert!(artifact.exists());
    }

    #[test]
    fn test_place_flat_zip_into_section() {
        let f = fixture();
        let artifact = f.work.join("overlays.zip");
        write_zip(&artifact, &[("ovlmenu.ovl", "x")]);

        f.placer.place(&artifact, SectionId::Overlay).unwrap();

        assert!(f
            .placer
            .sd_root()
            .join("switch/.overlays/ovlmenu.ovl")
            .exists());
    }

    #[test]
    fn test_place_nested_zip_into_root() {
        let f = fixture();
        let artifact = f.work.join("pack.zip");
        write_zip(
            &artifact,
            &[
                ("SdOut/", ""),
                ("SdOut/atmosphere/", ""),
                ("SdOut/atmosphere/package3", "pkg"),
            ],
        );

        f.placer.place(&artifact, SectionId::Firmware).unwrap();

        assert!(f.placer.sd_root().join("atmosphere/package3").exists());
        assert!(!f.work.join("tmp/SdOut").exists());
    }

    #[test]
    fn test_place_root_zip_ignores_section_dir() {
        let f = fixture();
        let artifact = f.work.join("sys.zip");
        write_zip(&artifact, &[("atmosphere/contents/0100/exefs.nsp", "x")]);

        f.placer.place(&artifact, SectionId::AtmosphereModule).unwrap();

        assert!(f
            .placer
            .sd_root()
            .join("atmosphere/contents/0100/exefs.nsp")
            .exists());
    }

    #[test]
    fn test_remove_from_root() {
        let f = fixture();
        let sd = f.placer.sd_root().to_path_buf();
        std::fs::create_dir_all(sd.join("switch/old")).unwrap();
        std::fs::write(sd.join("switch/old/a.nro"), "").unwrap();
        std::fs::write(sd.join("keep.txt"), "").unwrap();
        std::fs::write(f.work.join("outside.txt"), "").unwrap();

        f.placer
            .remove_from_root(&names(&["switch/old", "missing.bin", "../outside.txt"]))
            .unwrap();

        assert!(!sd.join("switch/old").exists());
        assert!(sd.join("keep.txt").exists());
        assert!(f.work.join("outside.txt").exists());
    }

    #[test]
    fn test_create_payload() {
        let f = fixture();
        let sd = f.placer.sd_root().to_path_buf();
        std::fs::create_dir_all(&sd).unwrap();
        std::fs::write(sd.join("hekate_ctcaer_6.2.0.bin"), "payload").unwrap();

        let renamed = f.placer.create_payload().unwrap();

        assert_eq!(renamed, Some(sd.join("payload.bin")));
        assert!(!sd.join("hekate_ctcaer_6.2.0.bin").exists());
    }

    #[test]
    fn test_create_payload_without_hekate() {
        let f = fixture();
        std::fs::create_dir_all(f.placer.sd_root()).unwrap();
        assert_eq!(f.placer.create_payload().unwrap(), None);
    }

    #[test]
    fn test_move_nro_apps_into_folders() {
        let f = fixture();
        let switch = f.placer.sd_root().join("switch");
        std::fs::create_dir_all(switch.join(".overlays")).unwrap();
        std::fs::write(switch.join("Goldleaf.nro"), "").unwrap();
        std::fs::write(switch.join("readme.txt"), "").unwrap();

        let moved = f.placer.move_nro_apps_into_folders().unwrap();

        assert_eq!(moved, 1);
        assert!(switch.join("Goldleaf/Goldleaf.nro").exists());
        assert!(switch.join("readme.txt").exists());
    }

    #[test]
    fn test_copy_config_files() {
        let f = fixture();
        let config = f.work.join("config_files");
        std::fs::create_dir_all(config.join("bootloader")).unwrap();
        std::fs::write(config.join("bootloader/hekate_ipl.ini"), "[config]").unwrap();

        assert_eq!(f.placer.copy_config_files(&config).unwrap(), 1);
        assert!(f
            .placer
            .sd_root()
            .join("bootloader/hekate_ipl.ini")
            .exists());
        assert_eq!(
            f.placer.copy_config_files(&f.work.join("missing")).unwrap(),
            0
        );
    }
}
