use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::common::constants::{DESCRIPTOR_FILE_NAME, MANIFEST_FILE_NAME};
use crate::common::error::{io_at, BrandingError, Result};
use crate::domain::{BrandingDescriptor, ImageKind, StagedImage, BRANDING_IMAGES};

/// Lists which archive entry holds which image slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ArchiveManifest {
    images: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestEntry {
    file: String,
    #[serde(rename = "type")]
    kind: ImageKind,
}

/// Files written during the current run.
#[derive(Debug, Default)]
struct Ledger {
    images: Vec<StagedImage>,
    descriptor: bool,
}

/// Archive contents that passed validation and may be extracted.
struct ArchivePlan {
    descriptor_bytes: Vec<u8>,
    images: Vec<(String, ImageKind)>,
}

/// Transient working set of one transfer run.
///
/// Every file written through the store is tracked so the orchestrator can remove
/// exactly what a failed run left behind.
pub struct StagingStore {
    dir: PathBuf,
    ledger: Mutex<Ledger>,
}

impl StagingStore {
    /// Opens (and creates, if needed) the staging directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            ledger: Mutex::new(Ledger::default()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.dir.join(DESCRIPTOR_FILE_NAME)
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Tracks `image`, replacing any earlier file staged for the same kind.
    pub fn record(&self, image: StagedImage) {
        let mut ledger = self.ledger();
        match ledger.images.iter_mut().find(|staged| staged.image_kind == image.image_kind) {
            Some(existing) => *existing = image,
            None => ledger.images.push(image),
        }
    }

    fn forget(&self, image: &StagedImage) {
        self.ledger().images.retain(|staged| staged.file_path != image.file_path);
    }

    /// Images currently staged, in transfer order.
    pub fn staged_images(&self) -> Vec<StagedImage> {
        let mut images = self.ledger().images.clone();
        images.sort_by_key(|image| image.image_kind);
        images
    }

    pub fn has_descriptor(&self) -> bool {
        self.ledger().descriptor
    }

    /// Writes downloaded bytes to `{kind}_large.{extension}`.
    pub fn stage_image(&self, kind: ImageKind, extension: &str, bytes: &[u8]) -> Result<StagedImage> {
        let path = self.dir.join(kind.file_name(extension));
        fs::write(&path, bytes)?;
        let image = StagedImage::new(path, kind);
        self.record(image.clone());
        debug!("Staged {} ({} bytes)", image.file_path.display(), bytes.len());
        Ok(image)
    }

    pub fn write_descriptor(&self, descriptor: &BrandingDescriptor) -> Result<PathBuf> {
        let path = self.descriptor_path();
        let json = serde_json::to_vec_pretty(descriptor)?;
        self.write_descriptor_bytes(&json)?;
        Ok(path)
    }

    fn write_descriptor_bytes(&self, bytes: &[u8]) -> Result<()> {
        fs::write(self.descriptor_path(), bytes)?;
        self.ledger().descriptor = true;
        Ok(())
    }

    pub fn read_descriptor(&self) -> Result<BrandingDescriptor> {
        let path = self.descriptor_path();
        let bytes = fs::read(&path).map_err(io_at(&path))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Writes `branding.json`, a manifest and every staged image into one deflate-compressed zip.
    /// A partially written archive is removed again on failure.
    pub fn pack(&self, archive_path: &Path, descriptor: &BrandingDescriptor, images: &[StagedImage]) -> Result<()> {
        let descriptor_path = self.write_descriptor(descriptor)?;

        let result = Self::write_archive(archive_path, &descriptor_path, images);
        if result.is_err() && archive_path.exists() {
            if let Err(e) = fs::remove_file(archive_path) {
                warn!("Could not remove incomplete archive {}: {}", archive_path.display(), e);
            }
        }
        result?;

        info!("Packed {} images into {}", images.len(), archive_path.display());
        Ok(())
    }

    fn write_archive(archive_path: &Path, descriptor_path: &Path, images: &[StagedImage]) -> Result<()> {
        let file = File::create(archive_path)?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        let descriptor = fs::read(descriptor_path).map_err(io_at(descriptor_path))?;
        zip.start_file(DESCRIPTOR_FILE_NAME, options)?;
        zip.write_all(&descriptor)?;

        let manifest = ArchiveManifest {
            images: images
                .iter()
                .map(|image| ManifestEntry {
                    file: image.file_name(),
                    kind: image.image_kind,
                })
                .collect(),
        };
        zip.start_file(MANIFEST_FILE_NAME, options)?;
        zip.write_all(&serde_json::to_vec_pretty(&manifest)?)?;

        for image in images {
            let bytes = fs::read(&image.file_path).map_err(io_at(&image.file_path))?;
            zip.start_file(image.file_name(), options)?;
            zip.write_all(&bytes)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Validates the archive and extracts it into the staging directory.
    /// Nothing is extracted from an archive that fails validation.
    pub fn unpack(&self, archive_path: &Path) -> Result<Vec<StagedImage>> {
        let file = File::open(archive_path).map_err(io_at(archive_path))?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| BrandingError::InvalidArchive(format!("not a zip file ({})", e)))?;

        let plan = Self::validate_archive(&mut archive)?;

        self.write_descriptor_bytes(&plan.descriptor_bytes)?;
        let mut images = Vec::with_capacity(plan.images.len());
        for (entry_name, kind) in plan.images {
            let dest = self.dir.join(&entry_name);
            let mut entry = archive.by_name(&entry_name)?;
            let mut out = File::create(&dest)?;
            let image = StagedImage::new(dest, kind);
            self.record(image.clone());
            io::copy(&mut entry, &mut out)?;
            images.push(image);
        }

        images.sort_by_key(|image| image.image_kind);
        info!("Unpacked {} images from {}", images.len(), archive_path.display());
        Ok(images)
    }

    fn validate_archive<R: Read + io::Seek>(archive: &mut ZipArchive<R>) -> Result<ArchivePlan> {
        let names: HashSet<String> = archive.file_names().map(str::to_string).collect();

        if !names.contains(DESCRIPTOR_FILE_NAME) {
            return Err(BrandingError::InvalidArchive(format!("missing {}", DESCRIPTOR_FILE_NAME)));
        }
        let descriptor_bytes = Self::read_entry(archive, DESCRIPTOR_FILE_NAME)?;
        serde_json::from_slice::<BrandingDescriptor>(&descriptor_bytes)
            .map_err(|e| BrandingError::InvalidArchive(format!("unreadable {} ({})", DESCRIPTOR_FILE_NAME, e)))?;

        let candidates: Vec<(String, ImageKind)> = if names.contains(MANIFEST_FILE_NAME) {
            let manifest_bytes = Self::read_entry(archive, MANIFEST_FILE_NAME)?;
            let manifest: ArchiveManifest = serde_json::from_slice(&manifest_bytes)
                .map_err(|e| BrandingError::InvalidArchive(format!("unreadable {} ({})", MANIFEST_FILE_NAME, e)))?;
            let mut listed = HashSet::new();
            for entry in &manifest.images {
                if !is_flat(&entry.file) {
                    return Err(BrandingError::InvalidArchive(format!("entry '{}' is not a flat file name", entry.file)));
                }
                if entry.file == DESCRIPTOR_FILE_NAME || entry.file == MANIFEST_FILE_NAME {
                    return Err(BrandingError::InvalidArchive(format!("'{}' cannot hold an image", entry.file)));
                }
                if !listed.insert(entry.file.as_str()) {
                    return Err(BrandingError::InvalidArchive(format!("file '{}' listed more than once", entry.file)));
                }
                if !names.contains(&entry.file) {
                    return Err(BrandingError::InvalidArchive(format!("manifest lists missing file '{}'", entry.file)));
                }
            }
            manifest.images.into_iter().map(|entry| (entry.file, entry.kind)).collect()
        } else {
            let mut sorted: Vec<&String> = names.iter().collect();
            sorted.sort();
            sorted
                .into_iter()
                .filter(|name| is_flat(name))
                .filter_map(|name| kind_from_file_name(name).map(|kind| (name.clone(), kind)))
                .collect()
        };

        let mut seen = HashSet::new();
        let mut images = Vec::new();
        for (name, kind) in candidates {
            if !kind.is_transferred() {
                continue;
            }
            if !seen.insert(kind) {
                return Err(BrandingError::InvalidArchive(format!("more than one {} image", kind)));
            }
            images.push((name, kind));
        }

        if let Some(missing) = BRANDING_IMAGES.iter().find(|kind| !seen.contains(*kind)) {
            return Err(BrandingError::InvalidArchive(format!("missing {} image", missing)));
        }

        Ok(ArchivePlan { descriptor_bytes, images })
    }

    fn read_entry<R: Read + io::Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
        let mut entry = archive.by_name(name)?;
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Deletes the given images and, if requested, `branding.json`.
    /// All deletions are attempted; the first failure is returned. An already absent
    /// file is reported as `MissingFile`.
    pub fn cleanup(&self, images: &[StagedImage], include_descriptor: bool) -> Result<()> {
        let mut first_error = None;

        for image in images {
            if let Err(e) = remove_staged(&image.file_path) {
                warn!("Cleanup of {} failed: {}", image.file_path.display(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            self.forget(image);
        }

        if include_descriptor {
            let path = self.descriptor_path();
            if let Err(e) = remove_staged(&path) {
                warn!("Cleanup of {} failed: {}", path.display(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            self.ledger().descriptor = false;
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Removes everything this store staged so far.
    pub fn cleanup_all(&self) -> Result<()> {
        let images = self.staged_images();
        let include_descriptor = self.has_descriptor();
        self.cleanup(&images, include_descriptor)
    }
}

fn remove_staged(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Temporary file {} deleted", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(BrandingError::MissingFile(path.to_path_buf())),
        Err(e) => Err(BrandingError::Io(e)),
    }
}

fn is_flat(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && name != ".." && name != "."
}

/// `webLogo_large.png` -> `WebLogo`; the kind is the part before the first `_`.
fn kind_from_file_name(name: &str) -> Option<ImageKind> {
    let (prefix, _) = name.split_once('_')?;
    prefix.parse().ok()
}
