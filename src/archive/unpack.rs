//! Native archive extraction for the upstream sprite dumps.
//!
//! The veekun dumps are gzip-compressed tarballs, the battler pack is a 7z
//! archive and mirrors occasionally repackage them as ZIP. The format is
//! detected from magic bytes rather than the file extension so that
//! mislabeled mirrors still unpack.

use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Archive type detected by magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    /// gzip stream, assumed to wrap a tar archive
    TarGz,
    /// ZIP archive (PK signature)
    Zip,
    /// 7z archive (7z signature)
    SevenZ,
    /// Unknown/unsupported format
    Unknown,
}

/// Detect archive type by reading magic bytes.
pub fn detect_archive_type(path: &Path) -> Result<ArchiveType> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;

    let mut magic = [0u8; 8];
    let bytes_read = file.read(&mut magic).unwrap_or(0);

    if bytes_read < 2 {
        return Ok(ArchiveType::Unknown);
    }

    // gzip: \x1F\x8B
    if magic[0..2] == [0x1F, 0x8B] {
        return Ok(ArchiveType::TarGz);
    }

    // ZIP: PK\x03\x04 or PK\x05\x06 (empty) or PK\x07\x08 (spanned)
    if magic[0..2] == [0x50, 0x4B] {
        return Ok(ArchiveType::Zip);
    }

    // 7z: 7z\xBC\xAF\x27\x1C
    if bytes_read >= 6 && magic[0..6] == [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C] {
        return Ok(ArchiveType::SevenZ);
    }

    Ok(ArchiveType::Unknown)
}

/// Extract an entire archive into `output_dir`, creating it if needed.
pub fn extract_all(archive_path: &Path, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let archive_type = detect_archive_type(archive_path)?;
    info!(
        "Unpacking {} ({:?}) to {}",
        archive_path.display(),
        archive_type,
        output_dir.display()
    );

    match archive_type {
        ArchiveType::TarGz => extract_tar_gz(archive_path, output_dir)?,
        ArchiveType::Zip => extract_zip_to_dir(archive_path, output_dir)?,
        ArchiveType::SevenZ => {
            sevenz_rust2::decompress_file(archive_path, output_dir).with_context(|| {
                format!("Failed to decompress 7z archive: {}", archive_path.display())
            })?
        }
        ArchiveType::Unknown => bail!(
            "Unsupported archive format: {}",
            archive_path.display()
        ),
    }

    #[cfg(unix)]
    fix_permissions_recursive(output_dir)?;

    Ok(())
}

fn extract_tar_gz(archive_path: &Path, output_dir: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open tarball: {}", archive_path.display()))?;
    let tar = flate2::read::GzDecoder::new(BufReader::new(file));
    let mut archive = tar::Archive::new(tar);
    archive
        .unpack(output_dir)
        .with_context(|| format!("Failed to unpack tarball: {}", archive_path.display()))?;
    Ok(())
}

/// Extract ZIP to a directory (simple extraction, no routing)
fn extract_zip_to_dir(archive_path: &Path, output_dir: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open ZIP: {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .with_context(|| format!("Failed to read ZIP: {}", archive_path.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // Windows ZIPs have backslashes
        let entry_path = entry.name().replace('\\', "/");
        let Some(relative) = entry.enclosed_name() else {
            debug!("Skipping unsafe ZIP entry: {}", entry_path);
            continue;
        };
        let target = output_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut output = File::create(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
            std::io::copy(&mut entry, &mut output)?;
        }
    }

    Ok(())
}

/// Recursively fix permissions on extracted files.
///
/// Some archives extract with no read permission on Linux.
#[cfg(unix)]
fn fix_permissions_recursive(dir: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if let Ok(metadata) = fs::symlink_metadata(path) {
            if metadata.file_type().is_symlink() {
                continue;
            }
            let mut perms = metadata.permissions();
            let mode = perms.mode();

            if metadata.is_dir() {
                if mode & 0o700 != 0o700 {
                    perms.set_mode(mode | 0o755);
                    fs::set_permissions(path, perms).ok();
                }
            } else if mode & 0o600 != 0o600 {
                perms.set_mode(mode | 0o644);
                fs::set_permissions(path, perms).ok();
            }
        }
    }

    Ok(())
}
