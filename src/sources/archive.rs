use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use zip::ZipArchive;

use crate::sources::error::ArchiveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Zip,
    Gzip,
    Plain,
}

fn kind_of(path: &Path) -> Kind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("zip") => Kind::Zip,
        Some("gz") => Kind::Gzip,
        _ => Kind::Plain,
    }
}

/// Unpacks compressed feeds next to the archive and returns the path of the
/// content to read. Plain files pass through unchanged.
pub fn expand(path: &Path) -> Result<PathBuf, ArchiveError> {
    match kind_of(path) {
        Kind::Zip => expand_zip(path),
        Kind::Gzip => expand_gzip(path),
        Kind::Plain => Ok(path.to_path_buf()),
    }
}

/// Extracts every member and returns the first listed one.
fn expand_zip(path: &Path) -> Result<PathBuf, ArchiveError> {
    let dest = path.parent().unwrap_or_else(|| Path::new("."));
    log::info!("Unzipping {}...", path.display());

    let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
    if archive.len() == 0 {
        return Err(ArchiveError::Empty(path.display().to_string()));
    }

    let mut members = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ArchiveError::UnsafePath(entry.name().to_string()))?;
        let out_path = dest.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut writer = BufWriter::new(File::create(&out_path)?);
            io::copy(&mut entry, &mut writer)?;
            writer.flush()?;
        }
        members.push(out_path);
    }

    log::info!(
        "Extracted {:?}",
        members
            .iter()
            .filter_map(|p| p.file_name())
            .collect::<Vec<_>>()
    );
    Ok(members.swap_remove(0))
}

fn expand_gzip(path: &Path) -> Result<PathBuf, ArchiveError> {
    let output_path = path.with_extension("");
    let mut decoder = GzDecoder::new(BufReader::new(File::open(path)?));
    let mut writer = BufWriter::new(File::create(&output_path)?);

    match io::copy(&mut decoder, &mut writer).and_then(|_| writer.flush()) {
        Ok(()) => Ok(output_path),
        Err(e) => {
            // Clean up partial files on error
            drop(writer);
            let _ = fs::remove_file(&output_path);
            Err(ArchiveError::Io(e))
        }
    }
}
