// ZIP packager implementation
// Writes `<output>.tmp`, then swaps it into place so readers never see a partial archive
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use zipper_core::port::packager::{PackError, Packager};

/// Suffix of the in-progress archive next to the final output
pub const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone, Copy)]
pub struct ZipPackager {
    compression: CompressionMethod,
}

impl Default for ZipPackager {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipPackager {
    /// Deflate-compressed entries
    pub fn new() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }

    /// Uncompressed entries (PDF and JPEG rarely shrink)
    pub fn stored() -> Self {
        Self {
            compression: CompressionMethod::Stored,
        }
    }

    fn write_archive(&self, target: &Path, files: &[PathBuf]) -> Result<(), PackError> {
        let entries = entry_list(files)?;

        let file = File::create(target)?;
        let mut zip = ZipWriter::new(BufWriter::new(file));

        for (name, source) in &entries {
            let options = SimpleFileOptions::default().compression_method(self.compression);
            zip.start_file(name.as_str(), options).map_err(archive_error)?;
            let mut input = File::open(source)?;
            io::copy(&mut input, &mut zip)?;
        }

        let mut writer = zip.finish().map_err(archive_error)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;

        debug!(entries = entries.len(), path = %target.display(), "Archive written");
        Ok(())
    }
}

impl Packager for ZipPackager {
    fn pack(&self, output: &Path, files: &[PathBuf]) -> Result<(), PackError> {
        let temp = temp_path(output);

        if let Err(e) = self.write_archive(&temp, files) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }

        if let Err(e) = remove_if_exists(output) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp, output) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        Ok(())
    }
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Entry names by basename, keeping first-seen order.
///
/// A repeated basename keeps its first position and takes the later file.
fn entry_list(files: &[PathBuf]) -> Result<Vec<(String, &Path)>, PackError> {
    let mut entries: Vec<(String, &Path)> = Vec::with_capacity(files.len());

    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PackError::Archive(format!("no file name in {}", path.display())))?;

        match entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = path.as_path(),
            None => entries.push((name, path.as_path())),
        }
    }
    Ok(entries)
}

fn archive_error(err: ZipError) -> PackError {
    match err {
        ZipError::Io(e) => PackError::Io(e),
        other => PackError::Archive(other.to_string()),
    }
}
