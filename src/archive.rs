use memmap2::Mmap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

use crate::error::ScanError;

/// A restartable source of class entries from one artifact archive.
///
/// Bare `.class` entries and classes inside one level of nested jars
/// (`WEB-INF/lib/`) are surfaced as a flat entry stream. The archive is
/// mapped once and the zip directory re-walked per traversal.
#[derive(Debug)]
pub struct ArchiveClasses {
    path: PathBuf,
    mmap: Mmap,
}

impl ArchiveClasses {
    pub fn open(path: &Path) -> Result<Self, ScanError> {
        let file = File::open(path).map_err(|e| ScanError::archive_io(path, e))?;
        // SAFETY: The file is opened read-only and remains valid for the
        // lifetime of the mmap. The mmap is dropped before the file.
        let mmap =
            unsafe { Mmap::map(&file) }.map_err(|e| ScanError::archive_io(path, e))?;
        // Fail on non-zip input at open time rather than mid-pass.
        ZipArchive::new(Cursor::new(&mmap[..]))
            .map_err(|e| ScanError::archive(path, e.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            mmap,
        })
    }

    /// Restartable: each call traverses the full archive again in the same
    /// order.
    pub fn for_each_class(
        &self,
        visit: &mut dyn FnMut(&str, &[u8]) -> Result<(), ScanError>,
    ) -> Result<(), ScanError> {
        let mut archive = ZipArchive::new(Cursor::new(&self.mmap[..]))
            .map_err(|e| ScanError::archive(&self.path, e.to_string()))?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| ScanError::archive(&self.path, e.to_string()))?;
            let name = entry.name().to_string();

            if is_class_entry(&name) {
                let bytes = read_entry(&self.path, &mut entry)?;
                visit(&name, &bytes)?;
            } else if name.ends_with(".jar") {
                let nested_bytes = read_entry(&self.path, &mut entry)?;
                let mut nested = ZipArchive::new(Cursor::new(&nested_bytes[..]))
                    .map_err(|e| {
                        ScanError::archive(&self.path, format!("nested jar {name}: {e}"))
                    })?;
                for j in 0..nested.len() {
                    let mut inner = nested.by_index(j).map_err(|e| {
                        ScanError::archive(&self.path, format!("nested jar {name}: {e}"))
                    })?;
                    let inner_name = inner.name().to_string();
                    if is_class_entry(&inner_name) {
                        let bytes = read_entry(&self.path, &mut inner)?;
                        visit(&format!("{name}!{inner_name}"), &bytes)?;
                    }
                }
            }
        }
        Ok(())
    }
}

// META-INF/versions variants and module descriptors add no references the
// base entries lack.
fn is_class_entry(name: &str) -> bool {
    name.ends_with(".class")
        && !name.ends_with("module-info.class")
        && !name.starts_with("META-INF/")
}

fn read_entry(path: &Path, entry: &mut impl Read) -> Result<Vec<u8>, ScanError> {
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| ScanError::archive_io(path, e))?;
    Ok(bytes)
}
