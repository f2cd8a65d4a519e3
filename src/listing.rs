//! Directory enumeration.

use std::{
    ffi::{OsStr, OsString},
    fs, io,
    path::Path,
};

/// One immediate child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: OsString,
    pub is_dir: bool,
}

impl DirEntryInfo {
    pub fn dir(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    pub fn file(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }
}

pub trait FileSystem {
    /// Lists the immediate children of `path`.
    ///
    /// Fails when `path` is not a directory or cannot be read.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>>;
}

/// The local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let entries = fs::read_dir(path)?
            .filter_map(|r| r.ok())
            .map(|entry| {
                // follows symlinks, a link to a directory is a directory
                let is_dir = fs::metadata(entry.path())
                    .map(|meta| meta.is_dir())
                    .unwrap_or(false);
                DirEntryInfo {
                    name: entry.file_name(),
                    is_dir,
                }
            })
            .collect();
        Ok(entries)
    }
}

/// Returns the names of the subdirectories of `path`, sorted by name.
///
/// Names are kept as the platform gives them, so names that are not valid
/// UTF-8 can still be joined back onto `path`.
pub fn list_subdirectories<F: FileSystem + ?Sized>(
    fs: &F,
    path: &Path,
    show_hidden: bool,
) -> io::Result<Vec<OsString>> {
    let mut names: Vec<OsString> = fs
        .read_dir(path)?
        .into_iter()
        .filter(|entry| entry.is_dir)
        .filter(|entry| show_hidden || !is_hidden(&entry.name))
        .map(|entry| entry.name)
        .collect();

    names.sort();
    Ok(names)
}

fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().starts_with(b".")
}
