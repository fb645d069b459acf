use crate::error::Error;
use crate::result::Result;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Check whether a directory has at least one subdirectory among its direct
/// entries. Symlinks pointing at directories count.
pub fn has_subdirectories(path: &Path) -> Result<bool> {
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if is_dir_entry(&entry)? {
            return Ok(true);
        }
    }

    Ok(false)
}

/// List the direct subdirectories of `path`, sorted by name
pub fn subdirectories(path: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if is_dir_entry(&entry)? {
            dirs.push(entry.path());
        }
    }
    dirs.sort();

    Ok(dirs)
}

fn is_dir_entry(entry: &fs::DirEntry) -> Result<bool> {
    let file_type = entry.file_type()?;
    Ok(file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir()))
}

/// Make a path absolute and fold away `.` and `..` components lexically.
/// Symlinks are left alone so the final component stays the name the caller used.
pub fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    Ok(normalized)
}

/// Name of the package rooted at `source`: the last component of its
/// normalized path. This becomes both the archive filename stem and the
/// top-level folder inside the archive.
pub fn package_name(source: &Path) -> Result<String> {
    let normalized = normalize(source)?;
    let name = normalized
        .file_name()
        .ok_or_else(|| Error::InvalidSource(source.display().to_string()))?;
    name.to_str()
        .map(str::to_string)
        .ok_or_else(|| Error::NonUtf8Path(normalized.display().to_string()))
}

/// Move a finished file onto its final name.
///
/// A plain rename is used when possible. Across filesystems the file is first
/// copied into a hidden staging file next to the target and that staging file
/// is renamed, so `to` never exists in a partially written state.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => copy_across(from, to),
        Err(err) => Err(err.into()),
    }
}

fn copy_across(from: &Path, to: &Path) -> Result<()> {
    let target_dir = to.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(".dirzip-")
        .suffix(".part")
        .tempfile_in(target_dir)?;

    io::copy(&mut File::open(from)?, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(to).map_err(|err| err.error)?;
    fs::remove_file(from)?;

    Ok(())
}
