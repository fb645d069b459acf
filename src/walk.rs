use crate::error::Error;
use crate::result::Result;
use crate::utils;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A file to be packaged: where it lives on disk and the member name it gets
/// inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    pub absolute_path: PathBuf,
    /// Forward-slash path relative to the parent of the package root, so it
    /// always starts with the package name.
    pub archive_path: String,
}

/// Lazy traversal of a package root yielding one [`PackageFile`] per regular
/// file. Every call to [`package_files`] starts a fresh walk.
pub struct PackageFiles {
    starting_point: PathBuf,
    entries: walkdir::IntoIter,
}

/// Start walking `root`. Entries are visited depth-first, sorted by file name
/// within each directory.
pub fn package_files(root: &Path, follow_links: bool) -> Result<PackageFiles> {
    let root = utils::normalize(root)?;
    let starting_point = root
        .parent()
        .filter(|_| root.file_name().is_some())
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::InvalidSource(root.display().to_string()))?;

    let entries = WalkDir::new(&root)
        .follow_links(follow_links)
        .sort_by_file_name()
        .into_iter();

    Ok(PackageFiles {
        starting_point,
        entries,
    })
}

impl PackageFiles {
    fn package_file(&self, entry: DirEntry) -> Result<PackageFile> {
        let relative = entry.path().strip_prefix(&self.starting_point).map_err(|_| {
            Error::custom(format!(
                "{} is outside of {}",
                entry.path().display(),
                self.starting_point.display()
            ))
        })?;

        let archive_path = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::NonUtf8Path(entry.path().display().to_string()))?
            .join("/");

        Ok(PackageFile {
            absolute_path: entry.into_path(),
            archive_path,
        })
    }
}

impl Iterator for PackageFiles {
    type Item = Result<PackageFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(err) => return Some(Err(err.into())),
            };

            if is_regular_file(&entry) {
                return Some(self.package_file(entry));
            }
        }
    }
}

// Symlinks count when they resolve to a regular file; dangling links and
// special files are skipped.
fn is_regular_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        true
    } else if file_type.is_symlink() {
        fs::metadata(entry.path())
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn archive_paths(root: &Path, follow_links: bool) -> Vec<String> {
        package_files(root, follow_links)
            .unwrap()
            .map(|file| file.unwrap().archive_path)
            .collect()
    }

    fn sample_tree() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("project");
        fs::create_dir_all(root.join("sub").join("deep")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("sub").join("b.txt"), "b").unwrap();
        fs::write(root.join("sub").join("deep").join("c.txt"), "c").unwrap();
        (dir, root)
    }

    #[test]
    fn test_archive_paths_start_with_package_name() {
        let (_dir, root) = sample_tree();

        assert_eq!(
            archive_paths(&root, false),
            vec!["project/a.txt", "project/sub/b.txt", "project/sub/deep/c.txt"]
        );
    }

    #[test]
    fn test_absolute_paths_point_at_files() {
        let (_dir, root) = sample_tree();

        for file in package_files(&root, false).unwrap() {
            let file = file.unwrap();
            assert!(file.absolute_path.is_absolute());
            assert!(file.absolute_path.is_file());
            let relative = file.archive_path.strip_prefix("project/").unwrap();
            assert_eq!(file.absolute_path, root.join(relative));
        }
    }

    #[test]
    fn test_walk_is_restartable() {
        let (_dir, root) = sample_tree();
        assert_eq!(archive_paths(&root, false), archive_paths(&root, false));
    }

    #[test]
    fn test_trailing_separator_and_dots_are_normalized() {
        let (dir, _root) = sample_tree();
        let messy = dir.path().join("project").join("sub").join("..").join("");

        assert_eq!(archive_paths(&messy, false).len(), 3);
        assert!(archive_paths(&messy, false).iter().all(|p| p.starts_with("project/")));
    }

    #[test]
    fn test_tree_without_files_is_empty() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("empty");
        fs::create_dir_all(root.join("a").join("b")).unwrap();

        assert!(archive_paths(&root, false).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks() {
        use std::os::unix::fs::symlink;

        let (dir, root) = sample_tree();
        let outside = dir.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("x.txt"), "x").unwrap();

        symlink(root.join("a.txt"), root.join("alias.txt")).unwrap();
        symlink(root.join("missing.txt"), root.join("broken.txt")).unwrap();
        symlink(&outside, root.join("linked")).unwrap();

        let paths = archive_paths(&root, false);
        assert!(paths.contains(&"project/alias.txt".to_string()));
        assert!(!paths.contains(&"project/broken.txt".to_string()));
        assert!(!paths.contains(&"project/linked/x.txt".to_string()));

        // a dangling link is a walk error once links are followed
        fs::remove_file(root.join("broken.txt")).unwrap();
        let followed = archive_paths(&root, true);
        assert!(followed.contains(&"project/linked/x.txt".to_string()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_are_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_dir, root) = sample_tree();
        fs::write(root.join(OsStr::from_bytes(b"x\xff")), "ff").unwrap();
        fs::write(root.join(OsStr::from_bytes(b"x\xfe")), "fe").unwrap();

        let results: Vec<_> = package_files(&root, false).unwrap().collect();
        let rejected: Vec<String> = results
            .iter()
            .filter_map(|result| match result {
                Err(Error::NonUtf8Path(path)) => Some(path.clone()),
                _ => None,
            })
            .collect();

        assert_eq!(rejected.len(), 2);
        assert!(rejected.iter().all(|path| path.contains("project")));
        assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 3);
    }
}
