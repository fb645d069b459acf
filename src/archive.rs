use crate::error::Error;
use crate::report::Reporter;
use crate::result::Result;
use crate::utils;
use crate::walk::{self, PackageFile};
use std::fs::{self, File, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use time::OffsetDateTime;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Working filename used by [`Strategy::InPlace`]
pub const IN_PLACE_WORKING_NAME: &str = "processing.dat";

const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Where the archive is assembled before it is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Build inside a private temporary directory that is removed on every
    /// exit path, then move the finished archive into the destination.
    #[default]
    TempDir,
    /// Build as `processing.dat` inside the destination and rename it when
    /// done. A failed run leaves `processing.dat` behind.
    InPlace,
}

/// Packages a directory into `<name>.zip`.
pub struct Archiver<'a> {
    reporter: &'a dyn Reporter,
    strategy: Strategy,
    follow_links: bool,
}

impl<'a> Archiver<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self {
            reporter,
            strategy: Strategy::default(),
            follow_links: false,
        }
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Archive `source` into `destination`, returning the published archive path.
    pub fn compress(&self, source: &Path, destination: &Path) -> Result<PathBuf> {
        self.reporter
            .debug(&format!("Taking care of {}", source.display()));

        let name = utils::package_name(source)?;
        let files = walk::package_files(source, self.follow_links)?;
        self.publish(&name, files, destination)
    }

    fn publish<I>(&self, name: &str, files: I, destination: &Path) -> Result<PathBuf>
    where
        I: IntoIterator<Item = Result<PackageFile>>,
    {
        let zip_name = format!("{}.zip", name);
        let final_zip = destination.join(&zip_name);

        match self.strategy {
            Strategy::TempDir => {
                let temp_dir = tempfile::Builder::new().prefix("dirzip-").tempdir()?;
                let tmp_zip = temp_dir.path().join(&zip_name);
                self.reporter
                    .debug(&format!("Creating temp zip file {}", tmp_zip.display()));

                self.write_archive(files, &tmp_zip)?;

                self.reporter.debug(&format!(
                    "Moving {} to {}",
                    tmp_zip.display(),
                    final_zip.display()
                ));
                utils::move_file(&tmp_zip, &final_zip)?;
            }
            Strategy::InPlace => {
                let working = destination.join(IN_PLACE_WORKING_NAME);
                self.write_archive(files, &working)?;

                self.reporter.debug(&format!(
                    "Renaming {} to {}",
                    working.display(),
                    final_zip.display()
                ));
                fs::rename(&working, &final_zip)?;
            }
        }

        self.reporter
            .info(&format!("Generated {}", final_zip.display()));
        Ok(final_zip)
    }

    fn write_archive<I>(&self, files: I, output_path: &Path) -> Result<()>
    where
        I: IntoIterator<Item = Result<PackageFile>>,
    {
        let mut zip = ZipWriter::new(File::create(output_path)?);

        for file in files {
            let PackageFile {
                absolute_path,
                archive_path,
            } = file?;

            self.reporter.debug(&format!(
                "Writing {} as {} to {}",
                absolute_path.display(),
                archive_path,
                output_path.display()
            ));

            let read_error = |source: io::Error| Error::Read {
                path: absolute_path.display().to_string(),
                source,
            };
            let mut source = File::open(&absolute_path).map_err(read_error)?;
            let metadata = source.metadata().map_err(read_error)?;

            zip.start_file(archive_path.as_str(), file_options(&metadata))?;
            io::copy(&mut source, &mut zip)?;

            self.reporter
                .info(&format!("Zipped {}", absolute_path.display()));
        }

        let output = zip.finish()?;
        output.sync_all()?;
        Ok(())
    }
}

fn file_options(metadata: &Metadata) -> SimpleFileOptions {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(modified_time(metadata))
        .large_file(metadata.len() >= ZIP64_THRESHOLD);

    #[cfg(unix)]
    let options = {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(metadata.permissions().mode())
    };

    options
}

// Timestamps outside the DOS range (1980..=2107) fall back to the zip epoch.
fn modified_time(metadata: &Metadata) -> DateTime {
    metadata
        .modified()
        .ok()
        .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
        .and_then(|since_epoch| i64::try_from(since_epoch.as_secs()).ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .and_then(|t| {
            DateTime::from_date_and_time(
                u16::try_from(t.year()).ok()?,
                u8::from(t.month()),
                t.day(),
                t.hour(),
                t.minute(),
                t.second(),
            )
            .ok()
        })
        .unwrap_or_default()
}
