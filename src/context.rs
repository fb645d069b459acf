use crate::archive::Strategy;
use crate::args::Args;
use crate::result::Result;
use crate::utils;
use std::path::PathBuf;

/// Resolved configuration for a packaging run
pub struct Context {
    /// Show debug messages on the terminal
    pub verbose: bool,

    /// Suppress terminal output entirely
    pub quiet: bool,

    /// Normalized source directory
    pub source: PathBuf,

    /// Normalized destination directory
    pub destination: PathBuf,

    pub strategy: Strategy,

    /// Remove each package folder after its archive is published
    pub remove: bool,

    /// Treat every subdirectory of `source` as its own package
    pub each: bool,

    pub follow_links: bool,

    pub log_debug: Option<PathBuf>,
}

impl Context {
    pub fn new(args: Args) -> Result<Self> {
        let strategy = if args.in_place {
            Strategy::InPlace
        } else {
            Strategy::TempDir
        };

        Ok(Self {
            verbose: args.verbose,
            quiet: args.quiet,
            source: utils::normalize(&args.path)?,
            destination: utils::normalize(&args.dest)?,
            strategy,
            remove: args.remove,
            each: args.each,
            follow_links: args.follow_links,
            log_debug: args.log_debug,
        })
    }

    /// Package roots to archive, in order
    pub fn packages(&self) -> Result<Vec<PathBuf>> {
        if self.each {
            utils::subdirectories(&self.source)
        } else {
            Ok(vec![self.source.clone()])
        }
    }
}
