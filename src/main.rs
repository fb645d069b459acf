mod archive;
mod args;
mod context;
mod error;
mod report;
mod result;
mod utils;
mod walk;

use archive::Archiver;
use args::Args;
use context::Context;
use error::Error;
use report::{Console, LogFile, Reporter, Silent, Tee};
use std::fs;
use std::path::PathBuf;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> result::Result<()> {
    // Parse command-line arguments
    let ctx = Context::new(Args::parse())?;

    if !ctx.quiet {
        cliclack::intro("dirzip")?;
    }

    // Nothing is written, the debug log included, until validation passes
    let packages = validate(&ctx)?;
    let reporter = create_reporter(&ctx)?;

    let archiver = Archiver::new(&reporter)
        .strategy(ctx.strategy)
        .follow_links(ctx.follow_links);

    // Archive each package, removing its source once published
    for package in &packages {
        archiver.compress(package, &ctx.destination)?;

        if ctx.remove {
            reporter.info(&format!("Removing {}", package.display()));
            fs::remove_dir_all(package)?;
        }
    }

    if !ctx.quiet {
        cliclack::outro(format!("Packaged {} folder(s)", packages.len()))?;
    }
    Ok(())
}

fn create_reporter(ctx: &Context) -> result::Result<Box<dyn Reporter>> {
    let console: Box<dyn Reporter> = if ctx.quiet {
        Box::new(Silent)
    } else {
        Box::new(Console::new(ctx.verbose))
    };

    Ok(match &ctx.log_debug {
        Some(path) => Box::new(Tee::new(console, LogFile::create(path)?)),
        None => console,
    })
}

/// Check the source and destination before any archive work starts and
/// return the package roots to archive.
fn validate(ctx: &Context) -> result::Result<Vec<PathBuf>> {
    if !ctx.source.is_dir() {
        return Err(Error::SourceNotFound(ctx.source.display().to_string()));
    }

    if !ctx.destination.is_dir() {
        return Err(Error::DestinationNotFound(
            ctx.destination.display().to_string(),
        ));
    }

    if !utils::has_subdirectories(&ctx.source)? {
        return Err(Error::NoSubdirectories(ctx.source.display().to_string()));
    }

    let packages = ctx.packages()?;
    if let Some(package) = packages
        .iter()
        .find(|package| ctx.destination.starts_with(package))
    {
        return Err(Error::custom(format!(
            "Destination {} lies inside {}, which is being packaged",
            ctx.destination.display(),
            package.display()
        )));
    }

    Ok(packages)
}
