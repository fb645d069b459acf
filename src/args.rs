use clap::{Arg, ArgAction, Command, value_parser};
use std::path::PathBuf;

/// Command-line arguments for the dirzip tool
#[derive(Debug)]
pub struct Args {
    /// Directory to package
    pub path: PathBuf,

    /// Directory receiving the finished archive(s)
    pub dest: PathBuf,

    /// Remove each source folder once its archive is published
    pub remove: bool,

    /// Build the archive as processing.dat inside the destination
    pub in_place: bool,

    /// Package every subdirectory of PATH separately
    pub each: bool,

    /// Descend into symlinked directories
    pub follow_links: bool,

    /// Show debug messages
    pub verbose: bool,

    /// Suppress terminal output
    pub quiet: bool,

    /// Also write debug messages to this file
    pub log_debug: Option<PathBuf>,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        Self::from_matches(command().get_matches())
    }

    fn from_matches(matches: clap::ArgMatches) -> Self {
        Self {
            path: matches
                .get_one::<PathBuf>("path")
                .cloned()
                .unwrap_or_default(),
            dest: matches
                .get_one::<PathBuf>("dest")
                .cloned()
                .unwrap_or_default(),
            remove: matches.get_flag("remove"),
            in_place: matches.get_flag("in-place"),
            each: matches.get_flag("each"),
            follow_links: matches.get_flag("follow-links"),
            verbose: matches.get_flag("verbose"),
            quiet: matches.get_flag("quiet"),
            log_debug: matches.get_one::<PathBuf>("log-debug").cloned(),
        }
    }
}

fn command() -> Command {
    Command::new("dirzip")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Package a directory into a zip archive")
        .arg(
            Arg::new("path")
                .required(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Directory to package; it must contain at least one subdirectory"),
        )
        .arg(
            Arg::new("dest")
                .required(true)
                .value_name("DEST")
                .value_parser(value_parser!(PathBuf))
                .help("Existing directory where <name>.zip is written"),
        )
        .arg(
            Arg::new("remove")
                .short('r')
                .long("remove")
                .action(ArgAction::SetTrue)
                .help("Remove the source folder after its archive has been generated"),
        )
        .arg(
            Arg::new("in-place")
                .long("in-place")
                .action(ArgAction::SetTrue)
                .help("Build the archive as processing.dat inside DEST (faster, but a failed run leaves processing.dat behind)"),
        )
        .arg(
            Arg::new("each")
                .short('e')
                .long("each")
                .action(ArgAction::SetTrue)
                .help("Package every subdirectory of PATH as its own archive"),
        )
        .arg(
            Arg::new("follow-links")
                .long("follow-links")
                .action(ArgAction::SetTrue)
                .help("Descend into symlinked directories"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .visible_alias("debug")
                .action(ArgAction::SetTrue)
                .help("Show debug messages"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .help("Suppress terminal output"),
        )
        .arg(
            Arg::new("log-debug")
                .long("log-debug")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Append debug messages to FILE"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::from_matches(command().try_get_matches_from(argv).unwrap())
    }

    #[test]
    fn test_command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn test_positional_paths() {
        let args = parse(&["dirzip", "/data/project", "/out"]);
        assert_eq!(args.path, PathBuf::from("/data/project"));
        assert_eq!(args.dest, PathBuf::from("/out"));
        assert!(!args.remove && !args.in_place && !args.each && !args.verbose);
        assert!(args.log_debug.is_none());
    }

    #[test]
    fn test_flags() {
        let args = parse(&[
            "dirzip",
            "--remove",
            "--in-place",
            "--each",
            "--debug",
            "--log-debug",
            "debug.log",
            "src",
            "dst",
        ]);
        assert!(args.remove && args.in_place && args.each && args.verbose);
        assert_eq!(args.log_debug, Some(PathBuf::from("debug.log")));
    }

    #[test]
    fn test_missing_destination_is_rejected() {
        assert!(command().try_get_matches_from(["dirzip", "src"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(
            command()
                .try_get_matches_from(["dirzip", "-q", "-v", "src", "dst"])
                .is_err()
        );
    }
}
