//! Command-line interface definitions and parsing.
//!
//! Values given on the command line override the configuration file.

use clap::{Arg, Command};
use std::path::PathBuf;

/// Command line arguments
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the script data directory
    pub data_dir: Option<PathBuf>,
    /// Optional override for the world seed
    pub seed: Option<u32>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
}

impl CliArgs {
    fn command() -> Command {
        Command::new("cubolt script host")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Runs cubolt server scripts against a simulated world")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("script_host.toml"),
            )
            .arg(
                Arg::new("data")
                    .short('d')
                    .long("data")
                    .value_name("DIR")
                    .help("Directory for script settings"),
            )
            .arg(
                Arg::new("seed")
                    .short('s')
                    .long("seed")
                    .value_name("SEED")
                    .help("World seed")
                    .value_parser(clap::value_parser!(u32)),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
    }

    /// Parses the process arguments.
    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    /// Parses an explicit argument list.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&Self::command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("script_host.toml")),
            data_dir: matches.get_one::<String>("data").map(PathBuf::from),
            seed: matches.get_one::<u32>("seed").copied(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["script_host"]).unwrap();
        assert_eq!(args.config_path, PathBuf::from("script_host.toml"));
        assert!(args.data_dir.is_none());
        assert!(args.seed.is_none());
        assert!(!args.json_logs);
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::try_parse_from([
            "script_host",
            "-c",
            "ctf.toml",
            "--data",
            "state",
            "--seed",
            "1234",
            "-l",
            "debug",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(args.config_path, PathBuf::from("ctf.toml"));
        assert_eq!(args.data_dir, Some(PathBuf::from("state")));
        assert_eq!(args.seed, Some(1234));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
    }

    #[test]
    fn test_bad_seed_is_rejected() {
        assert!(CliArgs::try_parse_from(["script_host", "--seed", "minus one"]).is_err());
    }
}
