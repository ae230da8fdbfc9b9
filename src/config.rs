use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::CommandFactory;

use crate::maven::Coordinate;
use crate::Cli;

/// Artifact name used for a local jar when `--artifact` is not given.
const UNKNOWN_ARTIFACT: &str = "unknown";

/// Where the javadoc jar comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    LocalJar {
        path: PathBuf,
        artifact: String,
        version: Option<String>,
    },
    Coordinate(Coordinate),
    /// Artifact without a group: search, then let the user pick.
    Search {
        artifact: String,
        version: Option<String>,
    },
}

/// Everything one run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: Source,
    pub output: PathBuf,
    pub repository_url: String,
    pub search_url: String,
    /// Parent of the run's temp jar and extraction directory.
    pub scratch_root: PathBuf,
    pub interactive: bool,
}

impl RunConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, clap::Error> {
        let source = match (cli.input_jar, cli.group, cli.artifact) {
            (Some(path), _, artifact) => Source::LocalJar {
                path,
                artifact: artifact.unwrap_or_else(|| UNKNOWN_ARTIFACT.to_string()),
                version: cli.version,
            },
            (None, Some(group), Some(artifact)) => Source::Coordinate(Coordinate {
                group,
                artifact,
                version: cli.version,
            }),
            (None, None, Some(artifact)) => Source::Search {
                artifact,
                version: cli.version,
            },
            (None, _, None) => {
                return Err(Cli::command().error(
                    ErrorKind::MissingRequiredArgument,
                    "Either --input-jar or both --group and --artifact must be provided.",
                ))
            }
        };

        Ok(Self {
            source,
            output: cli.output,
            repository_url: cli.repository_url,
            search_url: cli.search_url,
            scratch_root: cli.scratch_dir.unwrap_or_else(std::env::temp_dir),
            interactive: !cli.non_interactive,
        })
    }
}

// ── Tests ──
