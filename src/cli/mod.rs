//! Command-line surface
//!
//! `Cli` holds the clap definitions; [`workflow`] holds the logic each
//! subcommand runs, decoupled from clap so it can be called directly.

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

use crate::domain::{BumpKind, BumpRequest};
use crate::error::TagError;

pub mod workflow;

#[derive(Parser, Debug)]
#[command(
    name = "deploy-tagger",
    version,
    about = "Create and inspect environment deployment tags"
)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<String>,

    #[arg(
        long,
        global = true,
        default_value = "warn",
        help = "Log level used when RUST_LOG is not set"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the last tag and its comment for an environment
    LastTag {
        environment: String,
        #[arg(short, long, default_value = "", help = "Service to check")]
        service: String,
    },

    /// Add a new tag for an environment and version
    AddTag {
        environment: String,
        version: String,
        #[arg(long, help = "Promote this existing tag into the environment")]
        from: Option<String>,
        #[arg(long = "hot-fix", help = "Tag a hot fix from a release branch")]
        hot_fix: bool,
        #[arg(short, long, default_value = "", help = "Service to tag")]
        service: String,
        #[arg(long, help = "Create the tag locally without pushing")]
        no_push: bool,
    },

    /// Bump the semantic version of the latest environment tag
    BumpVersion(BumpVersionCommand),

    /// List tags newest first with version filters
    VersionList(VersionListCommand),

    /// Compare a tag with an older one (or its predecessor), or show an
    /// environment's version history
    VersionDiff {
        /// Tag to inspect, or an environment to show its history
        target: String,
        /// Older tag to compare with; defaults to the previous tag
        older: Option<String>,
        #[arg(short, long, default_value = "", help = "Service whose history to show")]
        service: String,
        #[arg(long, help = "Show bump statistics with the history")]
        stats: bool,
    },

    /// Suggest a version bump from the current branch name
    BranchVersion {
        #[arg(short, long, help = "Environment to tag with the suggested bump")]
        env: Option<String>,
        #[arg(short, long, default_value = "", help = "Service to tag")]
        service: String,
        #[arg(long, requires = "env", help = "Create the suggested tag")]
        auto_tag: bool,
        #[arg(long, help = "Create the tag locally without pushing")]
        no_push: bool,
    },

    /// List configured projects
    Projects,
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("bump")
        .required(true)
        .args(["major", "minor", "patch", "auto"])
))]
pub struct BumpVersionCommand {
    pub environment: String,
    #[arg(long, help = "Increment major version (breaking changes)")]
    pub major: bool,
    #[arg(long, help = "Increment minor version (new features)")]
    pub minor: bool,
    #[arg(long, help = "Increment patch version (bug fixes)")]
    pub patch: bool,
    #[arg(long, help = "Detect the bump from conventional commits")]
    pub auto: bool,
    #[arg(long, help = "Preview the change without creating the tag")]
    pub preview: bool,
    #[arg(short, long, default_value = "", help = "Service to tag")]
    pub service: String,
    #[arg(long, default_value = "HEAD", help = "Commit to tag")]
    pub from_commit: String,
    #[arg(long, help = "Create the tag locally without pushing")]
    pub no_push: bool,
}

/// Output layout of the version listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    Table,
    Json,
    Compact,
}

#[derive(Args, Debug)]
pub struct VersionListCommand {
    #[arg(required_unless_present = "all")]
    pub environment: Option<String>,
    #[arg(long, conflicts_with = "environment", help = "List every configured environment")]
    pub all: bool,
    #[arg(long, help = "Only versions with this major component")]
    pub major: Option<u32>,
    #[arg(long, help = "Only versions with this minor component")]
    pub minor: Option<u32>,
    #[arg(short, long, help = "Only this service (empty for unscoped tags)")]
    pub service: Option<String>,
    #[arg(long, default_value_t = 10, help = "Maximum tags per environment, 0 for all")]
    pub limit: usize,
    #[arg(long, value_enum, default_value_t = ListFormat::Table)]
    pub format: ListFormat,
}

/// True when a tag or version in the user's input caused `err`.
pub fn caused_by_malformed_input(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<TagError>())
        .any(TagError::is_malformed_input)
}

impl BumpVersionCommand {
    /// The requested bump; clap guarantees exactly one flag is set.
    pub fn request(&self) -> BumpRequest {
        if self.major {
            BumpRequest::Explicit(BumpKind::Major)
        } else if self.minor {
            BumpRequest::Explicit(BumpKind::Minor)
        } else if self.patch {
            BumpRequest::Explicit(BumpKind::Patch)
        } else {
            BumpRequest::Auto
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_tag() {
        let cli = Cli::try_parse_from([
            "deploy-tagger",
            "add-tag",
            "stg6",
            "1.2",
            "--hot-fix",
            "-s",
            "api",
        ])
        .unwrap();
        match cli.command {
            Command::AddTag {
                environment,
                version,
                hot_fix,
                service,
                from,
                no_push,
            } => {
                assert_eq!(environment, "stg6");
                assert_eq!(version, "1.2");
                assert!(hot_fix);
                assert_eq!(service, "api");
                assert_eq!(from, None);
                assert!(!no_push);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_version_list() {
        let cli = Cli::try_parse_from([
            "deploy-tagger",
            "version-list",
            "stg6",
            "--major",
            "1",
            "--format",
            "json",
        ])
        .unwrap();
        let Command::VersionList(list) = cli.command else {
            panic!("expected version-list");
        };
        assert_eq!(list.environment.as_deref(), Some("stg6"));
        assert_eq!(list.major, Some(1));
        assert_eq!(list.minor, None);
        assert_eq!(list.limit, 10);
        assert_eq!(list.format, ListFormat::Json);

        let cli = Cli::try_parse_from(["deploy-tagger", "version-list", "--all"]).unwrap();
        let Command::VersionList(list) = cli.command else {
            panic!("expected version-list");
        };
        assert!(list.all);
        assert_eq!(list.format, ListFormat::Table);

        assert!(Cli::try_parse_from(["deploy-tagger", "version-list"]).is_err());
        assert!(Cli::try_parse_from(["deploy-tagger", "version-list", "stg6", "--all"]).is_err());
    }

    #[test]
    fn test_parse_version_diff_with_one_argument() {
        let cli = Cli::try_parse_from(["deploy-tagger", "version-diff", "stg6_1.2.3-1"]).unwrap();
        match cli.command {
            Command::VersionDiff { target, older, .. } => {
                assert_eq!(target, "stg6_1.2.3-1");
                assert_eq!(older, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_branch_version_auto_tag_needs_env() {
        assert!(Cli::try_parse_from(["deploy-tagger", "branch-version", "--auto-tag"]).is_err());
        let cli = Cli::try_parse_from([
            "deploy-tagger",
            "branch-version",
            "--auto-tag",
            "-e",
            "stg6",
        ])
        .unwrap();
        match cli.command {
            Command::BranchVersion { env, auto_tag, .. } => {
                assert_eq!(env.as_deref(), Some("stg6"));
                assert!(auto_tag);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_input_is_found_through_context() {
        use anyhow::Context;

        let err = Err::<(), _>(TagError::malformed_tag("stg6_x"))
            .context("invalid tag format 'stg6_x'")
            .unwrap_err();
        assert!(caused_by_malformed_input(&err));

        let err = Err::<(), _>(TagError::config("bad"))
            .context("loading config")
            .unwrap_err();
        assert!(!caused_by_malformed_input(&err));
        assert!(!caused_by_malformed_input(&anyhow::anyhow!("plain")));
    }

    #[test]
    fn test_bump_version_requires_one_kind() {
        assert!(Cli::try_parse_from(["deploy-tagger", "bump-version", "stg6"]).is_err());
        assert!(Cli::try_parse_from([
            "deploy-tagger",
            "bump-version",
            "stg6",
            "--major",
            "--minor"
        ])
        .is_err());
    }

    #[test]
    fn test_bump_version_request() {
        let cli =
            Cli::try_parse_from(["deploy-tagger", "bump-version", "stg6", "--auto"]).unwrap();
        let Command::BumpVersion(bump) = cli.command else {
            panic!("expected bump-version");
        };
        assert_eq!(bump.request(), BumpRequest::Auto);
        assert_eq!(bump.from_commit, "HEAD");

        let cli = Cli::try_parse_from([
            "deploy-tagger",
            "--log-level",
            "debug",
            "bump-version",
            "demo",
            "--minor",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        let Command::BumpVersion(bump) = cli.command else {
            panic!("expected bump-version");
        };
        assert_eq!(bump.request(), BumpRequest::Explicit(BumpKind::Minor));
    }
}
