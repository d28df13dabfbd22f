use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "strata",
    about = "Strata — upgrade impact and customization merge engine",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the canonical checksum of a configuration body
    Checksum(ChecksumArgs),
    /// Compute the patch between two configuration bodies
    Diff(DiffArgs),
    /// Apply a patch to a configuration body
    Apply(ApplyArgs),
    /// Classify the impact of a platform change on a customized body
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
pub struct ChecksumArgs {
    /// JSON file holding the configuration body
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DiffArgs {
    /// The body before the change
    pub old: PathBuf,
    /// The body after the change
    pub new: PathBuf,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// The body to patch
    pub file: PathBuf,
    /// JSON file holding the patch operations
    pub patch: PathBuf,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Platform body before the upgrade
    #[arg(long)]
    pub base: PathBuf,
    /// Platform body after the upgrade
    #[arg(long)]
    pub new: PathBuf,
    /// The tenant's customized body, based on the old platform body
    #[arg(long)]
    pub tenant: PathBuf,
    /// Resource key used in the report
    #[arg(long, default_value = "resource")]
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_checksum() {
        let cli = Cli::try_parse_from(["strata", "checksum", "body.json"]).unwrap();
        if let Command::Checksum(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("body.json"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_diff() {
        let cli = Cli::try_parse_from(["strata", "diff", "a.json", "b.json"]).unwrap();
        if let Command::Diff(args) = cli.command {
            assert_eq!(args.old, PathBuf::from("a.json"));
            assert_eq!(args.new, PathBuf::from("b.json"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_apply() {
        let cli = Cli::try_parse_from(["strata", "apply", "body.json", "patch.json"]).unwrap();
        assert!(matches!(cli.command, Command::Apply(_)));
    }

    #[test]
    fn parse_analyze() {
        let cli = Cli::try_parse_from([
            "strata", "analyze", "--base", "v1.json", "--new", "v2.json", "--tenant", "t.json",
        ])
        .unwrap();
        if let Command::Analyze(args) = cli.command {
            assert_eq!(args.base, PathBuf::from("v1.json"));
            assert_eq!(args.new, PathBuf::from("v2.json"));
            assert_eq!(args.tenant, PathBuf::from("t.json"));
            assert_eq!(args.key, "resource");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_analyze_with_key() {
        let cli = Cli::try_parse_from([
            "strata", "analyze", "--base", "a", "--new", "b", "--tenant", "c", "--key",
            "asset.status",
        ])
        .unwrap();
        if let Command::Analyze(args) = cli.command {
            assert_eq!(args.key, "asset.status");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["strata", "--format", "json", "checksum", "x.json"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["strata", "--verbose", "checksum", "x.json"]).unwrap();
        assert!(cli.verbose);
    }
}
