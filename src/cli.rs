//! CLI definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use transparency_core::SearchMode;

/// Transparency portal person search.
#[derive(Parser)]
#[command(name = "transparency")]
#[command(about = "Search a person on the federal transparency portal and extract received resources")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Search a person and extract their received resources
    Search(SearchArgs),

    /// Open the portal and save cookies and local storage for later runs
    CaptureSession,

    /// Delete cached JSON files (reports and session state)
    ClearCache,
}

#[derive(Args)]
pub(crate) struct SearchArgs {
    /// Full name of the person
    #[arg(long)]
    pub name: String,

    /// CPF, with or without punctuation
    #[arg(long)]
    pub cpf: String,

    /// NIS (social identification number)
    #[arg(long)]
    pub nis: Option<String>,

    /// Value typed into the search field: name, cpf or nis
    #[arg(long = "by", default_value = "cpf")]
    pub mode: SearchMode,

    /// Result filter, repeatable (available: social_programs)
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Do not write the report to the output directory
    #[arg(long)]
    pub no_save: bool,

    /// Print the report JSON to stdout
    #[arg(long)]
    pub print: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "transparency",
            "search",
            "--name",
            "Alen Silva",
            "--cpf",
            "123.456.789-01",
            "--by",
            "name",
            "--filter",
            "social_programs",
            "--print",
        ])
        .unwrap();

        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.name, "Alen Silva");
                assert_eq!(args.mode, SearchMode::ByName);
                assert_eq!(args.filters, vec!["social_programs".to_string()]);
                assert!(args.print);
                assert!(!args.no_save);
                assert!(args.nis.is_none());
            }
            _ => panic!("expected search command"),
        }
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_search_mode_defaults_to_cpf() {
        let cli =
            Cli::try_parse_from(["transparency", "search", "--name", "A", "--cpf", "1"]).unwrap();
        match cli.command {
            Commands::Search(args) => assert_eq!(args.mode, SearchMode::ByPrimaryId),
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_invalid_search_mode_is_rejected() {
        let result =
            Cli::try_parse_from(["transparency", "search", "--name", "A", "--cpf", "1", "--by", "rg"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["transparency", "clear-cache", "--config", "/etc/t.toml"])
            .unwrap();
        assert!(matches!(cli.command, Commands::ClearCache));
        assert_eq!(cli.config, PathBuf::from("/etc/t.toml"));
    }
}
