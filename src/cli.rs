use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wpdash")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Terminal dashboard for WordPress installations, driven by WP-CLI", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// WP-CLI executable to run
    #[arg(long, global = true, env = "WPDASH_TOOL")]
    pub tool: Option<String>,

    /// Directory to scan for installations and dumps
    #[arg(long, global = true)]
    pub root: Option<String>,

    /// Number of installations probed in parallel
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scan for installations and show their health
    Status {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect, export and import databases
    #[command(subcommand)]
    Db(DbCommand),

    /// Read and edit wp-config.php
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Show the config file location and effective settings
    Paths,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Site Selection
// ============================================================================

#[derive(Parser, Debug, Clone, Default)]
pub struct SiteArgs {
    /// Installation directory (prompts when omitted)
    #[arg(short, long)]
    pub site: Option<PathBuf>,
}

// ============================================================================
// Database Commands
// ============================================================================

#[derive(Subcommand)]
pub enum DbCommand {
    /// Show database name, size and per-table status
    Info(SiteArgs),

    /// Export the database to a dump in the installation directory
    Export(SiteArgs),

    /// Import a dump into the database
    Import {
        #[command(flatten)]
        site: SiteArgs,

        /// Dump to import (prompts from candidate dumps when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List dumps that belong to the database
    Dumps(SiteArgs),
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// List every directive
    List(SiteArgs),

    /// Show one directive
    Get {
        #[command(flatten)]
        site: SiteArgs,

        /// Directive name
        name: String,
    },

    /// Add or update a directive
    Set {
        #[command(flatten)]
        site: SiteArgs,

        /// Directive name
        name: String,

        /// New value
        value: String,
    },

    /// Remove a directive
    Delete {
        #[command(flatten)]
        site: SiteArgs,

        /// Directive name
        name: String,
    },

    /// Regenerate the authentication keys and salts
    ShuffleSalts(SiteArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_status_with_globals() {
        let cli = Cli::try_parse_from(["wpdash", "-vv", "--root", "~/sites", "-j", "4", "status", "--json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.root.as_deref(), Some("~/sites"));
        assert_eq!(cli.jobs, Some(4));
        assert!(matches!(cli.command, Command::Status { json: true }));
    }

    #[test]
    fn test_parse_db_import() {
        let cli = Cli::try_parse_from([
            "wpdash", "db", "import", "--site", "/srv/blog", "--file", "/tmp/d.sql", "--yes",
        ])
        .unwrap();
        match cli.command {
            Command::Db(DbCommand::Import { site, file, yes }) => {
                assert_eq!(site.site, Some(PathBuf::from("/srv/blog")));
                assert_eq!(file, Some(PathBuf::from("/tmp/d.sql")));
                assert!(yes);
            }
            _ => panic!("Expected db import"),
        }
    }

    #[test]
    fn test_parse_config_set_without_site() {
        let cli = Cli::try_parse_from(["wpdash", "config", "set", "WP_DEBUG", "true"]).unwrap();
        match cli.command {
            Command::Config(ConfigCommand::Set { site, name, value }) => {
                assert_eq!(site.site, None);
                assert_eq!(name, "WP_DEBUG");
                assert_eq!(value, "true");
            }
            _ => panic!("Expected config set"),
        }
    }

    #[test]
    fn test_export_help_names_installation_directory() {
        let cmd = Cli::command();
        let export = cmd
            .find_subcommand("db")
            .and_then(|db| db.find_subcommand("export"))
            .unwrap();
        let about = export.get_about().unwrap().to_string();
        assert!(about.contains("installation directory"), "{about}");
    }

    #[test]
    fn test_set_requires_value() {
        assert!(Cli::try_parse_from(["wpdash", "config", "set", "WP_DEBUG"]).is_err());
    }
}
