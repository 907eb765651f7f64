pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "mokhber")]
#[command(about = "Posts AI-summarised science news and podcast digests to a Telegram channel")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "mokhber.toml")]
    pub config: String,

    /// Directory holding the posted-links history files
    #[arg(long, global = true, default_value = ".")]
    pub data_dir: String,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit JSON log lines instead of the compact human format
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Log CPU and memory usage after each phase
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Scrape and analyse, but print posts instead of sending them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Post one new item per news source
    News {
        /// Run only the named news profile
        #[arg(long)]
        profile: Option<String>,
    },
    /// Post one new episode per podcast group
    Podcasts {
        /// Run only the named podcast group
        #[arg(long)]
        only: Option<String>,
    },
    /// Check that a Dockerfile stages every file its command references
    VerifyImage {
        #[arg(long, default_value = "Dockerfile")]
        dockerfile: String,
    },
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_default_container_command_parses() {
        let cli =
            CliConfig::try_parse_from(["mokhber", "--config", "/app/mokhber.toml", "news"]).unwrap();
        assert_eq!(cli.config, "/app/mokhber.toml");
        assert!(matches!(cli.command, Command::News { profile: None }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = CliConfig::try_parse_from([
            "mokhber", "podcasts", "--only", "Huberman Lab", "--dry-run", "-v",
        ])
        .unwrap();
        assert_eq!(cli.config, "mokhber.toml");
        assert_eq!(cli.data_dir, ".");
        assert!(cli.dry_run);
        assert!(cli.verbose);
        match cli.command {
            Command::Podcasts { only } => assert_eq!(only.as_deref(), Some("Huberman Lab")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verify_image_defaults_to_repo_dockerfile() {
        let cli = CliConfig::try_parse_from(["mokhber", "verify-image"]).unwrap();
        assert!(matches!(cli.command, Command::VerifyImage { ref dockerfile } if dockerfile == "Dockerfile"));
    }
}
