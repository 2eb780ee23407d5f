//! docsmith CLI - documentation site builder and release helpers.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docsmith_release::BumpPart;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "docsmith")]
#[command(about = "Documentation site builder and release helpers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to docsmith.toml config file
    #[arg(short, long, default_value = "docsmith.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static documentation site
    Build {
        /// Source directory holding README.md, docs/ and LICENSE
        #[arg(long, default_value = ".")]
        src: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Site name shown in page titles (defaults to config)
        #[arg(long)]
        site_name: Option<String>,

        /// Commit identifier to publish in every page
        #[arg(long)]
        commit: Option<String>,
    },

    /// Preview built documentation
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve
        #[arg(short, long, default_value = "site")]
        dir: PathBuf,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Tag HEAD with the next version and push the tag
    Bump {
        /// Part to increment: minor or major
        #[arg(default_value = "minor")]
        part: BumpPart,

        /// Repository to tag
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// Validate the CI signing keys from the environment
    CheckKeys {
        /// Key id the CI key must be signed by (defaults to config)
        #[arg(long)]
        signer_key_id: Option<String>,
    },

    /// Check that the deployed site serves a commit
    VerifyDeploy {
        /// Expected commit identifier
        commit: String,

        /// Deployed site URL (defaults to config)
        #[arg(long)]
        url: Option<String>,

        /// Site name the pages were built with (defaults to config)
        #[arg(long)]
        site_name: Option<String>,

        /// Number of attempts (defaults to config)
        #[arg(long)]
        retries: Option<u32>,

        /// Seconds between attempts (defaults to config)
        #[arg(long)]
        delay_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command results
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config(&cli.config)?;

    // Execute command
    match cli.command {
        Commands::Build {
            src,
            output,
            site_name,
            commit,
        } => {
            commands::build::run(&config, src, output, site_name, commit).await?;
        }
        Commands::Serve { port, dir, no_open } => {
            commands::serve::run(port, dir, !no_open).await?;
        }
        Commands::Bump { part, repo } => {
            commands::bump::run(&config, part, repo).await?;
        }
        Commands::CheckKeys { signer_key_id } => {
            commands::keys::run(&config, signer_key_id).await?;
        }
        Commands::VerifyDeploy {
            commit,
            url,
            site_name,
            retries,
            delay_secs,
        } => {
            let args = commands::verify::VerifyArgs {
                url,
                site_name,
                retries,
                delay_secs,
            };
            commands::verify::run(&config, commit, args).await?;
        }
    }

    Ok(())
}
