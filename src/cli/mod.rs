use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::checkout::{self, CheckoutOptions};
use crate::config::Config;
use crate::instrument;

mod doctor;
mod init;

pub use doctor::{doctor, preflight, Finding};
pub use init::init;

#[derive(Parser)]
#[command(
    name = "d4j-prep",
    about = "Fetch, build and instrument Defects4J-style benchmark checkouts",
    version
)]
pub struct Cli {
    /// Config file (default: ./.d4jrc.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download, extract and build a project into <path>/<project>
    Checkout {
        /// Project identifier, e.g. Lang_10
        project: String,

        /// Workspace directory that receives the checkout
        path: PathBuf,

        /// Download the archive even if a cached copy exists, and delete it afterwards
        #[arg(long)]
        no_cache: bool,
    },

    /// Download and extract a project into <path>/<project> without building
    Fetch {
        /// Project identifier, e.g. Lang_10
        project: String,

        /// Workspace directory that receives the checkout
        path: PathBuf,
    },

    /// Instrument the compiled classes of <path>/<project>
    Instrument {
        /// Project identifier, e.g. Lang_10
        project: String,

        /// Workspace directory holding the built checkout
        path: PathBuf,
    },

    /// Check that external tools and instrumenter files are available
    Doctor,

    /// Write a .d4jrc.json with the default configuration
    Init,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Load `explicit` if given, otherwise `.d4jrc.json` in the current directory.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load_file(path),
        None => Config::load(),
    }
}

pub fn checkout(config: &Config, project: &str, path: &Path, no_cache: bool) -> Result<()> {
    println!("{}", "Checking out...".green().bold());
    let mut options = CheckoutOptions::with_build();
    if no_cache {
        options.archive = crate::archive::ArchivePolicy::Transient;
    }
    let dest = checkout::checkout(config, project, path, options)?;
    println!("\n{} {}", "✓".green().bold(), dest.display());
    Ok(())
}

pub fn fetch(config: &Config, project: &str, path: &Path) -> Result<()> {
    println!("{}", "Fetching...".green().bold());
    let dest = checkout::checkout(config, project, path, CheckoutOptions::fetch_only())?;
    println!("\n{} {}", "✓".green().bold(), dest.display());
    Ok(())
}

pub fn instrument(config: &Config, project: &str, path: &Path) -> Result<()> {
    instrument::instrument(config, project, path)?;
    println!("\n{} {} instrumented", "✓".green().bold(), project);
    Ok(())
}

pub fn completions(shell: Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut Cli::command(),
        "d4j-prep",
        &mut std::io::stdout(),
    );
}
