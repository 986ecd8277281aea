use anyhow::Result;
use clap::Parser as ClapParser;
use colored::Colorize;
use d4j_prep::cli::{self, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("D4J_PREP_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Usage errors go to stdout and exit 1; --help and --version exit 0.
    let cli_args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            println!("{}", e.render());
            std::process::exit(1);
        }
        Err(e) => {
            let _ = e.print();
            std::process::exit(0);
        }
    };

    if let Err(e) = run(cli_args) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli_args: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli_args.command {
        cli::completions(shell);
        return Ok(());
    }
    if let Commands::Init = cli_args.command {
        return cli::init(std::path::Path::new("."));
    }

    let config = cli::load_config(cli_args.config.as_deref())?;

    match cli_args.command {
        Commands::Checkout {
            project,
            path,
            no_cache,
        } => cli::checkout(&config, &project, &path, no_cache)?,
        Commands::Fetch { project, path } => cli::fetch(&config, &project, &path)?,
        Commands::Instrument { project, path } => cli::instrument(&config, &project, &path)?,
        Commands::Doctor => cli::doctor(&config)?,
        Commands::Init | Commands::Completions { .. } => {}
    }

    Ok(())
}
