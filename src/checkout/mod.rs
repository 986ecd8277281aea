//! Checkout pipeline: download, extract, place into the workspace, build.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::archive::{self, ArchivePolicy};
use crate::config::Config;
use crate::error::PrepError;
use crate::manifest;
use crate::project::ProjectId;

#[derive(Debug, Clone, Copy)]
pub struct CheckoutOptions {
    /// Compile the checkout (with patch-and-retry) once it is in place
    pub build: bool,
    pub archive: ArchivePolicy,
}

impl CheckoutOptions {
    /// Cached archive, build after checkout.
    pub fn with_build() -> Self {
        Self {
            build: true,
            archive: ArchivePolicy::Cached,
        }
    }

    /// Fresh download, deleted afterwards, no build.
    pub fn fetch_only() -> Self {
        Self {
            build: false,
            archive: ArchivePolicy::Transient,
        }
    }
}

/// Check out `project` into `{workspace}/{project}` and return that path.
///
/// Any previous checkout at the destination is removed first. The project id
/// is validated before anything touches the filesystem.
pub fn checkout(
    config: &Config,
    project: &str,
    workspace: &Path,
    options: CheckoutOptions,
) -> Result<PathBuf> {
    let project = ProjectId::parse(project)?;

    if !workspace.is_dir() {
        anyhow::bail!("Workspace path is not a directory: {}", workspace.display());
    }

    let dest = workspace.join(project.dir_name());
    let staging = workspace.join(format!(".{}.extract", project.dir_name()));

    println!("  {} {}", "Project:".bold(), project);

    if dest.exists() {
        fs::remove_dir_all(&dest)
            .with_context(|| format!("Failed to remove stale checkout: {}", dest.display()))?;
        println!("  {} {}", "Removed:".bold(), dest.display());
    }

    println!("{}", "Fetching archive...".green().bold());
    let archive_file = archive::fetch(config, &project, options.archive)?;

    let placed = place(config, &project, &archive_file, &staging, &dest);
    if placed.is_err() {
        let _ = fs::remove_dir_all(&staging);
    }
    let archive_removed = match options.archive {
        ArchivePolicy::Transient => fs::remove_file(&archive_file)
            .with_context(|| format!("Failed to delete archive: {}", archive_file.display())),
        ArchivePolicy::Cached => Ok(()),
    };
    placed?;
    archive_removed?;

    if options.build {
        println!("{}", "Building...".green().bold());
        let attempts = build(config, &project, &dest)?;
        println!(
            "  {} {} after {} attempt(s)",
            "Build:".bold(),
            "success".green(),
            attempts
        );
    }

    Ok(dest)
}

/// Extract into `staging`, drop excluded files and move the project root to `dest`.
fn place(
    config: &Config,
    project: &ProjectId,
    archive_file: &Path,
    staging: &Path,
    dest: &Path,
) -> Result<()> {
    println!("{}", "Extracting...".green().bold());
    let extracted = archive::extract(config, project, archive_file, staging)?;

    for excluded in config.exclusions_for(&project.subject) {
        if archive::remove_excluded(&extracted, excluded)? {
            println!("  {} {}", "Excluded:".bold(), excluded.display());
        }
    }

    fs::rename(&extracted, dest).with_context(|| {
        format!(
            "Failed to move {} to {}",
            extracted.display(),
            dest.display()
        )
    })?;
    fs::remove_dir_all(staging)
        .with_context(|| format!("Failed to remove staging dir: {}", staging.display()))?;
    println!("  {} {}", "Checkout:".bold(), dest.display());
    Ok(())
}

/// Run the build in `dest`. After each failure, patch the manifest and try
/// again, up to `build.retries` extra attempts.
///
/// Returns the number of attempts it took.
pub fn build(config: &Config, project: &ProjectId, dest: &Path) -> Result<u32> {
    let allowed = config.build.retries + 1;
    let manifest_path = dest.join(&config.build.manifest_file);

    for attempt in 1..=allowed {
        if config.build.command.try_run("build", &[], dest)? {
            return Ok(attempt);
        }

        if attempt < allowed {
            warn!(%project, attempt, "build failed, patching manifest and retrying");
            let patched = manifest::patch_file(&manifest_path, &config.build.patches)?;
            println!(
                "  {} build failed, patched {} manifest line(s), retrying",
                "!".yellow(),
                patched
            );
        }
    }

    Err(PrepError::BuildFailed {
        project: project.to_string(),
        attempts: allowed,
    }
    .into())
}
