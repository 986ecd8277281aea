//! Fetching and unpacking project archives.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::PrepError;
use crate::project::ProjectId;

/// How a downloaded archive is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchivePolicy {
    /// Reuse a previously downloaded archive and keep it afterwards.
    Cached,
    /// Always download, delete once the checkout is in place.
    Transient,
}

/// Local path of the project's archive inside `archive_dir`.
pub fn archive_path(config: &Config, project: &ProjectId) -> Result<PathBuf> {
    let path = config.archive_dir.join(project.archive_name());
    std::path::absolute(&path)
        .with_context(|| format!("Failed to resolve archive path: {}", path.display()))
}

/// Make sure the archive is on disk and return its absolute path.
///
/// Downloads go to a `.part` file first, so an interrupted download never
/// looks like a cached archive.
pub fn fetch(config: &Config, project: &ProjectId, policy: ArchivePolicy) -> Result<PathBuf> {
    let archive = archive_path(config, project)?;

    if policy == ArchivePolicy::Cached && archive.is_file() {
        info!(archive = %archive.display(), "reusing cached archive");
        return Ok(archive);
    }

    let dir = archive
        .parent()
        .context("Archive path has no parent directory")?;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create archive dir: {}", dir.display()))?;

    let partial = archive.with_extension("gz.part");
    let url = project.archive_url(&config.archive_base_url);
    let partial_str = partial.to_string_lossy().into_owned();

    let result = config.downloader.run(
        "download",
        &[("url", url.as_str()), ("output", partial_str.as_str())],
        dir,
    );
    if let Err(e) = result {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }

    fs::rename(&partial, &archive)
        .with_context(|| format!("Failed to move download into place: {}", archive.display()))?;
    debug!(archive = %archive.display(), %url, "downloaded");

    Ok(archive)
}

/// Unpack `archive` into a fresh `staging` directory and return the
/// project root inside it.
///
/// Archives unpack to a directory named after the bug id; any archive with a
/// single top-level directory is accepted too.
pub fn extract(config: &Config, project: &ProjectId, archive: &Path, staging: &Path) -> Result<PathBuf> {
    if staging.exists() {
        fs::remove_dir_all(staging)
            .with_context(|| format!("Failed to clear staging dir: {}", staging.display()))?;
    }
    fs::create_dir_all(staging)
        .with_context(|| format!("Failed to create staging dir: {}", staging.display()))?;

    let archive_str = archive.to_string_lossy().into_owned();
    config
        .extractor
        .run("extract", &[("archive", archive_str.as_str())], staging)?;

    let expected = staging.join(&project.bug_id);
    if expected.is_dir() {
        return Ok(expected);
    }

    let entries: Vec<PathBuf> = fs::read_dir(staging)
        .with_context(|| format!("Failed to read staging dir: {}", staging.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<Vec<PathBuf>>>()
        .with_context(|| format!("Failed to list staging dir: {}", staging.display()))?;

    match entries.as_slice() {
        [only] if only.is_dir() => Ok(only.clone()),
        _ => Err(PrepError::ArchiveLayout {
            archive: archive.to_path_buf(),
        }
        .into()),
    }
}

/// Delete `relative` under `root` if it exists. Missing paths are fine.
pub fn remove_excluded(root: &Path, relative: &Path) -> Result<bool> {
    let target = root.join(relative);
    let removed = if target.is_dir() {
        fs::remove_dir_all(&target)
    } else if target.exists() {
        fs::remove_file(&target)
    } else {
        return Ok(false);
    };
    removed.with_context(|| format!("Failed to remove excluded path: {}", target.display()))?;
    Ok(true)
}
