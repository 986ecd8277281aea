//! Running the external instrumenter over a built checkout.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Config;
use crate::error::PrepError;
use crate::project::ProjectId;

/// Compiled classes of a checkout.
pub fn target_classes(workspace: &Path, project: &ProjectId) -> PathBuf {
    workspace
        .join(project.dir_name())
        .join("target")
        .join("classes")
}

/// Instrument `{workspace}/{project}/target/classes` in place, then copy the
/// support class next to the instrumented output.
///
/// Returns the path of the copied support class.
pub fn instrument(config: &Config, project: &str, workspace: &Path) -> Result<PathBuf> {
    let project = ProjectId::parse(project)?;
    let classes = target_classes(workspace, &project);
    if !classes.is_dir() {
        return Err(PrepError::MissingClasses(classes).into());
    }

    // The instrumenter runs inside the workspace, so relative paths would resolve twice
    let instr = &config.instrumenter;
    let jar = absolute(&instr.jar)?.to_string_lossy().into_owned();
    let own_classes = absolute(&instr.classes_dir)?;
    let classes = absolute(&classes)?;
    let own_classes_str = own_classes.to_string_lossy().into_owned();
    let target = classes.to_string_lossy().into_owned();

    println!("{}", "Instrumenting...".green().bold());
    let ok = instr.command.try_run(
        "instrument",
        &[
            ("jar", jar.as_str()),
            ("instrumenter_classes", own_classes_str.as_str()),
            ("target_classes", target.as_str()),
        ],
        workspace,
    )?;
    if !ok {
        return Err(PrepError::InstrumentationFailed {
            project: project.to_string(),
        }
        .into());
    }

    let source = own_classes.join(&instr.support_class);
    let dest = classes.join(&instr.support_class);
    copy_support_class(&source, &dest).map_err(|err| PrepError::SupportCopyFailed {
        project: project.to_string(),
        source: err,
    })?;
    debug!(from = %source.display(), to = %dest.display(), "copied support class");
    println!("  {} {}", "Support:".bold(), dest.display());

    Ok(dest)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("Failed to resolve path: {}", path.display()))
}

fn copy_support_class(source: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, dest)?;
    Ok(())
}
