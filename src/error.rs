use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures raised by the checkout and instrumentation pipelines.
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("invalid project identifier '{0}': expected Subject_BugId (e.g. Lang_10)")]
    InvalidProject(String),

    #[error("failed to run {step} ({program}): {source}")]
    Spawn {
        step: &'static str,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} failed ({status})")]
    ToolFailed {
        step: &'static str,
        status: ExitStatus,
    },

    #[error("build of {project} failed after {attempts} attempt(s)")]
    BuildFailed { project: String, attempts: u32 },

    #[error("archive {archive} did not contain a single project directory")]
    ArchiveLayout { archive: PathBuf },

    #[error("compiled classes not found at {0}")]
    MissingClasses(PathBuf),

    #[error("Instrumentation failed for {project}")]
    InstrumentationFailed { project: String },

    #[error("Copy original code failed for {project}: {source}")]
    SupportCopyFailed {
        project: String,
        #[source]
        source: std::io::Error,
    },
}
