//! External program templates and their invocation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Command, ExitStatus};
use tracing::debug;

use crate::error::PrepError;

/// An external program plus an argument template.
///
/// Arguments may contain `{name}` placeholders that are filled in per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Arguments with every known placeholder substituted.
    pub fn expand_args(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.args.iter().map(|arg| expand(arg, vars)).collect()
    }

    /// Run to completion with inherited stdio, failing on a non-zero exit.
    pub fn run(&self, step: &'static str, vars: &[(&str, &str)], cwd: &Path) -> Result<(), PrepError> {
        let status = self.status(step, vars, cwd)?;
        if status.success() {
            Ok(())
        } else {
            Err(PrepError::ToolFailed { step, status })
        }
    }

    /// Run to completion and report whether it exited successfully.
    ///
    /// Only a failure to spawn is an error.
    pub fn try_run(&self, step: &'static str, vars: &[(&str, &str)], cwd: &Path) -> Result<bool, PrepError> {
        Ok(self.status(step, vars, cwd)?.success())
    }

    fn status(&self, step: &'static str, vars: &[(&str, &str)], cwd: &Path) -> Result<ExitStatus, PrepError> {
        let args = self.expand_args(vars);
        debug!(step, program = %self.program, ?args, cwd = %cwd.display(), "running");

        let status = Command::new(&self.program)
            .args(&args)
            .current_dir(cwd)
            .status()
            .map_err(|source| PrepError::Spawn {
                step,
                program: self.program.clone(),
                source,
            })?;

        debug!(step, %status, "finished");
        Ok(status)
    }
}

fn expand(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

/// Look up `program` the way the shell would: as a path if it contains a
/// separator, otherwise in each `PATH` entry.
pub fn resolve_program(program: &str) -> Option<std::path::PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|p| p.is_file())
}
