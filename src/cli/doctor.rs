use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::tool::resolve_program;

/// One preflight check and its outcome.
#[derive(Debug, Clone)]
pub struct Finding {
    pub label: &'static str,
    pub detail: String,
    pub ok: bool,
}

/// Check every external program and instrumenter file the config refers to.
pub fn preflight(config: &Config) -> Vec<Finding> {
    let mut findings = Vec::new();

    let tools = [
        ("downloader", &config.downloader.program),
        ("extractor", &config.extractor.program),
        ("build", &config.build.command.program),
        ("instrumenter", &config.instrumenter.command.program),
    ];
    for (label, program) in tools {
        let resolved = resolve_program(program);
        findings.push(Finding {
            label,
            detail: match &resolved {
                Some(path) => path.display().to_string(),
                None => format!("{} not found on PATH", program),
            },
            ok: resolved.is_some(),
        });
    }

    let jar = &config.instrumenter.jar;
    findings.push(Finding {
        label: "instrumenter jar",
        detail: jar.display().to_string(),
        ok: jar.is_file(),
    });

    let support = config
        .instrumenter
        .classes_dir
        .join(&config.instrumenter.support_class);
    findings.push(Finding {
        label: "support class",
        detail: support.display().to_string(),
        ok: support.is_file(),
    });

    findings
}

pub fn doctor(config: &Config) -> Result<()> {
    println!("{}", "d4j-prep Doctor".cyan().bold());
    println!("{}", "=".repeat(40).dimmed());

    println!("\n{}", "Archives:".yellow().bold());
    println!("  Source: {}", config.archive_base_url);
    println!("  Cache:  {}", config.archive_dir.display());

    println!("\n{}", "Prerequisites:".yellow().bold());
    let findings = preflight(config);
    for f in &findings {
        let mark = if f.ok { "✓".green() } else { "✗".red() };
        println!("  {} {:<17} {}", mark, f.label, f.detail.dimmed());
    }
    println!();

    let missing = findings.iter().filter(|f| !f.ok).count();
    if missing > 0 {
        anyhow::bail!("{} prerequisite(s) missing", missing);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolCommand;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn reports_missing_tools_and_files() {
        let mut config = Config::default();
        config.build.command = ToolCommand::new("definitely-not-a-real-program-d4j", &[]);
        config.instrumenter.jar = "/nonexistent/apr.jar".into();

        let findings = preflight(&config);
        let build = findings.iter().find(|f| f.label == "build").unwrap();
        assert!(!build.ok);
        assert!(build.detail.contains("not found on PATH"));
        let jar = findings.iter().find(|f| f.label == "instrumenter jar").unwrap();
        assert!(!jar.ok);
        assert!(doctor(&config).is_err());
    }

    #[test]
    fn passes_when_everything_present() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("apr.jar");
        fs::write(&jar, b"jar").unwrap();
        let classes = tmp.path().join("classes");
        let support = classes.join("kr/ac/unist/apr/GlobalStates.class");
        fs::create_dir_all(support.parent().unwrap()).unwrap();
        fs::write(&support, b"class").unwrap();

        let mut config = Config::default();
        for tool in [
            &mut config.downloader,
            &mut config.extractor,
            &mut config.build.command,
            &mut config.instrumenter.command,
        ] {
            *tool = ToolCommand::new("sh", &[]);
        }
        config.instrumenter.jar = jar;
        config.instrumenter.classes_dir = classes;

        assert!(preflight(&config).iter().all(|f| f.ok));
        assert!(doctor(&config).is_ok());
    }
}
