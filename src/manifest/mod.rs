//! Line-level rewrites of a project's build manifest (`pom.xml`).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Replace the first line whose trimmed content equals `line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRule {
    pub line: String,
    pub replacement: String,
}

impl PatchRule {
    pub fn new(line: &str, replacement: &str) -> Self {
        Self {
            line: line.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// Apply every rule to `content`. Each rule rewrites at most one line;
/// indentation and line endings are kept.
///
/// Returns the new content and the number of lines rewritten.
pub fn apply_rules(content: &str, rules: &[PatchRule]) -> (String, usize) {
    let mut lines: Vec<String> = content.split_inclusive('\n').map(str::to_string).collect();
    let mut patched = 0;

    for rule in rules {
        let hit = lines.iter_mut().find(|l| l.trim() == rule.line);
        if let Some(line) = hit {
            *line = rewrite_line(line, &rule.replacement);
            patched += 1;
        }
    }

    (lines.concat(), patched)
}

fn rewrite_line(line: &str, replacement: &str) -> String {
    let body_start = line.len() - line.trim_start().len();
    let body_end = line.trim_end().len();
    format!("{}{}{}", &line[..body_start], replacement, &line[body_end..])
}

/// Rewrite the manifest at `path` in place. The file is always written back,
/// even when no rule matched.
pub fn patch_file(path: &Path, rules: &[PatchRule]) -> Result<usize> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read build manifest: {}", path.display()))?;

    let (patched_content, patched) = apply_rules(&content, rules);

    fs::write(path, patched_content)
        .with_context(|| format!("Failed to write build manifest: {}", path.display()))?;

    Ok(patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn maven_rule() -> PatchRule {
        PatchRule::new(
            "<url>http://repo1.maven.org/maven2</url>",
            "<url>https://repo1.maven.org/maven2</url>",
        )
    }

    const POM: &str = "<project>\n  <repositories>\n    <repository>\n      <url>http://repo1.maven.org/maven2</url>\n    </repository>\n  </repositories>\n</project>\n";

    #[test]
    fn rewrites_matching_line_keeping_indent() {
        let (out, n) = apply_rules(POM, &[maven_rule()]);
        assert_eq!(n, 1);
        assert!(out.contains("      <url>https://repo1.maven.org/maven2</url>\n"));
        assert!(!out.contains("http://repo1"));
        assert_eq!(out.lines().count(), POM.lines().count());
    }

    #[test]
    fn only_first_match_is_rewritten() {
        let pom = "<url>http://repo1.maven.org/maven2</url>\n<url>http://repo1.maven.org/maven2</url>\n";
        let (out, n) = apply_rules(pom, &[maven_rule()]);
        assert_eq!(n, 1);
        assert_eq!(
            out,
            "<url>https://repo1.maven.org/maven2</url>\n<url>http://repo1.maven.org/maven2</url>\n"
        );
    }

    #[test]
    fn substring_matches_are_ignored() {
        let pom = "<!-- <url>http://repo1.maven.org/maven2</url> -->\n";
        let (out, n) = apply_rules(pom, &[maven_rule()]);
        assert_eq!(n, 0);
        assert_eq!(out, pom);
    }

    #[test]
    fn crlf_line_endings_preserved() {
        let pom = "<a>\r\n  <url>http://repo1.maven.org/maven2</url>\r\n</a>";
        let (out, n) = apply_rules(pom, &[maven_rule()]);
        assert_eq!(n, 1);
        assert_eq!(out, "<a>\r\n  <url>https://repo1.maven.org/maven2</url>\r\n</a>");
    }

    #[test]
    fn multiple_rules_each_apply_once() {
        let rules = vec![maven_rule(), PatchRule::new("<b>old</b>", "<b>new</b>")];
        let pom = "<b>old</b>\n<url>http://repo1.maven.org/maven2</url>\n<b>old</b>\n";
        let (out, n) = apply_rules(pom, &rules);
        assert_eq!(n, 2);
        assert_eq!(
            out,
            "<b>new</b>\n<url>https://repo1.maven.org/maven2</url>\n<b>old</b>\n"
        );
    }

    #[test]
    fn patch_file_writes_unchanged_content_without_match() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pom.xml");
        fs::write(&path, "<project/>\n").unwrap();

        let n = patch_file(&path, &[maven_rule()]).unwrap();
        assert_eq!(n, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "<project/>\n");
    }

    #[test]
    fn patch_file_rewrites_in_place() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("pom.xml");
        fs::write(&path, POM).unwrap();

        assert_eq!(patch_file(&path, &[maven_rule()]).unwrap(), 1);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("https://repo1.maven.org/maven2"));
    }

    #[test]
    fn patch_file_missing_manifest_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = patch_file(&tmp.path().join("pom.xml"), &[maven_rule()]).unwrap_err();
        assert!(err.to_string().contains("Failed to read build manifest"));
    }
}
