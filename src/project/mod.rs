//! Benchmark project identifiers (`Subject_BugId`).

use std::fmt;
use std::str::FromStr;

use crate::error::PrepError;

/// A benchmark bug instance such as `Lang_10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectId {
    pub subject: String,
    pub bug_id: String,
}

impl ProjectId {
    /// Parse `Subject_BugId`. Exactly one underscore, an alphanumeric subject
    /// and a numeric bug id.
    pub fn parse(raw: &str) -> Result<Self, PrepError> {
        let invalid = || PrepError::InvalidProject(raw.to_string());

        let mut parts = raw.split('_');
        let (subject, bug_id) = match (parts.next(), parts.next(), parts.next()) {
            (Some(subject), Some(bug_id), None) => (subject, bug_id),
            _ => return Err(invalid()),
        };

        if subject.is_empty() || bug_id.is_empty() {
            return Err(invalid());
        }
        // Both parts end up in filesystem paths
        if !subject.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
        if !bug_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        Ok(Self {
            subject: subject.to_string(),
            bug_id: bug_id.to_string(),
        })
    }

    /// Directory name inside the workspace, e.g. `Lang_10`.
    pub fn dir_name(&self) -> String {
        self.to_string()
    }

    /// Archive file name, e.g. `Lang-10.tar.gz`.
    pub fn archive_name(&self) -> String {
        format!("{}-{}.tar.gz", self.subject, self.bug_id)
    }

    /// Download location of the archive under `base_url`.
    ///
    /// Each subject lives in its own `d4j-<subject>` repository.
    pub fn archive_url(&self, base_url: &str) -> String {
        format!(
            "{}/d4j-{}/raw/master/{}",
            base_url.trim_end_matches('/'),
            self.subject.to_lowercase(),
            self.archive_name()
        )
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.subject, self.bug_id)
    }
}

impl FromStr for ProjectId {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subject_and_bug_id() {
        let id = ProjectId::parse("Lang_10").unwrap();
        assert_eq!(id.subject, "Lang");
        assert_eq!(id.bug_id, "10");
        assert_eq!(id.to_string(), "Lang_10");
        assert_eq!(id.dir_name(), "Lang_10");
    }

    #[test]
    fn archive_name_uses_dash() {
        let id = ProjectId::parse("Math_5").unwrap();
        assert_eq!(id.archive_name(), "Math-5.tar.gz");
    }

    #[test]
    fn archive_url_lowercases_subject_repo() {
        let id = ProjectId::parse("Lang_10").unwrap();
        assert_eq!(
            id.archive_url("https://github.com/ali-ghanbari/"),
            "https://github.com/ali-ghanbari/d4j-lang/raw/master/Lang-10.tar.gz"
        );
    }

    #[test]
    fn rejects_missing_underscore() {
        assert!(matches!(
            ProjectId::parse("Lang10"),
            Err(PrepError::InvalidProject(_))
        ));
    }

    #[test]
    fn rejects_extra_underscore() {
        assert!(ProjectId::parse("Lang_10_2").is_err());
        assert!(ProjectId::parse("Closure__3").is_err());
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(ProjectId::parse("_10").is_err());
        assert!(ProjectId::parse("Lang_").is_err());
        assert!(ProjectId::parse("").is_err());
    }

    #[test]
    fn rejects_non_numeric_bug_id() {
        assert!(ProjectId::parse("Lang_ten").is_err());
        assert!(ProjectId::parse("Lang_1b").is_err());
    }

    #[test]
    fn rejects_path_like_subjects() {
        for raw in ["../victim_1", "a/b_1", "./Lang_1", "La ng_1", "..\\x_1", "Läng_1"] {
            assert!(
                matches!(ProjectId::parse(raw), Err(PrepError::InvalidProject(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_alphanumeric_subjects() {
        assert_eq!(ProjectId::parse("JacksonCore_3").unwrap().subject, "JacksonCore");
        assert_eq!(ProjectId::parse("Jsoup2_7").unwrap().subject, "Jsoup2");
    }

    #[test]
    fn from_str_matches_parse() {
        let id: ProjectId = "Chart_1".parse().unwrap();
        assert_eq!(id, ProjectId::parse("Chart_1").unwrap());
    }
}
