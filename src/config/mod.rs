use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::manifest::PatchRule;
use crate::tool::ToolCommand;

pub const CONFIG_FILE: &str = ".d4jrc.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root under which each subject has a `d4j-<subject>` archive repository
    #[serde(default = "default_archive_base_url")]
    pub archive_base_url: String,

    /// Where downloaded archives are stored (and reused from)
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Downloader template; `{url}` and `{output}` are substituted
    #[serde(default = "default_downloader")]
    pub downloader: ToolCommand,

    /// Extractor template; `{archive}` is substituted
    #[serde(default = "default_extractor")]
    pub extractor: ToolCommand,

    #[serde(default)]
    pub build: BuildConfig,

    /// Files removed from freshly extracted trees, per subject
    #[serde(default = "default_exclusions")]
    pub exclusions: Vec<Exclusion>,

    #[serde(default)]
    pub instrumenter: InstrumenterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_build_command")]
    pub command: ToolCommand,

    /// Manifest rewritten by `patches` when a build fails
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Patch-and-retry cycles after the first failed build
    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_patches")]
    pub patches: Vec<PatchRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumenterConfig {
    /// Template; `{jar}`, `{instrumenter_classes}` and `{target_classes}` are substituted
    #[serde(default = "default_instrumenter_command")]
    pub command: ToolCommand,

    #[serde(default = "default_instrumenter_jar")]
    pub jar: PathBuf,

    /// The instrumenter's own compiled classes
    #[serde(default = "default_instrumenter_classes")]
    pub classes_dir: PathBuf,

    /// Class copied into the target's output, relative to both class roots
    #[serde(default = "default_support_class")]
    pub support_class: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub subject: String,
    /// Relative to the extracted project root
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_base_url: default_archive_base_url(),
            archive_dir: default_archive_dir(),
            downloader: default_downloader(),
            extractor: default_extractor(),
            build: BuildConfig::default(),
            exclusions: default_exclusions(),
            instrumenter: InstrumenterConfig::default(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: default_build_command(),
            manifest_file: default_manifest_file(),
            retries: default_retries(),
            patches: default_patches(),
        }
    }
}

impl Default for InstrumenterConfig {
    fn default() -> Self {
        Self {
            command: default_instrumenter_command(),
            jar: default_instrumenter_jar(),
            classes_dir: default_instrumenter_classes(),
            support_class: default_support_class(),
        }
    }
}

impl Config {
    /// Load `.d4jrc.json` from the current directory, then apply env overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_dir(Path::new("."))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load an explicit config file, then apply env overrides.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Override fields from environment variables, looked up through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("D4J_ARCHIVE_BASE_URL") {
            self.archive_base_url = v;
        }
        if let Some(v) = var("D4J_ARCHIVE_DIR") {
            self.archive_dir = PathBuf::from(v);
        }
        if let Some(v) = var("D4J_INSTRUMENTER_JAR") {
            self.instrumenter.jar = PathBuf::from(v);
        }
        if let Some(v) = var("D4J_INSTRUMENTER_CLASSES") {
            self.instrumenter.classes_dir = PathBuf::from(v);
        }
    }

    /// Paths excluded from checkouts of `subject`.
    pub fn exclusions_for<'a>(&'a self, subject: &'a str) -> impl Iterator<Item = &'a Path> + 'a {
        self.exclusions
            .iter()
            .filter(move |e| e.subject == subject)
            .map(|e| e.path.as_path())
    }
}

fn default_archive_base_url() -> String {
    "https://github.com/ali-ghanbari".to_string()
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_downloader() -> ToolCommand {
    ToolCommand::new("wget", &["-q", "-O", "{output}", "{url}"])
}

fn default_extractor() -> ToolCommand {
    ToolCommand::new("tar", &["-xf", "{archive}"])
}

fn default_build_command() -> ToolCommand {
    ToolCommand::new("mvn", &["compile"])
}

fn default_manifest_file() -> String {
    "pom.xml".to_string()
}

fn default_retries() -> u32 {
    1
}

fn default_patches() -> Vec<PatchRule> {
    vec![PatchRule::new(
        "<url>http://repo1.maven.org/maven2</url>",
        "<url>https://repo1.maven.org/maven2</url>",
    )]
}

fn default_exclusions() -> Vec<Exclusion> {
    vec![Exclusion {
        subject: "Lang".to_string(),
        path: PathBuf::from("src/test/java/org/apache/commons/lang3/reflect/TypeUtilsTest.java"),
    }]
}

fn default_instrumenter_command() -> ToolCommand {
    ToolCommand::new(
        "java",
        &[
            "-cp",
            "{jar}",
            "kr.ac.unist.apr.InstrumentationMain",
            "{instrumenter_classes}",
            "{target_classes}",
        ],
    )
}

fn default_instrumenter_jar() -> PathBuf {
    PathBuf::from("/root/project/greybox-APR/build/libs/APR-instrumenter.jar")
}

fn default_instrumenter_classes() -> PathBuf {
    PathBuf::from("/root/project/greybox-APR/build/classes/java/main")
}

fn default_support_class() -> PathBuf {
    PathBuf::from("kr/ac/unist/apr/GlobalStates.class")
}
