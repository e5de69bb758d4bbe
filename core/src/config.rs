use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Upper bound on builds in flight within one batch step. Unbounded when unset.
    #[serde(default)]
    pub max_concurrent: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_gradle")]
    pub gradle: Vec<Vec<String>>,
    #[serde(default = "default_maven")]
    pub maven: Vec<Vec<String>>,
    #[serde(default = "default_pull")]
    pub pull: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_runs")]
    pub max_runs: usize,
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            gradle: default_gradle(),
            maven: default_maven(),
            pull: default_pull(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_runs: default_max_runs(),
            storage_path: default_storage_path(),
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn default_gradle() -> Vec<Vec<String>> {
    let wrapper = if cfg!(windows) {
        ".\\gradlew.bat"
    } else {
        "./gradlew"
    };
    vec![argv(&[wrapper, "build"]), argv(&[wrapper, "publishToMavenLocal"])]
}

fn default_maven() -> Vec<Vec<String>> {
    let mvn = if cfg!(windows) { "mvn.cmd" } else { "mvn" };
    vec![argv(&[mvn, "clean", "package", "install", "-U"])]
}

fn default_pull() -> Vec<String> {
    argv(&["git", "pull"])
}

fn default_true() -> bool {
    true
}

fn default_max_runs() -> usize {
    50
}

fn default_storage_path() -> String {
    "~/.cache/loaf/history.json".to_string()
}

impl Config {
    /// Loads `path`, or the global config when no path is given. A missing
    /// file yields the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_from_file(Self::global_path()),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = Self::expand_path(&path.as_ref().to_string_lossy());

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.scheduler.max_concurrent == Some(0) {
            anyhow::bail!("scheduler.max_concurrent must be at least 1");
        }

        let commands = self.tools.gradle.iter().chain(self.tools.maven.iter());
        if commands.chain(std::iter::once(&self.tools.pull)).any(|c| c.is_empty()) {
            anyhow::bail!("tool commands must not be empty");
        }

        Ok(())
    }

    pub fn global_path() -> PathBuf {
        Self::expand_path("~/.config/loaf/config.toml")
    }

    pub fn expand_path(path: &str) -> PathBuf {
        let expanded = shellexpand::tilde(path);
        PathBuf::from(expanded.as_ref())
    }

    pub fn storage_path(&self) -> PathBuf {
        Self::expand_path(&self.history.storage_path)
    }
}
