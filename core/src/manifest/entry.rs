use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Gradle,
    Maven,
}

impl Tool {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "gradle" => Some(Tool::Gradle),
            "maven" => Some(Tool::Maven),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Tool::Gradle => "gradle",
            Tool::Maven => "maven",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A global run option declared with `!name` before the first step.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Directive {
    /// Update every target from version control before building it.
    Pull,
    /// Unrecognized directive, kept verbatim.
    Other(String),
}

impl Directive {
    pub fn from_name(name: &str) -> Self {
        match name {
            "pull" => Directive::Pull,
            other => Directive::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Directive::Other(_))
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Pull => write!(f, "pull"),
            Directive::Other(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Path exactly as written in the manifest.
    pub path: String,
    /// Directory the build runs in.
    pub dir: PathBuf,
}

impl Target {
    pub fn new(path: impl Into<String>, base_dir: &Path) -> Self {
        let path = path.into();
        let dir = base_dir.join(&path);
        Self { path, dir }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub tool: Tool,
    pub targets: Vec<Target>,
    pub line: usize,
}

impl Step {
    pub fn is_batch(&self) -> bool {
        self.targets.len() > 1
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths: Vec<&str> = self.targets.iter().map(|t| t.path.as_str()).collect();
        write!(f, "{} {}", self.tool, paths.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub directives: BTreeSet<Directive>,
    pub steps: Vec<Step>,
}

impl Manifest {
    pub fn pull(&self) -> bool {
        self.directives.contains(&Directive::Pull)
    }

    pub fn unknown_directives(&self) -> impl Iterator<Item = &Directive> {
        self.directives.iter().filter(|d| !d.is_known())
    }

    /// Number of targets across all steps, i.e. the length of the flattened cursor.
    pub fn target_count(&self) -> usize {
        self.steps.iter().map(|step| step.targets.len()).sum()
    }

    /// Every target with its 1-based flattened position and owning step index.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize, &Target)> {
        self.steps
            .iter()
            .enumerate()
            .flat_map(|(step_index, step)| step.targets.iter().map(move |t| (step_index, t)))
            .enumerate()
            .map(|(i, (step_index, target))| (i + 1, step_index, target))
    }
}
