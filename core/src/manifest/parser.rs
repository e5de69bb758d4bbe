use super::entry::{Directive, Manifest, Step, Target, Tool};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

const COMMENT_MARKER: char = '#';
const DIRECTIVE_MARKER: char = '!';

static STEP_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S+)\s+(.+)$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("rule after rule definitions ended")]
    DirectiveAfterSteps,
    #[error("missing path")]
    MissingPath,
    #[error("path does not exist: {0}")]
    PathDoesNotExist(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Line-oriented manifest reader. Target paths are resolved and checked
/// against `base_dir`.
pub struct ManifestParser<'a> {
    base_dir: &'a Path,
    in_steps: bool,
    manifest: Manifest,
}

impl<'a> ManifestParser<'a> {
    pub fn new(base_dir: &'a Path) -> Self {
        Self {
            base_dir,
            in_steps: false,
            manifest: Manifest::default(),
        }
    }

    pub fn parse(mut self, text: &str) -> Result<Manifest, ParseError> {
        for (index, raw) in text.lines().enumerate() {
            self.parse_line(index + 1, raw)?;
        }
        Ok(self.manifest)
    }

    fn parse_line(&mut self, line: usize, raw: &str) -> Result<(), ParseError> {
        let content = strip_comment(raw);
        if content.is_empty() {
            return Ok(());
        }

        if let Some(name) = content.strip_prefix(DIRECTIVE_MARKER) {
            if self.in_steps {
                return Err(ParseError {
                    line,
                    kind: ParseErrorKind::DirectiveAfterSteps,
                });
            }
            self.manifest.directives.insert(Directive::from_name(name.trim()));
            return Ok(());
        }

        self.in_steps = true;

        let Some(caps) = STEP_LINE.captures(content) else {
            return Ok(());
        };
        let Some(tool) = Tool::from_keyword(&caps[1]) else {
            return Ok(());
        };

        let targets = self.parse_targets(line, &caps[2])?;
        self.manifest.steps.push(Step {
            tool,
            targets,
            line,
        });

        Ok(())
    }

    fn parse_targets(&self, line: usize, list: &str) -> Result<Vec<Target>, ParseError> {
        list.split(',')
            .map(str::trim)
            .map(|piece| {
                if piece.is_empty() {
                    return Err(ParseError {
                        line,
                        kind: ParseErrorKind::MissingPath,
                    });
                }

                let target = Target::new(piece, self.base_dir);
                if !target.dir.exists() {
                    return Err(ParseError {
                        line,
                        kind: ParseErrorKind::PathDoesNotExist(piece.to_string()),
                    });
                }

                Ok(target)
            })
            .collect()
    }
}

fn strip_comment(line: &str) -> &str {
    line.split(COMMENT_MARKER).next().unwrap_or_default().trim()
}

impl Manifest {
    pub fn parse(text: &str, base_dir: &Path) -> Result<Self, ParseError> {
        ManifestParser::new(base_dir).parse(text)
    }

    /// Reads and parses a manifest file. Target paths are relative to the
    /// process working directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::parse(&text, Path::new("."))?)
    }
}
