use crate::config::ToolsConfig;
use crate::manifest::Tool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    pub description: String,
    pub argv: Vec<String>,
}

impl BuildCommand {
    pub fn new(description: String, argv: Vec<String>) -> Self {
        Self { description, argv }
    }
}

impl std::fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.description, self.argv.join(" "))
    }
}

/// Argument vectors for the version-control update and each tool's
/// build-and-install sequence.
#[derive(Debug, Clone)]
pub struct ToolCommands {
    gradle: Vec<Vec<String>>,
    maven: Vec<Vec<String>>,
    pull: Vec<String>,
}

impl ToolCommands {
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            gradle: config.gradle.clone(),
            maven: config.maven.clone(),
            pull: config.pull.clone(),
        }
    }

    pub fn pull_command(&self) -> BuildCommand {
        BuildCommand::new("Updating".to_string(), self.pull.clone())
    }

    pub fn build_commands(&self, tool: Tool) -> Vec<BuildCommand> {
        let templates = match tool {
            Tool::Gradle => &self.gradle,
            Tool::Maven => &self.maven,
        };

        templates
            .iter()
            .map(|argv| BuildCommand::new(format!("Running {}", tool), argv.clone()))
            .collect()
    }

    /// Everything to run in a target directory, in order.
    pub fn sequence(&self, tool: Tool, pull: bool) -> Vec<BuildCommand> {
        let mut commands = Vec::new();
        if pull {
            commands.push(self.pull_command());
        }
        commands.extend(self.build_commands(tool));
        commands
    }
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self::new(&ToolsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_without_pull() {
        let commands = ToolCommands::default().sequence(Tool::Maven, false);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].argv[1..], ["clean", "package", "install", "-U"]);
    }

    #[test]
    fn test_sequence_with_pull() {
        let commands = ToolCommands::default().sequence(Tool::Gradle, true);
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].argv, vec!["git", "pull"]);
        assert_eq!(commands[1].argv[1], "build");
        assert_eq!(commands[2].argv[1], "publishToMavenLocal");
    }

    #[test]
    fn test_custom_templates() {
        let config = ToolsConfig {
            gradle: vec![vec!["gradle".to_string(), "assemble".to_string()]],
            maven: vec![],
            pull: vec!["hg".to_string(), "pull".to_string(), "-u".to_string()],
        };
        let commands = ToolCommands::new(&config);

        assert!(commands.build_commands(Tool::Maven).is_empty());
        assert_eq!(
            format!("{}", commands.sequence(Tool::Gradle, true)[1]),
            "Running gradle: gradle assemble"
        );
        assert_eq!(format!("{}", commands.pull_command()), "Updating: hg pull -u");
    }
}
