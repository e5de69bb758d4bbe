use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Progress,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn color(&self) -> &'static str {
        match self {
            LogLevel::Info => "\x1b[37m",
            LogLevel::Progress => "\x1b[33m",
            LogLevel::Success => "\x1b[32m",
            LogLevel::Warning => "\x1b[33;1m",
            LogLevel::Error => "\x1b[31m",
        }
    }
}

pub struct Logger {
    use_colors: bool,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }

    pub fn format(&self, level: LogLevel, message: &str) -> String {
        if self.use_colors && !message.is_empty() {
            format!("{}{}\x1b[0m", level.color(), message)
        } else {
            message.to_string()
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        let line = self.format(level, message);
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }

    /// Raw build output, never colored.
    pub fn log_output(&self, output: &str) {
        if output.is_empty() {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", output);
        let _ = stdout.flush();
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
