use anyhow::Context;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::command::BuildCommand;

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub success: bool,
    pub duration: f64,
    /// Interleaved stdout and stderr, in arrival order.
    pub output: Vec<String>,
    pub exit_code: Option<i32>,
    pub failure_reason: Option<String>,
}

/// Program paths with a separator (`./gradlew`, `.\\gradlew.bat`) are
/// relative to the target directory, not to the directory loaf runs in.
pub fn resolve_program(program: &str, dir: &Path) -> PathBuf {
    let path = Path::new(program);
    if path.is_absolute() || !(program.contains('/') || program.contains('\\')) {
        return path.to_path_buf();
    }
    dir.join(path)
}

/// Forwards every line until EOF. Invalid UTF-8 is replaced, never treated as
/// the end of the stream, so the child never sees a closed pipe.
async fn forward_lines<R>(stream: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut segments = BufReader::new(stream).split(b'\n');
    while let Ok(Some(mut segment)) = segments.next_segment().await {
        if segment.last() == Some(&b'\r') {
            segment.pop();
        }
        let _ = tx.send(String::from_utf8_lossy(&segment).into_owned());
    }
}

/// Runs one command in `dir`, capturing its output line by line.
///
/// An `Err` means the process could not be started or waited on; a process
/// that ran and exited non-zero is an `Ok` with `success == false`.
pub async fn execute_command(
    command: &BuildCommand,
    dir: &Path,
) -> anyhow::Result<ExecutionResult> {
    let start = Instant::now();

    let (program, args) = command
        .argv
        .split_first()
        .context("Cannot execute an empty command")?;

    let mut child = Command::new(resolve_program(program, dir))
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn command: {}", program))?;

    let stdout = child.stdout.take().context("Failed to capture stdout")?;
    let stderr = child.stderr.take().context("Failed to capture stderr")?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let stdout_task = tokio::spawn(forward_lines(stdout, tx.clone()));
    let stderr_task = tokio::spawn(forward_lines(stderr, tx));

    let collector_task = tokio::spawn(async move {
        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line);
        }
        lines
    });

    let status = child
        .wait()
        .await
        .context("Failed to wait for child process")?;

    stdout_task.await.context("stdout task panicked")?;
    stderr_task.await.context("stderr task panicked")?;
    let output = collector_task.await.context("output task panicked")?;

    let duration = start.elapsed().as_secs_f64();
    let exit_code = status.code();
    let failure_reason = if status.success() {
        None
    } else {
        Some(match exit_code {
            Some(code) => format!("{} exited with code {}", program, code),
            None => format!("{} was terminated by a signal", program),
        })
    };

    Ok(ExecutionResult {
        success: status.success(),
        duration,
        output,
        exit_code,
        failure_reason,
    })
}
