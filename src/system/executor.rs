// src/system/executor.rs

use crate::models::CommandTask;
use std::io::{self, ErrorKind, Write};
use std::process::{Output, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tokio::task::JoinSet;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Could not start the task runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("Failed to write task output: {0}")]
    Output(#[from] io::Error),
}

/// What happened to one task once its child process is gone.
#[derive(Debug)]
pub struct TaskOutcome {
    pub name: String,
    pub result: Result<Output, String>,
}

impl TaskOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(output) if output.status.success())
    }
}

/// Tally of a whole fan-out run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
}

/// Runs every task concurrently and writes each one's output as a framed block
/// the moment it finishes.
///
/// All children are started up front. Each block is the task's whole stdout
/// (or stderr), every line prefixed with `"<name>: "`, followed by a blank
/// line, written in one call, so blocks never interleave; their order is the
/// order in which tasks complete. A task that fails to start or exits non-zero
/// only affects its own block. There is no timeout: a child that never exits
/// keeps this future pending.
pub async fn run_tasks<O, E>(
    tasks: Vec<CommandTask>,
    out: &mut O,
    err: &mut E,
) -> Result<RunSummary, ExecutionError>
where
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    let mut join_set = JoinSet::new();
    log::debug!("Dispatching {} task(s).", tasks.len());
    for task in tasks {
        join_set.spawn(run_task(task));
    }

    let mut summary = RunSummary::default();
    while let Some(joined) = join_set.join_next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("A task was aborted before reporting: {}", e);
                summary.failed += 1;
                continue;
            }
        };
        flush_outcome(&outcome, out, err)?;
        if outcome.succeeded() {
            summary.completed += 1;
        } else {
            summary.failed += 1;
        }
    }
    Ok(summary)
}

/// Blocking entry point: runs `tasks` on a fresh single-threaded runtime,
/// writing to the process stdout and stderr.
pub fn exec_tasks(tasks: Vec<CommandTask>) -> Result<RunSummary, ExecutionError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ExecutionError::Runtime)?;

    runtime.block_on(async {
        let stdout = io::stdout();
        let stderr = io::stderr();
        let mut out = stdout.lock();
        let mut err = stderr.lock();
        run_tasks(tasks, &mut out, &mut err).await
    })
}

async fn run_task(task: CommandTask) -> TaskOutcome {
    let CommandTask { name, cwd, argv } = task;
    let Some((program, args)) = argv.split_first() else {
        return TaskOutcome {
            name,
            result: Err("no command specified to run".to_string()),
        };
    };
    let clean_cwd = dunce::simplified(&cwd);
    log::trace!("[{}] {} in '{}'", name, argv.join(" "), clean_cwd.display());

    let result = match build_command(program, args, clean_cwd).output().await {
        Ok(output) => Ok(output),
        // Windows built-ins like `echo` only exist inside cmd.exe.
        Err(e) if e.kind() == ErrorKind::NotFound && cfg!(target_os = "windows") => {
            log::debug!("'{}' not found. Retrying with cmd /C.", program);
            let mut fallback = vec!["/C".to_string()];
            fallback.extend(argv.iter().cloned());
            build_command("cmd", &fallback, clean_cwd).output().await
        }
        Err(e) => Err(e),
    }
    .map_err(|e| format!("could not run '{}': {}", program, e));

    if let Ok(output) = &result
        && !output.status.success()
    {
        log::debug!("[{}] exited with {}", name, output.status);
    }
    TaskOutcome { name, result }
}

fn build_command(program: &str, args: &[String], cwd: &std::path::Path) -> Command {
    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}

fn flush_outcome<O, E>(outcome: &TaskOutcome, out: &mut O, err: &mut E) -> io::Result<()>
where
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    match &outcome.result {
        Ok(output) => {
            if !output.stdout.is_empty() {
                out.write_all(frame_block(&outcome.name, &output.stdout).as_bytes())?;
                out.flush()?;
            }
            if !output.stderr.is_empty() {
                err.write_all(frame_block(&outcome.name, &output.stderr).as_bytes())?;
                err.flush()?;
            }
        }
        Err(reason) => {
            err.write_all(frame_block(&outcome.name, reason.as_bytes()).as_bytes())?;
            err.flush()?;
        }
    }
    Ok(())
}

/// Prefixes every line of `raw` with `"<name>: "` and closes the block with a blank line.
pub fn frame_block(name: &str, raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let mut block = String::with_capacity(text.len() + 16);
    for line in text.lines() {
        block.push_str(name);
        block.push_str(": ");
        block.push_str(line);
        block.push('\n');
    }
    block.push('\n');
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sh(name: &str, cwd: &std::path::Path, script: &str) -> CommandTask {
        CommandTask::new(
            name,
            cwd,
            vec!["sh".to_string(), "-c".to_string(), script.to_string()],
        )
    }

    #[test]
    fn test_frame_block_prefixes_each_line() {
        assert_eq!(frame_block("r", b"a\nb\n"), "r: a\nr: b\n\n");
        assert_eq!(frame_block("r", b"no newline"), "r: no newline\n\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_blocks_follow_completion_order() {
        let dir = tempdir().unwrap();
        let tasks = (0..4)
            .rev()
            .map(|i| sh("myrepo", dir.path(), &format!("echo {i}; sleep 0.{}; echo {i}", i * 3)))
            .collect();

        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = run_tasks(tasks, &mut out, &mut err).await.unwrap();

        assert_eq!(summary, RunSummary { completed: 4, failed: 0 });
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "myrepo: 0\nmyrepo: 0\n\nmyrepo: 1\nmyrepo: 1\n\nmyrepo: 2\nmyrepo: 2\n\nmyrepo: 3\nmyrepo: 3\n\n"
        );
        assert!(err.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_is_framed_separately_and_failure_is_isolated() {
        let dir = tempdir().unwrap();
        let tasks = vec![
            sh("bad", dir.path(), "echo oops >&2; exit 3"),
            sh("good", dir.path(), "sleep 0.2; echo fine"),
        ];

        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = run_tasks(tasks, &mut out, &mut err).await.unwrap();

        assert_eq!(summary, RunSummary { completed: 1, failed: 1 });
        assert_eq!(String::from_utf8(out).unwrap(), "good: fine\n\n");
        assert_eq!(String::from_utf8(err).unwrap(), "bad: oops\n\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_each_task_runs_in_its_own_directory() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let cwd_before = std::env::current_dir().unwrap();
        let tasks = vec![
            sh("one", first.path(), "pwd -P"),
            sh("two", second.path(), "sleep 0.2; pwd -P"),
        ];

        let mut out = Vec::new();
        let mut err = Vec::new();
        run_tasks(tasks, &mut out, &mut err).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let first_real = dunce::canonicalize(first.path()).unwrap();
        let second_real = dunce::canonicalize(second.path()).unwrap();
        assert!(text.contains(&format!("one: {}\n", first_real.display())), "{text}");
        assert!(text.contains(&format!("two: {}\n", second_real.display())), "{text}");
        assert_eq!(std::env::current_dir().unwrap(), cwd_before);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unknown_program_is_reported_on_its_own_block() {
        let dir = tempdir().unwrap();
        let tasks = vec![
            CommandTask::new("ghost", dir.path(), vec!["repodeck-no-such-program".to_string()]),
            CommandTask::new("empty", dir.path(), Vec::new()),
        ];

        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = run_tasks(tasks, &mut out, &mut err).await.unwrap();

        assert_eq!(summary.failed, 2);
        assert!(out.is_empty());
        let err = String::from_utf8(err).unwrap();
        assert!(err.contains("ghost: could not run 'repodeck-no-such-program'"), "{err}");
        assert!(err.contains("empty: no command specified to run"), "{err}");
    }

    #[test]
    fn test_no_tasks_is_a_no_op() {
        assert_eq!(exec_tasks(Vec::new()).unwrap(), RunSummary::default());
    }
}
