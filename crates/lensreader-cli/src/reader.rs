//! Tag reader input: a spawned reader process or stdin.

use std::io::{BufRead, Read};
use std::path::Path;
use std::process::Stdio;
use std::thread;

use anyhow::{Context, Result};
use lensreader_core::constants::MAX_LINE_LENGTH;
use lensreader_core::{TagId, normalize};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Spawn the reader command through the shell with its stdout piped.
pub fn spawn(command: &str, dir: Option<&Path>) -> Result<(Child, ChildStdout)> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("failed to start reader command {command:?}"))?;
    let stdout = child
        .stdout
        .take()
        .context("reader command has no stdout")?;

    info!(command, pid = child.id(), "Reader process started");
    Ok((child, stdout))
}

/// Stop the reader process, reporting how it ended.
pub async fn stop(child: &mut Child) {
    match child.try_wait() {
        Ok(Some(status)) if status.success() => info!(%status, "Reader process exited"),
        Ok(Some(status)) => warn!(%status, "Reader process failed"),
        Ok(None) => {
            debug!("Stopping reader process");
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to stop reader process");
            }
        }
        Err(e) => warn!(error = %e, "Failed to query reader process"),
    }
}

/// Read tags from stdin on a dedicated thread.
///
/// A blocking stdin read would hold the runtime open at shutdown; a detached
/// thread does not.
pub fn stdin_tags() -> mpsc::Receiver<TagId> {
    let (tx, rx) = mpsc::channel(64);

    thread::spawn(move || {
        let stdin = std::io::stdin();
        forward_tags(stdin.lock(), &tx);
    });

    rx
}

/// Send every tag line of `input` until it ends or the receiver is gone.
///
/// Lines longer than `MAX_LINE_LENGTH` are dropped whole without being
/// buffered.
fn forward_tags<R: BufRead>(mut input: R, tx: &mpsc::Sender<TagId>) {
    let mut line = Vec::with_capacity(MAX_LINE_LENGTH + 1);

    loop {
        line.clear();
        let limit = MAX_LINE_LENGTH as u64 + 1;
        match input.by_ref().take(limit).read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                break;
            }
        }

        if line.last() != Some(&b'\n') && line.len() > MAX_LINE_LENGTH {
            warn!(max = MAX_LINE_LENGTH, "Discarding over-long input line");
            if let Err(e) = skip_line(&mut input) {
                warn!(error = %e, "Failed to read stdin");
                break;
            }
            continue;
        }

        if let Ok(id) = normalize(&String::from_utf8_lossy(&line))
            && tx.blocking_send(id).is_err()
        {
            break;
        }
    }
}

/// Consume input up to and including the next newline.
fn skip_line<R: BufRead>(input: &mut R) -> std::io::Result<()> {
    loop {
        let buf = input.fill_buf()?;
        if buf.is_empty() {
            return Ok(());
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(end) => {
                input.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = buf.len();
                input.consume(len);
            }
        }
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use lensreader_session::{TagLineReader, TagSource};

    #[tokio::test]
    async fn test_spawned_reader_output() {
        let (mut child, stdout) =
            spawn("echo starting; echo 04:AA:BB:CC; echo 04:AA:BB:CC", None).unwrap();
        let mut source = TagLineReader::new(stdout);

        let mut ids = Vec::new();
        while let Some(id) = source.next_tag().await {
            ids.push(id.to_string());
        }
        stop(&mut child).await;

        assert_eq!(ids, vec!["aabbcc", "aabbcc"]);
        assert_eq!(source.ignored_lines(), 1);
    }

    #[tokio::test]
    async fn test_working_directory() {
        let dir = std::env::temp_dir();
        let (mut child, stdout) = spawn("pwd", Some(&dir)).unwrap();
        let mut source = TagLineReader::new(stdout);

        assert!(source.next_tag().await.is_none());
        child.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_running_process() {
        let (mut child, _stdout) = spawn("sleep 30", None).unwrap();
        stop(&mut child).await;
        assert!(child.try_wait().unwrap().is_some());
    }
}
