//! External process capability used by the primary generator.
//!
//! [`ProcessRunner`] is the narrow seam between the workflow and the OS:
//! run a program with arguments, feed it standard input, collect both output
//! streams and the exit status. [`TokioProcessRunner`] is the real
//! implementation; tests substitute their own.
//!
//! The program is executed directly (no shell), so nothing in the arguments
//! or the input is ever interpreted as shell syntax.

use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Everything observed from one finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an external program to completion.
///
/// An `Err` means the program could not be started or its pipes failed; a
/// program that ran and exited non-zero is an `Ok` with that status.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String], stdin: &[u8]) -> io::Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `tokio::process`.
///
/// No timeout is applied: a hung child keeps the calling task suspended.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, program: &str, args: &[String], stdin: &[u8]) -> io::Result<ProcessOutput> {
        debug!("Spawning '{}' with {} args, {} bytes on stdin", program, args.len(), stdin.len());

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut child_stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "child stdin unavailable"))?;

        // Write and drain concurrently; a large input would otherwise block
        // on a full stdout pipe.
        let write = async move {
            child_stdin.write_all(stdin).await?;
            child_stdin.shutdown().await?;
            drop(child_stdin);
            Ok::<_, io::Error>(())
        };
        let (write_result, output) = futures::join!(write, child.wait_with_output());
        let output = output?;

        // A child that exits without reading its input closes the pipe early;
        // its exit status is the meaningful signal then.
        if let Err(e) = write_result {
            if e.kind() != io::ErrorKind::BrokenPipe {
                return Err(e);
            }
            debug!("'{}' closed stdin before reading all input", program);
        }

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
