//! Subprocess runner
//!
//! Streams a child's stdout and stderr to this process's stderr line by
//! line while capturing both, so build output stays visible in CI logs and
//! can still be scanned for retry signatures afterwards.

use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::core::ports::{CommandOutput, CommandRunner};

/// Runs programs as real subprocesses
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    fn tee<R: Read + Send + 'static>(reader: R, captured: Arc<Mutex<String>>) -> JoinHandle<()> {
        thread::spawn(move || {
            let mut reader = BufReader::new(reader);
            let mut line = Vec::new();
            while matches!(reader.read_until(b'\n', &mut line), Ok(n) if n > 0) {
                let text = String::from_utf8_lossy(&line);
                eprint!("{text}");
                if let Ok(mut buffer) = captured.lock() {
                    buffer.push_str(&text);
                }
                line.clear();
            }
        })
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[String]) -> io::Result<CommandOutput> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let captured = Arc::new(Mutex::new(String::new()));
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(Self::tee(stdout, Arc::clone(&captured)));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(Self::tee(stderr, Arc::clone(&captured)));
        }

        let status = child.wait()?;
        for reader in readers {
            // A panicked reader only loses captured text, not the exit status
            let _ = reader.join();
        }

        let output = captured.lock().map(|s| s.clone()).unwrap_or_default();
        Ok(CommandOutput {
            success: status.success(),
            code: status.code(),
            output,
        })
    }
}
