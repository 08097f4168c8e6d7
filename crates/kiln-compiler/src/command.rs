use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Captured output from a command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Both streams as one text for diagnostic parsing.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) if self.stdout.ends_with('\n') => format!("{}{}", self.stdout, self.stderr),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Runs an external compiler executable.
///
/// The javac adapter goes through this seam so tests can script compiler
/// output without a JDK on the machine.
pub trait CommandRunner: Send + Sync + std::fmt::Debug {
    fn run(&self, cwd: &Path, program: &Path, args: &[String]) -> io::Result<CommandOutput>;
}

/// Spawns the real process and captures both streams.
#[derive(Debug, Clone, Default)]
pub struct DefaultCommandRunner {
    /// Kills the compiler once exceeded. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl DefaultCommandRunner {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    fn wait(&self, child: &mut Child, command: &str) -> io::Result<ExitStatus> {
        let Some(timeout) = self.timeout else {
            return child.wait();
        };
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            thread::sleep(POLL_INTERVAL);
        }
        Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("`{command}` did not finish within {timeout:?}"),
        ))
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Reads a pipe to completion on its own thread.
fn drain(pipe: Option<impl Read + Send + 'static>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

impl CommandRunner for DefaultCommandRunner {
    fn run(&self, cwd: &Path, program: &Path, args: &[String]) -> io::Result<CommandOutput> {
        let command = format_command(program, args);
        tracing::debug!(target: "kiln.compiler", cwd = %cwd.display(), %command, "spawning compiler");

        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| io::Error::new(err.kind(), format!("failed to spawn `{command}`: {err}")))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.wait(&mut child, &command) {
            Ok(status) => status,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err);
            }
        };

        Ok(CommandOutput {
            exit_code: status.code(),
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        })
    }
}

/// `program arg1 arg2 ...`, for error messages and logs.
pub(crate) fn format_command(program: &Path, args: &[String]) -> String {
    std::iter::once(program.to_string_lossy().into_owned())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}
