//! Line-oriented configuration commands run through an external tool.
//!
//! A [`CommandRunner`] takes a list of commands and returns the full
//! [`Transcript`]. [`Netsh`] feeds them to `netsh.exe` on its standard input;
//! tests use a recording runner instead.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::codepage::{self, CodePage};
use crate::error::{Error, Result};

/// Prompt echoed by the tool for every line it reads.
const PROMPT: &str = "netsh>";

/// Informational line printed when a DNS flush leaves no servers behind.
const NO_DNS_SERVERS: &str = "There are no Domain Name Servers (DNS) configured on this computer.";

/// Build the script fed to the tool: one command per CRLF-terminated line,
/// ending with `exit`.
pub fn script<S: AsRef<str>>(commands: &[S]) -> String {
    let mut out = String::new();
    for cmd in commands {
        out.push_str(cmd.as_ref());
        out.push_str("\r\n");
    }
    out.push_str("exit\r\n");
    out
}

/// What was sent to the tool and what it printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// The script written to standard input.
    pub input: String,
    /// Standard output and standard error, in that order.
    pub output: String,
    /// Exit code, `None` if the process ended without one.
    pub status: Option<i32>,
}

impl Transcript {
    /// Output with prompts, the benign DNS notice and surrounding whitespace removed.
    pub fn residual(&self) -> String {
        self.output
            .replace(PROMPT, "")
            .replace(NO_DNS_SERVERS, "")
            .trim()
            .to_string()
    }

    /// Treat any exit failure or residual output as an error.
    pub fn into_checked(self) -> Result<Self> {
        if self.status != Some(0) {
            return Err(Error::ToolExit {
                status: self.status.unwrap_or(-1),
                input: self.input,
                output: self.output,
            });
        }
        if !self.residual().is_empty() {
            return Err(Error::Tool {
                input: self.input,
                output: self.output,
            });
        }
        Ok(self)
    }

    /// Accept any output, failing only on an unsuccessful exit.
    pub fn into_output(self) -> Result<String> {
        if self.status != Some(0) {
            return Err(Error::ToolExit {
                status: self.status.unwrap_or(-1),
                input: self.input,
                output: self.output,
            });
        }
        Ok(self.output)
    }

    /// Like [`into_output`](Self::into_output), with the prompts removed.
    pub fn into_text(self) -> Result<String> {
        Ok(self.into_output()?.replace(PROMPT, ""))
    }
}

/// Runs a batch of configuration commands.
pub trait CommandRunner {
    /// Run `commands` as one script and return the transcript.
    ///
    /// Blocks until the tool exits; there is no timeout.
    fn run(&self, commands: &[String]) -> Result<Transcript>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, commands: &[String]) -> Result<Transcript> {
        (**self).run(commands)
    }
}

/// The system `netsh.exe`.
#[derive(Debug, Clone)]
pub struct Netsh {
    program: PathBuf,
    input_page: CodePage,
    output_page: CodePage,
}

impl Netsh {
    /// `netsh.exe` from the system directory.
    #[cfg(windows)]
    pub fn system() -> Result<Self> {
        Ok(Self::with_program(system_directory()?.join("netsh.exe")))
    }

    /// Use a specific executable (it must accept a script on standard input).
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            input_page: CodePage::ConsoleInput,
            output_page: CodePage::ConsoleOutput,
        }
    }

    /// Override the code pages used for the script and the output.
    pub fn code_pages(mut self, input: CodePage, output: CodePage) -> Self {
        self.input_page = input;
        self.output_page = output;
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl CommandRunner for Netsh {
    fn run(&self, commands: &[String]) -> Result<Transcript> {
        let input = script(commands);
        let encoded = codepage::encode(&input, self.input_page)?;

        let mut command = Command::new(&self.program);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        hide_window(&mut command);

        tracing::debug!(program = %self.program.display(), lines = commands.len(), "running script");
        let mut child = command.spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("child stdin unavailable")))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("child stdout unavailable")))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Io(std::io::Error::other("child stderr unavailable")))?;

        // Write the script on its own thread while the pipes are drained here;
        // doing both from one thread deadlocks once a pipe buffer fills.
        let (written, out, err) = std::thread::scope(|s| {
            let writer = s.spawn(move || {
                stdin.write_all(&encoded)?;
                stdin.flush()
                // stdin dropped here, closing the pipe
            });
            let errors = s.spawn(move || {
                let mut buf = Vec::new();
                stderr.read_to_end(&mut buf).map(|_| buf)
            });

            let mut out = Vec::new();
            let read = stdout.read_to_end(&mut out).map(|_| out);

            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("script writer panicked")));
            let err = errors
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stderr reader panicked")));
            (written, read, err)
        });

        let status = child.wait()?;
        let mut output = codepage::decode(&out?, self.output_page);
        output.push_str(&codepage::decode(&err?, self.output_page));
        // A tool that exits early closes its stdin; the exit status is the
        // better diagnosis then.
        if let Err(e) = written {
            if status.success() {
                return Err(e.into());
            }
            tracing::debug!(error = %e, "script write failed before tool exit");
        }

        Ok(Transcript {
            input,
            output,
            status: status.code(),
        })
    }
}

#[cfg(windows)]
fn hide_window(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    use windows_sys::Win32::System::Threading::CREATE_NO_WINDOW;

    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_window(_command: &mut Command) {}

#[cfg(windows)]
fn system_directory() -> Result<PathBuf> {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use windows_sys::Win32::Foundation::{GetLastError, MAX_PATH};
    use windows_sys::Win32::System::SystemInformation::GetSystemDirectoryW;

    let mut buf = vec![0u16; MAX_PATH as usize];
    loop {
        // SAFETY: `buf` is valid for `buf.len()` units
        let len = unsafe { GetSystemDirectoryW(buf.as_mut_ptr(), buf.len() as u32) } as usize;
        if len == 0 {
            // SAFETY: reads the calling thread's last error
            return Err(Error::from_status_with_context(
                unsafe { GetLastError() },
                "GetSystemDirectoryW",
            ));
        }
        if len < buf.len() {
            buf.truncate(len);
            return Ok(PathBuf::from(OsString::from_wide(&buf)));
        }
        // Too small: `len` is the required size including the terminator
        buf.resize(len, 0);
    }
}
