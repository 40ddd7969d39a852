// src/types.rs

use std::fmt;
use std::process::ExitStatus;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::SupervisorError;

/// Exit code reported by the supervisor when it was interrupted.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Exit code when the child executable does not exist.
pub const NOT_FOUND_EXIT_CODE: i32 = 127;

/// Exit code when the child executable exists but could not be started.
pub const CANNOT_EXECUTE_EXIT_CODE: i32 = 126;

/// Death-by-signal is reported as `SIGNAL_EXIT_BASE + signo`.
pub const SIGNAL_EXIT_BASE: i32 = 128;

/// Signal sent to the child when the grace period runs out or the
/// supervisor is interrupted.
///
/// Accepted spellings are case-insensitive, with or without the `SIG`
/// prefix (`"ABRT"`, `"sigabrt"`, `"SIGKILL"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum AbortSignal {
    Abrt,
    Kill,
    Term,
    Int,
    Quit,
    Hup,
}

impl AbortSignal {
    pub const ALL: [AbortSignal; 6] = [
        AbortSignal::Abrt,
        AbortSignal::Kill,
        AbortSignal::Term,
        AbortSignal::Int,
        AbortSignal::Quit,
        AbortSignal::Hup,
    ];

    /// The matching `nix` signal, used both for delivery and for the
    /// signal's number and name.
    #[cfg(unix)]
    pub fn as_nix(self) -> nix::sys::signal::Signal {
        use nix::sys::signal::Signal;

        match self {
            AbortSignal::Abrt => Signal::SIGABRT,
            AbortSignal::Kill => Signal::SIGKILL,
            AbortSignal::Term => Signal::SIGTERM,
            AbortSignal::Int => Signal::SIGINT,
            AbortSignal::Quit => Signal::SIGQUIT,
            AbortSignal::Hup => Signal::SIGHUP,
        }
    }

    #[cfg(unix)]
    pub fn number(self) -> i32 {
        self.as_nix() as i32
    }

    #[cfg(unix)]
    pub fn name(self) -> &'static str {
        self.as_nix().as_str()
    }

    /// POSIX numbering, for platforms without `nix`.
    #[cfg(not(unix))]
    pub fn number(self) -> i32 {
        match self {
            AbortSignal::Hup => 1,
            AbortSignal::Int => 2,
            AbortSignal::Quit => 3,
            AbortSignal::Abrt => 6,
            AbortSignal::Kill => 9,
            AbortSignal::Term => 15,
        }
    }

    #[cfg(not(unix))]
    pub fn name(self) -> &'static str {
        match self {
            AbortSignal::Abrt => "SIGABRT",
            AbortSignal::Kill => "SIGKILL",
            AbortSignal::Term => "SIGTERM",
            AbortSignal::Int => "SIGINT",
            AbortSignal::Quit => "SIGQUIT",
            AbortSignal::Hup => "SIGHUP",
        }
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        AbortSignal::Abrt
    }
}

impl fmt::Display for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AbortSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let bare = upper.strip_prefix("SIG").unwrap_or(upper.as_str());
        match bare {
            "ABRT" => Ok(AbortSignal::Abrt),
            "KILL" => Ok(AbortSignal::Kill),
            "TERM" => Ok(AbortSignal::Term),
            "INT" => Ok(AbortSignal::Int),
            "QUIT" => Ok(AbortSignal::Quit),
            "HUP" => Ok(AbortSignal::Hup),
            _ => Err(format!(
                "invalid abort signal: {s} (expected one of ABRT, KILL, TERM, INT, QUIT, HUP)"
            )),
        }
    }
}

impl TryFrom<String> for AbortSignal {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The child's command line: an executable followed by its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl TryFrom<Vec<String>> for CommandLine {
    type Error = SupervisorError;

    fn try_from(mut argv: Vec<String>) -> Result<Self, Self::Error> {
        if argv.is_empty() {
            return Err(SupervisorError::ConfigError(
                "command line must name an executable".to_string(),
            ));
        }
        let program = argv.remove(0);
        if program.trim().is_empty() {
            return Err(SupervisorError::ConfigError(
                "executable name must not be empty".to_string(),
            ));
        }
        Ok(CommandLine {
            program,
            args: argv,
        })
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Platform-neutral view of how a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildStatus {
    /// Exit code, if the child exited on its own.
    pub code: Option<i32>,
    /// Terminating signal number, if the child was killed by a signal.
    pub signal: Option<i32>,
}

impl ChildStatus {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn signaled(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code the supervisor should report for this status.
    ///
    /// Signal deaths map to `128 + signo`, as a shell would report them.
    pub fn exit_code(&self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => SIGNAL_EXIT_BASE + signal,
            (None, None) => 1,
        }
    }
}

impl fmt::Display for ChildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(signal)) => write!(f, "killed by signal {signal}"),
            (None, None) => f.write_str("unknown status"),
        }
    }
}

impl From<ExitStatus> for ChildStatus {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            Self {
                code: status.code(),
                signal: status.signal(),
            }
        }

        #[cfg(not(unix))]
        {
            Self {
                code: status.code(),
                signal: None,
            }
        }
    }
}
