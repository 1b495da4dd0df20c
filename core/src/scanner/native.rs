//! Native listening-socket utilities and their output parsers.
//!
//! - `lsof -iTCP -sTCP:LISTEN -P -n` (macOS and Linux)
//! - `ss -Htlnp` (Linux, used when lsof is missing)

use std::collections::HashSet;
use std::process::Stdio;
use std::sync::LazyLock;

use regex::Regex;
use tokio::process::Command;
use tracing::debug;

use crate::domain::PortEntry;
use crate::error::ScanError;

use super::utils::{decode_escaped, parse_address};

/// Columns in an lsof line up to and including NAME.
const LSOF_MIN_FIELDS: usize = 9;

/// State, Recv-Q, Send-Q, Local, Peer. The process column is optional.
const SS_MIN_FIELDS: usize = 5;

static SS_USERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"users:\(\("(.+?)",pid=(\d+),fd=(\d+)\)"#).expect("valid ss users pattern")
});

/// Output layout produced by a listing utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Lsof,
    Ss,
}

/// A listing utility invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCommand {
    pub program: String,
    pub args: Vec<String>,
    pub format: OutputFormat,
}

impl NativeCommand {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        format: OutputFormat,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            format,
        }
    }

    /// `lsof -iTCP -sTCP:LISTEN -P -n`
    ///
    /// Flags:
    /// - -iTCP -sTCP:LISTEN: listening TCP sockets only
    /// - -P: numeric ports
    /// - -n: numeric addresses
    pub fn lsof() -> Self {
        Self::new("lsof", ["-iTCP", "-sTCP:LISTEN", "-P", "-n"], OutputFormat::Lsof)
    }

    /// `ss -Htlnp`
    ///
    /// Flags:
    /// -H no header, -t TCP, -l listening, -n numeric, -p owning process
    pub fn ss() -> Self {
        Self::new("ss", ["-Htlnp"], OutputFormat::Ss)
    }

    /// The utilities tried on this platform, in order.
    pub fn platform_defaults() -> Vec<Self> {
        let mut commands = vec![Self::lsof()];
        if cfg!(target_os = "linux") {
            commands.push(Self::ss());
        }
        commands
    }

    /// Run the utility and parse its output.
    pub async fn run(&self) -> Result<Vec<PortEntry>, ScanError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ScanError::ToolUnavailable(format!("{}: {}", self.program, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        // lsof exits non-zero when some sockets could not be inspected but
        // still prints the ones it could.
        if !output.status.success() && stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScanError::CommandFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let entries = match self.format {
            OutputFormat::Lsof => parse_lsof_output(&stdout),
            OutputFormat::Ss => parse_ss_output(&stdout),
        };

        // Data lines that yield nothing mean an unfamiliar output layout.
        let data_lines = count_data_lines(&stdout);
        if entries.is_empty() && data_lines > 0 {
            return Err(ScanError::ParseError(format!(
                "{}: none of {} lines could be parsed",
                self.program, data_lines
            )));
        }

        debug!(program = %self.program, count = entries.len(), "Parsed native listing");
        Ok(entries)
    }
}

fn count_data_lines(output: &str) -> usize {
    output
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.starts_with("COMMAND") && !line.starts_with("State")
        })
        .count()
}

/// Parse lsof output.
///
/// Expected format:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
/// ```
pub fn parse_lsof_output(output: &str) -> Vec<PortEntry> {
    let mut entries = Vec::new();
    let mut seen: HashSet<u16> = HashSet::new();

    for line in output.lines() {
        if line.starts_with("COMMAND") {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < LSOF_MIN_FIELDS {
            continue;
        }

        let Some((_, port)) = parse_address(fields[8]) else {
            continue;
        };
        let Ok(pid) = fields[1].parse::<u32>() else {
            continue;
        };

        // First socket wins when a process listens on several addresses.
        if !seen.insert(port) {
            continue;
        }

        entries.push(PortEntry::listening(
            port,
            pid,
            decode_escaped(fields[0]),
            fields[2],
        ));
    }

    entries.sort_by_key(|e| e.port);
    entries
}

/// Parse `ss -Htlnp` output.
///
/// Expected format:
/// ```text
/// LISTEN 0 4096 [::ffff:127.0.0.1]:63342 *:* users:(("rustrover",pid=53561,fd=54))
/// ```
///
/// Sockets owned by other users have no process column; they are reported
/// with an unknown owner.
pub fn parse_ss_output(output: &str) -> Vec<PortEntry> {
    let mut entries = Vec::new();
    let mut seen: HashSet<u16> = HashSet::new();

    for line in output.lines() {
        if line.starts_with("State") {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < SS_MIN_FIELDS {
            continue;
        }

        let Some((_, port)) = parse_address(fields[3]) else {
            continue;
        };

        let process_column = fields[SS_MIN_FIELDS..].join(" ");
        let entry = match SS_USERS.captures(&process_column) {
            Some(caps) => {
                let Ok(pid) = caps[2].parse::<u32>() else {
                    continue;
                };
                PortEntry::listening(port, pid, &caps[1], "")
            }
            None => PortEntry::unattributed(port),
        };

        if !seen.insert(port) {
            continue;
        }
        entries.push(entry);
    }

    entries.sort_by_key(|e| e.port);
    entries
}
