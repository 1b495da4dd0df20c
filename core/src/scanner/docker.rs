//! Container identity lookup through the docker CLI.

use std::collections::HashMap;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::domain::ContainerInfo;
use crate::error::ScanError;

const PS_FORMAT: &str = "{{.ID}}\t{{.Names}}\t{{.Image}}\t{{.Ports}}";

/// Maps published host ports to the running containers behind them.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerCli {
    pub fn new() -> Self {
        Self::with_program("docker")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Published host ports of all running containers.
    pub async fn published_ports(&self) -> Result<HashMap<u16, ContainerInfo>, ScanError> {
        let output = Command::new(&self.program)
            .args(["ps", "--format", PS_FORMAT])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ScanError::ToolUnavailable(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScanError::CommandFailed(format!(
                "{} ps failed: {}",
                self.program,
                stderr.trim()
            )));
        }

        let ports = parse_docker_ps(&String::from_utf8_lossy(&output.stdout));
        debug!(count = ports.len(), "Resolved published container ports");
        Ok(ports)
    }
}

/// Parse `docker ps --format` output in [`PS_FORMAT`] layout.
///
/// The ports column looks like
/// `0.0.0.0:8080->80/tcp, :::8080->80/tcp, 0.0.0.0:9000-9001->9000-9001/tcp`.
/// Unpublished ports (`6379/tcp`) are ignored.
pub fn parse_docker_ps(output: &str) -> HashMap<u16, ContainerInfo> {
    let mut ports = HashMap::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            continue;
        }

        let info = ContainerInfo {
            id: fields[0].to_string(),
            name: fields[1].to_string(),
            image: fields[2].to_string(),
        };

        for mapping in fields[3].split(',') {
            let Some((host, _)) = mapping.trim().split_once("->") else {
                continue;
            };
            let Some((_, host_ports)) = host.rsplit_once(':') else {
                continue;
            };
            let range = match host_ports.split_once('-') {
                Some((start, end)) => start.parse::<u16>().ok().zip(end.parse::<u16>().ok()),
                None => host_ports.parse::<u16>().ok().map(|p| (p, p)),
            };
            let Some((start, end)) = range else {
                continue;
            };
            for port in start..=end {
                ports.entry(port).or_insert_with(|| info.clone());
            }
        }
    }

    ports
}
