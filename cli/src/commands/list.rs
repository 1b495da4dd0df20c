//! List command - show all listening ports.

use anyhow::Result;
use portchaser_core::{sort_by_common_port, ConfigStore, PortDiscovery, PortEntry};

pub async fn run(
    port_filter: Option<u16>,
    name_filter: Option<String>,
    refine: bool,
    json: bool,
) -> Result<()> {
    let settings = ConfigStore::new()?.load().await?;
    let discovery = PortDiscovery::new(settings.discovery());

    let mut ports = discovery.scan().await?;
    if refine {
        discovery.wait_idle().await;
        ports = discovery.scan().await?;
    }
    discovery.shutdown().await;

    // Apply filters
    if let Some(p) = port_filter {
        ports.retain(|port| port.port == p);
    }
    if let Some(ref name) = name_filter {
        let name_lower = name.to_lowercase();
        ports.retain(|port| port.process_name.to_lowercase().contains(&name_lower));
    }
    sort_by_common_port(&mut ports);

    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    if ports.is_empty() {
        println!("No listening ports found.");
        return Ok(());
    }

    // Table header
    println!(
        "{:<6} {:<8} {:<20} {:<12} {:<8} COMMAND",
        "PORT", "PID", "PROCESS", "USER", "TYPE"
    );
    println!("{}", "-".repeat(80));

    for port in &ports {
        let command = truncate(&port.command, 30);
        let process_name = truncate(&port.process_name, 20);
        let user = truncate(&port.user, 12);

        println!(
            "{:<6} {:<8} {:<20} {:<12} {:<8} {}",
            port.port,
            port.pid,
            process_name,
            user,
            type_label(port),
            command
        );
    }

    println!("\nTotal: {} ports", ports.len());
    Ok(())
}

fn type_label(port: &PortEntry) -> String {
    match (&port.container, port.is_docker, port.is_system) {
        (Some(container), _, _) => truncate(&container.name, 8),
        (None, true, _) => "Docker".to_string(),
        (None, false, true) => "Sys".to_string(),
        _ => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}
