//! Config command - show current configuration.

use anyhow::Result;
use portchaser_core::ConfigStore;

pub async fn show(json: bool) -> Result<()> {
    let store = ConfigStore::new()?;
    let settings = store.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    println!("Config file: {}", store.path().display());
    println!();
    println!("Termination:");
    println!("  Grace period:       {}ms", settings.grace_period_ms);
    println!(
        "  System protection:  {}",
        if settings.system_protection { "on" } else { "off" }
    );
    println!("  Low PID threshold:  {}", settings.low_pid_threshold);
    println!();
    println!("Discovery:");
    println!("  Rescan interval:    {}ms", settings.rescan_interval_ms);
    println!("  Probe timeout:      {}ms", settings.probe_timeout_ms);
    println!("  Fallback deadline:  {}ms", settings.fallback_deadline_ms);
    println!("  Cache TTL:          {}s", settings.cache_ttl_secs);
    println!(
        "  Docker lookup:      {}",
        if settings.docker_lookup { "on" } else { "off" }
    );

    Ok(())
}
