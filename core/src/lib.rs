//! Port Chaser Core Library
//!
//! Cross-platform library for finding which process holds a local port and
//! stopping it. Provides functionality to:
//! - Scan listening TCP ports quickly, then enrich them in the background
//! - Terminate a process gracefully, escalating to a forced kill
//! - Protect system processes from accidental termination
//! - Manage user configuration
//!
//! # Layout
//! - `domain`: Pure data models
//! - `process`: Platform signal delivery behind a trait
//! - `killer`: Termination engine
//! - `scanner`: Port discovery (quick scan, enrichment, cache)
//!
//! # Platform Support
//! - macOS: Uses `lsof`
//! - Linux: Uses `lsof`, then `ss`
//! - Anywhere else: TCP probes over a catalog of common ports

pub mod config;
pub mod domain;
pub mod error;
pub mod killer;
pub mod process;
pub mod scanner;

// Re-export commonly used types
pub use config::{ConfigStore, Settings};
pub use domain::{sort_by_common_port, ContainerInfo, KillMethod, KillResult, PortEntry};
pub use error::{Error, Result, ScanError, SignalError, TerminateError};
pub use killer::{TerminationEngine, TerminationSettings};
pub use scanner::{DiscoverySettings, PortDiscovery};
