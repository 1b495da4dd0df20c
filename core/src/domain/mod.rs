//! Domain layer - Pure data models.
//!
//! These types have no I/O dependencies and can be tested in isolation.

mod kill;
mod port;

// Re-export all domain types
pub use kill::{KillMethod, KillResult};
pub use port::{sort_by_common_port, ContainerInfo, PortEntry};
