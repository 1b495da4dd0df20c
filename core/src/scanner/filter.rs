//! Noise filter for privileged ports owned by background services.

use crate::domain::PortEntry;

/// Ports kept regardless of their owner.
const DEVELOPER_PORTS: [u16; 11] = [80, 443, 3000, 5000, 8000, 8080, 4200, 5432, 6379, 27017, 9090];

/// Lowercase fragments of OS daemon and desktop helper names.
const BACKGROUND_PROCESS_FRAGMENTS: &[&str] = &[
    "controlce",
    "rapportd",
    "sharingd",
    "airplayxpc",
    "remoted",
    "mdnsrespo",
    "launchd",
    "kernel_task",
    "systemuise",
    "coreaudiod",
    "windowserver",
    "loginwindow",
    "cfprefsd",
    "distnoted",
    "usernoted",
    "syslogd",
    "configd",
    "identityservicesd",
    "apsd",
    "cloudd",
    "bird",
    "nsurlsessiond",
    "trustd",
    "locationd",
    "bluetoothd",
    "wifid",
    "airportd",
    "cupsd",
    "sshd",
    "systemd",
    "avahi-daemon",
    "chronyd",
    "dnsmasq",
];

/// Accounts that own OS services.
const SYSTEM_USERS: &[&str] = &[
    "root",
    "daemon",
    "_spotlight",
    "nobody",
    "_mDNSResponder",
    "sys",
    "bin",
    "_uucp",
    "_lp",
    "_softwareupdate",
];

/// Whether an entry is background noise that a listing should hide.
///
/// Developer ports and every port at or above 1024 are always kept. A
/// privileged port is dropped only when its owner looks like an OS service.
pub fn is_noise(entry: &PortEntry) -> bool {
    if DEVELOPER_PORTS.contains(&entry.port) || entry.port >= 1024 {
        return false;
    }

    let name = entry.process_name.to_lowercase();
    BACKGROUND_PROCESS_FRAGMENTS
        .iter()
        .any(|fragment| name.contains(fragment))
        || SYSTEM_USERS.contains(&entry.user.as_str())
        || entry.user.starts_with(|c: char| c.is_ascii_digit())
}
