//! Per-installation passphrase material.

use std::fmt;

/// Passphrase the vault key is derived from.
///
/// Stable for a given user on a given machine, so credentials written by
/// one run decrypt in the next.
#[derive(Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint of the current user and machine.
    pub fn local() -> Self {
        let user = env_first(&["USER", "USERNAME"]).unwrap_or_else(|| "unknown".to_string());
        let home = dirs::home_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let host = env_first(&["HOSTNAME", "COMPUTERNAME"])
            .or_else(read_hostname_file)
            .unwrap_or_else(|| "localhost".to_string());
        Self(format!("deskpilot|{}|{}|{}", user, home, host))
    }

    /// Use an explicit passphrase instead of the machine fingerprint.
    pub fn with_passphrase(passphrase: impl Into<String>) -> Self {
        Self(passphrase.into())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fingerprint(..)")
    }
}

fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn read_hostname_file() -> Option<String> {
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
