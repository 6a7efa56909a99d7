// Tunable engine parameters.
//
// `NetworkConfig` is loaded from JSON (or defaulted) once at startup and
// copied into each manager at registration time. Every field has a default,
// so a config file only needs to name what it changes.
//
// See also: `registry.rs` (`NetworkRegistry::with_config`), `main.rs` which
// reads the file for the `replay` binary.

use serde::{Deserialize, Serialize};

/// Engine configuration shared by every manager in a registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// A single flush that visits more nodes than this logs a warning. Large
    /// flushes usually mean a long pipe run was cut or joined every tick.
    pub large_flush_warn_threshold: usize,
    /// Default `tracing` filter for binaries, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            large_flush_warn_threshold: 4096,
            log_filter: "info".to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
