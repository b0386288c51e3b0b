//! Session admission configuration.

use serde::{Deserialize, Serialize};

/// Session admission and revocation housekeeping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Concurrent session capacity given to newly registered accounts.
    #[serde(default = "default_max_sessions")]
    pub default_max_sessions: i32,
    /// Interval between sweeps of lapsed revocation entries, in seconds.
    #[serde(default = "default_sweep_interval")]
    pub revocation_sweep_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_max_sessions: default_max_sessions(),
            revocation_sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_max_sessions() -> i32 {
    1
}

fn default_sweep_interval() -> u64 {
    60
}
