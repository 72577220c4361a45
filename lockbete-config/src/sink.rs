//! Evidence log configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Where evidence records are appended.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct SinkConfig {
    /// JSON lines file, one record per datagram.
    #[validate(custom(function = validation::validate_log_path))]
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Create the parent directory on startup.
    #[serde(default = "default_true")]
    pub create_dirs: bool,
}

fn default_path() -> PathBuf {
    PathBuf::from("/var/log/snmp/snmp-honeypot.json")
}

fn default_true() -> bool {
    true
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            create_dirs: default_true(),
        }
    }
}
