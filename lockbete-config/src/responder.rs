//! Decoy reply configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Controls whether and how often decoy replies are sent.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ResponderConfig {
    /// Send decoy replies at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Only requests strictly longer than this get a reply.
    #[validate(range(max = 65535))]
    #[serde(default = "default_min_request_len")]
    pub min_request_len: usize,

    /// Upper bound on replies in flight at once. Requests arriving while the
    /// bound is reached are still logged but not answered.
    #[validate(range(min = 1, max = 65536))]
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_min_request_len() -> usize {
    10
}

fn default_max_in_flight() -> usize {
    1024
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            min_request_len: default_min_request_len(),
            max_in_flight: default_max_in_flight(),
        }
    }
}
