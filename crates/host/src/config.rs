//! Configuration

use serde::{Deserialize, Serialize};
use std::env;

/// Default number of merges run at once on one tree level
pub const DEFAULT_FOLD_PARALLELISM: usize = 4;

/// Proof backend mode
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProverMode {
    /// Proofs carry a keyed attestation over statement and witness
    #[default]
    Attested,
    /// Proofs are empty and always verify
    Disabled,
}

impl ProverMode {
    /// Check if proving is turned off
    pub const fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl From<&str> for ProverMode {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "disabled" | "off" | "false" | "0" => Self::Disabled,
            _ => Self::Attested,
        }
    }
}

/// Proof backend configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Backend mode
    pub mode: ProverMode,
    /// Seed of the attestation key, hex or free-form
    pub key_seed: Option<String>,
}

impl ProverConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self {
            mode: env::var("PROVER_MODE")
                .map(|s| ProverMode::from(s.as_str()))
                .unwrap_or_default(),
            key_seed: env::var("PROVER_KEY_SEED").ok(),
        }
    }
}

/// Host configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Proof backend
    pub prover: ProverConfig,
    /// Max merges in flight per tree level when folding in parallel
    pub fold_parallelism: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prover: ProverConfig::default(),
            fold_parallelism: DEFAULT_FOLD_PARALLELISM,
        }
    }
}

impl Config {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self {
            prover: ProverConfig::from_env(),
            fold_parallelism: env::var("FOLD_PARALLELISM")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_FOLD_PARALLELISM),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prover_mode_parsing() {
        assert_eq!(ProverMode::from("disabled"), ProverMode::Disabled);
        assert_eq!(ProverMode::from(" OFF "), ProverMode::Disabled);
        assert_eq!(ProverMode::from("attested"), ProverMode::Attested);
        assert_eq!(ProverMode::from("anything"), ProverMode::Attested);
        assert!(!ProverMode::default().is_disabled());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fold_parallelism, DEFAULT_FOLD_PARALLELISM);
        assert_eq!(config.prover.mode, ProverMode::Attested);
        assert!(config.prover.key_seed.is_none());
    }
}
