//! Runtime settings read from the environment (a `.env` file is loaded first).

use std::env;

use crate::blockchain::{DEFAULT_NONCE_LEN, DEFAULT_TRIAL_BUDGET, DEFAULT_ZERO_BITS, ProofOfWork};
use crate::error::ConfigError;

/// Settings shared by every node of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSettings {
    pub pow: ProofOfWork,
    /// Nonce trials per mining attempt before the attempt is abandoned.
    pub trial_budget: u64,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            pow: ProofOfWork::default(),
            trial_budget: DEFAULT_TRIAL_BUDGET,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub node_names: Vec<String>,
    pub node: NodeSettings,
    /// Seeds every node's RNG when set, for reproducible runs.
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse(&lookup, "PORT", 8080u16, "a port number")?;

        let node_names: Vec<String> = lookup("NODES")
            .unwrap_or_else(|| "Alice,Bob,Carol".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if node_names.is_empty() {
            return Err(invalid("NODES", "a comma separated list of names", ""));
        }

        let zero_bits = parse(&lookup, "POW_ZERO_BITS", DEFAULT_ZERO_BITS, "between 1 and 256")?;
        if !(1..=256).contains(&zero_bits) {
            return Err(invalid("POW_ZERO_BITS", "between 1 and 256", &zero_bits.to_string()));
        }
        let nonce_len = parse(&lookup, "NONCE_LEN", DEFAULT_NONCE_LEN, "a positive length")?;
        if nonce_len == 0 {
            return Err(invalid("NONCE_LEN", "a positive length", "0"));
        }
        let trial_budget = parse(&lookup, "MINING_TRIAL_BUDGET", DEFAULT_TRIAL_BUDGET, "a positive count")?;
        if trial_budget == 0 {
            return Err(invalid("MINING_TRIAL_BUDGET", "a positive count", "0"));
        }

        let seed = match lookup("SIM_SEED") {
            Some(v) => Some(
                v.trim()
                    .parse()
                    .map_err(|_| invalid("SIM_SEED", "an unsigned integer", &v))?,
            ),
            None => None,
        };

        Ok(Self {
            host,
            port,
            node_names,
            node: NodeSettings {
                pow: ProofOfWork::new(zero_bits, nonce_len),
                trial_budget,
            },
            seed,
        })
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(v) => v.trim().parse().map_err(|_| invalid(name, expected, &v)),
        None => Ok(default),
    }
}

fn invalid(name: &'static str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        expected,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_reference_difficulty() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.node_names, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(cfg.node.pow.zero_bits, 15);
        assert_eq!(cfg.node.pow.nonce_len, 20);
        assert_eq!(cfg.node.trial_budget, 10_000);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("NODES", " A , B "),
            ("POW_ZERO_BITS", "8"),
            ("SIM_SEED", "42"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(cfg.node_names, vec!["A", "B"]);
        assert_eq!(cfg.node.pow.zero_bits, 8);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(config(&[("POW_ZERO_BITS", "300")]).is_err());
        assert!(config(&[("NONCE_LEN", "0")]).is_err());
        assert!(config(&[("PORT", "http")]).is_err());
        assert!(config(&[("NODES", " , ")]).is_err());
        let err = config(&[("SIM_SEED", "-1")]).unwrap_err();
        assert_eq!(err.to_string(), "SIM_SEED must be an unsigned integer, got \"-1\"");
    }

    #[test]
    fn zero_difficulty_is_rejected() {
        let err = config(&[("POW_ZERO_BITS", "0")]).unwrap_err();
        assert_eq!(err.to_string(), "POW_ZERO_BITS must be between 1 and 256, got \"0\"");
        assert_eq!(config(&[("POW_ZERO_BITS", "1")]).unwrap().node.pow.zero_bits, 1);
        assert_eq!(config(&[("POW_ZERO_BITS", "256")]).unwrap().node.pow.zero_bits, 256);
    }
}
