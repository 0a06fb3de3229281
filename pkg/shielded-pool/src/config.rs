use std::{path::Path, time::Duration};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, MERKLE_TREE_DEPTH};

/// Prefix of the environment variables that override config values
pub(crate) const ENV_PREFIX: &str = "SHIELDED_POOL_";

/// Configuration of the [`ProofGateway`](crate::ProofGateway)
///
/// Values are layered: defaults, then an optional TOML file, then `SHIELDED_POOL_*` environment
/// variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Give up on a proof after this many milliseconds (no limit when unset)
    pub proving_timeout_ms: Option<u64>,
    /// Maximum number of proofs running at the same time
    pub max_concurrent_proofs: usize,
    /// Expected length of every merkle path
    pub merkle_depth: usize,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            proving_timeout_ms: None,
            max_concurrent_proofs: 4,
            merkle_depth: MERKLE_TREE_DEPTH,
        }
    }
}

impl ProverConfig {
    /// The layered [`Figment`] this config is extracted from
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));

        let figment = match path {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment,
        };

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the config from a TOML file (which may not exist) and the environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = Self::figment(Some(path.as_ref())).extract()?;
        config.validate()
    }

    /// Load the config from the environment only
    pub fn from_env() -> Result<Self> {
        let config: Self = Self::figment(None).extract()?;
        config.validate()
    }

    /// The proving timeout, if any
    #[must_use]
    pub fn proving_timeout(&self) -> Option<Duration> {
        self.proving_timeout_ms.map(Duration::from_millis)
    }

    fn validate(self) -> Result<Self> {
        if self.max_concurrent_proofs == 0 {
            return Err(Error::InputMalformed {
                field: "max_concurrent_proofs",
            });
        }

        if !(1..=63).contains(&self.merkle_depth) {
            return Err(Error::InputMalformed {
                field: "merkle_depth",
            });
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_apply_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let config = ProverConfig::load("missing.toml").map_err(|e| e.to_string())?;
            assert_eq!(config, ProverConfig::default());
            assert_eq!(config.proving_timeout(), None);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "prover.toml",
                r"
                proving_timeout_ms = 1500
                max_concurrent_proofs = 8
                ",
            )?;
            jail.set_env("SHIELDED_POOL_MAX_CONCURRENT_PROOFS", "2");

            let config = ProverConfig::load("prover.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.proving_timeout(), Some(Duration::from_millis(1500)));
            assert_eq!(config.max_concurrent_proofs, 2);
            assert_eq!(config.merkle_depth, MERKLE_TREE_DEPTH);
            Ok(())
        });
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("SHIELDED_POOL_MAX_CONCURRENT_PROOFS", "0");

            let error = ProverConfig::from_env().unwrap_err();
            assert!(matches!(
                error,
                Error::InputMalformed {
                    field: "max_concurrent_proofs"
                }
            ));
            Ok(())
        });
    }
}
