use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration of a [`Ledger`](crate::Ledger)
///
/// Layered like the prover config: defaults, then a TOML file, then `SHIELDED_POOL_*` env vars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// How many recent roots (including the current one) spends may be proven against
    pub root_history_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            root_history_size: 30,
        }
    }
}

impl LedgerConfig {
    /// The layered [`Figment`] this config is extracted from
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("SHIELDED_POOL_"))
    }

    /// Load the config from a TOML file (which may not exist) and the environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::figment(Some(path.as_ref())).extract::<Self>()?.validate()
    }

    /// Load the config from the environment only
    pub fn from_env() -> Result<Self> {
        Self::figment(None).extract::<Self>()?.validate()
    }

    fn validate(self) -> Result<Self> {
        match self.root_history_size {
            0 => Err(Error::InvalidConfig {
                field: "root_history_size",
            }),
            _ => Ok(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn file_and_env_are_layered() {
        Jail::expect_with(|jail| {
            assert_eq!(
                LedgerConfig::load("ledger.toml").map_err(|e| e.to_string())?,
                LedgerConfig::default()
            );

            jail.create_file("ledger.toml", "root_history_size = 5")?;
            let config = LedgerConfig::load("ledger.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.root_history_size, 5);

            jail.set_env("SHIELDED_POOL_ROOT_HISTORY_SIZE", "100");
            let config = LedgerConfig::load("ledger.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.root_history_size, 100);

            Ok(())
        });
    }

    #[test]
    fn empty_history_is_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("SHIELDED_POOL_ROOT_HISTORY_SIZE", "0");

            let error = LedgerConfig::from_env().unwrap_err();
            assert!(matches!(
                error,
                Error::InvalidConfig {
                    field: "root_history_size"
                }
            ));
            Ok(())
        });
    }
}
