use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const MEMORY_LEDGER: &str = ":memory:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SIMULACRO_SEED must be an unsigned integer, got {0:?}")]
    InvalidSeed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerLocation {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub candidates_path: PathBuf,
    pub ledger: LedgerLocation,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let candidates_path = lookup("SIMULACRO_CANDIDATES")
            .unwrap_or_else(|| "data/candidates.json".to_string())
            .into();

        let ledger = match lookup("SIMULACRO_LEDGER") {
            Some(value) if value == MEMORY_LEDGER => LedgerLocation::Memory,
            Some(value) => LedgerLocation::File(value.into()),
            None => LedgerLocation::File("simulacro_ledger.json".into()),
        };

        let seed = match lookup("SIMULACRO_SEED") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSeed(raw.clone()))?,
            ),
            None => None,
        };

        Ok(Self {
            candidates_path,
            ledger,
            seed,
        })
    }
}
