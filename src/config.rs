//! Runtime configuration read from the environment.
//!
//! | Variable | Meaning |
//! |---|---|
//! | `VOCAB_QUEST_DATA_DIR` | directory for saved game state; unset keeps everything in memory |
//! | `VOCAB_QUEST_SEED` | u64 seed for the game RNG; unset seeds from entropy |
//! | `VOCAB_QUEST_CORPUS_DIR` | directory with `terms.json`, `examples.json`, `relations.json`; unset uses the embedded corpus |
//!
//! Server address and port follow Rocket's own configuration (`Rocket.toml`, `ROCKET_*`).

use std::path::PathBuf;

pub const DATA_DIR_VAR: &str = "VOCAB_QUEST_DATA_DIR";
pub const SEED_VAR: &str = "VOCAB_QUEST_SEED";
pub const CORPUS_DIR_VAR: &str = "VOCAB_QUEST_CORPUS_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub corpus_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unparsable seeds are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let seed = non_empty(SEED_VAR).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(s) => Some(s),
            Err(e) => {
                log::warn!("ignoring {SEED_VAR}={raw:?}: {e}");
                None
            }
        });
        AppConfig {
            data_dir: non_empty(DATA_DIR_VAR).map(PathBuf::from),
            seed,
            corpus_dir: non_empty(CORPUS_DIR_VAR).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reads_all_variables() {
        let vars = HashMap::from([
            (DATA_DIR_VAR, "/tmp/vq"),
            (SEED_VAR, "99"),
            (CORPUS_DIR_VAR, "/opt/corpus"),
        ]);
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/vq")));
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.corpus_dir, Some(PathBuf::from("/opt/corpus")));
    }

    #[test]
    fn bad_seed_and_blank_values_are_ignored() {
        let vars = HashMap::from([(DATA_DIR_VAR, "  "), (SEED_VAR, "not-a-number")]);
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config, AppConfig::default());
    }
}
