use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;

const CONFIG_FILE: &str = "monologue";
const ENV_PREFIX: &str = "MONOLOGUE";

/// Runtime knobs. Layered: built-in defaults, then `monologue.toml` if
/// present, then `MONOLOGUE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: PathBuf,
    pub output_root: PathBuf,
    pub timeout_secs: u64,
    /// Total attempts per request.
    pub retries: u32,
    pub backoff_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_config(
            Config::builder()
                .add_source(config::File::with_name(CONFIG_FILE).required(false))
                .add_source(config::Environment::with_prefix(ENV_PREFIX)),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .set_default("db_path", "data/monologues.sqlite")?
            .set_default("output_root", "data")?
            .set_default("timeout_secs", 30)?
            .set_default("retries", 3)?
            .set_default("backoff_ms", 1000)?
            .build()
            .context("reading settings")?
            .try_deserialize()
            .context("invalid settings")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    /// Default per-site CSV directory: `<output_root>/<source>`.
    pub fn source_dir(&self, source: crate::model::Source) -> PathBuf {
        self.output_root.join(source.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;

    #[test]
    fn defaults() {
        let s = Settings::from_config(Config::builder()).unwrap();
        assert_eq!(s.db_path, PathBuf::from("data/monologues.sqlite"));
        assert_eq!(s.timeout(), Duration::from_secs(30));
        assert_eq!(s.retries, 3);
        assert!(s.user_agent.is_none());
        assert_eq!(s.source_dir(Source::Scraps), PathBuf::from("data/scraps"));
    }

    #[test]
    fn overrides_win_over_defaults() {
        let builder = Config::builder()
            .set_override("retries", 7)
            .unwrap()
            .set_override("user_agent", "monologue-bot/1.0")
            .unwrap();
        let s = Settings::from_config(builder).unwrap();
        assert_eq!(s.retries, 7);
        assert_eq!(s.user_agent.as_deref(), Some("monologue-bot/1.0"));
    }
}
