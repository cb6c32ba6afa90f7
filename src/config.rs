use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

use crate::session::SessionConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the record file
    pub data_dir: String,
    /// Key (file stem) the record collection is stored under
    pub records_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub min_duration_secs: u64,
    pub tick_interval_ms: u64,
    pub kick_target: u32,
}

impl Config {
    /// Load `path` (any extension the `config` crate understands) over the
    /// built-in defaults. A missing file is not an error.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("storage.data_dir", ".kickcount")?
            .set_default("storage.records_key", "dfm_records")?
            .set_default("session.min_duration_secs", 60_i64)?
            .set_default("session.tick_interval_ms", 1000_i64)?
            .set_default("session.kick_target", 10_i64)?
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        let cfg: Self = settings.try_deserialize()?;

        if cfg.session.tick_interval_ms == 0 {
            anyhow::bail!("session.tick_interval_ms must be greater than zero");
        }

        Ok(cfg)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            min_session_secs: self.session.min_duration_secs,
            tick_interval: Duration::from_millis(self.session.tick_interval_ms),
            kick_target: self.session.kick_target,
        }
    }
}
