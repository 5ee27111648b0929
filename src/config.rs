use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Deadline for a single runtime API call (list, inspect, remove,
    /// create, start, image remove).
    pub op_timeout_secs: u64,
    /// Deadline for draining a whole image pull.
    pub pull_timeout_secs: u64,
    /// Remove the superseded image once a container has been recreated on
    /// a different one.
    pub reclaim_images: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            op_timeout_secs: 60,
            pull_timeout_secs: 600,
            reclaim_images: true,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("updock.toml"))
            .merge(Json::file("updock.json"))
            .merge(Env::prefixed("UPDOCK_"))
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
        Ok(config)
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_secs(self.op_timeout_secs)
    }

    pub fn pull_timeout(&self) -> Duration {
        Duration::from_secs(self.pull_timeout_secs)
    }
}
