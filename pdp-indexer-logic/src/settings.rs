use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::time::Duration;

/// Protocol-level constants. These are not environment-configurable: they
/// describe on-chain/finalization behavior, not deployment preference.
pub const FINALIZATION_DEPTH: i64 = 900;
pub const CLEANUP_STRIDE: i64 = 100;
pub const NUM_CHALLENGES: u64 = 5;
pub const REORG_DEPTH_CAP: u64 = 1000;
pub const REORG_RECONCILIATION_DEADLINE: Duration = Duration::from_secs(600);
pub const RECEIPT_FANOUT: usize = 20;
pub const RPC_BATCH_CAP: usize = 50;

/// Deployment-tunable pacing, read from the environment the way the teacher
/// reads `MessageBufferSettings`.
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerSettings {
    /// Chunk width for the recovery loop and reorg replay (`MAX_BATCH`).
    pub max_batch: u64,

    #[serde_as(as = "DurationSeconds<u64>")]
    pub min_poll_interval: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            max_batch: 20,
            min_poll_interval: Duration::from_secs(30),
        }
    }
}

/// Top-level process settings, read from the environment per spec's CLI
/// surface: `DATABASE_URL`, `LOTUS_API_ENDPOINT`, `START_BLOCK`,
/// `EVENTS_FILE_PATH`, optional `LOTUS_API_KEY`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub database_url: String,
    pub lotus_api_endpoint: String,
    pub lotus_api_key: Option<String>,
    pub start_block: u64,
    pub events_file_path: String,
    pub scheduler: SchedulerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            lotus_api_endpoint: String::new(),
            lotus_api_key: None,
            start_block: 0,
            events_file_path: String::new(),
            scheduler: SchedulerSettings::default(),
        }
    }
}

impl Settings {
    pub fn build() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
