//! Loading the optional trainer configuration (extra challenge bank) from TOML.
//!
//! The bank lets an operator ship extra challenges without touching the
//! engine. Entries are declarative data; they are verified against the
//! matcher when the catalog is built (see `catalog::Catalog::build`).

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Category;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TrainerConfig {
  #[serde(default)]
  pub challenges: Vec<ChallengeCfg>,
}

/// Challenge entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  #[serde(default)] pub id: Option<u32>,
  pub category: Category,
  pub prompt: String,
  pub markup: String,
  pub answer: String,
  #[serde(default)] pub alternatives: Vec<AlternativeCfg>,
  #[serde(default)] pub trivia: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AlternativeCfg {
  pub selector: String,
  pub explanation: String,
}

/// Attempt to load `TrainerConfig` from TRAINER_CONFIG_PATH.
/// On any parsing/IO error, returns None.
pub fn load_trainer_config_from_env() -> Option<TrainerConfig> {
  let path = std::env::var("TRAINER_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<TrainerConfig>(&s) {
      Ok(cfg) => {
        info!(target: "cssdojo_backend", %path, entries = cfg.challenges.len(), "Loaded trainer config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "cssdojo_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "cssdojo_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
