use serde::{Deserialize, Serialize};
use std::fs;

use crate::fee;
use crate::money::Money;
use crate::transfer::validator;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "./logs".to_string(),
            log_file: "transfer.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            engine: EngineConfig::default(),
        }
    }
}

/// Engine tuning: amount bounds and the fee schedule.
///
/// Defaults match the standard policy; override per environment in
/// `config/{env}.yaml`. Amounts are strict decimal strings ("1000.00").
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct EngineConfig {
    #[serde(default = "default_min_amount")]
    pub min_amount: Money,
    #[serde(default = "default_max_amount")]
    pub max_amount: Money,
    #[serde(default = "default_fee_threshold")]
    pub fee_threshold: Money,
    #[serde(default = "default_flat_fee")]
    pub flat_fee: Money,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_amount: default_min_amount(),
            max_amount: default_max_amount(),
            fee_threshold: default_fee_threshold(),
            flat_fee: default_flat_fee(),
        }
    }
}

fn default_min_amount() -> Money {
    validator::MIN_AMOUNT
}

fn default_max_amount() -> Money {
    validator::MAX_AMOUNT
}

fn default_fee_threshold() -> Money {
    fee::FEE_THRESHOLD
}

fn default_flat_fee() -> Money {
    fee::FLAT_FEE
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}
