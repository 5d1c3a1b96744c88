use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

const CONFIG_FILE: &str = "heart_risk.json";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/heart_disease_rf_model.json"),
            bind_addr: "127.0.0.1:8501".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("invalid config JSON in {}", path.display()))
    }

    /// File (if one is found) then `MODEL_PATH` / `BIND_ADDR` overrides.
    pub fn resolve() -> Result<Self> {
        let mut cfg = match find_config_file() {
            Some(path) => {
                tracing::info!("using config {}", path.display());
                Self::load(&path)?
            }
            None => {
                tracing::info!("no config file found, using defaults");
                Self::default()
            }
        };
        cfg.apply_overrides(
            std::env::var("MODEL_PATH").ok(),
            std::env::var("BIND_ADDR").ok(),
        );
        Ok(cfg)
    }

    fn apply_overrides(&mut self, model_path: Option<String>, bind_addr: Option<String>) {
        if let Some(p) = model_path.filter(|s| !s.is_empty()) {
            self.model_path = PathBuf::from(p);
        }
        if let Some(a) = bind_addr.filter(|s| !s.is_empty()) {
            self.bind_addr = a;
        }
    }
}

fn find_config_file() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("config").join(CONFIG_FILE),
        PathBuf::from(CONFIG_FILE),
    ];
    if let Ok(mut p) = std::env::current_exe() {
        p.pop(); // exe dir
        candidates.push(p.join("config").join(CONFIG_FILE));
    }
    candidates.into_iter().find(|c| c.exists())
}
