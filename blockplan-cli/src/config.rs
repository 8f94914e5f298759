use anyhow::{Context, Result};
use blockplan_core::SchedulerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_blockplan_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub planning: PlanningSection,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningSection {
    /// Energy used when `--energy` is not passed (1-10).
    pub default_energy: i32,
    pub insert_breaks: bool,
    /// Zone for `slots` input and text output.
    pub timezone: String,
    /// Slot length for `slots` when `--minutes` is not passed.
    pub slot_minutes: i64,
    /// Prefix for ICS event summaries.
    pub ics_prefix: String,
}

impl Default for PlanningSection {
    fn default() -> Self {
        Self {
            default_energy: 5,
            insert_breaks: false,
            timezone: "UTC".to_string(),
            slot_minutes: 60,
            ics_prefix: "[blockplan] ".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_blockplan_home()?.join("config.toml"))
}

/// Load from `explicit` if given, else from the home config. A missing home
/// config yields defaults; a missing explicit path is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = config_path()?;
            if !p.exists() {
                return Ok(Config::default());
            }
            p
        }
    };
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
