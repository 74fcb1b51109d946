use std::{collections::BTreeMap, fs::read_to_string, path::Path, path::PathBuf};

use anyhow::{anyhow, bail, Result};
use directories::ProjectDirs;
use orient_common::ClassificationConfig;
use serde::{Deserialize, Serialize};

use crate::screen_action::ScreenActions;

pub const CONFIG_FILE_NAME: &str = "orient.json";
pub const DEFAULT_DISPLAY_PROGRAM: &str = "display64.exe";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HostConfigSerde {
    /// Name of the entry in `modes` to use.
    pub mode: String,
    #[serde(default = "default_display_program")]
    pub display_program: String,
    pub modes: BTreeMap<String, ModeConfigSerde>,
}

fn default_display_program() -> String {
    DEFAULT_DISPLAY_PROGRAM.to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModeConfigSerde {
    /// Tries every likely device when absent.
    #[serde(default)]
    pub serial_port: Option<String>,
    #[serde(default = "default_monitor")]
    pub monitor: u32,
    pub sampling_interval_ms: u32,
    pub stable_sample_count: u32,
    pub threshold_x: f32,
    pub threshold_y: f32,
    pub threshold_z: f32,
    #[serde(default)]
    pub screens: ScreenActions,
}

fn default_monitor() -> u32 {
    1
}

impl ModeConfigSerde {
    pub fn validate(&self) -> Result<()> {
        if self.sampling_interval_ms < 1 {
            bail!("sampling_interval_ms must be at least 1");
        }
        if self.stable_sample_count < 1 {
            bail!("stable_sample_count must be at least 1");
        }
        for (name, threshold) in [
            ("threshold_x", self.threshold_x),
            ("threshold_y", self.threshold_y),
            ("threshold_z", self.threshold_z),
        ] {
            if !(0.0..=1.0).contains(&threshold) {
                bail!("{} must be between 0 and 1, got {}", name, threshold);
            }
        }
        if self.monitor < 1 {
            bail!("monitor must be at least 1");
        }
        Ok(())
    }

    pub fn classification_config(&self) -> ClassificationConfig {
        ClassificationConfig::new(
            self.sampling_interval_ms,
            self.stable_sample_count,
            self.threshold_x,
            self.threshold_y,
            self.threshold_z,
        )
    }
}

/// The selected mode of a host config file.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub mode_name: String,
    pub display_program: String,
    pub mode: ModeConfigSerde,
}

impl HostConfigSerde {
    pub fn select(self, mode_override: Option<&str>) -> Result<HostConfig> {
        let mode_name = mode_override.unwrap_or(&self.mode).to_string();
        let Some(mode) = self.modes.get(&mode_name) else {
            let valid: Vec<_> = self.modes.keys().map(String::as_str).collect();
            bail!(
                "{} is not a valid mode, valid modes are: {}",
                mode_name,
                valid.join(", ")
            );
        };
        mode.validate()
            .map_err(|e| anyhow!("invalid mode {}: {}", mode_name, e))?;

        Ok(HostConfig {
            mode: mode.clone(),
            mode_name,
            display_program: self.display_program,
        })
    }
}

pub fn read_host_config<P: AsRef<Path>>(
    path: P,
    mode_override: Option<&str>,
) -> Result<HostConfig> {
    let path = path.as_ref();
    let config = read_to_string(path)
        .map_err(|e| anyhow!("failed to read {}: {}", path.display(), e))?;
    let config: HostConfigSerde = serde_json::from_str(&config)?;
    config.select(mode_override)
}

pub fn default_config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "orient")
        .ok_or_else(|| anyhow!("no home directory to look for {} in", CONFIG_FILE_NAME))?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}
