//! `tpm config ...`

use std::io::Write;

use anyhow::{Context as _, Result};

use super::ConfigAction;
use crate::config::AppConfig;
use crate::utils::ConfigPaths;

pub fn execute(action: &ConfigAction, paths: &ConfigPaths, out: &mut impl Write) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let mut config = AppConfig::load(&paths.config_file)?;
            config.apply_env_overrides();
            let yaml = serde_yaml::to_string(&config).context("failed to encode config")?;
            write!(out, "{yaml}")?;
        }
        ConfigAction::Path => {
            writeln!(out, "config:    {}", paths.config_file.display())?;
            writeln!(out, "shortcuts: {}", paths.shortcuts_file.display())?;
            writeln!(out, "data:      {}", paths.data_dir.display())?;
            writeln!(out, "log:       {}", paths.log_file.display())?;
        }
        ConfigAction::Reset => {
            let mut config = AppConfig::default();
            config.save(&paths.config_file)?;
            writeln!(out, "Configuration reset: {}", paths.config_file.display())?;
        }
    }
    Ok(())
}
