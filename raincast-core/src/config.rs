use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Path to the serialized prediction model artifact.
    pub model_path: Option<PathBuf>,

    /// Override for the geocoding endpoint; defaults to the public
    /// Open-Meteo geocoding API when absent.
    pub geocoding_url: Option<String>,

    /// Override for the forecast endpoint; defaults to the public
    /// Open-Meteo forecast API when absent.
    pub forecast_url: Option<String>,
}

impl Config {
    /// Return the configured model path, or a helpful error telling the user
    /// how to set one.
    pub fn model_path(&self) -> Result<&PathBuf> {
        self.model_path.as_ref().ok_or_else(|| {
            anyhow!(
                "No model path configured.\n\
                 Hint: run `raincast configure` and point it at a model trained with raincast-train."
            )
        })
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "raincast", "raincast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_model_path(&mut self, path: PathBuf) {
        self.model_path = Some(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_path_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.model_path().unwrap_err();

        assert!(err.to_string().contains("No model path configured"));
    }

    #[test]
    fn set_model_path_round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.set_model_path(PathBuf::from("/var/lib/raincast/model.bin"));

        let text = toml::to_string_pretty(&cfg).expect("serializes");
        let parsed: Config = toml::from_str(&text).expect("parses");

        assert_eq!(
            parsed.model_path().expect("model path must exist"),
            &PathBuf::from("/var/lib/raincast/model.bin")
        );
        assert!(parsed.geocoding_url.is_none());
        assert!(parsed.forecast_url.is_none());
    }

    #[test]
    fn endpoint_overrides_parse_from_toml() {
        let cfg: Config = toml::from_str(
            r#"
            model_path = "model.bin"
            forecast_url = "http://localhost:9999/v1/forecast"
            "#,
        )
        .expect("parses");

        assert_eq!(
            cfg.forecast_url.as_deref(),
            Some("http://localhost:9999/v1/forecast")
        );
        assert!(cfg.geocoding_url.is_none());
    }
}
