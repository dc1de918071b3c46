use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use larder_core::completion::DEFAULT_MODEL;

pub const DEFAULT_API_URL: &str = "https://training.nerdbord.io/api/v1/openai/chat/completions";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub api_url: String,
    pub model: String,
    api_key_env: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs =
            ProjectDirs::from("", "", "larder").context("Could not determine home directory")?;

        let data_dir = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Self::resolve(&data_dir, |key| std::env::var(key).ok()))
    }

    /// Build a config rooted at `data_dir`, reading overrides through `env`.
    pub fn resolve(data_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        Config {
            db_path: data_dir.join("larder.db"),
            data_dir: data_dir.to_path_buf(),
            api_url: non_empty("LARDER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: non_empty("LARDER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key_env: non_empty("LARDER_API_KEY"),
        }
    }

    /// The completion API key: `LARDER_API_KEY`, else the `api_key` file in
    /// the data directory. Sent verbatim as the `Authorization` header.
    pub fn api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key_env {
            return Ok(key.trim().to_string());
        }

        let path = self.data_dir.join("api_key");
        if path.exists() {
            let key = std::fs::read_to_string(&path).context("Failed to read API key file")?;
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }

        bail!(
            "No API key configured. Set LARDER_API_KEY or write the key to {}",
            path.display()
        )
    }
}
