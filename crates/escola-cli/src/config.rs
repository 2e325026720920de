// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: Server::default(),
            storage: Storage::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub base_url: Option<String>,
    /// The anti-forgery token the backend embeds in its pages; sent as
    /// the X-CSRFToken header on every request.
    pub csrf_token: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            csrf_token: Some(String::new()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub show_dashboard: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            show_dashboard: Some(true),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("ESCOLA_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set ESCOLA_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(escola_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [server], [storage], and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let base_url = self.base_url();
        if base_url.is_empty() {
            bail!("server.base_url in {} must not be empty", path.display());
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!(
                "server.base_url {base_url:?} in {} must start with http:// or https://",
                path.display()
            );
        }

        if let Some(db_path) = &self.storage.db_path {
            escola_store::validate_db_path(db_path)?;
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.server
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn csrf_token(&self) -> &str {
        self.server.csrf_token.as_deref().unwrap_or("")
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => escola_store::default_db_path(),
        }
    }

    pub fn show_dashboard(&self) -> bool {
        self.ui.show_dashboard.unwrap_or(true)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# escola client config\n# Place this file at: {}\n\nversion = 1\n\n[server]\nbase_url = \"{}\"\n# Anti-forgery token echoed on every request as X-CSRFToken\ncsrf_token = \"\"\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/escola/escola.db)\n# db_path = \"/absolute/path/to/escola.db\"\n\n[ui]\nshow_dashboard = true\n",
            path.display(),
            DEFAULT_BASE_URL,
        )
    }
}
